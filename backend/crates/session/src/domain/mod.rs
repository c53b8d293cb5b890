//! Domain Layer

pub mod access_token;
pub mod entity;
pub mod repository;
