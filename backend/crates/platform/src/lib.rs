//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, constant-time compare)
//! - Password hash verification (Argon2id)
//! - Cookie management
//! - Client IP extraction

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
