//! Application Layer - Use Cases

pub mod config;
pub mod csrf;
pub mod login;
pub mod logout;
pub mod maintenance;
pub mod refresh;

pub use config::SessionConfig;
pub use csrf::CsrfGuard;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use maintenance::{SweepIntervals, spawn_sweepers};
pub use refresh::{RefreshOutput, RefreshUseCase};
