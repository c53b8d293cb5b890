//! Domain Entities

pub mod identity;
pub mod lockout;
pub mod refresh_token;

pub use identity::{Identity, IdentityClaims, IdentityRole, IdentityStatus};
pub use lockout::{LockoutEntry, LockoutPolicy};
pub use refresh_token::RefreshTokenEntry;
