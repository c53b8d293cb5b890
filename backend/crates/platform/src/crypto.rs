//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a random token encoded as lowercase hex
///
/// `n_bytes` is the entropy in bytes; the resulting string is twice as long.
/// 32 bytes gives a 256-bit token.
pub fn random_token_hex(n_bytes: usize) -> String {
    hex::encode(random_bytes(n_bytes))
}

/// Generate a random token encoded as URL-safe base64 (no padding)
pub fn random_token_b64(n_bytes: usize) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes(n_bytes))
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        // Should not be all zeros (statistically)
        assert!(bytes.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_random_token_hex() {
        let token = random_token_hex(32);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        // Two tokens should differ
        assert_ne!(token, random_token_hex(32));
    }

    #[test]
    fn test_random_token_b64() {
        let token = random_token_b64(32);
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn test_constant_time_eq() {
        let a = [1u8, 2, 3, 4];
        let b = [1u8, 2, 3, 4];
        let c = [1u8, 2, 3, 5];
        assert!(constant_time_eq(&a, &b));
        assert!(!constant_time_eq(&a, &c));
        assert!(!constant_time_eq(&a, &a[..3]));
    }
}
