//! Random secret generation for authorization codes and refresh tokens.

use rand::RngCore;

/// Generate `len` random bytes from a CSPRNG, rendered as lowercase hex.
///
/// The returned string is always `2 * len` characters long. Collisions are
/// treated as negligible at the entropy levels used by the stores (16 and
/// 32 bytes) and are not re-checked against live keys.
pub(crate) fn generate_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_is_fixed_length_hex() {
        let secret = generate_hex(16);
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_secrets_differ() {
        assert_ne!(generate_hex(32), generate_hex(32));
    }
}
