//! Shared SHA-256 digest utilities.
//!
//! Used by the broadcast lock to map a lock name onto the 64-bit key space
//! of PostgreSQL advisory locks.

use sha2::{Digest, Sha256};

/// Derive a stable 64-bit key from arbitrary bytes.
///
/// Takes the first 8 bytes of the SHA-256 digest, big-endian. The mapping is
/// deterministic across processes and releases, which is what makes the
/// advisory lock visible to every instance sharing the database.
pub fn stable_key64(data: &[u8]) -> i64 {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    i64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistent_output() {
        let name = b"broadcast_send_lock";
        assert_eq!(stable_key64(name), stable_key64(name));
    }

    #[test]
    fn distinct_names_produce_distinct_keys() {
        assert_ne!(stable_key64(b"lock_a"), stable_key64(b"lock_b"));
    }

    #[test]
    fn empty_input_produces_known_key() {
        // First 8 bytes of SHA-256("") = e3b0c44298fc1c14.
        assert_eq!(stable_key64(b""), i64::from_be_bytes([0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14]));
    }
}
