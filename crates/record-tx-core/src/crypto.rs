//! Hash functions used by the ledger.
//!
//! Blake2b-224 derives key and script hashes, Blake2b-256 derives datum and
//! transaction hashes, SHA-256 hashes user-supplied secrets.

use sha2::{Digest, Sha256};

/// Blake2b with a 28-byte digest.
pub fn blake2b_224(data: &[u8]) -> [u8; 28] {
    let hash = blake2b_simd::Params::new().hash_length(28).hash(data);
    let mut out = [0u8; 28];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// Blake2b with a 32-byte digest.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let hash = blake2b_simd::Params::new().hash_length(32).hash(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake2b_224_empty() {
        assert_eq!(
            hex::encode(blake2b_224(&[])),
            "836cc68931c2e4e3e838602eca1902591d216837bafddfe6f0c8cb07"
        );
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            hex::encode(sha256(b"alice")),
            "2bd806c97f0e00af1a1fc3328fa763a9269723c8db8fac4f93af71db186d6e90"
        );
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(blake2b_224(b"x").len(), 28);
        assert_eq!(blake2b_256(b"x").len(), 32);
    }
}
