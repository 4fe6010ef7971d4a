//! Hashing helpers.
//!
//! - SHA-256: address fingerprints and content hashes
//! - SHA3-256: checksum over a serialized instance address
//! - SHAKE256: domain-separated expansion (used by the mock backend)

use sha2::{Digest as _, Sha256};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Sha3_256, Shake256,
};

/// Computes the SHA-256 digest of `input`.
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    sha2::Digest::update(&mut hasher, input);
    hasher.finalize().into()
}

/// Computes the SHA3-256 digest of `input`.
///
/// This is the checksum applied to serialized instance addresses.
pub fn sha3_256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    sha3::Digest::update(&mut hasher, input);
    hasher.finalize().into()
}

/// Computes SHAKE256 with a length-prefixed domain separator.
///
/// ```text
/// output = SHAKE256(len(domain) || domain || input, output_len)
/// ```
pub fn shake256(domain: &[u8], input: &[u8], output_len: usize) -> Vec<u8> {
    let mut hasher = Shake256::default();

    hasher.update(&(domain.len() as u32).to_le_bytes());
    hasher.update(domain);
    hasher.update(input);

    let mut reader = hasher.finalize_xof();
    let mut output = vec![0u8; output_len];
    reader.read(&mut output);

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let expected =
            hex::decode("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
                .unwrap();
        assert_eq!(sha256(b"hello").as_slice(), expected.as_slice());
    }

    #[test]
    fn test_sha3_256_known_vector() {
        let expected =
            hex::decode("a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a")
                .unwrap();
        assert_eq!(sha3_256(b"").as_slice(), expected.as_slice());
    }

    #[test]
    fn test_shake256_domain_separation() {
        let a = shake256(b"domain1", b"input", 32);
        let b = shake256(b"domain2", b"input", 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_shake256_prefix_stable() {
        let short = shake256(b"domain", b"input", 16);
        let long = shake256(b"domain", b"input", 64);
        assert_eq!(&short[..], &long[..16]);
    }
}
