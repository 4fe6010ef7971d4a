//! Immutable byte buffer shared by every value type in the SDK.

use std::ops::{Deref, RangeBounds};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hash::sha256;

/// An immutable, cheaply clonable view over a byte sequence.
///
/// Slicing shares the underlying allocation, so derived addresses and
/// checksums never copy the (multi-kilobyte) address payloads.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bytes {
    inner: ::bytes::Bytes,
}

impl Bytes {
    /// Wraps owned bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            inner: ::bytes::Bytes::from(data),
        }
    }

    /// Copies a slice into a new buffer.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            inner: ::bytes::Bytes::copy_from_slice(data),
        }
    }

    /// Returns an empty buffer.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decodes a hex string (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self::new(hex::decode(s)?))
    }

    /// Returns the lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.inner)
    }

    /// Returns the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Copies the bytes into a `Vec`.
    pub fn to_vec(&self) -> Vec<u8> {
        self.inner.to_vec()
    }

    /// Returns a zero-copy sub-view.
    ///
    /// # Panics
    /// Panics if the range is out of bounds, like slice indexing.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        Self {
            inner: self.inner.slice(range),
        }
    }

    /// Returns the SHA-256 digest of the contents.
    pub fn sha256(&self) -> Self {
        Self::new(sha256(&self.inner).to_vec())
    }

    /// Returns a copy with the byte order reversed.
    pub fn reversed(&self) -> Self {
        let mut data = self.inner.to_vec();
        data.reverse();
        Self::new(data)
    }

    /// Concatenates several byte slices into one buffer.
    pub fn concat(parts: &[&[u8]]) -> Self {
        Self::new(parts.concat())
    }

    /// Short hex rendering for logs: first `head` and last `tail` bytes.
    ///
    /// Buffers no longer than `head + tail` are rendered in full.
    pub fn summary(&self, head: usize, tail: usize) -> String {
        let len = self.inner.len();
        if len <= head + tail {
            return self.to_hex();
        }
        format!(
            "{}..{}",
            hex::encode(&self.inner[..head]),
            hex::encode(&self.inner[len - tail..])
        )
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.inner
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for Bytes {
    fn from(data: &[u8]) -> Self {
        Self::copy_from_slice(data)
    }
}

impl<const N: usize> From<[u8; N]> for Bytes {
    fn from(data: [u8; N]) -> Self {
        Self::new(data.to_vec())
    }
}

impl std::fmt::Debug for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bytes({}, len={})", self.summary(4, 4), self.len())
    }
}

impl std::fmt::Display for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// Serde implementation that uses hex encoding
impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let bytes = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(bytes.to_hex(), "deadbeef");
        assert_eq!(Bytes::from_hex("0xdeadbeef").unwrap(), bytes);
    }

    #[test]
    fn test_slice_shares_contents() {
        let bytes = Bytes::from(vec![1, 2, 3, 4, 5]);
        let middle = bytes.slice(1..4);
        assert_eq!(middle.as_slice(), &[2, 3, 4]);
        assert_eq!(bytes.slice(3..).as_slice(), &[4, 5]);
    }

    #[test]
    fn test_reversed() {
        let bytes = Bytes::from(vec![1, 2, 3]);
        assert_eq!(bytes.reversed().as_slice(), &[3, 2, 1]);
        assert_eq!(bytes.reversed().reversed(), bytes);
    }

    #[test]
    fn test_summary() {
        let bytes = Bytes::from(vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee]);
        assert_eq!(bytes.summary(1, 2), "aa..ddee");
        assert_eq!(bytes.summary(3, 2), "aabbccddee");
        assert_eq!(Bytes::empty().summary(1, 8), "");
    }

    #[test]
    fn test_sha256_length() {
        assert_eq!(Bytes::from(vec![0u8; 10]).sha256().len(), 32);
    }

    #[test]
    fn test_serde_hex() {
        let bytes = Bytes::from(vec![0x12, 0x34]);
        let json = serde_json::to_string(&bytes).unwrap();
        assert_eq!(json, "\"1234\"");
        let back: Bytes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bytes);
    }
}
