//! Key material.
//!
//! - [`CryptoKey`]: one secret key, zeroized on drop
//! - [`CryptoKeysAndAddress`]: the three secrets of an identity plus its crypto address
//! - [`SigningKeyBundle`]: the opaque per-input key structure handed to the backend

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{Bytes, CryptoAddress};

// ═══════════════════════════════════════════════════════════════════════════════
// SECRET KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// A secret key produced by the backend.
///
/// Never expose this key in logs or error messages.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CryptoKey {
    bytes: Vec<u8>,
}

impl CryptoKey {
    /// Wraps raw secret bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Copies secret bytes from a slice.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Returns the raw bytes of the key.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the key is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for CryptoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose secret key content
        write!(f, "CryptoKey([REDACTED])")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY KEYS
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything one identity needs to receive, track and spend coins.
#[derive(Clone)]
pub struct CryptoKeysAndAddress {
    /// Authorizes spending
    pub spend_secret_key: CryptoKey,
    /// Derives serial numbers of owned coins
    pub serial_no_secret_key: CryptoKey,
    /// Decrypts output values
    pub view_secret_key: CryptoKey,
    /// The public crypto address
    pub crypto_address: CryptoAddress,
}

impl CryptoKeysAndAddress {
    /// Bundles all key material for signing an input.
    pub fn signing_bundle(&self) -> SigningKeyBundle {
        SigningKeyBundle::full(
            self.crypto_address.data().clone(),
            self.spend_secret_key.clone(),
            self.serial_no_secret_key.clone(),
            self.view_secret_key.clone(),
        )
    }
}

impl std::fmt::Debug for CryptoKeysAndAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoKeysAndAddress")
            .field("crypto_address", &self.crypto_address)
            .field("secrets", &"[REDACTED]")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BACKEND KEY BUNDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Key structure passed to the backend, one per input.
///
/// Fields an operation does not need are left `None`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningKeyBundle {
    /// Public crypto address of the signer
    pub crypto_address: Option<Bytes>,
    /// Spend secret key
    pub spend_secret_key: Option<CryptoKey>,
    /// Serial-number secret key
    pub serial_no_secret_key: Option<CryptoKey>,
    /// View secret key
    pub view_secret_key: Option<CryptoKey>,
}

impl SigningKeyBundle {
    /// A bundle carrying every field, as required for signing.
    pub fn full(
        crypto_address: Bytes,
        spend_secret_key: CryptoKey,
        serial_no_secret_key: CryptoKey,
        view_secret_key: CryptoKey,
    ) -> Self {
        Self {
            crypto_address: Some(crypto_address),
            spend_secret_key: Some(spend_secret_key),
            serial_no_secret_key: Some(serial_no_secret_key),
            view_secret_key: Some(view_secret_key),
        }
    }

    /// A bundle carrying only the serial-number secret key.
    pub fn serial_number_only(serial_no_secret_key: CryptoKey) -> Self {
        Self {
            serial_no_secret_key: Some(serial_no_secret_key),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for SigningKeyBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyBundle")
            .field("crypto_address", &self.crypto_address)
            .field("spend_secret_key", &self.spend_secret_key.is_some())
            .field("serial_no_secret_key", &self.serial_no_secret_key.is_some())
            .field("view_secret_key", &self.view_secret_key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_key_debug_redacted() {
        let key = CryptoKey::new(vec![0x42; 32]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("42"));
    }

    #[test]
    fn test_serial_number_only_bundle() {
        let bundle = SigningKeyBundle::serial_number_only(CryptoKey::new(vec![1, 2, 3]));
        assert!(bundle.crypto_address.is_none());
        assert!(bundle.spend_secret_key.is_none());
        assert!(bundle.view_secret_key.is_none());
        assert_eq!(bundle.serial_no_secret_key.unwrap().as_bytes(), &[1, 2, 3]);
    }
}
