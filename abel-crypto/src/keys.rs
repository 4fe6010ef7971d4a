//! Key seed and key generation.
//!
//! ## Flow
//!
//! ```text
//! generate_safe_crypto_seed ──► seed
//!                                 ↓
//! generate_crypto_keys_and_address(seed)
//!                                 ↓
//! (crypto_address, spend_sk, serial_no_sk, view_sk)
//! ```

use tracing::{debug, instrument};

use abel_core::error::Result;
use abel_core::traits::CryptoBackend;
use abel_core::types::{CryptoAddress, CryptoKey, CryptoKeysAndAddress};

/// Asks the backend for fresh key-seed material.
///
/// The seed is the root of every key of the identity; store it as a secret.
pub fn generate_safe_crypto_seed(backend: &dyn CryptoBackend) -> Result<CryptoKey> {
    let seed = backend.generate_key_seed()?;
    Ok(CryptoKey::new(seed))
}

/// Derives the three secret keys and the crypto address from `seed`.
///
/// The crypto address fingerprint is resolved through the backend, so a
/// backend that returns an address without an embedded coin address fails
/// here rather than later.
#[instrument(skip_all, fields(seed_len = seed.len()))]
pub fn generate_crypto_keys_and_address(
    backend: &dyn CryptoBackend,
    seed: &CryptoKey,
) -> Result<CryptoKeysAndAddress> {
    let generated = backend.generate_keys_and_address(seed.as_bytes())?;
    let crypto_address = CryptoAddress::new(generated.crypto_address, backend)?;

    debug!(address = %crypto_address, "generated crypto keys");

    Ok(CryptoKeysAndAddress {
        spend_secret_key: CryptoKey::from_slice(&generated.spend_secret_key),
        serial_no_secret_key: CryptoKey::from_slice(&generated.serial_no_secret_key),
        view_secret_key: CryptoKey::from_slice(&generated.view_secret_key),
        crypto_address,
    })
}
