//! Decoding of serialized transaction outputs.
//!
//! The value delegation clears the key buffer it is handed, so
//! [`decode_value_from_txout`] always passes the backend a private
//! [`Zeroizing`] copy and the caller's key stays intact.

use tracing::{debug, instrument};
use zeroize::Zeroizing;

use abel_core::error::{AbelError, Result};
use abel_core::traits::CryptoBackend;
use abel_core::types::{CoinAddress, CryptoKey};

/// Extracts the coin address an output is locked to.
pub fn decode_coin_address_from_txout(
    backend: &dyn CryptoBackend,
    serialized_txout: &[u8],
) -> Result<CoinAddress> {
    CoinAddress::from_txout(serialized_txout, backend)
}

/// Decodes the plaintext value of an output with the owner's view key.
///
/// # Errors
/// - Backend errors are propagated unchanged
/// - `ValueOutOfRange` if the value does not fit in `i64`
#[instrument(skip_all, fields(txout_len = serialized_txout.len()))]
pub fn decode_value_from_txout(
    backend: &dyn CryptoBackend,
    serialized_txout: &[u8],
    view_secret_key: &CryptoKey,
) -> Result<i64> {
    let key_copy = Zeroizing::new(view_secret_key.as_bytes().to_vec());
    let value = backend.extract_coin_value_from_txout(serialized_txout, key_copy)?;

    let value = i64::try_from(value).map_err(|_| {
        AbelError::ValueOutOfRange(format!("decoded value {} exceeds i64::MAX", value))
    })?;

    debug!(value, "decoded txout value");
    Ok(value)
}
