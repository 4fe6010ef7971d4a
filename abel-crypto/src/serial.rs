//! Coin serial-number resolution.
//!
//! Serial numbers depend on the coin, its ring and the owner's
//! serial-number secret key. Only that key crosses the backend boundary;
//! spend and view keys are left out of the bundle.

use std::collections::HashMap;

use tracing::{debug, instrument};

use abel_core::error::{AbelError, Result};
use abel_core::traits::CryptoBackend;
use abel_core::types::{Bytes, CoinId, CryptoKey, OutPoint, SigningKeyBundle, TxBlockDesc};

use crate::ring::serialized_blocks_for_ring_group;

/// Derives one serial number per coin, aligned with `coin_ids`.
///
/// `serial_no_secret_keys[i]` must belong to the owner of `coin_ids[i]`.
///
/// # Errors
/// - `MalformedReference` if a coin's hash is not a 32-byte txid
/// - `Validation` if the key count differs from the coin count
/// - `Backend` if the backend fails or returns a misaligned result
#[instrument(skip_all, fields(coins = coin_ids.len(), ring_blocks = ring_blocks.len()))]
pub fn decode_coin_serial_numbers(
    backend: &dyn CryptoBackend,
    coin_ids: &[CoinId],
    serial_no_secret_keys: &[CryptoKey],
    ring_blocks: &HashMap<i64, TxBlockDesc>,
) -> Result<Vec<Bytes>> {
    if coin_ids.len() != serial_no_secret_keys.len() {
        return Err(AbelError::ValidationError(format!(
            "{} coins but {} serial-number keys",
            coin_ids.len(),
            serial_no_secret_keys.len()
        )));
    }

    let outpoints = coin_ids
        .iter()
        .map(CoinId::to_outpoint)
        .collect::<Result<Vec<OutPoint>>>()?;

    let serialized_blocks = serialized_blocks_for_ring_group(ring_blocks);

    let keys: Vec<SigningKeyBundle> = serial_no_secret_keys
        .iter()
        .cloned()
        .map(SigningKeyBundle::serial_number_only)
        .collect();

    let serial_numbers =
        backend.generate_coin_serial_numbers(&outpoints, &serialized_blocks, &keys)?;

    if serial_numbers.len() != coin_ids.len() {
        return Err(AbelError::backend(
            "generate_coin_serial_numbers",
            format!(
                "returned {} serial numbers for {} coins",
                serial_numbers.len(),
                coin_ids.len()
            ),
        ));
    }

    debug!("derived serial numbers");
    Ok(serial_numbers.into_iter().map(Bytes::from).collect())
}
