//! Interaction with a [`ChainSource`].
//!
//! Fetching ring blocks and broadcasting happen outside the assembler:
//! callers fetch blocks first, assemble and sign offline, then submit.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use abel_core::error::Result;
use abel_core::traits::ChainSource;
use abel_core::types::{SignedRawTx, TxBlockDesc, TxInDesc, TxSubmissionResult};
use abel_crypto::ring::ring_block_heights_for_inputs;

/// Fetches every block of every input's ring window, keyed by height.
///
/// Fails on the first block the source cannot provide.
#[instrument(skip_all, fields(inputs = inputs.len()))]
pub async fn fetch_ring_block_descs<S>(
    source: &S,
    inputs: &[TxInDesc],
) -> Result<HashMap<i64, TxBlockDesc>>
where
    S: ChainSource + ?Sized,
{
    let heights = ring_block_heights_for_inputs(inputs)?;
    let mut blocks = HashMap::with_capacity(heights.len());

    for height in heights {
        let bin_data = source.block_bytes_by_height(height).await?;
        debug!(height, size = bin_data.len(), "fetched ring block");
        blocks.insert(height, TxBlockDesc::new(bin_data, height));
    }

    Ok(blocks)
}

/// Broadcasts `signed` and records the outcome.
///
/// A rejection is reported through `success` and `error` rather than as an
/// `Err`, so the caller always gets the submission record back.
#[instrument(skip_all, fields(txid = %signed.txid_hex()))]
pub async fn submit_signed_raw_tx<S>(source: &S, signed: &SignedRawTx) -> TxSubmissionResult
where
    S: ChainSource + ?Sized,
{
    let submission_time = Utc::now();

    let (success, error) = match source.send_raw_tx(&signed.data.to_hex()).await {
        Ok(node_txid) => {
            if node_txid != signed.txid_hex() {
                warn!(%node_txid, "node reported a different txid");
            }
            info!("transaction accepted");
            (true, None)
        }
        Err(e) => {
            warn!(error = %e, "transaction rejected");
            (false, Some(e.to_string()))
        }
    };

    TxSubmissionResult {
        signed_raw_tx: signed.clone(),
        submission_time,
        success,
        error,
    }
}
