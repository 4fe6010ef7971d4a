//! In-memory chain source.
//!
//! Fast, thread-safe block storage and submission log suitable for
//! testing and offline transaction assembly.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use abel_core::error::{AbelError, Result};
use abel_core::hash::sha256;
use abel_core::traits::ChainSource;
use abel_core::types::Bytes;

/// In-memory [`ChainSource`].
///
/// Blocks are stored by height. Accepted submissions are kept in
/// arrival order; a transaction already accepted is rejected as a
/// duplicate.
///
/// # Thread Safety
///
/// All operations are thread-safe and can be called concurrently.
#[derive(Debug, Default)]
pub struct MemoryChain {
    /// Height → serialized block
    blocks: DashMap<i64, Bytes>,
    /// Accepted transactions, hex encoded, in arrival order
    submissions: RwLock<Vec<String>>,
    /// Txids of accepted transactions, for duplicate rejection
    accepted_txids: DashMap<String, ()>,
    /// Reason every submission is rejected with, when set
    rejection: RwLock<Option<String>>,
    /// Number of block lookups served
    block_requests: AtomicU64,
}

impl MemoryChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a block, replacing any block at the same height.
    pub fn insert_block(&self, height: i64, block: impl Into<Bytes>) {
        self.blocks.insert(height, block.into());
    }

    /// Returns the number of stored blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no blocks are stored.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Makes every later submission fail with `reason`.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        *self.rejection.write() = Some(reason.into());
    }

    /// Accepts submissions again.
    pub fn accept_submissions(&self) {
        *self.rejection.write() = None;
    }

    /// Returns the accepted transactions, hex encoded.
    pub fn submitted(&self) -> Vec<String> {
        self.submissions.read().clone()
    }

    /// Returns how many block lookups have been served.
    pub fn block_requests(&self) -> u64 {
        self.block_requests.load(Ordering::Relaxed)
    }

    /// Txid of a serialized transaction in display byte order.
    fn txid_of(tx: &[u8]) -> String {
        let mut txid = sha256(tx);
        txid.reverse();
        hex::encode(txid)
    }
}

#[async_trait]
impl ChainSource for MemoryChain {
    #[instrument(skip(self))]
    async fn block_bytes_by_height(&self, height: i64) -> Result<Bytes> {
        self.block_requests.fetch_add(1, Ordering::Relaxed);

        self.blocks
            .get(&height)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AbelError::ChainSource(format!("no block at height {}", height)))
    }

    #[instrument(skip(self, tx_hex), fields(size = tx_hex.len() / 2))]
    async fn send_raw_tx(&self, tx_hex: &str) -> Result<String> {
        let tx = hex::decode(tx_hex)
            .map_err(|e| AbelError::ChainSource(format!("transaction is not hex: {}", e)))?;

        if let Some(reason) = self.rejection.read().as_ref() {
            warn!(%reason, "rejecting submission");
            return Err(AbelError::ChainSource(reason.clone()));
        }

        let txid = Self::txid_of(&tx);

        // The entry guard holds the shard lock until the submission is logged.
        match self.accepted_txids.entry(txid.clone()) {
            Entry::Occupied(_) => Err(AbelError::ChainSource(format!(
                "transaction {} already accepted",
                txid
            ))),
            Entry::Vacant(slot) => {
                let _accepted = slot.insert(());
                self.submissions.write().push(tx_hex.to_lowercase());
                debug!(%txid, "accepted transaction");
                Ok(txid)
            }
        }
    }
}
