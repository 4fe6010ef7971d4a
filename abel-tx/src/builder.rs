//! Transaction descriptor builder.

use std::collections::HashMap;

use abel_core::constants::DEFAULT_ESTIMATED_TX_FEE;
use abel_core::error::{AbelError, Result};
use abel_core::types::{AbelAddress, Bytes, TxBlockDesc, TxDesc, TxInDesc, TxOutDesc};
use abel_crypto::ring::ensure_ring_blocks_present;

use crate::config::SdkConfig;

/// Builder for [`TxDesc`].
///
/// # Example
///
/// ```rust,ignore
/// let desc = TxDescBuilder::new()
///     .input(coin)
///     .output(recipient, 1_000)
///     .fee(10)
///     .ring_blocks(blocks)
///     .build()?;
/// ```
#[derive(Debug)]
pub struct TxDescBuilder {
    inputs: Vec<TxInDesc>,
    outputs: Vec<TxOutDesc>,
    fee: i64,
    memo: Bytes,
    ring_blocks: HashMap<i64, TxBlockDesc>,
}

impl Default for TxDescBuilder {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            fee: DEFAULT_ESTIMATED_TX_FEE,
            memo: Bytes::empty(),
            ring_blocks: HashMap::new(),
        }
    }
}

impl TxDescBuilder {
    /// Creates a builder using the default estimated fee.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder using the fee from `config`.
    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            fee: config.estimated_tx_fee,
            ..Self::default()
        }
    }

    /// Adds a coin to spend. Inputs are signed in the order added.
    pub fn input(mut self, input: TxInDesc) -> Self {
        self.inputs.push(input);
        self
    }

    /// Adds an output paying `value` neutrino to `address`.
    pub fn output(mut self, address: AbelAddress, value: i64) -> Self {
        self.outputs.push(TxOutDesc::new(address, value));
        self
    }

    /// Sets the fee.
    pub fn fee(mut self, fee: i64) -> Self {
        self.fee = fee;
        self
    }

    /// Sets the memo.
    pub fn memo(mut self, memo: impl Into<Bytes>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Adds one ring block, replacing any block at the same height.
    pub fn ring_block(mut self, block: TxBlockDesc) -> Self {
        self.ring_blocks.insert(block.height, block);
        self
    }

    /// Adds ring blocks keyed by height.
    pub fn ring_blocks(mut self, blocks: impl IntoIterator<Item = (i64, TxBlockDesc)>) -> Self {
        self.ring_blocks.extend(blocks);
        self
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    /// - `ValidationError` with no inputs, no outputs or a negative fee
    /// - `MissingRingBlock` if a block of some input's ring is absent
    pub fn build(self) -> Result<TxDesc> {
        if self.inputs.is_empty() {
            return Err(AbelError::ValidationError("at least one input is required".into()));
        }
        if self.outputs.is_empty() {
            return Err(AbelError::ValidationError("at least one output is required".into()));
        }
        if self.fee < 0 {
            return Err(AbelError::ValidationError(format!(
                "fee must not be negative (got {})",
                self.fee
            )));
        }

        ensure_ring_blocks_present(&self.inputs, &self.ring_blocks)?;

        Ok(TxDesc::with_memo(
            self.inputs,
            self.outputs,
            self.fee,
            self.ring_blocks,
            self.memo,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abel_core::testing::MockBackend;
    use abel_core::types::{make_short_abel_address, CoinId};

    fn recipient(backend: &MockBackend) -> AbelAddress {
        let keys = backend.identity(b"recipient");
        AbelAddress::from_crypto_address(&keys.crypto_address, 0, backend).unwrap()
    }

    fn input_at(height: i64) -> TxInDesc {
        let owner = make_short_abel_address(&[1u8; 32], &[2u8; 32], 0);
        TxInDesc::new(vec![0u8; 4], owner, CoinId::new(vec![3u8; 32], 0), height)
    }

    fn block(height: i64) -> TxBlockDesc {
        TxBlockDesc::new(vec![height as u8], height)
    }

    #[test]
    fn test_build_complete() {
        let backend = MockBackend::new();
        let desc = TxDescBuilder::new()
            .input(input_at(301))
            .output(recipient(&backend), 1_000)
            .fee(10)
            .memo(b"memo".to_vec())
            .ring_block(block(300))
            .ring_block(block(301))
            .ring_block(block(302))
            .build()
            .unwrap();

        assert_eq!(desc.tx_fee, 10);
        assert_eq!(desc.total_output_value().unwrap(), 1_000);
        assert_eq!(desc.tx_memo.as_slice(), b"memo");
        assert_eq!(desc.tx_ring_block_descs.len(), 3);
    }

    #[test]
    fn test_default_fee() {
        let backend = MockBackend::new();
        let desc = TxDescBuilder::new()
            .input(input_at(0))
            .output(recipient(&backend), 1)
            .ring_blocks((0..3).map(|h| (h, block(h))))
            .build()
            .unwrap();

        assert_eq!(desc.tx_fee, DEFAULT_ESTIMATED_TX_FEE);
        assert!(desc.tx_memo.is_empty());
    }

    #[test]
    fn test_fee_from_config() {
        let config = SdkConfig {
            estimated_tx_fee: 42,
            ..SdkConfig::default()
        };
        let backend = MockBackend::new();
        let desc = TxDescBuilder::from_config(&config)
            .input(input_at(0))
            .output(recipient(&backend), 1)
            .ring_blocks((0..3).map(|h| (h, block(h))))
            .build()
            .unwrap();

        assert_eq!(desc.tx_fee, 42);
    }

    #[test]
    fn test_rejects_no_inputs() {
        let backend = MockBackend::new();
        let result = TxDescBuilder::new().output(recipient(&backend), 1).build();
        assert!(matches!(result, Err(AbelError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_no_outputs() {
        let result = TxDescBuilder::new()
            .input(input_at(0))
            .ring_blocks((0..3).map(|h| (h, block(h))))
            .build();
        assert!(matches!(result, Err(AbelError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_negative_fee() {
        let backend = MockBackend::new();
        let result = TxDescBuilder::new()
            .input(input_at(0))
            .output(recipient(&backend), 1)
            .fee(-1)
            .ring_blocks((0..3).map(|h| (h, block(h))))
            .build();
        assert!(matches!(result, Err(AbelError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_missing_ring_block() {
        let backend = MockBackend::new();
        let result = TxDescBuilder::new()
            .input(input_at(301))
            .output(recipient(&backend), 1)
            .ring_block(block(300))
            .ring_block(block(302))
            .build();
        assert!(matches!(result, Err(AbelError::MissingRingBlock(301))));
    }
}
