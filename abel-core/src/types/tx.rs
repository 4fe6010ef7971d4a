//! Transaction descriptors.
//!
//! Plain value records flowing through the assembly pipeline:
//!
//! ```text
//! TxInDesc + TxOutDesc + TxBlockDesc ──► TxDesc ──► UnsignedRawTx ──► SignedRawTx
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AbelAddress, Bytes, CoinAddress, CoinId, ShortAbelAddress};
use crate::error::{AbelError, Result};
use crate::traits::CryptoBackend;

// ═══════════════════════════════════════════════════════════════════════════════
// INPUTS
// ═══════════════════════════════════════════════════════════════════════════════

/// A spendable coin.
#[derive(Clone, Debug, Serialize)]
pub struct TxInDesc {
    /// Serialized transaction output holding the coin
    pub tx_out_data: Bytes,
    /// Claimed value in neutrino, if known
    pub coin_value: Option<i64>,
    /// Short address of the owner whose keys sign this input
    pub owner: ShortAbelAddress,
    /// Height of the block containing the coin
    pub height: i64,
    /// Hash of the transaction holding the coin
    pub tx_hash: Bytes,
    /// Output index within that transaction
    pub tx_out_index: u8,
    /// Serial number, once derived
    pub coin_serial_number: Option<Bytes>,
}

impl TxInDesc {
    /// Creates an input descriptor with unknown value and serial number.
    pub fn new(
        tx_out_data: impl Into<Bytes>,
        owner: ShortAbelAddress,
        coin_id: CoinId,
        height: i64,
    ) -> Self {
        Self {
            tx_out_data: tx_out_data.into(),
            coin_value: None,
            owner,
            height,
            tx_hash: coin_id.tx_hash,
            tx_out_index: coin_id.index,
            coin_serial_number: None,
        }
    }

    /// Sets the claimed value.
    pub fn with_value(mut self, coin_value: i64) -> Self {
        self.coin_value = Some(coin_value);
        self
    }

    /// Returns the coin being spent.
    pub fn coin_id(&self) -> CoinId {
        CoinId::new(self.tx_hash.clone(), self.tx_out_index)
    }

    /// Decodes the coin address the output is locked to.
    pub fn coin_address(&self, backend: &dyn CryptoBackend) -> Result<CoinAddress> {
        CoinAddress::from_txout(&self.tx_out_data, backend)
    }

    /// Returns the fingerprint of the owning identity.
    pub fn fingerprint(&self, backend: &dyn CryptoBackend) -> Result<Bytes> {
        Ok(self.coin_address(backend)?.fingerprint().clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUTS
// ═══════════════════════════════════════════════════════════════════════════════

/// A desired new output.
#[derive(Clone, Debug, Serialize)]
pub struct TxOutDesc {
    /// Recipient
    pub abel_address: AbelAddress,
    /// Value in neutrino
    pub coin_value: i64,
}

impl TxOutDesc {
    /// Creates an output descriptor.
    pub fn new(abel_address: AbelAddress, coin_value: i64) -> Self {
        Self {
            abel_address,
            coin_value,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RING BLOCKS
// ═══════════════════════════════════════════════════════════════════════════════

/// A historical block contributing to a ring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBlockDesc {
    /// Serialized block
    pub bin_data: Bytes,
    /// Block height
    pub height: i64,
}

impl TxBlockDesc {
    /// Creates a block descriptor.
    pub fn new(bin_data: impl Into<Bytes>, height: i64) -> Self {
        Self {
            bin_data: bin_data.into(),
            height,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSACTION DESCRIPTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything needed to build a transfer request.
#[derive(Clone, Debug, Serialize)]
pub struct TxDesc {
    /// Coins to spend, in signing order
    pub tx_in_descs: Vec<TxInDesc>,
    /// Outputs to create
    pub tx_out_descs: Vec<TxOutDesc>,
    /// Fee in neutrino
    pub tx_fee: i64,
    /// Optional memo (empty when absent)
    pub tx_memo: Bytes,
    /// Ring blocks keyed by height, in no particular order
    pub tx_ring_block_descs: HashMap<i64, TxBlockDesc>,
}

impl TxDesc {
    /// Creates a descriptor without memo.
    pub fn new(
        tx_in_descs: Vec<TxInDesc>,
        tx_out_descs: Vec<TxOutDesc>,
        tx_fee: i64,
        tx_ring_block_descs: HashMap<i64, TxBlockDesc>,
    ) -> Self {
        Self::with_memo(tx_in_descs, tx_out_descs, tx_fee, tx_ring_block_descs, Bytes::empty())
    }

    /// Creates a descriptor carrying a memo.
    pub fn with_memo(
        tx_in_descs: Vec<TxInDesc>,
        tx_out_descs: Vec<TxOutDesc>,
        tx_fee: i64,
        tx_ring_block_descs: HashMap<i64, TxBlockDesc>,
        tx_memo: Bytes,
    ) -> Self {
        Self {
            tx_in_descs,
            tx_out_descs,
            tx_fee,
            tx_memo,
            tx_ring_block_descs,
        }
    }

    /// Returns the sum of all output values.
    ///
    /// # Errors
    /// `ValueOutOfRange` if the sum does not fit in `i64`.
    pub fn total_output_value(&self) -> Result<i64> {
        self.tx_out_descs
            .iter()
            .try_fold(0i64, |total, out| total.checked_add(out.coin_value))
            .ok_or_else(|| AbelError::ValueOutOfRange("total output value overflows i64".into()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAW TRANSACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Backend transfer request paired with the addresses that must sign it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnsignedRawTx {
    /// Serialized transfer request
    pub data: Bytes,
    /// Owners of the inputs, in input order
    pub signers: Vec<ShortAbelAddress>,
}

impl UnsignedRawTx {
    /// Creates an unsigned transaction.
    pub fn new(data: impl Into<Bytes>, signers: Vec<ShortAbelAddress>) -> Self {
        Self {
            data: data.into(),
            signers,
        }
    }
}

/// Final, submittable transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRawTx {
    /// Serialized transaction
    pub data: Bytes,
    /// Transaction ID in wallet / explorer / RPC byte order
    pub txid: Bytes,
}

impl SignedRawTx {
    /// Creates a signed transaction.
    pub fn new(data: impl Into<Bytes>, txid: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            txid: txid.into(),
        }
    }

    /// Returns the transaction ID as hex.
    pub fn txid_hex(&self) -> String {
        self.txid.to_hex()
    }
}

/// Outcome of broadcasting a signed transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxSubmissionResult {
    /// The submitted transaction
    pub signed_raw_tx: SignedRawTx,
    /// When the submission was attempted
    pub submission_time: DateTime<Utc>,
    /// Whether the node accepted it
    pub success: bool,
    /// Rejection reason, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;
    use crate::types::make_short_abel_address;

    #[test]
    fn test_tx_in_desc_coin_id() {
        let owner = make_short_abel_address(&[1u8; 32], &[2u8; 32], 0);
        let desc = TxInDesc::new(vec![0u8; 4], owner, CoinId::new(vec![9u8; 32], 2), 300);

        assert_eq!(desc.coin_id(), CoinId::new(vec![9u8; 32], 2));
        assert_eq!(desc.coin_value, None);
        assert_eq!(desc.with_value(1000).coin_value, Some(1000));
    }

    #[test]
    fn test_tx_in_desc_fingerprint_from_txout() {
        let backend = MockBackend::new();
        let identity = backend.identity(b"bob");
        let txout = backend.encode_txout(&identity, 500);
        let owner = make_short_abel_address(&[0u8; 32], &[0u8; 32], 0);
        let desc = TxInDesc::new(txout, owner, CoinId::new(vec![1u8; 32], 0), 10);

        let fingerprint = desc.fingerprint(&backend).unwrap();
        assert_eq!(&fingerprint, identity.crypto_address.fingerprint());
    }

    fn recipient(backend: &MockBackend) -> AbelAddress {
        let identity = backend.identity(b"carol");
        AbelAddress::from_crypto_address(&identity.crypto_address, 0, backend).unwrap()
    }

    #[test]
    fn test_total_output_value() {
        let backend = MockBackend::new();
        let to = recipient(&backend);
        let desc = TxDesc::new(
            vec![],
            vec![TxOutDesc::new(to.clone(), 700), TxOutDesc::new(to, 300)],
            0,
            HashMap::new(),
        );
        assert_eq!(desc.total_output_value().unwrap(), 1_000);

        let empty = TxDesc::new(vec![], vec![], 0, HashMap::new());
        assert_eq!(empty.total_output_value().unwrap(), 0);
    }

    #[test]
    fn test_total_output_value_overflow() {
        let backend = MockBackend::new();
        let to = recipient(&backend);
        let desc = TxDesc::new(
            vec![],
            vec![TxOutDesc::new(to.clone(), i64::MAX), TxOutDesc::new(to, 1)],
            0,
            HashMap::new(),
        );
        assert!(matches!(
            desc.total_output_value(),
            Err(AbelError::ValueOutOfRange(_))
        ));
    }

    #[test]
    fn test_signed_raw_tx_serde() {
        let tx = SignedRawTx::new(vec![1, 2, 3], vec![0xaa; 32]);
        let json = serde_json::to_string(&tx).unwrap();
        let back: SignedRawTx = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
        assert_eq!(tx.txid_hex(), "aa".repeat(32));
    }
}
