//! Coin identifiers and records.

use serde::{Deserialize, Serialize};

use super::{AbelAddress, Bytes, ShortAbelAddress};
use crate::constants::TXID_LENGTH;
use crate::error::{AbelError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPOINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Structured reference to one output of one transaction, as the backend
/// consumes it.
///
/// `txid` is stored in internal byte order, the reverse of the hex
/// rendering shown by wallets and the node RPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Transaction hash, internal byte order
    pub txid: [u8; TXID_LENGTH],
    /// Output index within the transaction
    pub index: u8,
}

impl OutPoint {
    /// Parses a display-order hex txid.
    ///
    /// # Errors
    /// Returns `MalformedReference` for non-hex input or a hash that is not
    /// exactly 32 bytes.
    pub fn from_txid_str(txid_hex: &str, index: u8) -> Result<Self> {
        let bytes = hex::decode(txid_hex).map_err(|e| {
            AbelError::MalformedReference(format!("txid {:?} is not hex: {}", txid_hex, e))
        })?;

        if bytes.len() != TXID_LENGTH {
            return Err(AbelError::MalformedReference(format!(
                "txid must be {} bytes, got {}",
                TXID_LENGTH,
                bytes.len()
            )));
        }

        let mut txid = [0u8; TXID_LENGTH];
        for (dst, src) in txid.iter_mut().zip(bytes.iter().rev()) {
            *dst = *src;
        }

        Ok(Self { txid, index })
    }

    /// Returns the display-order hex txid.
    pub fn txid_str(&self) -> String {
        let mut display = self.txid;
        display.reverse();
        hex::encode(display)
    }
}

impl std::fmt::Display for OutPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.txid_str(), self.index)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COIN ID
// ═══════════════════════════════════════════════════════════════════════════════

/// Identifies one output of one transaction.
///
/// Ordered by `(tx_hash, index)`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoinId {
    /// Transaction hash, display byte order
    pub tx_hash: Bytes,
    /// Output index
    pub index: u8,
}

impl CoinId {
    /// Creates a coin ID.
    pub fn new(tx_hash: impl Into<Bytes>, index: u8) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            index,
        }
    }

    /// Resolves the backend outpoint from the lowercase hex of the hash.
    pub fn to_outpoint(&self) -> Result<OutPoint> {
        OutPoint::from_txid_str(&self.tx_hash.to_hex(), self.index)
    }
}

impl std::fmt::Display for CoinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_hash.to_hex(), self.index)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COIN
// ═══════════════════════════════════════════════════════════════════════════════

/// An owned coin as tracked by a wallet.
#[derive(Clone, Debug, Serialize)]
pub struct Coin {
    /// Output reference
    pub id: CoinId,
    /// Short form of the owner's address
    pub owner_short_address: Option<ShortAbelAddress>,
    /// Full owner address, when known
    pub owner_address: Option<AbelAddress>,
    /// Plaintext value in neutrino
    pub value: i64,
    /// Serial number, once derived
    pub serial_number: Option<Bytes>,
    /// Serialized transaction output
    pub tx_vout_data: Bytes,
    /// Hash of the containing block
    pub block_hash: Bytes,
    /// Height of the containing block
    pub block_height: i64,
}

impl Coin {
    /// Returns true once the coin's serial number is known.
    pub fn has_serial_number(&self) -> bool {
        self.serial_number.as_ref().is_some_and(|sn| !sn.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outpoint_reverses_display_order() {
        let mut display = [0u8; 32];
        display[0] = 0x01;
        display[31] = 0xff;

        let outpoint = OutPoint::from_txid_str(&hex::encode(display), 3).unwrap();
        assert_eq!(outpoint.txid[0], 0xff);
        assert_eq!(outpoint.txid[31], 0x01);
        assert_eq!(outpoint.index, 3);
        assert_eq!(outpoint.txid_str(), hex::encode(display));
    }

    #[test]
    fn test_outpoint_rejects_bad_hex() {
        let result = OutPoint::from_txid_str("not-hex", 0);
        assert!(matches!(result, Err(AbelError::MalformedReference(_))));
    }

    #[test]
    fn test_outpoint_rejects_wrong_length() {
        let result = OutPoint::from_txid_str(&hex::encode([0u8; 31]), 0);
        assert!(matches!(result, Err(AbelError::MalformedReference(_))));
    }

    #[test]
    fn test_coin_id_ordering() {
        let a = CoinId::new(vec![1u8; 32], 5);
        let b = CoinId::new(vec![1u8; 32], 6);
        let c = CoinId::new(vec![2u8; 32], 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_coin_id_display_and_outpoint() {
        let id = CoinId::new(vec![0xabu8; 32], 1);
        assert_eq!(id.to_string(), format!("{}:1", "ab".repeat(32)));
        assert_eq!(id.to_outpoint().unwrap().index, 1);
    }

    #[test]
    fn test_empty_coin_id_is_malformed() {
        let id = CoinId::new(Vec::new(), 0);
        assert!(matches!(id.to_outpoint(), Err(AbelError::MalformedReference(_))));
    }
}
