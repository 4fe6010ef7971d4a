//! Capability interfaces consumed by the SDK.
//!
//! The post-quantum cryptography and the node RPC live outside this
//! workspace. Both are reached through the traits below so the address
//! hierarchy and the transaction pipeline can be driven by any backend,
//! including the deterministic mock used in tests.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::error::Result;
use crate::hash::sha3_256;
use crate::types::{Bytes, OutPoint, SigningKeyBundle};

// ═══════════════════════════════════════════════════════════════════════════════
// BACKEND DATA SHAPES
// ═══════════════════════════════════════════════════════════════════════════════

/// One requested output as handed to the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxRequestOutput {
    /// Destination crypto address bytes
    pub crypto_address: Bytes,
    /// Output value in neutrino
    pub value: u64,
}

/// Raw key material produced by backend key generation.
pub struct GeneratedKeys {
    /// Crypto address bytes
    pub crypto_address: Vec<u8>,
    /// Spend secret key
    pub spend_secret_key: Zeroizing<Vec<u8>>,
    /// Serial-number (spend tracking) secret key
    pub serial_no_secret_key: Zeroizing<Vec<u8>>,
    /// View secret key
    pub view_secret_key: Zeroizing<Vec<u8>>,
}

/// Result of the signing delegation.
#[derive(Clone, Debug)]
pub struct SignedTransfer {
    /// Final serialized transaction
    pub tx_bytes: Vec<u8>,
    /// Transaction ID in the backend's internal byte order
    pub raw_txid: Vec<u8>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CRYPTO BACKEND TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface to the post-quantum ring-signature library.
///
/// Every call is synchronous and must not retain its inputs. Failures are
/// reported as [`AbelError::Backend`](crate::AbelError::Backend) and are
/// never retried by the SDK.
pub trait CryptoBackend: Send + Sync {
    /// Checks that `crypto_address` is a well-formed crypto address.
    ///
    /// `Ok(false)` and `Err(_)` both mean invalid; the error carries a diagnostic.
    fn check_crypto_address(&self, crypto_address: &[u8]) -> Result<bool>;

    /// Extracts the coin address embedded in a crypto address.
    fn extract_coin_address_from_crypto_address(&self, crypto_address: &[u8]) -> Result<Vec<u8>>;

    /// Extracts the coin address from a serialized transaction output.
    fn extract_coin_address_from_txout(&self, serialized_txout: &[u8]) -> Result<Vec<u8>>;

    /// Decodes the plaintext value of a serialized transaction output.
    ///
    /// The backend clears the key buffer while decoding, so it receives an
    /// owned throwaway copy.
    fn extract_coin_value_from_txout(
        &self,
        serialized_txout: &[u8],
        view_secret_key: Zeroizing<Vec<u8>>,
    ) -> Result<u64>;

    /// Generates a fresh key seed.
    fn generate_key_seed(&self) -> Result<Vec<u8>>;

    /// Derives a crypto address and its three secret keys from a seed.
    fn generate_keys_and_address(&self, seed: &[u8]) -> Result<GeneratedKeys>;

    /// Builds the serialized transfer request.
    ///
    /// `ring_blocks` must be in ascending height order.
    fn build_transfer_request(
        &self,
        outpoints: &[OutPoint],
        ring_blocks: &[Bytes],
        outputs: &[TxRequestOutput],
        fee: u64,
        memo: &[u8],
    ) -> Result<Vec<u8>>;

    /// Signs a transfer request with one key bundle per input, in input order.
    fn create_transfer_tx(&self, request: &[u8], keys: &[SigningKeyBundle]) -> Result<SignedTransfer>;

    /// Derives one serial number per outpoint, positionally aligned.
    ///
    /// `ring_blocks` must be in ascending height order.
    fn generate_coin_serial_numbers(
        &self,
        outpoints: &[OutPoint],
        ring_blocks: &[Bytes],
        keys: &[SigningKeyBundle],
    ) -> Result<Vec<Vec<u8>>>;

    /// Serializes an instance address: the checksum-protected payload of an
    /// Abel address.
    fn serialize_instance_address(&self, chain_id: u8, crypto_address: &[u8]) -> Vec<u8> {
        let mut serialized = Vec::with_capacity(1 + crypto_address.len());
        serialized.push(chain_id);
        serialized.extend_from_slice(crypto_address);
        serialized
    }

    /// Checksum over a serialized instance address.
    ///
    /// Must return exactly [`ADDRESS_CHECKSUM_LENGTH`](crate::constants::ADDRESS_CHECKSUM_LENGTH) bytes.
    fn address_checksum(&self, serialized_instance_address: &[u8]) -> Vec<u8> {
        sha3_256(serialized_instance_address).to_vec()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN SOURCE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface to the node: raw blocks by height in, signed transactions out.
///
/// Implementations might use:
/// - The node's JSON-RPC endpoint
/// - An in-memory chain (for testing)
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Returns the serialized block at `height`.
    async fn block_bytes_by_height(&self, height: i64) -> Result<Bytes>;

    /// Broadcasts a hex-encoded signed transaction and returns the node's txid.
    async fn send_raw_tx(&self, tx_hex: &str) -> Result<String>;
}
