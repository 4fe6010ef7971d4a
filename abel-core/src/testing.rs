//! Deterministic in-process crypto backend for tests.
//!
//! `MockBackend` derives every key, address and serial number from SHAKE256
//! and SHA-256 so results are reproducible, and records each request it
//! receives so tests can assert on exactly what crossed the backend boundary.
//!
//! # Layouts
//! ```text
//! crypto address = coin_address (9504) || tail (1192)
//! txout          = coin_address (9504) || masked value (8) || view tag (8)
//! ```
//! Validity of a crypto address only checks its length, so payload
//! mutations reach the checksum comparison.

use std::collections::HashSet;

use parking_lot::Mutex;
use rand::RngCore;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::constants::{COIN_ADDRESS_LENGTH, CRYPTO_ADDRESS_LENGTH};
use crate::error::{AbelError, Result};
use crate::hash::{sha256, sha3_256, shake256};
use crate::traits::{CryptoBackend, GeneratedKeys, SignedTransfer, TxRequestOutput};
use crate::types::{Bytes, CryptoAddress, CryptoKey, CryptoKeysAndAddress, OutPoint, SigningKeyBundle};

const DOMAIN_COIN_ADDRESS: &[u8] = b"MOCK_COIN_ADDRESS";
const DOMAIN_CRYPTO_TAIL: &[u8] = b"MOCK_CRYPTO_TAIL";
const DOMAIN_SPEND_KEY: &[u8] = b"MOCK_SPEND_KEY";
const DOMAIN_SERIAL_KEY: &[u8] = b"MOCK_SERIAL_KEY";
const DOMAIN_VIEW_KEY: &[u8] = b"MOCK_VIEW_KEY";
const DOMAIN_VALUE_MASK: &[u8] = b"MOCK_VALUE_MASK";
const DOMAIN_VIEW_TAG: &[u8] = b"MOCK_VIEW_TAG";

const SECRET_KEY_LENGTH: usize = 32;
const MIN_SEED_LENGTH: usize = 32;
const TXOUT_LENGTH: usize = COIN_ADDRESS_LENGTH + 8 + 8;

/// A transfer request as received by [`MockBackend::build_transfer_request`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedTransferRequest {
    /// Outpoints being spent
    pub outpoints: Vec<OutPoint>,
    /// Ring blocks, in the order received
    pub ring_blocks: Vec<Bytes>,
    /// Requested outputs
    pub outputs: Vec<TxRequestOutput>,
    /// Fee
    pub fee: u64,
    /// Memo
    pub memo: Vec<u8>,
}

/// A serial-number request as received by [`MockBackend::generate_coin_serial_numbers`].
#[derive(Clone, Debug)]
pub struct RecordedSerialNumberRequest {
    /// Outpoints whose serial numbers were requested
    pub outpoints: Vec<OutPoint>,
    /// Ring blocks, in the order received
    pub ring_blocks: Vec<Bytes>,
    /// Key bundles received
    pub keys: Vec<SigningKeyBundle>,
}

#[derive(Serialize)]
struct MockRequestBody {
    outpoints: Vec<String>,
    ring_block_hashes: Vec<String>,
    outputs: Vec<(String, u64)>,
    fee: u64,
    memo: String,
}

/// Deterministic [`CryptoBackend`] for tests.
#[derive(Default)]
pub struct MockBackend {
    reject_crypto_addresses: bool,
    failing: HashSet<&'static str>,
    transfer_requests: Mutex<Vec<RecordedTransferRequest>>,
    serial_number_requests: Mutex<Vec<RecordedSerialNumberRequest>>,
    signed_key_counts: Mutex<Vec<usize>>,
    raw_txid_override: Option<Vec<u8>>,
    checksum_length: Option<usize>,
}

impl MockBackend {
    /// Creates a backend that accepts everything well-formed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `check_crypto_address` reject every address.
    pub fn rejecting_crypto_addresses(mut self) -> Self {
        self.reject_crypto_addresses = true;
        self
    }

    /// Makes the named operation fail with a backend error.
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Makes `create_transfer_tx` return this raw txid.
    pub fn with_raw_txid(mut self, raw_txid: Vec<u8>) -> Self {
        self.raw_txid_override = Some(raw_txid);
        self
    }

    /// Makes `address_checksum` return `length` bytes instead of 32,
    /// truncating or zero-padding the SHA3-256 digest.
    pub fn with_checksum_length(mut self, length: usize) -> Self {
        self.checksum_length = Some(length);
        self
    }

    /// Crypto address bytes derived from `label`.
    pub fn crypto_address_for_seed(&self, label: &[u8]) -> Vec<u8> {
        let mut crypto = shake256(DOMAIN_COIN_ADDRESS, label, COIN_ADDRESS_LENGTH);
        crypto.extend(shake256(
            DOMAIN_CRYPTO_TAIL,
            label,
            CRYPTO_ADDRESS_LENGTH - COIN_ADDRESS_LENGTH,
        ));
        crypto
    }

    /// Full key set derived from `label`, without the seed length check.
    pub fn identity(&self, label: &[u8]) -> CryptoKeysAndAddress {
        let crypto_address = CryptoAddress::new(self.crypto_address_for_seed(label), self)
            .expect("mock crypto address always embeds a coin address");

        CryptoKeysAndAddress {
            spend_secret_key: CryptoKey::new(shake256(DOMAIN_SPEND_KEY, label, SECRET_KEY_LENGTH)),
            serial_no_secret_key: CryptoKey::new(shake256(
                DOMAIN_SERIAL_KEY,
                label,
                SECRET_KEY_LENGTH,
            )),
            view_secret_key: CryptoKey::new(shake256(DOMAIN_VIEW_KEY, label, SECRET_KEY_LENGTH)),
            crypto_address,
        }
    }

    /// Serializes an output paying `value` to `owner`.
    pub fn encode_txout(&self, owner: &CryptoKeysAndAddress, value: u64) -> Vec<u8> {
        let coin_address = &owner.crypto_address.data()[..COIN_ADDRESS_LENGTH];
        let (mask, tag) = Self::value_mask_and_tag(owner.view_secret_key.as_bytes(), coin_address);

        let mut txout = Vec::with_capacity(TXOUT_LENGTH);
        txout.extend_from_slice(coin_address);
        txout.extend_from_slice(&(value ^ mask).to_le_bytes());
        txout.extend_from_slice(&tag);
        txout
    }

    /// Every transfer request received so far.
    pub fn transfer_requests(&self) -> Vec<RecordedTransferRequest> {
        self.transfer_requests.lock().clone()
    }

    /// Every serial-number request received so far.
    pub fn serial_number_requests(&self) -> Vec<RecordedSerialNumberRequest> {
        self.serial_number_requests.lock().clone()
    }

    /// Number of key bundles passed to each `create_transfer_tx` call.
    pub fn signed_key_counts(&self) -> Vec<usize> {
        self.signed_key_counts.lock().clone()
    }

    fn check_failure(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(operation) {
            return Err(AbelError::backend(operation, "injected failure"));
        }
        Ok(())
    }

    fn value_mask_and_tag(view_secret_key: &[u8], coin_address: &[u8]) -> (u64, [u8; 8]) {
        let input = [view_secret_key, coin_address].concat();
        let mask_bytes = shake256(DOMAIN_VALUE_MASK, &input, 8);
        let tag_bytes = shake256(DOMAIN_VIEW_TAG, &input, 8);

        let mut mask = [0u8; 8];
        mask.copy_from_slice(&mask_bytes);
        let mut tag = [0u8; 8];
        tag.copy_from_slice(&tag_bytes);
        (u64::from_le_bytes(mask), tag)
    }

    fn ring_digest(ring_blocks: &[Bytes]) -> Vec<u8> {
        ring_blocks
            .iter()
            .flat_map(|block| sha256(block))
            .collect()
    }
}

impl CryptoBackend for MockBackend {
    fn address_checksum(&self, serialized_instance_address: &[u8]) -> Vec<u8> {
        let mut checksum = sha3_256(serialized_instance_address).to_vec();
        if let Some(length) = self.checksum_length {
            checksum.resize(length, 0);
        }
        checksum
    }

    fn check_crypto_address(&self, crypto_address: &[u8]) -> Result<bool> {
        self.check_failure("check_crypto_address")?;
        Ok(!self.reject_crypto_addresses && crypto_address.len() == CRYPTO_ADDRESS_LENGTH)
    }

    fn extract_coin_address_from_crypto_address(&self, crypto_address: &[u8]) -> Result<Vec<u8>> {
        self.check_failure("extract_coin_address_from_crypto_address")?;
        if crypto_address.len() < COIN_ADDRESS_LENGTH {
            return Err(AbelError::backend(
                "extract_coin_address_from_crypto_address",
                format!("crypto address too short: {} bytes", crypto_address.len()),
            ));
        }
        Ok(crypto_address[..COIN_ADDRESS_LENGTH].to_vec())
    }

    fn extract_coin_address_from_txout(&self, serialized_txout: &[u8]) -> Result<Vec<u8>> {
        self.check_failure("extract_coin_address_from_txout")?;
        if serialized_txout.len() != TXOUT_LENGTH {
            return Err(AbelError::backend(
                "extract_coin_address_from_txout",
                format!("txout must be {} bytes, got {}", TXOUT_LENGTH, serialized_txout.len()),
            ));
        }
        Ok(serialized_txout[..COIN_ADDRESS_LENGTH].to_vec())
    }

    fn extract_coin_value_from_txout(
        &self,
        serialized_txout: &[u8],
        mut view_secret_key: Zeroizing<Vec<u8>>,
    ) -> Result<u64> {
        self.check_failure("extract_coin_value_from_txout")?;
        let coin_address = self.extract_coin_address_from_txout(serialized_txout)?;
        let (mask, tag) = Self::value_mask_and_tag(&view_secret_key, &coin_address);

        // Mirror the real library, which wipes the key buffer it was handed.
        view_secret_key.iter_mut().for_each(|b| *b = 0);

        if serialized_txout[COIN_ADDRESS_LENGTH + 8..] != tag {
            return Err(AbelError::backend(
                "extract_coin_value_from_txout",
                "view key does not open this output",
            ));
        }

        let mut masked = [0u8; 8];
        masked.copy_from_slice(&serialized_txout[COIN_ADDRESS_LENGTH..COIN_ADDRESS_LENGTH + 8]);
        Ok(u64::from_le_bytes(masked) ^ mask)
    }

    fn generate_key_seed(&self) -> Result<Vec<u8>> {
        self.check_failure("generate_key_seed")?;
        let mut seed = vec![0u8; 64];
        rand::thread_rng().fill_bytes(&mut seed);
        Ok(seed)
    }

    fn generate_keys_and_address(&self, seed: &[u8]) -> Result<GeneratedKeys> {
        self.check_failure("generate_keys_and_address")?;
        if seed.len() < MIN_SEED_LENGTH {
            return Err(AbelError::backend(
                "generate_keys_and_address",
                format!("seed must be at least {} bytes", MIN_SEED_LENGTH),
            ));
        }

        Ok(GeneratedKeys {
            crypto_address: self.crypto_address_for_seed(seed),
            spend_secret_key: Zeroizing::new(shake256(DOMAIN_SPEND_KEY, seed, SECRET_KEY_LENGTH)),
            serial_no_secret_key: Zeroizing::new(shake256(
                DOMAIN_SERIAL_KEY,
                seed,
                SECRET_KEY_LENGTH,
            )),
            view_secret_key: Zeroizing::new(shake256(DOMAIN_VIEW_KEY, seed, SECRET_KEY_LENGTH)),
        })
    }

    fn build_transfer_request(
        &self,
        outpoints: &[OutPoint],
        ring_blocks: &[Bytes],
        outputs: &[TxRequestOutput],
        fee: u64,
        memo: &[u8],
    ) -> Result<Vec<u8>> {
        self.check_failure("build_transfer_request")?;
        if outpoints.is_empty() || ring_blocks.is_empty() || outputs.is_empty() {
            return Err(AbelError::backend(
                "build_transfer_request",
                "request needs outpoints, ring blocks and outputs",
            ));
        }

        self.transfer_requests.lock().push(RecordedTransferRequest {
            outpoints: outpoints.to_vec(),
            ring_blocks: ring_blocks.to_vec(),
            outputs: outputs.to_vec(),
            fee,
            memo: memo.to_vec(),
        });

        let body = MockRequestBody {
            outpoints: outpoints.iter().map(ToString::to_string).collect(),
            ring_block_hashes: ring_blocks.iter().map(|b| hex::encode(sha256(b))).collect(),
            outputs: outputs
                .iter()
                .map(|out| (hex::encode(sha256(&out.crypto_address)), out.value))
                .collect(),
            fee,
            memo: hex::encode(memo),
        };
        Ok(serde_json::to_vec(&body)?)
    }

    fn create_transfer_tx(&self, request: &[u8], keys: &[SigningKeyBundle]) -> Result<SignedTransfer> {
        self.check_failure("create_transfer_tx")?;
        self.signed_key_counts.lock().push(keys.len());

        let mut tx_bytes = request.to_vec();
        for (i, key) in keys.iter().enumerate() {
            let spend = key.spend_secret_key.as_ref().ok_or_else(|| {
                AbelError::backend("create_transfer_tx", format!("key {} has no spend key", i))
            })?;
            if key.crypto_address.is_none() {
                return Err(AbelError::backend(
                    "create_transfer_tx",
                    format!("key {} has no crypto address", i),
                ));
            }
            tx_bytes.extend_from_slice(&sha256(spend.as_bytes()));
        }

        let raw_txid = match &self.raw_txid_override {
            Some(txid) => txid.clone(),
            None => sha256(&tx_bytes).to_vec(),
        };
        Ok(SignedTransfer { tx_bytes, raw_txid })
    }

    fn generate_coin_serial_numbers(
        &self,
        outpoints: &[OutPoint],
        ring_blocks: &[Bytes],
        keys: &[SigningKeyBundle],
    ) -> Result<Vec<Vec<u8>>> {
        self.check_failure("generate_coin_serial_numbers")?;
        self.serial_number_requests.lock().push(RecordedSerialNumberRequest {
            outpoints: outpoints.to_vec(),
            ring_blocks: ring_blocks.to_vec(),
            keys: keys.to_vec(),
        });

        if outpoints.len() != keys.len() {
            return Err(AbelError::backend(
                "generate_coin_serial_numbers",
                format!("{} outpoints but {} keys", outpoints.len(), keys.len()),
            ));
        }

        let ring = Self::ring_digest(ring_blocks);
        outpoints
            .iter()
            .zip(keys)
            .map(|(outpoint, key)| {
                let serial_key = key.serial_no_secret_key.as_ref().ok_or_else(|| {
                    AbelError::backend("generate_coin_serial_numbers", "missing serial key")
                })?;
                let mut input = serial_key.as_bytes().to_vec();
                input.extend_from_slice(&outpoint.txid);
                input.push(outpoint.index);
                input.extend_from_slice(&ring);
                Ok(sha256(&input).to_vec())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_deterministic() {
        let backend = MockBackend::new();
        let a = backend.identity(b"alice");
        let b = backend.identity(b"alice");
        assert_eq!(a.crypto_address, b.crypto_address);
        assert_eq!(a.view_secret_key, b.view_secret_key);
        assert_ne!(a.crypto_address, backend.identity(b"bob").crypto_address);
    }

    #[test]
    fn test_txout_value_roundtrip() {
        let backend = MockBackend::new();
        let alice = backend.identity(b"alice");
        let txout = backend.encode_txout(&alice, 42);

        let key = Zeroizing::new(alice.view_secret_key.as_bytes().to_vec());
        assert_eq!(backend.extract_coin_value_from_txout(&txout, key).unwrap(), 42);
    }

    #[test]
    fn test_txout_wrong_view_key() {
        let backend = MockBackend::new();
        let alice = backend.identity(b"alice");
        let bob = backend.identity(b"bob");
        let txout = backend.encode_txout(&alice, 42);

        let key = Zeroizing::new(bob.view_secret_key.as_bytes().to_vec());
        assert!(backend.extract_coin_value_from_txout(&txout, key).is_err());
    }

    #[test]
    fn test_injected_failure() {
        let backend = MockBackend::new().failing_on("generate_key_seed");
        assert!(matches!(
            backend.generate_key_seed(),
            Err(AbelError::Backend { operation: "generate_key_seed", .. })
        ));
    }
}
