//! Transaction assembly.
//!
//! ## Flow
//!
//! ```text
//! TxDesc
//!   │  outpoints (hex tx hash + index)
//!   │  ring blocks (ascending height)
//!   │  outputs (crypto address, u64 value)
//!   ▼
//! generate_unsigned_raw_tx ──► UnsignedRawTx { request, signers }
//!                                         │  signer keys, same order as signers
//!                                         ▼
//!                         generate_signed_raw_tx ──► SignedRawTx { data, txid }
//! ```
//!
//! The backend returns the txid in internal byte order; it is reversed here,
//! once, into the order used by wallets, explorers and the node RPC.

use tracing::{debug, info, instrument, warn};

use abel_core::error::{AbelError, Result};
use abel_core::traits::{CryptoBackend, TxRequestOutput};
use abel_core::types::{
    Bytes, CryptoKeysAndAddress, OutPoint, SignedRawTx, SigningKeyBundle, TxDesc, UnsignedRawTx,
};
use abel_crypto::ring::serialized_blocks_for_ring_group;

// ═══════════════════════════════════════════════════════════════════════════════
// UNSIGNED
// ═══════════════════════════════════════════════════════════════════════════════

/// Builds the backend transfer request for `tx_desc`.
///
/// The returned `signers` list holds the input owners in input order;
/// [`generate_signed_raw_tx`] expects keys in exactly that order.
///
/// # Errors
/// - `MalformedReference` if an input's tx hash is not a 32-byte txid
/// - `ValueOutOfRange` for a negative output value or fee
/// - `Backend` if the request cannot be built
#[instrument(skip_all, fields(
    inputs = tx_desc.tx_in_descs.len(),
    outputs = tx_desc.tx_out_descs.len(),
    fee = tx_desc.tx_fee,
))]
pub fn generate_unsigned_raw_tx(
    backend: &dyn CryptoBackend,
    tx_desc: &TxDesc,
) -> Result<UnsignedRawTx> {
    let outpoints = tx_desc
        .tx_in_descs
        .iter()
        .map(|input| input.coin_id().to_outpoint())
        .collect::<Result<Vec<OutPoint>>>()?;

    let ring_blocks = serialized_blocks_for_ring_group(&tx_desc.tx_ring_block_descs);

    let outputs = tx_desc
        .tx_out_descs
        .iter()
        .map(|output| {
            Ok(TxRequestOutput {
                crypto_address: output.abel_address.crypto_address_bytes(),
                value: to_backend_value(output.coin_value, "output value")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let fee = to_backend_value(tx_desc.tx_fee, "fee")?;

    let request = backend.build_transfer_request(
        &outpoints,
        &ring_blocks,
        &outputs,
        fee,
        &tx_desc.tx_memo,
    )?;

    let signers = tx_desc
        .tx_in_descs
        .iter()
        .map(|input| input.owner.clone())
        .collect();

    debug!(request_len = request.len(), "built transfer request");
    Ok(UnsignedRawTx::new(request, signers))
}

/// Converts a signed coin value to the backend's unsigned representation.
fn to_backend_value(value: i64, what: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| AbelError::ValueOutOfRange(format!("{} must not be negative (got {})", what, value)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIGNED
// ═══════════════════════════════════════════════════════════════════════════════

/// Signs `unsigned` with one key set per input.
///
/// `signer_keys[i]` must belong to `unsigned.signers[i]`. This is checked by
/// fingerprint before anything reaches the backend.
///
/// # Errors
/// - `SignerMismatch` if the key count or any key's owner is wrong
/// - `Backend` if signing fails
#[instrument(skip_all, fields(signers = unsigned.signers.len()))]
pub fn generate_signed_raw_tx(
    backend: &dyn CryptoBackend,
    unsigned: &UnsignedRawTx,
    signer_keys: &[CryptoKeysAndAddress],
) -> Result<SignedRawTx> {
    verify_signers(unsigned, signer_keys)?;

    let bundles: Vec<SigningKeyBundle> = signer_keys
        .iter()
        .map(CryptoKeysAndAddress::signing_bundle)
        .collect();

    let signed = backend.create_transfer_tx(&unsigned.data, &bundles)?;
    let txid = Bytes::from(signed.raw_txid).reversed();

    info!(txid = %txid, "signed transaction");
    Ok(SignedRawTx::new(signed.tx_bytes, txid))
}

fn verify_signers(unsigned: &UnsignedRawTx, signer_keys: &[CryptoKeysAndAddress]) -> Result<()> {
    if signer_keys.len() != unsigned.signers.len() {
        warn!(
            expected = unsigned.signers.len(),
            actual = signer_keys.len(),
            "signer key count mismatch"
        );
        return Err(AbelError::SignerMismatch {
            index: signer_keys.len().min(unsigned.signers.len()),
        });
    }

    for (index, (signer, keys)) in unsigned.signers.iter().zip(signer_keys).enumerate() {
        if signer.fingerprint() != keys.crypto_address.fingerprint() {
            warn!(index, signer = %signer, "signer key does not own input");
            return Err(AbelError::SignerMismatch { index });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use abel_core::testing::MockBackend;
    use abel_core::types::{AbelAddress, CoinId, TxBlockDesc, TxInDesc, TxOutDesc};

    struct Party {
        keys: CryptoKeysAndAddress,
        address: AbelAddress,
    }

    fn party(backend: &MockBackend, label: &[u8]) -> Party {
        let keys = backend.identity(label);
        let address = AbelAddress::from_crypto_address(&keys.crypto_address, 0, backend).unwrap();
        Party { keys, address }
    }

    fn input(backend: &MockBackend, owner: &Party, tx_hash: u8, height: i64) -> TxInDesc {
        let txout = backend.encode_txout(&owner.keys, 5_000);
        TxInDesc::new(
            txout,
            owner.address.short_address(),
            CoinId::new(vec![tx_hash; 32], 0),
            height,
        )
        .with_value(5_000)
    }

    fn ring(heights: &[i64]) -> HashMap<i64, TxBlockDesc> {
        heights
            .iter()
            .map(|&h| (h, TxBlockDesc::new(h.to_be_bytes().to_vec(), h)))
            .collect()
    }

    #[test]
    fn test_end_to_end_height_300() {
        let backend = MockBackend::new();
        let alice = party(&backend, b"alice");
        let bob = party(&backend, b"bob");

        // Insert out of order; the request must still see 300, 301, 302.
        let desc = TxDesc::new(
            vec![input(&backend, &alice, 0x11, 300)],
            vec![TxOutDesc::new(bob.address.clone(), 1_000)],
            10,
            ring(&[302, 300, 301]),
        );

        let unsigned = generate_unsigned_raw_tx(&backend, &desc).unwrap();
        assert_eq!(unsigned.signers, vec![alice.address.short_address()]);

        let requests = backend.transfer_requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];

        let heights: Vec<i64> = request
            .ring_blocks
            .iter()
            .map(|b| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(b);
                i64::from_be_bytes(buf)
            })
            .collect();
        assert_eq!(heights, vec![300, 301, 302]);

        assert_eq!(request.outputs.len(), 1);
        assert_eq!(request.outputs[0].crypto_address, bob.address.crypto_address_bytes());
        assert_eq!(request.outputs[0].value, 1_000);
        assert_eq!(request.fee, 10);
        assert!(request.memo.is_empty());
        assert_eq!(
            request.outpoints,
            vec![CoinId::new(vec![0x11; 32], 0).to_outpoint().unwrap()]
        );
    }

    #[test]
    fn test_signers_follow_input_order() {
        let backend = MockBackend::new();
        let alice = party(&backend, b"alice");
        let bob = party(&backend, b"bob");
        let carol = party(&backend, b"carol");

        let desc = TxDesc::new(
            vec![
                input(&backend, &bob, 1, 30),
                input(&backend, &alice, 2, 31),
                input(&backend, &carol, 3, 32),
            ],
            vec![TxOutDesc::new(alice.address.clone(), 100)],
            0,
            ring(&[30, 31, 32]),
        );

        let unsigned = generate_unsigned_raw_tx(&backend, &desc).unwrap();
        assert_eq!(
            unsigned.signers,
            vec![
                bob.address.short_address(),
                alice.address.short_address(),
                carol.address.short_address(),
            ]
        );
    }

    #[test]
    fn test_memo_passed_through() {
        let backend = MockBackend::new();
        let alice = party(&backend, b"alice");

        let desc = TxDesc::with_memo(
            vec![input(&backend, &alice, 1, 3)],
            vec![TxOutDesc::new(alice.address.clone(), 1)],
            1,
            ring(&[3, 4, 5]),
            Bytes::from(b"hello".to_vec()),
        );

        generate_unsigned_raw_tx(&backend, &desc).unwrap();
        assert_eq!(backend.transfer_requests()[0].memo, b"hello".to_vec());
    }

    #[test]
    fn test_negative_output_value_rejected() {
        let backend = MockBackend::new();
        let alice = party(&backend, b"alice");

        let desc = TxDesc::new(
            vec![input(&backend, &alice, 1, 3)],
            vec![TxOutDesc::new(alice.address.clone(), -1)],
            1,
            ring(&[3, 4, 5]),
        );

        let result = generate_unsigned_raw_tx(&backend, &desc);
        assert!(matches!(result, Err(AbelError::ValueOutOfRange(_))));
        assert!(backend.transfer_requests().is_empty());
    }

    #[test]
    fn test_negative_fee_rejected() {
        let backend = MockBackend::new();
        let alice = party(&backend, b"alice");

        let desc = TxDesc::new(
            vec![input(&backend, &alice, 1, 3)],
            vec![TxOutDesc::new(alice.address.clone(), 1)],
            -10,
            ring(&[3, 4, 5]),
        );

        let result = generate_unsigned_raw_tx(&backend, &desc);
        assert!(matches!(result, Err(AbelError::ValueOutOfRange(_))));
    }

    #[test]
    fn test_malformed_input_reference() {
        let backend = MockBackend::new();
        let alice = party(&backend, b"alice");
        let mut bad = input(&backend, &alice, 1, 3);
        bad.tx_hash = Bytes::from(vec![1u8; 31]);

        let desc = TxDesc::new(
            vec![bad],
            vec![TxOutDesc::new(alice.address.clone(), 1)],
            1,
            ring(&[3, 4, 5]),
        );

        let result = generate_unsigned_raw_tx(&backend, &desc);
        assert!(matches!(result, Err(AbelError::MalformedReference(_))));
    }

    #[test]
    fn test_backend_failure_returns_no_tx() {
        let backend = MockBackend::new().failing_on("build_transfer_request");
        let alice = party(&backend, b"alice");

        let desc = TxDesc::new(
            vec![input(&backend, &alice, 1, 3)],
            vec![TxOutDesc::new(alice.address.clone(), 1)],
            1,
            ring(&[3, 4, 5]),
        );

        let err = generate_unsigned_raw_tx(&backend, &desc).unwrap_err();
        assert!(err.is_backend_error());
    }

    #[test]
    fn test_txid_is_reversed_once() {
        let raw_txid: Vec<u8> = (0u8..32).collect();
        let backend = MockBackend::new().with_raw_txid(raw_txid.clone());
        let alice = party(&backend, b"alice");

        let desc = TxDesc::new(
            vec![input(&backend, &alice, 1, 3)],
            vec![TxOutDesc::new(alice.address.clone(), 1)],
            1,
            ring(&[3, 4, 5]),
        );
        let unsigned = generate_unsigned_raw_tx(&backend, &desc).unwrap();
        let signed = generate_signed_raw_tx(&backend, &unsigned, &[alice.keys.clone()]).unwrap();

        let mut expected = raw_txid;
        expected.reverse();
        assert_eq!(signed.txid.as_slice(), expected.as_slice());
        assert!(!signed.data.is_empty());
    }

    #[test]
    fn test_reordered_signer_keys_fail() {
        let backend = MockBackend::new();
        let alice = party(&backend, b"alice");
        let bob = party(&backend, b"bob");

        let desc = TxDesc::new(
            vec![input(&backend, &alice, 1, 3), input(&backend, &bob, 2, 4)],
            vec![TxOutDesc::new(alice.address.clone(), 1)],
            1,
            ring(&[3, 4, 5]),
        );
        let unsigned = generate_unsigned_raw_tx(&backend, &desc).unwrap();

        let result =
            generate_signed_raw_tx(&backend, &unsigned, &[bob.keys.clone(), alice.keys.clone()]);
        assert!(matches!(result, Err(AbelError::SignerMismatch { index: 0 })));
        assert!(backend.signed_key_counts().is_empty());

        let signed =
            generate_signed_raw_tx(&backend, &unsigned, &[alice.keys.clone(), bob.keys.clone()]);
        assert!(signed.is_ok());
        assert_eq!(backend.signed_key_counts(), vec![2]);
    }

    #[test]
    fn test_missing_signer_key_fails() {
        let backend = MockBackend::new();
        let alice = party(&backend, b"alice");
        let bob = party(&backend, b"bob");

        let desc = TxDesc::new(
            vec![input(&backend, &alice, 1, 3), input(&backend, &bob, 2, 4)],
            vec![TxOutDesc::new(alice.address.clone(), 1)],
            1,
            ring(&[3, 4, 5]),
        );
        let unsigned = generate_unsigned_raw_tx(&backend, &desc).unwrap();

        let result = generate_signed_raw_tx(&backend, &unsigned, &[alice.keys.clone()]);
        assert!(matches!(result, Err(AbelError::SignerMismatch { index: 1 })));
    }
}
