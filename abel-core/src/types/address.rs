//! Address hierarchy.
//!
//! Four layered forms share the same shape (raw data, type tag, fingerprint):
//!
//! - [`CoinAddress`]: 9504 bytes, embedded in a crypto address
//! - [`CryptoAddress`]: 10696 bytes, produced by key generation
//! - [`AbelAddress`]: 10729 bytes, `chain_id || crypto_address || checksum`
//! - [`ShortAbelAddress`]: 66 bytes, `magic || fingerprint || abel_address_hash`
//!
//! The fingerprint is SHA-256 of the coin address and is carried unchanged
//! through every layer, so all four forms of one identity share it.
//!
//! Addresses are immutable. Constructors that must ask the backend for the
//! embedded coin address are fallible; `validate` never mutates.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use super::Bytes;
use crate::constants::{
    ABEL_ADDRESS_LENGTH, ADDRESS_CHECKSUM_LENGTH, COIN_ADDRESS_LENGTH, CRYPTO_ADDRESS_LENGTH,
    DEFAULT_CHAIN_ID, FINGERPRINT_LENGTH, MAX_ABEL_ADDRESS_CHAIN_ID,
    MAX_SHORT_ABEL_ADDRESS_CHAIN_ID, SHORT_ABEL_ADDRESS_CHAIN_ID_BASE, SHORT_ABEL_ADDRESS_LENGTH,
    SHORT_ABEL_ADDRESS_MAGIC,
};
use crate::error::{AbelError, Result};
use crate::traits::CryptoBackend;

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS TYPE
// ═══════════════════════════════════════════════════════════════════════════════

/// Tag identifying an address layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    /// Untyped address
    Any,
    /// [`CoinAddress`]
    Coin,
    /// [`CryptoAddress`]
    Crypto,
    /// [`AbelAddress`]
    Abel,
    /// [`ShortAbelAddress`]
    ShortAbel,
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AddressType::Any => "AnyAddress",
            AddressType::Coin => "CoinAddress",
            AddressType::Crypto => "CryptoAddress",
            AddressType::Abel => "AbelAddress",
            AddressType::ShortAbel => "ShortAbelAddress",
        };
        f.write_str(name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BASE ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fields shared by every address layer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    data: Bytes,
    address_type: AddressType,
    fingerprint: Bytes,
}

impl Address {
    /// Creates an address from its parts.
    pub fn new(data: Bytes, address_type: AddressType, fingerprint: Bytes) -> Self {
        Self {
            data,
            address_type,
            fingerprint,
        }
    }

    /// Returns the layer tag.
    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    /// Returns the raw address bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the identity fingerprint.
    pub fn fingerprint(&self) -> &Bytes {
        &self.fingerprint
    }

    /// Returns SHA-256 of the raw address bytes.
    pub fn hash(&self) -> Bytes {
        self.data.sha256()
    }

    /// Returns the hex encoding of the raw address bytes.
    pub fn to_hex(&self) -> String {
        self.data.to_hex()
    }

    /// Checks the invariants shared by every layer: data and fingerprint present.
    pub fn validate(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(AbelError::EmptyAddressData(self.address_type));
        }

        if self.fingerprint.is_empty() {
            return Err(AbelError::MissingFingerprint(self.address_type));
        }

        Ok(())
    }

    fn check_length(&self, expected: usize) -> Result<()> {
        if self.data.len() != expected {
            return Err(AbelError::InvalidAddressLength {
                address_type: self.address_type,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{{{}|fp:{}}}",
            self.address_type,
            self.data.summary(1, 8),
            self.fingerprint.summary(0, 2)
        )
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Boilerplate shared by the concrete layers: deref to [`Address`],
/// formatting, and hex serialization of the raw data.
macro_rules! address_layer {
    ($name:ident) => {
        impl $name {
            /// Returns the untyped address.
            pub fn as_address(&self) -> &Address {
                &self.0
            }

            /// Consumes the layer and returns the untyped address.
            pub fn into_address(self) -> Address {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Address;

            fn deref(&self) -> &Address {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0.to_hex())
            }
        }
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// COIN ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// The address a coin is locked to, embedded in a crypto address.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CoinAddress(Address);

address_layer!(CoinAddress);

impl CoinAddress {
    /// Wraps coin address bytes; the fingerprint is their SHA-256.
    ///
    /// Length is checked by [`validate`](Self::validate), not here.
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let fingerprint = data.sha256();
        Self(Address::new(data, AddressType::Coin, fingerprint))
    }

    /// Extracts the coin address from a serialized transaction output.
    pub fn from_txout(serialized_txout: &[u8], backend: &dyn CryptoBackend) -> Result<Self> {
        let data = backend.extract_coin_address_from_txout(serialized_txout)?;
        Ok(Self::new(data))
    }

    /// Validates presence and the 9504-byte length.
    pub fn validate(&self) -> Result<()> {
        self.0.validate()?;
        self.0.check_length(COIN_ADDRESS_LENGTH)
    }
}

impl<'de> Deserialize<'de> for CoinAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::new(Bytes::deserialize(deserializer)?))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CRYPTO ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// The public address produced by key generation.
///
/// Its fingerprint is the fingerprint of the embedded coin address.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CryptoAddress(Address);

address_layer!(CryptoAddress);

impl CryptoAddress {
    /// Wraps crypto address bytes, deriving the fingerprint through the backend.
    ///
    /// # Errors
    /// Fails if the backend cannot extract the embedded coin address.
    pub fn new(data: impl Into<Bytes>, backend: &dyn CryptoBackend) -> Result<Self> {
        let data = data.into();
        let coin_address = coin_address_of(&data, backend)?;
        let fingerprint = coin_address.fingerprint().clone();
        Ok(Self(Address::new(data, AddressType::Crypto, fingerprint)))
    }

    /// Extracts the embedded coin address.
    pub fn coin_address(&self, backend: &dyn CryptoBackend) -> Result<CoinAddress> {
        coin_address_of(self.data(), backend)
    }

    /// Validates presence and the 10696-byte length.
    pub fn validate(&self) -> Result<()> {
        self.0.validate()?;
        self.0.check_length(CRYPTO_ADDRESS_LENGTH)
    }
}

fn coin_address_of(crypto_address: &[u8], backend: &dyn CryptoBackend) -> Result<CoinAddress> {
    let data = backend.extract_coin_address_from_crypto_address(crypto_address)?;
    Ok(CoinAddress::new(data))
}

// ═══════════════════════════════════════════════════════════════════════════════
// ABEL ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// Human-facing address.
///
/// # Structure
/// ```text
/// chain_id (1) || crypto_address (10696) || checksum (32)
/// ```
/// The checksum covers `chain_id || crypto_address`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AbelAddress(Address);

address_layer!(AbelAddress);

impl AbelAddress {
    /// Wraps raw Abel address bytes, deriving the fingerprint from the
    /// embedded crypto address.
    ///
    /// # Errors
    /// Fails if the embedded crypto address cannot be resolved by the backend.
    pub fn new(data: impl Into<Bytes>, backend: &dyn CryptoBackend) -> Result<Self> {
        let data = data.into();
        let crypto_address = CryptoAddress::new(crypto_address_slice(&data), backend)?;
        let fingerprint = crypto_address.fingerprint().clone();
        Ok(Self(Address::new(data, AddressType::Abel, fingerprint)))
    }

    /// Builds an Abel address for `crypto_address` on chain `chain_id`.
    pub fn from_crypto_address(
        crypto_address: &CryptoAddress,
        chain_id: u8,
        backend: &dyn CryptoBackend,
    ) -> Result<Self> {
        let serialized = backend.serialize_instance_address(chain_id, crypto_address.data());
        let checksum = backend.address_checksum(&serialized);
        if checksum.len() != ADDRESS_CHECKSUM_LENGTH {
            return Err(AbelError::backend(
                "address_checksum",
                format!(
                    "expected {} checksum bytes, got {}",
                    ADDRESS_CHECKSUM_LENGTH,
                    checksum.len()
                ),
            ));
        }

        let data = Bytes::concat(&[serialized.as_slice(), checksum.as_slice()]);
        Ok(Self(Address::new(
            data,
            AddressType::Abel,
            crypto_address.fingerprint().clone(),
        )))
    }

    /// Same as [`from_crypto_address`](Self::from_crypto_address) on the default chain.
    pub fn from_crypto_address_default_chain(
        crypto_address: &CryptoAddress,
        backend: &dyn CryptoBackend,
    ) -> Result<Self> {
        Self::from_crypto_address(crypto_address, DEFAULT_CHAIN_ID, backend)
    }

    /// Returns the chain ID (byte 0).
    ///
    /// Meaningful only for data that passes the base presence check.
    pub fn chain_id(&self) -> u8 {
        self.data().first().copied().unwrap_or_default()
    }

    /// Returns the embedded crypto address bytes without touching the backend.
    pub fn crypto_address_bytes(&self) -> Bytes {
        crypto_address_slice(self.data())
    }

    /// Returns the embedded crypto address with its fingerprint.
    pub fn crypto_address(&self, backend: &dyn CryptoBackend) -> Result<CryptoAddress> {
        CryptoAddress::new(self.crypto_address_bytes(), backend)
    }

    /// Returns the trailing checksum bytes.
    pub fn checksum(&self) -> Bytes {
        let data = self.data();
        if data.len() < ADDRESS_CHECKSUM_LENGTH {
            return Bytes::empty();
        }
        data.slice(data.len() - ADDRESS_CHECKSUM_LENGTH..)
    }

    /// Derives the short address committing to this exact Abel address.
    pub fn short_address(&self) -> ShortAbelAddress {
        make_short_abel_address(self.fingerprint(), &self.hash(), self.chain_id())
    }

    /// Validates the address.
    ///
    /// Checks, in order: presence, length, chain ID in `[0, 14]`, backend
    /// validity of the embedded crypto address, checksum. The first failure
    /// is returned.
    pub fn validate(&self, backend: &dyn CryptoBackend) -> Result<()> {
        self.0.validate()?;
        self.0.check_length(ABEL_ADDRESS_LENGTH)?;

        let chain_id = self.chain_id();
        if chain_id > MAX_ABEL_ADDRESS_CHAIN_ID {
            return Err(AbelError::ChainIdOutOfRange {
                address_type: AddressType::Abel,
                chain_id,
                max: MAX_ABEL_ADDRESS_CHAIN_ID,
            });
        }

        let crypto_address = self.crypto_address_bytes();
        match backend.check_crypto_address(&crypto_address) {
            Ok(true) => {}
            Ok(false) => {
                return Err(AbelError::InvalidCryptoAddress(
                    "rejected by backend".into(),
                ))
            }
            Err(e) => return Err(AbelError::InvalidCryptoAddress(e.to_string())),
        }

        let serialized = backend.serialize_instance_address(chain_id, &crypto_address);
        let expected = backend.address_checksum(&serialized);
        let checksum = self.checksum();
        if expected.len() != checksum.len() || !bool::from(checksum.ct_eq(&expected)) {
            return Err(AbelError::ChecksumMismatch(AddressType::Abel));
        }

        Ok(())
    }
}

fn crypto_address_slice(abel_address: &Bytes) -> Bytes {
    if abel_address.len() < 1 + ADDRESS_CHECKSUM_LENGTH {
        return Bytes::empty();
    }
    abel_address.slice(1..abel_address.len() - ADDRESS_CHECKSUM_LENGTH)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHORT ABEL ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fixed-size commitment to an Abel address.
///
/// # Structure
/// ```text
/// 0xAB (1) || 0xE1 + chain_id (1) || fingerprint (32) || abel_address_hash (32)
/// ```
/// It identifies an Abel address but cannot be expanded back into one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ShortAbelAddress(Address);

address_layer!(ShortAbelAddress);

impl ShortAbelAddress {
    /// Wraps raw short address bytes; the fingerprint is bytes `2..34`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let fingerprint = if data.len() >= 2 + FINGERPRINT_LENGTH {
            data.slice(2..2 + FINGERPRINT_LENGTH)
        } else {
            Bytes::empty()
        };
        Self(Address::new(data, AddressType::ShortAbel, fingerprint))
    }

    /// Returns the chain ID encoded in byte 1.
    ///
    /// Meaningful only for data that passes the length check.
    pub fn chain_id(&self) -> u8 {
        self.data()
            .get(1)
            .copied()
            .unwrap_or_default()
            .wrapping_sub(SHORT_ABEL_ADDRESS_CHAIN_ID_BASE)
    }

    /// Returns the hash of the committed Abel address (bytes `34..66`).
    pub fn abel_address_hash(&self) -> Bytes {
        if self.data().len() < SHORT_ABEL_ADDRESS_LENGTH {
            return Bytes::empty();
        }
        self.data().slice(2 + FINGERPRINT_LENGTH..SHORT_ABEL_ADDRESS_LENGTH)
    }

    /// Validates presence, the 66-byte length, the magic byte and chain ID in `[0, 15]`.
    pub fn validate(&self) -> Result<()> {
        self.0.validate()?;
        self.0.check_length(SHORT_ABEL_ADDRESS_LENGTH)?;

        let magic = self.data()[0];
        if magic != SHORT_ABEL_ADDRESS_MAGIC {
            return Err(AbelError::InvalidMagicPrefix(magic));
        }

        let chain_id = self.chain_id();
        if chain_id > MAX_SHORT_ABEL_ADDRESS_CHAIN_ID {
            return Err(AbelError::ChainIdOutOfRange {
                address_type: AddressType::ShortAbel,
                chain_id,
                max: MAX_SHORT_ABEL_ADDRESS_CHAIN_ID,
            });
        }

        Ok(())
    }
}

impl<'de> Deserialize<'de> for ShortAbelAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::new(Bytes::deserialize(deserializer)?))
    }
}

/// Builds a short address from a fingerprint, an Abel address hash and a chain ID.
pub fn make_short_abel_address(
    fingerprint: &[u8],
    abel_address_hash: &[u8],
    chain_id: u8,
) -> ShortAbelAddress {
    let mut data = Vec::with_capacity(2 + fingerprint.len() + abel_address_hash.len());
    data.push(SHORT_ABEL_ADDRESS_MAGIC);
    data.push(SHORT_ABEL_ADDRESS_CHAIN_ID_BASE.wrapping_add(chain_id));
    data.extend_from_slice(fingerprint);
    data.extend_from_slice(abel_address_hash);
    ShortAbelAddress::new(data)
}
