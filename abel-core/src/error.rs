//! Error types for the Abel SDK.
//!
//! Every failure is surfaced to the immediate caller as an `AbelError`;
//! nothing in the core retries or substitutes defaults.

use thiserror::Error;

use crate::types::AddressType;

/// Result type alias using `AbelError`.
pub type Result<T> = std::result::Result<T, AbelError>;

/// Main error type for all Abel SDK operations.
#[derive(Debug, Error)]
pub enum AbelError {
    // ═══════════════════════════════════════════════════════════════════════════
    // REFERENCE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// An outpoint could not be built from a hash/index pair.
    #[error("Malformed outpoint reference: {0}")]
    MalformedReference(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // BACKEND ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A cryptographic backend call failed.
    #[error("Crypto backend failed in {operation}: {reason}")]
    Backend {
        /// Backend operation that failed
        operation: &'static str,
        /// Diagnostic reported by the backend
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // ADDRESS FORMAT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Address carries no data.
    #[error("{0} data is empty")]
    EmptyAddressData(AddressType),

    /// Address carries no fingerprint.
    #[error("{0} fingerprint is empty")]
    MissingFingerprint(AddressType),

    /// Address data has the wrong length.
    #[error("{address_type} data length is not {expected} (got {actual})")]
    InvalidAddressLength {
        /// Address variant being validated
        address_type: AddressType,
        /// Required length
        expected: usize,
        /// Observed length
        actual: usize,
    },

    /// Short address does not start with the magic byte.
    #[error("ShortAbelAddress is not prefixed with 0xab (got {0:#04x})")]
    InvalidMagicPrefix(u8),

    /// Recomputed checksum disagrees with the embedded one.
    #[error("{0} checksum is not valid")]
    ChecksumMismatch(AddressType),

    /// Chain ID outside the variant's range.
    #[error("{address_type} chain id {chain_id} is not in range [0, {max}]")]
    ChainIdOutOfRange {
        /// Address variant being validated
        address_type: AddressType,
        /// Decoded chain ID
        chain_id: u8,
        /// Highest accepted chain ID
        max: u8,
    },

    /// Embedded crypto address fails the backend validity predicate.
    #[error("Crypto address is not cryptographically valid: {0}")]
    InvalidCryptoAddress(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSACTION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Coin value or fee does not fit the backend's unsigned representation.
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    /// Signer keys do not line up with the inputs of an unsigned transaction.
    #[error("Signer key {index} does not match the owner of input {index}")]
    SignerMismatch {
        /// First position whose key and owner disagree
        index: usize,
    },

    /// A ring block required by an input is missing.
    #[error("Missing ring block at height {0}")]
    MissingRingBlock(i64),

    // ═══════════════════════════════════════════════════════════════════════════
    // CHAIN SOURCE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fetching from or submitting to the chain failed.
    #[error("Chain source error: {0}")]
    ChainSource(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AbelError {
    /// Builds a backend error for the named operation.
    pub fn backend(operation: &'static str, reason: impl ToString) -> Self {
        AbelError::Backend {
            operation,
            reason: reason.to_string(),
        }
    }

    /// Returns true if retrying with the same inputs may succeed.
    ///
    /// Backend failures are deterministic and never retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AbelError::ChainSource(_))
    }

    /// Returns true if this error came from the cryptographic backend.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, AbelError::Backend { .. })
    }

    /// Returns true if this is an address or input validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AbelError::EmptyAddressData(_)
                | AbelError::MissingFingerprint(_)
                | AbelError::InvalidAddressLength { .. }
                | AbelError::InvalidMagicPrefix(_)
                | AbelError::ChecksumMismatch(_)
                | AbelError::ChainIdOutOfRange { .. }
                | AbelError::InvalidCryptoAddress(_)
                | AbelError::ValueOutOfRange(_)
                | AbelError::MalformedReference(_)
                | AbelError::ValidationError(_)
        )
    }
}
