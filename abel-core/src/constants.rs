//! Protocol constants for the Abel address hierarchy.
//!
//! Address lengths are fixed by the post-quantum key scheme and must match
//! the node implementation byte for byte.

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS LENGTHS
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a coin address in bytes (embedded in every crypto address).
pub const COIN_ADDRESS_LENGTH: usize = 9504;

/// Size of a crypto address in bytes, as produced by key generation.
pub const CRYPTO_ADDRESS_LENGTH: usize = 10696;

/// Size of the checksum trailing every human-facing address.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 32;

/// Size of a human-facing Abel address in bytes.
/// chain_id (1) || crypto_address (10696) || checksum (32) = 10729 bytes
pub const ABEL_ADDRESS_LENGTH: usize = 1 + CRYPTO_ADDRESS_LENGTH + ADDRESS_CHECKSUM_LENGTH;

/// Size of an address fingerprint (SHA-256 of the coin address).
pub const FINGERPRINT_LENGTH: usize = 32;

/// Size of the Abel address hash carried by a short address.
pub const ADDRESS_HASH_LENGTH: usize = 32;

/// Size of a short Abel address in bytes.
/// magic (2) || fingerprint (32) || abel_address_hash (32) = 66 bytes
pub const SHORT_ABEL_ADDRESS_LENGTH: usize = 2 + FINGERPRINT_LENGTH + ADDRESS_HASH_LENGTH;

// ═══════════════════════════════════════════════════════════════════════════════
// SHORT ADDRESS MAGIC
// ═══════════════════════════════════════════════════════════════════════════════

/// First byte of every short Abel address.
pub const SHORT_ABEL_ADDRESS_MAGIC: u8 = 0xAB;

/// Base of the second magic byte; the chain ID is added to it.
pub const SHORT_ABEL_ADDRESS_CHAIN_ID_BASE: u8 = 0xE1;

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN IDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Chain ID used when none is given.
pub const DEFAULT_CHAIN_ID: u8 = 0x00;

/// Highest chain ID accepted by an Abel address.
pub const MAX_ABEL_ADDRESS_CHAIN_ID: u8 = 14;

/// Highest chain ID accepted by a short Abel address.
///
/// One wider than [`MAX_ABEL_ADDRESS_CHAIN_ID`]; node software accepts both
/// ranges as they are, so the two limits are kept separate.
pub const MAX_SHORT_ABEL_ADDRESS_CHAIN_ID: u8 = 15;

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of consecutive blocks forming one ring group.
pub const RING_GROUP_SIZE: i64 = 3;

/// Size of a transaction hash / ID in bytes.
pub const TXID_LENGTH: usize = 32;

/// Default fee estimate in neutrino (0.1 ABEL).
pub const DEFAULT_ESTIMATED_TX_FEE: i64 = 1_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Environment toggle enabling debug logging.
pub const ENV_DEBUG: &str = "ABELSDK_DEBUG";

/// Environment variable overriding the default chain ID.
pub const ENV_CHAIN_ID: &str = "ABELSDK_CHAIN_ID";

/// Environment variable overriding the estimated transaction fee.
pub const ENV_TX_FEE: &str = "ABELSDK_TX_FEE";
