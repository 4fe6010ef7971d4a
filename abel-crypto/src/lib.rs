//! # Abel Crypto
//!
//! Delegations to the post-quantum cryptographic backend.
//!
//! This crate provides:
//!
//! - **Keys**: key seed and key generation
//! - **Txout**: coin address and value decoding from serialized outputs
//! - **Ring**: ring-group heights and ascending-height block ordering
//! - **Serial**: coin serial-number derivation
//!
//! Every function takes the backend as `&dyn CryptoBackend`; none keeps
//! state between calls.
//!
//! ## Example
//!
//! ```rust
//! use abel_crypto::get_ring_block_heights;
//!
//! assert_eq!(get_ring_block_heights(301).unwrap(), [300, 301, 302]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod keys;
pub mod ring;
pub mod serial;
pub mod txout;

// Re-export main functions at crate root
pub use keys::{generate_crypto_keys_and_address, generate_safe_crypto_seed};
pub use ring::{
    ensure_ring_blocks_present, get_ring_block_heights, ring_block_heights_for_inputs,
    serialized_blocks_for_ring_group,
};
pub use serial::decode_coin_serial_numbers;
pub use txout::{decode_coin_address_from_txout, decode_value_from_txout};
