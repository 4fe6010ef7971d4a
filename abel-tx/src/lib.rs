//! # Abel Transactions
//!
//! Assembly, signing and submission of Abel transfer transactions.
//!
//! This crate provides:
//!
//! - **Assembler**: `TxDesc` to unsigned request to signed transaction
//! - **Builder**: validated construction of `TxDesc`
//! - **Chain**: ring-block fetching and submission through a `ChainSource`
//! - **Config / Logging**: environment-driven settings and `tracing` setup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use abel_tx::{fetch_ring_block_descs, generate_signed_raw_tx,
//!               generate_unsigned_raw_tx, submit_signed_raw_tx, TxDescBuilder};
//!
//! let ring = fetch_ring_block_descs(&chain, &[coin.clone()]).await?;
//! let desc = TxDescBuilder::new()
//!     .input(coin)
//!     .output(recipient, 1_000)
//!     .fee(10)
//!     .ring_blocks(ring)
//!     .build()?;
//!
//! let unsigned = generate_unsigned_raw_tx(&backend, &desc)?;
//! let signed = generate_signed_raw_tx(&backend, &unsigned, &[my_keys])?;
//! let result = submit_signed_raw_tx(&chain, &signed).await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod assembler;
pub mod builder;
pub mod chain;
pub mod config;
pub mod logging;

pub use assembler::{generate_signed_raw_tx, generate_unsigned_raw_tx};
pub use builder::TxDescBuilder;
pub use chain::{fetch_ring_block_descs, submit_signed_raw_tx};
pub use config::SdkConfig;
pub use logging::init_logging;
