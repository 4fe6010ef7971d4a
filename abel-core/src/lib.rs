//! # Abel Core
//!
//! Core types, errors, and traits for the Abel SDK.
//!
//! This crate provides the foundational building blocks used by the other
//! Abel crates:
//!
//! - **Types**: the address hierarchy, coin references, key material and
//!   transaction descriptors
//! - **Errors**: a single error enum with classification helpers
//! - **Constants**: address layout sizes, magic bytes and chain limits
//! - **Traits**: [`CryptoBackend`] for the post-quantum library and
//!   [`ChainSource`] for node access
//!
//! ## Example
//!
//! ```rust
//! use abel_core::make_short_abel_address;
//!
//! let short = make_short_abel_address(&[1u8; 32], &[2u8; 32], 3);
//! assert_eq!(short.chain_id(), 3);
//! assert!(short.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod hash;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{AbelError, Result};
pub use traits::*;
pub use types::*;
