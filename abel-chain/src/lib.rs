//! # Abel Chain
//!
//! Chain sources for the Abel SDK.
//!
//! - **Memory**: an in-process chain holding blocks by height and recording
//!   submitted transactions, for tests and offline assembly
//!
//! ## Example
//!
//! ```rust,ignore
//! use abel_chain::{ChainSource, MemoryChain};
//!
//! let chain = MemoryChain::new();
//! chain.insert_block(300, block_bytes);
//!
//! let block = chain.block_bytes_by_height(300).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;

pub use memory::MemoryChain;

// Re-export the trait from core
pub use abel_core::traits::ChainSource;
