//! Domain types for the Abel SDK.
//!
//! - [`Bytes`]: shared immutable byte buffer with hex serde
//! - [`Address`] and its layers: [`CoinAddress`], [`CryptoAddress`], [`AbelAddress`], [`ShortAbelAddress`]
//! - [`CoinId`], [`OutPoint`], [`Coin`]: references to transaction outputs
//! - [`CryptoKey`], [`CryptoKeysAndAddress`], [`SigningKeyBundle`]: key material
//! - [`TxDesc`] and friends: transaction descriptors

mod address;
mod bytes;
mod coin;
mod keys;
mod tx;

pub use address::*;
pub use bytes::*;
pub use coin::*;
pub use keys::*;
pub use tx::*;
