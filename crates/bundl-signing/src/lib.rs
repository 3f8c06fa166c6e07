//! Key management and order signing.
//!
//! Computes the network-scoped EIP-712 order hash and signs it with a
//! locally held key. Signatures come out in the 65-byte form the orderbook
//! stores; compact conversion lives in `bundl-core`.

pub mod error;
pub mod keys;
pub mod signer;

pub use error::{KeyError, SigningError};
pub use keys::{KeyManager, KeySource};
pub use signer::{OrderDomain, OrderSigner, DOMAIN_NAME, DOMAIN_VERSION};
