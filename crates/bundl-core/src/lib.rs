//! Core domain types for the Bundl scheduled-transfer system.
//!
//! This crate provides the building blocks shared by the maker and taker
//! sides:
//! - `LimitOrder`: the signed order record and its status lifecycle
//! - `MakerTraits`, `TakerTraits`: settlement-contract bitfields
//! - `Extension`: auxiliary order payload (predicate, asset suffixes, hooks)
//! - Predicate and asset-suffix calldata codecs
//! - Compact (EIP-2098) signature conversion

pub mod error;
pub mod extension;
pub mod order;
pub mod predicate;
pub mod signature;
pub mod suffix;
pub mod traits;

pub use error::{CoreError, Result};
pub use extension::Extension;
pub use order::{LimitOrder, OrderFields, OrderStatus};
pub use predicate::{TransferPredicate, ARBITRARY_STATIC_CALL_SELECTOR};
pub use signature::{CompactSignature, Signature65, SIGNATURE_HEX_LEN};
pub use suffix::{
    decode_maker_asset_suffix, decode_transfer_call, encode_maker_asset_suffix,
    encode_transfer_call, TransferParams, SUFFIX_LEN, SUFFIX_PREFIX_LEN, TRANSFER_FROM_SELECTOR,
};
pub use traits::{MakerTraits, TakerTraits};
