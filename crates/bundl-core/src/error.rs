//! Error types for bundl-core.

use thiserror::Error;

use crate::order::OrderStatus;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Failed to decode hex: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid signature length: expected {expected} hex chars, got {actual}")]
    SignatureLength { expected: usize, actual: usize },

    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("Non-canonical signature: s has its high bit set")]
    NonCanonicalS,

    #[error("Suffix length mismatch: expected {expected} bytes, got {actual}")]
    SuffixLength { expected: usize, actual: usize },

    #[error("Calldata decode failed: {0}")]
    AbiDecode(String),

    #[error("Inconsistent order: {0}")]
    InconsistentOrder(String),

    #[error("Invalid numeric field {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
