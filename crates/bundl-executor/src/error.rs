//! Error types for bundl-executor.

use thiserror::Error;

/// Fill execution errors.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Core(#[from] bundl_core::CoreError),

    #[error(transparent)]
    Orderbook(#[from] bundl_orderbook::OrderbookError),

    #[error("Order record is missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid address in field {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),
}

/// Result type alias for executor operations.
pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;
