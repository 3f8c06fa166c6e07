//! Error types for bundl-orderbook.

use thiserror::Error;

/// Orderbook client errors.
#[derive(Debug, Error)]
pub enum OrderbookError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Orderbook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Core(#[from] bundl_core::CoreError),
}

/// Result type alias for orderbook operations.
pub type OrderbookResult<T> = std::result::Result<T, OrderbookError>;
