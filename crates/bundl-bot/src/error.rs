//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Key error: {0}")]
    Key(#[from] bundl_signing::KeyError),

    #[error("Signing error: {0}")]
    Signing(#[from] bundl_signing::SigningError),

    #[error("Order error: {0}")]
    Core(#[from] bundl_core::CoreError),

    #[error("Orderbook error: {0}")]
    Orderbook(#[from] bundl_orderbook::OrderbookError),

    #[error("Executor error: {0}")]
    Executor(#[from] bundl_executor::ExecutorError),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
