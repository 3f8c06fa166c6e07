//! Thin client for the external orderbook HTTP API.
//!
//! Request/response wrapper only: no local caching, no retry logic. Callers
//! decide the retry cadence (the fill bot retries on its next tick).

pub mod client;
pub mod error;
pub mod types;

pub use client::OrderbookClient;
pub use error::{OrderbookError, OrderbookResult};
pub use types::{
    parse_amount, ActiveFilter, CancelAck, ExtensionRecord, OrderRecord, OrderbookStatus, Page,
    StatusResponse, SubmitAck, SubmitRequest,
};
