//! Scheduled folder transfer bot.
//!
//! Orchestrates the other crates end to end:
//! - maker side: build, sign and publish a disguised transfer order
//! - taker side: poll the orderbook and fill orders whose gates are open

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
