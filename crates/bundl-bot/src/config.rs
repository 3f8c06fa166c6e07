//! Application configuration.

use std::path::Path;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Fill loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfig {
    /// Polling interval (seconds). Default: 3600 (1 hour).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Confirmations to wait for after a fill transaction. Default: 1.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    /// Transaction confirmation timeout (seconds). Default: 120.
    #[serde(default = "default_tx_timeout_secs")]
    pub tx_timeout_secs: u64,
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_confirmations() -> u64 {
    1
}

fn default_tx_timeout_secs() -> u64 {
    120
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            confirmations: default_confirmations(),
            tx_timeout_secs: default_tx_timeout_secs(),
        }
    }
}

/// Defaults for newly created orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Delay before a created transfer becomes fillable (seconds).
    /// Default: 86400 (24 hours).
    #[serde(default = "default_transfer_delay_secs")]
    pub transfer_delay_secs: u64,
    /// Order lifetime (seconds). Default: 604800 (7 days).
    #[serde(default = "default_expiration_secs")]
    pub expiration_secs: u64,
    /// Taker asset address. Default: WETH on OP-stack chains.
    #[serde(default = "default_taker_asset")]
    pub taker_asset: String,
    /// Nominal making amount (the proxy ignores it). Default: 1.
    #[serde(default = "default_making_amount")]
    pub making_amount: String,
    /// Taking amount in taker asset wei. Default: 100.
    #[serde(default = "default_taking_amount")]
    pub taking_amount: String,
}

fn default_transfer_delay_secs() -> u64 {
    86_400
}

fn default_expiration_secs() -> u64 {
    604_800
}

fn default_taker_asset() -> String {
    "0x4200000000000000000000000000000000000006".to_string()
}

fn default_making_amount() -> String {
    "1".to_string()
}

fn default_taking_amount() -> String {
    "100".to_string()
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            transfer_delay_secs: default_transfer_delay_secs(),
            expiration_secs: default_expiration_secs(),
            taker_asset: default_taker_asset(),
            making_amount: default_making_amount(),
            taking_amount: default_taking_amount(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Orderbook service base URL.
    pub orderbook_url: String,
    /// Chain id the bot operates on. Default: 84532 (Base Sepolia).
    #[serde(default = "default_network_id")]
    pub network_id: u64,
    /// Settlement router address.
    pub settlement: String,
    /// Transfer proxy address (used as the order's maker asset).
    pub transfer_proxy: String,
    /// Folder token (ERC-721) address.
    pub folder_token: String,
    /// Predicate contract address.
    pub predicate: String,
    /// Environment variable holding the signing key.
    #[serde(default = "default_key_env_var")]
    pub key_env_var: String,
    /// Expected signer address; if set, the loaded key must derive it.
    #[serde(default)]
    pub signer_address: Option<String>,
    /// Fill loop configuration.
    #[serde(default)]
    pub fill: FillConfig,
    /// Defaults for created orders.
    #[serde(default)]
    pub order: OrderConfig,
}

fn default_network_id() -> u64 {
    84_532
}

fn default_key_env_var() -> String {
    "BUNDL_PRIVATE_KEY".to_string()
}

impl AppConfig {
    /// Load configuration, preferring `BUNDL_CONFIG` over the default path.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("BUNDL_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            Err(AppError::Config(format!(
                "Config file not found: {config_path}"
            )))
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn settlement_address(&self) -> AppResult<Address> {
        parse_address(&self.settlement, "settlement")
    }

    pub fn transfer_proxy_address(&self) -> AppResult<Address> {
        parse_address(&self.transfer_proxy, "transfer_proxy")
    }

    pub fn folder_token_address(&self) -> AppResult<Address> {
        parse_address(&self.folder_token, "folder_token")
    }

    pub fn predicate_address(&self) -> AppResult<Address> {
        parse_address(&self.predicate, "predicate")
    }

    pub fn taker_asset_address(&self) -> AppResult<Address> {
        parse_address(&self.order.taker_asset, "order.taker_asset")
    }

    pub fn expected_signer(&self) -> AppResult<Option<Address>> {
        self.signer_address
            .as_deref()
            .map(|a| parse_address(a, "signer_address"))
            .transpose()
    }
}

fn parse_address(value: &str, field: &str) -> AppResult<Address> {
    value
        .parse::<Address>()
        .map_err(|_| AppError::Config(format!("Invalid address in {field}: {value}")))
}
