//! Wire types for the orderbook HTTP API.
//!
//! The API speaks two casing conventions: submissions are camelCase JSON,
//! stored records come back snake_case. Both shapes are pinned here so the
//! rest of the workspace never touches raw JSON.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use bundl_core::{CoreError, Extension, LimitOrder, Signature65};

/// Lifecycle states the orderbook tracks for a stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderbookStatus {
    Pending,
    Active,
    Filled,
    Cancelled,
    Expired,
}

impl OrderbookStatus {
    /// Terminal states are never filled again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Expired)
    }
}

impl std::str::FromStr for OrderbookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "ACTIVE" => Ok(Self::Active),
            "FILLED" => Ok(Self::Filled),
            "CANCELLED" => Ok(Self::Cancelled),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl std::fmt::Display for OrderbookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Filled => "FILLED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

/// Extension fields as stored by the orderbook (hex strings, possibly empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    #[serde(default)]
    pub maker_asset_suffix: String,
    #[serde(default)]
    pub taker_asset_suffix: String,
    #[serde(default)]
    pub making_amount_data: String,
    #[serde(default)]
    pub taking_amount_data: String,
    #[serde(default)]
    pub predicate: String,
    #[serde(default)]
    pub maker_permit: String,
    #[serde(default)]
    pub pre_interaction: String,
    #[serde(default)]
    pub post_interaction: String,
    #[serde(default)]
    pub custom_data: String,
}

impl ExtensionRecord {
    pub fn from_extension(extension: &Extension) -> Self {
        Self {
            maker_asset_suffix: bytes_hex(&extension.maker_asset_suffix),
            taker_asset_suffix: bytes_hex(&extension.taker_asset_suffix),
            making_amount_data: bytes_hex(&extension.making_amount_data),
            taking_amount_data: bytes_hex(&extension.taking_amount_data),
            predicate: bytes_hex(&extension.predicate),
            maker_permit: bytes_hex(&extension.maker_permit),
            pre_interaction: bytes_hex(&extension.pre_interaction),
            post_interaction: bytes_hex(&extension.post_interaction),
            custom_data: bytes_hex(&extension.custom_data),
        }
    }

    /// Rebuild the typed extension from stored hex fields.
    pub fn to_extension(&self) -> Result<Extension, CoreError> {
        Ok(Extension {
            maker_asset_suffix: parse_bytes(&self.maker_asset_suffix)?,
            taker_asset_suffix: parse_bytes(&self.taker_asset_suffix)?,
            making_amount_data: parse_bytes(&self.making_amount_data)?,
            taking_amount_data: parse_bytes(&self.taking_amount_data)?,
            predicate: parse_bytes(&self.predicate)?,
            maker_permit: parse_bytes(&self.maker_permit)?,
            pre_interaction: parse_bytes(&self.pre_interaction)?,
            post_interaction: parse_bytes(&self.post_interaction)?,
            custom_data: parse_bytes(&self.custom_data)?,
        })
    }
}

/// A stored order as the orderbook returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    pub order_hash: String,
    pub network_id: u64,
    pub maker: String,
    #[serde(default)]
    pub receiver: Option<String>,
    pub maker_asset: String,
    pub taker_asset: String,
    pub making_amount: String,
    pub taking_amount: String,
    #[serde(default)]
    pub salt: Option<String>,
    pub maker_traits: String,
    #[serde(default)]
    pub extension: Option<ExtensionRecord>,
    pub signature: String,
    pub status: OrderbookStatus,
    #[serde(default = "zero_amount")]
    pub filled_amount: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn zero_amount() -> String {
    "0".to_string()
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Extension payload inside a submission (camelCase on the wire).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionPayload {
    pub maker_asset_suffix: String,
    pub taker_asset_suffix: String,
    pub making_amount_data: String,
    pub taking_amount_data: String,
    pub predicate: String,
    pub maker_permit: String,
    pub pre_interaction: String,
    pub post_interaction: String,
    pub custom_data: String,
}

impl ExtensionPayload {
    fn from_extension(extension: &Extension) -> Self {
        Self {
            maker_asset_suffix: bytes_hex(&extension.maker_asset_suffix),
            taker_asset_suffix: bytes_hex(&extension.taker_asset_suffix),
            making_amount_data: bytes_hex(&extension.making_amount_data),
            taking_amount_data: bytes_hex(&extension.taking_amount_data),
            predicate: bytes_hex(&extension.predicate),
            maker_permit: bytes_hex(&extension.maker_permit),
            pre_interaction: bytes_hex(&extension.pre_interaction),
            post_interaction: bytes_hex(&extension.post_interaction),
            custom_data: bytes_hex(&extension.custom_data),
        }
    }
}

/// Order fields inside a submission (camelCase on the wire).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub maker: String,
    pub receiver: String,
    pub maker_asset: String,
    pub taker_asset: String,
    pub making_amount: String,
    pub taking_amount: String,
    pub salt: String,
    pub maker_traits: String,
    pub extension: ExtensionPayload,
}

/// A signed order submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub order_hash: String,
    pub signature: String,
    pub network_id: u64,
    pub data: OrderData,
}

impl SubmitRequest {
    /// Assemble the wire envelope from the typed order.
    ///
    /// Addresses go out lowercase, amounts and traits as decimal strings;
    /// that is the normal form the orderbook indexes on.
    pub fn new(
        order_hash: alloy::primitives::B256,
        signature: &Signature65,
        order: &LimitOrder,
        extension: &Extension,
        network_id: u64,
    ) -> Self {
        Self {
            order_hash: format!("0x{}", hex::encode(order_hash)),
            signature: signature.to_hex(),
            network_id,
            data: OrderData {
                maker: addr_hex(&order.maker),
                receiver: addr_hex(&order.receiver),
                maker_asset: addr_hex(&order.maker_asset),
                taker_asset: addr_hex(&order.taker_asset),
                making_amount: order.making_amount.to_string(),
                taking_amount: order.taking_amount.to_string(),
                salt: order.salt.to_string(),
                maker_traits: order.maker_traits.raw().to_string(),
                extension: ExtensionPayload::from_extension(extension),
            },
        }
    }
}

/// Acknowledgement for a submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub order: OrderRecord,
}

/// Lightweight status view of a single order (camelCase on the wire).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub order_hash: String,
    pub status: OrderbookStatus,
    #[serde(default = "zero_amount")]
    pub filled_amount: String,
}

/// Acknowledgement for a cancellation.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelAck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Server-side filters for the active-order listing.
#[derive(Debug, Clone, Default)]
pub struct ActiveFilter {
    pub maker: Option<Address>,
    pub maker_asset: Option<Address>,
    pub taker_asset: Option<Address>,
}

impl ActiveFilter {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(maker) = &self.maker {
            pairs.push(("maker", addr_hex(maker)));
        }
        if let Some(asset) = &self.maker_asset {
            pairs.push(("makerAsset", addr_hex(asset)));
        }
        if let Some(asset) = &self.taker_asset {
            pairs.push(("takerAsset", addr_hex(asset)));
        }
        pairs
    }
}

pub(crate) fn addr_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

fn bytes_hex(bytes: &Bytes) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn parse_bytes(field: &str) -> Result<Bytes, CoreError> {
    let trimmed = field.trim().trim_start_matches("0x");
    if trimmed.is_empty() {
        return Ok(Bytes::new());
    }
    Ok(Bytes::from(hex::decode(trimmed)?))
}

/// Parse a decimal amount field into a `U256`.
pub fn parse_amount(field: &str, name: &'static str) -> Result<U256, CoreError> {
    field
        .trim()
        .parse::<U256>()
        .map_err(|_| CoreError::InvalidNumber {
            field: name,
            value: field.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;
    use bundl_core::{MakerTraits, OrderFields};

    fn sample_extension() -> Extension {
        Extension::new()
            .with_maker_asset_suffix(Bytes::from(vec![0xaa; 64]))
            .with_predicate(Bytes::from(vec![0xbb; 10]))
    }

    #[test]
    fn submit_request_serializes_camel_case() {
        let extension = sample_extension();
        let order = LimitOrder::build_with_salt(
            OrderFields {
                maker: Address::repeat_byte(0x11),
                receiver: Address::repeat_byte(0x22),
                maker_asset: Address::repeat_byte(0x33),
                taker_asset: Address::repeat_byte(0x44),
                making_amount: U256::from(1u8),
                taking_amount: U256::from(100u8),
            },
            MakerTraits::new(),
            &extension,
            U256::from(7u8),
        )
        .unwrap();
        let signature = Signature65 {
            r: B256::repeat_byte(0x01),
            s: B256::repeat_byte(0x02),
            v: 27,
        };

        let request = SubmitRequest::new(B256::repeat_byte(0xcc), &signature, &order, &extension, 84532);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["networkId"], 84532);
        assert_eq!(json["orderHash"].as_str().unwrap().len(), 66);
        assert_eq!(json["data"]["makingAmount"], "1");
        assert_eq!(
            json["data"]["maker"].as_str().unwrap(),
            "0x1111111111111111111111111111111111111111"
        );
        assert_eq!(
            json["data"]["extension"]["makerAssetSuffix"]
                .as_str()
                .unwrap()
                .len(),
            2 + 128
        );
    }

    #[test]
    fn record_deserializes_snake_case() {
        let json = serde_json::json!({
            "order_hash": "0xabc",
            "network_id": 84532,
            "maker": "0x1111111111111111111111111111111111111111",
            "maker_asset": "0x2222222222222222222222222222222222222222",
            "taker_asset": "0x3333333333333333333333333333333333333333",
            "making_amount": "1",
            "taking_amount": "100",
            "maker_traits": "0",
            "signature": "0xdead",
            "status": "ACTIVE",
            "extension": { "maker_asset_suffix": "0xaaaa" }
        });

        let record: OrderRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.status, OrderbookStatus::Active);
        assert_eq!(record.filled_amount, "0");
        let extension = record.extension.unwrap().to_extension().unwrap();
        assert_eq!(extension.maker_asset_suffix.len(), 2);
    }

    #[test]
    fn extension_record_roundtrips() {
        let extension = sample_extension();
        let record = ExtensionRecord::from_extension(&extension);
        assert_eq!(record.to_extension().unwrap(), extension);
    }

    #[test]
    fn empty_hex_fields_parse_as_empty_bytes() {
        let record = ExtensionRecord {
            predicate: "0x".to_string(),
            ..Default::default()
        };
        let extension = record.to_extension().unwrap();
        assert!(extension.is_empty());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("active".parse::<OrderbookStatus>().unwrap(), OrderbookStatus::Active);
        assert_eq!("FILLED".parse::<OrderbookStatus>().unwrap(), OrderbookStatus::Filled);
        assert!("nope".parse::<OrderbookStatus>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderbookStatus::Filled.is_terminal());
        assert!(OrderbookStatus::Cancelled.is_terminal());
        assert!(OrderbookStatus::Expired.is_terminal());
        assert!(!OrderbookStatus::Active.is_terminal());
        assert!(!OrderbookStatus::Pending.is_terminal());
    }

    #[test]
    fn bad_amount_is_rejected() {
        assert!(parse_amount("not-a-number", "making_amount").is_err());
        assert_eq!(parse_amount("42", "making_amount").unwrap(), U256::from(42u8));
    }
}
