//! Order extension payload and its packed encoding.
//!
//! An extension carries everything beyond the order's eight core fields:
//! asset suffixes, amount-calculation data, the fill predicate, a maker
//! permit, interaction hooks and free-form custom data. The settlement
//! contract does not store the extension; it stores a 160-bit hash fragment
//! inside the order salt and the taker echoes the full bytes at fill time.

use alloy::primitives::{keccak256, Bytes, B256, U256};

/// Auxiliary order payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extension {
    pub maker_asset_suffix: Bytes,
    pub taker_asset_suffix: Bytes,
    pub making_amount_data: Bytes,
    pub taking_amount_data: Bytes,
    pub predicate: Bytes,
    pub maker_permit: Bytes,
    pub pre_interaction: Bytes,
    pub post_interaction: Bytes,
    pub custom_data: Bytes,
}

impl Extension {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Bytes) -> Self {
        self.predicate = predicate;
        self
    }

    #[must_use]
    pub fn with_maker_asset_suffix(mut self, suffix: Bytes) -> Self {
        self.maker_asset_suffix = suffix;
        self
    }

    /// True when every field is empty; an empty extension encodes to zero
    /// bytes and needs no HAS_EXTENSION flag.
    pub fn is_empty(&self) -> bool {
        self.offset_fields().iter().all(|f| f.is_empty()) && self.custom_data.is_empty()
    }

    /// The eight fields covered by the offsets header, in protocol order.
    fn offset_fields(&self) -> [&Bytes; 8] {
        [
            &self.maker_asset_suffix,
            &self.taker_asset_suffix,
            &self.making_amount_data,
            &self.taking_amount_data,
            &self.predicate,
            &self.maker_permit,
            &self.pre_interaction,
            &self.post_interaction,
        ]
    }

    /// Encode to the wire layout the settlement contract expects: one
    /// 32-byte word of packed cumulative end offsets (field 0 in the lowest
    /// 32 bits), the concatenated fields, then custom data.
    pub fn encode(&self) -> Bytes {
        if self.is_empty() {
            return Bytes::new();
        }

        let fields = self.offset_fields();
        let mut offsets = U256::ZERO;
        let mut end: u32 = 0;
        let mut body = Vec::new();

        for (i, field) in fields.iter().enumerate() {
            end += field.len() as u32;
            offsets |= U256::from(end) << (32 * i);
            body.extend_from_slice(field);
        }

        let mut out = Vec::with_capacity(32 + body.len() + self.custom_data.len());
        out.extend_from_slice(&offsets.to_be_bytes::<32>());
        out.extend_from_slice(&body);
        out.extend_from_slice(&self.custom_data);
        Bytes::from(out)
    }

    /// keccak256 of the encoded extension.
    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }

    /// Low 160 bits of the extension hash. The order salt must embed this
    /// fragment or the settlement contract rejects the order as tampered.
    pub fn salt_fragment(&self) -> U256 {
        U256::from_be_bytes(self.hash().0) & uint160_max()
    }
}

pub(crate) fn uint160_max() -> U256 {
    (U256::from(1u8) << 160) - U256::from(1u8)
}
