//! The limit order record and its status lifecycle.

use alloy::primitives::{Address, U256};
use rand::Rng;

use crate::error::{CoreError, Result};
use crate::extension::{uint160_max, Extension};
use crate::traits::MakerTraits;

/// Core order fields supplied by the maker.
///
/// For a disguised folder transfer, `maker_asset` is the transfer proxy
/// address and the amounts are nominal; the real token id lives in the
/// extension's maker asset suffix.
#[derive(Debug, Clone)]
pub struct OrderFields {
    pub maker: Address,
    pub receiver: Address,
    pub maker_asset: Address,
    pub taker_asset: Address,
    pub making_amount: U256,
    pub taking_amount: U256,
}

/// A limit order as hashed, signed and settled on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrder {
    pub salt: U256,
    pub maker: Address,
    pub receiver: Address,
    pub maker_asset: Address,
    pub taker_asset: Address,
    pub making_amount: U256,
    pub taking_amount: U256,
    pub maker_traits: MakerTraits,
}

impl LimitOrder {
    /// Assemble an order from its fields, traits and extension.
    ///
    /// When the extension is non-empty this sets the HAS_EXTENSION traits
    /// flag and embeds the 160-bit extension hash fragment into the salt.
    /// Traits that claim an extension without one are rejected rather than
    /// silently emitting an order the settlement contract cannot fill.
    pub fn build(
        fields: OrderFields,
        traits: MakerTraits,
        extension: &Extension,
    ) -> Result<Self> {
        let base_salt = U256::from(rand::thread_rng().gen::<u128>() >> 32);
        Self::build_with_salt(fields, traits, extension, base_salt)
    }

    /// `build` with an explicit 96-bit base salt, for deterministic tests.
    pub fn build_with_salt(
        fields: OrderFields,
        traits: MakerTraits,
        extension: &Extension,
        base_salt: U256,
    ) -> Result<Self> {
        let (salt, maker_traits) = if extension.is_empty() {
            if traits.has_extension() {
                return Err(CoreError::InconsistentOrder(
                    "HAS_EXTENSION flag set but extension is empty".to_string(),
                ));
            }
            (base_salt, traits)
        } else {
            let salt = (base_salt << 160) | extension.salt_fragment();
            (salt, traits.with_extension())
        };

        Ok(Self {
            salt,
            maker: fields.maker,
            receiver: fields.receiver,
            maker_asset: fields.maker_asset,
            taker_asset: fields.taker_asset,
            making_amount: fields.making_amount,
            taking_amount: fields.taking_amount,
            maker_traits,
        })
    }

    /// Check the salt/extension coupling: the low 160 bits of the salt must
    /// equal the extension hash fragment (or the extension must be empty).
    pub fn extension_matches(&self, extension: &Extension) -> bool {
        if extension.is_empty() {
            !self.maker_traits.has_extension()
        } else {
            self.maker_traits.has_extension()
                && (self.salt & uint160_max()) == extension.salt_fragment()
        }
    }
}

// =============================================================================
// Status lifecycle
// =============================================================================

/// Order lifecycle: Unsigned -> Signed -> Submitted -> terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Unsigned,
    Signed,
    Submitted,
    Filled,
    Cancelled,
    Expired,
}

impl OrderStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Expired)
    }

    /// Validate a transition, returning the new status.
    pub fn transition(self, to: OrderStatus) -> Result<OrderStatus> {
        let ok = matches!(
            (self, to),
            (Self::Unsigned, Self::Signed)
                | (Self::Signed, Self::Submitted)
                | (Self::Submitted, Self::Filled)
                | (Self::Submitted, Self::Cancelled)
                | (Self::Submitted, Self::Expired)
        );
        if ok {
            Ok(to)
        } else {
            Err(CoreError::InvalidTransition { from: self, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;

    fn fields() -> OrderFields {
        OrderFields {
            maker: Address::repeat_byte(0x11),
            receiver: Address::repeat_byte(0x22),
            maker_asset: Address::repeat_byte(0x33),
            taker_asset: Address::repeat_byte(0x44),
            making_amount: U256::from(1u8),
            taking_amount: U256::from(1u8),
        }
    }

    #[test]
    fn build_with_extension_sets_flag_and_salt_fragment() {
        let ext = Extension::new().with_predicate(Bytes::from(vec![0xab; 8]));
        let order = LimitOrder::build_with_salt(
            fields(),
            MakerTraits::new(),
            &ext,
            U256::from(7u8),
        )
        .unwrap();

        assert!(order.maker_traits.has_extension());
        assert_eq!(order.salt >> 160, U256::from(7u8));
        assert!(order.extension_matches(&ext));
    }

    #[test]
    fn build_without_extension_keeps_plain_salt() {
        let ext = Extension::new();
        let order = LimitOrder::build_with_salt(
            fields(),
            MakerTraits::new().with_nonce(3),
            &ext,
            U256::from(99u8),
        )
        .unwrap();

        assert!(!order.maker_traits.has_extension());
        assert_eq!(order.salt, U256::from(99u8));
        assert!(order.extension_matches(&ext));
    }

    #[test]
    fn build_rejects_flag_without_extension() {
        let err = LimitOrder::build_with_salt(
            fields(),
            MakerTraits::new().with_extension(),
            &Extension::new(),
            U256::from(1u8),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InconsistentOrder(_)));
    }

    #[test]
    fn extension_mismatch_is_detected() {
        let ext = Extension::new().with_predicate(Bytes::from(vec![1, 2, 3]));
        let other = Extension::new().with_predicate(Bytes::from(vec![4, 5, 6]));
        let order =
            LimitOrder::build_with_salt(fields(), MakerTraits::new(), &ext, U256::from(1u8))
                .unwrap();
        assert!(!order.extension_matches(&other));
    }

    #[test]
    fn status_happy_path() {
        let status = OrderStatus::Unsigned
            .transition(OrderStatus::Signed)
            .unwrap()
            .transition(OrderStatus::Submitted)
            .unwrap()
            .transition(OrderStatus::Filled)
            .unwrap();
        assert!(status.is_terminal());
    }

    #[test]
    fn terminal_states_are_final() {
        for terminal in [
            OrderStatus::Filled,
            OrderStatus::Cancelled,
            OrderStatus::Expired,
        ] {
            assert!(terminal.transition(OrderStatus::Submitted).is_err());
            assert!(terminal.transition(OrderStatus::Signed).is_err());
        }
    }

    #[test]
    fn cannot_skip_signing() {
        assert!(OrderStatus::Unsigned
            .transition(OrderStatus::Submitted)
            .is_err());
    }
}
