//! Maker and taker traits bitfields.
//!
//! Both traits are single 256-bit words interpreted by the settlement
//! contract. The layouts follow the v4 limit-order protocol:
//!
//! MakerTraits (high to low):
//! - bit 255: no partial fills
//! - bit 254: allow multiple fills
//! - bit 252: pre-interaction call
//! - bit 251: post-interaction call
//! - bit 250: check epoch manager
//! - bit 249: HAS_EXTENSION
//! - bit 248: use permit2
//! - bit 247: unwrap WETH
//! - bits 160..200: series, bits 120..160: nonce, bits 80..120: expiration
//! - bits 0..80: low 10 bytes of the allowed sender
//!
//! TakerTraits (high to low):
//! - bit 255: amount is making amount
//! - bit 254: unwrap WETH
//! - bit 253: skip maker permit
//! - bit 252: use permit2
//! - bit 251: args contain a target address
//! - bits 224..248: extension length, bits 200..224: interaction length
//! - bits 0..185: threshold amount

use alloy::primitives::{Address, Bytes, U256};

const HAS_EXTENSION_FLAG: usize = 249;

const EXPIRATION_SHIFT: usize = 80;
const NONCE_SHIFT: usize = 120;
const UINT_40_MASK: u64 = (1 << 40) - 1;

const SKIP_ORDER_PERMIT_FLAG: usize = 253;
const ARGS_HAS_TARGET_FLAG: usize = 251;
const ARGS_EXTENSION_LENGTH_SHIFT: usize = 224;
const ARGS_INTERACTION_LENGTH_SHIFT: usize = 200;

fn flag(bit: usize) -> U256 {
    U256::from(1u8) << bit
}

// =============================================================================
// MakerTraits
// =============================================================================

/// Maker preferences packed into the order's `makerTraits` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MakerTraits(U256);

impl MakerTraits {
    /// Empty traits: any sender, no expiration, no extension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a raw traits word (e.g. parsed from an orderbook record).
    pub fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// The raw 256-bit word as the settlement contract consumes it.
    pub fn raw(&self) -> U256 {
        self.0
    }

    /// Set the expiration timestamp (Unix seconds, 40-bit).
    #[must_use]
    pub fn with_expiration(self, timestamp: u64) -> Self {
        Self(set_window(self.0, EXPIRATION_SHIFT, timestamp & UINT_40_MASK))
    }

    /// Set the 40-bit order nonce.
    #[must_use]
    pub fn with_nonce(self, nonce: u64) -> Self {
        Self(set_window(self.0, NONCE_SHIFT, nonce & UINT_40_MASK))
    }

    /// Set the HAS_EXTENSION flag.
    ///
    /// The settlement contract ignores attached extension bytes unless this
    /// flag is set, so `LimitOrder::build` sets it automatically.
    #[must_use]
    pub fn with_extension(self) -> Self {
        Self(self.0 | flag(HAS_EXTENSION_FLAG))
    }

    /// Whether the order declares an attached extension.
    pub fn has_extension(&self) -> bool {
        self.0.bit(HAS_EXTENSION_FLAG)
    }

    /// Expiration timestamp, or `None` when the order never expires.
    pub fn expiration(&self) -> Option<u64> {
        let value = window(self.0, EXPIRATION_SHIFT);
        (value != 0).then_some(value)
    }

    /// The 40-bit nonce.
    pub fn nonce(&self) -> u64 {
        window(self.0, NONCE_SHIFT)
    }

    /// Whether the order is expired at `now` (Unix seconds).
    pub fn is_expired(&self, now: u64) -> bool {
        matches!(self.expiration(), Some(exp) if exp < now)
    }
}

fn set_window(word: U256, shift: usize, value: u64) -> U256 {
    let mask = U256::from(UINT_40_MASK) << shift;
    (word & !mask) | (U256::from(value) << shift)
}

fn window(word: U256, shift: usize) -> u64 {
    ((word >> shift) & U256::from(UINT_40_MASK)).to::<u64>()
}

// =============================================================================
// TakerTraits
// =============================================================================

/// Taker-side fill parameters: a traits word plus the trailing `args` bytes.
///
/// The args layout is positional: optional 20-byte target, then the extension
/// echo, then interaction data. The traits word carries the lengths so the
/// settlement contract can split args back apart.
#[derive(Debug, Clone, Default)]
pub struct TakerTraits {
    flags: U256,
    target: Option<Address>,
    extension: Bytes,
    interaction: Bytes,
}

impl TakerTraits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the maker asset to `target` instead of the caller.
    #[must_use]
    pub fn with_target(mut self, target: Address) -> Self {
        self.target = Some(target);
        self
    }

    /// Skip the maker permit embedded in the order, if any.
    #[must_use]
    pub fn skip_order_permit(mut self) -> Self {
        self.flags |= flag(SKIP_ORDER_PERMIT_FLAG);
        self
    }

    /// Echo the order's extension bytes; mandatory for extension-bearing
    /// orders because the contract only stores the extension hash.
    #[must_use]
    pub fn with_extension(mut self, extension: Bytes) -> Self {
        self.extension = extension;
        self
    }

    /// Append taker interaction calldata.
    #[must_use]
    pub fn with_interaction(mut self, interaction: Bytes) -> Self {
        self.interaction = interaction;
        self
    }

    /// Produce the `(takerTraits, args)` pair for `fillOrderArgs`.
    pub fn encode(&self) -> (U256, Bytes) {
        let mut traits = self.flags;
        let mut args = Vec::new();

        if let Some(target) = self.target {
            traits |= flag(ARGS_HAS_TARGET_FLAG);
            args.extend_from_slice(target.as_slice());
        }
        if !self.extension.is_empty() {
            traits |= U256::from(self.extension.len()) << ARGS_EXTENSION_LENGTH_SHIFT;
            args.extend_from_slice(&self.extension);
        }
        if !self.interaction.is_empty() {
            traits |= U256::from(self.interaction.len()) << ARGS_INTERACTION_LENGTH_SHIFT;
            args.extend_from_slice(&self.interaction);
        }

        (traits, Bytes::from(args))
    }
}
