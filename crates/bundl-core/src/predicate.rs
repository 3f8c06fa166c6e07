//! Fill predicate encoding.
//!
//! The settlement contract only understands one predicate primitive: call an
//! arbitrary target with arbitrary calldata via staticcall and treat the
//! returned word as the pass/fail gate. Business logic (here: "this folder
//! token may transfer after a timestamp") lives in the inner call; the outer
//! `arbitraryStaticCall` wrapper is what the order's extension carries.
//! An inner revert at evaluation time reads as predicate-false, not an error.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::error::{CoreError, Result};

sol! {
    function arbitraryStaticCall(address target, bytes data) external view returns (uint256);
    function isReadyToTransfer(address token, uint256 tokenId, address owner, uint256 validAfter) external view returns (uint256);
}

/// Selector of `arbitraryStaticCall(address,bytes)`.
pub const ARBITRARY_STATIC_CALL_SELECTOR: [u8; 4] = [0xbf, 0x15, 0xfc, 0xd8];

/// Time/ownership gate for a scheduled folder transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPredicate {
    /// Folder token contract.
    pub token: Address,
    /// Folder token id.
    pub token_id: U256,
    /// Expected owner at fill time.
    pub owner: Address,
    /// Earliest fill timestamp (Unix seconds).
    pub not_before: u64,
}

impl TransferPredicate {
    /// The inner condition call, before wrapping.
    pub fn inner_call(&self) -> Bytes {
        isReadyToTransferCall {
            token: self.token,
            tokenId: self.token_id,
            owner: self.owner,
            validAfter: U256::from(self.not_before),
        }
        .abi_encode()
        .into()
    }

    /// Encode the full predicate: the inner condition call wrapped in an
    /// `arbitraryStaticCall` against the predicate contract.
    pub fn encode(&self, predicate_contract: Address) -> Bytes {
        arbitraryStaticCallCall {
            target: predicate_contract,
            data: self.inner_call(),
        }
        .abi_encode()
        .into()
    }

    /// Decode a predicate back into its target contract and parameters.
    pub fn decode(bytes: &[u8]) -> Result<(Address, Self)> {
        let outer = arbitraryStaticCallCall::abi_decode(bytes, true)
            .map_err(|e| CoreError::AbiDecode(format!("outer static call: {e}")))?;
        let inner = isReadyToTransferCall::abi_decode(&outer.data, true)
            .map_err(|e| CoreError::AbiDecode(format!("inner condition call: {e}")))?;

        Ok((
            outer.target,
            Self {
                token: inner.token,
                token_id: inner.tokenId,
                owner: inner.owner,
                not_before: inner.validAfter.to::<u64>(),
            },
        ))
    }

    /// Local time gate, mirroring the on-chain clock comparison. Ownership
    /// is checked separately against the token contract.
    pub fn is_ready_at(&self, now: u64) -> bool {
        now >= self.not_before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate() -> TransferPredicate {
        TransferPredicate {
            token: Address::repeat_byte(0x01),
            token_id: U256::from(1234u32),
            owner: Address::repeat_byte(0x02),
            not_before: 1_800_000_000,
        }
    }

    #[test]
    fn outer_selector_matches_constant() {
        assert_eq!(arbitraryStaticCallCall::SELECTOR, ARBITRARY_STATIC_CALL_SELECTOR);
        let encoded = predicate().encode(Address::repeat_byte(0x03));
        assert_eq!(&encoded[..4], &ARBITRARY_STATIC_CALL_SELECTOR);
    }

    #[test]
    fn wrapping_roundtrip_preserves_inner_call() {
        let p = predicate();
        let target = Address::repeat_byte(0x03);
        let encoded = p.encode(target);

        let outer = arbitraryStaticCallCall::abi_decode(&encoded, true).unwrap();
        assert_eq!(outer.target, target);
        assert_eq!(outer.data, p.inner_call());

        let (decoded_target, decoded) = TransferPredicate::decode(&encoded).unwrap();
        assert_eq!(decoded_target, target);
        assert_eq!(decoded, p);
    }

    #[test]
    fn time_gate_flips_at_not_before() {
        let now = 1_000_000;
        let p = TransferPredicate {
            not_before: now + 3600,
            ..predicate()
        };
        assert!(!p.is_ready_at(now));
        assert!(!p.is_ready_at(now + 3599));
        assert!(p.is_ready_at(now + 3600));
        assert!(p.is_ready_at(now + 7200));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(TransferPredicate::decode(&[0x00, 0x01, 0x02]).is_err());
    }
}
