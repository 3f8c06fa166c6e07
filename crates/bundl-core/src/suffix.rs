//! Maker asset suffix: a non-fungible transfer disguised as a fungible one.
//!
//! The settlement contract always assembles `transferFrom(from, to, amount)`
//! calldata for the maker asset and appends the order's maker asset suffix.
//! The transfer proxy exposes a function whose obfuscated name was mined so
//! its 4-byte selector equals the fungible `transferFrom` selector but whose
//! parameter list continues with `(..., uint256 tokenId, address token)`.
//! Dispatch is selector-only; if the layouts ever drift apart the proxy
//! silently misdecodes instead of reverting. The constants below pin the
//! layout and are verified by tests.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::error::{CoreError, Result};

sol! {
    function func_60iHVgK(address from, address to, uint256 amount, uint256 tokenId, address token) external;
}

/// Selector of both `transferFrom(address,address,uint256)` and the proxy
/// function above. The collision is mandatory.
pub const TRANSFER_FROM_SELECTOR: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];

/// Bytes the settlement contract supplies itself: selector plus the three
/// shared `transferFrom` words.
pub const SUFFIX_PREFIX_LEN: usize = 4 + 3 * 32;

/// Suffix length: the `tokenId` and `token` words.
pub const SUFFIX_LEN: usize = 2 * 32;

/// Parameters of the disguised transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    pub from: Address,
    pub to: Address,
    /// Nominal; the proxy ignores it for non-fungible transfers.
    pub amount: U256,
    pub token_id: U256,
    pub token: Address,
}

/// Encode the full proxy call for the given transfer.
pub fn encode_transfer_call(params: &TransferParams) -> Bytes {
    func_60iHVgKCall {
        from: params.from,
        to: params.to,
        amount: params.amount,
        tokenId: params.token_id,
        token: params.token,
    }
    .abi_encode()
    .into()
}

/// Decode a full proxy call back into its transfer parameters.
pub fn decode_transfer_call(data: &[u8]) -> Result<TransferParams> {
    let call = func_60iHVgKCall::abi_decode(data, true)
        .map_err(|e| CoreError::AbiDecode(format!("transfer call: {e}")))?;
    Ok(TransferParams {
        from: call.from,
        to: call.to,
        amount: call.amount,
        token_id: call.tokenId,
        token: call.token,
    })
}

/// Build the maker asset suffix: the encoded proxy call with the shared
/// prefix stripped. Exactly `SUFFIX_LEN` bytes for this call shape.
pub fn encode_maker_asset_suffix(params: &TransferParams) -> Bytes {
    let full = encode_transfer_call(params);
    debug_assert_eq!(&full[..4], &TRANSFER_FROM_SELECTOR);
    Bytes::copy_from_slice(&full[SUFFIX_PREFIX_LEN..])
}

/// Recover `(tokenId, token)` from a maker asset suffix.
pub fn decode_maker_asset_suffix(suffix: &[u8]) -> Result<(U256, Address)> {
    if suffix.len() != SUFFIX_LEN {
        return Err(CoreError::SuffixLength {
            expected: SUFFIX_LEN,
            actual: suffix.len(),
        });
    }
    let token_id = U256::from_be_slice(&suffix[..32]);
    let token = Address::from_slice(&suffix[44..64]);
    Ok((token_id, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TransferParams {
        TransferParams {
            from: Address::repeat_byte(0x0a),
            to: Address::repeat_byte(0x0b),
            amount: U256::ZERO,
            token_id: U256::from(42u8),
            token: Address::repeat_byte(0x0c),
        }
    }

    #[test]
    fn selector_collides_with_transfer_from() {
        // keccak("func_60iHVgK(address,address,uint256,uint256,address)")[..4]
        // == keccak("transferFrom(address,address,uint256)")[..4]
        assert_eq!(func_60iHVgKCall::SELECTOR, TRANSFER_FROM_SELECTOR);
        let full = encode_transfer_call(&params());
        assert_eq!(&full[..4], &TRANSFER_FROM_SELECTOR);
    }

    #[test]
    fn suffix_is_the_two_trailing_words() {
        let p = params();
        let suffix = encode_maker_asset_suffix(&p);
        assert_eq!(suffix.len(), SUFFIX_LEN);

        let (token_id, token) = decode_maker_asset_suffix(&suffix).unwrap();
        assert_eq!(token_id, p.token_id);
        assert_eq!(token, p.token);
    }

    #[test]
    fn full_call_roundtrip_recovers_receiver() {
        let p = params();
        let decoded = decode_transfer_call(&encode_transfer_call(&p)).unwrap();
        assert_eq!(decoded, p);
        assert_eq!(decoded.to, Address::repeat_byte(0x0b));
    }

    #[test]
    fn wrong_length_suffix_is_rejected() {
        let err = decode_maker_asset_suffix(&[0u8; 63]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SuffixLength {
                expected: 64,
                actual: 63
            }
        ));
    }
}
