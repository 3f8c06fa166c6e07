//! On-chain interfaces of the settlement router and the folder token.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ISettlement {
        struct Order {
            uint256 salt;
            address maker;
            address receiver;
            address makerAsset;
            address takerAsset;
            uint256 makingAmount;
            uint256 takingAmount;
            uint256 makerTraits;
        }

        function fillOrderArgs(
            Order calldata order,
            bytes32 r,
            bytes32 vs,
            uint256 amount,
            uint256 takerTraits,
            bytes calldata args
        ) external payable returns (uint256 makingAmount, uint256 takingAmount, bytes32 orderHash);

        function checkPredicate(bytes calldata predicate) external view returns (bool);

        function hashOrder(Order calldata order) external view returns (bytes32);

        function remainingInvalidatorForOrder(address maker, bytes32 orderHash)
            external view returns (uint256);

        error PredicateIsNotTrue();
        error OrderExpired();
        error TransferFromMakerToTakerFailed();
        error BadSignature();
        error InvalidatedOrder();
    }

    #[sol(rpc)]
    interface IERC721 {
        function ownerOf(uint256 tokenId) external view returns (address);
        function getApproved(uint256 tokenId) external view returns (address);
        function isApprovedForAll(address owner, address operator) external view returns (bool);
        function approve(address to, uint256 tokenId) external;
    }
}

/// Revert selector of `PredicateIsNotTrue()`. Fills hitting it are retried
/// on a later tick; the predicate may simply not be true yet.
pub const PREDICATE_IS_NOT_TRUE_SELECTOR: [u8; 4] = [0xb6, 0x62, 0x9c, 0x02];

impl From<&bundl_core::LimitOrder> for ISettlement::Order {
    fn from(order: &bundl_core::LimitOrder) -> Self {
        Self {
            salt: order.salt,
            maker: order.maker,
            receiver: order.receiver,
            makerAsset: order.maker_asset,
            takerAsset: order.taker_asset,
            makingAmount: order.making_amount,
            takingAmount: order.taking_amount,
            makerTraits: order.maker_traits.raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolError;

    #[test]
    fn predicate_revert_selector_matches_abi() {
        assert_eq!(ISettlement::PredicateIsNotTrue::SELECTOR, PREDICATE_IS_NOT_TRUE_SELECTOR);
    }
}
