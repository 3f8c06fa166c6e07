//! EIP-712 order hashing and signing.
//!
//! The order hash is domain-scoped to (chain id, settlement contract), so a
//! signature is worthless on any other network or router deployment.

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use alloy::signers::Signer as AlloySigner;
use alloy::sol;
use alloy::sol_types::{eip712_domain, SolStruct};

use bundl_core::{LimitOrder, Signature65};

use crate::error::SigningError;
use crate::keys::KeyManager;

/// EIP-712 domain constants of the settlement router.
pub const DOMAIN_NAME: &str = "1inch Aggregation Router";
pub const DOMAIN_VERSION: &str = "6";

sol! {
    #[derive(Debug)]
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
}

fn to_struct(order: &LimitOrder) -> Order {
    Order {
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

/// Network scope of an order hash.
#[derive(Debug, Clone, Copy)]
pub struct OrderDomain {
    pub chain_id: u64,
    pub settlement: Address,
}

impl OrderDomain {
    pub fn new(chain_id: u64, settlement: Address) -> Self {
        Self {
            chain_id,
            settlement,
        }
    }

    /// The EIP-712 signing hash of an order under this domain.
    ///
    /// Pure and deterministic: identical inputs always hash identically,
    /// and any field change produces a different hash.
    pub fn hash_order(&self, order: &LimitOrder) -> B256 {
        let domain = eip712_domain! {
            name: DOMAIN_NAME,
            version: DOMAIN_VERSION,
            chain_id: self.chain_id,
            verifying_contract: self.settlement,
        };
        to_struct(order).eip712_signing_hash(&domain)
    }
}

/// Signs orders with the managed key.
pub struct OrderSigner {
    key_manager: Arc<KeyManager>,
    domain: OrderDomain,
}

impl OrderSigner {
    pub fn new(key_manager: Arc<KeyManager>, domain: OrderDomain) -> Self {
        Self {
            key_manager,
            domain,
        }
    }

    pub fn address(&self) -> Address {
        self.key_manager.address()
    }

    pub fn domain(&self) -> OrderDomain {
        self.domain
    }

    /// Hash and sign an order. The result is canonical (low `s`), so the
    /// compact conversion in `bundl-core` cannot fail on it.
    pub async fn sign_order(&self, order: &LimitOrder) -> Result<Signature65, SigningError> {
        let hash = self.domain.hash_order(order);
        let signature = self.key_manager.signer().sign_hash(&hash).await?;

        Ok(Signature65 {
            r: B256::from(signature.r()),
            s: B256::from(signature.s()),
            v: if signature.v() { 28 } else { 27 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::PrimitiveSignature;
    use bundl_core::{Extension, MakerTraits, OrderFields};

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_domain() -> OrderDomain {
        OrderDomain::new(84532, Address::repeat_byte(0x7f))
    }

    fn test_order() -> LimitOrder {
        LimitOrder::build_with_salt(
            OrderFields {
                maker: Address::repeat_byte(0x11),
                receiver: Address::repeat_byte(0x22),
                maker_asset: Address::repeat_byte(0x33),
                taker_asset: Address::repeat_byte(0x44),
                making_amount: U256::from(1u8),
                taking_amount: U256::from(1u8),
            },
            MakerTraits::new().with_nonce(7),
            &Extension::new(),
            U256::from(12345u32),
        )
        .unwrap()
    }

    fn signer() -> OrderSigner {
        let bytes = hex::decode(TEST_PRIVATE_KEY).unwrap();
        let manager = Arc::new(KeyManager::from_bytes(&bytes, None).unwrap());
        OrderSigner::new(manager, test_domain())
    }

    #[test]
    fn hash_is_deterministic() {
        let order = test_order();
        let domain = test_domain();
        assert_eq!(domain.hash_order(&order), domain.hash_order(&order));
    }

    #[test]
    fn hash_is_sensitive_to_every_field() {
        let base = test_order();
        let domain = test_domain();
        let base_hash = domain.hash_order(&base);

        let mut o = base.clone();
        o.salt = o.salt + U256::from(1u8);
        assert_ne!(domain.hash_order(&o), base_hash);

        let mut o = base.clone();
        o.maker = Address::repeat_byte(0x99);
        assert_ne!(domain.hash_order(&o), base_hash);

        let mut o = base.clone();
        o.maker_asset = Address::repeat_byte(0x99);
        assert_ne!(domain.hash_order(&o), base_hash);

        let mut o = base.clone();
        o.making_amount = U256::from(2u8);
        assert_ne!(domain.hash_order(&o), base_hash);

        let mut o = base.clone();
        o.maker_traits = MakerTraits::new().with_nonce(8);
        assert_ne!(domain.hash_order(&o), base_hash);
    }

    #[test]
    fn hash_is_sensitive_to_domain() {
        let order = test_order();
        let a = test_domain();
        let b = OrderDomain::new(1, a.settlement);
        let c = OrderDomain::new(a.chain_id, Address::repeat_byte(0x01));
        assert_ne!(a.hash_order(&order), b.hash_order(&order));
        assert_ne!(a.hash_order(&order), c.hash_order(&order));
    }

    #[tokio::test]
    async fn compact_roundtrip_recovers_signer_address() {
        let signer = signer();
        let order = test_order();
        let signature = signer.sign_order(&order).await.unwrap();

        // to_compact then recombine must recover the original address.
        let recombined = signature.to_compact().unwrap().split();
        let primitive = PrimitiveSignature::new(
            U256::from_be_bytes(recombined.r.0),
            U256::from_be_bytes(recombined.s.0),
            recombined.v == 28,
        );

        let hash = signer.domain().hash_order(&order);
        let recovered = primitive.recover_address_from_prehash(&hash).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[tokio::test]
    async fn signature_parses_back_from_hex() {
        let signer = signer();
        let signature = signer.sign_order(&test_order()).await.unwrap();
        let parsed = Signature65::from_hex(&signature.to_hex()).unwrap();
        assert_eq!(parsed, signature);
    }
}
