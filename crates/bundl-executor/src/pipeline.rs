//! The two-stage fill pipeline.
//!
//! `prepare_fill` turns a stored orderbook record into calldata-ready form
//! without any chain access, so every structural rejection (already filled,
//! expired, malformed signature, tampered salt) is decided before an RPC is
//! spent. `FillExecutor` then runs the on-chain checks and settles.

use std::marker::PhantomData;
use std::time::Duration;

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::Provider;
use alloy::transports::Transport;
use tracing::{debug, info, warn};

use bundl_core::{
    decode_maker_asset_suffix, CompactSignature, CoreError, Extension, LimitOrder, MakerTraits,
    Signature65, TakerTraits, TransferPredicate,
};
use bundl_orderbook::{parse_amount, OrderRecord, OrderbookStatus};

use crate::contracts::{ISettlement, IERC721};
use crate::error::{ExecutorError, ExecutorResult};

/// Why an order was passed over without an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyFilled { filled_amount: String },
    NotActive { status: OrderbookStatus },
    WrongNetwork { expected: u64, actual: u64 },
    Expired { expiration: u64 },
    NotYetFillable { not_before: u64 },
    OwnershipMismatch { owner: Address, maker: Address },
    MissingApproval,
    PredicateFalse,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyFilled { filled_amount } => {
                write!(f, "already filled ({filled_amount})")
            }
            Self::NotActive { status } => write!(f, "status {status} is terminal"),
            Self::WrongNetwork { expected, actual } => {
                write!(f, "network {actual}, bot serves {expected}")
            }
            Self::Expired { expiration } => write!(f, "expired at {expiration}"),
            Self::NotYetFillable { not_before } => {
                write!(f, "not fillable before {not_before}")
            }
            Self::OwnershipMismatch { owner, maker } => {
                write!(f, "token owned by {owner}, order maker is {maker}")
            }
            Self::MissingApproval => f.write_str("proxy not approved for the token"),
            Self::PredicateFalse => f.write_str("predicate evaluated false"),
        }
    }
}

/// Result of attempting one order.
#[derive(Debug, Clone)]
pub enum OrderOutcome {
    Filled {
        order_hash: String,
        tx_hash: TxHash,
    },
    Skipped {
        order_hash: String,
        reason: SkipReason,
    },
    Failed {
        order_hash: String,
        reason: String,
        retryable: bool,
    },
}

/// The predicate embedded in an order's extension, decoded for local checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateCheck {
    pub contract: Address,
    pub predicate: TransferPredicate,
}

/// A record validated and encoded down to `fillOrderArgs` parameters.
#[derive(Debug, Clone)]
pub struct PreparedFill {
    pub order_hash: String,
    pub order: LimitOrder,
    pub extension: Extension,
    pub token: Address,
    pub token_id: U256,
    pub predicate: Option<PredicateCheck>,
    pub compact: CompactSignature,
    pub amount: U256,
    pub taker_traits: U256,
    pub args: Bytes,
}

/// Outcome of the pure preparation stage.
#[derive(Debug, Clone)]
pub enum Prepared {
    Ready(Box<PreparedFill>),
    Skip(SkipReason),
}

/// Validate a stored record and encode the fill parameters.
///
/// Checks run cheapest-first; the filled-amount short circuit comes before
/// any parsing so a stale record costs nothing. Structural defects (bad
/// signature, salt not committing to the extension) are errors rather than
/// skips: they cannot heal on a later tick.
pub fn prepare_fill(
    record: &OrderRecord,
    network_id: u64,
    taker: Address,
    now: u64,
) -> ExecutorResult<Prepared> {
    let filled = parse_amount(&record.filled_amount, "filled_amount")?;
    if filled != U256::ZERO {
        return Ok(Prepared::Skip(SkipReason::AlreadyFilled {
            filled_amount: record.filled_amount.clone(),
        }));
    }
    if record.status.is_terminal() {
        return Ok(Prepared::Skip(SkipReason::NotActive {
            status: record.status,
        }));
    }
    if record.network_id != network_id {
        return Ok(Prepared::Skip(SkipReason::WrongNetwork {
            expected: network_id,
            actual: record.network_id,
        }));
    }

    let maker_traits = MakerTraits::from_raw(parse_amount(&record.maker_traits, "maker_traits")?);
    if maker_traits.is_expired(now) {
        return Ok(Prepared::Skip(SkipReason::Expired {
            expiration: maker_traits.expiration().unwrap_or_default(),
        }));
    }

    let salt_field = record
        .salt
        .as_deref()
        .ok_or(ExecutorError::MissingField("salt"))?;
    let receiver = match record.receiver.as_deref() {
        Some(r) => parse_address(r, "receiver")?,
        None => Address::ZERO,
    };
    let order = LimitOrder {
        salt: parse_amount(salt_field, "salt")?,
        maker: parse_address(&record.maker, "maker")?,
        receiver,
        maker_asset: parse_address(&record.maker_asset, "maker_asset")?,
        taker_asset: parse_address(&record.taker_asset, "taker_asset")?,
        making_amount: parse_amount(&record.making_amount, "making_amount")?,
        taking_amount: parse_amount(&record.taking_amount, "taking_amount")?,
        maker_traits,
    };

    let extension = match record.extension.as_ref() {
        Some(record) => record.to_extension()?,
        None => Extension::new(),
    };
    if !order.extension_matches(&extension) {
        return Err(CoreError::InconsistentOrder(
            "salt does not commit to the stored extension".to_string(),
        )
        .into());
    }

    let (token_id, token) = decode_maker_asset_suffix(&extension.maker_asset_suffix)?;

    let predicate = if extension.predicate.is_empty() {
        None
    } else {
        let (contract, predicate) = TransferPredicate::decode(&extension.predicate)?;
        if !predicate.is_ready_at(now) {
            return Ok(Prepared::Skip(SkipReason::NotYetFillable {
                not_before: predicate.not_before,
            }));
        }
        Some(PredicateCheck {
            contract,
            predicate,
        })
    };

    let compact = Signature65::from_hex(&record.signature)?.to_compact()?;

    // The maker asset goes to the order's receiver when one is named; the
    // bot only takes delivery itself for receiver-less orders.
    let target = if order.receiver == Address::ZERO {
        taker
    } else {
        order.receiver
    };
    let (taker_traits, args) = TakerTraits::new()
        .with_target(target)
        .skip_order_permit()
        .with_extension(extension.encode())
        .encode();

    Ok(Prepared::Ready(Box::new(PreparedFill {
        order_hash: record.order_hash.clone(),
        amount: order.taking_amount,
        order,
        extension,
        token,
        token_id,
        predicate,
        compact,
        taker_traits,
        args,
    })))
}

fn parse_address(value: &str, field: &'static str) -> ExecutorResult<Address> {
    value
        .parse::<Address>()
        .map_err(|_| ExecutorError::InvalidAddress {
            field,
            value: value.to_string(),
        })
}

/// Whether a send-time revert is worth retrying on a later tick.
///
/// `PredicateIsNotTrue` means the gate is not open yet; everything else is
/// structural and will revert again.
pub fn classify_revert(message: &str) -> bool {
    message.contains("PredicateIsNotTrue") || message.contains("b6629c02")
}

/// Runs the on-chain half of the pipeline: ownership, approval, predicate
/// dry-run, then the fill transaction.
pub struct FillExecutor<T, P> {
    provider: P,
    settlement: Address,
    confirmations: u64,
    tx_timeout: Duration,
    _transport: PhantomData<T>,
}

impl<T, P> FillExecutor<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Clone,
{
    pub fn new(provider: P, settlement: Address, confirmations: u64, tx_timeout: Duration) -> Self {
        Self {
            provider,
            settlement,
            confirmations,
            tx_timeout,
            _transport: PhantomData,
        }
    }

    /// Attempt one prepared fill.
    ///
    /// Chain-state misses (ownership moved, approval revoked, predicate
    /// still false) come back as `Skipped`; they may resolve by the next
    /// tick. Only transport problems surface as errors.
    pub async fn execute(&self, prepared: PreparedFill) -> ExecutorResult<OrderOutcome> {
        let order_hash = prepared.order_hash.clone();
        let token = IERC721::new(prepared.token, self.provider.clone());

        let owner = token
            .ownerOf(prepared.token_id)
            .call()
            .await
            .map_err(|e| ExecutorError::Rpc(e.to_string()))?
            ._0;
        if owner != prepared.order.maker {
            return Ok(OrderOutcome::Skipped {
                order_hash,
                reason: SkipReason::OwnershipMismatch {
                    owner,
                    maker: prepared.order.maker,
                },
            });
        }

        // The proxy (the order's maker asset) must be able to move the token.
        let proxy = prepared.order.maker_asset;
        let approved = token
            .getApproved(prepared.token_id)
            .call()
            .await
            .map_err(|e| ExecutorError::Rpc(e.to_string()))?
            ._0;
        if approved != proxy {
            let all = token
                .isApprovedForAll(prepared.order.maker, proxy)
                .call()
                .await
                .map_err(|e| ExecutorError::Rpc(e.to_string()))?
                ._0;
            if !all {
                return Ok(OrderOutcome::Skipped {
                    order_hash,
                    reason: SkipReason::MissingApproval,
                });
            }
        }

        let settlement = ISettlement::new(self.settlement, self.provider.clone());

        if prepared.predicate.is_some() {
            // Dry-run through the router's own evaluator. A revert inside the
            // static call reads as predicate-false, not as an error.
            match settlement
                .checkPredicate(prepared.extension.predicate.clone())
                .call()
                .await
            {
                Ok(ret) if ret._0 => {}
                Ok(_) | Err(_) => {
                    debug!(order_hash, "Predicate not satisfied on-chain");
                    return Ok(OrderOutcome::Skipped {
                        order_hash,
                        reason: SkipReason::PredicateFalse,
                    });
                }
            }
        }

        let call = settlement.fillOrderArgs(
            (&prepared.order).into(),
            prepared.compact.r,
            prepared.compact.vs,
            prepared.amount,
            prepared.taker_traits,
            prepared.args.clone(),
        );

        let pending = match call.send().await {
            Ok(pending) => pending,
            Err(e) => {
                let reason = e.to_string();
                let retryable = classify_revert(&reason);
                warn!(order_hash, retryable, %reason, "Fill rejected at send");
                return Ok(OrderOutcome::Failed {
                    order_hash,
                    reason,
                    retryable,
                });
            }
        };

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.tx_timeout))
            .get_receipt()
            .await
            .map_err(|e| ExecutorError::Transaction(e.to_string()))?;

        if !receipt.status() {
            warn!(order_hash, tx_hash = %receipt.transaction_hash, "Fill reverted on-chain");
            return Ok(OrderOutcome::Failed {
                order_hash,
                reason: format!("reverted in {}", receipt.transaction_hash),
                retryable: false,
            });
        }

        info!(order_hash, tx_hash = %receipt.transaction_hash, "Order filled");
        Ok(OrderOutcome::Filled {
            order_hash,
            tx_hash: receipt.transaction_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;
    use bundl_core::{encode_maker_asset_suffix, OrderFields, TransferParams};
    use bundl_orderbook::ExtensionRecord;

    const NETWORK: u64 = 84532;
    const NOW: u64 = 1_800_000_000;

    fn taker() -> Address {
        Address::repeat_byte(0xee)
    }

    fn valid_signature_hex() -> String {
        let sig = Signature65 {
            r: B256::repeat_byte(0x11),
            s: B256::from_slice(&{
                let mut s = [0x22u8; 32];
                s[0] = 0x12;
                s
            }),
            v: 27,
        };
        sig.to_hex()
    }

    fn build_extension(not_before: u64) -> Extension {
        let maker = Address::repeat_byte(0x0a);
        let token = Address::repeat_byte(0x0c);
        let suffix = encode_maker_asset_suffix(&TransferParams {
            from: maker,
            to: Address::ZERO,
            amount: U256::ZERO,
            token_id: U256::from(42u8),
            token,
        });
        let predicate = TransferPredicate {
            token,
            token_id: U256::from(42u8),
            owner: maker,
            not_before,
        };
        Extension::new()
            .with_maker_asset_suffix(suffix)
            .with_predicate(predicate.encode(Address::repeat_byte(0x0d)))
    }

    fn record_with(extension: &Extension) -> OrderRecord {
        record_with_receiver(extension, Address::ZERO)
    }

    fn record_with_receiver(extension: &Extension, receiver: Address) -> OrderRecord {
        let order = LimitOrder::build_with_salt(
            OrderFields {
                maker: Address::repeat_byte(0x0a),
                receiver,
                maker_asset: Address::repeat_byte(0x0b),
                taker_asset: Address::repeat_byte(0x0f),
                making_amount: U256::from(1u8),
                taking_amount: U256::from(100u8),
            },
            MakerTraits::new().with_nonce(7),
            extension,
            U256::from(12345u32),
        )
        .unwrap();

        OrderRecord {
            order_hash: "0xfeed".to_string(),
            network_id: NETWORK,
            maker: format!("0x{}", hex::encode(order.maker)),
            receiver: (receiver != Address::ZERO)
                .then(|| format!("0x{}", hex::encode(receiver))),
            maker_asset: format!("0x{}", hex::encode(order.maker_asset)),
            taker_asset: format!("0x{}", hex::encode(order.taker_asset)),
            making_amount: order.making_amount.to_string(),
            taking_amount: order.taking_amount.to_string(),
            salt: Some(order.salt.to_string()),
            maker_traits: order.maker_traits.raw().to_string(),
            extension: Some(ExtensionRecord::from_extension(extension)),
            signature: valid_signature_hex(),
            status: OrderbookStatus::Active,
            filled_amount: "0".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn active_record() -> OrderRecord {
        record_with(&build_extension(NOW - 10))
    }

    #[test]
    fn filled_amount_short_circuits_before_parsing() {
        let mut record = active_record();
        record.filled_amount = "1".to_string();
        // Garbage everywhere else must not matter.
        record.signature = "not-hex".to_string();
        record.maker = "junk".to_string();

        let prepared = prepare_fill(&record, NETWORK, taker(), NOW).unwrap();
        assert!(matches!(
            prepared,
            Prepared::Skip(SkipReason::AlreadyFilled { .. })
        ));
    }

    #[test]
    fn terminal_status_is_skipped() {
        let mut record = active_record();
        record.status = OrderbookStatus::Cancelled;
        let prepared = prepare_fill(&record, NETWORK, taker(), NOW).unwrap();
        assert!(matches!(
            prepared,
            Prepared::Skip(SkipReason::NotActive {
                status: OrderbookStatus::Cancelled
            })
        ));
    }

    #[test]
    fn wrong_network_is_skipped() {
        let record = active_record();
        let prepared = prepare_fill(&record, 1, taker(), NOW).unwrap();
        assert!(matches!(
            prepared,
            Prepared::Skip(SkipReason::WrongNetwork {
                expected: 1,
                actual: NETWORK
            })
        ));
    }

    #[test]
    fn expired_order_is_skipped() {
        let extension = build_extension(NOW - 10);
        let mut record = record_with(&extension);
        let expired = MakerTraits::from_raw(
            record.maker_traits.parse::<U256>().unwrap(),
        )
        .with_expiration(NOW - 100);
        record.maker_traits = expired.raw().to_string();

        let prepared = prepare_fill(&record, NETWORK, taker(), NOW).unwrap();
        assert!(matches!(
            prepared,
            Prepared::Skip(SkipReason::Expired { .. })
        ));
    }

    #[test]
    fn premature_predicate_is_skipped() {
        let record = record_with(&build_extension(NOW + 3600));
        let prepared = prepare_fill(&record, NETWORK, taker(), NOW).unwrap();
        assert!(matches!(
            prepared,
            Prepared::Skip(SkipReason::NotYetFillable {
                not_before
            }) if not_before == NOW + 3600
        ));
    }

    #[test]
    fn malformed_signature_is_a_structural_error() {
        let mut record = active_record();
        record.signature = format!("0x{}", "ab".repeat(64)); // 64 bytes, too short

        let err = prepare_fill(&record, NETWORK, taker(), NOW).unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Core(CoreError::SignatureLength { .. })
        ));
    }

    #[test]
    fn tampered_salt_is_rejected() {
        let mut record = active_record();
        let salt = record.salt.take().unwrap().parse::<U256>().unwrap();
        record.salt = Some((salt ^ U256::from(1u8)).to_string());

        let err = prepare_fill(&record, NETWORK, taker(), NOW).unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Core(CoreError::InconsistentOrder(_))
        ));
    }

    #[test]
    fn missing_salt_is_rejected() {
        let mut record = active_record();
        record.salt = None;
        let err = prepare_fill(&record, NETWORK, taker(), NOW).unwrap_err();
        assert!(matches!(err, ExecutorError::MissingField("salt")));
    }

    #[test]
    fn ready_fill_encodes_taker_parameters() {
        let record = active_record();
        let prepared = prepare_fill(&record, NETWORK, taker(), NOW).unwrap();

        let Prepared::Ready(fill) = prepared else {
            panic!("expected ready fill");
        };

        assert_eq!(fill.token_id, U256::from(42u8));
        assert_eq!(fill.token, Address::repeat_byte(0x0c));
        assert_eq!(fill.amount, U256::from(100u8));
        assert_eq!(fill.predicate.as_ref().unwrap().predicate.not_before, NOW - 10);

        // Target flag and skip-permit flag, target leads the args.
        assert!(fill.taker_traits.bit(251));
        assert!(fill.taker_traits.bit(253));
        assert_eq!(&fill.args[..20], taker().as_slice());
        assert_eq!(&fill.args[20..], &fill.extension.encode()[..]);

        // Parity v=27 leaves the vs high bit clear.
        assert_eq!(fill.compact.vs[0] & 0x80, 0);
    }

    #[test]
    fn named_receiver_becomes_the_fill_target() {
        let recipient = Address::repeat_byte(0xcd);
        let record = record_with_receiver(&build_extension(NOW - 10), recipient);
        let prepared = prepare_fill(&record, NETWORK, taker(), NOW).unwrap();

        let Prepared::Ready(fill) = prepared else {
            panic!("expected ready fill");
        };
        assert_eq!(&fill.args[..20], recipient.as_slice());
    }

    #[test]
    fn revert_classification() {
        assert!(classify_revert("execution reverted: PredicateIsNotTrue()"));
        assert!(classify_revert("custom error 0xb6629c02"));
        assert!(!classify_revert("execution reverted: OrderExpired()"));
        assert!(!classify_revert("custom error 0xc56873ba"));
        assert!(!classify_revert("insufficient funds"));
    }
}
