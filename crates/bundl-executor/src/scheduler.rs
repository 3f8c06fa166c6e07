//! Interval-driven fill loop.

use std::time::Duration;

use alloy::network::Ethereum;
use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::transports::Transport;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use bundl_orderbook::{ActiveFilter, OrderRecord, OrderbookClient};

use crate::error::{ExecutorError, ExecutorResult};
use crate::pipeline::{prepare_fill, FillExecutor, OrderOutcome, Prepared};

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between polling ticks.
    pub interval: Duration,
    /// Chain the bot settles on; records for other networks are skipped.
    pub network_id: u64,
    /// Address receiving the maker asset on fills.
    pub taker: Address,
    /// Server-side filter for the active listing.
    pub filter: ActiveFilter,
}

/// Per-tick outcome counts.
#[derive(Debug, Default)]
pub struct TickSummary {
    pub filled: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<OrderOutcome>,
}

impl TickSummary {
    fn from_outcomes(outcomes: Vec<OrderOutcome>) -> Self {
        let mut summary = Self {
            outcomes: Vec::new(),
            ..Self::default()
        };
        for outcome in &outcomes {
            match outcome {
                OrderOutcome::Filled { .. } => summary.filled += 1,
                OrderOutcome::Skipped { .. } => summary.skipped += 1,
                OrderOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary.outcomes = outcomes;
        summary
    }
}

/// Polls the orderbook and attempts every fillable order, sequentially.
///
/// One order per transaction; a failure never blocks the rest of the tick.
pub struct FillScheduler<T, P> {
    orderbook: OrderbookClient,
    executor: FillExecutor<T, P>,
    config: SchedulerConfig,
}

impl<T, P> FillScheduler<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Clone,
{
    pub fn new(
        orderbook: OrderbookClient,
        executor: FillExecutor<T, P>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            orderbook,
            executor,
            config,
        }
    }

    /// Run the loop until the task is cancelled.
    pub async fn run(&self) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            network_id = self.config.network_id,
            "Fill scheduler started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.run_tick().await {
                Ok(summary) => {
                    if !summary.outcomes.is_empty() {
                        info!(
                            filled = summary.filled,
                            skipped = summary.skipped,
                            failed = summary.failed,
                            "Tick complete"
                        );
                    }
                }
                Err(e) => error!(error = %e, "Tick failed"),
            }
        }
    }

    /// One polling pass: fetch the first page of active orders and attempt
    /// each in sequence. Deeper pages wait for subsequent ticks.
    pub async fn run_tick(&self) -> ExecutorResult<TickSummary> {
        let page = self.orderbook.fetch_active(&self.config.filter).await?;
        debug!(total = page.count, fetched = page.results.len(), "Polled active orders");

        let now = chrono::Utc::now().timestamp() as u64;
        let mut outcomes = Vec::with_capacity(page.results.len());
        for record in &page.results {
            let outcome = self.process(record, now).await;
            match &outcome {
                OrderOutcome::Filled { order_hash, tx_hash } => {
                    info!(order_hash, %tx_hash, "Filled");
                }
                OrderOutcome::Skipped { order_hash, reason } => {
                    debug!(order_hash, %reason, "Skipped");
                }
                OrderOutcome::Failed {
                    order_hash,
                    reason,
                    retryable,
                } => {
                    warn!(order_hash, retryable, %reason, "Fill failed");
                }
            }
            outcomes.push(outcome);
        }

        Ok(TickSummary::from_outcomes(outcomes))
    }

    async fn process(&self, record: &OrderRecord, now: u64) -> OrderOutcome {
        let prepared = match prepare_fill(record, self.config.network_id, self.config.taker, now) {
            Ok(prepared) => prepared,
            Err(e) => {
                return OrderOutcome::Failed {
                    order_hash: record.order_hash.clone(),
                    reason: e.to_string(),
                    retryable: false,
                }
            }
        };

        match prepared {
            Prepared::Skip(reason) => OrderOutcome::Skipped {
                order_hash: record.order_hash.clone(),
                reason,
            },
            Prepared::Ready(fill) => match self.executor.execute(*fill).await {
                Ok(outcome) => outcome,
                Err(e) => OrderOutcome::Failed {
                    order_hash: record.order_hash.clone(),
                    reason: e.to_string(),
                    // Transport trouble clears up; anything else will not.
                    retryable: matches!(
                        e,
                        ExecutorError::Rpc(_) | ExecutorError::Transaction(_)
                    ),
                },
            },
        }
    }
}
