//! Fill-side execution: take active orders from the orderbook, verify they
//! are fillable, and settle them on-chain.
//!
//! The pipeline is split in two stages. `prepare` is pure: it parses and
//! validates a stored record into calldata-ready form without touching the
//! chain. `FillExecutor` then runs the on-chain checks (ownership, approval,
//! predicate) and sends the fill transaction. The `FillScheduler` drives both
//! on a fixed interval.

pub mod contracts;
pub mod error;
pub mod pipeline;
pub mod scheduler;

pub use contracts::{ISettlement, IERC721};
pub use error::{ExecutorError, ExecutorResult};
pub use pipeline::{
    classify_revert, prepare_fill, FillExecutor, OrderOutcome, Prepared, PreparedFill,
    PredicateCheck, SkipReason,
};
pub use scheduler::{FillScheduler, SchedulerConfig, TickSummary};
