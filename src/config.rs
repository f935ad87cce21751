//! Configuration objects
//!
//! Configuration is built once at process start (from CLI arguments) and passed
//! by reference into the components that need it. Nothing reads ambient state.

use crate::cli::ExecutionMode;
use crate::core::AccountOperation;
use crate::types::{AccountId, ConcurrencyPolicy};
use crate::workload::RetryPolicy;
use rust_decimal::Decimal;
use tracing::warn;

/// Account every demo round targets
pub const DEMO_ACCOUNT_ID: AccountId = 1;

/// Configuration for the worker runtime
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Number of worker threads driving task-based workloads
    pub worker_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
        }
    }
}

impl RuntimeConfig {
    /// Create a RuntimeConfig, falling back to the default for zero
    pub fn new(worker_threads: usize) -> Self {
        let default = Self::default();

        let worker_threads = if worker_threads == 0 {
            warn!(
                "Invalid worker_threads ({}), using default ({})",
                worker_threads, default.worker_threads
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self { worker_threads }
    }
}

/// Everything the demo needs to run
#[derive(Clone, Debug, PartialEq)]
pub struct DemoConfig {
    /// Policies to exercise, each against a fresh store
    pub policies: Vec<ConcurrencyPolicy>,

    /// Opening balance of the demo account
    pub initial_balance: Decimal,

    /// Operations raced against each other in every round
    pub operations: Vec<AccountOperation>,

    /// Rounds per policy; the balance carries over between rounds
    pub rounds: u32,

    /// Retry bound for conflicting sequences
    pub retry: RetryPolicy,

    /// Hold every sequence after its first read until all have read
    pub synchronize_reads: bool,

    /// How sequences are executed
    pub mode: ExecutionMode,

    /// Worker runtime settings
    pub runtime: RuntimeConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            policies: ConcurrencyPolicy::ALL.to_vec(),
            initial_balance: Decimal::new(10000, 1),
            operations: vec![
                AccountOperation::Credit(Decimal::new(100, 0)),
                AccountOperation::Debit(Decimal::new(200, 0)),
            ],
            rounds: 1,
            retry: RetryPolicy::NONE,
            synchronize_reads: true,
            mode: ExecutionMode::Tasks,
            runtime: RuntimeConfig::default(),
        }
    }
}
