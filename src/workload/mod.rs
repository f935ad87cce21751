//! Concurrent workload runners
//!
//! This module drives several read-modify-write sequences against one account
//! at the same time and reports what happened to the balance. Two execution
//! strategies can be selected at runtime, mirroring each other step for step:
//!
//! - `threaded` - one scoped OS thread per sequence
//! - `tasks` - one tokio task per sequence on a multi-threaded runtime
//!
//! # Round Structure
//!
//! ```text
//! read before ─→ spawn N sequences ─→ join all ─→ read after ─→ WorkloadReport
//!                 │ Read
//!                 │ (barrier: every first read done)
//!                 │ Compute → CommitAttempt → Committed | Conflicted (→ Read)
//! ```
//!
//! The after-balance is only read once every sequence has been joined.

use crate::cli::ExecutionMode;
use crate::config::RuntimeConfig;
use crate::core::{AccountOperation, AccountStore};
use crate::types::{Account, AccountError, AccountId};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{info, warn};

pub mod report;
pub mod sequence;
pub mod tasks;
pub mod threaded;

pub use report::WorkloadReport;
pub use sequence::{Commit, ReadModifyWrite, RetryPolicy, SequenceOutcome, SequenceState};
pub use tasks::TaskStrategy;
pub use threaded::ThreadedStrategy;

/// Description of one workload round
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadPlan {
    /// Account every sequence targets
    pub account_id: AccountId,

    /// One sequence per operation
    pub operations: Vec<AccountOperation>,

    /// Retry bound applied to every sequence
    pub retry: RetryPolicy,

    /// Park every sequence after its first read until all have read,
    /// so that first attempts race on the same version
    pub synchronize_reads: bool,
}

impl WorkloadPlan {
    /// Racing, non-retrying plan
    pub fn new(account_id: AccountId, operations: Vec<AccountOperation>) -> Self {
        Self {
            account_id,
            operations,
            retry: RetryPolicy::NONE,
            synchronize_reads: true,
        }
    }

    /// Set the retry bound
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enable or disable the post-read barrier
    pub fn with_synchronized_reads(mut self, synchronize_reads: bool) -> Self {
        self.synchronize_reads = synchronize_reads;
        self
    }
}

/// Execution strategy for workload rounds
pub trait WorkloadStrategy: Send + Sync {
    /// Run one round of `plan` against `store`
    ///
    /// Every sequence is joined before the after-balance is read. Conflicts
    /// and other per-sequence failures are reported in the outcomes, not as
    /// an error.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the target account does not exist
    /// - `Runtime` if the workers could not be started or one of them panicked
    fn run(
        &self,
        store: Arc<dyn AccountStore>,
        plan: &WorkloadPlan,
    ) -> Result<WorkloadReport, AccountError>;
}

/// Create a workload strategy for the given execution mode
pub fn create_strategy(mode: ExecutionMode, config: RuntimeConfig) -> Box<dyn WorkloadStrategy> {
    match mode {
        ExecutionMode::Threads => Box::new(ThreadedStrategy),
        ExecutionMode::Tasks => Box::new(TaskStrategy::new(config)),
    }
}

/// Perform a sequence's first read, holding back any panic
///
/// Runners pass the post-read barrier before re-raising the panic, so a
/// dead worker never leaves the others parked at the barrier.
fn first_read(sequence: &mut ReadModifyWrite) -> std::thread::Result<()> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        sequence.advance();
    }))
}

/// Read and log the balance before a round
fn read_before(store: &dyn AccountStore, plan: &WorkloadPlan) -> Result<Account, AccountError> {
    let before = store.read(plan.account_id)?;
    info!(
        policy = %store.policy(),
        account = plan.account_id,
        "Account Balance (Before): {}",
        before.balance
    );
    Ok(before)
}

/// Read the balance after every sequence was joined and assemble the report
fn finish_round(
    store: &dyn AccountStore,
    plan: &WorkloadPlan,
    before: Account,
    mut outcomes: Vec<SequenceOutcome>,
) -> Result<WorkloadReport, AccountError> {
    outcomes.sort_by_key(|outcome| outcome.index);
    let after = store.read(plan.account_id)?;

    let report = WorkloadReport {
        policy: store.policy(),
        account_id: plan.account_id,
        before,
        after,
        outcomes,
    };

    for outcome in &report.outcomes {
        if let Err(error) = &outcome.result {
            warn!(sequence = outcome.index, operation = %outcome.operation, "{}", error);
        }
    }

    info!(
        policy = %report.policy,
        account = report.account_id,
        committed = report.committed(),
        conflicted = report.conflicted(),
        "Account Balance (After): {}",
        report.after.balance
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InMemoryAccountStore;
    use crate::types::{ConcurrencyPolicy, NewAccount, Version};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    /// Store whose backend blows up on one particular read
    #[derive(Debug)]
    struct PanickingStore {
        inner: InMemoryAccountStore,
        reads: AtomicUsize,
        panic_on_read: usize,
    }

    impl PanickingStore {
        fn seeded(panic_on_read: usize) -> Self {
            let inner = InMemoryAccountStore::new(ConcurrencyPolicy::TokenBased);
            inner
                .create(NewAccount::new(Decimal::new(1000, 0)).with_id(1))
                .unwrap();
            Self {
                inner,
                reads: AtomicUsize::new(0),
                panic_on_read,
            }
        }
    }

    impl AccountStore for PanickingStore {
        fn policy(&self) -> ConcurrencyPolicy {
            self.inner.policy()
        }

        fn create(&self, account: NewAccount) -> Result<AccountId, AccountError> {
            self.inner.create(account)
        }

        fn read(&self, id: AccountId) -> Result<Account, AccountError> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == self.panic_on_read {
                panic!("storage backend failed");
            }
            self.inner.read(id)
        }

        fn update(
            &self,
            id: AccountId,
            expected: &Version,
            mutate: &mut dyn FnMut(&Account) -> Result<Decimal, AccountError>,
        ) -> Result<Version, AccountError> {
            self.inner.update(id, expected, mutate)
        }
    }

    fn racing_plan() -> WorkloadPlan {
        WorkloadPlan::new(
            1,
            vec![
                AccountOperation::Credit(Decimal::new(100, 0)),
                AccountOperation::Debit(Decimal::new(200, 0)),
            ],
        )
        .with_retry(RetryPolicy::new(1))
    }

    // Read 0 is the before-balance, reads 1 and 2 are the first reads, read 3
    // is the loser's retry after the barrier.
    #[rstest]
    fn test_panicking_worker_surfaces_runtime_error(
        #[values(1, 3)] panic_on_read: usize,
        #[values(ExecutionMode::Threads, ExecutionMode::Tasks)] mode: ExecutionMode,
    ) {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let store: Arc<dyn AccountStore> = Arc::new(PanickingStore::seeded(panic_on_read));
            let result = create_strategy(mode, RuntimeConfig::new(2)).run(store, &racing_plan());
            let _ = sender.send(result);
        });

        let result = receiver
            .recv_timeout(Duration::from_secs(10))
            .unwrap_or_else(|_| panic!("{:?} workload did not finish after a worker panic", mode));

        assert!(
            matches!(result, Err(AccountError::Runtime { .. })),
            "Unexpected result: {:?}",
            result
        );
    }

    #[rstest]
    fn test_healthy_store_runs_to_completion(
        #[values(ExecutionMode::Threads, ExecutionMode::Tasks)] mode: ExecutionMode,
    ) {
        let store: Arc<dyn AccountStore> = Arc::new(PanickingStore::seeded(usize::MAX));

        let report = create_strategy(mode, RuntimeConfig::new(2))
            .run(store, &racing_plan())
            .unwrap();

        assert_eq!(report.committed(), 2);
        assert_eq!(report.after.balance, Decimal::new(900, 0));
    }
}
