//! Task-based workload strategy
//!
//! Runs every sequence as a tokio task on a multi-threaded runtime. Tasks
//! yield to the scheduler after every step that touched the store, so reads
//! and commits of different sequences interleave even on a single worker.
//!
//! # Architecture
//!
//! ```text
//! TaskStrategy
//!     ├── RuntimeConfig (worker_threads)
//!     └── per round: tokio runtime
//!         ├── tokio::sync::Barrier (post-read rendezvous)
//!         └── N × JoinHandle<SequenceOutcome> (awaited before the after-read)
//! ```

use super::sequence::{ReadModifyWrite, SequenceOutcome};
use super::{
    finish_round, first_read, read_before, WorkloadPlan, WorkloadReport, WorkloadStrategy,
};
use crate::config::RuntimeConfig;
use crate::core::AccountStore;
use crate::types::AccountError;
use std::panic;
use std::sync::Arc;
use tokio::sync::Barrier;
use tracing::error;

/// One tokio task per sequence
#[derive(Debug, Clone)]
pub struct TaskStrategy {
    /// Worker runtime configuration
    config: RuntimeConfig,
}

impl TaskStrategy {
    /// Create a TaskStrategy with the specified runtime configuration
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }
}

impl WorkloadStrategy for TaskStrategy {
    fn run(
        &self,
        store: Arc<dyn AccountStore>,
        plan: &WorkloadPlan,
    ) -> Result<WorkloadReport, AccountError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads)
            .build()
            .map_err(|e| AccountError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let before = read_before(store.as_ref(), plan)?;
            let barrier = Arc::new(Barrier::new(plan.operations.len()));

            let mut tasks = Vec::with_capacity(plan.operations.len());
            for (index, &operation) in plan.operations.iter().enumerate() {
                let mut sequence = ReadModifyWrite::new(
                    Arc::clone(&store),
                    plan.account_id,
                    operation,
                    plan.retry,
                );
                let barrier = Arc::clone(&barrier);
                let synchronize_reads = plan.synchronize_reads;

                tasks.push(tokio::spawn(async move {
                    let read = first_read(&mut sequence);
                    if synchronize_reads {
                        barrier.wait().await;
                    }
                    if let Err(payload) = read {
                        panic::resume_unwind(payload);
                    }
                    while !sequence.is_terminal() {
                        tokio::task::yield_now().await;
                        sequence.advance();
                    }
                    sequence.finish(index)
                }));
            }

            // Join every task before the after-balance is read
            let mut outcomes: Vec<SequenceOutcome> = Vec::with_capacity(tasks.len());
            let mut failure = None;
            for task in tasks {
                match task.await {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => {
                        error!("Workload task failed: {:?}", e);
                        failure.get_or_insert_with(|| {
                            AccountError::runtime(format!("Workload task failed: {}", e))
                        });
                    }
                }
            }
            if let Some(failure) = failure {
                return Err(failure);
            }

            finish_round(store.as_ref(), plan, before, outcomes)
        })
    }
}
