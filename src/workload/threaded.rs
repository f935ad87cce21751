//! Thread-based workload strategy
//!
//! Runs every sequence on its own scoped OS thread. The scope guarantees that
//! all threads are joined before the round is summarized.

use super::sequence::{ReadModifyWrite, SequenceOutcome};
use super::{
    finish_round, first_read, read_before, WorkloadPlan, WorkloadReport, WorkloadStrategy,
};
use crate::core::AccountStore;
use crate::types::AccountError;
use std::panic;
use std::sync::{Arc, Barrier};
use std::thread;
use tracing::error;

/// One OS thread per sequence
#[derive(Debug, Clone, Copy)]
pub struct ThreadedStrategy;

impl WorkloadStrategy for ThreadedStrategy {
    fn run(
        &self,
        store: Arc<dyn AccountStore>,
        plan: &WorkloadPlan,
    ) -> Result<WorkloadReport, AccountError> {
        let before = read_before(store.as_ref(), plan)?;
        let barrier = Barrier::new(plan.operations.len());

        let outcomes = thread::scope(|scope| {
            let handles: Vec<_> = plan
                .operations
                .iter()
                .enumerate()
                .map(|(index, &operation)| {
                    let store = Arc::clone(&store);
                    let barrier = &barrier;
                    scope.spawn(move || {
                        let mut sequence =
                            ReadModifyWrite::new(store, plan.account_id, operation, plan.retry);
                        let read = first_read(&mut sequence);
                        if plan.synchronize_reads {
                            barrier.wait();
                        }
                        if let Err(payload) = read {
                            panic::resume_unwind(payload);
                        }
                        sequence.run_to_completion(index)
                    })
                })
                .collect();

            // Join every thread before looking at any result
            let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
            joined
                .into_iter()
                .map(|result| {
                    result.map_err(|_| {
                        error!("Workload thread panicked");
                        AccountError::runtime("workload thread panicked")
                    })
                })
                .collect::<Result<Vec<SequenceOutcome>, AccountError>>()
        })?;

        finish_round(store.as_ref(), plan, before, outcomes)
    }
}
