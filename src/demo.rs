//! Demo orchestration
//!
//! For every configured policy the demo starts from a fresh store holding one
//! account at the opening balance, then runs the configured number of workload
//! rounds against it. The balance carries over from one round to the next.

use crate::config::{DemoConfig, DEMO_ACCOUNT_ID};
use crate::core::{AccountStore, InMemoryAccountStore};
use crate::types::{AccountError, NewAccount};
use crate::workload::{create_strategy, WorkloadPlan, WorkloadReport};
use std::sync::Arc;
use tracing::info;

/// Report of one round of one policy
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    /// Round number, starting at 1
    pub round: u32,

    /// What happened in the round
    pub report: WorkloadReport,
}

/// Run every configured policy and round
///
/// # Errors
///
/// Returns the first error that prevents a round from running at all.
/// Conflicts are part of the reports, not errors.
pub fn run(config: &DemoConfig) -> Result<Vec<RoundReport>, AccountError> {
    let strategy = create_strategy(config.mode, config.runtime.clone());
    let plan = WorkloadPlan::new(DEMO_ACCOUNT_ID, config.operations.clone())
        .with_retry(config.retry)
        .with_synchronized_reads(config.synchronize_reads);

    let mut reports = Vec::with_capacity(config.policies.len() * config.rounds as usize);
    for &policy in &config.policies {
        info!(%policy, "========== Concurrency test with policy '{}' ==========", policy);

        let store: Arc<dyn AccountStore> = Arc::new(InMemoryAccountStore::new(policy));
        store.create(NewAccount::new(config.initial_balance).with_id(DEMO_ACCOUNT_ID))?;

        for round in 1..=config.rounds {
            let report = strategy.run(Arc::clone(&store), &plan)?;
            reports.push(RoundReport { round, report });
        }
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ExecutionMode;
    use crate::core::AccountOperation;
    use crate::types::ConcurrencyPolicy;
    use crate::workload::RetryPolicy;
    use rust_decimal::Decimal;

    #[test]
    fn test_run_reports_every_policy_and_round() {
        let config = DemoConfig {
            rounds: 3,
            ..DemoConfig::default()
        };

        let reports = run(&config).unwrap();

        assert_eq!(reports.len(), 9);
        let rounds: Vec<u32> = reports.iter().map(|r| r.round).collect();
        assert_eq!(rounds, vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_balance_carries_over_between_rounds() {
        let config = DemoConfig {
            policies: vec![ConcurrencyPolicy::TokenBased],
            operations: vec![AccountOperation::Credit(Decimal::new(100, 0))],
            rounds: 2,
            mode: ExecutionMode::Threads,
            ..DemoConfig::default()
        };

        let reports = run(&config).unwrap();

        assert_eq!(reports[1].report.before.balance, Decimal::new(1100, 0));
        assert_eq!(reports[1].report.after.balance, Decimal::new(1200, 0));
    }

    #[test]
    fn test_each_policy_starts_from_a_fresh_store() {
        let config = DemoConfig {
            retry: RetryPolicy::new(1),
            ..DemoConfig::default()
        };

        let reports = run(&config).unwrap();

        for round in &reports {
            assert_eq!(round.report.before.balance, Decimal::new(1000, 0));
        }
    }
}
