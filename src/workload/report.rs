//! Workload results
//!
//! A `WorkloadReport` captures the account before and after one round of
//! concurrent sequences together with every sequence's outcome.

use super::sequence::SequenceOutcome;
use crate::types::{Account, AccountId, ConcurrencyPolicy};
use rust_decimal::Decimal;

/// Result of one workload round
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadReport {
    /// Policy of the store the round ran against
    pub policy: ConcurrencyPolicy,

    /// Account the sequences targeted
    pub account_id: AccountId,

    /// Account state before any sequence started
    pub before: Account,

    /// Account state after every sequence finished
    pub after: Account,

    /// One outcome per sequence, ordered by sequence index
    pub outcomes: Vec<SequenceOutcome>,
}

impl WorkloadReport {
    /// Number of sequences that committed
    pub fn committed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_committed())
            .count()
    }

    /// Number of sequences that ended on a version conflict
    pub fn conflicted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_conflicted())
            .count()
    }

    /// Sum of the deltas of every committed sequence
    pub fn committed_delta(&self) -> Decimal {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_committed())
            .map(|outcome| outcome.operation.delta())
            .sum()
    }

    /// Balance a serial execution of the committed sequences would produce
    pub fn expected_balance(&self) -> Decimal {
        self.before.balance + self.committed_delta()
    }

    /// Whether a committed change was silently overwritten
    pub fn lost_update(&self) -> bool {
        self.after.balance != self.expected_balance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AccountOperation;
    use crate::types::{AccountError, Version};
    use crate::workload::sequence::Commit;

    fn outcome(index: usize, operation: AccountOperation, committed: bool) -> SequenceOutcome {
        let result = if committed {
            Ok(Commit {
                balance: Decimal::ZERO,
                version: Version::Unversioned,
            })
        } else {
            Err(AccountError::concurrency_conflict(
                1,
                Version::Token(0),
                Version::Token(1),
            ))
        };
        SequenceOutcome {
            index,
            operation,
            attempts: 1,
            result,
        }
    }

    fn report(after: i64, outcomes: Vec<SequenceOutcome>) -> WorkloadReport {
        WorkloadReport {
            policy: ConcurrencyPolicy::TokenBased,
            account_id: 1,
            before: Account::new(1, Decimal::new(1000, 0), Version::Token(0)),
            after: Account::new(1, Decimal::new(after, 0), Version::Token(1)),
            outcomes,
        }
    }

    #[test]
    fn test_counts_and_expected_balance() {
        let report = report(
            1100,
            vec![
                outcome(0, AccountOperation::Credit(Decimal::new(100, 0)), true),
                outcome(1, AccountOperation::Debit(Decimal::new(200, 0)), false),
            ],
        );

        assert_eq!(report.committed(), 1);
        assert_eq!(report.conflicted(), 1);
        assert_eq!(report.committed_delta(), Decimal::new(100, 0));
        assert_eq!(report.expected_balance(), Decimal::new(1100, 0));
        assert!(!report.lost_update());
    }

    #[test]
    fn test_lost_update_detected() {
        // Both writers committed but only the debit survived
        let report = report(
            800,
            vec![
                outcome(0, AccountOperation::Credit(Decimal::new(100, 0)), true),
                outcome(1, AccountOperation::Debit(Decimal::new(200, 0)), true),
            ],
        );

        assert_eq!(report.expected_balance(), Decimal::new(900, 0));
        assert!(report.lost_update());
    }
}
