//! CSV output for workload results
//!
//! One row per round with columns:
//! policy, round, before, after, committed, conflicted, expected, lost_update

use crate::demo::RoundReport;
use serde::Serialize;
use std::io::Write;

/// One CSV row summarizing a round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub policy: String,
    pub round: u32,
    pub before: String,
    pub after: String,
    pub committed: usize,
    pub conflicted: usize,
    /// Balance a serial execution of the committed writers would produce
    pub expected: String,
    pub lost_update: bool,
}

impl From<&RoundReport> for ReportRow {
    fn from(round: &RoundReport) -> Self {
        let report = &round.report;
        ReportRow {
            policy: report.policy.to_string(),
            round: round.round,
            before: format!("{:.4}", report.before.balance),
            after: format!("{:.4}", report.after.balance),
            committed: report.committed(),
            conflicted: report.conflicted(),
            expected: format!("{:.4}", report.expected_balance()),
            lost_update: report.lost_update(),
        }
    }
}

/// Write round reports in CSV format
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_reports_csv(rounds: &[RoundReport], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    for round in rounds {
        writer
            .serialize(ReportRow::from(round))
            .map_err(|e| format!("Failed to write report record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AccountOperation;
    use crate::types::{Account, AccountError, ConcurrencyPolicy, Version};
    use crate::workload::{Commit, SequenceOutcome, WorkloadReport};
    use rust_decimal::Decimal;

    fn token_round() -> RoundReport {
        RoundReport {
            round: 1,
            report: WorkloadReport {
                policy: ConcurrencyPolicy::TokenBased,
                account_id: 1,
                before: Account::new(1, Decimal::new(1000, 0), Version::Token(0)),
                after: Account::new(1, Decimal::new(1100, 0), Version::Token(1)),
                outcomes: vec![
                    SequenceOutcome {
                        index: 0,
                        operation: AccountOperation::Credit(Decimal::new(100, 0)),
                        attempts: 1,
                        result: Ok(Commit {
                            balance: Decimal::new(1100, 0),
                            version: Version::Token(1),
                        }),
                    },
                    SequenceOutcome {
                        index: 1,
                        operation: AccountOperation::Debit(Decimal::new(200, 0)),
                        attempts: 1,
                        result: Err(AccountError::concurrency_conflict(
                            1,
                            Version::Token(0),
                            Version::Token(1),
                        )),
                    },
                ],
            },
        }
    }

    #[test]
    fn test_write_reports_csv() {
        let mut output = Vec::new();

        write_reports_csv(&[token_round()], &mut output).unwrap();

        let csv = String::from_utf8(output).unwrap();
        assert_eq!(
            csv,
            "policy,round,before,after,committed,conflicted,expected,lost_update\n\
             token,1,1000.0000,1100.0000,1,1,1100.0000,false\n"
        );
    }

    #[test]
    fn test_empty_reports_write_nothing() {
        let mut output = Vec::new();

        write_reports_csv(&[], &mut output).unwrap();

        assert!(output.is_empty());
    }
}
