//! Read-modify-write sequences
//!
//! A `ReadModifyWrite` is one writer in a workload. It walks the state machine
//!
//! ```text
//! Idle → Read → Computed → CommitAttempt ─┬→ Committed
//!          ↑                              ├→ Conflicted ─(retry allowed)─┐
//!          └──────────────────────────────┼──────────────────────────────┘
//!                                         └→ Failed
//! ```
//!
//! `Conflicted` is terminal once the `RetryPolicy` is used up. Each call to
//! [`ReadModifyWrite::advance`] performs exactly one transition, so runners can
//! interleave sequences (and park them at a barrier) between steps.

use crate::core::{AccountOperation, AccountStore};
use crate::types::{Account, AccountError, AccountId, Version};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Bound on how often a sequence re-reads after a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Additional commit attempts allowed after the first one conflicts
    pub max_retries: u32,
}

impl RetryPolicy {
    /// Never retry; report the first conflict
    pub const NONE: RetryPolicy = RetryPolicy { max_retries: 0 };

    /// Allow up to `max_retries` retries
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Whether another attempt may follow `attempts` conflicting ones
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts <= self.max_retries
    }
}

/// Where a sequence currently is
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceState {
    /// Nothing done yet
    Idle,

    /// Snapshot captured together with its version
    Read {
        /// Account as read from the store
        snapshot: Account,
    },

    /// New balance computed from the snapshot
    Computed {
        /// Version the commit will present
        expected: Version,
        /// Balance the commit will write
        balance: Decimal,
    },

    /// Commit accepted by the store
    Committed {
        /// Balance written
        balance: Decimal,
        /// Version assigned by the commit
        version: Version,
    },

    /// Commit rejected because the account changed since it was read
    Conflicted {
        /// The conflict reported by the store
        error: AccountError,
    },

    /// Non-retryable failure (missing account, invalid amount, overflow)
    Failed {
        /// The failure
        error: AccountError,
    },
}

/// Successful commit of one sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    /// Balance written
    pub balance: Decimal,
    /// Version assigned by the commit
    pub version: Version,
}

/// Final result of one sequence
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceOutcome {
    /// Position of the sequence in the workload
    pub index: usize,

    /// Operation the sequence tried to apply
    pub operation: AccountOperation,

    /// Commit attempts made
    pub attempts: u32,

    /// Commit, or the error that ended the sequence
    pub result: Result<Commit, AccountError>,
}

impl SequenceOutcome {
    /// Whether the sequence committed
    pub fn is_committed(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the sequence ended because of version conflicts
    pub fn is_conflicted(&self) -> bool {
        matches!(
            self.result,
            Err(AccountError::ConcurrencyConflict { .. }) | Err(AccountError::RetriesExhausted { .. })
        )
    }
}

/// One writer applying one operation to one account
#[derive(Debug)]
pub struct ReadModifyWrite {
    store: Arc<dyn AccountStore>,
    account_id: AccountId,
    operation: AccountOperation,
    retry: RetryPolicy,
    state: SequenceState,
    attempts: u32,
}

impl ReadModifyWrite {
    /// Create an idle sequence
    pub fn new(
        store: Arc<dyn AccountStore>,
        account_id: AccountId,
        operation: AccountOperation,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            account_id,
            operation,
            retry,
            state: SequenceState::Idle,
            attempts: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    /// Commit attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        match &self.state {
            SequenceState::Committed { .. } | SequenceState::Failed { .. } => true,
            SequenceState::Conflicted { .. } => !self.retry.allows_retry(self.attempts),
            _ => false,
        }
    }

    /// Perform the next transition and return the new state
    ///
    /// Calling this on a terminal sequence does nothing.
    pub fn advance(&mut self) -> &SequenceState {
        if self.is_terminal() {
            return &self.state;
        }

        let next = match &self.state {
            SequenceState::Idle => Some(self.read()),
            SequenceState::Conflicted { .. } => {
                debug!(
                    account = self.account_id,
                    operation = %self.operation,
                    attempt = self.attempts + 1,
                    "Retrying after conflict"
                );
                Some(self.read())
            }
            SequenceState::Read { snapshot } => Some(self.compute(snapshot)),
            SequenceState::Computed { expected, balance } => {
                let (expected, balance) = (*expected, *balance);
                Some(self.commit(expected, balance))
            }
            SequenceState::Committed { .. } | SequenceState::Failed { .. } => None,
        };

        if let Some(next) = next {
            self.state = next;
        }
        &self.state
    }

    /// Drive the sequence until it reaches a terminal state
    pub fn run_to_completion(mut self, index: usize) -> SequenceOutcome {
        while !self.is_terminal() {
            self.advance();
        }
        self.finish(index)
    }

    /// Consume a terminal sequence into its outcome
    pub fn finish(self, index: usize) -> SequenceOutcome {
        let result = match self.state {
            SequenceState::Committed { balance, version } => Ok(Commit { balance, version }),
            // A retrying caller that still conflicts gave up; a non-retrying one sees the conflict
            SequenceState::Conflicted { error } if self.retry.max_retries > 0 => {
                debug!(account = self.account_id, last = %error, "Giving up after conflicts");
                Err(AccountError::retries_exhausted(
                    self.account_id,
                    self.attempts,
                ))
            }
            SequenceState::Conflicted { error } | SequenceState::Failed { error } => Err(error),
            SequenceState::Idle | SequenceState::Read { .. } | SequenceState::Computed { .. } => {
                Err(AccountError::runtime(format!(
                    "sequence {} finished before committing",
                    index
                )))
            }
        };

        SequenceOutcome {
            index,
            operation: self.operation,
            attempts: self.attempts,
            result,
        }
    }

    fn read(&self) -> SequenceState {
        match self.store.read(self.account_id) {
            Ok(snapshot) => SequenceState::Read { snapshot },
            Err(error) => SequenceState::Failed { error },
        }
    }

    fn compute(&self, snapshot: &Account) -> SequenceState {
        match self.operation.apply(snapshot) {
            Ok(updated) => SequenceState::Computed {
                expected: snapshot.version(),
                balance: updated.balance,
            },
            Err(error) => SequenceState::Failed { error },
        }
    }

    fn commit(&mut self, expected: Version, balance: Decimal) -> SequenceState {
        self.attempts += 1;

        match self.store.write(self.account_id, balance, &expected) {
            Ok(version) => SequenceState::Committed { balance, version },
            Err(error) if error.is_retryable() => SequenceState::Conflicted { error },
            Err(error) => SequenceState::Failed { error },
        }
    }
}
