//! Error types for the concurrency-control engine
//!
//! This module defines all error types that can occur while reading, creating
//! and writing versioned accounts, and while driving concurrent workloads.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: Account not found, duplicate account on create
//! - **Concurrency Errors**: Version mismatch on compare-and-write, retries exhausted
//! - **Argument Errors**: Non-positive operation amounts
//! - **Arithmetic Errors**: Balance or token overflow
//! - **Runtime Errors**: Worker runtime could not be started or a worker panicked

use super::account::AccountId;
use super::version::Version;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the concurrency-control engine
///
/// Every failure is returned to the immediate caller. Only
/// [`AccountError::ConcurrencyConflict`] is recoverable by re-reading the
/// account and retrying the whole read-modify-write cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccountError {
    /// No account exists for the given ID
    ///
    /// Not retried; surfaced immediately.
    #[error("Account {id} not found")]
    NotFound {
        /// The ID that was looked up
        id: AccountId,
    },

    /// The version presented by a writer no longer matches the stored one
    ///
    /// Recoverable: the caller may re-read and retry. The stale mutation
    /// has not been applied.
    #[error("Concurrency conflict on account {id}: expected version {expected}, actual {actual}")]
    ConcurrencyConflict {
        /// Account ID
        id: AccountId,
        /// Version the writer read
        expected: Version,
        /// Version currently stored
        actual: Version,
    },

    /// Operation amount was zero or negative
    #[error("Invalid amount {amount} for {operation}: amount must be positive")]
    InvalidArgument {
        /// Operation that rejected the amount
        operation: String,
        /// The rejected amount
        amount: Decimal,
    },

    /// An account with the requested ID already exists
    #[error("Account {id} already exists")]
    DuplicateAccount {
        /// Account ID
        id: AccountId,
    },

    /// Arithmetic overflow would occur
    ///
    /// The write is rejected to keep the record intact.
    #[error("Arithmetic overflow in {operation} for account {id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account ID
        id: AccountId,
    },

    /// A bounded retry loop gave up while still conflicting
    #[error("Gave up on account {id} after {attempts} conflicting attempts")]
    RetriesExhausted {
        /// Account ID
        id: AccountId,
        /// Number of commit attempts made
        attempts: u32,
    },

    /// Worker runtime failure
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the failure
        message: String,
    },
}

impl AccountError {
    /// Whether re-reading and retrying may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AccountError::ConcurrencyConflict { .. })
    }

    /// Create a NotFound error
    pub fn not_found(id: AccountId) -> Self {
        AccountError::NotFound { id }
    }

    /// Create a ConcurrencyConflict error
    pub fn concurrency_conflict(id: AccountId, expected: Version, actual: Version) -> Self {
        AccountError::ConcurrencyConflict {
            id,
            expected,
            actual,
        }
    }

    /// Create an InvalidArgument error
    pub fn invalid_argument(operation: &str, amount: Decimal) -> Self {
        AccountError::InvalidArgument {
            operation: operation.to_string(),
            amount,
        }
    }

    /// Create a DuplicateAccount error
    pub fn duplicate_account(id: AccountId) -> Self {
        AccountError::DuplicateAccount { id }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, id: AccountId) -> Self {
        AccountError::ArithmeticOverflow {
            operation: operation.to_string(),
            id,
        }
    }

    /// Create a RetriesExhausted error
    pub fn retries_exhausted(id: AccountId, attempts: u32) -> Self {
        AccountError::RetriesExhausted { id, attempts }
    }

    /// Create a Runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        AccountError::Runtime {
            message: message.into(),
        }
    }
}
