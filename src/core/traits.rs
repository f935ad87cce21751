//! Core trait for versioned account storage
//!
//! This module defines the store abstraction every workload runs against. A
//! store owns the atomicity of compare-and-write: callers never lock.

use crate::types::{Account, AccountError, AccountId, ConcurrencyPolicy, NewAccount, Version};
use rust_decimal::Decimal;
use std::fmt::Debug;

/// Durable keyed storage supporting versioned compare-and-write
///
/// Implementations must make each `update`/`write` on a given account
/// linearizable with respect to every other `update`/`write` on the same
/// account. Reads and computations leading up to a write may interleave
/// freely.
pub trait AccountStore: Send + Sync + Debug {
    /// Concurrency policy enforced by this store
    fn policy(&self) -> ConcurrencyPolicy;

    /// Insert a new account; the store assigns its initial version
    ///
    /// # Errors
    ///
    /// `DuplicateAccount` if the requested ID is already taken.
    fn create(&self, account: NewAccount) -> Result<AccountId, AccountError>;

    /// Read an account snapshot together with its current version
    ///
    /// # Errors
    ///
    /// `NotFound` if no account exists for `id`.
    fn read(&self, id: AccountId) -> Result<Account, AccountError>;

    /// Compare-and-write driven by a mutation closure
    ///
    /// Atomically validates `expected` against the stored version, applies
    /// `mutate` to the stored record to compute the new balance, assigns the
    /// next version and commits. If validation or `mutate` fails, nothing is
    /// written.
    ///
    /// # Returns
    ///
    /// The version the record carries after the commit.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no account exists for `id`
    /// - `ConcurrencyConflict` if the policy requires a version and it changed
    /// - any error returned by `mutate`
    fn update(
        &self,
        id: AccountId,
        expected: &Version,
        mutate: &mut dyn FnMut(&Account) -> Result<Decimal, AccountError>,
    ) -> Result<Version, AccountError>;

    /// Compare-and-write a precomputed balance
    fn write(
        &self,
        id: AccountId,
        new_balance: Decimal,
        expected: &Version,
    ) -> Result<Version, AccountError> {
        self.update(id, expected, &mut |_: &Account| Ok(new_balance))
    }
}
