//! Thread-safe in-memory account store with versioned compare-and-write
//!
//! This module provides the `InMemoryAccountStore` struct, which keeps account
//! records in a concurrent map and serializes every compare-and-write on the
//! same account.
//!
//! # Design
//!
//! Records live in a `DashMap` keyed by account ID. A write takes the entry's
//! shard lock, asks the `ConflictDetector` to validate the presented version,
//! computes the new balance and stores it together with the next version
//! before the lock is released. Validation and commit are therefore one
//! indivisible step per account, while writes to accounts in different shards
//! proceed in parallel.
//!
//! # Thread Safety
//!
//! All operations are safe to call concurrently. Reads return snapshots; a
//! snapshot may be stale by the time it is written back, which is exactly what
//! the version check exists to catch.

use crate::core::conflict::ConflictDetector;
use crate::core::traits::AccountStore;
use crate::types::{Account, AccountError, AccountId, ConcurrencyPolicy, NewAccount, Version};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, warn};

/// First identifier handed out for accounts created without an explicit ID
const FIRST_ACCOUNT_ID: AccountId = 1;

/// In-memory account store enforcing one concurrency policy
///
/// # Thread Safety
///
/// The internal `DashMap` ensures that:
/// - Concurrent reads never block each other on different accounts
/// - Compare-and-writes on the same account are strictly serialized
/// - A write's validation, balance change and version change are observed
///   together or not at all
#[derive(Debug)]
pub struct InMemoryAccountStore {
    /// Account records by ID
    accounts: DashMap<AccountId, Account>,

    /// Version validation and generation
    detector: ConflictDetector,

    /// Next candidate for store-allocated IDs
    next_id: AtomicU32,
}

impl InMemoryAccountStore {
    /// Create an empty store enforcing `policy`
    pub fn new(policy: ConcurrencyPolicy) -> Self {
        Self {
            accounts: DashMap::new(),
            detector: ConflictDetector::new(policy),
            next_id: AtomicU32::new(FIRST_ACCOUNT_ID),
        }
    }

    /// Number of accounts in the store
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn insert_vacant(&self, id: AccountId, balance: Decimal) -> Option<Version> {
        match self.accounts.entry(id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                let version = self.detector.initial_version();
                vacant.insert(Account::new(id, balance, version));
                Some(version)
            }
        }
    }
}

impl AccountStore for InMemoryAccountStore {
    fn policy(&self) -> ConcurrencyPolicy {
        self.detector.policy()
    }

    fn create(&self, account: NewAccount) -> Result<AccountId, AccountError> {
        let NewAccount { id, balance } = account;

        let (id, version) = match id {
            Some(id) => {
                let version = self
                    .insert_vacant(id, balance)
                    .ok_or_else(|| AccountError::duplicate_account(id))?;
                (id, version)
            }
            // Skip over IDs that were claimed explicitly
            None => loop {
                let candidate = self.next_id.fetch_add(1, Ordering::Relaxed);
                if let Some(version) = self.insert_vacant(candidate, balance) {
                    break (candidate, version);
                }
            },
        };

        debug!(account = id, %balance, %version, "Created account");
        Ok(id)
    }

    fn read(&self, id: AccountId) -> Result<Account, AccountError> {
        self.accounts
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AccountError::not_found(id))
    }

    /// Compare-and-write under the account's entry lock
    ///
    /// `mutate` runs while the lock is held and must not call back into this
    /// store.
    fn update(
        &self,
        id: AccountId,
        expected: &Version,
        mutate: &mut dyn FnMut(&Account) -> Result<Decimal, AccountError>,
    ) -> Result<Version, AccountError> {
        let mut entry = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AccountError::not_found(id))?;
        let record = entry.value_mut();

        if let Err(conflict) = self.detector.validate(id, expected, &record.version) {
            warn!(account = id, %expected, actual = %record.version, "Rejected stale write");
            return Err(conflict);
        }

        let balance = mutate(&*record)?;
        let version = self.detector.next_version(id, &record.version)?;

        record.balance = balance;
        record.version = version;

        debug!(account = id, %balance, %version, "Committed write");
        Ok(version)
    }
}
