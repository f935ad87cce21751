//! Account-related types for the concurrency-control engine
//!
//! This module defines the versioned account record and the value used to
//! request the creation of a new one.

use super::version::Version;
use rust_decimal::Decimal;

/// Account identifier
///
/// Supports account IDs from 0 to 4,294,967,295
pub type AccountId = u32;

/// Balance-bearing account record plus its concurrency marker
///
/// Records handed out by a store are snapshots: mutating one in memory has no
/// effect until it goes back through the store's compare-and-write path.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The account ID, immutable after creation
    pub id: AccountId,

    /// Current balance
    ///
    /// May go negative; overdraft is not validated.
    pub balance: Decimal,

    /// Concurrency marker captured together with the balance
    ///
    /// [`Version::Unversioned`] for records kept without a concurrency policy.
    pub version: Version,
}

impl Account {
    /// Create an account record with the given balance and version
    pub fn new(id: AccountId, balance: Decimal, version: Version) -> Self {
        Account {
            id,
            balance,
            version,
        }
    }

    /// The version this snapshot was read at
    pub fn version(&self) -> Version {
        self.version
    }
}

/// Request to insert a new account into a store
///
/// The store assigns the initial version. When `id` is `None` the store
/// allocates the next free identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// Requested identifier, if any
    pub id: Option<AccountId>,

    /// Opening balance
    pub balance: Decimal,
}

impl NewAccount {
    /// Request an account with a store-allocated identifier
    pub fn new(balance: Decimal) -> Self {
        NewAccount { id: None, balance }
    }

    /// Request a specific identifier
    pub fn with_id(mut self, id: AccountId) -> Self {
        self.id = Some(id);
        self
    }
}
