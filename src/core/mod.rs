//! Core concurrency-control module
//!
//! This module contains the optimistic concurrency control engine:
//! - `traits` - Store abstraction offering versioned compare-and-write
//! - `conflict` - Version validation and next-version generation
//! - `store` - Thread-safe in-memory store built on the conflict detector
//! - `operations` - Pure credit/debit arithmetic over account snapshots

pub mod conflict;
pub mod operations;
pub mod store;
pub mod traits;

pub use conflict::ConflictDetector;
pub use operations::{credit, debit, AccountOperation};
pub use store::InMemoryAccountStore;
pub use traits::AccountStore;
