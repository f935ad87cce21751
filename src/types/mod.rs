//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Versioned account record and creation request
//! - `version`: Concurrency policies and version markers
//! - `error`: Error types for the concurrency-control engine

pub mod account;
pub mod error;
pub mod version;

pub use account::{Account, AccountId, NewAccount};
pub use error::AccountError;
pub use version::{ConcurrencyPolicy, RowVersion, Version};
