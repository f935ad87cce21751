//! Account Concurrency Library
//! # Overview
//!
//! This library races concurrent read-modify-write sequences against a single
//! account balance and shows how optimistic concurrency control turns silent
//! lost updates into detected conflicts.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Version, ConcurrencyPolicy, errors)
//! - [`core`] - Business logic components:
//!   - [`core::operations`] - Pure credit and debit functions
//!   - [`core::conflict`] - Version validation and version allocation
//!   - [`core::store`] - In-memory account store with atomic conditional writes
//! - [`workload`] - Read-modify-write sequences and the thread/task runners
//! - [`config`] - Runtime and demo configuration
//! - [`cli`] - CLI arguments parsing
//! - [`demo`] - Runs every policy and round
//! - [`io`] - CSV report output
//!
//! # Concurrency Policies
//!
//! - **None**: Writes always succeed; concurrent updates overwrite each other
//! - **TokenBased**: Each record carries a counter that increments on every write
//! - **RowVersionBased**: Each record carries an opaque 8-byte stamp issued by the store
//!
//! Under both versioned policies a write only commits if the version the writer
//! read is still current. Otherwise it fails with
//! [`AccountError::ConcurrencyConflict`] and the record is left untouched.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod demo;
pub mod io;
pub mod types;
pub mod workload;

pub use config::{DemoConfig, RuntimeConfig};
pub use core::{credit, debit, AccountOperation, AccountStore, InMemoryAccountStore};
pub use demo::RoundReport;
pub use io::write_reports_csv;
pub use types::{
    Account, AccountError, AccountId, ConcurrencyPolicy, NewAccount, RowVersion, Version,
};
pub use workload::{create_strategy, WorkloadPlan, WorkloadReport, WorkloadStrategy};
