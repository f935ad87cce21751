//! Benchmark suite for comparing policies and execution modes under contention
//!
//! Each benchmark runs one round of racing writers against a freshly seeded
//! store, using the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! # Workloads
//!
//! - `pair` - The credit/debit pair, no retries (one writer conflicts)
//! - `crowd` - 16 crediting writers with enough retries for all to commit

use account_concurrency::cli::ExecutionMode;
use account_concurrency::workload::RetryPolicy;
use account_concurrency::{
    create_strategy, AccountOperation, AccountStore, ConcurrencyPolicy, InMemoryAccountStore,
    NewAccount, RuntimeConfig, WorkloadPlan,
};
use rust_decimal::Decimal;
use std::sync::Arc;

fn main() {
    divan::main();
}

fn pair() -> WorkloadPlan {
    WorkloadPlan::new(
        1,
        vec![
            AccountOperation::Credit(Decimal::new(100, 0)),
            AccountOperation::Debit(Decimal::new(200, 0)),
        ],
    )
}

fn crowd() -> WorkloadPlan {
    WorkloadPlan::new(1, vec![AccountOperation::Credit(Decimal::ONE); 16])
        .with_retry(RetryPolicy::new(15))
}

fn run_round(policy: ConcurrencyPolicy, mode: ExecutionMode, plan: &WorkloadPlan) {
    let store = InMemoryAccountStore::new(policy);
    store
        .create(NewAccount::new(Decimal::new(1000, 0)).with_id(1))
        .expect("Seeding failed");

    create_strategy(mode, RuntimeConfig::default())
        .run(Arc::new(store), plan)
        .expect("Workload failed");
}

/// Unversioned writers racing on OS threads
#[divan::bench]
fn none_threads_pair() {
    run_round(ConcurrencyPolicy::None, ExecutionMode::Threads, &pair());
}

/// Token-versioned writers racing on OS threads
#[divan::bench]
fn token_threads_pair() {
    run_round(ConcurrencyPolicy::TokenBased, ExecutionMode::Threads, &pair());
}

/// Row-versioned writers racing on OS threads
#[divan::bench]
fn row_version_threads_pair() {
    run_round(ConcurrencyPolicy::RowVersionBased, ExecutionMode::Threads, &pair());
}

/// Token-versioned writers racing as tokio tasks
#[divan::bench]
fn token_tasks_pair() {
    run_round(ConcurrencyPolicy::TokenBased, ExecutionMode::Tasks, &pair());
}

/// Sixteen token-versioned writers retrying on OS threads
#[divan::bench]
fn token_threads_crowd() {
    run_round(ConcurrencyPolicy::TokenBased, ExecutionMode::Threads, &crowd());
}

/// Sixteen row-versioned writers retrying as tokio tasks
#[divan::bench]
fn row_version_tasks_crowd() {
    run_round(ConcurrencyPolicy::RowVersionBased, ExecutionMode::Tasks, &crowd());
}
