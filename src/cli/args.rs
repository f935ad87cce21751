use crate::config::{DemoConfig, RuntimeConfig};
use crate::core::AccountOperation;
use crate::types::ConcurrencyPolicy;
use crate::workload::RetryPolicy;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;

/// Race concurrent balance updates under different concurrency-control policies
#[derive(Parser, Debug)]
#[command(name = "occ-demo")]
#[command(about = "Race concurrent balance updates under different concurrency-control policies", long_about = None)]
pub struct CliArgs {
    /// Concurrency policies to exercise (default: all)
    #[arg(
        long = "policy",
        value_name = "POLICY",
        value_delimiter = ',',
        help = "Concurrency policy: 'none', 'token' or 'row-version' (repeatable, default: all)"
    )]
    pub policies: Vec<ConcurrencyPolicy>,

    /// Operations raced against each other, one writer per operation
    #[arg(
        long = "operations",
        value_name = "OPS",
        value_delimiter = ',',
        default_values = ["credit:100", "debit:200"],
        help = "Comma-separated operations, e.g. 'credit:100,debit:200'"
    )]
    pub operations: Vec<AccountOperation>,

    /// Number of rounds per policy
    #[arg(
        long = "rounds",
        value_name = "COUNT",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Rounds per policy; the balance carries over between rounds"
    )]
    pub rounds: u32,

    /// Opening balance of the demo account
    #[arg(
        long = "initial-balance",
        value_name = "AMOUNT",
        default_value = "1000.0",
        help = "Opening balance of the demo account"
    )]
    pub initial_balance: Decimal,

    /// Retries allowed after a conflict
    #[arg(
        long = "max-retries",
        value_name = "COUNT",
        default_value_t = 0,
        help = "Retries allowed after a conflict (default: 0, report the conflict)"
    )]
    pub max_retries: u32,

    /// Let writers run without waiting for each other's first read
    #[arg(long = "no-barrier", help = "Do not hold writers after their first read")]
    pub no_barrier: bool,

    /// How writers are executed
    #[arg(
        long = "mode",
        value_name = "MODE",
        default_value = "tasks",
        help = "Execution mode: 'threads' for OS threads or 'tasks' for tokio tasks"
    )]
    pub mode: ExecutionMode,

    /// Worker threads for task mode
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        help = "Worker threads for task mode (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,
}

/// Available execution modes for workload rounds
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    Threads,
    Tasks,
}

impl CliArgs {
    /// Create a DemoConfig from CLI arguments
    ///
    /// Missing policies mean all of them. A zero worker-thread count falls
    /// back to the default with a warning.
    pub fn to_demo_config(&self) -> DemoConfig {
        let policies = if self.policies.is_empty() {
            ConcurrencyPolicy::ALL.to_vec()
        } else {
            self.policies.clone()
        };

        let runtime = self
            .worker_threads
            .map(RuntimeConfig::new)
            .unwrap_or_default();

        DemoConfig {
            policies,
            initial_balance: self.initial_balance,
            operations: self.operations.clone(),
            rounds: self.rounds,
            retry: RetryPolicy::new(self.max_retries),
            synchronize_reads: !self.no_barrier,
            mode: self.mode,
            runtime,
        }
    }
}
