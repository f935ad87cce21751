//! Account Concurrency Demo CLI
//!
//! Races concurrent balance updates against one account under each
//! concurrency-control policy and reports what happened.
//!
//! # Usage
//!
//! ```bash
//! cargo run > report.csv
//! cargo run -- --policy token --max-retries 1
//! cargo run -- --mode threads --rounds 5 --operations credit:100,debit:200,credit:50
//! RUST_LOG=debug cargo run -- --policy none
//! ```
//!
//! Progress is logged to stderr through `tracing` (filtered by `RUST_LOG`,
//! default `info`). The per-round CSV report goes to stdout.
//!
//! # Exit Codes
//!
//! - 0: Success (conflicts are expected outcomes, not failures)
//! - 1: Error (invalid arguments, runtime failure, output error)

use account_concurrency::{cli, demo, io};
use std::process;
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command-line arguments using clap
    let args = cli::parse_args();
    let config = args.to_demo_config();

    let reports = match demo::run(&config) {
        Ok(reports) => reports,
        Err(e) => {
            error!("Demo failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Output goes to stdout
    let mut output = std::io::stdout();
    if let Err(e) = io::write_reports_csv(&reports, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
