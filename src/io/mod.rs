//! I/O module
//!
//! Handles output of workload results.
//!
//! # Components
//!
//! - `report_csv` - CSV serialization of round reports

pub mod report_csv;

pub use report_csv::{write_reports_csv, ReportRow};
