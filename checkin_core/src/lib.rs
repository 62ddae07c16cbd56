#![forbid(unsafe_code)]

//! Core logic for the checkin barcode logger.
//!
//! This crate provides:
//! - Domain types (barcode IDs, scan records)
//! - The CSV scan store
//! - Duplicate and daily-sequence lookups
//! - Scan and export modes

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod index;
pub mod scan;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::{CsvStore, RecordSink};
pub use index::ScanIndex;
pub use scan::{run_session, ScanOutcome, ScanSummary, Scanner};
pub use export::{export, DateWindow, ExportOutcome};
