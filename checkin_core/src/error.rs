//! Error types for the checkin_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for checkin_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Barcode input that is not a non-empty run of digits
    #[error("Invalid barcode ID: {0:?}")]
    InvalidBarcode(String),

    /// Export date flag that could not be parsed or ordered
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Stored timestamp that does not match the record format
    #[error("Invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },

    /// Stored row with an unusable field
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The day's sequence counter has no room for another scan
    #[error("Sequence for {0} is exhausted")]
    SequenceExhausted(chrono::NaiveDate),

    /// Export requested against a store that does not exist yet
    #[error("Store not found at {}", .0.display())]
    StoreNotFound(PathBuf),
}
