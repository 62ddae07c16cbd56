//! Core domain types for the check-in logger.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, SubsecRound};
use std::fmt;
use std::str::FromStr;

/// Timestamp layout used in the store, e.g. `2024-10-25T09:14:02+02:00`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Date layout accepted by the export flags
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current local time at second precision
pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset().trunc_subsecs(0)
}

/// A scanned ID: a non-empty run of ASCII digits
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BarcodeId(String);

impl BarcodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BarcodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(Error::InvalidBarcode(s.to_owned()))
        }
    }
}

impl fmt::Display for BarcodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One check-in as persisted in the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub barcode_id: BarcodeId,
    /// 1-based ordinal of this scan within its local calendar day
    pub sequence: u32,
}

impl ScanRecord {
    pub fn new(timestamp: DateTime<FixedOffset>, barcode_id: BarcodeId, sequence: u32) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            barcode_id,
            sequence,
        }
    }

    /// Calendar date as written in the timestamp's own offset
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for ScanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.timestamp_string(),
            self.barcode_id,
            self.sequence
        )
    }
}

/// Parse a stored timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| Error::InvalidTimestamp {
        value: value.to_owned(),
        source,
    })
}

/// Parse an export date flag (`YYYY-MM-DD`)
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| Error::InvalidDate(format!("{:?}: {} (expected YYYY-MM-DD)", value, e)))
}
