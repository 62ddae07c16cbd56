//! Flat-file CSV store for scan records.
//!
//! The store is append-only with three columns and no header row:
//! `timestamp,barcode_id,sequence`. Reads take a shared lock and appends
//! take an exclusive lock.

use crate::types::parse_timestamp;
use crate::{BarcodeId, Error, Result, ScanRecord};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Record sink trait for persisting scans
pub trait RecordSink {
    fn append(&mut self, record: &ScanRecord) -> Result<()>;
}

/// A row as it appears on disk
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    timestamp: String,
    barcode_id: String,
    sequence: String,
}

impl From<&ScanRecord> for CsvRow {
    fn from(record: &ScanRecord) -> Self {
        CsvRow {
            timestamp: record.timestamp_string(),
            barcode_id: record.barcode_id.to_string(),
            sequence: record.sequence.to_string(),
        }
    }
}

impl TryFrom<CsvRow> for ScanRecord {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let timestamp = parse_timestamp(row.timestamp.trim())?;
        let barcode_id: BarcodeId = row.barcode_id.trim().parse()?;
        let sequence = row
            .sequence
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| Error::InvalidRecord(format!("bad sequence {:?}", row.sequence)))?;

        Ok(ScanRecord {
            timestamp,
            barcode_id,
            sequence,
        })
    }
}

/// CSV-backed scan store
#[derive(Clone, Debug)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Create a store handle for the given path; nothing is opened yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every well-formed record in file order
    ///
    /// A missing file reads as empty. Malformed rows are logged and skipped.
    pub fn read_records(&self) -> Result<Vec<ScanRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let records = read_rows(BufReader::new(&file));

        file.unlock()?;
        tracing::debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl RecordSink for CsvStore {
    fn append(&mut self, record: &ScanRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&file);
        writer.serialize(CsvRow::from(record))?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended {} to {:?}", record, self.path);
        Ok(())
    }
}

fn read_rows<R: std::io::Read>(reader: R) -> Vec<ScanRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result.map_err(Error::from).and_then(ScanRecord::try_from) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping malformed row {}: {}", index + 1, e);
            }
        }
    }
    records
}

/// Write records to a fresh CSV file, replacing any existing file
pub fn write_records(path: &Path, records: &[ScanRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}
