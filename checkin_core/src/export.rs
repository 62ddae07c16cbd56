//! Export mode: copy the records of a local date range into a new CSV file.

use crate::store::write_records;
use crate::types::parse_date;
use crate::{CsvStore, Error, Result, ScanRecord};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use std::path::{Path, PathBuf};

/// Inclusive range of local calendar days
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self> {
        if let Some(end) = end {
            if end < start {
                return Err(Error::InvalidDate(format!(
                    "end date {} is before start date {}",
                    end, start
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Build a window from `YYYY-MM-DD` flag values
    pub fn parse(start: &str, end: Option<&str>) -> Result<Self> {
        let start = parse_date(start)?;
        let end = end.map(parse_date).transpose()?;
        Self::new(start, end)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.unwrap_or(self.start)
    }

    /// Half-open instant range `[start midnight, midnight after last day)` in `tz`
    pub fn bounds<Tz: TimeZone>(
        &self,
        tz: &Tz,
    ) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let after = self
            .last_day()
            .succ_opt()
            .ok_or_else(|| Error::InvalidDate(format!("{} is out of range", self.last_day())))?;
        Ok((local_midnight(tz, self.start)?, local_midnight(tz, after)?))
    }

    /// Output file name for `count` matching records
    pub fn file_name(&self, count: usize) -> String {
        match self.end {
            None => format!("export_{}_{}_records.csv", self.start, count),
            Some(end) => format!("export_{}_to_{}_{}_records.csv", self.start, end, count),
        }
    }
}

/// What an export run produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, count: usize },
    /// Nothing matched; no file was created
    Empty,
}

/// Keep records with `start <= timestamp < end`, in store order
pub fn filter_records(
    records: Vec<ScanRecord>,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Vec<ScanRecord> {
    records
        .into_iter()
        .filter(|r| r.timestamp >= start && r.timestamp < end)
        .collect()
}

/// Export every record of `window` (interpreted in `tz`) into `output_dir`
pub fn export<Tz: TimeZone>(
    store: &CsvStore,
    window: &DateWindow,
    tz: &Tz,
    output_dir: &Path,
) -> Result<ExportOutcome> {
    if !store.exists() {
        return Err(Error::StoreNotFound(store.path().to_path_buf()));
    }

    let (start, end) = window.bounds(tz)?;
    let records = store.read_records()?;
    let total = records.len();
    let matched = filter_records(records, start, end);

    tracing::debug!(
        "{} of {} records fall in [{}, {})",
        matched.len(),
        total,
        start,
        end
    );

    if matched.is_empty() {
        return Ok(ExportOutcome::Empty);
    }

    let path = output_dir.join(window.file_name(matched.len()));
    write_records(&path, &matched)?;
    tracing::info!("Exported {} records to {:?}", matched.len(), path);

    Ok(ExportOutcome::Written {
        path,
        count: matched.len(),
    })
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<FixedOffset>> {
    let midnight = date.and_time(NaiveTime::MIN);
    // Zones that spring forward at midnight start the day at 01:00
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| Error::InvalidDate(format!("{} has no local midnight", date)))
}
