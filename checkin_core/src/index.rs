//! In-memory lookup tables over the store.
//!
//! Built once from the store when scan mode starts and updated after each
//! successful append, so duplicate checks and sequence numbers never need
//! to reread the file.

use crate::{BarcodeId, Error, Result, ScanRecord};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct ScanIndex {
    last_seen: HashMap<BarcodeId, DateTime<FixedOffset>>,
    max_sequence: HashMap<NaiveDate, u32>,
}

impl ScanIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ScanRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Fold one record into the index
    pub fn insert(&mut self, record: &ScanRecord) {
        self.last_seen
            .entry(record.barcode_id.clone())
            .and_modify(|seen| {
                if record.timestamp > *seen {
                    *seen = record.timestamp;
                }
            })
            .or_insert(record.timestamp);

        let max = self.max_sequence.entry(record.date()).or_insert(0);
        *max = (*max).max(record.sequence);
    }

    /// Most recent scan of `id`, if any
    pub fn last_seen(&self, id: &BarcodeId) -> Option<DateTime<FixedOffset>> {
        self.last_seen.get(id).copied()
    }

    /// The previous scan of `id` if it happened strictly after `now - window`
    pub fn recent_duplicate(
        &self,
        id: &BarcodeId,
        now: DateTime<FixedOffset>,
        window: Duration,
    ) -> Option<DateTime<FixedOffset>> {
        let cutoff = now - window;
        self.last_seen(id).filter(|seen| *seen > cutoff)
    }

    /// Sequence number the next scan on `date` receives
    pub fn next_sequence(&self, date: NaiveDate) -> Result<u32> {
        self.max_sequence
            .get(&date)
            .copied()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(Error::SequenceExhausted(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    fn record(ts: &str, id: &str, sequence: u32) -> ScanRecord {
        ScanRecord::new(parse_timestamp(ts).unwrap(), id.parse().unwrap(), sequence)
    }

    fn date(s: &str) -> NaiveDate {
        crate::types::parse_date(s).unwrap()
    }

    #[test]
    fn test_next_sequence_follows_daily_max() {
        let index = ScanIndex::from_records(&[
            record("2024-10-24T08:00:00+00:00", "1", 7),
            record("2024-10-25T08:00:00+00:00", "2", 1),
            record("2024-10-25T09:00:00+00:00", "3", 3),
            record("2024-10-25T10:00:00+00:00", "4", 2),
        ]);

        assert_eq!(index.next_sequence(date("2024-10-25")).unwrap(), 4);
        assert_eq!(index.next_sequence(date("2024-10-24")).unwrap(), 8);
        assert_eq!(index.next_sequence(date("2024-10-26")).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_window_is_strict() {
        let index = ScanIndex::from_records(&[record("2024-10-25T08:00:00+00:00", "123", 1)]);
        let id: BarcodeId = "123".parse().unwrap();
        let window = Duration::hours(2);

        let inside = parse_timestamp("2024-10-25T09:59:59+00:00").unwrap();
        assert!(index.recent_duplicate(&id, inside, window).is_some());

        // Exactly two hours later the old scan is no longer strictly inside
        let boundary = parse_timestamp("2024-10-25T10:00:00+00:00").unwrap();
        assert!(index.recent_duplicate(&id, boundary, window).is_none());

        let other: BarcodeId = "456".parse().unwrap();
        assert!(index.recent_duplicate(&other, inside, window).is_none());
    }

    #[test]
    fn test_duplicate_compares_instants_across_offsets() {
        let index = ScanIndex::from_records(&[record("2024-10-25T10:00:00+02:00", "123", 1)]);
        let id: BarcodeId = "123".parse().unwrap();

        // 09:30 UTC is 90 minutes after 08:00 UTC
        let now = parse_timestamp("2024-10-25T09:30:00+00:00").unwrap();
        assert!(index.recent_duplicate(&id, now, Duration::hours(2)).is_some());
    }

    #[test]
    fn test_last_seen_keeps_latest() {
        let index = ScanIndex::from_records(&[
            record("2024-10-25T12:00:00+00:00", "123", 2),
            record("2024-10-25T08:00:00+00:00", "123", 1),
        ]);
        let id: BarcodeId = "123".parse().unwrap();
        assert_eq!(
            index.last_seen(&id),
            Some(parse_timestamp("2024-10-25T12:00:00+00:00").unwrap())
        );
    }

    #[test]
    fn test_insert_updates_incrementally() {
        let mut index = ScanIndex::new();
        let today = date("2024-10-25");
        assert_eq!(index.next_sequence(today).unwrap(), 1);

        index.insert(&record("2024-10-25T08:00:00+00:00", "1", 1));
        index.insert(&record("2024-10-25T08:01:00+00:00", "2", 2));
        assert_eq!(index.next_sequence(today).unwrap(), 3);
    }

    #[test]
    fn test_next_sequence_reports_exhausted_counter() {
        let index = ScanIndex::from_records(&[record("2024-10-25T08:00:00+00:00", "1", u32::MAX)]);

        let err = index.next_sequence(date("2024-10-25")).unwrap_err();
        assert!(matches!(err, Error::SequenceExhausted(d) if d == date("2024-10-25")));
        assert_eq!(index.next_sequence(date("2024-10-26")).unwrap(), 1);
    }
}
