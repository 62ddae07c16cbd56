//! Scan mode: validate, deduplicate, number and persist check-ins.

use crate::{BarcodeId, RecordSink, Result, ScanIndex, ScanRecord};
use chrono::{DateTime, Duration, FixedOffset};
use std::io::{BufRead, Write};

/// Token that ends the interactive loop
pub const EXIT_TOKEN: &str = "exit";

/// Result of a single scan attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Recorded(ScanRecord),
    /// Same ID already scanned inside the window, at `previous`
    Duplicate { previous: DateTime<FixedOffset> },
}

/// Owns the sink and the lookup state for one scan-mode run
pub struct Scanner<S> {
    sink: S,
    index: ScanIndex,
    window: Duration,
}

impl<S: RecordSink> Scanner<S> {
    pub fn new(sink: S, index: ScanIndex, window: Duration) -> Self {
        Self {
            sink,
            index,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a scan of `id` at `now`
    ///
    /// The index only changes when the append succeeds, so a failed write
    /// leaves the next scan's sequence number untouched.
    pub fn scan(&mut self, id: BarcodeId, now: DateTime<FixedOffset>) -> Result<ScanOutcome> {
        if let Some(previous) = self.index.recent_duplicate(&id, now, self.window) {
            tracing::debug!("{} already scanned at {}", id, previous);
            return Ok(ScanOutcome::Duplicate { previous });
        }

        let sequence = self.index.next_sequence(now.date_naive())?;
        let record = ScanRecord::new(now, id, sequence);

        self.sink.append(&record)?;
        self.index.insert(&record);

        Ok(ScanOutcome::Recorded(record))
    }
}

/// Tallies for one interactive session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub recorded: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Run the interactive loop until `exit` or end of input
///
/// `clock` is consulted once per accepted barcode. Failed scans are
/// reported to `output` and the loop carries on.
pub fn run_session<S, R, W, C>(
    scanner: &mut Scanner<S>,
    mut input: R,
    mut output: W,
    mut clock: C,
) -> Result<ScanSummary>
where
    S: RecordSink,
    R: BufRead,
    W: Write,
    C: FnMut() -> DateTime<FixedOffset>,
{
    let mut summary = ScanSummary::default();
    let mut buf = Vec::new();

    writeln!(output, "Barcode scanner ready. Type '{}' to quit.", EXIT_TOKEN)?;

    loop {
        write!(output, "Barcode ID: ")?;
        output.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            writeln!(output)?;
            break;
        }
        // Invalid UTF-8 becomes U+FFFD and fails the digit check
        let line = String::from_utf8_lossy(&buf);
        let token = line.trim();

        if token == EXIT_TOKEN {
            break;
        }

        let id: BarcodeId = match token.parse() {
            Ok(id) => id,
            Err(_) => {
                summary.rejected += 1;
                writeln!(output, "Invalid input. Please enter a numeric barcode ID.")?;
                continue;
            }
        };

        match scanner.scan(id, clock()) {
            Ok(ScanOutcome::Recorded(record)) => {
                summary.recorded += 1;
                writeln!(output, "Recorded: {}", record)?;
            }
            Ok(ScanOutcome::Duplicate { .. }) => {
                summary.duplicates += 1;
                writeln!(
                    output,
                    "Duplicate entry within {} detected. Skipping entry.",
                    describe_window(scanner.window())
                )?;
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Failed to record scan: {}", e);
                writeln!(output, "Error recording scan: {}", e)?;
            }
        }
    }

    writeln!(output, "Exiting scan mode.")?;
    tracing::info!(
        "Scan session ended: {} recorded, {} duplicates, {} rejected, {} failed",
        summary.recorded,
        summary.duplicates,
        summary.rejected,
        summary.failed
    );
    Ok(summary)
}

fn describe_window(window: Duration) -> String {
    let minutes = window.num_minutes();
    match minutes {
        60 => "1 hour".to_string(),
        m if m % 60 == 0 => format!("{} hours", m / 60),
        1 => "1 minute".to_string(),
        m => format!("{} minutes", m),
    }
}
