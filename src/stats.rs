//! Statistics tracking for the listener.
//!
//! Counters for processed lines, applied updates and parse failures.
//! Everything is atomic so the receive loop can record without blocking
//! readers.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Thread-safe counters for console traffic.
#[derive(Debug)]
pub struct ListenerStats {
    /// Total lines pulled from the transport
    pub lines_total: AtomicU64,

    /// Interactive prompt lines (discarded)
    pub prompt_lines: AtomicU64,

    /// Lines matching no known keyword prefix
    pub unrecognized_lines: AtomicU64,

    /// Recognized lines that failed field extraction
    pub parse_failures: AtomicU64,

    /// Device status fields overwritten
    pub status_updates: AtomicU64,

    /// GPS reports that matched a known station
    pub gps_matched: AtomicU64,

    /// GPS reports from ids with no directory record
    pub gps_unmatched: AtomicU64,

    /// Total bytes of raw input processed
    pub bytes_processed: AtomicU64,

    /// When stats collection started
    start_time: Instant,
}

impl ListenerStats {
    /// Create a new statistics collector.
    pub fn new() -> Self {
        Self {
            lines_total: AtomicU64::new(0),
            prompt_lines: AtomicU64::new(0),
            unrecognized_lines: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
            status_updates: AtomicU64::new(0),
            gps_matched: AtomicU64::new(0),
            gps_unmatched: AtomicU64::new(0),
            bytes_processed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one raw line of the given byte length.
    pub fn record_line(&self, bytes: u64) {
        self.lines_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_processed.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a discarded prompt line.
    pub fn record_prompt(&self) {
        self.prompt_lines.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a line matching no known prefix.
    pub fn record_unrecognized(&self) {
        self.unrecognized_lines.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a recognized line that failed extraction.
    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an applied status field update.
    pub fn record_status_update(&self) {
        self.status_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a GPS report that updated at least one station.
    pub fn record_gps_matched(&self) {
        self.gps_matched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a GPS report from an unknown station id.
    pub fn record_gps_unmatched(&self) {
        self.gps_unmatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Elapsed time since stats collection started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Current line processing rate.
    pub fn lines_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.lines_total.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Generate a summary report.
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            elapsed_secs: self.elapsed().as_secs_f64(),
            lines_total: self.lines_total.load(Ordering::Relaxed),
            prompt_lines: self.prompt_lines.load(Ordering::Relaxed),
            unrecognized_lines: self.unrecognized_lines.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            status_updates: self.status_updates.load(Ordering::Relaxed),
            gps_matched: self.gps_matched.load(Ordering::Relaxed),
            gps_unmatched: self.gps_unmatched.load(Ordering::Relaxed),
            bytes_processed: self.bytes_processed.load(Ordering::Relaxed),
            lines_per_second: self.lines_per_second(),
        }
    }
}

impl Default for ListenerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of collected statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub elapsed_secs: f64,
    pub lines_total: u64,
    pub prompt_lines: u64,
    pub unrecognized_lines: u64,
    pub parse_failures: u64,
    pub status_updates: u64,
    pub gps_matched: u64,
    pub gps_unmatched: u64,
    pub bytes_processed: u64,
    pub lines_per_second: f64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "═══════════════════════════════════════════")?;
        writeln!(f, "            CICS LISTENER STATISTICS")?;
        writeln!(f, "═══════════════════════════════════════════")?;
        writeln!(f)?;
        writeln!(f, "Runtime: {:.1}s", self.elapsed_secs)?;
        writeln!(f, "Lines processed: {}", self.lines_total)?;
        writeln!(f, "Prompt lines: {}", self.prompt_lines)?;
        writeln!(f, "Unrecognized lines: {}", self.unrecognized_lines)?;
        writeln!(f, "Parse failures: {}", self.parse_failures)?;
        writeln!(f, "Status updates: {}", self.status_updates)?;
        writeln!(
            f,
            "GPS reports: {} matched, {} unknown",
            self.gps_matched, self.gps_unmatched
        )?;
        writeln!(f, "Bytes processed: {}", self.bytes_processed)?;
        write!(f, "Rate: {:.1} lines/sec", self.lines_per_second)
    }
}
