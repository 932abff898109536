use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One recorded (date, ticker, value) observation in the history log.
/// `value` is in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub ticker: String,
    pub value: f64,
}

impl Snapshot {
    pub fn new(date: NaiveDate, ticker: impl Into<String>, value: f64) -> Self {
        Self {
            date,
            ticker: ticker.into().trim().to_uppercase(),
            value,
        }
    }
}

/// In-memory view of the append-only snapshot history.
///
/// Snapshots are grouped per ticker and kept sorted by date. Several
/// snapshots may share a date (re-runs under the append policy); they keep
/// their insertion order and lookups return the last one recorded.
#[derive(Debug, Clone, Default)]
pub struct SnapshotLog {
    by_ticker: HashMap<String, Vec<Snapshot>>,
    len: usize,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshots(snapshots: impl IntoIterator<Item = Snapshot>) -> Self {
        let mut log = Self::new();
        for snapshot in snapshots {
            log.append(snapshot);
        }
        log
    }

    /// Record a snapshot. Existing snapshots are never modified or removed.
    pub fn append(&mut self, snapshot: Snapshot) {
        let entries = self.by_ticker.entry(snapshot.ticker.clone()).or_default();
        // Insert after every entry with the same or an earlier date.
        let idx = entries.partition_point(|s| s.date <= snapshot.date);
        entries.insert(idx, snapshot);
        self.len += 1;
    }

    /// The most recent snapshot for `ticker` dated on or before `date`.
    pub fn latest_on_or_before(&self, ticker: &str, date: NaiveDate) -> Option<&Snapshot> {
        let entries = self.by_ticker.get(&ticker.trim().to_uppercase())?;
        let idx = entries.partition_point(|s| s.date <= date);
        idx.checked_sub(1).map(|i| &entries[i])
    }

    /// Total number of snapshots across all tickers.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
