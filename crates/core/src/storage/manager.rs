use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::analytics::{PerformanceRecord, PortfolioTotals};
use crate::models::asset::Holding;
use crate::models::settings::{Settings, SnapshotPolicy};
use crate::models::snapshot::{Snapshot, SnapshotLog};

use super::backend::{Row, SpreadsheetBackend};
use super::format;

/// How a batch of snapshots was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotWrite {
    /// Nothing to write.
    Skipped,
    /// Rows added after the existing ones; nothing else touched.
    Appended(usize),
    /// Today's earlier rows for these tickers were dropped and the log rewritten.
    Replaced { written: usize, dropped: usize },
}

/// High-level sheet operations: read holdings and history, write snapshots,
/// the daily totals and the report.
///
/// Borrows the session for the length of the run; it never owns it.
pub struct StorageManager<'a> {
    backend: &'a dyn SpreadsheetBackend,
    settings: &'a Settings,
}

impl<'a> StorageManager<'a> {
    pub fn new(backend: &'a dyn SpreadsheetBackend, settings: &'a Settings) -> Self {
        Self { backend, settings }
    }

    /// Read and parse the holdings worksheet. Any failure here is fatal.
    pub async fn read_holdings(&self) -> Result<Vec<Holding>, CoreError> {
        let sheet = &self.settings.holdings_sheet;
        let rows = self.backend.read_rows(sheet).await?;
        let holdings = format::parse_holdings(&rows, &self.settings.base_currency)?;
        info!(sheet = %sheet, holdings = holdings.len(), "holdings loaded");
        Ok(holdings)
    }

    /// Load the snapshot history. A missing worksheet is an empty history;
    /// it is created on the first write.
    pub async fn load_snapshot_log(&self) -> Result<SnapshotLog, CoreError> {
        let sheet = &self.settings.snapshot_sheet;
        let rows = match self.backend.read_rows(sheet).await {
            Ok(rows) => rows,
            Err(CoreError::WorksheetNotFound { .. }) => {
                info!(sheet = %sheet, "no snapshot history yet");
                return Ok(SnapshotLog::new());
            }
            Err(e) => return Err(e),
        };
        let log = SnapshotLog::from_snapshots(format::parse_snapshots(&rows));
        info!(sheet = %sheet, snapshots = log.len(), "snapshot history loaded");
        Ok(log)
    }

    /// Write today's snapshots according to the configured policy.
    ///
    /// New (date, ticker) pairs are always appended. Under
    /// [`SnapshotPolicy::Replace`], if the log already holds rows for `date`
    /// and one of the tickers being written, those rows are dropped and the
    /// worksheet is rewritten; rows for other dates are carried over as read.
    pub async fn record_snapshots(
        &self,
        snapshots: &[Snapshot],
        date: NaiveDate,
    ) -> Result<SnapshotWrite, CoreError> {
        if snapshots.is_empty() {
            return Ok(SnapshotWrite::Skipped);
        }
        let sheet = &self.settings.snapshot_sheet;
        let base = &self.settings.base_currency;

        self.backend.ensure_worksheet(sheet).await?;
        let existing = self.backend.read_rows(sheet).await?;
        let new_rows: Vec<Row> = snapshots.iter().map(format::snapshot_row).collect();

        if existing.is_empty() {
            let mut rows = Vec::with_capacity(new_rows.len() + 1);
            rows.push(format::snapshot_header(base));
            rows.extend(new_rows);
            self.backend.append_rows(sheet, &rows).await?;
            return Ok(SnapshotWrite::Appended(snapshots.len()));
        }

        let tickers: HashSet<&str> = snapshots.iter().map(|s| s.ticker.as_str()).collect();
        let is_stale = |row: &Row| {
            format::parse_snapshot_row(row)
                .is_some_and(|s| s.date == date && tickers.contains(s.ticker.as_str()))
        };
        let stale = existing.iter().filter(|row| is_stale(*row)).count();

        if self.settings.snapshot_policy == SnapshotPolicy::Append || stale == 0 {
            self.backend.append_rows(sheet, &new_rows).await?;
            return Ok(SnapshotWrite::Appended(snapshots.len()));
        }

        debug!(sheet = %sheet, dropped = stale, "replacing today's snapshots");
        let mut rows: Vec<Row> = existing.into_iter().filter(|row| !is_stale(row)).collect();
        rows.extend(new_rows);
        self.backend.overwrite_rows(sheet, &rows).await?;
        Ok(SnapshotWrite::Replaced {
            written: snapshots.len(),
            dropped: stale,
        })
    }

    /// Write today's totals to the daily log, replacing any row for the same date.
    pub async fn record_daily_totals(&self, totals: &PortfolioTotals) -> Result<(), CoreError> {
        let sheet = &self.settings.daily_log_sheet;
        let existing = if self.backend.ensure_worksheet(sheet).await? {
            Vec::new()
        } else {
            self.backend.read_rows(sheet).await?
        };
        let rows = format::merge_daily_log(&existing, totals, &self.settings.base_currency);
        self.backend.overwrite_rows(sheet, &rows).await?;
        info!(sheet = %sheet, date = %totals.date, "daily totals recorded");
        Ok(())
    }

    /// Overwrite the report worksheet with this run's records.
    pub async fn write_report(
        &self,
        records: &[PerformanceRecord],
        totals: &PortfolioTotals,
    ) -> Result<(), CoreError> {
        let sheet = &self.settings.report_sheet;
        self.backend.ensure_worksheet(sheet).await?;
        let rows = format::render_report(records, totals, &self.settings.base_currency);
        self.backend.overwrite_rows(sheet, &rows).await?;
        info!(sheet = %sheet, rows = records.len(), "report written");
        Ok(())
    }
}
