use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when today's snapshots already exist in the history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotPolicy {
    /// Drop today's earlier rows for the tickers being written, then write.
    Replace,
    /// Always append, leaving duplicates for the same (date, ticker).
    Append,
}

impl std::str::FromStr for SnapshotPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" | "overwrite" => Ok(SnapshotPolicy::Replace),
            "append" | "duplicate" => Ok(SnapshotPolicy::Append),
            other => Err(format!("unknown snapshot policy '{other}' (expected 'replace' or 'append')")),
        }
    }
}

/// A spreadsheet addressed either by its title or by its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpreadsheetRef {
    Title(String),
    Id(String),
}

impl SpreadsheetRef {
    /// `id:<spreadsheet id>` selects by id; anything else is a title.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.strip_prefix("id:") {
            Some(id) => SpreadsheetRef::Id(id.trim().to_string()),
            None => SpreadsheetRef::Title(value.to_string()),
        }
    }
}

impl std::fmt::Display for SpreadsheetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadsheetRef::Title(title) => write!(f, "{title}"),
            SpreadsheetRef::Id(id) => write!(f, "id:{id}"),
        }
    }
}

/// One worksheet (tab) inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetRef {
    pub spreadsheet: SpreadsheetRef,
    pub worksheet: String,
}

impl SheetRef {
    pub fn new(spreadsheet: SpreadsheetRef, worksheet: impl Into<String>) -> Self {
        Self {
            spreadsheet,
            worksheet: worksheet.into(),
        }
    }
}

impl std::fmt::Display for SheetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.spreadsheet, self.worksheet)
    }
}

/// Run settings. Loaded from the environment by [`crate::config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the service-account JSON key.
    pub credentials_file: PathBuf,

    /// Currency every value is reported in (e.g., "TRY").
    pub base_currency: String,

    /// Holdings input.
    pub holdings_sheet: SheetRef,

    /// Append-only per-asset history.
    pub snapshot_sheet: SheetRef,

    /// One totals row per day.
    pub daily_log_sheet: SheetRef,

    /// Overwritten each run.
    pub report_sheet: SheetRef,

    pub snapshot_policy: SnapshotPolicy,

    /// Pause between network price fetches, in milliseconds.
    pub request_delay_ms: u64,

    /// How many days back to search for a TEFAS fund price.
    pub tefas_lookback_days: u32,

    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let investments = SpreadsheetRef::Title("My_Investments".to_string());
        let performance = SpreadsheetRef::Title("Performance_Log".to_string());
        Self {
            credentials_file: PathBuf::from("credentials.json"),
            base_currency: "TRY".to_string(),
            holdings_sheet: SheetRef::new(investments, "Assets"),
            snapshot_sheet: SheetRef::new(performance.clone(), "Asset_Log"),
            daily_log_sheet: SheetRef::new(performance.clone(), "Daily_Log"),
            report_sheet: SheetRef::new(performance, "Report"),
            snapshot_policy: SnapshotPolicy::Replace,
            request_delay_ms: 500,
            tefas_lookback_days: 5,
            http_timeout_secs: 30,
        }
    }
}
