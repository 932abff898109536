use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::settings::SheetRef;

/// A single spreadsheet cell as exchanged with the sheet service.
///
/// Cells are read unformatted, so numbers arrive as numbers and everything
/// else as text. Empty cells are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    pub fn blank() -> Self {
        CellValue::Text(String::new())
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }

    /// Display form of the cell. Whole numbers print without a fraction.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Text(s) => s.trim().to_string(),
        }
    }

    /// Numeric value of the cell, if it has one.
    ///
    /// Text is parsed after trimming; a single comma with no dot is read as
    /// a decimal comma ("12,5" → 12.5).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) | CellValue::Bool(_) => None,
            CellValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                if let Ok(n) = s.parse::<f64>() {
                    return n.is_finite().then_some(n);
                }
                if s.matches(',').count() == 1 && !s.contains('.') {
                    return s.replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite());
                }
                None
            }
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// One worksheet row.
pub type Row = Vec<CellValue>;

/// Everything the tracker needs from a spreadsheet service.
///
/// The Google Sheets session implements this; tests use an in-memory store.
#[async_trait]
pub trait SpreadsheetBackend: Send + Sync {
    /// All rows of a worksheet, header included. Fails with
    /// [`CoreError::WorksheetNotFound`] if the worksheet does not exist.
    async fn read_rows(&self, sheet: &SheetRef) -> Result<Vec<Row>, CoreError>;

    /// Create the worksheet if it is missing. Returns `true` if it was created.
    async fn ensure_worksheet(&self, sheet: &SheetRef) -> Result<bool, CoreError>;

    /// Add rows after the last non-empty row. Existing rows are untouched.
    async fn append_rows(&self, sheet: &SheetRef, rows: &[Row]) -> Result<(), CoreError>;

    /// Replace the worksheet's content with `rows`, written from the
    /// top-left cell. Implementations write the new rows before clearing
    /// whatever is left beyond them, so a failed write never leaves the
    /// worksheet empty.
    async fn overwrite_rows(&self, sheet: &SheetRef, rows: &[Row]) -> Result<(), CoreError>;
}
