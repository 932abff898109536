//! Row layouts of the worksheets the tracker reads and writes.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use tracing::warn;

use crate::errors::CoreError;
use crate::models::analytics::{LookbackWindow, PerformanceRecord, PortfolioTotals};
use crate::models::asset::{AssetClass, Holding};
use crate::models::snapshot::Snapshot;
use super::backend::{CellValue, Row};

/// Date format used for every date the tracker writes.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Placeholder written for metrics that are not available.
pub const NOT_AVAILABLE: &str = "N/A";

// ── Holdings sheet ──────────────────────────────────────────────────

pub const COL_TICKER: &str = "Ticker";
pub const COL_ASSET_TYPE: &str = "Asset_Type";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_PURCHASE_PRICE: &str = "Purchase_Price";
pub const COL_CURRENCY: &str = "Currency";
pub const COL_INTEREST_RATE: &str = "Annual_Interest_Rate";
pub const COL_START_DATE: &str = "Start_Date";
pub const COL_MANUAL_VALUE: &str = "Manual_Current_Value";
pub const COL_MANUAL_COST: &str = "Manual_Total_Cost_TRY";

/// Normalize a header for matching: lowercase, no spaces/underscores/dashes.
fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Column positions found in a header row.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_header(header: &[CellValue]) -> Self {
        let mut map = HashMap::new();
        for (idx, cell) in header.iter().enumerate() {
            let key = header_key(&cell.as_text());
            if !key.is_empty() {
                map.entry(key).or_insert(idx);
            }
        }
        Columns(map)
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.0.get(&header_key(name)).copied()
    }

    fn cell<'a>(&self, row: &'a [CellValue], name: &str) -> Option<&'a CellValue> {
        self.index(name).and_then(|i| row.get(i))
    }

    fn text(&self, row: &[CellValue], name: &str) -> String {
        self.cell(row, name).map(|c| c.as_text()).unwrap_or_default()
    }

    /// Numeric cell; blanks and unparsable text count as 0.
    fn number(&self, row: &[CellValue], name: &str, line: usize) -> f64 {
        match self.cell(row, name) {
            None => 0.0,
            Some(cell) if cell.is_blank() => 0.0,
            Some(cell) => cell.as_f64().unwrap_or_else(|| {
                warn!(line, column = name, value = %cell.as_text(), "not a number; using 0");
                0.0
            }),
        }
    }
}

/// Parse the holdings worksheet (header row + data rows).
///
/// Fully blank rows and rows without a ticker are skipped. A positive
/// manual value makes the row a manual entry; its asset type label is kept
/// for the report.
pub fn parse_holdings(rows: &[Row], base_currency: &str) -> Result<Vec<Holding>, CoreError> {
    let (header, data) = rows
        .split_first()
        .ok_or_else(|| CoreError::InvalidHoldings("worksheet is empty (no header row)".into()))?;

    let columns = Columns::from_header(header);
    for required in [COL_TICKER, COL_ASSET_TYPE] {
        if columns.index(required).is_none() {
            return Err(CoreError::InvalidHoldings(format!("missing required column '{required}'")));
        }
    }

    let mut holdings = Vec::new();
    for (offset, row) in data.iter().enumerate() {
        // 1-based sheet line, header is line 1
        let line = offset + 2;
        if row.iter().all(CellValue::is_blank) {
            continue;
        }

        let ticker = columns.text(row, COL_TICKER);
        if ticker.is_empty() {
            warn!(line, "row has no ticker; skipped");
            continue;
        }

        let label = columns.text(row, COL_ASSET_TYPE);
        let manual_value = columns.number(row, COL_MANUAL_VALUE, line);
        let asset_class = if label.is_empty() && manual_value > 0.0 {
            AssetClass::Manual
        } else {
            AssetClass::from_label(&label)
        };

        let currency = match columns.text(row, COL_CURRENCY) {
            c if c.is_empty() => base_currency.to_string(),
            c => c,
        };

        let mut holding = Holding::new(
            ticker,
            asset_class,
            columns.number(row, COL_QUANTITY, line),
            columns.number(row, COL_PURCHASE_PRICE, line),
            currency,
        );
        holding.annual_interest_rate = columns.number(row, COL_INTEREST_RATE, line);
        holding.start_date = columns.cell(row, COL_START_DATE).and_then(parse_date_cell);
        holding.manual_value = (manual_value > 0.0).then_some(manual_value);
        holding.manual_total_cost = columns.number(row, COL_MANUAL_COST, line);

        holdings.push(holding);
    }

    Ok(holdings)
}

/// Parse a date written as text or as a spreadsheet serial day number.
pub fn parse_date_cell(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Number(serial) => serial_to_date(*serial),
        CellValue::Text(text) => parse_date_text(text),
        CellValue::Bool(_) => None,
    }
}

/// ISO dates first, then the day-first and month-first forms sheets produce.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    // Drop a time part such as "2025-01-15 00:00:00"
    let date_part = text.split_whitespace().next()?;
    ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Spreadsheet serial dates count days from 1899-12-30.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30).map(|epoch| epoch + Duration::days(serial.trunc() as i64))
}

// ── Snapshot log ────────────────────────────────────────────────────

pub fn snapshot_header(base_currency: &str) -> Row {
    vec![
        CellValue::text("Date"),
        CellValue::text(COL_TICKER),
        CellValue::text(format!("Value_{base_currency}")),
    ]
}

pub fn snapshot_row(snapshot: &Snapshot) -> Row {
    vec![
        CellValue::text(snapshot.date.format(DATE_FORMAT).to_string()),
        CellValue::text(snapshot.ticker.clone()),
        CellValue::Number(snapshot.value),
    ]
}

/// Read one snapshot row; `None` for the header or anything malformed.
pub fn parse_snapshot_row(row: &[CellValue]) -> Option<Snapshot> {
    let date = parse_date_cell(row.first()?)?;
    let ticker = row.get(1)?.as_text();
    if ticker.is_empty() {
        return None;
    }
    let value = row.get(2)?.as_f64()?;
    Some(Snapshot::new(date, ticker, value))
}

/// Every valid snapshot in a log worksheet. Malformed rows are skipped.
pub fn parse_snapshots(rows: &[Row]) -> Vec<Snapshot> {
    let mut snapshots = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        if row.iter().all(CellValue::is_blank) {
            continue;
        }
        match parse_snapshot_row(row) {
            Some(snapshot) => snapshots.push(snapshot),
            // The first row is normally the header
            None if idx == 0 => {}
            None => warn!(line = idx + 1, "malformed snapshot row skipped"),
        }
    }
    snapshots
}

// ── Daily log ───────────────────────────────────────────────────────

pub fn daily_log_header(base_currency: &str) -> Row {
    vec![
        CellValue::text("Date"),
        CellValue::text(format!("Total_Value_{base_currency}")),
        CellValue::text(format!("Total_Cost_{base_currency}")),
        CellValue::text(format!("Total_Profit_Loss_{base_currency}")),
        CellValue::text("Total_Return_Pct"),
    ]
}

pub fn daily_log_row(totals: &PortfolioTotals) -> Row {
    vec![
        CellValue::text(totals.date.format(DATE_FORMAT).to_string()),
        money(Some(totals.total_value)),
        money(Some(totals.total_cost)),
        money(Some(totals.total_profit_loss)),
        money(totals.total_return_pct),
    ]
}

/// Merge today's totals into the existing daily log.
///
/// Any earlier row for the same date is dropped; the result is header first,
/// then rows newest-first. Rows whose date cannot be read are kept at the end.
pub fn merge_daily_log(existing: &[Row], totals: &PortfolioTotals, base_currency: &str) -> Vec<Row> {
    let mut dated: Vec<(NaiveDate, Row)> = Vec::new();
    let mut undated: Vec<Row> = Vec::new();

    for (idx, row) in existing.iter().enumerate() {
        if row.iter().all(CellValue::is_blank) {
            continue;
        }
        match row.first().and_then(parse_date_cell) {
            Some(date) if date == totals.date => {}
            Some(date) => dated.push((date, row.clone())),
            None if idx == 0 => {}
            None => undated.push(row.clone()),
        }
    }

    dated.push((totals.date, daily_log_row(totals)));
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    let mut rows = Vec::with_capacity(dated.len() + undated.len() + 1);
    rows.push(daily_log_header(base_currency));
    rows.extend(dated.into_iter().map(|(_, row)| row));
    rows.extend(undated);
    rows
}

// ── Report ──────────────────────────────────────────────────────────

pub fn report_header(base_currency: &str) -> Row {
    let b = base_currency;
    let mut header = vec![
        COL_TICKER.to_string(),
        COL_ASSET_TYPE.to_string(),
        COL_QUANTITY.to_string(),
        COL_CURRENCY.to_string(),
        format!("Current_Value_{b}"),
        format!("Total_Cost_{b}"),
        format!("Profit_Loss_{b}"),
    ];
    for window in LookbackWindow::ALL {
        header.push(format!("Return_{}_Pct", window.label()));
        header.push(format!("Return_{}_{b}", window.label()));
    }
    header.push("Status".to_string());
    header.into_iter().map(CellValue::Text).collect()
}

pub fn report_row(record: &PerformanceRecord) -> Row {
    let status = match &record.unavailable_reason {
        Some(reason) => format!("Unavailable: {reason}"),
        None => "OK".to_string(),
    };
    let mut row = vec![
        CellValue::text(record.ticker.clone()),
        CellValue::text(record.asset_class.to_string()),
        CellValue::Number(record.quantity),
        CellValue::text(record.currency.clone()),
        money(record.current_value),
        money(record.cost_basis),
        money(record.profit_loss),
    ];
    for window in LookbackWindow::ALL {
        let ret = record.period_return(window);
        row.push(money(ret.pct));
        row.push(money(ret.abs));
    }
    row.push(CellValue::text(status));
    row
}

/// The whole report worksheet: header, one row per record, a totals row.
pub fn render_report(records: &[PerformanceRecord], totals: &PortfolioTotals, base_currency: &str) -> Vec<Row> {
    let mut rows = Vec::with_capacity(records.len() + 3);
    rows.push(report_header(base_currency));
    rows.extend(records.iter().map(report_row));
    rows.push(Vec::new());

    let mut total_row = vec![CellValue::blank(); 14];
    total_row[0] = CellValue::text("TOTAL");
    total_row[3] = CellValue::text(base_currency);
    total_row[4] = money(Some(totals.total_value));
    total_row[5] = money(Some(totals.total_cost));
    total_row[6] = money(Some(totals.total_profit_loss));
    total_row[13] = CellValue::text(format!(
        "Return {} | as of {} | {} priced, {} unavailable",
        match totals.total_return_pct {
            Some(pct) => format!("{pct:.2}%"),
            None => NOT_AVAILABLE.to_string(),
        },
        totals.date.format(DATE_FORMAT),
        totals.priced_assets,
        totals.unavailable_assets,
    ));
    rows.push(total_row);
    rows
}

/// Two-decimal number, or `N/A` when absent.
fn money(value: Option<f64>) -> CellValue {
    match value {
        Some(v) if v.is_finite() => CellValue::Number((v * 100.0).round() / 100.0),
        _ => CellValue::text(NOT_AVAILABLE),
    }
}
