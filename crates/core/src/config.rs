//! Environment-driven configuration.
//!
//! Every setting has a default (see [`Settings::default`]); environment
//! variables override them, optionally loaded from a `.env` file first.

use std::path::PathBuf;

use tracing::debug;

use crate::errors::CoreError;
use crate::models::settings::{Settings, SheetRef, SnapshotPolicy, SpreadsheetRef};

pub const CREDENTIALS_FILE: &str = "CREDENTIALS_FILE";
pub const BASE_CURRENCY: &str = "BASE_CURRENCY";
pub const INVESTMENTS_SPREADSHEET: &str = "INVESTMENTS_SPREADSHEET";
pub const ASSETS_WORKSHEET: &str = "ASSETS_WORKSHEET";
pub const PERFORMANCE_SPREADSHEET: &str = "PERFORMANCE_SPREADSHEET";
pub const DAILY_LOG_WORKSHEET: &str = "DAILY_LOG_WORKSHEET";
pub const SNAPSHOT_WORKSHEET: &str = "SNAPSHOT_WORKSHEET";
pub const REPORT_WORKSHEET: &str = "REPORT_WORKSHEET";
pub const SNAPSHOT_POLICY: &str = "SNAPSHOT_POLICY";
pub const REQUEST_DELAY_MS: &str = "REQUEST_DELAY_MS";
pub const TEFAS_LOOKBACK_DAYS: &str = "TEFAS_LOOKBACK_DAYS";
pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

/// Load settings from the process environment, reading `.env` if present.
pub fn load_settings() -> Result<Settings, CoreError> {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(CoreError::Config(format!("Failed to read .env file: {e}"))),
    }
    settings_from_lookup(|key| std::env::var(key).ok())
}

/// Build settings from an arbitrary key lookup. Blank values count as unset.
pub fn settings_from_lookup<F>(lookup: F) -> Result<Settings, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let defaults = Settings::default();

    let credentials_file = get(CREDENTIALS_FILE)
        .map(PathBuf::from)
        .unwrap_or(defaults.credentials_file);

    let base_currency = match get(BASE_CURRENCY) {
        Some(raw) => parse_currency(&raw)?,
        None => defaults.base_currency,
    };

    let investments = get(INVESTMENTS_SPREADSHEET)
        .map(|v| SpreadsheetRef::parse(&v))
        .unwrap_or_else(|| defaults.holdings_sheet.spreadsheet.clone());
    let performance = get(PERFORMANCE_SPREADSHEET)
        .map(|v| SpreadsheetRef::parse(&v))
        .unwrap_or_else(|| defaults.daily_log_sheet.spreadsheet.clone());

    let holdings_sheet = SheetRef::new(
        investments,
        get(ASSETS_WORKSHEET).unwrap_or(defaults.holdings_sheet.worksheet),
    );
    let snapshot_sheet = SheetRef::new(
        performance.clone(),
        get(SNAPSHOT_WORKSHEET).unwrap_or(defaults.snapshot_sheet.worksheet),
    );
    let daily_log_sheet = SheetRef::new(
        performance.clone(),
        get(DAILY_LOG_WORKSHEET).unwrap_or(defaults.daily_log_sheet.worksheet),
    );
    let report_sheet = SheetRef::new(
        performance,
        get(REPORT_WORKSHEET).unwrap_or(defaults.report_sheet.worksheet),
    );

    let snapshot_policy = match get(SNAPSHOT_POLICY) {
        Some(raw) => raw
            .parse::<SnapshotPolicy>()
            .map_err(|e| CoreError::Config(format!("{SNAPSHOT_POLICY}: {e}")))?,
        None => defaults.snapshot_policy,
    };

    let request_delay_ms = parse_number(REQUEST_DELAY_MS, get(REQUEST_DELAY_MS), defaults.request_delay_ms)?;
    let tefas_lookback_days =
        parse_number(TEFAS_LOOKBACK_DAYS, get(TEFAS_LOOKBACK_DAYS), defaults.tefas_lookback_days)?;
    if tefas_lookback_days == 0 {
        return Err(CoreError::Config(format!("{TEFAS_LOOKBACK_DAYS} must be at least 1")));
    }
    let http_timeout_secs =
        parse_number(HTTP_TIMEOUT_SECS, get(HTTP_TIMEOUT_SECS), defaults.http_timeout_secs)?;
    if http_timeout_secs == 0 {
        return Err(CoreError::Config(format!("{HTTP_TIMEOUT_SECS} must be at least 1")));
    }

    Ok(Settings {
        credentials_file,
        base_currency,
        holdings_sheet,
        snapshot_sheet,
        daily_log_sheet,
        report_sheet,
        snapshot_policy,
        request_delay_ms,
        tefas_lookback_days,
        http_timeout_secs,
    })
}

/// Currency codes must be exactly 3 ASCII letters; returned uppercased.
pub fn parse_currency(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim().to_uppercase();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::Config(format!(
            "Invalid currency code '{raw}': must be exactly 3 ASCII letters (e.g., TRY, USD, EUR)"
        )));
    }
    Ok(trimmed)
}

fn parse_number<T>(key: &str, raw: Option<String>, default: T) -> Result<T, CoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| CoreError::Config(format!("{key}: invalid value '{value}': {e}"))),
        None => Ok(default),
    }
}
