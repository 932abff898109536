use thiserror::Error;

/// Unified error type for the entire investment-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration / Credentials ─────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid credentials file: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    // ── Spreadsheet service ─────────────────────────────────────────
    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    #[error("Worksheet not found: {spreadsheet}/{worksheet}")]
    WorksheetNotFound {
        spreadsheet: String,
        worksheet: String,
    },

    #[error("Sheets API error ({status}): {message}")]
    Sheets { status: u16, message: String },

    #[error("Holdings sheet invalid: {0}")]
    InvalidHoldings(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No provider available for asset class: {0}")]
    NoProvider(String),

    #[error("Price not available for {symbol} on {date}")]
    PriceNotAvailable { symbol: String, date: String },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Access tokens and form data can end up in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<jsonwebtoken::errors::Error> for CoreError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        CoreError::Credentials(format!("Failed to sign token assertion: {e}"))
    }
}
