// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, trait bounds
// ═══════════════════════════════════════════════════════════════════

use investment_tracker_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn config() {
        let err = CoreError::Config("BASE_CURRENCY: bad".into());
        assert_eq!(err.to_string(), "Configuration error: BASE_CURRENCY: bad");
    }

    #[test]
    fn credentials() {
        let err = CoreError::Credentials("client_email is empty".into());
        assert_eq!(err.to_string(), "Invalid credentials file: client_email is empty");
    }

    #[test]
    fn auth() {
        let err = CoreError::Auth("invalid_grant".into());
        assert_eq!(err.to_string(), "Authentication failed: invalid_grant");
    }

    #[test]
    fn spreadsheet_not_found() {
        let err = CoreError::SpreadsheetNotFound("My_Investments".into());
        assert_eq!(err.to_string(), "Spreadsheet not found: My_Investments");
    }

    #[test]
    fn worksheet_not_found() {
        let err = CoreError::WorksheetNotFound {
            spreadsheet: "My_Investments".into(),
            worksheet: "Assets".into(),
        };
        assert_eq!(err.to_string(), "Worksheet not found: My_Investments/Assets");
    }

    #[test]
    fn sheets_api() {
        let err = CoreError::Sheets {
            status: 403,
            message: "The caller does not have permission".into(),
        };
        assert_eq!(
            err.to_string(),
            "Sheets API error (403): The caller does not have permission"
        );
    }

    #[test]
    fn invalid_holdings() {
        let err = CoreError::InvalidHoldings("missing required column 'Ticker'".into());
        assert_eq!(
            err.to_string(),
            "Holdings sheet invalid: missing required column 'Ticker'"
        );
    }

    #[test]
    fn api() {
        let err = CoreError::Api {
            provider: "TEFAS".into(),
            message: "no price in window".into(),
        };
        assert_eq!(err.to_string(), "API error (TEFAS): no price in window");
    }

    #[test]
    fn network() {
        let err = CoreError::Network("timeout".into());
        assert_eq!(err.to_string(), "Network error: timeout");
    }

    #[test]
    fn no_provider() {
        let err = CoreError::NoProvider("Bond".into());
        assert_eq!(err.to_string(), "No provider available for asset class: Bond");
    }

    #[test]
    fn price_not_available() {
        let err = CoreError::PriceNotAvailable {
            symbol: "GOLD".into(),
            date: "2025-03-10".into(),
        };
        assert_eq!(err.to_string(), "Price not available for GOLD on 2025-03-10");
    }
}

// ── Trait bounds ────────────────────────────────────────────────────

mod bounds {
    use super::*;

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<CoreError>();
    }

    #[test]
    fn errors_implement_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::Network("reset".into()));
        assert_eq!(err.to_string(), "Network error: reset");
    }
}
