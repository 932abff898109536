// ═══════════════════════════════════════════════════════════════════
// Model Tests — AssetClass, Holding, PriceQuote, SnapshotLog, windows,
// settings
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use investment_tracker_core::models::analytics::{LookbackWindow, PeriodReturn, Valuation};
use investment_tracker_core::models::asset::{AssetClass, Holding};
use investment_tracker_core::models::price::{FxRateCache, PriceQuote, QuoteBasis};
use investment_tracker_core::models::settings::{
    Settings, SheetRef, SnapshotPolicy, SpreadsheetRef,
};
use investment_tracker_core::models::snapshot::{Snapshot, SnapshotLog};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ── AssetClass ──────────────────────────────────────────────────────

mod asset_class {
    use super::*;

    #[test]
    fn parses_sheet_labels() {
        assert_eq!(AssetClass::from_label("Stock (US)"), AssetClass::UsStock);
        assert_eq!(AssetClass::from_label("Crypto"), AssetClass::Crypto);
        assert_eq!(AssetClass::from_label("Döviz"), AssetClass::Fx);
        assert_eq!(AssetClass::from_label("Fund (TEFAS)"), AssetClass::Fund);
        assert_eq!(AssetClass::from_label("Time Deposit"), AssetClass::TimeDeposit);
        assert_eq!(AssetClass::from_label("Manual"), AssetClass::Manual);
    }

    #[test]
    fn parsing_ignores_case_and_whitespace() {
        assert_eq!(AssetClass::from_label("  stock (us) "), AssetClass::UsStock);
        assert_eq!(AssetClass::from_label("DÖVIZ"), AssetClass::Fx);
        assert_eq!(AssetClass::from_label("doviz"), AssetClass::Fx);
        assert_eq!(AssetClass::from_label("TEFAS"), AssetClass::Fund);
    }

    #[test]
    fn unknown_label_is_kept() {
        assert_eq!(
            AssetClass::from_label(" Bond "),
            AssetClass::Unknown("Bond".to_string())
        );
    }

    #[test]
    fn display_round_trips_through_from_label() {
        for class in [
            AssetClass::UsStock,
            AssetClass::Crypto,
            AssetClass::Fx,
            AssetClass::Fund,
            AssetClass::TimeDeposit,
            AssetClass::Manual,
        ] {
            assert_eq!(AssetClass::from_label(&class.to_string()), class);
        }
    }

}

// ── Holding ─────────────────────────────────────────────────────────

mod holding {
    use super::*;

    #[test]
    fn new_normalizes_ticker_and_currency() {
        let h = Holding::new(" aapl ", AssetClass::UsStock, 10.0, 150.0, "usd");
        assert_eq!(h.ticker, "AAPL");
        assert_eq!(h.currency, "USD");
        assert_eq!(h.start_date, None);
        assert_eq!(h.manual_value, None);
        assert!(!h.is_manual());
    }

    #[test]
    fn manual_holding() {
        let h = Holding::manual("gold", 25_000.0, 20_000.0, "TRY");
        assert!(h.is_manual());
        assert_eq!(h.asset_class, AssetClass::Manual);
        assert_eq!(h.manual_value, Some(25_000.0));
        assert_eq!(h.manual_total_cost, 20_000.0);
    }

    #[test]
    fn manual_value_keeps_sheet_class() {
        let mut h = Holding::new("GOLD", AssetClass::Unknown("Other".into()), 0.0, 0.0, "TRY");
        assert_eq!(h.pricing_class(), AssetClass::Unknown("Other".into()));
        h.manual_value = Some(25_000.0);
        assert!(h.is_manual());
        assert_eq!(h.pricing_class(), AssetClass::Manual);
        assert_eq!(h.asset_class, AssetClass::Unknown("Other".into()));
    }

    #[test]
    fn priced_holding_routes_by_its_class() {
        let h = Holding::new("AAK", AssetClass::Fund, 10.0, 1.0, "TRY");
        assert_eq!(h.pricing_class(), AssetClass::Fund);
    }

    #[test]
    fn time_deposit_holding() {
        let h = Holding::time_deposit("DEP-1", 100_000.0, 45.0, d(2025, 1, 1), "TRY");
        assert_eq!(h.asset_class, AssetClass::TimeDeposit);
        assert_eq!(h.quantity, 100_000.0);
        assert_eq!(h.purchase_price, 1.0);
        assert_eq!(h.annual_interest_rate, 45.0);
        assert_eq!(h.start_date, Some(d(2025, 1, 1)));
    }
}

// ── PriceQuote / FxRateCache ────────────────────────────────────────

mod price {
    use super::*;

    #[test]
    fn per_unit_quote_scales_with_quantity() {
        let q = PriceQuote::per_unit("AAPL", 200.0, "USD", d(2025, 3, 10));
        assert_eq!(q.basis, QuoteBasis::PerUnit);
        assert_eq!(q.value_of(3.0), 600.0);
    }

    #[test]
    fn position_quote_ignores_quantity() {
        let q = PriceQuote::position("GOLD", 5_000.0, "TRY", d(2025, 3, 10));
        assert_eq!(q.basis, QuoteBasis::Position);
        assert_eq!(q.value_of(0.0), 5_000.0);
        assert_eq!(q.value_of(42.0), 5_000.0);
    }

    #[test]
    fn fx_cache_is_case_insensitive() {
        let mut cache = FxRateCache::new();
        assert_eq!(cache.get("USD", "TRY"), None);
        cache.insert("usd", "try", 38.5);
        assert_eq!(cache.get("USD", "TRY"), Some(38.5));
        assert_eq!(cache.get("TRY", "USD"), None);
    }
}

// ── SnapshotLog ─────────────────────────────────────────────────────

mod snapshot_log {
    use super::*;

    fn sample_log() -> SnapshotLog {
        SnapshotLog::from_snapshots(vec![
            Snapshot::new(d(2025, 3, 1), "AAPL", 80.0),
            Snapshot::new(d(2025, 3, 9), "AAPL", 100.0),
            Snapshot::new(d(2025, 3, 3), "AAPL", 90.0),
            Snapshot::new(d(2025, 3, 9), "BTC-USD", 5.0),
        ])
    }

    #[test]
    fn snapshot_ticker_is_normalized() {
        assert_eq!(Snapshot::new(d(2025, 1, 1), " aapl", 1.0).ticker, "AAPL");
    }

    #[test]
    fn lookups_follow_dates_not_insertion_order() {
        let log = sample_log();
        // 03-03 was loaded after 03-09
        assert_eq!(log.latest_on_or_before("AAPL", d(2025, 3, 5)).unwrap().value, 90.0);
        assert_eq!(log.latest_on_or_before("AAPL", d(2025, 3, 10)).unwrap().value, 100.0);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn latest_on_or_before_exact_date() {
        let log = sample_log();
        let s = log.latest_on_or_before("AAPL", d(2025, 3, 3)).unwrap();
        assert_eq!(s.value, 90.0);
    }

    #[test]
    fn latest_on_or_before_falls_back_to_earlier_snapshot() {
        let log = sample_log();
        let s = log.latest_on_or_before("aapl", d(2025, 3, 8)).unwrap();
        assert_eq!(s.date, d(2025, 3, 3));
    }

    #[test]
    fn latest_on_or_before_none_when_history_starts_later() {
        let log = sample_log();
        assert!(log.latest_on_or_before("AAPL", d(2025, 2, 28)).is_none());
        assert!(log.latest_on_or_before("MSFT", d(2025, 3, 9)).is_none());
    }

    #[test]
    fn same_date_duplicates_return_last_recorded() {
        let mut log = sample_log();
        log.append(Snapshot::new(d(2025, 3, 9), "AAPL", 105.0));
        let s = log.latest_on_or_before("AAPL", d(2025, 3, 9)).unwrap();
        assert_eq!(s.value, 105.0);
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn append_never_touches_existing_entries() {
        let mut log = sample_log();
        log.append(Snapshot::new(d(2025, 3, 2), "AAPL", 85.0));
        assert_eq!(log.latest_on_or_before("AAPL", d(2025, 3, 1)).unwrap().value, 80.0);
        assert_eq!(log.latest_on_or_before("AAPL", d(2025, 3, 2)).unwrap().value, 85.0);
        assert_eq!(log.latest_on_or_before("AAPL", d(2025, 3, 3)).unwrap().value, 90.0);
        assert_eq!(log.latest_on_or_before("AAPL", d(2025, 3, 9)).unwrap().value, 100.0);
        assert_eq!(log.latest_on_or_before("BTC-USD", d(2025, 3, 9)).unwrap().value, 5.0);
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn empty_log() {
        let log = SnapshotLog::new();
        assert!(log.is_empty());
        assert!(log.latest_on_or_before("AAPL", d(2025, 3, 9)).is_none());
    }
}

// ── Analytics types ─────────────────────────────────────────────────

mod analytics {
    use super::*;

    #[test]
    fn window_offsets() {
        let today = d(2025, 3, 31);
        assert_eq!(LookbackWindow::OneDay.cutoff(today), d(2025, 3, 30));
        assert_eq!(LookbackWindow::OneWeek.cutoff(today), d(2025, 3, 24));
        assert_eq!(LookbackWindow::OneMonth.cutoff(today), d(2025, 3, 1));
    }

    #[test]
    fn window_labels() {
        let labels: Vec<&str> = LookbackWindow::ALL.iter().map(|w| w.label()).collect();
        assert_eq!(labels, vec!["1D", "1W", "1M"]);
    }

    #[test]
    fn not_available_return_is_empty() {
        assert_eq!(PeriodReturn::NOT_AVAILABLE, PeriodReturn::default());
    }

    #[test]
    fn valuation_accessors() {
        let ok = Valuation::Available {
            current_value: 110.0,
            cost_basis: 100.0,
        };
        assert_eq!(ok.current_value(), Some(110.0));
        assert_eq!(ok.cost_basis(), Some(100.0));

        let failed = Valuation::Unavailable {
            reason: "timeout".into(),
            cost_basis: Some(100.0),
        };
        assert_eq!(failed.current_value(), None);
        assert_eq!(failed.cost_basis(), Some(100.0));

        assert_eq!(Valuation::unavailable("x").cost_basis(), None);
    }

    #[test]
    fn combined_rows_sum_value_and_cost() {
        let small = Valuation::Available {
            current_value: 100.0,
            cost_basis: 90.0,
        };
        let large = Valuation::Available {
            current_value: 1_000.0,
            cost_basis: 900.0,
        };
        assert_eq!(
            small.combine(large),
            Valuation::Available {
                current_value: 1_100.0,
                cost_basis: 990.0,
            }
        );
    }

    #[test]
    fn combined_rows_unavailable_if_any_part_is() {
        let priced = Valuation::Available {
            current_value: 100.0,
            cost_basis: 90.0,
        };
        let failed = Valuation::Unavailable {
            reason: "timeout".into(),
            cost_basis: Some(900.0),
        };
        assert_eq!(
            priced.clone().combine(failed.clone()),
            Valuation::Unavailable {
                reason: "timeout".into(),
                cost_basis: Some(990.0),
            }
        );
        assert_eq!(failed.combine(priced).current_value(), None);

        let unknown_cost = Valuation::unavailable("no provider");
        let combined = Valuation::Available {
            current_value: 100.0,
            cost_basis: 90.0,
        }
        .combine(unknown_cost);
        assert_eq!(combined.cost_basis(), None);
    }
}

// ── Settings ────────────────────────────────────────────────────────

mod settings {
    use super::*;

    #[test]
    fn snapshot_policy_parses() {
        assert_eq!("replace".parse::<SnapshotPolicy>(), Ok(SnapshotPolicy::Replace));
        assert_eq!(" Append ".parse::<SnapshotPolicy>(), Ok(SnapshotPolicy::Append));
        assert_eq!("overwrite".parse::<SnapshotPolicy>(), Ok(SnapshotPolicy::Replace));
        let err = "merge".parse::<SnapshotPolicy>().unwrap_err();
        assert!(err.contains("merge"));
    }

    #[test]
    fn spreadsheet_ref_parses_title_or_id() {
        assert_eq!(
            SpreadsheetRef::parse(" My_Investments "),
            SpreadsheetRef::Title("My_Investments".into())
        );
        assert_eq!(
            SpreadsheetRef::parse("id:1AbC"),
            SpreadsheetRef::Id("1AbC".into())
        );
        assert_eq!(SpreadsheetRef::Id("1AbC".into()).to_string(), "id:1AbC");
    }

    #[test]
    fn sheet_ref_display() {
        let sheet = SheetRef::new(SpreadsheetRef::Title("Performance_Log".into()), "Asset_Log");
        assert_eq!(sheet.to_string(), "Performance_Log/Asset_Log");
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.base_currency, "TRY");
        assert_eq!(s.holdings_sheet.to_string(), "My_Investments/Assets");
        assert_eq!(s.snapshot_sheet.to_string(), "Performance_Log/Asset_Log");
        assert_eq!(s.daily_log_sheet.worksheet, "Daily_Log");
        assert_eq!(s.report_sheet.worksheet, "Report");
        assert_eq!(s.snapshot_policy, SnapshotPolicy::Replace);
        assert_eq!(s.tefas_lookback_days, 5);
    }
}
