// ═══════════════════════════════════════════════════════════════════
// Provider Tests — Registry, TEFAS parsing, time deposits, manual, Yahoo
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

use investment_tracker_core::errors::CoreError;
use investment_tracker_core::models::asset::{AssetClass, Holding};
use investment_tracker_core::models::price::{PriceQuote, QuoteBasis};
use investment_tracker_core::models::settings::Settings;
use investment_tracker_core::providers::manual::ManualProvider;
use investment_tracker_core::providers::registry::PriceProviderRegistry;
use investment_tracker_core::providers::tefas::{self, EpochMillis, HistoryRow, TefasProvider};
use investment_tracker_core::providers::time_deposit::TimeDepositProvider;
use investment_tracker_core::providers::traits::{FxRateProvider, PriceProvider};
use investment_tracker_core::providers::yahoo_finance::YahooFinanceProvider;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// A mock provider that supports only the specified asset classes.
struct MockProvider {
    name: String,
    classes: Vec<AssetClass>,
}

impl MockProvider {
    fn new(name: &str, classes: Vec<AssetClass>) -> Self {
        Self {
            name: name.to_string(),
            classes,
        }
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_asset_classes(&self) -> Vec<AssetClass> {
        self.classes.clone()
    }

    async fn get_quote(&self, holding: &Holding, as_of: NaiveDate) -> Result<PriceQuote, CoreError> {
        Ok(PriceQuote::per_unit(
            holding.ticker.clone(),
            100.0,
            holding.currency.clone(),
            as_of,
        ))
    }
}

struct MockFx;

#[async_trait]
impl FxRateProvider for MockFx {
    fn name(&self) -> &str {
        "MockFx"
    }

    async fn get_rate(&self, _from: &str, _to: &str) -> Result<f64, CoreError> {
        Ok(38.0)
    }
}

// ── Registry ────────────────────────────────────────────────────────

mod registry {
    use super::*;

    #[test]
    fn empty_registry_has_no_providers() {
        let registry = PriceProviderRegistry::new();
        assert!(registry.get_providers_for(&AssetClass::UsStock).is_empty());
        assert!(registry.get_providers_for(&AssetClass::Fund).is_empty());
        assert!(registry.fx_providers().is_empty());
    }

    #[test]
    fn routes_by_asset_class() {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(MockProvider::new("Markets", vec![AssetClass::UsStock, AssetClass::Crypto])));
        registry.register(Box::new(MockProvider::new("Funds", vec![AssetClass::Fund])));

        assert_eq!(registry.get_providers_for(&AssetClass::Crypto)[0].name(), "Markets");
        assert_eq!(registry.get_providers_for(&AssetClass::Fund)[0].name(), "Funds");
        assert!(registry.get_providers_for(&AssetClass::TimeDeposit).is_empty());
    }

    #[test]
    fn fallback_order_follows_registration() {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(MockProvider::new("Primary", vec![AssetClass::UsStock])));
        registry.register(Box::new(MockProvider::new("Other", vec![AssetClass::Fund])));
        registry.register(Box::new(MockProvider::new("Backup", vec![AssetClass::UsStock])));

        let names: Vec<&str> = registry
            .get_providers_for(&AssetClass::UsStock)
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["Primary", "Backup"]);
    }

    #[test]
    fn unknown_class_has_no_provider() {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(MockProvider::new("Markets", vec![AssetClass::UsStock])));
        assert!(registry
            .get_providers_for(&AssetClass::Unknown("Bond".into()))
            .is_empty());
    }

    #[test]
    fn registers_fx_sources() {
        let mut registry = PriceProviderRegistry::default();
        registry.register_fx(Box::new(MockFx));
        let names: Vec<&str> = registry.fx_providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["MockFx"]);
    }

    #[test]
    fn defaults_cover_every_known_class() {
        let registry = PriceProviderRegistry::new_with_defaults(&Settings::default());
        for class in [AssetClass::Fund, AssetClass::TimeDeposit, AssetClass::Manual] {
            assert!(!registry.get_providers_for(&class).is_empty(), "no provider for {class}");
        }
        assert_eq!(registry.get_providers_for(&AssetClass::Fund)[0].name(), "TEFAS");
    }
}

// ── Time deposits ───────────────────────────────────────────────────

mod time_deposit {
    use super::*;

    #[test]
    fn accrual_is_simple_daily_interest() {
        // 36.5% a year → 0.1% a day
        let factor = TimeDepositProvider::accrual_factor(36.5, d(2025, 1, 1), d(2025, 1, 11));
        assert!((factor - 1.01).abs() < 1e-12);
    }

    #[test]
    fn no_accrual_on_start_day() {
        let factor = TimeDepositProvider::accrual_factor(45.0, d(2025, 1, 1), d(2025, 1, 1));
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn future_start_is_worth_principal() {
        let factor = TimeDepositProvider::accrual_factor(45.0, d(2025, 6, 1), d(2025, 1, 1));
        assert_eq!(factor, 1.0);
    }

    #[tokio::test]
    async fn quote_is_accrual_factor_per_unit() {
        let provider = TimeDepositProvider::new();
        let holding = Holding::time_deposit("DEP-1", 100_000.0, 36.5, d(2025, 1, 1), "TRY");
        let quote = provider.get_quote(&holding, d(2025, 1, 11)).await.unwrap();

        assert_eq!(quote.basis, QuoteBasis::PerUnit);
        assert_eq!(quote.currency, "TRY");
        assert!((quote.value_of(holding.quantity) - 101_000.0).abs() < 1e-6);
        assert!(!provider.is_remote());
    }

    #[tokio::test]
    async fn missing_start_date_is_an_error() {
        let provider = TimeDepositProvider::new();
        let mut holding = Holding::time_deposit("DEP-1", 1_000.0, 40.0, d(2025, 1, 1), "TRY");
        holding.start_date = None;
        let err = provider.get_quote(&holding, d(2025, 2, 1)).await.unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
        assert!(err.to_string().contains("Start_Date"));
    }

    #[tokio::test]
    async fn negative_rate_is_an_error() {
        let provider = TimeDepositProvider::new();
        let holding = Holding::time_deposit("DEP-1", 1_000.0, -5.0, d(2025, 1, 1), "TRY");
        assert!(provider.get_quote(&holding, d(2025, 2, 1)).await.is_err());
    }
}

// ── Manual values ───────────────────────────────────────────────────

mod manual {
    use super::*;

    #[tokio::test]
    async fn returns_position_value() {
        let provider = ManualProvider::new();
        let holding = Holding::manual("GOLD", 25_000.0, 20_000.0, "TRY");
        let quote = provider.get_quote(&holding, d(2025, 3, 10)).await.unwrap();
        assert_eq!(quote.basis, QuoteBasis::Position);
        assert_eq!(quote.value_of(holding.quantity), 25_000.0);
        assert!(!provider.is_remote());
    }

    #[tokio::test]
    async fn zero_manual_value_is_not_available() {
        let provider = ManualProvider::new();
        let holding = Holding::manual("GOLD", 0.0, 20_000.0, "TRY");
        let err = provider.get_quote(&holding, d(2025, 3, 10)).await.unwrap_err();
        assert!(matches!(err, CoreError::PriceNotAvailable { .. }));
    }
}

// ── TEFAS ───────────────────────────────────────────────────────────

mod tefas_provider {
    use super::*;

    fn row(millis: &str, price: f64) -> HistoryRow {
        serde_json::from_value(serde_json::json!({ "TARIH": millis, "FIYAT": price })).unwrap()
    }

    #[test]
    fn search_window_ends_yesterday() {
        let provider = TefasProvider::new(5, 30);
        let (start, end) = provider.search_window(d(2025, 3, 10));
        assert_eq!(start, d(2025, 3, 5));
        assert_eq!(end, d(2025, 3, 9));
    }

    #[test]
    fn pension_fund_request_waits_the_request_delay() {
        let provider = TefasProvider::new(5, 30).with_request_delay(Duration::from_millis(250));
        assert_eq!(provider.delay_before_attempt(0), Duration::ZERO);
        assert_eq!(provider.delay_before_attempt(1), Duration::from_millis(250));
    }

    #[test]
    fn no_delay_unless_configured() {
        let provider = TefasProvider::new(5, 30);
        assert_eq!(provider.delay_before_attempt(1), Duration::ZERO);
    }

    #[test]
    fn zero_lookback_is_clamped() {
        let provider = TefasProvider::new(0, 30);
        let (start, end) = provider.search_window(d(2025, 3, 10));
        assert_eq!(start, end);
    }

    #[test]
    fn epoch_millis_as_text_or_number() {
        // 2025-03-07T00:00:00Z
        assert_eq!(EpochMillis::Text("1741305600000".into()).to_date(), Some(d(2025, 3, 7)));
        assert_eq!(EpochMillis::Number(1_741_305_600_000).to_date(), Some(d(2025, 3, 7)));
        assert_eq!(EpochMillis::Text("not a date".into()).to_date(), None);
    }

    #[test]
    fn parses_history_rows() {
        let parsed: HistoryRow =
            serde_json::from_str(r#"{"TARIH":"1741305600000","FIYAT":1.234567,"FONKODU":"AAK"}"#)
                .unwrap();
        assert_eq!(parsed.date.to_date(), Some(d(2025, 3, 7)));
        assert_eq!(parsed.price, 1.234567);
    }

    #[test]
    fn latest_price_picks_most_recent_positive() {
        let rows = vec![
            row("1741132800000", 1.10), // 2025-03-05
            row("1741305600000", 1.30), // 2025-03-07
            row("1741219200000", 1.20), // 2025-03-06
        ];
        assert_eq!(tefas::latest_price(&rows), Some((d(2025, 3, 7), 1.30)));
    }

    #[test]
    fn latest_price_skips_zero_prices() {
        let rows = vec![row("1741132800000", 1.10), row("1741305600000", 0.0)];
        assert_eq!(tefas::latest_price(&rows), Some((d(2025, 3, 5), 1.10)));
    }

    #[test]
    fn latest_price_of_nothing() {
        assert_eq!(tefas::latest_price(&[]), None);
    }

    #[test]
    fn serves_funds_only() {
        let provider = TefasProvider::new(5, 30);
        assert_eq!(provider.name(), "TEFAS");
        assert_eq!(provider.supported_asset_classes(), vec![AssetClass::Fund]);
        assert!(provider.is_remote());
    }
}

// ── Yahoo Finance ───────────────────────────────────────────────────

mod yahoo {
    use super::*;

    #[test]
    fn fx_symbol_convention() {
        assert_eq!(YahooFinanceProvider::fx_symbol("usd", "try"), "USDTRY=X");
        assert_eq!(YahooFinanceProvider::fx_symbol(" EUR ", "TRY"), "EURTRY=X");
    }

    #[test]
    fn serves_market_classes() {
        let provider = YahooFinanceProvider::new().unwrap();
        let classes = provider.supported_asset_classes();
        assert!(classes.contains(&AssetClass::UsStock));
        assert!(classes.contains(&AssetClass::Crypto));
        assert!(classes.contains(&AssetClass::Fx));
        assert!(!classes.contains(&AssetClass::Fund));
    }

    #[tokio::test]
    async fn same_currency_rate_is_one() {
        let provider = YahooFinanceProvider::new().unwrap();
        assert_eq!(provider.get_rate("TRY", "try").await.unwrap(), 1.0);
    }
}
