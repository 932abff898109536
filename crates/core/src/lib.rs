pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{info, info_span, warn, Instrument};

use errors::CoreError;
use models::{
    analytics::{PerformanceRecord, PortfolioTotals, Valuation},
    asset::Holding,
    settings::Settings,
    snapshot::{Snapshot, SnapshotLog},
};
use providers::registry::PriceProviderRegistry;
use services::{
    analytics_service::AnalyticsService, currency_service::CurrencyService,
    performance_service::PerformanceService, price_service::PriceService,
    valuation_service::ValuationService,
};
use storage::{
    backend::SpreadsheetBackend,
    manager::{SnapshotWrite, StorageManager},
};

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute everything but write nothing back to the sheets.
    pub dry_run: bool,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// One record per ticker
    pub records: Vec<PerformanceRecord>,
    /// Snapshots taken today (only for positions that could be valued)
    pub snapshots: Vec<Snapshot>,
    pub totals: PortfolioTotals,
    /// `None` on a dry run
    pub snapshot_write: Option<SnapshotWrite>,
}

/// Main entry point for the investment tracker core library.
/// Holds the settings and all services needed for a run.
#[must_use]
pub struct InvestmentTracker {
    settings: Settings,
    price_service: PriceService,
    valuation_service: ValuationService,
    performance_service: PerformanceService,
    analytics_service: AnalyticsService,
}

impl std::fmt::Debug for InvestmentTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestmentTracker")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl InvestmentTracker {
    /// Build a tracker with the default provider set.
    pub fn new(settings: Settings) -> Self {
        let registry = PriceProviderRegistry::new_with_defaults(&settings);
        Self::with_registry(settings, registry)
    }

    /// Build a tracker with a custom provider registry.
    pub fn with_registry(settings: Settings, registry: PriceProviderRegistry) -> Self {
        let price_service = PriceService::with_request_delay(
            registry,
            Duration::from_millis(settings.request_delay_ms),
        );
        Self {
            settings,
            price_service,
            valuation_service: ValuationService::new(),
            performance_service: PerformanceService::new(),
            analytics_service: AnalyticsService::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Value every position and compute its performance against `log`.
    ///
    /// Holdings rows sharing a ticker form one position: their values and
    /// costs are summed, and the position gets a single record and a single
    /// snapshot, so lookback baselines always compare like with like. A
    /// position that cannot be fully valued yields a record with absent
    /// fields and no snapshot; it never stops the others.
    pub async fn evaluate(
        &self,
        holdings: &[Holding],
        log: &SnapshotLog,
        today: NaiveDate,
    ) -> (Vec<PerformanceRecord>, Vec<Snapshot>, PortfolioTotals) {
        let mut currency_service = CurrencyService::new(&self.settings.base_currency);
        let positions = group_by_ticker(holdings);
        let mut records = Vec::with_capacity(positions.len());
        let mut snapshots = Vec::with_capacity(positions.len());

        for rows in positions {
            let mut valuation: Option<Valuation> = None;
            for holding in &rows {
                let span = info_span!("holding", ticker = %holding.ticker, class = %holding.asset_class);
                let part = self
                    .valuation_service
                    .value_holding(&self.price_service, &mut currency_service, holding, today)
                    .instrument(span)
                    .await;
                valuation = Some(match valuation {
                    Some(acc) => acc.combine(part),
                    None => part,
                });
            }
            let (Some(first), Some(valuation)) = (rows.first(), valuation) else {
                continue;
            };
            if rows.len() > 1 {
                warn!(
                    ticker = %first.ticker,
                    rows = rows.len(),
                    "ticker listed on several holdings rows; valued as one position"
                );
            }

            let position = Holding {
                quantity: rows.iter().map(|h| h.quantity).sum(),
                ..(*first).clone()
            };
            let record = self
                .performance_service
                .build_record(&position, &valuation, log, today);

            match record.current_value {
                Some(value) => {
                    info!(ticker = %record.ticker, value, "holding valued");
                    snapshots.push(Snapshot::new(today, record.ticker.clone(), value));
                }
                None => warn!(
                    ticker = %record.ticker,
                    reason = record.unavailable_reason.as_deref().unwrap_or("unknown"),
                    "holding unavailable"
                ),
            }
            records.push(record);
        }

        let totals = self.analytics_service.portfolio_totals(&records, today);
        (records, snapshots, totals)
    }

    /// Run the whole pipeline against a spreadsheet backend:
    /// read holdings and history, value, then write snapshots, report and
    /// daily totals.
    ///
    /// Fatal: failing to read the holdings or the history, and any write
    /// failure. Per-holding problems only degrade that holding's row.
    pub async fn run(
        &self,
        backend: &dyn SpreadsheetBackend,
        today: NaiveDate,
        options: RunOptions,
    ) -> Result<RunOutcome, CoreError> {
        info!(date = %today, dry_run = options.dry_run, "run started");
        let storage = StorageManager::new(backend, &self.settings);

        let holdings = storage.read_holdings().await?;
        let log = storage.load_snapshot_log().await?;

        let (records, snapshots, totals) = self.evaluate(&holdings, &log, today).await;

        let snapshot_write = if options.dry_run {
            info!("dry run: skipping sheet writes");
            None
        } else {
            let write = storage.record_snapshots(&snapshots, today).await?;
            storage.write_report(&records, &totals).await?;
            storage.record_daily_totals(&totals).await?;
            Some(write)
        };

        info!(
            total_value = totals.total_value,
            total_cost = totals.total_cost,
            profit_loss = totals.total_profit_loss,
            return_pct = totals.total_return_pct.unwrap_or(0.0),
            priced = totals.priced_assets,
            unavailable = totals.unavailable_assets,
            "run finished"
        );

        Ok(RunOutcome {
            records,
            snapshots,
            totals,
            snapshot_write,
        })
    }
}

/// Holdings rows grouped by ticker, in order of first appearance.
fn group_by_ticker(holdings: &[Holding]) -> Vec<Vec<&Holding>> {
    let mut groups: Vec<Vec<&Holding>> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for holding in holdings {
        match positions.get(holding.ticker.as_str()) {
            Some(&idx) => groups[idx].push(holding),
            None => {
                positions.insert(holding.ticker.as_str(), groups.len());
                groups.push(vec![holding]);
            }
        }
    }
    groups
}
