use chrono::NaiveDate;

use crate::models::analytics::{PerformanceRecord, PortfolioTotals};

/// Rolls per-holding records up into portfolio totals.
///
/// Only holdings with a current value count. Their cost basis is included
/// alongside so that total gain/loss compares like with like.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    pub fn portfolio_totals(&self, records: &[PerformanceRecord], date: NaiveDate) -> PortfolioTotals {
        let mut total_value = 0.0;
        let mut total_cost = 0.0;
        let mut priced_assets = 0;

        for record in records {
            if let Some(value) = record.current_value {
                total_value += value;
                total_cost += record.cost_basis.unwrap_or(0.0);
                priced_assets += 1;
            }
        }

        let total_profit_loss = total_value - total_cost;
        let total_return_pct = if total_cost != 0.0 {
            Some(total_profit_loss / total_cost * 100.0)
        } else {
            None
        };

        PortfolioTotals {
            date,
            total_value,
            total_cost,
            total_profit_loss,
            total_return_pct,
            priced_assets,
            unavailable_assets: records.len() - priced_assets,
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
