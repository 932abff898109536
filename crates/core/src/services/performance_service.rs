use chrono::NaiveDate;

use crate::models::analytics::{LookbackWindow, PerformanceRecord, PeriodReturn, Valuation};
use crate::models::asset::Holding;
use crate::models::snapshot::SnapshotLog;

/// Builds per-holding performance records from a valuation and the
/// snapshot history.
///
/// For each window the baseline is the most recent snapshot of the same
/// ticker dated on or before `today − window`. Missing baselines, zero
/// baselines and unvalued holdings all yield absent fields, never errors.
pub struct PerformanceService;

impl PerformanceService {
    pub fn new() -> Self {
        Self
    }

    /// Assemble the record for one holding.
    pub fn build_record(
        &self,
        holding: &Holding,
        valuation: &Valuation,
        log: &SnapshotLog,
        today: NaiveDate,
    ) -> PerformanceRecord {
        let current_value = valuation.current_value();
        let cost_basis = valuation.cost_basis();
        let profit_loss = match (current_value, cost_basis) {
            (Some(value), Some(cost)) => Some(value - cost),
            _ => None,
        };
        let unavailable_reason = match valuation {
            Valuation::Unavailable { reason, .. } => Some(reason.clone()),
            Valuation::Available { .. } => None,
        };

        let mut record = PerformanceRecord {
            ticker: holding.ticker.clone(),
            asset_class: holding.asset_class.clone(),
            quantity: holding.quantity,
            currency: holding.currency.clone(),
            current_value,
            cost_basis,
            profit_loss,
            return_1d_pct: None,
            return_1d_abs: None,
            return_1w_pct: None,
            return_1w_abs: None,
            return_1m_pct: None,
            return_1m_abs: None,
            unavailable_reason,
        };

        if let Some(current) = current_value {
            for window in LookbackWindow::ALL {
                let ret = self.period_return(current, log, &holding.ticker, window, today);
                record.set_period_return(window, ret);
            }
        }

        record
    }

    /// Return of `current` against the baseline snapshot for `window`.
    pub fn period_return(
        &self,
        current: f64,
        log: &SnapshotLog,
        ticker: &str,
        window: LookbackWindow,
        today: NaiveDate,
    ) -> PeriodReturn {
        match log.latest_on_or_before(ticker, window.cutoff(today)) {
            Some(past) => Self::compute_return(current, past.value),
            None => PeriodReturn::NOT_AVAILABLE,
        }
    }

    /// `abs = current − past`, `pct = abs / past × 100` (absent when past is 0).
    pub fn compute_return(current: f64, past: f64) -> PeriodReturn {
        if !current.is_finite() || !past.is_finite() {
            return PeriodReturn::NOT_AVAILABLE;
        }
        let abs = current - past;
        let pct = if past == 0.0 {
            None
        } else {
            Some(abs / past * 100.0)
        };
        PeriodReturn {
            pct,
            abs: Some(abs),
        }
    }
}

impl Default for PerformanceService {
    fn default() -> Self {
        Self::new()
    }
}
