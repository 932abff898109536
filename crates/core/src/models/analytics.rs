use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::asset::AssetClass;

/// Fixed lookback offsets used to pick a historical comparison point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackWindow {
    OneDay,
    OneWeek,
    /// 30 calendar days, not a calendar month.
    OneMonth,
}

impl LookbackWindow {
    pub const ALL: [LookbackWindow; 3] = [
        LookbackWindow::OneDay,
        LookbackWindow::OneWeek,
        LookbackWindow::OneMonth,
    ];

    pub fn days(self) -> i64 {
        match self {
            LookbackWindow::OneDay => 1,
            LookbackWindow::OneWeek => 7,
            LookbackWindow::OneMonth => 30,
        }
    }

    /// The latest date a snapshot may carry to serve as this window's baseline.
    pub fn cutoff(self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.days())
    }

    /// Short label used in report headers ("1D", "1W", "1M").
    pub fn label(self) -> &'static str {
        match self {
            LookbackWindow::OneDay => "1D",
            LookbackWindow::OneWeek => "1W",
            LookbackWindow::OneMonth => "1M",
        }
    }
}

/// Return over one lookback window. Both fields are `None` when no baseline
/// snapshot exists; `pct` alone is `None` when the baseline value is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    pub pct: Option<f64>,
    pub abs: Option<f64>,
}

impl PeriodReturn {
    pub const NOT_AVAILABLE: PeriodReturn = PeriodReturn {
        pct: None,
        abs: None,
    };
}

/// Valuation and return metrics for one holding, as written to the report.
/// All monetary values are in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub ticker: String,
    pub asset_class: AssetClass,
    pub quantity: f64,
    pub currency: String,

    /// `None` when the holding could not be valued this run
    pub current_value: Option<f64>,
    pub cost_basis: Option<f64>,
    /// current_value − cost_basis
    pub profit_loss: Option<f64>,

    pub return_1d_pct: Option<f64>,
    pub return_1d_abs: Option<f64>,
    pub return_1w_pct: Option<f64>,
    pub return_1w_abs: Option<f64>,
    pub return_1m_pct: Option<f64>,
    pub return_1m_abs: Option<f64>,

    /// Why `current_value` is missing, if it is
    pub unavailable_reason: Option<String>,
}

impl PerformanceRecord {
    pub fn period_return(&self, window: LookbackWindow) -> PeriodReturn {
        match window {
            LookbackWindow::OneDay => PeriodReturn {
                pct: self.return_1d_pct,
                abs: self.return_1d_abs,
            },
            LookbackWindow::OneWeek => PeriodReturn {
                pct: self.return_1w_pct,
                abs: self.return_1w_abs,
            },
            LookbackWindow::OneMonth => PeriodReturn {
                pct: self.return_1m_pct,
                abs: self.return_1m_abs,
            },
        }
    }

    pub fn set_period_return(&mut self, window: LookbackWindow, ret: PeriodReturn) {
        match window {
            LookbackWindow::OneDay => {
                self.return_1d_pct = ret.pct;
                self.return_1d_abs = ret.abs;
            }
            LookbackWindow::OneWeek => {
                self.return_1w_pct = ret.pct;
                self.return_1w_abs = ret.abs;
            }
            LookbackWindow::OneMonth => {
                self.return_1m_pct = ret.pct;
                self.return_1m_abs = ret.abs;
            }
        }
    }
}

/// Portfolio-wide totals for one run, appended to the daily log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub date: NaiveDate,

    /// Sum of current values of the holdings that could be valued
    pub total_value: f64,

    /// Sum of cost bases of those same holdings
    pub total_cost: f64,

    /// total_value − total_cost
    pub total_profit_loss: f64,

    /// (total_profit_loss / total_cost) × 100; `None` when total_cost is zero
    pub total_return_pct: Option<f64>,

    /// Number of holdings included in the totals
    pub priced_assets: usize,

    /// Number of holdings left out because they could not be valued
    pub unavailable_assets: usize,
}

/// Outcome of valuing one holding this run, as handed to the performance
/// engine. Values are in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Valuation {
    Available { current_value: f64, cost_basis: f64 },
    /// The holding could not be valued. `cost_basis` is kept when it could
    /// still be worked out (e.g. only the price fetch failed).
    Unavailable {
        reason: String,
        cost_basis: Option<f64>,
    },
}

impl Valuation {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Valuation::Unavailable {
            reason: reason.into(),
            cost_basis: None,
        }
    }

    pub fn current_value(&self) -> Option<f64> {
        match self {
            Valuation::Available { current_value, .. } => Some(*current_value),
            Valuation::Unavailable { .. } => None,
        }
    }

    pub fn cost_basis(&self) -> Option<f64> {
        match self {
            Valuation::Available { cost_basis, .. } => Some(*cost_basis),
            Valuation::Unavailable { cost_basis, .. } => *cost_basis,
        }
    }

    /// Valuation of two holdings rows of the same position taken together.
    /// The position is only available when both parts are; the first
    /// unavailable reason is kept.
    pub fn combine(self, other: Valuation) -> Valuation {
        match (self, other) {
            (
                Valuation::Available {
                    current_value: a,
                    cost_basis: ca,
                },
                Valuation::Available {
                    current_value: b,
                    cost_basis: cb,
                },
            ) => Valuation::Available {
                current_value: a + b,
                cost_basis: ca + cb,
            },
            (Valuation::Unavailable { reason, cost_basis }, other) => Valuation::Unavailable {
                reason,
                cost_basis: cost_basis.zip(other.cost_basis()).map(|(a, b)| a + b),
            },
            (available, Valuation::Unavailable { reason, cost_basis }) => Valuation::Unavailable {
                reason,
                cost_basis: available.cost_basis().zip(cost_basis).map(|(a, b)| a + b),
            },
        }
    }
}
