use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a quoted price relates to the holding's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteBasis {
    /// Price of one unit; position value = price × quantity.
    PerUnit,
    /// Value of the whole position (manual entries).
    Position,
}

/// A price produced by a provider for one holding. Used once, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub ticker: String,
    pub price: f64,
    /// Currency of `price`
    pub currency: String,
    pub as_of: NaiveDate,
    pub basis: QuoteBasis,
}

impl PriceQuote {
    pub fn per_unit(
        ticker: impl Into<String>,
        price: f64,
        currency: impl Into<String>,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            currency: currency.into(),
            as_of,
            basis: QuoteBasis::PerUnit,
        }
    }

    pub fn position(
        ticker: impl Into<String>,
        value: f64,
        currency: impl Into<String>,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            price: value,
            currency: currency.into(),
            as_of,
            basis: QuoteBasis::Position,
        }
    }

    /// Value of a position of `quantity` units, in the quote's currency.
    pub fn value_of(&self, quantity: f64) -> f64 {
        match self.basis {
            QuoteBasis::PerUnit => self.price * quantity,
            QuoteBasis::Position => self.price,
        }
    }
}

/// Exchange rates fetched during a single run, keyed by (from, to).
///
/// Owned by the run; nothing survives past the process.
#[derive(Debug, Clone, Default)]
pub struct FxRateCache {
    rates: HashMap<(String, String), f64>,
}

impl FxRateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, from: &str, to: &str) -> Option<f64> {
        self.rates
            .get(&(from.to_uppercase(), to.to_uppercase()))
            .copied()
    }

    pub fn insert(&mut self, from: &str, to: &str, rate: f64) {
        self.rates
            .insert((from.to_uppercase(), to.to_uppercase()), rate);
    }
}
