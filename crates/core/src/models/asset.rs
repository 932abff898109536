use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The class of a tracked holding.
/// Determines which price provider values it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// US-listed stocks and ETFs: Yahoo Finance
    UsStock,
    /// Cryptocurrencies (BTC-USD, ETH-USD, etc.): Yahoo Finance
    Crypto,
    /// Foreign currency positions (USDTRY=X, EURTRY=X): Yahoo Finance
    Fx,
    /// Turkish mutual funds: TEFAS
    Fund,
    /// Bank time deposits: simple interest accrual, no network
    TimeDeposit,
    /// Values entered by hand in the sheet
    Manual,
    /// A label the tracker does not recognise; no provider will serve it.
    Unknown(String),
}

impl AssetClass {
    /// Parse the `Asset_Type` label used in the holdings sheet.
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "stock (us)" | "stock" | "us stock" | "equity" => AssetClass::UsStock,
            "crypto" | "cryptocurrency" => AssetClass::Crypto,
            "döviz" | "doviz" | "fx" | "currency" | "forex" => AssetClass::Fx,
            "fund (tefas)" | "tefas" | "fund" => AssetClass::Fund,
            "time deposit" | "deposit" | "vadeli" => AssetClass::TimeDeposit,
            "manual" => AssetClass::Manual,
            _ => AssetClass::Unknown(label.trim().to_string()),
        }
    }

}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::UsStock => write!(f, "Stock (US)"),
            AssetClass::Crypto => write!(f, "Crypto"),
            AssetClass::Fx => write!(f, "Döviz"),
            AssetClass::Fund => write!(f, "Fund (TEFAS)"),
            AssetClass::TimeDeposit => write!(f, "Time Deposit"),
            AssetClass::Manual => write!(f, "Manual"),
            AssetClass::Unknown(label) => write!(f, "{label}"),
        }
    }
}

/// One row of the holdings sheet.
///
/// Created by the holdings reader and immutable for the rest of the run.
/// Tickers are stored trimmed and uppercased, currencies likewise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker or identifier (e.g., "AAPL", "BTC-USD", "AAK", "DEPOSIT-1")
    pub ticker: String,

    /// Asset class from the sheet label, kept for display even when the
    /// row is valued manually
    pub asset_class: AssetClass,

    /// Units held. For time deposits this is the principal.
    pub quantity: f64,

    /// Purchase price per unit in the holding's currency
    pub purchase_price: f64,

    /// Currency the holding is priced in (e.g., "TRY", "USD")
    pub currency: String,

    /// Annual simple-interest rate in percent (time deposits only)
    pub annual_interest_rate: f64,

    /// Deposit start date (time deposits only)
    pub start_date: Option<NaiveDate>,

    /// Manually entered current value of the whole position. When set the
    /// holding is valued manually whatever its asset class.
    pub manual_value: Option<f64>,

    /// Manually entered total cost, already in the base currency
    pub manual_total_cost: f64,
}

impl Holding {
    pub fn new(
        ticker: impl Into<String>,
        asset_class: AssetClass,
        quantity: f64,
        purchase_price: f64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into().trim().to_uppercase(),
            asset_class,
            quantity,
            purchase_price,
            currency: currency.into().trim().to_uppercase(),
            annual_interest_rate: 0.0,
            start_date: None,
            manual_value: None,
            manual_total_cost: 0.0,
        }
    }

    /// A manually valued position. `total_cost` is in the base currency.
    pub fn manual(
        ticker: impl Into<String>,
        value: f64,
        total_cost: f64,
        currency: impl Into<String>,
    ) -> Self {
        let mut holding = Self::new(ticker, AssetClass::Manual, 0.0, 0.0, currency);
        holding.manual_value = Some(value);
        holding.manual_total_cost = total_cost;
        holding
    }

    /// A time deposit of `principal` opened on `start_date` at `annual_rate` percent.
    pub fn time_deposit(
        ticker: impl Into<String>,
        principal: f64,
        annual_rate: f64,
        start_date: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        let mut holding = Self::new(ticker, AssetClass::TimeDeposit, principal, 1.0, currency);
        holding.annual_interest_rate = annual_rate;
        holding.start_date = Some(start_date);
        holding
    }

    pub fn is_manual(&self) -> bool {
        self.manual_value.is_some() || self.asset_class == AssetClass::Manual
    }

    /// The class used to pick a price provider: [`AssetClass::Manual`] for
    /// manually valued rows, the sheet class otherwise.
    pub fn pricing_class(&self) -> AssetClass {
        if self.is_manual() {
            AssetClass::Manual
        } else {
            self.asset_class.clone()
        }
    }
}
