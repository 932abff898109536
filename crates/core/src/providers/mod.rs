pub mod registry;
pub mod traits;

// Valuation sources, one per asset class family
pub mod manual;
pub mod tefas;
pub mod time_deposit;
pub mod yahoo_finance;
