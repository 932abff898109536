pub mod analytics;
pub mod asset;
pub mod price;
pub mod settings;
pub mod snapshot;
