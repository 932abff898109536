// Logging setup: level from LOG_LEVEL, JSON output when LOG_FORMAT=json
use std::env;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

const CRATES: [&str; 2] = ["investment_tracker", "investment_tracker_core"];

pub fn init_logging() {
    let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let json = env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    // Everything else stays at warn; our crates follow LOG_LEVEL
    let directives = CRATES
        .iter()
        .fold("warn".to_string(), |acc, krate| format!("{acc},{krate}={level}"));
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| {
        EnvFilter::new("warn,investment_tracker=info,investment_tracker_core=info")
    });

    let layer: Box<dyn Layer<Registry> + Send + Sync> = if json {
        fmt::layer()
            .json()
            .with_timer(fmt::time::SystemTime)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}
