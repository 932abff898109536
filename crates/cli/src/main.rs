mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use tracing::{error, info};

use investment_tracker_core::config;
use investment_tracker_core::models::settings::Settings;
use investment_tracker_core::storage::google::SheetsSession;
use investment_tracker_core::{InvestmentTracker, RunOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Settings first so LOG_LEVEL / LOG_FORMAT from .env take effect
    let settings = config::load_settings().context("failed to load settings")?;
    logging::init_logging();

    match cli.command {
        Commands::Run { dry_run } => handle_run(settings, dry_run).await,
    }
}

/// One full tracking run: open the session, run the pipeline, close the session.
async fn handle_run(settings: Settings, dry_run: bool) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    info!(
        date = %today,
        base_currency = %settings.base_currency,
        holdings = %settings.holdings_sheet,
        "starting investment tracker"
    );

    let session =
        SheetsSession::open_from_file(&settings.credentials_file, settings.http_timeout_secs)
            .await
            .with_context(|| {
                format!(
                    "failed to open a Sheets session with {}",
                    settings.credentials_file.display()
                )
            })?;

    let tracker = InvestmentTracker::new(settings);
    let result = tracker.run(&session, today, RunOptions { dry_run }).await;
    session.close().await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "run failed");
            return Err(e).context("investment tracking run failed");
        }
    };

    let base = &tracker.settings().base_currency;
    let totals = &outcome.totals;
    println!(
        "{}: value {:.2} {base}, cost {:.2} {base}, P/L {:.2} {base} ({}) | {} priced, {} unavailable{}",
        totals.date,
        totals.total_value,
        totals.total_cost,
        totals.total_profit_loss,
        totals
            .total_return_pct
            .map_or_else(|| "N/A".to_string(), |p| format!("{p:.2}%")),
        totals.priced_assets,
        totals.unavailable_assets,
        if dry_run { " (dry run)" } else { "" },
    );
    Ok(())
}
