use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "investment-tracker")]
#[command(
    version,
    about = "Values the holdings in a Google Sheet and logs daily performance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Value all holdings and write snapshots, the report and the daily totals
    Run {
        /// Compute and log everything, write nothing back
        #[arg(short, long)]
        dry_run: bool,
    },
}
