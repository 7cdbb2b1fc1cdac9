//! CLI entry point for the Nextbike ride analytics tool.
//!
//! Provides subcommands for downloading a user's account history, building
//! the full analytics report, and exporting monthly statistics.

mod infra;
mod services;

use crate::infra::nextbike::client::NextbikeClient;
use crate::services::account_api::AccountApi;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use nextbike_analytics::{
    config::AnalyticsConfig,
    extract::extract_rental_rides,
    filter::{DateRange, filter_rides},
    models::RawAccountItem,
    output::{print_json, print_pretty, print_summary, write_json, write_monthly_csv},
    parser::parse_account_items,
    report::AnalyticsReport,
    stats::compute_monthly_stats,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "nextbike-analytics")]
#[command(about = "Statistics and heatmaps from your Nextbike ride history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that analyzes a batch.
#[derive(clap::Args)]
struct BatchArgs {
    /// Saved list.json file, a list.json URL, or "api" to fetch with the env credentials
    #[arg(value_name = "FILE_OR_URL")]
    source: String,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// JSON config file (distance factor, UTC offset, histogram buckets)
    #[arg(short, long)]
    config: Option<String>,
}

impl BatchArgs {
    fn range(&self) -> DateRange {
        DateRange::new(self.from, self.to)
    }

    fn load_config(&self) -> Result<AnalyticsConfig> {
        match &self.config {
            Some(path) => AnalyticsConfig::load(path),
            None => Ok(AnalyticsConfig::default()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full analytics report for a ride history
    Analyze {
        #[command(flatten)]
        batch: BatchArgs,

        /// Write the report as JSON to this path
        #[arg(long)]
        json: Option<String>,

        /// Log the report as JSON instead of a summary
        #[arg(long, default_value_t = false)]
        print_json: bool,
    },
    /// Export per-month statistics as CSV
    Monthly {
        #[command(flatten)]
        batch: BatchArgs,

        /// CSV file to write
        #[arg(short, long, default_value = "monthly.csv")]
        output: String,
    },
    /// Download the account list and save it for offline analysis
    Fetch {
        /// File to save the raw list.json body to
        #[arg(short, long, default_value = "list.json")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/nextbike_analytics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nextbike_analytics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            batch,
            json,
            print_json: as_json,
        } => {
            let config = batch.load_config()?;
            let items = load_items(&batch.source).await?;
            let report = AnalyticsReport::from_items(&items, batch.range(), &config);

            print_pretty(&report);
            if as_json {
                print_json(&report)?;
            } else {
                print_summary(&report);
            }

            if let Some(path) = json {
                write_json(&path, &report)?;
                info!(path = %path, "Report written");
            }
        }
        Commands::Monthly { batch, output } => {
            let config = batch.load_config()?;
            let items = load_items(&batch.source).await?;
            let rides = filter_rides(&extract_rental_rides(&items, &config), &batch.range());
            let monthly = compute_monthly_stats(&rides);

            write_monthly_csv(&output, &monthly)?;
            info!(path = %output, months = monthly.len(), "Monthly stats written");
        }
        Commands::Fetch { output } => {
            let client = NextbikeClient::from_env()?;
            let body = client.fetch_account_body().await?;

            std::fs::write(&output, &body).with_context(|| format!("Failed to write '{output}'"))?;
            info!(path = %output, bytes = body.len(), "Account list saved");
        }
    }

    Ok(())
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads account items from a saved file, or fetches them from the API.
#[tracing::instrument(fields(source = %source))]
async fn load_items(source: &str) -> Result<Vec<RawAccountItem>> {
    if source == "api" {
        NextbikeClient::from_env()?.list_account_items().await
    } else if is_remote(source) {
        NextbikeClient::from_env()?
            .with_list_url(source)
            .list_account_items()
            .await
    } else {
        let bytes =
            std::fs::read(source).with_context(|| format!("Failed to read '{source}'"))?;
        parse_account_items(&bytes)
    }
}
