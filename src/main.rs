use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daybrief::{
    config::Config, data::ProviderClient, llm::LLMClient, notify::SmtpMailer, DailyOrchestrator,
};

#[derive(Parser)]
#[command(
    name = "daybrief",
    about = "Unattended daily A-share market review pipeline",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Pin the run date (defaults to today, UTC)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Override the configured lookback window length in days
    #[arg(long)]
    lookback_days: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first - a missing secret must terminate the run
    // before any collaborator exists, so nothing can be fetched or sent.
    let mut config = Config::load()?;
    if let Some(date) = cli.date {
        config.pipeline.run_date = Some(date);
    }
    if let Some(days) = cli.lookback_days {
        config.pipeline.lookback_days = days;
    }

    // Initialize tracing with structured JSON logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "daybrief starting up");

    let source = ProviderClient::new(&config.pipeline)?;
    let engine = LLMClient::new(&config.engine)?;
    let mailer = SmtpMailer::new(&config.mail)?;

    let orchestrator = DailyOrchestrator::new(config, source, engine, mailer);
    orchestrator.run_to_completion().await?;

    info!("daybrief completed successfully");
    Ok(())
}
