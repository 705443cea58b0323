//! Website Monitor Binary

use clap::Parser;
use sitewatch::{Config, Monitor, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sitewatch", version, about = "Website and server availability monitor")]
struct Cli {
    /// Run a single probe cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    initialize_tracing();

    let cli = Cli::parse();

    info!("Starting sitewatch v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env();

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    info!(
        "Monitor configuration - Website: {}, Server: {}, Interval: {}s, History: {}",
        config.website_url,
        config.server_addr,
        config.check_interval.as_secs(),
        config.history_path
    );

    let monitor = Monitor::new(config)?;

    if cli.once {
        monitor.run_cycle().await;
        return Ok(());
    }

    if let Err(e) = monitor.run().await {
        error!("Monitor failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize structured logging
fn initialize_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
