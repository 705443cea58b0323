//! OTP Relay Binary
//!
//! Long-polls the Telegram Bot API and answers `/getotp` from the configured
//! chat with the current one-time password.

use clap::Parser;
use sitewatch::errors::{MonitorError, Result};
use sitewatch::otp::OtpGenerator;
use sitewatch::telegram::TelegramClient;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Headroom the HTTP timeout keeps above the long-poll window
const LONG_POLL: Duration = Duration::from_secs(30);
const HTTP_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Parser)]
#[command(name = "otp-relay", version, about = "Telegram TOTP relay")]
struct Cli {
    /// TOTP secret, either raw base32 or an otpauth:// provisioning URI
    #[arg(long, env = "OTP_SECRET", hide_env_values = true)]
    secret: String,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    bot_token: String,

    /// Telegram chat allowed to request codes
    #[arg(long, env = "TELEGRAM_CHAT_ID", allow_hyphen_values = true)]
    chat_id: i64,

    /// Base URL of the Telegram Bot API
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = "https://api.telegram.org")]
    api_base: String,

    /// Maximum retry attempts for sending a code
    #[arg(long, env = "MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// File that receives codes when delivery fails entirely
    #[arg(long, env = "FALLBACK_FILE", default_value = "otp_fallback.txt")]
    fallback_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    initialize_tracing();

    let cli = Cli::parse();

    info!("Starting OTP relay v{}", env!("CARGO_PKG_VERSION"));

    let generator = OtpGenerator::from_secret(&cli.secret)?;
    let telegram = TelegramClient::new(
        cli.api_base.clone(),
        cli.bot_token.clone(),
        HTTP_TIMEOUT,
        cli.max_retries,
        1000,
        Some(cli.fallback_file.clone()),
    )?;

    info!("OTP relay is running, waiting for /getotp in the configured chat");

    run_loop(&telegram, &generator, cli.chat_id).await
}

async fn run_loop(
    telegram: &TelegramClient,
    generator: &OtpGenerator,
    chat_id: i64,
) -> Result<()> {
    let mut offset: Option<i64> = None;

    loop {
        tokio::select! {
            updates = telegram.get_updates(offset, LONG_POLL) => {
                match updates {
                    Ok(updates) => {
                        for update in updates {
                            offset = Some(update.update_id + 1);
                            handle_update(telegram, generator, chat_id, update).await;
                        }
                    }
                    Err(MonitorError::Http(e)) if e.is_timeout() => {
                        // Expected during long polling
                        warn!("Telegram long poll timed out, retrying");
                    }
                    Err(e) => {
                        error!("Failed to fetch updates: {}", e);
                        tokio::time::sleep(Duration::from_secs(3)).await;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down OTP relay");
                return Ok(());
            }
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn handle_update(
    telegram: &TelegramClient,
    generator: &OtpGenerator,
    chat_id: i64,
    update: sitewatch::telegram::Update,
) {
    let Some(message) = update.message else {
        return;
    };
    if message.chat.id != chat_id {
        return;
    }
    let Some(text) = message.text else {
        return;
    };
    if !text.trim().eq_ignore_ascii_case("/getotp") {
        return;
    }

    match generator.generate() {
        Ok(code) => {
            info!("Generated OTP on request from chat {}", chat_id);
            let reply = format!("Your OTP is: {}", code);
            if let Err(e) = telegram.send_message(chat_id, &reply).await {
                error!("Failed to send OTP: {}", e);
            }
        }
        Err(e) => error!("OTP generation failed: {}", e),
    }
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
