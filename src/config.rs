//! Configuration management for the monitor

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL of the website to probe
    pub website_url: String,

    /// Host:port for the TCP connectivity check
    pub server_addr: String,

    /// Interval between probe cycles
    pub check_interval: Duration,

    /// HTTP timeout for website probes
    pub http_timeout: Duration,

    /// Timeout for the TCP connectivity check
    pub connect_timeout: Duration,

    /// Path of the persisted status history
    pub history_path: String,

    /// Telegram bot token
    pub bot_token: String,

    /// Telegram chat to notify
    pub chat_id: i64,

    /// Base URL of the Telegram Bot API
    pub telegram_api_base: String,

    /// Maximum retry attempts for failed notification deliveries
    pub max_retries: u32,

    /// Retry backoff multiplier
    pub retry_backoff_ms: u64,

    /// File that receives notifications when delivery fails entirely
    pub fallback_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            website_url: "http://localhost:8080".to_string(),
            server_addr: "localhost:80".to_string(),
            check_interval: Duration::from_secs(60),
            http_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
            history_path: "status_history.json".to_string(),
            bot_token: String::new(),
            chat_id: 0,
            telegram_api_base: "https://api.telegram.org".to_string(),
            max_retries: 3,
            retry_backoff_ms: 1000,
            fallback_path: Some("notification_fallback.txt".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(website_url) = env::var("WEBSITE_URL") {
            config.website_url = website_url;
        }

        if let Ok(server_addr) = env::var("SERVER_ADDR") {
            config.server_addr = server_addr;
        }

        if let Ok(interval) = env::var("CHECK_INTERVAL_SECONDS") {
            if let Ok(seconds) = interval.parse::<u64>() {
                config.check_interval = Duration::from_secs(seconds);
            }
        }

        if let Ok(timeout) = env::var("HTTP_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.http_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(timeout) = env::var("CONNECT_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.connect_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(history_path) = env::var("HISTORY_FILE") {
            config.history_path = history_path;
        }

        if let Ok(bot_token) = env::var("TELEGRAM_BOT_TOKEN") {
            config.bot_token = bot_token;
        }

        if let Ok(chat_id) = env::var("TELEGRAM_CHAT_ID") {
            if let Ok(id) = chat_id.parse() {
                config.chat_id = id;
            }
        }

        if let Ok(api_base) = env::var("TELEGRAM_API_BASE") {
            config.telegram_api_base = api_base;
        }

        if let Ok(max_retries) = env::var("MAX_RETRIES") {
            if let Ok(retries) = max_retries.parse() {
                config.max_retries = retries;
            }
        }

        if let Ok(backoff) = env::var("RETRY_BACKOFF_MS") {
            if let Ok(ms) = backoff.parse() {
                config.retry_backoff_ms = ms;
            }
        }

        if let Ok(fallback) = env::var("FALLBACK_FILE") {
            if fallback.is_empty() {
                config.fallback_path = None;
            } else {
                config.fallback_path = Some(fallback);
            }
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.website_url.is_empty() {
            return Err("website_url cannot be empty".to_string());
        }

        if self.server_addr.is_empty() {
            return Err("server_addr cannot be empty".to_string());
        }

        if self.check_interval.is_zero() {
            return Err("check_interval must be greater than 0".to_string());
        }

        if self.history_path.is_empty() {
            return Err("history_path cannot be empty".to_string());
        }

        if self.bot_token.is_empty() {
            return Err("bot_token cannot be empty".to_string());
        }

        if self.chat_id == 0 {
            return Err("chat_id must be set".to_string());
        }

        Ok(())
    }
}
