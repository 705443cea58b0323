//! Telegram Bot API client for notification delivery and command polling

use crate::errors::{MonitorError, Result};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Telegram Bot API client with retry and file fallback
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
    bot_token: String,
    max_retries: u32,
    retry_backoff_ms: u64,
    fallback_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

/// One incoming update from long polling
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl TelegramClient {
    /// Create a new client against the given API base URL
    pub fn new(
        api_base: String,
        bot_token: String,
        http_timeout: Duration,
        max_retries: u32,
        retry_backoff_ms: u64,
        fallback_path: Option<PathBuf>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(http_timeout)
            .user_agent(format!("sitewatch/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MonitorError::Http)?;

        Ok(Self {
            client,
            api_base,
            bot_token,
            max_retries,
            retry_backoff_ms,
            fallback_path,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    /// Send a chat message, retrying with exponential backoff.
    ///
    /// When every attempt fails the message is appended to the fallback file
    /// (best effort) and the last error is returned.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = self.method_url("sendMessage");

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match self.send_attempt(&url, chat_id, text).await {
                Ok(()) => {
                    info!("Telegram message sent (attempt {})", attempt + 1);
                    return Ok(());
                }
                Err(e) => {
                    last_error = Some(e);
                    attempt += 1;

                    if attempt <= self.max_retries {
                        let backoff_ms = self.retry_backoff_ms * (2_u64.pow(attempt - 1));
                        warn!(
                            "Failed to send Telegram message (attempt {}), retrying in {}ms: {}",
                            attempt,
                            backoff_ms,
                            last_error.as_ref().unwrap()
                        );
                        sleep(Duration::from_millis(backoff_ms)).await;
                    }
                }
            }
        }

        let final_error = last_error
            .unwrap_or_else(|| MonitorError::Notify("all delivery attempts failed".to_string()));

        error!(
            "Failed to send Telegram message after {} attempts: {}",
            self.max_retries + 1,
            final_error
        );
        self.write_fallback(text).await;

        Err(final_error)
    }

    async fn send_attempt(&self, url: &str, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(url)
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            .map_err(MonitorError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MonitorError::Notify(format!(
                "sendMessage returned {}: {}",
                status, body
            )));
        }

        let body: ApiResponse = response.json().await.map_err(MonitorError::Http)?;
        if !body.ok {
            return Err(MonitorError::Notify(format!(
                "Telegram API error: {}",
                body.description.unwrap_or_else(|| "no description".to_string())
            )));
        }

        debug!("Message accepted by Telegram");
        Ok(())
    }

    /// Append an undeliverable message to the fallback file, best effort
    async fn write_fallback(&self, text: &str) {
        let Some(path) = &self.fallback_path else {
            return;
        };

        let line = format!("{} - {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S"), text);
        let result = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;

        match result {
            Ok(()) => warn!("Wrote undelivered message to {}", path.display()),
            Err(e) => error!("Fallback write to {} failed: {}", path.display(), e),
        }
    }

    /// Long-poll for updates, starting after `offset`.
    ///
    /// The server holds the request up to `long_poll`; the HTTP client timeout
    /// must leave headroom above it.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        long_poll: Duration,
    ) -> Result<Vec<Update>> {
        let url = self.method_url("getUpdates");

        let mut request = self
            .client
            .get(&url)
            .query(&[("timeout", long_poll.as_secs().to_string())]);
        if let Some(offset) = offset {
            request = request.query(&[("offset", offset.to_string())]);
        }

        let response = request.send().await.map_err(MonitorError::Http)?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MonitorError::Notify(format!(
                "getUpdates returned {}: {}",
                status, body
            )));
        }

        let body: UpdatesResponse = response.json().await.map_err(MonitorError::Http)?;
        if !body.ok {
            return Err(MonitorError::Notify(
                "getUpdates returned ok=false".to_string(),
            ));
        }

        Ok(body.result)
    }
}
