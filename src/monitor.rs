//! Monitoring loop: probe, update history, persist, notify

use crate::config::Config;
use crate::errors::{MonitorError, Result};
use crate::notification;
use crate::probe::Prober;
use crate::store::HistoryStore;
use crate::telegram::TelegramClient;
use std::path::PathBuf;
use tokio::time::interval;
use tracing::{error, info};

/// Orchestrates one probe target: prober, history store, and notifier are
/// constructed once and threaded through every cycle
pub struct Monitor {
    config: Config,
    prober: Prober,
    store: HistoryStore,
    telegram: TelegramClient,
}

impl Monitor {
    /// Create a new monitor from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate().map_err(MonitorError::Config)?;

        let prober = Prober::new(&config)?;
        let store = HistoryStore::new(&config.history_path);
        let telegram = TelegramClient::new(
            config.telegram_api_base.clone(),
            config.bot_token.clone(),
            config.http_timeout,
            config.max_retries,
            config.retry_backoff_ms,
            config.fallback_path.clone().map(PathBuf::from),
        )?;

        Ok(Self {
            config,
            prober,
            store,
            telegram,
        })
    }

    /// Run the monitoring loop until interrupted.
    ///
    /// Cycles execute strictly one at a time; the next tick does not start a
    /// new cycle before the previous one has persisted its update.
    pub async fn run(&self) -> Result<()> {
        info!(
            "Monitoring {} (server {}) every {}s",
            self.config.website_url,
            self.config.server_addr,
            self.config.check_interval.as_secs()
        );

        self.announce_startup().await;

        let mut ticker = interval(self.config.check_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down monitor");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Execute a single probe cycle.
    ///
    /// Persistence and delivery failures are logged and never abort the cycle:
    /// the in-memory update still completes, and a lost write at worst replays
    /// one cycle's worth of state on the next load.
    pub async fn run_cycle(&self) {
        let mut history = self.store.load().await;
        let prior_status = history.last_status;

        let observation = self.prober.probe().await;
        info!("Status: {}", observation.status);
        if let Some(code) = observation.status_code {
            info!("HTTP status code: {}", code);
        }
        if let Some(response_time) = observation.response_time {
            info!("Response time: {:.2}s", response_time);
        }

        let closed_incident = history.observe(&observation);

        if let Err(e) = self.store.save(&history).await {
            error!("Failed to persist status history: {}", e);
        }

        if let Some(decision) =
            notification::decide(prior_status, &observation, closed_incident.as_ref())
        {
            let text = decision.render(&self.config.website_url, &observation);
            if let Err(e) = self.telegram.send_message(self.config.chat_id, &text).await {
                error!("Failed to deliver notification: {}", e);
            }
        }
    }

    /// Best-effort startup announcement to the chat
    async fn announce_startup(&self) {
        let text = format!(
            "🟢 Monitoring started for {}",
            self.config.website_url
        );
        if let Err(e) = self.telegram.send_message(self.config.chat_id, &text).await {
            error!("Failed to send startup announcement: {}", e);
        }
    }
}
