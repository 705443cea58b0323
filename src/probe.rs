//! Website and server probing

use crate::config::Config;
use crate::errors::{MonitorError, Result};
use crate::status::{Observation, Status};
use chrono::Utc;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Performs the HTTP and TCP connectivity checks for one probe cycle
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    website_url: String,
    server_addr: String,
    connect_timeout: Duration,
}

impl Prober {
    /// Create a new prober from the monitor configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(format!("sitewatch/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MonitorError::Http)?;

        Ok(Self {
            client,
            website_url: config.website_url.clone(),
            server_addr: config.server_addr.clone(),
            connect_timeout: config.connect_timeout,
        })
    }

    /// Run both checks and classify the result.
    ///
    /// Never fails: network errors are absorbed into the observation as an
    /// OFFLINE classification or a failed connectivity check.
    pub async fn probe(&self) -> Observation {
        debug!("Checking website: {}", self.website_url);
        let (status_code, response_time, error_text) = self.check_http().await;
        let (connectivity_ok, connectivity_detail) = self.check_connectivity().await;

        let status = Status::classify(status_code, connectivity_ok);

        Observation {
            status,
            status_code,
            response_time,
            connectivity_ok,
            connectivity_detail,
            error_text,
            timestamp: Utc::now(),
        }
    }

    /// HTTP GET against the website, returning (status code, elapsed seconds,
    /// error text); the code is absent when the request failed entirely
    async fn check_http(&self) -> (Option<u16>, Option<f64>, Option<String>) {
        let start = Instant::now();

        match self.client.get(&self.website_url).send().await {
            Ok(response) => {
                let elapsed = start.elapsed().as_secs_f64();
                (Some(response.status().as_u16()), Some(elapsed), None)
            }
            Err(e) => (None, None, Some(e.to_string())),
        }
    }

    /// TCP connect to the server address, a socket-level stand-in for ping
    async fn check_connectivity(&self) -> (bool, String) {
        let start = Instant::now();

        match timeout(self.connect_timeout, TcpStream::connect(&self.server_addr)).await {
            Ok(Ok(_stream)) => (
                true,
                format!(
                    "Connection successful in {:.2}s",
                    start.elapsed().as_secs_f64()
                ),
            ),
            Ok(Err(e)) => (false, format!("Connection error: {}", e)),
            Err(_) => (
                false,
                format!(
                    "Connection timeout after {}s",
                    self.connect_timeout.as_secs()
                ),
            ),
        }
    }
}
