//! Notification decisions for status changes

use crate::history::Incident;
use crate::status::{Observation, Status};

/// Maximum length of error text included in a notification
const ERROR_PREVIEW_CHARS: usize = 100;

/// A user-facing notification produced by a status change
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// Service came back online, with the formatted downtime duration when a
    /// downtime episode was just closed
    Recovered { downtime: Option<String> },

    /// Service went down, with a preview of the request error
    WentDown { error: Option<String> },

    /// Service is degraded, with the connectivity detail when the TCP check failed
    Degraded { connectivity: Option<String> },
}

/// Decide whether an observation warrants a notification.
///
/// Fires only when the status differs from the prior one; repeated identical
/// statuses never re-notify. `closed_incident` is the incident the current
/// observation closed, if any, and supplies the downtime duration for recovery
/// messages.
pub fn decide(
    prior: Status,
    observation: &Observation,
    closed_incident: Option<&Incident>,
) -> Option<Notification> {
    if observation.status == prior {
        return None;
    }

    match observation.status {
        Status::Online => Some(Notification::Recovered {
            downtime: closed_incident.map(|incident| incident.duration_formatted.clone()),
        }),
        Status::Offline => Some(Notification::WentDown {
            error: observation.error_text.as_deref().map(truncate_error),
        }),
        Status::Degraded => Some(Notification::Degraded {
            connectivity: (!observation.connectivity_ok)
                .then(|| observation.connectivity_detail.clone()),
        }),
        // Classification never produces UNKNOWN
        Status::Unknown => None,
    }
}

impl Notification {
    /// Render the notification as chat message text
    pub fn render(&self, website_url: &str, observation: &Observation) -> String {
        let mut lines = Vec::new();

        match self {
            Notification::Recovered { downtime } => {
                lines.push(format!("✅ {} is back online!", website_url));
                if let Some(duration) = downtime {
                    lines.push(format!("Downtime duration: {}", duration));
                }
            }
            Notification::WentDown { error } => {
                lines.push(format!("❌ {} is not responding!", website_url));
                if let Some(error) = error {
                    lines.push(format!("Error: {}", error));
                }
            }
            Notification::Degraded { connectivity } => {
                lines.push(format!(
                    "⚠️ {} is experiencing degraded performance.",
                    website_url
                ));
                if let Some(detail) = connectivity {
                    lines.push(format!("Connection issue: {}", detail));
                }
            }
        }

        if let Some(code) = observation.status_code {
            lines.push(format!("HTTP status: {}", code));
        }
        if let Some(response_time) = observation.response_time {
            lines.push(format!("Response time: {:.2}s", response_time));
        }
        lines.push(format!(
            "Connection test: {}",
            if observation.connectivity_ok {
                "successful"
            } else {
                "failed"
            }
        ));

        lines.join("\n")
    }
}

fn truncate_error(text: &str) -> String {
    if text.chars().count() > ERROR_PREVIEW_CHARS {
        let preview: String = text.chars().take(ERROR_PREVIEW_CHARS).collect();
        format!("{}...", preview)
    } else {
        text.to_string()
    }
}
