//! Service status classification and probe observations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall health classification of the monitored service
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Online,
    Offline,
    Degraded,
    Unknown,
}

impl Default for Status {
    fn default() -> Self {
        Status::Unknown
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Online => write!(f, "ONLINE"),
            Status::Offline => write!(f, "OFFLINE"),
            Status::Degraded => write!(f, "DEGRADED"),
            Status::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl Status {
    /// Classify a probe result from the HTTP status code and the outcome of the
    /// TCP connectivity check.
    ///
    /// A missing status code means the HTTP request failed entirely, which is
    /// treated as OFFLINE. Classification never yields UNKNOWN; that state only
    /// exists as the default before any observation has been processed.
    pub fn classify(status_code: Option<u16>, connectivity_ok: bool) -> Status {
        match status_code {
            Some(code) if (200..300).contains(&code) && connectivity_ok => Status::Online,
            Some(_) => Status::Degraded,
            None => Status::Offline,
        }
    }
}

/// One probe result: classification plus the raw check data behind it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub status: Status,

    /// HTTP status code, absent when the request failed entirely
    pub status_code: Option<u16>,

    /// HTTP response time in seconds
    pub response_time: Option<f64>,

    /// Whether the TCP connectivity check succeeded
    pub connectivity_ok: bool,

    /// Human-readable outcome of the connectivity check
    pub connectivity_detail: String,

    /// Error text from a failed HTTP request
    pub error_text: Option<String>,

    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_classify_online() {
        assert_eq!(Status::classify(Some(200), true), Status::Online);
        assert_eq!(Status::classify(Some(204), true), Status::Online);
        assert_eq!(Status::classify(Some(299), true), Status::Online);
    }

    #[test]
    fn test_classify_degraded_without_connectivity() {
        assert_eq!(Status::classify(Some(200), false), Status::Degraded);
        assert_eq!(Status::classify(Some(201), false), Status::Degraded);
    }

    #[test]
    fn test_classify_degraded_on_bad_status_code() {
        // >= 300 is degraded regardless of connectivity
        assert_eq!(Status::classify(Some(301), true), Status::Degraded);
        assert_eq!(Status::classify(Some(404), true), Status::Degraded);
        assert_eq!(Status::classify(Some(500), false), Status::Degraded);
    }

    #[test]
    fn test_classify_offline_when_request_failed() {
        assert_eq!(Status::classify(None, true), Status::Offline);
        assert_eq!(Status::classify(None, false), Status::Offline);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Status::Online).unwrap(), "\"ONLINE\"");
        assert_eq!(serde_json::to_string(&Status::Unknown).unwrap(), "\"UNKNOWN\"");

        let status: Status = serde_json::from_str("\"OFFLINE\"").unwrap();
        assert_eq!(status, Status::Offline);
    }

    #[test]
    fn test_observation_round_trip() {
        let observation = Observation {
            status: Status::Degraded,
            status_code: Some(503),
            response_time: Some(1.25),
            connectivity_ok: false,
            connectivity_detail: "Connection timeout after 2s".to_string(),
            error_text: None,
            timestamp: Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_string(&observation).unwrap();
        let parsed: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, observation);
    }
}
