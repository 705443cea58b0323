//! Error types for the monitor and OTP relay

use std::fmt;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug)]
pub enum MonitorError {
    /// IO operation failed
    Io(std::io::Error),

    /// HTTP request failed
    Http(reqwest::Error),

    /// JSON serialization/deserialization failed
    Json(serde_json::Error),

    /// Configuration error
    Config(String),

    /// Notification delivery error
    Notify(String),

    /// TOTP secret or generation error
    Otp(String),
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::Io(err) => write!(f, "IO error: {}", err),
            MonitorError::Http(err) => write!(f, "HTTP error: {}", err),
            MonitorError::Json(err) => write!(f, "JSON error: {}", err),
            MonitorError::Config(msg) => write!(f, "Configuration error: {}", msg),
            MonitorError::Notify(msg) => write!(f, "Notification error: {}", msg),
            MonitorError::Otp(msg) => write!(f, "OTP error: {}", msg),
        }
    }
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MonitorError::Io(err) => Some(err),
            MonitorError::Http(err) => Some(err),
            MonitorError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MonitorError {
    fn from(err: std::io::Error) -> Self {
        MonitorError::Io(err)
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        MonitorError::Http(err)
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Json(err)
    }
}
