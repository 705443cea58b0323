//! Website/server availability monitor and Telegram OTP relay
//!
//! The monitor probes an HTTP endpoint and a TCP connection on a fixed
//! interval, maintains a durable status history with downtime incidents, and
//! posts status-change notifications to a Telegram chat. The OTP relay answers
//! a chat command with the current TOTP code for a configured secret.

pub mod config;
pub mod errors;
pub mod history;
pub mod monitor;
pub mod notification;
pub mod otp;
pub mod probe;
pub mod status;
pub mod store;
pub mod telegram;

pub use config::Config;
pub use errors::{MonitorError, Result};
pub use history::{HistoryRecord, Incident, format_duration};
pub use monitor::Monitor;
pub use status::{Observation, Status};
