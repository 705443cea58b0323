//! Durable status history: current state, cumulative downtime, and incidents
//!
//! This is the stateful core of the monitor. `HistoryRecord::observe` is a pure
//! in-memory transform applied once per probe cycle; loading and persisting the
//! record is the caller's responsibility.

use crate::status::{Observation, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running summary of service health, persisted between probe cycles
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryRecord {
    pub last_status: Status,

    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub last_check: Option<DateTime<Utc>>,

    /// Set when a transition into OFFLINE begins a downtime episode, cleared
    /// when the paired recovery is recorded
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub downtime_started: Option<DateTime<Utc>>,

    /// Accumulated downtime in seconds, the sum of all incident durations
    pub total_downtime: f64,

    /// Completed downtime episodes, append-only
    pub incidents: Vec<Incident>,
}

impl Default for HistoryRecord {
    fn default() -> Self {
        Self {
            last_status: Status::Unknown,
            last_check: None,
            downtime_started: None,
            total_downtime: 0.0,
            incidents: Vec::new(),
        }
    }
}

/// One completed downtime episode
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub duration_formatted: String,

    /// The observation that triggered the recovery
    pub recovery_details: Observation,
}

impl HistoryRecord {
    /// Apply one observation to the history.
    ///
    /// Records an incident exactly when an OFFLINE (or initial UNKNOWN) state
    /// with downtime tracking in progress transitions to ONLINE, and starts
    /// tracking exactly on a transition into OFFLINE. All other transitions
    /// leave the downtime state untouched. Returns the incident closed by this
    /// observation, if any.
    ///
    /// Downtime math assumes observation timestamps are non-decreasing across
    /// calls; this is not enforced.
    pub fn observe(&mut self, observation: &Observation) -> Option<Incident> {
        let mut closed = None;

        if observation.status == Status::Online
            && matches!(self.last_status, Status::Offline | Status::Unknown)
        {
            if let Some(started) = self.downtime_started.take() {
                let duration = (observation.timestamp - started).num_milliseconds() as f64
                    / 1000.0;

                let incident = Incident {
                    start_time: started,
                    end_time: observation.timestamp,
                    duration_seconds: duration,
                    duration_formatted: format_duration(duration),
                    recovery_details: observation.clone(),
                };

                self.total_downtime += duration;
                self.incidents.push(incident.clone());
                closed = Some(incident);
            }
        } else if observation.status == Status::Offline && self.last_status != Status::Offline {
            self.downtime_started = Some(observation.timestamp);
        }

        self.last_status = observation.status;
        self.last_check = Some(observation.timestamp);

        closed
    }
}

/// Format a duration in seconds as a human-readable string
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{} seconds", seconds as u64)
    } else if seconds < 3600.0 {
        let minutes = (seconds / 60.0) as u64;
        format!("{} minute{}", minutes, plural(minutes))
    } else {
        let hours = (seconds / 3600.0) as u64;
        let minutes = ((seconds % 3600.0) / 60.0) as u64;
        if minutes > 0 {
            format!(
                "{} hour{} and {} minute{}",
                hours,
                plural(hours),
                minutes,
                plural(minutes)
            )
        } else {
            format!("{} hour{}", hours, plural(hours))
        }
    }
}

fn plural(value: u64) -> &'static str {
    if value == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn observation(status: Status, epoch_seconds: i64) -> Observation {
        Observation {
            status,
            status_code: match status {
                Status::Offline => None,
                Status::Degraded => Some(503),
                _ => Some(200),
            },
            response_time: (status != Status::Offline).then_some(0.2),
            connectivity_ok: status == Status::Online,
            connectivity_detail: "Connection successful in 0.01s".to_string(),
            error_text: (status == Status::Offline).then(|| "connection refused".to_string()),
            timestamp: Utc.timestamp_opt(epoch_seconds, 0).unwrap(),
        }
    }

    #[test]
    fn test_first_online_observation() {
        let mut history = HistoryRecord::default();
        let closed = history.observe(&observation(Status::Online, 0));

        assert!(closed.is_none());
        assert_eq!(history.last_status, Status::Online);
        assert!(history.downtime_started.is_none());
        assert!(history.incidents.is_empty());
        assert_eq!(history.total_downtime, 0.0);
    }

    #[test]
    fn test_offline_transition_starts_tracking() {
        let mut history = HistoryRecord::default();
        history.observe(&observation(Status::Online, 0));

        let closed = history.observe(&observation(Status::Offline, 100));

        assert!(closed.is_none());
        assert_eq!(history.last_status, Status::Offline);
        assert_eq!(
            history.downtime_started,
            Some(Utc.timestamp_opt(100, 0).unwrap())
        );
        // No incident until recovery
        assert!(history.incidents.is_empty());
    }

    #[test]
    fn test_repeated_offline_keeps_original_start() {
        let mut history = HistoryRecord::default();
        history.observe(&observation(Status::Online, 0));
        history.observe(&observation(Status::Offline, 100));
        history.observe(&observation(Status::Offline, 160));

        assert_eq!(
            history.downtime_started,
            Some(Utc.timestamp_opt(100, 0).unwrap())
        );
    }

    #[test]
    fn test_recovery_records_exactly_one_incident() {
        let mut history = HistoryRecord::default();
        history.observe(&observation(Status::Online, 0));
        history.observe(&observation(Status::Offline, 100));

        let closed = history.observe(&observation(Status::Online, 160));

        let incident = closed.expect("recovery should close an incident");
        assert_eq!(incident.start_time, Utc.timestamp_opt(100, 0).unwrap());
        assert_eq!(incident.end_time, Utc.timestamp_opt(160, 0).unwrap());
        assert_eq!(incident.duration_seconds, 60.0);
        assert_eq!(incident.duration_formatted, "1 minute");

        assert_eq!(history.incidents.len(), 1);
        assert_eq!(history.incidents[0], incident);
        assert_eq!(history.total_downtime, 60.0);
        assert!(history.downtime_started.is_none());
        assert_eq!(history.last_status, Status::Online);
    }

    #[test]
    fn test_online_to_online_is_a_no_op_for_downtime() {
        let mut history = HistoryRecord::default();
        history.observe(&observation(Status::Online, 0));
        let closed = history.observe(&observation(Status::Online, 60));

        assert!(closed.is_none());
        assert!(history.incidents.is_empty());
        assert_eq!(history.last_check, Some(Utc.timestamp_opt(60, 0).unwrap()));
    }

    #[test]
    fn test_degraded_transitions_do_not_touch_downtime_state() {
        let mut history = HistoryRecord::default();
        history.observe(&observation(Status::Online, 0));
        history.observe(&observation(Status::Degraded, 60));

        assert!(history.downtime_started.is_none());
        assert!(history.incidents.is_empty());
        assert_eq!(history.last_status, Status::Degraded);
    }

    #[test]
    fn test_total_downtime_equals_sum_of_incidents() {
        let mut history = HistoryRecord::default();
        let sequence = [
            (Status::Online, 0),
            (Status::Offline, 100),
            (Status::Online, 160),
            (Status::Online, 220),
            (Status::Offline, 280),
            (Status::Offline, 340),
            (Status::Online, 400),
        ];

        for (status, t) in sequence {
            history.observe(&observation(status, t));
        }

        assert_eq!(history.incidents.len(), 2);
        let sum: f64 = history.incidents.iter().map(|i| i.duration_seconds).sum();
        assert_eq!(history.total_downtime, sum);
        assert_eq!(history.total_downtime, 180.0);
    }

    #[test]
    fn test_recovery_from_unknown_without_tracking() {
        // UNKNOWN start with no downtime in progress: recovery closes nothing
        let mut history = HistoryRecord::default();
        let closed = history.observe(&observation(Status::Online, 50));

        assert!(closed.is_none());
        assert_eq!(history.total_downtime, 0.0);
    }

    #[test]
    fn test_degraded_interruption_leaves_episode_unclosed() {
        // OFFLINE -> DEGRADED -> ONLINE leaves the episode unclosed: the
        // recovery arrives with last_status DEGRADED, which does not qualify.
        // A later fresh OFFLINE overwrites the stale start.
        let mut history = HistoryRecord::default();
        history.observe(&observation(Status::Online, 0));
        history.observe(&observation(Status::Offline, 100));
        history.observe(&observation(Status::Degraded, 160));
        let closed = history.observe(&observation(Status::Online, 220));

        assert!(closed.is_none());
        assert!(history.incidents.is_empty());
        assert_eq!(
            history.downtime_started,
            Some(Utc.timestamp_opt(100, 0).unwrap())
        );

        history.observe(&observation(Status::Offline, 280));
        assert_eq!(
            history.downtime_started,
            Some(Utc.timestamp_opt(280, 0).unwrap())
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut history = HistoryRecord::default();

        history.observe(&observation(Status::Online, 0));
        assert_eq!(history.last_status, Status::Online);
        assert!(history.incidents.is_empty());
        assert!(history.downtime_started.is_none());

        history.observe(&observation(Status::Offline, 100));
        assert_eq!(
            history.downtime_started,
            Some(Utc.timestamp_opt(100, 0).unwrap())
        );

        let closed = history.observe(&observation(Status::Online, 160));
        let incident = closed.unwrap();
        assert_eq!(incident.duration_seconds, 60.0);
        assert_eq!(history.total_downtime, 60.0);
        assert!(history.downtime_started.is_none());
        assert_eq!(history.last_status, Status::Online);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45.0), "45 seconds");
        assert_eq!(format_duration(90.0), "1 minute");
        assert_eq!(format_duration(120.0), "2 minutes");
        assert_eq!(format_duration(3600.0), "1 hour");
        assert_eq!(format_duration(5400.0), "1 hour and 30 minutes");
        assert_eq!(format_duration(7200.0), "2 hours");
    }

    #[test]
    fn test_history_round_trip_with_incidents() {
        let mut history = HistoryRecord::default();
        let sequence = [
            (Status::Online, 0),
            (Status::Offline, 100),
            (Status::Online, 160),
            (Status::Offline, 300),
            (Status::Online, 3960),
        ];
        for (status, t) in sequence {
            history.observe(&observation(status, t));
        }
        assert_eq!(history.incidents.len(), 2);
        assert_eq!(history.incidents[1].duration_formatted, "1 hour and 1 minute");

        let json = serde_json::to_string_pretty(&history).unwrap();
        let parsed: HistoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, history);
    }

    #[test]
    fn test_default_record_survives_missing_fields() {
        // A bare object deserializes to the documented default
        let parsed: HistoryRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, HistoryRecord::default());
    }
}
