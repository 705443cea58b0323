//! Durable storage for the status history

use crate::errors::Result;
use crate::history::HistoryRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads and writes the status history as pretty-printed JSON.
///
/// Loading never fails: a missing or unreadable file yields the default record
/// so a corrupt store cannot take the monitoring loop down.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the history, substituting the default record on any failure
    pub async fn load(&self) -> HistoryRecord {
        if !self.path.exists() {
            debug!("No status history at {}, starting fresh", self.path.display());
            return HistoryRecord::default();
        }

        match self.try_load().await {
            Ok(history) => history,
            Err(e) => {
                warn!(
                    "Failed to load status history from {}: {}, using defaults",
                    self.path.display(),
                    e
                );
                HistoryRecord::default()
            }
        }
    }

    async fn try_load(&self) -> Result<HistoryRecord> {
        let data = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Persist the history
    pub async fn save(&self, history: &HistoryRecord) -> Result<()> {
        let data = serde_json::to_string_pretty(history)?;
        tokio::fs::write(&self.path, data).await?;
        debug!("Saved status history to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{Observation, Status};
    use chrono::{TimeZone, Utc};

    fn observation(status: Status, epoch_seconds: i64) -> Observation {
        Observation {
            status,
            status_code: (status != Status::Offline).then_some(200),
            response_time: (status != Status::Offline).then_some(0.1),
            connectivity_ok: status == Status::Online,
            connectivity_detail: "Connection successful in 0.01s".to_string(),
            error_text: None,
            timestamp: Utc.timestamp_opt(epoch_seconds, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_round_trip_preserves_incident_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("status_history.json"));

        let mut history = HistoryRecord::default();
        for (status, t) in [
            (Status::Online, 0),
            (Status::Offline, 100),
            (Status::Online, 160),
            (Status::Offline, 200),
            (Status::Online, 320),
        ] {
            history.observe(&observation(status, t));
        }
        assert_eq!(history.incidents.len(), 2);

        store.save(&history).await.unwrap();
        let loaded = store.load().await;

        assert_eq!(loaded, history);
        assert_eq!(loaded.incidents[0].duration_seconds, 60.0);
        assert_eq!(loaded.incidents[1].duration_seconds, 120.0);
    }

    #[tokio::test]
    async fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("does_not_exist.json"));

        let history = store.load().await;
        assert_eq!(history, HistoryRecord::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status_history.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let store = HistoryStore::new(&path);
        let history = store.load().await;
        assert_eq!(history, HistoryRecord::default());
    }

    #[tokio::test]
    async fn test_save_to_unwritable_path_fails() {
        let store = HistoryStore::new("/nonexistent-dir/status_history.json");
        let result = store.save(&HistoryRecord::default()).await;
        assert!(result.is_err());
    }
}
