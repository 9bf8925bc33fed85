//! Trajectory recorder implementation

use crate::error::{Result, TrajectoryError};
use crate::trajectory::{EntryType, TrajectoryEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

/// Records execution trajectories for debugging and analysis
pub struct TrajectoryRecorder {
    entries: RwLock<Vec<TrajectoryEntry>>,
    file_path: Option<PathBuf>,
    auto_save: bool,
}

/// Complete trajectory data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub metadata: TrajectoryMetadata,

    pub entries: Vec<TrajectoryEntry>,
}

/// Metadata for a trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryMetadata {
    pub id: String,

    pub started_at: DateTime<Utc>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Version of the trajectory format
    pub version: String,

    /// Query that was researched
    pub task: Option<String>,

    pub success: Option<bool>,

    /// Number of recorded entries
    pub total_entries: usize,

    pub duration_ms: Option<u64>,
}

impl TrajectoryRecorder {
    /// Create an in-memory trajectory recorder
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            file_path: None,
            auto_save: false,
        }
    }

    /// Create a trajectory recorder that rewrites `path` after every entry
    pub fn with_file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            file_path: Some(path.as_ref().to_path_buf()),
            auto_save: true,
        }
    }

    /// Record a trajectory entry
    pub async fn record(&self, entry: TrajectoryEntry) -> Result<()> {
        self.entries.write().await.push(entry);

        if self.auto_save {
            self.save().await?;
        }

        Ok(())
    }

    /// Get all recorded entries
    pub async fn get_entries(&self) -> Vec<TrajectoryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Save the trajectory to file
    pub async fn save(&self) -> Result<()> {
        if let Some(path) = &self.file_path {
            let trajectory = self.build_trajectory().await;
            let json = serde_json::to_string_pretty(&trajectory).map_err(|e| {
                TrajectoryError::RecordingFailed {
                    message: format!("Failed to serialize trajectory: {}", e),
                }
            })?;

            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).await?;
                }
            }

            fs::write(path, json).await?;
        }

        Ok(())
    }

    /// Load a trajectory from file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Trajectory> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TrajectoryError::LoadFailed {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path).await?;
        let trajectory: Trajectory =
            serde_json::from_str(&content).map_err(|_| TrajectoryError::InvalidFormat)?;

        Ok(trajectory)
    }

    async fn build_trajectory(&self) -> Trajectory {
        let entries = self.entries.read().await.clone();

        let started_at = entries
            .first()
            .map(|e| e.timestamp)
            .unwrap_or_else(Utc::now);
        let completed_at = entries.last().map(|e| e.timestamp);
        let duration_ms = completed_at.map(|end| (end - started_at).num_milliseconds() as u64);

        let mut task = None;
        let mut success = None;
        for entry in &entries {
            match &entry.entry_type {
                EntryType::TaskStart { task: t, .. } => task = Some(t.clone()),
                EntryType::TaskComplete { success: s, .. } => success = Some(*s),
                _ => {}
            }
        }

        let metadata = TrajectoryMetadata {
            id: uuid::Uuid::new_v4().to_string(),
            started_at,
            completed_at,
            version: "1.0".to_string(),
            task,
            success,
            total_entries: entries.len(),
            duration_ms,
        };

        Trajectory { metadata, entries }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl Default for TrajectoryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmMessage;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_recorder_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("trajectory.json");
        let recorder = TrajectoryRecorder::with_file(&path);

        recorder
            .record(TrajectoryEntry::task_start(
                "What is Rust?".to_string(),
                json!({"variant": "simple"}),
            ))
            .await
            .unwrap();
        recorder
            .record(TrajectoryEntry::llm_response(
                LlmMessage::assistant("Rust is a language."),
                None,
                Some("stop".to_string()),
                1,
            ))
            .await
            .unwrap();
        recorder
            .record(TrajectoryEntry::task_complete(
                true,
                "Rust is a language.".to_string(),
                1,
                0,
                12,
            ))
            .await
            .unwrap();

        let loaded = TrajectoryRecorder::load(&path).await.unwrap();
        assert_eq!(loaded.entries.len(), 3);
        assert_eq!(loaded.metadata.task.as_deref(), Some("What is Rust?"));
        assert_eq!(loaded.metadata.success, Some(true));
        assert_eq!(loaded.metadata.total_entries, 3);
    }

    #[tokio::test]
    async fn test_memory_recorder_does_not_write() {
        let recorder = TrajectoryRecorder::new();
        recorder
            .record(TrajectoryEntry::error("boom".to_string(), None, 1))
            .await
            .unwrap();
        assert_eq!(recorder.entry_count().await, 1);
        assert!(recorder.file_path().is_none());

        recorder.clear().await;
        assert_eq!(recorder.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_load_missing_or_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(TrajectoryRecorder::load(&missing).await.is_err());

        let invalid = dir.path().join("bad.json");
        std::fs::write(&invalid, "{not json").unwrap();
        assert!(matches!(
            TrajectoryRecorder::load(&invalid).await,
            Err(crate::error::Error::Trajectory(TrajectoryError::InvalidFormat))
        ));
    }
}
