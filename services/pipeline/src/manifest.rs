//! Run manifest written to `pipeline_run.json` after every run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// Record of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub scene: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// File names published by this run.
    #[serde(default)]
    pub artifacts: Vec<String>,
}

impl RunManifest {
    pub fn succeeded(
        run_id: Uuid,
        scene: impl Into<String>,
        started_at: DateTime<Utc>,
        artifacts: Vec<String>,
    ) -> Self {
        Self {
            run_id,
            scene: scene.into(),
            started_at,
            finished_at: Utc::now(),
            status: RunStatus::Succeeded,
            error: None,
            artifacts,
        }
    }

    pub fn failed(
        run_id: Uuid,
        scene: impl Into<String>,
        started_at: DateTime<Utc>,
        error: &anyhow::Error,
    ) -> Self {
        Self {
            run_id,
            scene: scene.into(),
            started_at,
            finished_at: Utc::now(),
            status: RunStatus::Failed,
            error: Some(format!("{:#}", error)),
            artifacts: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Succeeded
    }
}
