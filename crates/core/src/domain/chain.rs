// Chain Domain Model: aggregate status of one unique work chain

use serde::{Deserialize, Serialize};

use super::image::ImageLocator;
use super::work::{WorkInfo, WorkState};

/// Aggregate status of a chain run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainStatus {
    /// Nothing has been enqueued under this name yet
    Idle,
    Running,
    Succeeded { output: Option<ImageLocator> },
    Failed,
    Cancelled,
}

impl ChainStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            ChainStatus::Succeeded { .. } | ChainStatus::Failed | ChainStatus::Cancelled
        )
    }
}

/// Snapshot of a named chain, published on every stage transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub name: String,
    /// Incremented every time a new chain is enqueued under `name`
    pub run: u64,
    pub stages: Vec<WorkInfo>,
}

impl ChainSnapshot {
    pub fn idle(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run: 0,
            stages: Vec::new(),
        }
    }

    /// Derive the aggregate status from the stage states
    pub fn status(&self) -> ChainStatus {
        if self.stages.is_empty() {
            return ChainStatus::Idle;
        }
        if self.stages.iter().any(|s| s.state == WorkState::Cancelled) {
            return ChainStatus::Cancelled;
        }
        if self.stages.iter().any(|s| s.state == WorkState::Failed) {
            return ChainStatus::Failed;
        }
        if self.stages.iter().all(|s| s.state == WorkState::Succeeded) {
            return ChainStatus::Succeeded {
                output: self.output_locator(),
            };
        }
        ChainStatus::Running
    }

    /// Last image locator produced by a succeeded stage
    pub fn output_locator(&self) -> Option<ImageLocator> {
        self.stages
            .iter()
            .rev()
            .filter(|s| s.state == WorkState::Succeeded)
            .find_map(|s| s.output.image_uri())
    }
}
