// UI State: three-state display model

use super::chain::{ChainSnapshot, ChainStatus};
use super::image::ImageLocator;

/// What the screen shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlurUiState {
    #[default]
    Default,
    Loading,
    Complete { output_uri: ImageLocator },
}

impl BlurUiState {
    /// Map a chain snapshot to the display state.
    ///
    /// Only a fully succeeded chain with a locator is Complete; failed and
    /// cancelled runs show Default.
    pub fn from_snapshot(snapshot: &ChainSnapshot) -> Self {
        match snapshot.status() {
            ChainStatus::Running => BlurUiState::Loading,
            ChainStatus::Succeeded {
                output: Some(output_uri),
            } => BlurUiState::Complete { output_uri },
            ChainStatus::Idle
            | ChainStatus::Succeeded { output: None }
            | ChainStatus::Failed
            | ChainStatus::Cancelled => BlurUiState::Default,
        }
    }
}
