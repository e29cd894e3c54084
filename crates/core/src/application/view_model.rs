// Blur View Model - maps chain snapshots to the three-state UI model

use crate::application::repository::BluromaticRepository;
use crate::application::work_manager::EnqueueOutcome;
use crate::domain::{BlurAmount, BlurLevel, BlurUiState};
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct BlurViewModel {
    repository: Arc<dyn BluromaticRepository>,
    ui_state: watch::Receiver<BlurUiState>,
    blur_amount: Vec<BlurAmount>,
    mapper: JoinHandle<()>,
}

impl BlurViewModel {
    /// Must be called inside a tokio runtime (spawns the state mapper)
    pub fn new(repository: Arc<dyn BluromaticRepository>) -> Result<Self> {
        let mut snapshots = repository.output_work_info()?;
        let initial = BlurUiState::from_snapshot(&snapshots.borrow_and_update());
        let (tx, ui_state) = watch::channel(initial);

        let mapper = tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let state = BlurUiState::from_snapshot(&snapshots.borrow_and_update());
                tx.send_if_modified(|current| {
                    if *current == state {
                        return false;
                    }
                    debug!(?state, "UI state changed");
                    *current = state;
                    true
                });
            }
        });

        Ok(Self {
            repository,
            ui_state,
            blur_amount: BlurAmount::options(),
            mapper,
        })
    }

    /// Observable UI state
    pub fn blur_ui_state(&self) -> watch::Receiver<BlurUiState> {
        self.ui_state.clone()
    }

    pub fn current_state(&self) -> BlurUiState {
        self.ui_state.borrow().clone()
    }

    /// Selectable blur levels
    pub fn blur_amount(&self) -> &[BlurAmount] {
        &self.blur_amount
    }

    pub async fn apply_blur(&self, blur_level: BlurLevel) -> Result<EnqueueOutcome> {
        self.repository.apply_blur(blur_level).await
    }

    pub async fn cancel_work(&self) -> Result<()> {
        self.repository.cancel_work().await
    }

    /// Local path of the finished image, when the state is Complete
    pub fn open_result(&self) -> Result<Option<PathBuf>> {
        match self.current_state() {
            BlurUiState::Complete { output_uri } => {
                Ok(Some(self.repository.resolve_output(&output_uri)?))
            }
            BlurUiState::Default | BlurUiState::Loading => Ok(None),
        }
    }
}

impl Drop for BlurViewModel {
    fn drop(&mut self) {
        self.mapper.abort();
    }
}
