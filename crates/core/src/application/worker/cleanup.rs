// Cleanup stage: delete temporary blur outputs

use super::constants::*;
use super::{Worker, WorkerEnv, WorkerParameters};
use crate::domain::WorkResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

pub struct CleanupWorker {
    env: Arc<WorkerEnv>,
}

impl CleanupWorker {
    pub fn new(env: Arc<WorkerEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Worker for CleanupWorker {
    fn name(&self) -> &'static str {
        CLEANUP_STAGE
    }

    async fn do_work(&self, params: WorkerParameters) -> WorkResult {
        self.env.notifier.make_status_notification(CLEANING_UP_FILES);

        let mut cancellation = params.cancellation;
        if !cancellation.sleep(self.env.delay).await {
            info!(work_id = %params.id, "Cleanup cancelled before it started");
            return WorkResult::Failure;
        }

        match self.env.output_store.purge().await {
            Ok(deleted) => {
                for name in &deleted {
                    info!(work_id = %params.id, file = %name, "Old file deleted");
                }
                WorkResult::success()
            }
            Err(e) => {
                error!(work_id = %params.id, error = %e, "Cleanup failed");
                WorkResult::Failure
            }
        }
    }
}
