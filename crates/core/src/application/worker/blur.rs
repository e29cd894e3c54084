// Blur stage: load the input image, blur it, write it to the private output dir

use super::constants::*;
use super::{Worker, WorkerEnv, WorkerParameters};
use crate::domain::work::KEY_IMAGE_URI;
use crate::domain::{BlurLevel, ImageLocator, WorkData, WorkResult};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

pub struct BlurWorker {
    env: Arc<WorkerEnv>,
}

impl BlurWorker {
    pub fn new(env: Arc<WorkerEnv>) -> Self {
        Self { env }
    }

    async fn apply_blur(&self, source: &ImageLocator, level: BlurLevel) -> Result<ImageLocator> {
        let picture = self.env.content_resolver.open_input(source).await?;

        // Decode + resample + encode is CPU bound
        let processor = Arc::clone(&self.env.image_processor);
        let output = tokio::task::spawn_blocking(move || processor.blur(&picture, level))
            .await
            .map_err(|e| AppError::Internal(format!("blur task aborted: {e}")))??;

        let file_name = format!(
            "{}{}.png",
            OUTPUT_FILE_PREFIX,
            self.env.id_provider.generate_id()
        );
        Ok(self.env.output_store.write_temp(&file_name, &output).await?)
    }
}

#[async_trait]
impl Worker for BlurWorker {
    fn name(&self) -> &'static str {
        BLUR_STAGE
    }

    async fn do_work(&self, params: WorkerParameters) -> WorkResult {
        let Some(resource_uri) = params.input.image_uri() else {
            error!(work_id = %params.id, "{}", INVALID_INPUT_URI);
            return WorkResult::Failure;
        };
        let blur_level = match params.input.blur_level() {
            Ok(level) => level,
            Err(e) => {
                error!(work_id = %params.id, error = %e, "Invalid blur level");
                return WorkResult::Failure;
            }
        };

        self.env.notifier.make_status_notification(BLURRING_IMAGE);

        let mut cancellation = params.cancellation;
        if !cancellation.sleep(self.env.delay).await {
            info!(work_id = %params.id, "Blur cancelled before it started");
            return WorkResult::Failure;
        }

        match self.apply_blur(&resource_uri, blur_level).await {
            Ok(output_uri) => {
                info!(
                    work_id = %params.id,
                    input = %resource_uri,
                    output = %output_uri,
                    blur_level = %blur_level,
                    "Blur applied"
                );
                WorkResult::Success(WorkData::new().with(KEY_IMAGE_URI, output_uri.as_str()))
            }
            Err(e) => {
                error!(work_id = %params.id, error = %e, "{}", ERROR_APPLYING_BLUR);
                WorkResult::Failure
            }
        }
    }
}
