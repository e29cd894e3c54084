// Save stage: publish the blurred image to shared storage

use super::constants::*;
use super::{Worker, WorkerEnv, WorkerParameters};
use crate::domain::work::KEY_IMAGE_URI;
use crate::domain::{ImageLocator, WorkData, WorkResult};
use crate::error::{AppError, Result};
use crate::port::{MediaStore, SaveImageRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct SaveImageToFileWorker {
    env: Arc<WorkerEnv>,
}

impl SaveImageToFileWorker {
    pub fn new(env: Arc<WorkerEnv>) -> Self {
        Self { env }
    }

    /// Store for the current platform branch
    fn store(&self) -> &Arc<dyn MediaStore> {
        if self.env.system_probe.api_level() >= ANDROID_Q_API_LEVEL {
            &self.env.media_store
        } else {
            &self.env.public_pictures
        }
    }

    async fn save(&self, source: &ImageLocator) -> Result<Option<ImageLocator>> {
        let bitmap = self.env.content_resolver.open_input(source).await?;

        let processor = Arc::clone(&self.env.image_processor);
        let png = tokio::task::spawn_blocking(move || processor.to_png(&bitmap))
            .await
            .map_err(|e| AppError::Internal(format!("encode task aborted: {e}")))??;

        let date_added = self.env.time_provider.now_millis();
        if let Some(at) = chrono::DateTime::from_timestamp_millis(date_added) {
            debug!(date_added = %at.format("%Y.%m.%d at %H:%M:%S %Z"), "Saving blurred image");
        }

        let request = SaveImageRequest {
            display_name: SAVED_IMAGE_TITLE.to_string(),
            mime_type: PNG_MIME_TYPE.to_string(),
            relative_path: PICTURES_RELATIVE_PATH.to_string(),
            date_added,
            png,
        };
        Ok(self.store().save_image(request).await?)
    }
}

#[async_trait]
impl Worker for SaveImageToFileWorker {
    fn name(&self) -> &'static str {
        SAVE_STAGE
    }

    async fn do_work(&self, params: WorkerParameters) -> WorkResult {
        let Some(resource_uri) = params.input.image_uri() else {
            error!(work_id = %params.id, "{}", INVALID_INPUT_URI);
            return WorkResult::Failure;
        };

        self.env.notifier.make_status_notification(SAVING_IMAGE);

        let mut cancellation = params.cancellation;
        if !cancellation.sleep(self.env.delay).await {
            info!(work_id = %params.id, "Save cancelled before it started");
            return WorkResult::Failure;
        }

        match self.save(&resource_uri).await {
            Ok(Some(image_url)) => {
                info!(
                    work_id = %params.id,
                    api_level = self.env.system_probe.api_level(),
                    output = %image_url,
                    "Image saved"
                );
                WorkResult::Success(WorkData::new().with(KEY_IMAGE_URI, image_url.as_str()))
            }
            Ok(None) => {
                error!(work_id = %params.id, "{}", WRITING_TO_MEDIA_STORE_FAILED);
                WorkResult::Failure
            }
            Err(e) => {
                error!(work_id = %params.id, error = %e, "{}", ERROR_SAVING_IMAGE);
                WorkResult::Failure
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::worker::test_support::{params, TestEnv, TestEnvBuilder, CUPCAKE};

    async fn run_save(api_level: u32) -> (WorkResult, TestEnv) {
        let t = TestEnvBuilder::new().api_level(api_level).build();
        let worker = SaveImageToFileWorker::new(t.env.clone());
        let (_tx, p) = params(WorkData::new().with(KEY_IMAGE_URI, CUPCAKE));
        let result = worker.do_work(p).await;
        (result, t)
    }

    #[tokio::test]
    async fn test_save_uses_media_store_at_q_and_above() {
        let (result, t) = run_save(ANDROID_Q_API_LEVEL).await;
        let uri = result.output().and_then(|o| o.image_uri()).unwrap();
        assert!(uri
            .as_str()
            .starts_with("content://media/external/images/media/"));
        assert_eq!(t.media_store.saved_count(), 1);
        assert_eq!(t.public_pictures.saved_count(), 0);
        assert_eq!(t.notifier.messages(), vec![SAVING_IMAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_save_uses_public_pictures_below_q() {
        let (result, t) = run_save(28).await;
        let uri = result.output().and_then(|o| o.image_uri()).unwrap();
        assert!(uri.as_str().starts_with("file:///mock/Pictures/SavedImages/"));
        assert!(uri.as_str().ends_with("Blurred Image.png"));
        assert_eq!(t.media_store.saved_count(), 0);
        assert_eq!(t.public_pictures.saved_count(), 1);
    }

    #[tokio::test]
    async fn test_save_declined_insert_is_failure() {
        let t = TestEnvBuilder::new().declining_media_store().build();
        let worker = SaveImageToFileWorker::new(t.env.clone());
        let (_tx, p) = params(WorkData::new().with(KEY_IMAGE_URI, CUPCAKE));
        assert_eq!(worker.do_work(p).await, WorkResult::Failure);
    }

    #[tokio::test]
    async fn test_save_unreadable_input_is_failure() {
        let t = TestEnvBuilder::new().build();
        let worker = SaveImageToFileWorker::new(t.env.clone());
        let (_tx, p) = params(WorkData::new().with(KEY_IMAGE_URI, "file:///missing.png"));
        assert_eq!(worker.do_work(p).await, WorkResult::Failure);
        assert_eq!(t.media_store.saved_count(), 0);
    }

    #[tokio::test]
    async fn test_save_without_input_fails_fast() {
        let t = TestEnvBuilder::new().build();
        let worker = SaveImageToFileWorker::new(t.env.clone());
        let (_tx, p) = params(WorkData::new());
        assert_eq!(worker.do_work(p).await, WorkResult::Failure);
        assert!(t.notifier.messages().is_empty());
    }
}
