// Bluromatic Repository - builds the blur chain and exposes its status

use crate::application::work_manager::{
    Constraints, EnqueueOutcome, ExistingWorkPolicy, WorkManager, WorkRequest,
};
use crate::application::worker::constants::{IMAGE_MANIPULATION_WORK_NAME, TAG_OUTPUT};
use crate::application::worker::{BlurWorker, CleanupWorker, SaveImageToFileWorker, WorkerEnv};
use crate::domain::{BlurLevel, ChainSnapshot, ImageLocator, WorkData};
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Data layer used by the view model
#[async_trait]
pub trait BluromaticRepository: Send + Sync {
    /// Snapshots of the image manipulation chain
    fn output_work_info(&self) -> Result<watch::Receiver<ChainSnapshot>>;

    /// Enqueue blur -> save -> cleanup for `blur_level`
    async fn apply_blur(&self, blur_level: BlurLevel) -> Result<EnqueueOutcome>;

    /// Cancel the running chain, if any
    async fn cancel_work(&self) -> Result<()>;

    /// Local path of a result locator, for viewing
    fn resolve_output(&self, locator: &ImageLocator) -> Result<PathBuf>;
}

/// Repository backed by the in-process WorkManager
pub struct WorkManagerBluromaticRepository {
    work_manager: Arc<WorkManager>,
    env: Arc<WorkerEnv>,
    image_uri: ImageLocator,
    policy: ExistingWorkPolicy,
}

impl WorkManagerBluromaticRepository {
    /// `image_uri` is the bundled input image
    pub fn new(
        work_manager: Arc<WorkManager>,
        env: Arc<WorkerEnv>,
        image_uri: ImageLocator,
    ) -> Self {
        Self {
            work_manager,
            env,
            image_uri,
            policy: ExistingWorkPolicy::Replace,
        }
    }

    pub fn with_policy(mut self, policy: ExistingWorkPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl BluromaticRepository for WorkManagerBluromaticRepository {
    fn output_work_info(&self) -> Result<watch::Receiver<ChainSnapshot>> {
        self.work_manager.observe(IMAGE_MANIPULATION_WORK_NAME)
    }

    async fn apply_blur(&self, blur_level: BlurLevel) -> Result<EnqueueOutcome> {
        let blur = WorkRequest::new(Arc::new(BlurWorker::new(Arc::clone(&self.env))))
            .with_input(WorkData::for_blur(&self.image_uri, blur_level));

        let save = WorkRequest::new(Arc::new(SaveImageToFileWorker::new(Arc::clone(&self.env))))
            .with_constraints(Constraints {
                requires_storage_not_low: true,
            })
            .add_tag(TAG_OUTPUT);

        let cleanup = WorkRequest::new(Arc::new(CleanupWorker::new(Arc::clone(&self.env))));

        let outcome = self
            .work_manager
            .begin_unique_work(IMAGE_MANIPULATION_WORK_NAME, self.policy, blur)
            .then(save)
            .then(cleanup)
            .enqueue()
            .await?;

        info!(
            blur_level = %blur_level,
            input = %self.image_uri,
            run = outcome.run(),
            "Blur chain requested"
        );
        Ok(outcome)
    }

    async fn cancel_work(&self) -> Result<()> {
        self.work_manager
            .cancel_unique_work(IMAGE_MANIPULATION_WORK_NAME)
            .await
    }

    fn resolve_output(&self, locator: &ImageLocator) -> Result<PathBuf> {
        Ok(self.env.content_resolver.local_path(locator)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;
    use crate::application::work_manager::WorkManagerConfig;
    use crate::application::worker::constants::*;
    use crate::application::worker::test_support::{TestEnv, TestEnvBuilder, CUPCAKE};
    use crate::domain::{ChainStatus, WorkState};
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use std::time::Duration;
    use tokio::time::timeout;

    fn repository(t: &TestEnv) -> (Arc<WorkManager>, WorkManagerBluromaticRepository) {
        let wm = Arc::new(WorkManager::new(
            t.probe.clone(),
            Arc::new(SequentialIdProvider::new("req")),
            WorkManagerConfig {
                constraint_poll_interval: Duration::from_millis(10),
                min_free_storage_mb: 64,
            },
        ));
        let repo = WorkManagerBluromaticRepository::new(
            wm.clone(),
            t.env.clone(),
            ImageLocator::parse(CUPCAKE).unwrap(),
        );
        (wm, repo)
    }

    #[tokio::test]
    async fn test_chain_order_and_output() {
        let t = TestEnvBuilder::new().build();
        let (wm, repo) = repository(&t);

        let outcome = repo.apply_blur(BlurLevel::new(3).unwrap()).await.unwrap();
        let snap = timeout(
            Duration::from_secs(5),
            wm.wait_for_run(IMAGE_MANIPULATION_WORK_NAME, outcome.run()),
        )
        .await
        .unwrap()
        .unwrap();

        let names: Vec<&str> = snap.stages.iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(names, vec![BLUR_STAGE, SAVE_STAGE, CLEANUP_STAGE]);

        match snap.status() {
            ChainStatus::Succeeded { output: Some(uri) } => {
                assert!(uri
                    .as_str()
                    .starts_with("content://media/external/images/media/"));
            }
            other => panic!("unexpected status {other:?}"),
        }

        // Cleanup removed the intermediate blur output
        assert!(t.output_store.temp_files().is_empty());
        assert_eq!(
            t.notifier.messages(),
            vec![BLURRING_IMAGE, SAVING_IMAGE, CLEANING_UP_FILES]
        );

        let tagged = wm.work_infos_by_tag(TAG_OUTPUT).unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].stage, SAVE_STAGE);
    }

    #[tokio::test]
    async fn test_blur_failure_prevents_save() {
        let t = TestEnvBuilder::new()
            .processor(crate::port::image_processor::mocks::MockImageProcessor::new_fail("bad"))
            .build();
        let (wm, repo) = repository(&t);

        let outcome = repo.apply_blur(BlurLevel::default()).await.unwrap();
        let snap = wm
            .wait_for_run(IMAGE_MANIPULATION_WORK_NAME, outcome.run())
            .await
            .unwrap();

        assert_eq!(snap.status(), ChainStatus::Failed);
        assert!(snap.stages.iter().all(|s| s.state == WorkState::Failed));
        assert_eq!(t.media_store.saved_count(), 0);
        assert_eq!(t.notifier.messages(), vec![BLURRING_IMAGE]);
    }

    #[tokio::test]
    async fn test_cancel_work() {
        let t = TestEnvBuilder::new().delay(Duration::from_secs(30)).build();
        let (wm, repo) = repository(&t);

        repo.apply_blur(BlurLevel::default()).await.unwrap();
        repo.cancel_work().await.unwrap();

        let snap = wm.snapshot(IMAGE_MANIPULATION_WORK_NAME).unwrap();
        assert_eq!(snap.status(), ChainStatus::Cancelled);
        assert_eq!(t.media_store.saved_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_output() {
        let t = TestEnvBuilder::new().build();
        let (_wm, repo) = repository(&t);

        let path = repo
            .resolve_output(&ImageLocator::parse(CUPCAKE).unwrap())
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("com.example.bluromatic/drawable/android_cupcake")
        );

        let missing = ImageLocator::parse("file:///nothing.png").unwrap();
        assert_err!(repo.resolve_output(&missing));
    }
}
