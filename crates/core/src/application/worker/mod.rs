// Worker - background stage units (blur, save, cleanup)

mod blur;
mod cancellation;
mod cleanup;
pub mod constants;
mod save_image;

pub use blur::BlurWorker;
pub use cancellation::{cancellation_channel, CancellationSender, CancellationToken};
pub use cleanup::CleanupWorker;
pub use save_image::SaveImageToFileWorker;

use crate::domain::{WorkData, WorkId, WorkResult};
use crate::port::{
    ContentResolver, IdProvider, ImageProcessor, MediaStore, Notifier, OutputFileStore,
    SystemProbe, TimeProvider,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// What a stage receives when it is started
pub struct WorkerParameters {
    pub id: WorkId,
    pub input: WorkData,
    pub cancellation: CancellationToken,
}

/// One background stage
///
/// Implementations never return errors: every failure is logged and
/// reported as `WorkResult::Failure`.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Stage name shown in work infos and logs
    fn name(&self) -> &'static str;

    async fn do_work(&self, params: WorkerParameters) -> WorkResult;
}

/// Platform services shared by all workers
pub struct WorkerEnv {
    pub content_resolver: Arc<dyn ContentResolver>,
    pub image_processor: Arc<dyn ImageProcessor>,
    pub output_store: Arc<dyn OutputFileStore>,
    /// Used at or above the Q API level
    pub media_store: Arc<dyn MediaStore>,
    /// Used below the Q API level
    pub public_pictures: Arc<dyn MediaStore>,
    pub notifier: Arc<dyn Notifier>,
    pub system_probe: Arc<dyn SystemProbe>,
    pub id_provider: Arc<dyn IdProvider>,
    pub time_provider: Arc<dyn TimeProvider>,
    /// Simulated work duration
    pub delay: Duration,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::port::content_resolver::mocks::{
        shared_blobs, InMemoryContentResolver, SharedBlobs,
    };
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::image_processor::mocks::MockImageProcessor;
    use crate::port::media_store::mocks::InMemoryMediaStore;
    use crate::port::notifier::mocks::RecordingNotifier;
    use crate::port::output_store::mocks::InMemoryOutputStore;
    use crate::port::system_probe::mocks::MockSystemProbe;
    use crate::port::time_provider::mocks::FixedTimeProvider;

    pub const CUPCAKE: &str = "android.resource://com.example.bluromatic/drawable/android_cupcake";

    /// Mock-backed environment with handles for assertions
    pub struct TestEnv {
        pub blobs: SharedBlobs,
        pub notifier: Arc<RecordingNotifier>,
        pub processor: Arc<MockImageProcessor>,
        pub probe: Arc<MockSystemProbe>,
        pub output_store: Arc<InMemoryOutputStore>,
        pub media_store: Arc<InMemoryMediaStore>,
        pub public_pictures: Arc<InMemoryMediaStore>,
        pub env: Arc<WorkerEnv>,
    }

    pub struct TestEnvBuilder {
        api_level: u32,
        processor: MockImageProcessor,
        delay: Duration,
        declining_media_store: bool,
        failing_purge: bool,
    }

    impl TestEnvBuilder {
        pub fn new() -> Self {
            Self {
                api_level: 33,
                processor: MockImageProcessor::new_success(),
                delay: Duration::ZERO,
                declining_media_store: false,
                failing_purge: false,
            }
        }

        pub fn api_level(mut self, level: u32) -> Self {
            self.api_level = level;
            self
        }

        pub fn processor(mut self, processor: MockImageProcessor) -> Self {
            self.processor = processor;
            self
        }

        pub fn delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn declining_media_store(mut self) -> Self {
            self.declining_media_store = true;
            self
        }

        pub fn failing_purge(mut self) -> Self {
            self.failing_purge = true;
            self
        }

        pub fn build(self) -> TestEnv {
            let blobs = shared_blobs();
            let resolver = InMemoryContentResolver::new(blobs.clone());
            resolver.insert(CUPCAKE, b"cupcake".to_vec());

            let notifier = Arc::new(RecordingNotifier::new());
            let processor = Arc::new(self.processor);
            let probe = Arc::new(MockSystemProbe::new(self.api_level));
            let output_store = Arc::new(if self.failing_purge {
                InMemoryOutputStore::failing_purge(blobs.clone())
            } else {
                InMemoryOutputStore::new(blobs.clone())
            });
            let media_store = Arc::new(if self.declining_media_store {
                InMemoryMediaStore::declining(blobs.clone())
            } else {
                InMemoryMediaStore::indexed(blobs.clone())
            });
            let public_pictures = Arc::new(InMemoryMediaStore::public_pictures(blobs.clone()));

            let env = Arc::new(WorkerEnv {
                content_resolver: Arc::new(resolver),
                image_processor: processor.clone(),
                output_store: output_store.clone(),
                media_store: media_store.clone(),
                public_pictures: public_pictures.clone(),
                notifier: notifier.clone(),
                system_probe: probe.clone(),
                id_provider: Arc::new(SequentialIdProvider::new("id")),
                time_provider: Arc::new(FixedTimeProvider(1_700_000_000_000)),
                delay: self.delay,
            });

            TestEnv {
                blobs,
                notifier,
                processor,
                probe,
                output_store,
                media_store,
                public_pictures,
                env,
            }
        }
    }

    pub fn params(input: WorkData) -> (CancellationSender, WorkerParameters) {
        let (tx, token) = cancellation_channel();
        (
            tx,
            WorkerParameters {
                id: "test-work".to_string(),
                input,
                cancellation: token,
            },
        )
    }
}
