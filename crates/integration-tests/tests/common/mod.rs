//! Shared harness: real image and storage adapters rooted in a tempdir

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bluromatic_core::application::{
    ExistingWorkPolicy, WorkManager, WorkManagerBluromaticRepository, WorkManagerConfig,
    WorkerEnv,
};
use bluromatic_core::domain::{ChainSnapshot, ImageLocator};
use bluromatic_core::port::id_provider::UuidProvider;
use bluromatic_core::port::time_provider::SystemTimeProvider;
use bluromatic_core::port::SystemProbe;
use bluromatic_infra_image::{
    IndexedMediaStore, LocalContentResolver, PngImageProcessor, PrivateOutputStore,
    PublicPicturesStore,
};
use bluromatic_infra_system::{StatusNotifier, SystemProbeImpl};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;
use tokio::sync::watch;

pub const PACKAGE: &str = "com.example.bluromatic";
pub const FINISH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Harness {
    pub root: TempDir,
    pub notifier: Arc<StatusNotifier>,
    pub work_manager: Arc<WorkManager>,
    pub repository: WorkManagerBluromaticRepository,
}

pub struct HarnessBuilder {
    api_level: u32,
    delay: Duration,
    image_size: u32,
    policy: ExistingWorkPolicy,
    probe: Option<Arc<dyn SystemProbe>>,
    min_free_storage_mb: u64,
}

impl HarnessBuilder {
    pub fn new(api_level: u32) -> Self {
        Self {
            api_level,
            delay: Duration::ZERO,
            image_size: 120,
            policy: ExistingWorkPolicy::Replace,
            probe: None,
            min_free_storage_mb: 0,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Side length of the square input image
    pub fn image_size(mut self, size: u32) -> Self {
        self.image_size = size;
        self
    }

    pub fn policy(mut self, policy: ExistingWorkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn probe(mut self, probe: Arc<dyn SystemProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn min_free_storage_mb(mut self, mb: u64) -> Self {
        self.min_free_storage_mb = mb;
        self
    }

    pub fn build(self) -> Harness {
        let root = tempfile::tempdir().unwrap();
        let base = root.path();
        write_input_image(&base.join("res/drawable/android_cupcake.png"), self.image_size);

        let media_store = Arc::new(IndexedMediaStore::new(base.join("media")));
        let probe: Arc<dyn SystemProbe> = match self.probe {
            Some(probe) => probe,
            None => Arc::new(SystemProbeImpl::new(base.join("files"), self.api_level)),
        };
        let notifier = Arc::new(StatusNotifier::new(true).with_terminal_echo(false));

        let env = Arc::new(WorkerEnv {
            content_resolver: Arc::new(LocalContentResolver::new(
                base.join("res"),
                PACKAGE.to_string(),
                media_store.clone(),
            )),
            image_processor: Arc::new(PngImageProcessor::new()),
            output_store: Arc::new(PrivateOutputStore::new(base.join("files"))),
            media_store,
            public_pictures: Arc::new(PublicPicturesStore::new(base.join("Pictures"))),
            notifier: notifier.clone(),
            system_probe: probe.clone(),
            id_provider: Arc::new(UuidProvider),
            time_provider: Arc::new(SystemTimeProvider),
            delay: self.delay,
        });

        let work_manager = Arc::new(WorkManager::new(
            probe,
            Arc::new(UuidProvider),
            WorkManagerConfig {
                constraint_poll_interval: Duration::from_millis(10),
                min_free_storage_mb: self.min_free_storage_mb,
            },
        ));
        let image_uri =
            ImageLocator::parse(format!("android.resource://{PACKAGE}/drawable/android_cupcake"))
                .unwrap();
        let repository =
            WorkManagerBluromaticRepository::new(work_manager.clone(), env, image_uri)
                .with_policy(self.policy);

        Harness {
            root,
            notifier,
            work_manager,
            repository,
        }
    }
}

impl Harness {
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// PNG files saved through the media store
    pub fn media_images(&self) -> Vec<PathBuf> {
        list_png(&self.path("media/Pictures"))
    }

    /// PNG files left in the private output dir
    pub fn temp_outputs(&self) -> Vec<PathBuf> {
        list_png(&self.path("files/blur_filter_outputs"))
    }
}

/// Wait until run `run` is finished
pub async fn finished(rx: &mut watch::Receiver<ChainSnapshot>, run: u64) -> ChainSnapshot {
    tokio::time::timeout(
        FINISH_TIMEOUT,
        rx.wait_for(|s| s.run == run && s.status().is_finished()),
    )
    .await
    .expect("chain did not finish in time")
    .expect("work manager dropped")
    .clone()
}

pub fn write_input_image(path: &Path, size: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbaImage::from_fn(size, size, |x, y| {
        if (x / 10 + y / 10) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    });
    img.save(path).unwrap();
}

pub fn list_png(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect(),
        Err(_) => Vec::new(),
    }
}
