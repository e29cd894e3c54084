// Composition root: wires adapters into the core

use crate::config::AppConfig;
use anyhow::{Context, Result};
use bluromatic_core::application::{WorkManager, WorkManagerBluromaticRepository, WorkerEnv};
use bluromatic_core::domain::ImageLocator;
use bluromatic_core::port::id_provider::UuidProvider;
use bluromatic_core::port::time_provider::SystemTimeProvider;
use bluromatic_core::port::{IdProvider, SystemProbe};
use bluromatic_infra_image::{
    IndexedMediaStore, LocalContentResolver, PngImageProcessor, PrivateOutputStore,
    PublicPicturesStore,
};
use bluromatic_infra_system::{StatusNotifier, SystemProbeImpl};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Name of the bundled input image (drawable resource)
pub const BUNDLED_IMAGE_NAME: &str = "android_cupcake";
const BUNDLED_IMAGE_PNG: &[u8] = include_bytes!("../assets/android_cupcake.png");

pub struct AppContainer {
    pub config: AppConfig,
    pub env: Arc<WorkerEnv>,
    pub repository: Arc<WorkManagerBluromaticRepository>,
}

impl AppContainer {
    pub fn build(config: AppConfig) -> Result<Self> {
        install_bundled_image(&config)?;

        let media_store = Arc::new(IndexedMediaStore::new(&config.media_dir));
        let content_resolver = Arc::new(LocalContentResolver::new(
            &config.resources_dir,
            config.package_name.clone(),
            media_store.clone(),
        ));
        let system_probe: Arc<dyn SystemProbe> =
            Arc::new(SystemProbeImpl::new(&config.files_dir, config.api_level));
        let id_provider: Arc<dyn IdProvider> = Arc::new(UuidProvider);

        let env = Arc::new(WorkerEnv {
            content_resolver,
            image_processor: Arc::new(PngImageProcessor::new()),
            output_store: Arc::new(PrivateOutputStore::new(&config.files_dir)),
            media_store,
            public_pictures: Arc::new(PublicPicturesStore::new(&config.pictures_dir)),
            notifier: Arc::new(StatusNotifier::new(config.notifications_enabled)),
            system_probe: system_probe.clone(),
            id_provider: id_provider.clone(),
            time_provider: Arc::new(SystemTimeProvider),
            delay: config.delay(),
        });

        let work_manager = Arc::new(WorkManager::new(
            system_probe,
            id_provider,
            config.work_manager_config(),
        ));

        let image_uri = ImageLocator::parse(format!(
            "{}{}/drawable/{}",
            ImageLocator::RESOURCE_PREFIX,
            config.package_name,
            BUNDLED_IMAGE_NAME
        ))?;
        let repository = Arc::new(WorkManagerBluromaticRepository::new(
            work_manager,
            env.clone(),
            image_uri,
        ));

        info!(
            api_level = config.api_level,
            files_dir = %config.files_dir.display(),
            "Components wired"
        );

        Ok(Self {
            config,
            env,
            repository,
        })
    }
}

/// Write the bundled image into the resources dir unless already there
fn install_bundled_image(config: &AppConfig) -> Result<PathBuf> {
    let dir = config.resources_dir.join("drawable");
    let path = dir.join(format!("{BUNDLED_IMAGE_NAME}.png"));
    if !path.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        std::fs::write(&path, BUNDLED_IMAGE_PNG)
            .with_context(|| format!("Failed to install {}", path.display()))?;
        info!(path = %path.display(), "Bundled image installed");
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluromatic_core::application::BluromaticRepository;
    use bluromatic_core::domain::{BlurLevel, ChainStatus};
    use std::time::Duration;

    fn config(root: &std::path::Path, api_level: u32) -> AppConfig {
        AppConfig {
            files_dir: root.join("files"),
            pictures_dir: root.join("Pictures"),
            media_dir: root.join("media"),
            resources_dir: root.join("res"),
            api_level,
            delay_ms: 0,
            notifications_enabled: false,
            storage_permission_granted: true,
            min_free_storage_mb: 0,
            package_name: "com.example.bluromatic".to_string(),
        }
    }

    #[test]
    fn test_bundled_image_installed_once() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path(), 33);
        let path = install_bundled_image(&cfg).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), BUNDLED_IMAGE_PNG);

        std::fs::write(&path, b"user replaced").unwrap();
        install_bundled_image(&cfg).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"user replaced");
    }

    #[tokio::test]
    async fn test_wired_chain_saves_bundled_image() {
        let tmp = tempfile::tempdir().unwrap();
        let container = AppContainer::build(config(tmp.path(), 33)).unwrap();

        let mut rx = container.repository.output_work_info().unwrap();
        container
            .repository
            .apply_blur(BlurLevel::new(2).unwrap())
            .await
            .unwrap();
        let status = tokio::time::timeout(
            Duration::from_secs(30),
            rx.wait_for(|s| s.status().is_finished()),
        )
        .await
        .unwrap()
        .unwrap()
        .status();

        let ChainStatus::Succeeded { output: Some(uri) } = status else {
            panic!("unexpected status {status:?}");
        };
        let path = container.repository.resolve_output(&uri).unwrap();
        assert!(path.starts_with(tmp.path().join("media")));
    }
}
