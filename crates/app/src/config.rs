// Layered configuration
// defaults -> <config_dir>/bluromatic.toml -> --config file -> BLUROMATIC_* env

use anyhow::{Context, Result};
use bluromatic_core::application::worker::constants::{
    ANDROID_Q_API_LEVEL, DEFAULT_MIN_FREE_STORAGE_MB, DELAY_TIME_MILLIS,
};
use bluromatic_core::application::WorkManagerConfig;
use ::config::{Config, Environment, File};
use directories::{ProjectDirs, UserDirs};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "bluromatic.toml";
pub const ENV_PREFIX: &str = "BLUROMATIC";
pub const DEFAULT_PACKAGE_NAME: &str = "com.example.bluromatic";
const FALLBACK_HOME: &str = "~/.bluromatic";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// App-private files; blur outputs go to `<files_dir>/blur_filter_outputs`
    pub files_dir: PathBuf,
    /// Public pictures directory (saves below API 29)
    pub pictures_dir: PathBuf,
    /// Media store root (saves at API 29+)
    pub media_dir: PathBuf,
    /// Bundled resources (`<resources_dir>/drawable/...`)
    pub resources_dir: PathBuf,
    pub api_level: u32,
    pub delay_ms: u64,
    pub notifications_enabled: bool,
    pub storage_permission_granted: bool,
    pub min_free_storage_mb: u64,
    pub package_name: String,
}

/// Platform default locations
struct DefaultDirs {
    files: PathBuf,
    pictures: PathBuf,
    media: PathBuf,
    resources: PathBuf,
    config_file: Option<PathBuf>,
}

impl DefaultDirs {
    fn detect() -> Self {
        let (data, config_file) = match ProjectDirs::from("com", "example", "bluromatic") {
            Some(dirs) => (
                dirs.data_dir().to_path_buf(),
                Some(dirs.config_dir().join(CONFIG_FILE_NAME)),
            ),
            None => (PathBuf::from(FALLBACK_HOME), None),
        };
        let pictures = UserDirs::new()
            .and_then(|u| u.picture_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| data.join("Pictures"));

        Self::rooted_at(&data, pictures, config_file)
    }

    fn rooted_at(data: &Path, pictures: PathBuf, config_file: Option<PathBuf>) -> Self {
        Self {
            files: data.join("files"),
            pictures,
            media: data.join("media"),
            resources: data.join("res"),
            config_file,
        }
    }
}

impl AppConfig {
    /// Load with platform defaults, the user config file, `explicit` and env
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(&DefaultDirs::detect(), explicit, true)
    }

    fn load_with(defaults: &DefaultDirs, explicit: Option<&Path>, use_env: bool) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("files_dir", path_str(&defaults.files))?
            .set_default("pictures_dir", path_str(&defaults.pictures))?
            .set_default("media_dir", path_str(&defaults.media))?
            .set_default("resources_dir", path_str(&defaults.resources))?
            .set_default("api_level", i64::from(ANDROID_Q_API_LEVEL))?
            .set_default("delay_ms", DELAY_TIME_MILLIS as i64)?
            .set_default("notifications_enabled", true)?
            .set_default("storage_permission_granted", true)?
            .set_default("min_free_storage_mb", DEFAULT_MIN_FREE_STORAGE_MB as i64)?
            .set_default("package_name", DEFAULT_PACKAGE_NAME)?;

        if let Some(user_file) = &defaults.config_file {
            builder = builder.add_source(File::from(user_file.as_path()).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }
        if use_env {
            builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        }

        let mut config: AppConfig = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.expand_paths();
        Ok(config)
    }

    fn expand_paths(&mut self) {
        for path in [
            &mut self.files_dir,
            &mut self.pictures_dir,
            &mut self.media_dir,
            &mut self.resources_dir,
        ] {
            *path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn work_manager_config(&self) -> WorkManagerConfig {
        WorkManagerConfig {
            min_free_storage_mb: self.min_free_storage_mb,
            ..WorkManagerConfig::default()
        }
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
