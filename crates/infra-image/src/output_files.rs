// Private output directory for intermediate blur results

use async_trait::async_trait;
use bluromatic_core::application::worker::constants::OUTPUT_PATH;
use bluromatic_core::domain::ImageLocator;
use bluromatic_core::port::{OutputFileStore, StorageError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `<files_dir>/blur_filter_outputs`, created on first write
pub struct PrivateOutputStore {
    dir: PathBuf,
}

impl PrivateOutputStore {
    pub fn new(files_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: files_dir.as_ref().join(OUTPUT_PATH),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl OutputFileStore for PrivateOutputStore {
    async fn write_temp(&self, file_name: &str, png: &[u8]) -> Result<ImageLocator, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, png).await?;
        debug!(path = %path.display(), bytes = png.len(), "Temp output written");
        Ok(ImageLocator::from_path(&path))
    }

    async fn purge(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut deleted = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".png") {
                continue;
            }
            // A stuck entry is left behind; the rest still get purged
            match remove_entry(&entry).await {
                Ok(()) => deleted.push(name),
                Err(e) => warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "Could not delete temp output"
                ),
            }
        }
        deleted.sort();
        Ok(deleted)
    }
}

/// Files are unlinked, empty directories removed
async fn remove_entry(entry: &tokio::fs::DirEntry) -> std::io::Result<()> {
    if entry.file_type().await?.is_dir() {
        tokio::fs::remove_dir(entry.path()).await
    } else {
        tokio::fs::remove_file(entry.path()).await
    }
}
