// Local content resolver
//
// file://<abs path>                               -> that path
// android.resource://<package>/<type>/<name>      -> <resources_dir>/<type>/<name>[.png]
// content://media/external/images/media/<id>      -> media store file

use crate::media_store::IndexedMediaStore;
use async_trait::async_trait;
use bluromatic_core::domain::{ImageLocator, LocatorScheme};
use bluromatic_core::port::{ContentResolver, StorageError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct LocalContentResolver {
    resources_dir: PathBuf,
    package_name: String,
    media_store: Arc<IndexedMediaStore>,
}

impl LocalContentResolver {
    pub fn new(
        resources_dir: impl AsRef<Path>,
        package_name: impl Into<String>,
        media_store: Arc<IndexedMediaStore>,
    ) -> Self {
        Self {
            resources_dir: resources_dir.as_ref().to_path_buf(),
            package_name: package_name.into(),
            media_store,
        }
    }

    fn resource_path(&self, locator: &ImageLocator) -> Result<PathBuf, StorageError> {
        let not_found = || StorageError::NotFound(locator.to_string());

        let mut parts = locator.path_part().splitn(3, '/');
        let (Some(package), Some(kind), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(not_found());
        };
        if package != self.package_name || !is_plain_segment(kind) || !is_plain_segment(name) {
            return Err(not_found());
        }

        let mut path = self.resources_dir.join(kind).join(name);
        if path.extension().is_none() {
            path.set_extension("png");
        }
        Ok(path)
    }
}

/// A single non-empty path component with no traversal
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && !segment.contains("..")
        && !segment.contains(['/', '\\'])
}

#[async_trait]
impl ContentResolver for LocalContentResolver {
    async fn open_input(&self, locator: &ImageLocator) -> Result<Vec<u8>, StorageError> {
        let path = self.local_path(locator)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(locator.to_string()),
            _ => StorageError::Io(e),
        })
    }

    fn local_path(&self, locator: &ImageLocator) -> Result<PathBuf, StorageError> {
        let path = match locator.scheme() {
            LocatorScheme::File => PathBuf::from(locator.path_part()),
            LocatorScheme::Resource => self.resource_path(locator)?,
            LocatorScheme::Content => {
                let id = IndexedMediaStore::parse_id(locator)?;
                self.media_store.path_for(id)?
            }
            LocatorScheme::Other(scheme) => return Err(StorageError::UnsupportedScheme(scheme)),
        };
        if !path.exists() {
            return Err(StorageError::NotFound(locator.to_string()));
        }
        Ok(path)
    }
}
