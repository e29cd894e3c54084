// Indexed media store
//
// Files live under `<media_dir>/<relative_path>/`; a JSON index maps the
// numeric ids behind `content://media/external/images/media/<id>` to them.

use crate::MEDIA_CONTENT_PREFIX;
use async_trait::async_trait;
use bluromatic_core::domain::ImageLocator;
use bluromatic_core::port::{MediaStore, SaveImageRequest, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

const MEDIA_INDEX_FILE: &str = "media_index.json";

/// One inserted image
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MediaEntry {
    display_name: String,
    mime_type: String,
    relative_path: String,
    date_added: i64,
    /// Path relative to the media dir
    file: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MediaIndex {
    next_id: u64,
    entries: BTreeMap<u64, MediaEntry>,
}

pub struct IndexedMediaStore {
    media_dir: PathBuf,
    /// Serializes read-modify-write of the index
    write_lock: Mutex<()>,
}

impl IndexedMediaStore {
    pub fn new(media_dir: impl AsRef<Path>) -> Self {
        Self {
            media_dir: media_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn index_path(&self) -> PathBuf {
        self.media_dir.join(MEDIA_INDEX_FILE)
    }

    /// Blocking read, for the synchronous locator lookup
    fn read_index(&self) -> Result<MediaIndex, StorageError> {
        Self::parse_index(std::fs::read(self.index_path()))
    }

    async fn load_index(&self) -> Result<MediaIndex, StorageError> {
        Self::parse_index(tokio::fs::read(self.index_path()).await)
    }

    fn parse_index(read: std::io::Result<Vec<u8>>) -> Result<MediaIndex, StorageError> {
        match read {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::CorruptIndex(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(MediaIndex::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_index(&self, index: &MediaIndex) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(index)
            .map_err(|e| StorageError::CorruptIndex(e.to_string()))?;
        let tmp = self.media_dir.join(format!("{MEDIA_INDEX_FILE}.tmp"));
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, self.index_path()).await?;
        Ok(())
    }

    /// Local file behind media id `id`
    pub fn path_for(&self, id: u64) -> Result<PathBuf, StorageError> {
        let index = self.read_index()?;
        index
            .entries
            .get(&id)
            .map(|entry| self.media_dir.join(&entry.file))
            .ok_or_else(|| StorageError::NotFound(format!("{MEDIA_CONTENT_PREFIX}{id}")))
    }

    /// Parse the id out of a `content://media/external/images/media/<id>` locator
    pub fn parse_id(locator: &ImageLocator) -> Result<u64, StorageError> {
        locator
            .as_str()
            .strip_prefix(MEDIA_CONTENT_PREFIX)
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| StorageError::NotFound(locator.to_string()))
    }
}

#[async_trait]
impl MediaStore for IndexedMediaStore {
    async fn save_image(
        &self,
        request: SaveImageRequest,
    ) -> Result<Option<ImageLocator>, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut index = self.load_index().await?;
        let id = index.next_id.max(1);

        let file = PathBuf::from(&request.relative_path)
            .join(format!("{} ({}).png", request.display_name, id));
        let path = self.media_dir.join(&file);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &request.png).await?;

        index.entries.insert(
            id,
            MediaEntry {
                display_name: request.display_name,
                mime_type: request.mime_type,
                relative_path: request.relative_path,
                date_added: request.date_added,
                file,
            },
        );
        index.next_id = id + 1;
        self.write_index(&index).await?;

        let locator = ImageLocator::parse(format!("{MEDIA_CONTENT_PREFIX}{id}"))
            .map_err(|e| StorageError::InsertFailed(e.to_string()))?;
        debug!(path = %path.display(), "Media file written");
        info!(locator = %locator, "Image inserted into media store");
        Ok(Some(locator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    fn request(png: &[u8]) -> SaveImageRequest {
        SaveImageRequest {
            display_name: "Blurred Image".to_string(),
            mime_type: "image/png".to_string(),
            relative_path: "Pictures".to_string(),
            date_added: 1_700_000_000_000,
            png: png.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_insert_hands_out_increasing_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexedMediaStore::new(tmp.path());

        let first = store.save_image(request(b"1")).await.unwrap().unwrap();
        let second = store.save_image(request(b"2")).await.unwrap().unwrap();
        assert_eq!(first.as_str(), "content://media/external/images/media/1");
        assert_eq!(second.as_str(), "content://media/external/images/media/2");

        let path = store.path_for(2).unwrap();
        assert_eq!(path, tmp.path().join("Pictures").join("Blurred Image (2).png"));
        assert_eq!(std::fs::read(path).unwrap(), b"2");
    }

    #[tokio::test]
    async fn test_index_survives_new_instance() {
        let tmp = tempfile::tempdir().unwrap();
        let locator = IndexedMediaStore::new(tmp.path())
            .save_image(request(b"x"))
            .await
            .unwrap()
            .unwrap();

        let reopened = IndexedMediaStore::new(tmp.path());
        let id = IndexedMediaStore::parse_id(&locator).unwrap();
        assert!(reopened.path_for(id).unwrap().exists());
    }

    #[test]
    fn test_unknown_id_and_corrupt_index() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexedMediaStore::new(tmp.path());
        assert!(matches!(store.path_for(9), Err(StorageError::NotFound(_))));

        std::fs::write(tmp.path().join(MEDIA_INDEX_FILE), b"{oops").unwrap();
        assert!(matches!(store.path_for(9), Err(StorageError::CorruptIndex(_))));
    }

    #[tokio::test]
    async fn test_insert_reads_index_before_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexedMediaStore::new(tmp.path());
        std::fs::write(tmp.path().join(MEDIA_INDEX_FILE), b"{oops").unwrap();

        assert!(matches!(
            store.save_image(request(b"x")).await,
            Err(StorageError::CorruptIndex(_))
        ));
        assert!(!tmp.path().join("Pictures").exists());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_distinct_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(IndexedMediaStore::new(tmp.path()));

        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.save_image(request(&[i])).await })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in handles {
            let locator = handle.await.unwrap().unwrap().unwrap();
            ids.push(IndexedMediaStore::parse_id(&locator).unwrap());
        }
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_id_rejects_other_locators() {
        let other = ImageLocator::parse("content://contacts/1").unwrap();
        assert_err!(IndexedMediaStore::parse_id(&other));
    }
}
