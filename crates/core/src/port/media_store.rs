// Media Store Port
// Publishes a finished image to shared storage

use super::content_resolver::StorageError;
use crate::domain::ImageLocator;
use async_trait::async_trait;

/// Everything a store needs to publish one image
#[derive(Debug, Clone)]
pub struct SaveImageRequest {
    pub display_name: String,
    pub mime_type: String,
    /// Relative directory inside shared storage (e.g. "Pictures")
    pub relative_path: String,
    /// Epoch ms
    pub date_added: i64,
    pub png: Vec<u8>,
}

/// Media Store trait
///
/// Implementations:
/// - PublicPicturesStore: writes straight into the public pictures directory
/// - IndexedMediaStore: inserts through an index and hands out content:// locators
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Save the image; `Ok(None)` means the store declined to produce a locator
    async fn save_image(&self, request: SaveImageRequest)
        -> Result<Option<ImageLocator>, StorageError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::port::content_resolver::mocks::SharedBlobs;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Store that writes into the shared blob table under a fixed prefix
    pub struct InMemoryMediaStore {
        blobs: SharedBlobs,
        prefix: String,
        next_id: AtomicU64,
        decline: bool,
    }

    impl InMemoryMediaStore {
        /// Mimics the indexed store: `content://media/external/images/media/<n>`
        pub fn indexed(blobs: SharedBlobs) -> Self {
            Self::with_prefix(blobs, "content://media/external/images/media/")
        }

        /// Mimics the public pictures directory
        pub fn public_pictures(blobs: SharedBlobs) -> Self {
            Self::with_prefix(blobs, "file:///mock/Pictures/SavedImages/")
        }

        /// Store whose inserts never produce a locator
        pub fn declining(blobs: SharedBlobs) -> Self {
            let mut store = Self::indexed(blobs);
            store.decline = true;
            store
        }

        fn with_prefix(blobs: SharedBlobs, prefix: &str) -> Self {
            Self {
                blobs,
                prefix: prefix.to_string(),
                next_id: AtomicU64::new(1),
                decline: false,
            }
        }

        pub fn saved_count(&self) -> usize {
            self.blobs
                .lock()
                .unwrap()
                .keys()
                .filter(|k| k.starts_with(&self.prefix))
                .count()
        }
    }

    #[async_trait]
    impl MediaStore for InMemoryMediaStore {
        async fn save_image(
            &self,
            request: SaveImageRequest,
        ) -> Result<Option<ImageLocator>, StorageError> {
            if self.decline {
                return Ok(None);
            }
            let suffix = if self.prefix.starts_with("content://") {
                self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
            } else {
                format!("{}.png", request.display_name)
            };
            let locator = format!("{}{}", self.prefix, suffix);
            self.blobs
                .lock()
                .unwrap()
                .insert(locator.clone(), request.png);
            Ok(ImageLocator::parse(locator).ok())
        }
    }
}
