// Content Resolver Port
// Opens image locators (file://, content://, android.resource://) for reading

use crate::domain::ImageLocator;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Storage errors shared by the resolver, output store and media stores
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unsupported locator scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Media store rejected insert: {0}")]
    InsertFailed(String),

    #[error("Corrupt media index: {0}")]
    CorruptIndex(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content Resolver trait
///
/// Implementations:
/// - LocalContentResolver: resolves against local directories
/// - InMemoryContentResolver: blobs keyed by locator (tests)
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Read the full encoded image behind `locator`
    ///
    /// # Errors
    /// - StorageError::UnsupportedScheme for unknown schemes
    /// - StorageError::NotFound if nothing lives at the locator
    async fn open_input(&self, locator: &ImageLocator) -> Result<Vec<u8>, StorageError>;

    /// Local filesystem path backing `locator` (used to view a result)
    fn local_path(&self, locator: &ImageLocator) -> Result<PathBuf, StorageError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    /// Blob table shared between the in-memory resolver and stores
    pub type SharedBlobs = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

    pub fn shared_blobs() -> SharedBlobs {
        Arc::new(Mutex::new(BTreeMap::new()))
    }

    /// Resolver that serves whatever was put in the blob table
    pub struct InMemoryContentResolver {
        blobs: SharedBlobs,
    }

    impl InMemoryContentResolver {
        pub fn new(blobs: SharedBlobs) -> Self {
            Self { blobs }
        }

        pub fn insert(&self, locator: &str, bytes: Vec<u8>) {
            self.blobs.lock().unwrap().insert(locator.to_string(), bytes);
        }
    }

    #[async_trait]
    impl ContentResolver for InMemoryContentResolver {
        async fn open_input(&self, locator: &ImageLocator) -> Result<Vec<u8>, StorageError> {
            self.blobs
                .lock()
                .unwrap()
                .get(locator.as_str())
                .cloned()
                .ok_or_else(|| StorageError::NotFound(locator.to_string()))
        }

        fn local_path(&self, locator: &ImageLocator) -> Result<PathBuf, StorageError> {
            if self.blobs.lock().unwrap().contains_key(locator.as_str()) {
                Ok(PathBuf::from(locator.path_part()))
            } else {
                Err(StorageError::NotFound(locator.to_string()))
            }
        }
    }
}
