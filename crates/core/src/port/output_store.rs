// Output File Store Port
// Private, app-owned directory holding intermediate blur outputs

use super::content_resolver::StorageError;
use crate::domain::ImageLocator;
use async_trait::async_trait;

#[async_trait]
pub trait OutputFileStore: Send + Sync {
    /// Write `png` as `file_name` inside the output directory (created on
    /// demand) and return its `file://` locator
    async fn write_temp(&self, file_name: &str, png: &[u8]) -> Result<ImageLocator, StorageError>;

    /// Delete every `*.png` in the output directory and return the deleted
    /// names. A missing directory is not an error; entries that cannot be
    /// deleted are logged and left in place.
    async fn purge(&self) -> Result<Vec<String>, StorageError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::port::content_resolver::mocks::SharedBlobs;

    pub const MOCK_OUTPUT_DIR: &str = "/mock/files/blur_filter_outputs";

    /// Output store backed by the shared blob table
    pub struct InMemoryOutputStore {
        blobs: SharedBlobs,
        fail_purge: bool,
    }

    impl InMemoryOutputStore {
        pub fn new(blobs: SharedBlobs) -> Self {
            Self {
                blobs,
                fail_purge: false,
            }
        }

        pub fn failing_purge(blobs: SharedBlobs) -> Self {
            Self {
                blobs,
                fail_purge: true,
            }
        }

        fn prefix() -> String {
            format!("file://{MOCK_OUTPUT_DIR}/")
        }

        pub fn temp_files(&self) -> Vec<String> {
            let prefix = Self::prefix();
            self.blobs
                .lock()
                .unwrap()
                .keys()
                .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
                .collect()
        }
    }

    #[async_trait]
    impl OutputFileStore for InMemoryOutputStore {
        async fn write_temp(
            &self,
            file_name: &str,
            png: &[u8],
        ) -> Result<ImageLocator, StorageError> {
            let locator = format!("{}{}", Self::prefix(), file_name);
            self.blobs
                .lock()
                .unwrap()
                .insert(locator.clone(), png.to_vec());
            ImageLocator::parse(locator).map_err(|e| StorageError::InsertFailed(e.to_string()))
        }

        async fn purge(&self) -> Result<Vec<String>, StorageError> {
            if self.fail_purge {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "mock purge failure",
                )));
            }
            let prefix = Self::prefix();
            let mut blobs = self.blobs.lock().unwrap();
            let doomed: Vec<String> = blobs
                .keys()
                .filter(|k| k.starts_with(&prefix) && k.ends_with(".png"))
                .cloned()
                .collect();
            for key in &doomed {
                blobs.remove(key);
            }
            Ok(doomed
                .into_iter()
                .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
                .collect())
        }
    }
}
