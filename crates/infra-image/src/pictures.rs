// Legacy save path: write straight into the public pictures directory

use crate::SAVED_IMAGES_DIR;
use async_trait::async_trait;
use bluromatic_core::domain::ImageLocator;
use bluromatic_core::port::{MediaStore, SaveImageRequest, StorageError};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct PublicPicturesStore {
    pictures_dir: PathBuf,
}

impl PublicPicturesStore {
    pub fn new(pictures_dir: impl AsRef<Path>) -> Self {
        Self {
            pictures_dir: pictures_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl MediaStore for PublicPicturesStore {
    async fn save_image(
        &self,
        request: SaveImageRequest,
    ) -> Result<Option<ImageLocator>, StorageError> {
        let dir = self.pictures_dir.join(SAVED_IMAGES_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        // Same title every time: later saves overwrite earlier ones
        let path = dir.join(format!("{}.png", request.display_name));
        tokio::fs::write(&path, &request.png).await?;
        debug!(path = %path.display(), "Image written to public pictures");
        Ok(Some(ImageLocator::from_path(&path)))
    }
}
