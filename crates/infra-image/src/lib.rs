// Bluromatic Infrastructure - Image & Storage Adapters
// Implements: ImageProcessor, ContentResolver, OutputFileStore, MediaStore

pub mod blur;
pub mod media_store;
pub mod output_files;
pub mod pictures;
pub mod processor;
pub mod resolver;

pub use blur::blur_bitmap;
pub use media_store::IndexedMediaStore;
pub use output_files::PrivateOutputStore;
pub use pictures::PublicPicturesStore;
pub use processor::PngImageProcessor;
pub use resolver::LocalContentResolver;

/// Locator prefix handed out by the indexed media store
pub const MEDIA_CONTENT_PREFIX: &str = "content://media/external/images/media/";

/// Sub-directory of the public pictures dir used by the legacy save path
pub const SAVED_IMAGES_DIR: &str = "SavedImages";
