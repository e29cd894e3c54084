// Port Layer - Interfaces for platform services

pub mod content_resolver;
pub mod id_provider; // For deterministic testing
pub mod image_processor;
pub mod media_store;
pub mod notifier;
pub mod output_store;
pub mod system_probe;
pub mod time_provider;

// Re-exports
pub use content_resolver::{ContentResolver, StorageError};
pub use id_provider::IdProvider;
pub use image_processor::{ImageError, ImageProcessor};
pub use media_store::{MediaStore, SaveImageRequest};
pub use notifier::Notifier;
pub use output_store::OutputFileStore;
pub use system_probe::{SystemMetrics, SystemProbe};
pub use time_provider::TimeProvider;
