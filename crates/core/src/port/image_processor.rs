// Image Processor Port
// CPU-bound decode / blur / encode. Callers run it on the blocking pool.

use crate::domain::BlurLevel;
use thiserror::Error;

/// Image processing errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Image {width}x{height} is too small for blur level {level}")]
    TooSmall { width: u32, height: u32, level: u32 },
}

/// Image Processor trait
///
/// Both operations take and return encoded image bytes; the output is
/// always PNG.
pub trait ImageProcessor: Send + Sync {
    /// Downsample then upsample `source` to approximate a blur
    fn blur(&self, source: &[u8], level: BlurLevel) -> Result<Vec<u8>, ImageError>;

    /// Decode `source` and re-encode it as PNG
    fn to_png(&self, source: &[u8]) -> Result<Vec<u8>, ImageError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock processor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Echo the input with the blur level appended
        Success,
        /// Always fail with message
        Fail(String),
    }

    pub struct MockImageProcessor {
        behavior: MockBehavior,
        blur_calls: AtomicUsize,
    }

    impl MockImageProcessor {
        pub fn new_success() -> Self {
            Self {
                behavior: MockBehavior::Success,
                blur_calls: AtomicUsize::new(0),
            }
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self {
                behavior: MockBehavior::Fail(message.into()),
                blur_calls: AtomicUsize::new(0),
            }
        }

        pub fn blur_calls(&self) -> usize {
            self.blur_calls.load(Ordering::SeqCst)
        }
    }

    impl ImageProcessor for MockImageProcessor {
        fn blur(&self, source: &[u8], level: BlurLevel) -> Result<Vec<u8>, ImageError> {
            self.blur_calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::Success => {
                    let mut out = source.to_vec();
                    out.push(level.get() as u8);
                    Ok(out)
                }
                MockBehavior::Fail(msg) => Err(ImageError::Decode(msg.clone())),
            }
        }

        fn to_png(&self, source: &[u8]) -> Result<Vec<u8>, ImageError> {
            match &self.behavior {
                MockBehavior::Success => Ok(source.to_vec()),
                MockBehavior::Fail(msg) => Err(ImageError::Decode(msg.clone())),
            }
        }
    }
}
