// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] crate::port::StorageError),

    #[error("Image error: {0}")]
    Image(#[from] crate::port::ImageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{ImageError, StorageError};

    #[test]
    fn test_port_errors_convert() {
        fn open() -> Result<()> {
            let missing: std::result::Result<(), StorageError> = Err(StorageError::NotFound(
                "content://media/external/images/media/9".to_string(),
            ));
            missing?;
            Ok(())
        }
        let err = open().unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::NotFound(_))));
        assert!(err.to_string().starts_with("Storage error"));

        let err: AppError = ImageError::TooSmall {
            width: 4,
            height: 4,
            level: 3,
        }
        .into();
        assert!(matches!(err, AppError::Image(_)));
    }
}
