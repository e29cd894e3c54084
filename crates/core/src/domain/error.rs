// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid work state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid image locator: {0}")]
    InvalidLocator(String),

    #[error("Invalid blur level: {0}")]
    InvalidBlurLevel(i64),
}

pub type Result<T> = std::result::Result<T, DomainError>;
