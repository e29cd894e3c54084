// Domain Layer - Pure values and state machines

pub mod chain;
pub mod error;
pub mod image;
pub mod ui_state;
pub mod work;

// Re-exports
pub use chain::{ChainSnapshot, ChainStatus};
pub use error::DomainError;
pub use image::{BlurAmount, BlurLevel, ImageLocator, LocatorScheme};
pub use ui_state::BlurUiState;
pub use work::{WorkData, WorkId, WorkInfo, WorkResult, WorkState};
