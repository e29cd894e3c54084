// Application Layer - Work chain, repository and UI state holder

pub mod repository;
pub mod view_model;
pub mod work_manager;
pub mod worker;

// Re-exports
pub use repository::{BluromaticRepository, WorkManagerBluromaticRepository};
pub use view_model::BlurViewModel;
pub use work_manager::{
    Constraints, EnqueueOutcome, ExistingWorkPolicy, WorkContinuation, WorkManager,
    WorkManagerConfig, WorkRequest,
};
pub use worker::{
    cancellation_channel, BlurWorker, CancellationSender, CancellationToken, CleanupWorker,
    SaveImageToFileWorker, Worker, WorkerEnv, WorkerParameters,
};
