// System probe port
// reason: async-trait for the disk refresh done by sysinfo adapters
use async_trait::async_trait;

/// System resource metrics relevant to work constraints
#[derive(Debug, Clone)]
pub struct SystemMetrics {
    pub disk_available_mb: u64,
    pub disk_total_mb: u64,
}

/// System probe port for constraints and platform branching
#[async_trait]
pub trait SystemProbe: Send + Sync {
    /// Get current storage metrics
    ///
    /// # Example
    /// ```text
    /// let metrics = probe.get_metrics().await;
    /// if metrics.disk_available_mb < 64 {
    ///     println!("storage is low");
    /// }
    /// ```
    async fn get_metrics(&self) -> SystemMetrics;

    /// Platform API level used to pick the persistence branch
    fn api_level(&self) -> u32;

    /// true if free storage is under `min_free_mb`
    async fn is_storage_low(&self, min_free_mb: u64) -> bool {
        self.get_metrics().await.disk_available_mb < min_free_mb
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    /// Mock SystemProbe for testing
    pub struct MockSystemProbe {
        api_level: u32,
        metrics: Arc<Mutex<SystemMetrics>>,
    }
    impl MockSystemProbe {
        pub fn new(api_level: u32) -> Self {
            Self {
                api_level,
                metrics: Arc::new(Mutex::new(SystemMetrics {
                    disk_available_mb: 10 * 1024,
                    disk_total_mb: 100 * 1024,
                })),
            }
        }
        pub fn set_available_mb(&self, disk_available_mb: u64) {
            self.metrics.lock().unwrap().disk_available_mb = disk_available_mb;
        }
    }
    #[async_trait]
    impl SystemProbe for MockSystemProbe {
        async fn get_metrics(&self) -> SystemMetrics {
            self.metrics.lock().unwrap().clone()
        }
        fn api_level(&self) -> u32 {
            self.api_level
        }
    }
}
