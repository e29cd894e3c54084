// System probe implementation
// reason: sysinfo for cross-platform disk monitoring
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use sysinfo::Disks;
use tracing::{debug, warn};

use bluromatic_core::port::system_probe::{SystemMetrics, SystemProbe};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// System probe using sysinfo
///
/// Reports free space on the disk that holds `files_dir`. The API level is
/// configuration, not something the host can tell us.
pub struct SystemProbeImpl {
    files_dir: PathBuf,
    api_level: u32,
    disks: Mutex<Disks>,
}

impl SystemProbeImpl {
    /// # Example
    /// ```ignore
    /// let probe = SystemProbeImpl::new("/home/me/.local/share/bluromatic/files", 33);
    /// ```
    pub fn new(files_dir: impl AsRef<Path>, api_level: u32) -> Self {
        Self {
            files_dir: files_dir.as_ref().to_path_buf(),
            api_level,
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }
}

/// Disk whose mount point is the longest prefix of `path`
fn disk_for<'a>(disks: &'a Disks, path: &Path) -> Option<&'a sysinfo::Disk> {
    disks
        .list()
        .iter()
        .filter(|d| path.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len())
}

#[async_trait]
impl SystemProbe for SystemProbeImpl {
    async fn get_metrics(&self) -> SystemMetrics {
        let mut disks = match self.disks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        disks.refresh_list();

        let (disk_available_mb, disk_total_mb) = match disk_for(&disks, &self.files_dir) {
            Some(disk) => (
                disk.available_space() / BYTES_PER_MB,
                disk.total_space() / BYTES_PER_MB,
            ),
            None => {
                // Unknown disk: report plenty of space rather than block forever
                warn!(path = %self.files_dir.display(), "No disk found for files dir");
                (u64::MAX, u64::MAX)
            }
        };

        debug!(
            disk_available_mb = %disk_available_mb,
            disk_total_mb = %disk_total_mb,
            "System metrics collected"
        );

        SystemMetrics {
            disk_available_mb,
            disk_total_mb,
        }
    }

    fn api_level(&self) -> u32 {
        self.api_level
    }
}
