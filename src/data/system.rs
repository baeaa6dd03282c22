//! Memory, filesystem capacity and host identity, through `sysinfo`.

use crate::data::snapshot::{DiskMetrics, RamMetrics};
use std::path::Path;
use sysinfo::{DiskExt, System, SystemExt};

pub struct SystemReader {
    system: System,
}

impl SystemReader {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    pub fn ram(&mut self) -> RamMetrics {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return RamMetrics::default();
        }
        RamMetrics {
            total_kb: Some(total / 1024),
            available_kb: Some(self.system.available_memory() / 1024),
        }
    }

    pub fn disk(&mut self, mount_point: &str) -> DiskMetrics {
        self.system.refresh_disks_list();
        let mounts = self.system.disks().iter().map(|disk| {
            (
                disk.mount_point(),
                disk.total_space(),
                disk.available_space(),
            )
        });
        disk_for_mount(mounts, mount_point)
    }
}

impl Default for SystemReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Capacity of the filesystem mounted exactly at `mount_point`.
pub fn disk_for_mount<'a>(
    mounts: impl IntoIterator<Item = (&'a Path, u64, u64)>,
    mount_point: &str,
) -> DiskMetrics {
    let wanted = Path::new(mount_point);
    let found = mounts
        .into_iter()
        .find(|(path, total, _)| *path == wanted && *total > 0);
    DiskMetrics {
        mount_point: mount_point.to_string(),
        total_bytes: found.map(|(_, total, _)| total),
        free_bytes: found.map(|(_, _, available)| available),
    }
}

pub fn hostname() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}
