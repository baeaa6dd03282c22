#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuMetrics {
    pub name: String,
    pub total_cores: Option<u32>,
    pub total_threads: Option<u32>,
    pub temperature_c: Option<f64>,
    pub frequency_mhz: Option<f64>,
    pub usage_percent: Option<f64>,
    pub fan_rpm: Option<f64>,
    pub power_w: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RamMetrics {
    pub total_kb: Option<u64>,
    pub available_kb: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiskMetrics {
    pub mount_point: String,
    pub total_bytes: Option<u64>,
    pub free_bytes: Option<u64>,
}

impl Default for DiskMetrics {
    fn default() -> Self {
        Self {
            mount_point: "/".to_string(),
            total_bytes: None,
            free_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuMetrics {
    pub name: String,
    /// Acquisition channel, e.g. `nvidia-smi` or `sysfs/amdgpu`.
    pub source: String,
    /// `None` when the kernel gives no display-connector information.
    pub in_use: Option<bool>,
    pub temperature_c: Option<f64>,
    pub core_clock_mhz: Option<f64>,
    pub utilization_percent: Option<f64>,
    pub power_w: Option<f64>,
    pub memory_used_mib: Option<f64>,
    pub memory_total_mib: Option<f64>,
    pub memory_utilization_percent: Option<f64>,
}

impl GpuMetrics {
    pub fn has_telemetry(&self) -> bool {
        self.temperature_c.is_some()
            || self.core_clock_mhz.is_some()
            || self.utilization_percent.is_some()
            || self.power_w.is_some()
            || self.memory_used_mib.is_some()
            || self.memory_total_mib.is_some()
            || self.memory_utilization_percent.is_some()
    }

    /// used/total as a percent, when both are known and total is positive.
    pub fn derived_memory_percent(&self) -> Option<f64> {
        match (self.memory_used_mib, self.memory_total_mib) {
            (Some(used), Some(total)) if total > 0.0 => Some(100.0 * used / total),
            _ => None,
        }
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use == Some(true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub command: String,
}

/// One poll's worth of fused readings. Built once, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub cpu: CpuMetrics,
    pub ram: RamMetrics,
    pub disk: DiskMetrics,
    /// Ranked best-first by telemetry score.
    pub gpus: Vec<GpuMetrics>,
}

impl Snapshot {
    pub fn ram_usage_percent(&self) -> Option<f64> {
        let total = self.ram.total_kb.filter(|total| *total > 0)?;
        let available = self.ram.available_kb?;
        let used = total.saturating_sub(available);
        Some(100.0 * used as f64 / total as f64)
    }

    pub fn disk_usage_percent(&self) -> Option<f64> {
        let total = self.disk.total_bytes.filter(|total| *total > 0)?;
        let free = self.disk.free_bytes?.min(total);
        Some(100.0 * (total - free) as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_and_disk_percentages() {
        let snapshot = Snapshot {
            ram: RamMetrics {
                total_kb: Some(1000),
                available_kb: Some(250),
            },
            disk: DiskMetrics {
                mount_point: "/".into(),
                total_bytes: Some(200),
                free_bytes: Some(500),
            },
            ..Default::default()
        };
        assert_eq!(snapshot.ram_usage_percent(), Some(75.0));
        assert_eq!(snapshot.disk_usage_percent(), Some(0.0));
        assert_eq!(Snapshot::default().ram_usage_percent(), None);
    }

    #[test]
    fn memory_percent_needs_positive_total() {
        let mut gpu = GpuMetrics {
            memory_used_mib: Some(512.0),
            memory_total_mib: Some(2048.0),
            ..Default::default()
        };
        assert_eq!(gpu.derived_memory_percent(), Some(25.0));
        gpu.memory_total_mib = Some(0.0);
        assert_eq!(gpu.derived_memory_percent(), None);
        assert!(gpu.has_telemetry());
        assert!(!GpuMetrics::default().has_telemetry());
    }
}
