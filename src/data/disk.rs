//! Busy percentage of the block device backing the watched mount point.

use super::sysfs::SysRoot;
use crate::utils::clamp_percent;
use log::debug;
use std::path::Path;
use std::time::Instant;

/// Index of "milliseconds spent doing I/O" among the counters that follow
/// the major, minor and name columns of `/proc/diskstats`.
const IO_TICKS_FIELD: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceNumber {
    pub major: u32,
    pub minor: u32,
}

impl DeviceNumber {
    /// Split a Linux `dev_t` the way glibc's `major()`/`minor()` do.
    pub fn from_dev(dev: u64) -> Self {
        let major = ((dev >> 8) & 0xfff) | ((dev >> 32) & !0xfff);
        let minor = (dev & 0xff) | ((dev >> 12) & !0xff);
        Self {
            major: major as u32,
            minor: minor as u32,
        }
    }

    #[cfg(unix)]
    pub fn of_path(path: &Path) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        let metadata = std::fs::metadata(path).ok()?;
        Some(Self::from_dev(metadata.dev()))
    }

    #[cfg(not(unix))]
    pub fn of_path(_path: &Path) -> Option<Self> {
        None
    }
}

pub fn parse_io_ticks_ms(diskstats: &str, device: DeviceNumber) -> Option<u64> {
    for line in diskstats.lines() {
        let mut columns = line.split_whitespace();
        let (Some(major), Some(minor), Some(_name)) = (columns.next(), columns.next(), columns.next())
        else {
            continue;
        };
        if major.parse::<u32>().ok() != Some(device.major)
            || minor.parse::<u32>().ok() != Some(device.minor)
        {
            continue;
        }
        let counters: Vec<u64> = columns.map_while(|field| field.parse().ok()).collect();
        return counters.get(IO_TICKS_FIELD).copied();
    }
    None
}

/// Busy percent is Δ(io ms) over Δ(wall ms), so it needs the previous poll.
#[derive(Debug, Clone)]
pub struct DiskBusySampler {
    device: Option<DeviceNumber>,
    previous: Option<(u64, Instant)>,
}

impl DiskBusySampler {
    pub fn for_mount(mount_point: &str) -> Self {
        let device = DeviceNumber::of_path(Path::new(mount_point));
        if device.is_none() {
            debug!("no device number for {mount_point}, disk busy unavailable");
        }
        Self::new(device)
    }

    pub fn new(device: Option<DeviceNumber>) -> Self {
        Self {
            device,
            previous: None,
        }
    }

    pub fn sample(&mut self, sys: &SysRoot, now: Instant) -> Option<f64> {
        let device = self.device?;
        let diskstats = sys.read_to_string("/proc/diskstats")?;
        let io_ms = parse_io_ticks_ms(&diskstats, device)?;
        self.sample_io_ms(io_ms, now)
    }

    pub fn sample_io_ms(&mut self, io_ms: u64, now: Instant) -> Option<f64> {
        let (previous_ms, previous_at) = self.previous.replace((io_ms, now))?;
        let elapsed_ms = now.saturating_duration_since(previous_at).as_millis();
        if elapsed_ms == 0 || io_ms < previous_ms {
            return None;
        }
        Some(clamp_percent(
            100.0 * (io_ms - previous_ms) as f64 / elapsed_ms as f64,
        ))
    }
}
