//! Bounded per-metric percent series behind the trend graph.

use super::gpu::pick_display_gpu_index;
use crate::data::snapshot::Snapshot;
use crate::utils::clamp_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    CpuUsage,
    CpuTemp,
    RamUsage,
    GpuUsage,
    GpuVram,
    Disk,
}

impl Series {
    /// Back-to-front: the last series is drawn on top.
    pub const DRAW_ORDER: [Series; 6] = [
        Series::Disk,
        Series::RamUsage,
        Series::CpuTemp,
        Series::GpuUsage,
        Series::GpuVram,
        Series::CpuUsage,
    ];

    /// Legend order, left to right.
    pub const LEGEND_ORDER: [Series; 6] = [
        Series::CpuUsage,
        Series::CpuTemp,
        Series::RamUsage,
        Series::GpuUsage,
        Series::GpuVram,
        Series::Disk,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Series::CpuUsage => "CPU",
            Series::CpuTemp => "TEMP",
            Series::RamUsage => "RAM",
            Series::GpuUsage => "GPU",
            Series::GpuVram => "VRAM",
            Series::Disk => "DISK",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsHistory {
    capacity: usize,
    cpu_usage: Vec<f64>,
    cpu_temp: Vec<f64>,
    ram_usage: Vec<f64>,
    gpu_usage: Vec<f64>,
    gpu_vram: Vec<f64>,
    disk: Vec<f64>,
}

/// Clamp and append, carrying the last value over a missing sample. A series
/// that has never seen a value stays empty.
pub fn append_sample(series: &mut Vec<f64>, value: Option<f64>, capacity: usize) {
    if capacity == 0 {
        return;
    }
    let Some(next) = value.or_else(|| series.last().copied()) else {
        return;
    };
    series.push(clamp_percent(next));
    if series.len() > capacity {
        let excess = series.len() - capacity;
        series.drain(..excess);
    }
}

impl MetricsHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cpu_usage: Vec::new(),
            cpu_temp: Vec::new(),
            ram_usage: Vec::new(),
            gpu_usage: Vec::new(),
            gpu_vram: Vec::new(),
            disk: Vec::new(),
        }
    }

    pub fn series(&self, series: Series) -> &[f64] {
        match series {
            Series::CpuUsage => &self.cpu_usage,
            Series::CpuTemp => &self.cpu_temp,
            Series::RamUsage => &self.ram_usage,
            Series::GpuUsage => &self.gpu_usage,
            Series::GpuVram => &self.gpu_vram,
            Series::Disk => &self.disk,
        }
    }

    fn series_mut(&mut self, series: Series) -> &mut Vec<f64> {
        match series {
            Series::CpuUsage => &mut self.cpu_usage,
            Series::CpuTemp => &mut self.cpu_temp,
            Series::RamUsage => &mut self.ram_usage,
            Series::GpuUsage => &mut self.gpu_usage,
            Series::GpuVram => &mut self.gpu_vram,
            Series::Disk => &mut self.disk,
        }
    }

    pub fn append(&mut self, series: Series, value: Option<f64>) {
        let capacity = self.capacity;
        append_sample(self.series_mut(series), value, capacity);
    }

    /// Record one poll. `disk_busy` replaces disk space usage when the busy
    /// sampler produced a value.
    ///
    /// A series with no value yet is left empty instead of padded with 0, so
    /// the graph starts at the first real reading.
    pub fn update(&mut self, snapshot: &Snapshot, disk_busy: Option<f64>) {
        let display_gpu = pick_display_gpu_index(&snapshot.gpus).map(|index| &snapshot.gpus[index]);

        self.append(Series::CpuUsage, snapshot.cpu.usage_percent);
        self.append(Series::CpuTemp, snapshot.cpu.temperature_c);
        self.append(Series::RamUsage, snapshot.ram_usage_percent());
        self.append(
            Series::GpuUsage,
            display_gpu.and_then(|gpu| gpu.utilization_percent),
        );
        self.append(
            Series::GpuVram,
            display_gpu.and_then(|gpu| {
                gpu.memory_utilization_percent
                    .or_else(|| gpu.derived_memory_percent())
            }),
        );
        self.append(Series::Disk, disk_busy.or_else(|| snapshot.disk_usage_percent()));
    }
}
