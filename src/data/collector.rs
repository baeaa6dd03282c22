use crate::data::command::{CommandRunner, TimedCache};
use crate::data::cpu::{collect_cpu_metrics, CpuState};
use crate::data::disk::DiskBusySampler;
use crate::data::gpu::GpuSource;
use crate::data::process::collect_top_processes;
use crate::data::sensors::SensorsSource;
use crate::data::snapshot::{ProcessInfo, Snapshot};
use crate::data::sysfs::SysRoot;
use crate::data::system::SystemReader;
use log::{debug, info};
use std::time::{Duration, Instant};

/// What the collector watches and how often it may spawn tools.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub mount_point: String,
    pub process_rows: usize,
    pub command_cache: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            mount_point: "/".to_string(),
            process_rows: 6,
            command_cache: Duration::from_millis(900),
        }
    }
}

/// Assembles one [`Snapshot`] per poll from every probe, and owns the
/// poll-to-poll state the rate calculations need.
pub struct DataCollector {
    sys: SysRoot,
    runner: Box<dyn CommandRunner>,
    system: SystemReader,
    cpu: CpuState,
    sensors: SensorsSource,
    gpus: GpuSource,
    disk_busy: DiskBusySampler,
    processes: TimedCache<Vec<ProcessInfo>>,
    settings: CollectorSettings,
}

impl DataCollector {
    pub fn new(sys: SysRoot, runner: Box<dyn CommandRunner>, settings: CollectorSettings) -> Self {
        info!(
            "collecting from {} (mount {}, tool cache {:?})",
            sys.path("/").display(),
            settings.mount_point,
            settings.command_cache
        );
        Self {
            disk_busy: DiskBusySampler::for_mount(&settings.mount_point),
            sensors: SensorsSource::new(settings.command_cache),
            gpus: GpuSource::new(settings.command_cache),
            processes: TimedCache::new(settings.command_cache),
            sys,
            runner,
            system: SystemReader::new(),
            cpu: CpuState::default(),
            settings,
        }
    }

    pub fn collect(&mut self, now: Instant) -> Snapshot {
        let sensors = self.sensors.read(self.runner.as_ref(), now);
        let cpu = collect_cpu_metrics(&self.sys, &mut self.cpu, &sensors, now);
        let gpus = self
            .gpus
            .collect(&self.sys, self.runner.as_ref(), sensors.gpu_power_w, now);
        let snapshot = Snapshot {
            cpu,
            ram: self.system.ram(),
            disk: self.system.disk(&self.settings.mount_point),
            gpus,
        };
        debug!(
            "poll: cpu {:?}% {:?}C, {} gpu(s)",
            snapshot.cpu.usage_percent,
            snapshot.cpu.temperature_c,
            snapshot.gpus.len()
        );
        snapshot
    }

    pub fn disk_busy(&mut self, now: Instant) -> Option<f64> {
        self.disk_busy.sample(&self.sys, now)
    }

    pub fn top_processes(&mut self, now: Instant) -> Vec<ProcessInfo> {
        let runner = self.runner.as_ref();
        let rows = self.settings.process_rows;
        self.processes
            .get_or_refresh(now, || collect_top_processes(runner, rows))
    }
}
