use crate::data::collector::DataCollector;
use crate::data::history::MetricsHistory;
use crate::data::snapshot::{ProcessInfo, Snapshot};
use std::time::Instant;

pub mod collector;
pub mod command;
pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod history;
pub mod process;
pub mod scoring;
pub mod sensors;
pub mod snapshot;
pub mod sysfs;
pub mod system;

/// One acquisition channel. Each call yields every candidate the channel can
/// see right now; scoring and fusion happen elsewhere.
pub trait Probe {
    type Reading;

    fn probe(&self) -> Vec<Self::Reading>;
}

/// Owns the collector and everything that outlives a single poll.
pub struct DataManager {
    collector: DataCollector,
    history: MetricsHistory,
    snapshot: Snapshot,
    processes: Vec<ProcessInfo>,
}

impl DataManager {
    pub fn new(collector: DataCollector, history_points: usize) -> Self {
        Self {
            collector,
            history: MetricsHistory::new(history_points),
            snapshot: Snapshot::default(),
            processes: Vec::new(),
        }
    }

    pub fn poll(&mut self, now: Instant) {
        self.snapshot = self.collector.collect(now);
        let disk_busy = self.collector.disk_busy(now);
        self.history.update(&self.snapshot, disk_busy);
        self.processes = self.collector.top_processes(now);
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn history(&self) -> &MetricsHistory {
        &self.history
    }

    pub fn processes(&self) -> &[ProcessInfo] {
        &self.processes
    }
}
