//! CPU probes: temperature candidates, frequency, topology, model name, the
//! `/proc/stat` usage sampler and the RAPL package-power sampler.

use super::scoring::{
    rapl_domain_score, BestPick, CPU_CHIP_TOKENS, CPU_TEMP_LABEL_TOKENS, THERMAL_ZONE_CPU_TOKENS,
};
use super::sysfs::{self, file_name, is_cpu_directory_name, read_first_line, read_i64, SysRoot};
use super::Probe;
use crate::data::sensors::SensorsFallback;
use crate::data::snapshot::CpuMetrics;
use crate::utils::{contains_any, normalize_temperature_c, parse_optional_f64, plausible_watts};
use log::debug;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

/// Where a temperature candidate was read from, with the text used to score it.
#[derive(Debug, Clone, PartialEq)]
pub enum TempOrigin {
    ThermalZone { kind: String },
    Hwmon { chip: String, label: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TempCandidate {
    pub celsius: f64,
    pub origin: TempOrigin,
}

impl TempCandidate {
    /// Whether the candidate's own labels name it as a CPU package/die sensor.
    pub fn is_preferred(&self) -> bool {
        match &self.origin {
            TempOrigin::ThermalZone { kind } => contains_any(kind, THERMAL_ZONE_CPU_TOKENS),
            TempOrigin::Hwmon { label, .. } => contains_any(label, CPU_TEMP_LABEL_TOKENS),
        }
    }

    /// Unlabeled readings still count when they come from a CPU driver.
    pub fn is_fallback(&self) -> bool {
        match &self.origin {
            TempOrigin::ThermalZone { .. } => true,
            TempOrigin::Hwmon { chip, .. } => contains_any(chip, CPU_CHIP_TOKENS),
        }
    }
}

pub struct ThermalZoneProbe<'a> {
    pub sys: &'a SysRoot,
}

impl Probe for ThermalZoneProbe<'_> {
    type Reading = TempCandidate;

    fn probe(&self) -> Vec<TempCandidate> {
        let mut candidates = Vec::new();
        for zone in self.sys.entries("/sys/class/thermal") {
            if !file_name(&zone).starts_with("thermal_zone") {
                continue;
            }
            let Some(raw) = read_i64(&zone.join("temp")) else {
                continue;
            };
            let Some(celsius) = normalize_temperature_c(raw) else {
                debug!("{}: {raw} outside plausible range", zone.display());
                continue;
            };
            let kind = read_first_line(&zone.join("type"))
                .unwrap_or_default()
                .to_lowercase();
            candidates.push(TempCandidate {
                celsius,
                origin: TempOrigin::ThermalZone { kind },
            });
        }
        candidates
    }
}

pub struct HwmonTempProbe<'a> {
    pub sys: &'a SysRoot,
}

impl Probe for HwmonTempProbe<'_> {
    type Reading = TempCandidate;

    fn probe(&self) -> Vec<TempCandidate> {
        let mut candidates = Vec::new();
        for hwmon in self.sys.entries("/sys/class/hwmon") {
            let chip = read_first_line(&hwmon.join("name"))
                .unwrap_or_default()
                .to_lowercase();
            for file in sysfs::list_dir_entries(&hwmon) {
                let name = file_name(&file);
                let Some(index) = name
                    .strip_prefix("temp")
                    .and_then(|rest| rest.strip_suffix("_input"))
                else {
                    continue;
                };
                let Some(celsius) = read_i64(&file).and_then(normalize_temperature_c) else {
                    continue;
                };
                let label = read_first_line(&hwmon.join(format!("temp{index}_label")))
                    .unwrap_or_default()
                    .to_lowercase();
                candidates.push(TempCandidate {
                    celsius,
                    origin: TempOrigin::Hwmon {
                        chip: chip.clone(),
                        label,
                    },
                });
            }
        }
        candidates
    }
}

/// Highest preferred reading, else highest fallback reading.
fn preferred_or_fallback_max(candidates: &[TempCandidate]) -> Option<f64> {
    max_celsius(candidates, TempCandidate::is_preferred).or_else(|| {
        max_celsius(candidates, |candidate| {
            !candidate.is_preferred() && candidate.is_fallback()
        })
    })
}

fn max_celsius(
    candidates: &[TempCandidate],
    keep: impl Fn(&TempCandidate) -> bool,
) -> Option<f64> {
    candidates
        .iter()
        .filter(|candidate| keep(*candidate))
        .map(|candidate| candidate.celsius)
        .fold(None, |best: Option<f64>, value| match best {
            Some(best) if best >= value => Some(best),
            _ => Some(value),
        })
}

/// Thermal zones decide when they produce anything; hwmon is only consulted
/// when they produce nothing.
pub fn fuse_cpu_temperature(
    thermal: &[TempCandidate],
    hwmon: impl FnOnce() -> Vec<TempCandidate>,
) -> Option<f64> {
    preferred_or_fallback_max(thermal).or_else(|| preferred_or_fallback_max(&hwmon()))
}

/// Per-logical-CPU `scaling_cur_freq` values in MHz.
pub fn scaling_frequencies_mhz(sys: &SysRoot) -> Vec<f64> {
    sys.entries("/sys/devices/system/cpu")
        .into_iter()
        .filter(|entry| is_cpu_directory_name(&file_name(entry)))
        .filter_map(|entry| read_i64(&entry.join("cpufreq").join("scaling_cur_freq")))
        .filter(|khz| *khz > 0)
        .map(|khz| khz as f64 / 1000.0)
        .collect()
}

pub fn cpuinfo_frequencies_mhz(cpuinfo: &str) -> Vec<f64> {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("cpu MHz"))
        .filter_map(|line| line.split_once(':'))
        .filter_map(|(_, value)| parse_optional_f64(value))
        .filter(|mhz| *mhz > 0.0)
        .collect()
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn average_frequency_mhz(sys: &SysRoot, cpuinfo: Option<&str>) -> Option<f64> {
    let scaling = scaling_frequencies_mhz(sys);
    if !scaling.is_empty() {
        return average(&scaling);
    }
    average(&cpuinfo_frequencies_mhz(cpuinfo?))
}

/// `key: value` pairs of a cpuinfo line, key lowercased, both trimmed.
fn cpuinfo_field(line: &str) -> Option<(String, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim().to_lowercase(), value.trim()))
}

fn has_alpha(value: &str) -> bool {
    value.chars().any(|c| c.is_alphabetic())
}

pub fn parse_cpu_name(cpuinfo: &str) -> String {
    let mut model_fallback: Option<&str> = None;
    let mut processor_fallback: Option<&str> = None;

    for (key, value) in cpuinfo.lines().filter_map(cpuinfo_field) {
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "model name" | "cpu model" | "hardware" => return value.to_string(),
            "model" if has_alpha(value) => {
                model_fallback.get_or_insert(value);
            }
            "processor" if has_alpha(value) => {
                processor_fallback.get_or_insert(value);
            }
            _ => {}
        }
    }

    model_fallback
        .or(processor_fallback)
        .unwrap_or("Unknown CPU")
        .to_string()
}

fn logical_cpu_dirs(sys: &SysRoot) -> Vec<PathBuf> {
    sys.entries("/sys/devices/system/cpu")
        .into_iter()
        .filter(|entry| is_cpu_directory_name(&file_name(entry)))
        .collect()
}

pub fn thread_count(sys: &SysRoot, cpuinfo: Option<&str>) -> Option<u32> {
    let dirs = logical_cpu_dirs(sys).len();
    if dirs > 0 {
        return u32::try_from(dirs).ok();
    }
    let records = cpuinfo?
        .lines()
        .filter_map(cpuinfo_field)
        .filter(|(key, _)| key == "processor")
        .count();
    (records > 0).then(|| u32::try_from(records).ok()).flatten()
}

/// Distinct (package, core) pairs from the sysfs topology files.
pub fn sysfs_core_count(sys: &SysRoot) -> Option<u32> {
    let mut cores = HashSet::new();
    for dir in logical_cpu_dirs(sys) {
        let topology = dir.join("topology");
        let Some(core_id) = read_first_line(&topology.join("core_id")) else {
            continue;
        };
        let package_id =
            read_first_line(&topology.join("physical_package_id")).unwrap_or_else(|| "0".into());
        cores.insert((package_id, core_id));
    }
    (!cores.is_empty()).then(|| u32::try_from(cores.len()).ok()).flatten()
}

/// Core count from cpuinfo blocks, falling back to `cpu cores` x sockets.
pub fn cpuinfo_core_count(cpuinfo: &str) -> Option<u32> {
    let mut cores: HashSet<(String, String)> = HashSet::new();
    let mut physical_ids: HashSet<String> = HashSet::new();
    let mut block_physical: Option<String> = None;
    let mut block_core: Option<String> = None;
    let mut cores_per_socket = 0u32;

    let mut flush = |physical: &mut Option<String>, core: &mut Option<String>| {
        if let Some(core) = core.take() {
            cores.insert((physical.take().unwrap_or_else(|| "0".into()), core));
        }
        *physical = None;
    };

    for line in cpuinfo.lines() {
        if line.trim().is_empty() {
            flush(&mut block_physical, &mut block_core);
            continue;
        }
        let Some((key, value)) = cpuinfo_field(line) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "physical id" => {
                block_physical = Some(value.to_string());
                physical_ids.insert(value.to_string());
            }
            "core id" => block_core = Some(value.to_string()),
            "cpu cores" => {
                if let Ok(parsed) = value.parse::<u32>() {
                    cores_per_socket = cores_per_socket.max(parsed);
                }
            }
            _ => {}
        }
    }
    flush(&mut block_physical, &mut block_core);

    if !cores.is_empty() {
        return u32::try_from(cores.len()).ok();
    }
    if cores_per_socket > 0 {
        let sockets = physical_ids.len().max(1) as u32;
        return Some(cores_per_socket * sockets);
    }
    None
}

pub fn core_count(sys: &SysRoot, cpuinfo: Option<&str>) -> Option<u32> {
    sysfs_core_count(sys).or_else(|| cpuinfo.and_then(cpuinfo_core_count))
}

/// Idle and total jiffies of the aggregate `cpu` line of `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTicks {
    pub idle: u64,
    pub total: u64,
}

impl CpuTicks {
    pub fn parse(stat: &str) -> Option<Self> {
        let mut fields = stat.lines().next()?.split_whitespace();
        if fields.next()? != "cpu" {
            return None;
        }
        let counters: Vec<u64> = fields
            .take(8)
            .map(|field| field.parse::<u64>().ok())
            .collect::<Option<Vec<u64>>>()?;
        if counters.len() < 8 {
            return None;
        }
        // user nice system idle iowait irq softirq steal
        let idle = counters[3] + counters[4];
        let total = counters.iter().sum();
        Some(Self { idle, total })
    }
}

/// Usage is a rate, so it needs the previous poll's counters.
#[derive(Debug, Default, Clone)]
pub struct CpuUsageSampler {
    previous: Option<CpuTicks>,
}

impl CpuUsageSampler {
    pub fn sample(&mut self, ticks: CpuTicks) -> Option<f64> {
        let previous = self.previous.replace(ticks);
        let previous = previous?;
        if ticks.total < previous.total || ticks.idle < previous.idle {
            debug!("cpu tick counters went backwards, rebaselining");
            return None;
        }

        let total_delta = ticks.total - previous.total;
        let idle_delta = ticks.idle - previous.idle;
        if total_delta == 0 {
            return None;
        }
        let usage = 100.0 * (1.0 - idle_delta as f64 / total_delta as f64);
        Some(usage.clamp(0.0, 100.0))
    }
}

/// Package power from the powercap energy counter.
#[derive(Debug, Default, Clone)]
pub struct RaplSampler {
    energy_path: Option<PathBuf>,
    located: bool,
    previous: Option<(u64, Instant)>,
}

impl RaplSampler {
    /// Highest-scoring powercap domain exposing `energy_uj`.
    pub fn locate(sys: &SysRoot) -> Option<PathBuf> {
        let mut best: BestPick<usize> = BestPick::default();
        let domains = sys.entries("/sys/class/powercap");
        for (index, domain) in domains.iter().enumerate() {
            if !domain.join("energy_uj").exists() {
                continue;
            }
            let name = read_first_line(&domain.join("name"))
                .unwrap_or_default()
                .to_lowercase();
            best.offer(rapl_domain_score(&name), index);
        }
        best.value().map(|index| domains[index].join("energy_uj"))
    }

    pub fn sample(&mut self, sys: &SysRoot, now: Instant) -> Option<f64> {
        if !self.located {
            self.energy_path = Self::locate(sys);
            self.located = true;
        }
        let path = self.energy_path.as_ref()?;
        let energy_uj = read_i64(path).and_then(|value| u64::try_from(value).ok())?;
        self.sample_energy(energy_uj, now)
    }

    pub fn sample_energy(&mut self, energy_uj: u64, now: Instant) -> Option<f64> {
        let previous = self.previous.replace((energy_uj, now));
        let (previous_uj, previous_at) = previous?;
        let elapsed = now.saturating_duration_since(previous_at).as_secs_f64();
        if energy_uj < previous_uj || elapsed <= 0.0 {
            return None;
        }
        plausible_watts((energy_uj - previous_uj) as f64 / elapsed / 1_000_000.0)
    }
}

/// Poll-to-poll state owned by the collector.
#[derive(Debug, Default, Clone)]
pub struct CpuState {
    pub usage: CpuUsageSampler,
    pub rapl: RaplSampler,
}

pub fn collect_cpu_metrics(
    sys: &SysRoot,
    state: &mut CpuState,
    sensors: &SensorsFallback,
    now: Instant,
) -> CpuMetrics {
    let cpuinfo = sys.read_to_string("/proc/cpuinfo");
    let cpuinfo = cpuinfo.as_deref();

    let mut total_cores = core_count(sys, cpuinfo);
    let total_threads = thread_count(sys, cpuinfo);
    if let (Some(cores), Some(threads)) = (total_cores, total_threads) {
        if cores > threads {
            total_cores = Some(threads);
        }
    }

    let thermal = ThermalZoneProbe { sys }.probe();
    let temperature_c = fuse_cpu_temperature(&thermal, || HwmonTempProbe { sys }.probe());

    let usage_percent = sys
        .read_to_string("/proc/stat")
        .as_deref()
        .and_then(CpuTicks::parse)
        .and_then(|ticks| state.usage.sample(ticks));

    let power_w = state.rapl.sample(sys, now).or(sensors.cpu_power_w);

    CpuMetrics {
        name: cpuinfo.map(parse_cpu_name).unwrap_or_else(|| "Unknown CPU".into()),
        total_cores,
        total_threads,
        temperature_c,
        frequency_mhz: average_frequency_mhz(sys, cpuinfo),
        usage_percent,
        fan_rpm: sensors.cpu_fan_rpm,
        power_w,
    }
}
