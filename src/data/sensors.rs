//! `sensors` text as a last-resort source for fan speeds and power draw.
//!
//! Every RPM or wattage token becomes a [`SensorReading`] carrying the chip
//! header it appeared under; the weight tables then decide which reading
//! belongs to the CPU and which to the GPU.

use super::command::{CommandRunner, TimedCache};
use super::scoring::{BestPick, WeightTable, FAN_WEIGHTS, POWER_WEIGHTS};
use super::Probe;
use crate::utils::{extract_rpm, extract_watts};
use std::time::{Duration, Instant};

pub const SENSORS_PROGRAM: &str = "sensors";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingKind {
    Rpm,
    Watts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub kind: ReadingKind,
    pub value: f64,
    /// Lowercased, trimmed line the value was found on.
    pub line: String,
    /// Lowercased chip header the line belongs to, empty before the first one.
    pub chip: String,
}

/// Chip headers sit at column zero and carry no `key: value` separator.
fn is_chip_header(raw_line: &str, trimmed: &str) -> bool {
    !raw_line.starts_with([' ', '\t']) && !trimmed.contains(':')
}

pub fn parse_sensors_output(output: &str) -> Vec<SensorReading> {
    let mut readings = Vec::new();
    let mut chip = String::new();

    for raw_line in output.lines() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_chip_header(raw_line, trimmed) {
            chip = trimmed.to_lowercase();
            continue;
        }

        let line = trimmed.to_lowercase();
        if let Some(rpm) = extract_rpm(&line).filter(|rpm| *rpm > 0.0) {
            readings.push(SensorReading {
                kind: ReadingKind::Rpm,
                value: rpm,
                line: line.clone(),
                chip: chip.clone(),
            });
        }
        if let Some(watts) = extract_watts(&line) {
            readings.push(SensorReading {
                kind: ReadingKind::Watts,
                value: watts,
                line,
                chip: chip.clone(),
            });
        }
    }
    readings
}

/// Fan and power values attributed to each device.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorsFallback {
    pub cpu_fan_rpm: Option<f64>,
    pub cpu_power_w: Option<f64>,
    pub gpu_fan_rpm: Option<f64>,
    pub gpu_power_w: Option<f64>,
}

#[derive(Default)]
struct DevicePicks {
    cpu: BestPick<f64>,
    gpu: BestPick<f64>,
}

impl DevicePicks {
    fn offer(&mut self, table: &WeightTable, reading: &SensorReading) {
        let affinity = table.score(&reading.line, &reading.chip);
        self.cpu.offer(affinity.cpu, reading.value);
        self.gpu.offer(affinity.gpu, reading.value);
    }
}

pub fn attribute_readings(readings: &[SensorReading]) -> SensorsFallback {
    let mut fans = DevicePicks::default();
    let mut power = DevicePicks::default();
    for reading in readings {
        match reading.kind {
            ReadingKind::Rpm => fans.offer(&FAN_WEIGHTS, reading),
            ReadingKind::Watts => power.offer(&POWER_WEIGHTS, reading),
        }
    }
    SensorsFallback {
        cpu_fan_rpm: fans.cpu.value(),
        cpu_power_w: power.cpu.value(),
        gpu_fan_rpm: fans.gpu.value(),
        gpu_power_w: power.gpu.value(),
    }
}

pub struct SensorsProbe<'a> {
    pub runner: &'a dyn CommandRunner,
}

impl Probe for SensorsProbe<'_> {
    type Reading = SensorReading;

    fn probe(&self) -> Vec<SensorReading> {
        self.runner
            .run(SENSORS_PROGRAM, &[])
            .map(|output| parse_sensors_output(&output))
            .unwrap_or_default()
    }
}

/// Keeps the attributed result for a short TTL so `sensors` is not spawned
/// on every poll.
pub struct SensorsSource {
    cache: TimedCache<SensorsFallback>,
}

impl SensorsSource {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: TimedCache::new(ttl),
        }
    }

    pub fn read(&mut self, runner: &dyn CommandRunner, now: Instant) -> SensorsFallback {
        self.cache
            .get_or_refresh(now, || attribute_readings(&SensorsProbe { runner }.probe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::command::testing::ScriptedRunner;

    const DESKTOP: &str = "\
k10temp-pci-00c3
Adapter: PCI adapter
Tctl:         +52.1°C

nct6798-isa-0290
Adapter: ISA adapter
fan1:                     0 RPM  (min =    0 RPM)
fan2:                   912 RPM  (min =    0 RPM)
pump_fan:              2400 RPM  (min =    0 RPM)

amdgpu-pci-0300
Adapter: PCI adapter
vddgfx:      806.00 mV
fan1:        1320 RPM  (min =    0 RPM, max = 3300 RPM)
edge:         +48.0°C
PPT:          38.00 W  (cap = 203.00 W)

zenpower-pci-00c3
Adapter: PCI adapter
SVI2_P_Core:  45.20 W
";

    #[test]
    fn chip_context_follows_headers() {
        let readings = parse_sensors_output(DESKTOP);
        let rpm: Vec<(&str, f64)> = readings
            .iter()
            .filter(|reading| reading.kind == ReadingKind::Rpm)
            .map(|reading| (reading.chip.as_str(), reading.value))
            .collect();
        assert_eq!(
            rpm,
            vec![
                ("nct6798-isa-0290", 912.0),
                ("nct6798-isa-0290", 2400.0),
                ("amdgpu-pci-0300", 1320.0),
            ]
        );
        // "Adapter:" lines contain ':' so they are never mistaken for headers.
        assert!(readings.iter().all(|reading| !reading.chip.starts_with("adapter")));
    }

    #[test]
    fn attribution_by_affinity() {
        let fallback = attribute_readings(&parse_sensors_output(DESKTOP));
        assert_eq!(fallback.cpu_fan_rpm, Some(912.0));
        assert_eq!(fallback.gpu_fan_rpm, Some(1320.0));
        assert_eq!(fallback.cpu_power_w, Some(45.2));
        assert_eq!(fallback.gpu_power_w, Some(38.0));
    }

    #[test]
    fn empty_output_yields_nothing() {
        assert_eq!(attribute_readings(&parse_sensors_output("")), SensorsFallback::default());
    }

    #[test]
    fn source_caches_tool_output() {
        let mut runner = ScriptedRunner::default().with(SENSORS_PROGRAM, "it8688-isa-0a40\nfan1: 1000 RPM\n");
        let mut source = SensorsSource::new(Duration::from_millis(900));
        let start = Instant::now();

        assert_eq!(source.read(&runner, start).cpu_fan_rpm, Some(1000.0));
        runner.set(SENSORS_PROGRAM, "it8688-isa-0a40\nfan1: 2000 RPM\n");
        assert_eq!(source.read(&runner, start + Duration::from_millis(500)).cpu_fan_rpm, Some(1000.0));
        assert_eq!(runner.calls(SENSORS_PROGRAM), 1);

        assert_eq!(source.read(&runner, start + Duration::from_millis(950)).cpu_fan_rpm, Some(2000.0));
        assert_eq!(runner.calls(SENSORS_PROGRAM), 2);
    }
}
