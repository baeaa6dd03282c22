//! Token-weight tables that encode which physical sensor a reading most
//! likely belongs to.
//!
//! Each rule is data, so the tables can be asserted rule by rule. Scores
//! compare with `>`: on equal scores the first reading seen keeps the slot.

use crate::utils::contains_any;

/// Thermal-zone `type` substrings that identify a CPU package/die sensor.
pub const THERMAL_ZONE_CPU_TOKENS: &[&str] = &["cpu", "package", "x86_pkg_temp", "tctl", "tdie"];

/// hwmon chip names of CPU temperature drivers.
pub const CPU_CHIP_TOKENS: &[&str] = &["k10temp", "coretemp", "zenpower", "cpu"];

/// hwmon `temp*_label` substrings that identify a CPU reading.
pub const CPU_TEMP_LABEL_TOKENS: &[&str] = &["cpu", "package", "tctl", "tdie", "die"];

/// Chip names of drivers that export CPU package power.
pub const CPU_POWER_CHIP_TOKENS: &[&str] =
    &["k10temp", "coretemp", "zenpower", "fam15h_power", "rapl"];

pub const GPU_CHIP_TOKENS: &[&str] = &["amdgpu", "nvidia", "nouveau", "radeon"];

/// Super-I/O and vendor board monitor chips; their fan headers usually
/// include the CPU fan.
pub const BOARD_CHIP_PREFIXES: &[&str] = &["nct", "it", "f718", "w83"];
pub const BOARD_CHIP_TOKENS: &[&str] = &["asus", "gigabyte"];

/// Powercap domain name weights used to pick the CPU energy counter.
pub const RAPL_DOMAIN_WEIGHTS: &[(&str, i32)] = &[("package", 100), ("cpu", 60), ("psys", 30)];

pub fn rapl_domain_score(lower_name: &str) -> i32 {
    RAPL_DOMAIN_WEIGHTS
        .iter()
        .filter(|(token, _)| lower_name.contains(token))
        .map(|(_, weight)| weight)
        .sum()
}

/// Which chip family a `sensors` adapter header belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipClass {
    Cpu,
    CpuPower,
    Board,
    Gpu,
}

impl ChipClass {
    pub fn matches(self, lower_chip: &str) -> bool {
        match self {
            ChipClass::Cpu => contains_any(lower_chip, CPU_CHIP_TOKENS),
            ChipClass::CpuPower => contains_any(lower_chip, CPU_POWER_CHIP_TOKENS),
            ChipClass::Board => {
                BOARD_CHIP_PREFIXES
                    .iter()
                    .any(|prefix| lower_chip.starts_with(prefix))
                    || contains_any(lower_chip, BOARD_CHIP_TOKENS)
            }
            ChipClass::Gpu => contains_any(lower_chip, GPU_CHIP_TOKENS),
        }
    }
}

/// Adds its weights once when any of `tokens` occurs in the reading's line.
#[derive(Debug, Clone, Copy)]
pub struct LineRule {
    pub tokens: &'static [&'static str],
    pub cpu: i32,
    pub gpu: i32,
}

/// Adds its weights when the reading's chip header belongs to `class`.
#[derive(Debug, Clone, Copy)]
pub struct ChipRule {
    pub class: ChipClass,
    pub cpu: i32,
    pub gpu: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct WeightTable {
    pub line: &'static [LineRule],
    pub chip: &'static [ChipRule],
}

pub const FAN_WEIGHTS: WeightTable = WeightTable {
    line: &[
        LineRule { tokens: &["cpu"], cpu: 120, gpu: 0 },
        LineRule { tokens: &["fan"], cpu: 10, gpu: 10 },
        LineRule { tokens: &["pump"], cpu: -40, gpu: 0 },
        LineRule { tokens: &["gpu"], cpu: 0, gpu: 120 },
    ],
    chip: &[
        ChipRule { class: ChipClass::Gpu, cpu: 0, gpu: 60 },
        ChipRule { class: ChipClass::Board, cpu: 25, gpu: 0 },
        ChipRule { class: ChipClass::Cpu, cpu: 20, gpu: 0 },
    ],
};

pub const POWER_WEIGHTS: WeightTable = WeightTable {
    line: &[
        LineRule {
            tokens: &["cpu", "package", "ppt", "svi2", "socket"],
            cpu: 120,
            gpu: 0,
        },
        LineRule { tokens: &["gpu"], cpu: 0, gpu: 120 },
    ],
    chip: &[
        ChipRule { class: ChipClass::CpuPower, cpu: 60, gpu: 0 },
        ChipRule { class: ChipClass::Gpu, cpu: 0, gpu: 60 },
    ],
};

/// Score of one reading towards each device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Affinity {
    pub cpu: i32,
    pub gpu: i32,
}

impl WeightTable {
    /// Both arguments are expected lowercase.
    pub fn score(&self, line: &str, chip: &str) -> Affinity {
        let mut affinity = Affinity::default();
        for rule in self.line {
            if contains_any(line, rule.tokens) {
                affinity.cpu += rule.cpu;
                affinity.gpu += rule.gpu;
            }
        }
        for rule in self.chip {
            if rule.class.matches(chip) {
                affinity.cpu += rule.cpu;
                affinity.gpu += rule.gpu;
            }
        }
        affinity
    }
}

/// Running "highest score wins" selection; ties keep the earlier value.
#[derive(Debug, Clone, Copy)]
pub struct BestPick<T> {
    best_score: i32,
    value: Option<T>,
}

impl<T: Copy> Default for BestPick<T> {
    fn default() -> Self {
        Self {
            best_score: -1,
            value: None,
        }
    }
}

impl<T: Copy> BestPick<T> {
    pub fn offer(&mut self, score: i32, value: T) {
        if score > self.best_score {
            self.best_score = score;
            self.value = Some(value);
        }
    }

    pub fn value(&self) -> Option<T> {
        self.value
    }
}
