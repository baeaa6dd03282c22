//! GPU discovery and fusion.
//!
//! `nvidia-smi` is authoritative when it reports anything; the DRM sysfs tree
//! fills in what it lacks and contributes every card it did not claim.

use super::command::{CommandRunner, TimedCache};
use super::sysfs::{
    file_name, list_dir_entries, read_first_existing_i64, read_first_line, read_i64, SysRoot,
};
use super::Probe;
use crate::data::snapshot::GpuMetrics;
use crate::utils::{micro_watts_to_watts, normalize_percent, normalize_temperature_c, parse_optional_f64};
use log::debug;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub const NVIDIA_SMI_PROGRAM: &str = "nvidia-smi";
pub const NVIDIA_SMI_ARGS: &[&str] = &[
    "--query-gpu=name,temperature.gpu,clocks.sm,utilization.gpu,power.draw,memory.used,memory.total",
    "--format=csv,noheader,nounits",
];

const HWMON_POWER_FILES: &[&str] = &[
    "power1_average",
    "power1_input",
    "power2_average",
    "power2_input",
    "power_average",
    "power_input",
];

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

pub fn vendor_name(vendor_id: Option<&str>) -> String {
    let Some(id) = vendor_id else {
        return "Unknown".to_string();
    };
    match id.to_lowercase().as_str() {
        "0x10de" => "NVIDIA".to_string(),
        "0x1002" => "AMD".to_string(),
        "0x8086" => "Intel".to_string(),
        _ => format!("Vendor {id}"),
    }
}

pub fn parse_nvidia_smi(output: &str) -> Vec<GpuMetrics> {
    let mut gpus = Vec::new();
    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 7 {
            debug!("skipping short nvidia-smi row: {line}");
            continue;
        }
        let mut gpu = GpuMetrics {
            name: fields[0].to_string(),
            source: NVIDIA_SMI_PROGRAM.to_string(),
            temperature_c: parse_optional_f64(fields[1]),
            core_clock_mhz: parse_optional_f64(fields[2]),
            utilization_percent: parse_optional_f64(fields[3]),
            power_w: parse_optional_f64(fields[4]),
            memory_used_mib: parse_optional_f64(fields[5]),
            memory_total_mib: parse_optional_f64(fields[6]),
            ..Default::default()
        };
        gpu.memory_utilization_percent = gpu.derived_memory_percent();
        gpus.push(gpu);
    }
    gpus
}

pub struct NvidiaSmiProbe<'a> {
    pub runner: &'a dyn CommandRunner,
}

impl Probe for NvidiaSmiProbe<'_> {
    type Reading = GpuMetrics;

    fn probe(&self) -> Vec<GpuMetrics> {
        self.runner
            .run(NVIDIA_SMI_PROGRAM, NVIDIA_SMI_ARGS)
            .map(|output| parse_nvidia_smi(&output))
            .unwrap_or_default()
    }
}

fn active_sclk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r":\s*([0-9]+(?:\.[0-9]+)?)\s*[Mm][Hh][Zz].*\*").expect("valid regex")
    })
}

/// The `*`-marked level of an amdgpu `pp_dpm_sclk` table.
pub fn parse_active_sclk_mhz(table: &str) -> Option<f64> {
    table.lines().find_map(|line| {
        let caps = active_sclk_re().captures(line)?;
        caps.get(1)?.as_str().parse::<f64>().ok()
    })
}

pub fn hwmon_power_watts(hwmon_dir: &Path) -> Option<f64> {
    HWMON_POWER_FILES
        .iter()
        .filter_map(|name| read_i64(&hwmon_dir.join(name)))
        .find_map(micro_watts_to_watts)
}

/// A DRM card directory such as `card0`; connectors like `card0-DP-1` are not cards.
fn is_card_name(name: &str) -> bool {
    name.starts_with("card") && !name.contains('-')
}

fn is_display_class(device: &Path) -> bool {
    match read_first_line(&device.join("class")) {
        Some(class) => class.to_lowercase().starts_with("0x03"),
        None => true,
    }
}

fn driver_name(device: &Path) -> Option<String> {
    if let Ok(target) = std::fs::read_link(device.join("driver")) {
        let name = file_name(&target);
        if !name.is_empty() {
            return Some(name);
        }
    }
    let uevent = std::fs::read_to_string(device.join("uevent")).ok()?;
    uevent
        .lines()
        .find_map(|line| line.strip_prefix("DRIVER="))
        .map(|driver| driver.trim().to_string())
        .filter(|driver| !driver.is_empty())
}

/// Whether a display hangs off this card. Unknown when the kernel exposes no
/// connectors for it.
fn card_in_use(drm_dir: &Path, card: &str, device: &Path) -> Option<bool> {
    let prefix = format!("{card}-");
    let statuses: Vec<String> = list_dir_entries(drm_dir)
        .into_iter()
        .filter(|entry| file_name(entry).starts_with(&prefix))
        .filter_map(|entry| read_first_line(&entry.join("status")))
        .collect();
    if statuses.is_empty() {
        return None;
    }
    if statuses.iter().any(|status| status == "connected") {
        return Some(true);
    }
    Some(read_i64(&device.join("boot_vga")) == Some(1))
}

fn hwmon_readings(device: &Path) -> (Option<f64>, Option<f64>) {
    let mut temperature = None;
    let mut power = None;
    for sensor in list_dir_entries(&device.join("hwmon")) {
        if !sensor.is_dir() {
            continue;
        }
        if power.is_none() {
            power = hwmon_power_watts(&sensor);
        }
        if temperature.is_none() {
            temperature = list_dir_entries(&sensor)
                .into_iter()
                .filter(|file| {
                    let name = file_name(file);
                    name.starts_with("temp") && name.ends_with("_input")
                })
                .find_map(|file| read_i64(&file).and_then(normalize_temperature_c));
        }
    }
    (temperature, power)
}

fn vram_mib(device: &Path) -> (Option<f64>, Option<f64>) {
    let used = read_first_existing_i64(&[
        device.join("mem_info_vram_used"),
        device.join("mem_info_vis_vram_used"),
    ]);
    let total = read_first_existing_i64(&[
        device.join("mem_info_vram_total"),
        device.join("mem_info_vis_vram_total"),
    ]);
    match (used, total) {
        (Some(used), Some(total)) if total > 0 && used >= 0 => (
            Some(used as f64 / BYTES_PER_MIB),
            Some(total as f64 / BYTES_PER_MIB),
        ),
        _ => (None, None),
    }
}

pub struct DrmProbe<'a> {
    pub sys: &'a SysRoot,
}

impl DrmProbe<'_> {
    fn read_card(&self, drm_dir: &Path, card_dir: &Path) -> Option<GpuMetrics> {
        let card = file_name(card_dir);
        let device = card_dir.join("device");
        if !device.exists() || !is_display_class(&device) {
            return None;
        }

        let vendor = read_first_line(&device.join("vendor"));
        let source = match driver_name(&device) {
            Some(driver) => format!("sysfs/{driver}"),
            None => "sysfs".to_string(),
        };
        let (temperature_c, power_w) = hwmon_readings(&device);
        let core_clock_mhz = read_i64(&device.join("gt_cur_freq_mhz"))
            .filter(|mhz| *mhz > 0)
            .map(|mhz| mhz as f64)
            .or_else(|| {
                std::fs::read_to_string(device.join("pp_dpm_sclk"))
                    .ok()
                    .as_deref()
                    .and_then(parse_active_sclk_mhz)
            });
        let (memory_used_mib, memory_total_mib) = vram_mib(&device);

        let mut gpu = GpuMetrics {
            name: format!("{card} ({})", vendor_name(vendor.as_deref())),
            source,
            in_use: card_in_use(drm_dir, &card, &device),
            temperature_c,
            core_clock_mhz,
            utilization_percent: read_i64(&device.join("gpu_busy_percent"))
                .and_then(normalize_percent),
            power_w,
            memory_used_mib,
            memory_total_mib,
            memory_utilization_percent: None,
        };
        gpu.memory_utilization_percent = gpu.derived_memory_percent();
        Some(gpu)
    }
}

impl Probe for DrmProbe<'_> {
    type Reading = GpuMetrics;

    fn probe(&self) -> Vec<GpuMetrics> {
        let drm_dir = self.sys.path("/sys/class/drm");
        list_dir_entries(&drm_dir)
            .into_iter()
            .filter(|entry| is_card_name(&file_name(entry)))
            .filter_map(|card_dir| self.read_card(&drm_dir, &card_dir))
            .collect()
    }
}

/// Weighted count of populated fields; higher means a more useful record.
pub fn telemetry_score(gpu: &GpuMetrics) -> u32 {
    let mut score = 0;
    if gpu.temperature_c.is_some() {
        score += 2;
    }
    if gpu.core_clock_mhz.is_some() {
        score += 2;
    }
    if gpu.utilization_percent.is_some() {
        score += 3;
    }
    if gpu.power_w.is_some() {
        score += 2;
    }
    if gpu.memory_used_mib.is_some() || gpu.memory_total_mib.is_some() {
        score += 2;
    }
    if gpu.memory_utilization_percent.is_some() {
        score += 1;
    }
    score
}

/// Best-first by score, then by name.
pub fn rank_gpus(gpus: &mut [GpuMetrics]) {
    gpus.sort_by(|a, b| {
        telemetry_score(b)
            .cmp(&telemetry_score(a))
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn supplement(base: &mut GpuMetrics, extra: &GpuMetrics) {
    base.in_use = base.in_use.or(extra.in_use);
    base.temperature_c = base.temperature_c.or(extra.temperature_c);
    base.core_clock_mhz = base.core_clock_mhz.or(extra.core_clock_mhz);
    base.utilization_percent = base.utilization_percent.or(extra.utilization_percent);
    base.power_w = base.power_w.or(extra.power_w);
    base.memory_used_mib = base.memory_used_mib.or(extra.memory_used_mib);
    base.memory_total_mib = base.memory_total_mib.or(extra.memory_total_mib);
    base.memory_utilization_percent = base
        .memory_utilization_percent
        .or(extra.memory_utilization_percent);
}

fn mentions_nvidia(gpu: &GpuMetrics) -> bool {
    gpu.name.to_lowercase().contains("nvidia") || gpu.source.to_lowercase().contains("nvidia")
}

/// Index of the sysfs record a tool record should borrow fields from.
fn pick_supplement(sysfs: &[GpuMetrics], consumed: &[bool]) -> Option<usize> {
    let unused = || (0..sysfs.len()).filter(move |index| !consumed[*index]);
    unused()
        .find(|index| mentions_nvidia(&sysfs[*index]))
        .or_else(|| unused().next())
}

/// Merge both probe results into one ranked list.
///
/// `gpu_power_fallback` is the sensors-attributed GPU wattage, used for any
/// record that still has no power reading.
pub fn fuse_gpus(
    tool: Vec<GpuMetrics>,
    sysfs: Vec<GpuMetrics>,
    gpu_power_fallback: Option<f64>,
) -> Vec<GpuMetrics> {
    let mut fused = if tool.is_empty() {
        let mut kept: Vec<GpuMetrics> = sysfs
            .into_iter()
            .filter(GpuMetrics::has_telemetry)
            .collect();
        for gpu in &mut kept {
            gpu.power_w = gpu.power_w.or(gpu_power_fallback);
        }
        kept
    } else {
        let mut consumed = vec![false; sysfs.len()];
        let mut merged = tool;
        for gpu in &mut merged {
            if let Some(index) = pick_supplement(&sysfs, &consumed) {
                consumed[index] = true;
                supplement(gpu, &sysfs[index]);
            }
            gpu.power_w = gpu.power_w.or(gpu_power_fallback);
            if gpu.memory_utilization_percent.is_none() {
                gpu.memory_utilization_percent = gpu.derived_memory_percent();
            }
        }
        merged.extend(
            sysfs
                .into_iter()
                .zip(consumed)
                .filter(|(_, used)| !used)
                .map(|(gpu, _)| gpu),
        );
        merged
    };
    rank_gpus(&mut fused);
    fused
}

fn looks_intel(gpu: &GpuMetrics) -> bool {
    let name = gpu.name.to_lowercase();
    let source = gpu.source.to_lowercase();
    name.contains("intel") || ["intel", "i915", "xe"].iter().any(|token| source.contains(token))
}

fn looks_radeon(gpu: &GpuMetrics) -> bool {
    gpu.name.to_lowercase().contains("radeon") || gpu.source.to_lowercase().contains("radeon")
}

/// The GPU the panels and history follow.
pub fn pick_display_gpu_index(gpus: &[GpuMetrics]) -> Option<usize> {
    let first = gpus.first()?;
    if looks_radeon(first) && !first.has_telemetry() {
        let intel_with_telemetry = gpus
            .iter()
            .position(|gpu| looks_intel(gpu) && gpu.has_telemetry());
        return intel_with_telemetry
            .or_else(|| gpus.iter().position(GpuMetrics::has_telemetry))
            .or_else(|| gpus.iter().position(looks_intel))
            .or(Some(0));
    }
    gpus.iter().position(GpuMetrics::has_telemetry).or(Some(0))
}

pub fn pick_in_use_gpu_index(gpus: &[GpuMetrics]) -> Option<usize> {
    gpus.iter()
        .position(GpuMetrics::is_in_use)
        .or_else(|| pick_display_gpu_index(gpus))
}

/// GPUs worth a line of their own besides the displayed one.
pub fn count_additional_relevant_gpus(gpus: &[GpuMetrics], shown: Option<usize>) -> usize {
    gpus.iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != shown)
        .filter(|(_, gpu)| gpu.has_telemetry() || gpu.is_in_use())
        .count()
}

/// Runs both probes once per poll, with the tool output cached.
pub struct GpuSource {
    nvidia_cache: TimedCache<Vec<GpuMetrics>>,
}

impl GpuSource {
    pub fn new(ttl: Duration) -> Self {
        Self {
            nvidia_cache: TimedCache::new(ttl),
        }
    }

    pub fn collect(
        &mut self,
        sys: &SysRoot,
        runner: &dyn CommandRunner,
        gpu_power_fallback: Option<f64>,
        now: Instant,
    ) -> Vec<GpuMetrics> {
        let tool = self
            .nvidia_cache
            .get_or_refresh(now, || NvidiaSmiProbe { runner }.probe());
        let sysfs = DrmProbe { sys }.probe();
        fuse_gpus(tool, sysfs, gpu_power_fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::command::testing::ScriptedRunner;
    use crate::data::sysfs::fixture;
    use proptest::prelude::*;

    fn named(name: &str) -> GpuMetrics {
        GpuMetrics {
            name: name.into(),
            source: "sysfs".into(),
            ..Default::default()
        }
    }

    #[test]
    fn nvidia_smi_rows() {
        let output = "NVIDIA GeForce RTX 3080, 54, 1905, 37, 112.45, 2048, 10240\n\
                      NVIDIA T400, [Not Supported], 300, 0, [N/A], 10, 0\n\
                      truncated, 1, 2\n";
        let gpus = parse_nvidia_smi(output);
        assert_eq!(gpus.len(), 2);
        assert_eq!(gpus[0].name, "NVIDIA GeForce RTX 3080");
        assert_eq!(gpus[0].source, "nvidia-smi");
        assert_eq!(gpus[0].power_w, Some(112.45));
        assert_eq!(gpus[0].memory_utilization_percent, Some(20.0));
        assert_eq!(gpus[1].temperature_c, None);
        assert_eq!(gpus[1].power_w, None);
        assert_eq!(gpus[1].memory_utilization_percent, None);
    }

    #[test]
    fn sclk_table_active_level() {
        let table = "0: 500Mhz \n1: 1200Mhz *\n2: 2100Mhz \n";
        assert_eq!(parse_active_sclk_mhz(table), Some(1200.0));
        assert_eq!(parse_active_sclk_mhz("0: 500Mhz\n"), None);
    }

    #[test]
    fn vendor_names() {
        assert_eq!(vendor_name(Some("0x10DE")), "NVIDIA");
        assert_eq!(vendor_name(Some("0x1af4")), "Vendor 0x1af4");
        assert_eq!(vendor_name(None), "Unknown");
    }

    #[test]
    fn drm_probe_reads_amd_card() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let device = "/sys/class/drm/card1/device";
        fixture::write(root, &format!("{device}/vendor"), "0x1002\n");
        fixture::write(root, &format!("{device}/class"), "0x030000\n");
        fixture::write(root, &format!("{device}/uevent"), "DRIVER=amdgpu\nPCI_ID=1002:73BF\n");
        fixture::write(root, &format!("{device}/gpu_busy_percent"), "42\n");
        fixture::write(root, &format!("{device}/pp_dpm_sclk"), "0: 500Mhz\n1: 2250Mhz *\n");
        fixture::write(root, &format!("{device}/mem_info_vram_used"), "1073741824\n");
        fixture::write(root, &format!("{device}/mem_info_vram_total"), "4294967296\n");
        fixture::write(root, &format!("{device}/hwmon/hwmon3/temp1_input"), "61000\n");
        fixture::write(root, &format!("{device}/hwmon/hwmon3/power1_average"), "0\n");
        fixture::write(root, &format!("{device}/hwmon/hwmon3/power1_input"), "95000000\n");
        fixture::write(root, "/sys/class/drm/card1-DP-1/status", "disconnected\n");
        fixture::write(root, "/sys/class/drm/card1-HDMI-A-1/status", "connected\n");
        // Audio function on the same bus is not a display controller.
        fixture::write(root, "/sys/class/drm/card2/device/class", "0x040300\n");
        fixture::mkdir(root, "/sys/class/drm/renderD128");

        let gpus = DrmProbe { sys: &SysRoot::new(root) }.probe();
        assert_eq!(gpus.len(), 1);
        let gpu = &gpus[0];
        assert_eq!(gpu.name, "card1 (AMD)");
        assert_eq!(gpu.source, "sysfs/amdgpu");
        assert_eq!(gpu.in_use, Some(true));
        assert_eq!(gpu.temperature_c, Some(61.0));
        assert_eq!(gpu.power_w, Some(95.0));
        assert_eq!(gpu.core_clock_mhz, Some(2250.0));
        assert_eq!(gpu.utilization_percent, Some(42.0));
        assert_eq!(gpu.memory_used_mib, Some(1024.0));
        assert_eq!(gpu.memory_total_mib, Some(4096.0));
        assert_eq!(gpu.memory_utilization_percent, Some(25.0));
    }

    #[cfg(unix)]
    #[test]
    fn drm_probe_intel_in_use_fallbacks() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fixture::write(root, "/sys/class/drm/card0/device/vendor", "0x8086\n");
        fixture::write(root, "/sys/class/drm/card0/device/gt_cur_freq_mhz", "1300\n");
        fixture::write(root, "/sys/class/drm/card0/device/boot_vga", "1\n");
        fixture::write(root, "/sys/class/drm/card0-eDP-1/status", "disconnected\n");
        fixture::symlink(root, "../../../bus/pci/drivers/i915", "/sys/class/drm/card0/device/driver");
        fixture::write(root, "/sys/class/drm/card1/device/vendor", "0x10de\n");

        let gpus = DrmProbe { sys: &SysRoot::new(root) }.probe();
        assert_eq!(gpus.len(), 2);
        assert_eq!(gpus[0].source, "sysfs/i915");
        assert_eq!(gpus[0].in_use, Some(true));
        assert_eq!(gpus[0].core_clock_mhz, Some(1300.0));
        assert_eq!(gpus[1].name, "card1 (NVIDIA)");
        assert_eq!(gpus[1].in_use, None);
        assert!(!gpus[1].has_telemetry());
    }

    #[test]
    fn sysfs_only_keeps_telemetry_cards() {
        let mut busy = named("card1 (AMD)");
        busy.utilization_percent = Some(12.0);
        let fused = fuse_gpus(Vec::new(), vec![named("card0 (Intel)"), busy], Some(30.0));
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].name, "card1 (AMD)");
        assert_eq!(fused[0].power_w, Some(30.0));
    }

    #[test]
    fn tool_records_prefer_nvidia_sysfs_entries() {
        let tool = parse_nvidia_smi("NVIDIA RTX A2000, 50, N/A, 10, N/A, 100, 400\n");
        let mut intel = named("card0 (Intel)");
        intel.core_clock_mhz = Some(900.0);
        let mut nvidia = named("card1 (NVIDIA)");
        nvidia.core_clock_mhz = Some(1700.0);
        nvidia.in_use = Some(false);

        let fused = fuse_gpus(tool, vec![intel, nvidia], Some(70.0));
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].name, "NVIDIA RTX A2000");
        assert_eq!(fused[0].core_clock_mhz, Some(1700.0));
        assert_eq!(fused[0].in_use, Some(false));
        assert_eq!(fused[0].power_w, Some(70.0));
        assert_eq!(fused[0].memory_utilization_percent, Some(25.0));
        assert_eq!(fused[1].name, "card0 (Intel)");
        assert_eq!(fused[1].power_w, None);
    }

    #[test]
    fn ranking_by_score_then_name() {
        let mut gpus = vec![named("b"), named("a"), named("c")];
        gpus[2].utilization_percent = Some(1.0);
        rank_gpus(&mut gpus);
        let names: Vec<&str> = gpus.iter().map(|gpu| gpu.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn display_pick_skips_dead_radeon() {
        let radeon = GpuMetrics {
            name: "AMD Radeon(TM) Graphics".into(),
            ..Default::default()
        };
        let mut intel = named("card0 (Intel)");
        intel.source = "sysfs/i915".into();
        let mut other = named("card2 (NVIDIA)");
        other.temperature_c = Some(40.0);

        assert_eq!(pick_display_gpu_index(&[radeon.clone(), other.clone(), intel.clone()]), Some(1));
        assert_eq!(pick_display_gpu_index(&[radeon.clone(), named("x"), intel.clone()]), Some(2));
        let mut busy_intel = intel.clone();
        busy_intel.utilization_percent = Some(3.0);
        assert_eq!(pick_display_gpu_index(&[radeon.clone(), other, busy_intel]), Some(2));
        assert_eq!(pick_display_gpu_index(&[radeon]), Some(0));
        assert_eq!(pick_display_gpu_index(&[]), None);
    }

    #[test]
    fn in_use_pick_and_relevant_count() {
        let mut first = named("a");
        first.temperature_c = Some(40.0);
        let mut second = named("b");
        second.in_use = Some(true);
        let gpus = vec![first, second, named("c")];

        assert_eq!(pick_display_gpu_index(&gpus), Some(0));
        assert_eq!(pick_in_use_gpu_index(&gpus), Some(1));
        assert_eq!(count_additional_relevant_gpus(&gpus, Some(0)), 1);
        assert_eq!(count_additional_relevant_gpus(&gpus, None), 2);
    }

    #[test]
    fn tool_output_is_cached() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::default().with(NVIDIA_SMI_PROGRAM, "GPU, 40, 1500, 5, 20, 1, 2\n");
        let sys = SysRoot::new(tmp.path());
        let mut source = GpuSource::new(Duration::from_millis(900));
        let start = Instant::now();

        assert_eq!(source.collect(&sys, &runner, None, start).len(), 1);
        assert_eq!(source.collect(&sys, &runner, None, start + Duration::from_millis(100)).len(), 1);
        assert_eq!(runner.calls(NVIDIA_SMI_PROGRAM), 1);
    }

    fn arb_gpu() -> impl Strategy<Value = GpuMetrics> {
        (
            "[a-z]{1,6}",
            any::<bool>(),
            proptest::option::of(0.0f64..100.0),
            proptest::option::of(0.0f64..3000.0),
            proptest::option::of(0.0f64..100.0),
        )
            .prop_map(|(name, nvidia, temperature_c, core_clock_mhz, utilization_percent)| {
                GpuMetrics {
                    name: if nvidia { format!("{name} nvidia") } else { name },
                    source: "sysfs".into(),
                    temperature_c,
                    core_clock_mhz,
                    utilization_percent,
                    ..Default::default()
                }
            })
    }

    proptest! {
        #[test]
        fn fusion_never_drops_tool_records_or_reuses_sysfs(
            tool in proptest::collection::vec(arb_gpu(), 1..4),
            sysfs in proptest::collection::vec(arb_gpu(), 1..6),
        ) {
            let tool: Vec<GpuMetrics> = tool
                .into_iter()
                .map(|mut gpu| { gpu.source = "nvidia-smi".into(); gpu })
                .collect();
            let fused = fuse_gpus(tool.clone(), sysfs.clone(), None);

            prop_assert!(fused.len() >= tool.len());
            let consumed = tool.len().min(sysfs.len());
            prop_assert_eq!(fused.len(), tool.len() + sysfs.len() - consumed);
            let tool_records = fused.iter().filter(|gpu| gpu.source == "nvidia-smi").count();
            prop_assert_eq!(tool_records, tool.len());
        }

        #[test]
        fn ranking_is_sorted_by_score(gpus in proptest::collection::vec(arb_gpu(), 0..8)) {
            let mut ranked = gpus;
            rank_gpus(&mut ranked);
            for pair in ranked.windows(2) {
                let (a, b) = (telemetry_score(&pair[0]), telemetry_score(&pair[1]));
                prop_assert!(a > b || (a == b && pair[0].name <= pair[1].name));
            }
        }
    }
}
