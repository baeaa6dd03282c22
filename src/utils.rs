/// Text and number helpers shared by the probes and the panels
use regex::Regex;
use std::sync::OnceLock;

/// Highest wattage accepted from any source.
pub const MAX_PLAUSIBLE_WATTS: f64 = 2000.0;
/// Highest temperature accepted from any source, in Celsius.
pub const MAX_PLAUSIBLE_CELSIUS: f64 = 150.0;

fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
            .expect("valid regex")
    })
}

fn rpm_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*rpm\b").expect("valid regex"))
}

fn watts_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*([mM]?)\s*[Ww]\b").expect("valid regex")
    })
}

/// Parse a value from tool output where `N/A` style markers mean "absent".
///
/// Like C's `strtod`, only the numeric prefix is read, so `"41.5 C"` gives 41.5.
pub fn parse_optional_f64(input: &str) -> Option<f64> {
    let cleaned = input.trim();
    if cleaned.is_empty() {
        return None;
    }
    let lower = cleaned.to_ascii_lowercase();
    if matches!(lower.as_str(), "n/a" | "na" | "[not supported]") {
        return None;
    }
    let prefix = leading_number_re().find(cleaned)?;
    prefix.as_str().parse::<f64>().ok()
}

/// The number directly in front of an `RPM` unit, e.g. `fan2: 1180 RPM`.
pub fn extract_rpm(input: &str) -> Option<f64> {
    let caps = rpm_re().captures(input)?;
    caps.get(1)?.as_str().parse::<f64>().ok()
}

/// Wattage from free text, honoring a `mW` prefix. Implausible values are dropped.
pub fn extract_watts(input: &str) -> Option<f64> {
    let caps = watts_re().captures(input)?;
    let mut watts = caps.get(1)?.as_str().parse::<f64>().ok()?;
    if caps.get(2).is_some_and(|m| !m.as_str().is_empty()) {
        watts /= 1000.0;
    }
    plausible_watts(watts)
}

/// Raw sensor value to Celsius. Kernel files report millidegrees, so anything
/// above 1000 in magnitude is scaled down first.
pub fn normalize_temperature_c(raw: i64) -> Option<f64> {
    let mut celsius = raw as f64;
    if celsius.abs() > 1000.0 {
        celsius /= 1000.0;
    }
    if !(0.0..=MAX_PLAUSIBLE_CELSIUS).contains(&celsius) {
        return None;
    }
    Some(celsius)
}

pub fn normalize_percent(raw: i64) -> Option<f64> {
    if !(0..=100).contains(&raw) {
        return None;
    }
    Some(raw as f64)
}

pub fn plausible_watts(watts: f64) -> Option<f64> {
    if watts <= 0.0 || watts > MAX_PLAUSIBLE_WATTS || !watts.is_finite() {
        return None;
    }
    Some(watts)
}

/// hwmon `power*_input` / `power*_average` files are in microwatts.
pub fn micro_watts_to_watts(micro_watts: i64) -> Option<f64> {
    if micro_watts <= 0 {
        return None;
    }
    plausible_watts(micro_watts as f64 / 1_000_000.0)
}

pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Convert bytes to a human-readable binary size
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if size >= 100.0 || unit_idx == 0 {
        format!("{:.0} {}", size, UNITS[unit_idx])
    } else {
        format!("{:.1} {}", size, UNITS[unit_idx])
    }
}

pub fn format_optional(value: Option<f64>, unit: &str, precision: usize) -> String {
    match value {
        Some(value) => format!("{:.*}{}", precision, value, unit),
        None => "N/A".to_string(),
    }
}

pub fn format_cpu_frequency(mhz: Option<f64>) -> String {
    match mhz {
        Some(mhz) if mhz >= 1000.0 => format!("{:.2} GHz", mhz / 1000.0),
        Some(mhz) => format!("{:.0} MHz", mhz),
        None => "N/A".to_string(),
    }
}

pub fn format_mib_or_gib(mib: Option<f64>) -> String {
    match mib {
        Some(mib) if mib >= 1024.0 => format!("{:.2} GiB", mib / 1024.0),
        Some(mib) => format!("{:.0} MiB", mib),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn millidegrees_are_scaled_and_range_checked() {
        assert_eq!(normalize_temperature_c(45_000), Some(45.0));
        assert_eq!(normalize_temperature_c(61), Some(61.0));
        assert_eq!(normalize_temperature_c(-5_000), None);
        assert_eq!(normalize_temperature_c(151_000), None);
        assert_eq!(normalize_temperature_c(999), None);
    }

    #[test]
    fn tool_markers_parse_as_absent() {
        assert_eq!(parse_optional_f64(" [Not Supported] "), None);
        assert_eq!(parse_optional_f64("N/A"), None);
        assert_eq!(parse_optional_f64(""), None);
        assert_eq!(parse_optional_f64(" 71 "), Some(71.0));
        assert_eq!(parse_optional_f64("35.52 W"), Some(35.52));
        assert_eq!(parse_optional_f64("abc"), None);
    }

    #[test]
    fn watts_in_text() {
        assert_eq!(extract_watts("ppt:  35.00 w  (cap = 88.00 w)"), Some(35.0));
        assert_eq!(extract_watts("power1: 500.00 mw"), Some(0.5));
        assert_eq!(extract_watts("power1: 0.00 w"), None);
        assert_eq!(extract_watts("power1: 4000.00 w"), None);
        assert_eq!(extract_watts("in0: 1.20 v"), None);
    }

    #[test]
    fn rpm_ignores_the_channel_index() {
        assert_eq!(extract_rpm("fan1:        1180 rpm"), Some(1180.0));
        assert_eq!(extract_rpm("fan2: 0 RPM  (min = 0 RPM)"), Some(0.0));
        assert_eq!(extract_rpm("temp1: +45.0°c"), None);
    }

    #[test]
    fn micro_watts() {
        assert_eq!(micro_watts_to_watts(15_000_000), Some(15.0));
        assert_eq!(micro_watts_to_watts(0), None);
        assert_eq!(micro_watts_to_watts(3_000_000_000), None);
    }

    #[test]
    fn human_readable_sizes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(1536), "1.5 KiB");
        assert_eq!(human_bytes(200 * 1024 * 1024), "200 MiB");
        assert_eq!(format_cpu_frequency(Some(3400.0)), "3.40 GHz");
        assert_eq!(format_cpu_frequency(Some(800.0)), "800 MHz");
        assert_eq!(format_mib_or_gib(Some(2048.0)), "2.00 GiB");
        assert_eq!(format_optional(None, " W", 1), "N/A");
    }

    proptest! {
        #[test]
        fn normalized_temperature_is_scaled_or_rejected(raw in -200_000i64..200_000) {
            match normalize_temperature_c(raw) {
                Some(celsius) => {
                    prop_assert!((0.0..=150.0).contains(&celsius));
                    if raw.abs() > 1000 {
                        prop_assert!((celsius - raw as f64 / 1000.0).abs() < 1e-9);
                    } else {
                        prop_assert_eq!(celsius, raw as f64);
                    }
                }
                None => {
                    let scaled = if raw.abs() > 1000 { raw as f64 / 1000.0 } else { raw as f64 };
                    prop_assert!(!(0.0..=150.0).contains(&scaled));
                }
            }
        }
    }
}
