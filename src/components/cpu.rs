use crate::components::{text_line, Component, View};
use crate::data::snapshot::{CpuMetrics, Snapshot};
use crate::utils::{format_cpu_frequency, format_optional};
use crate::widgets::gauge::PercentBar;
use ratatui::text::Line;

pub struct CpuComponent;

fn format_topology(cpu: &CpuMetrics) -> String {
    if cpu.total_cores.is_none() && cpu.total_threads.is_none() {
        return "N/A".to_string();
    }
    let part = |count: Option<u32>| count.map_or_else(|| "N/A".to_string(), |n| n.to_string());
    format!("{}C / {}T", part(cpu.total_cores), part(cpu.total_threads))
}

impl Component for CpuComponent {
    fn title(&self) -> &'static str {
        "CPU"
    }

    fn preferred_rows(&self, snapshot: &Snapshot) -> u16 {
        // Name, topology, speed, fan/power and a spare line.
        let mut rows = 5;
        if snapshot.cpu.usage_percent.is_some() {
            rows += 1;
        }
        if snapshot.cpu.temperature_c.is_some() {
            rows += 1;
        }
        rows
    }

    fn lines(&self, view: &View, width: u16) -> Vec<Line<'static>> {
        let cpu = &view.snapshot.cpu;
        let theme = view.theme;
        let mut lines = vec![
            text_line(format!("CPU: {}", cpu.name), theme),
            text_line(format!("Topology: {}", format_topology(cpu)), theme),
            text_line(format!("Speed: {}", format_cpu_frequency(cpu.frequency_mhz)), theme),
        ];
        if let Some(usage) = cpu.usage_percent {
            lines.push(PercentBar::new("Usage", usage).to_line(width, theme));
        }
        if let Some(temperature) = cpu.temperature_c {
            lines.push(PercentBar::new("Temp ", temperature).unit("C").to_line(width, theme));
        }
        if cpu.fan_rpm.is_some() || cpu.power_w.is_some() {
            lines.push(text_line(
                format!(
                    "Fan: {}   Power: {}",
                    format_optional(cpu.fan_rpm, " RPM", 0),
                    format_optional(cpu.power_w, " W", 1)
                ),
                theme,
            ));
        }
        lines
    }
}
