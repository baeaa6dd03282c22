use crate::components::{text_line, Component, View};
use crate::data::gpu::{
    count_additional_relevant_gpus, pick_display_gpu_index, pick_in_use_gpu_index,
};
use crate::data::snapshot::{GpuMetrics, Snapshot};
use crate::utils::{format_mib_or_gib, format_optional};
use crate::widgets::gauge::PercentBar;
use ratatui::text::Line;

pub struct GpuComponent;

fn format_vram(gpu: &GpuMetrics) -> String {
    if gpu.memory_used_mib.is_none() || gpu.memory_total_mib.is_none() {
        return "N/A".to_string();
    }
    format!(
        "{} / {}",
        format_mib_or_gib(gpu.memory_used_mib),
        format_mib_or_gib(gpu.memory_total_mib)
    )
}

fn label(gpu: &GpuMetrics, in_use: bool) -> String {
    let mut line = format!("{} [{}]", gpu.name, gpu.source);
    if in_use {
        line.push_str(" (in use)");
    }
    line
}

fn more_gpus(count: usize) -> String {
    format!("+{count} more GPU(s)")
}

impl Component for GpuComponent {
    fn title(&self) -> &'static str {
        "GPU"
    }

    fn preferred_rows(&self, snapshot: &Snapshot) -> u16 {
        let gpus = &snapshot.gpus;
        if gpus.is_empty() {
            return 2;
        }
        if !gpus.iter().any(GpuMetrics::has_telemetry) {
            return gpus.len().min(u16::MAX as usize) as u16;
        }
        let Some(index) = pick_display_gpu_index(gpus) else {
            return 2;
        };
        let gpu = &gpus[index];
        let mut rows = 6;
        if gpu.memory_used_mib.is_none() {
            rows += 1;
        }
        if gpu.utilization_percent.is_some() {
            rows += 1;
        }
        if gpu.memory_utilization_percent.is_some() {
            rows += 1;
        }
        if count_additional_relevant_gpus(gpus, Some(index)) > 1 {
            rows += 1;
        }
        rows
    }

    fn lines(&self, view: &View, width: u16) -> Vec<Line<'static>> {
        let theme = view.theme;
        let gpus = &view.snapshot.gpus;
        let Some(display) = pick_display_gpu_index(gpus) else {
            return vec![
                text_line("No GPU telemetry found".to_string(), theme),
                text_line("Tip: install NVIDIA drivers / sensors".to_string(), theme),
            ];
        };
        let in_use = pick_in_use_gpu_index(gpus);

        if !gpus.iter().any(GpuMetrics::has_telemetry) {
            // Identity only: one line per card, as many as fit.
            return gpus
                .iter()
                .enumerate()
                .map(|(index, gpu)| text_line(label(gpu, in_use == Some(index)), theme))
                .collect();
        }

        let gpu = &gpus[display];
        let mut lines = vec![
            text_line(format!("GPU: {}", label(gpu, in_use == Some(display))), theme),
            text_line(
                format!("Temperature: {}", format_optional(gpu.temperature_c, " C", 1)),
                theme,
            ),
            text_line(
                format!("Speed: {}", format_optional(gpu.core_clock_mhz, " MHz", 0)),
                theme,
            ),
            text_line(
                format!("Usage: {}", format_optional(gpu.utilization_percent, "%", 0)),
                theme,
            ),
            text_line(format!("Power: {}", format_optional(gpu.power_w, " W", 1)), theme),
            text_line(format!("VRAM: {}", format_vram(gpu)), theme),
        ];
        if gpu.memory_used_mib.is_none() {
            lines.push(text_line("VRAM source not exposed".to_string(), theme));
        }
        if let Some(utilization) = gpu.utilization_percent {
            lines.push(PercentBar::new("Util", utilization).to_line(width, theme));
        }
        if let Some(memory) = gpu.memory_utilization_percent {
            lines.push(PercentBar::new("VRAM", memory).to_line(width, theme));
        }
        let extra = count_additional_relevant_gpus(gpus, Some(display));
        if extra > 1 {
            lines.push(text_line(more_gpus(extra), theme));
        }
        lines
    }
}
