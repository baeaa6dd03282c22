use crate::components::{text_line, Component, View};
use crate::data::snapshot::Snapshot;
use crate::utils::human_bytes;
use crate::widgets::gauge::PercentBar;
use ratatui::text::Line;

pub struct DiskComponent;

impl Component for DiskComponent {
    fn title(&self) -> &'static str {
        "Disk"
    }

    fn preferred_rows(&self, snapshot: &Snapshot) -> u16 {
        // Mount line, then either the unavailable notice or free + bar.
        if snapshot.disk_usage_percent().is_some() {
            3
        } else {
            2
        }
    }

    fn lines(&self, view: &View, width: u16) -> Vec<Line<'static>> {
        let theme = view.theme;
        let disk = &view.snapshot.disk;
        let mut lines = vec![text_line(format!("Mount: {}", disk.mount_point), theme)];

        let usage = view.snapshot.disk_usage_percent();
        match (usage, disk.total_bytes, disk.free_bytes) {
            (Some(usage), Some(total), Some(free)) => {
                let free = free.min(total);
                lines.push(text_line(
                    format!("Free: {} / {}", human_bytes(free), human_bytes(total)),
                    theme,
                ));
                lines.push(PercentBar::new("Used", usage).to_line(width, theme));
            }
            _ => lines.push(text_line("Disk data unavailable".to_string(), theme)),
        }
        lines
    }
}
