use crate::components::{text_line, Component, View};
use crate::data::snapshot::Snapshot;
use crate::utils::human_bytes;
use crate::widgets::gauge::PercentBar;
use ratatui::text::Line;

pub struct MemoryComponent;

/// (used, available, total) in bytes, when both counters are usable.
fn ram_bytes(snapshot: &Snapshot) -> Option<(u64, u64, u64)> {
    let total_kb = snapshot.ram.total_kb.filter(|total| *total > 0)?;
    let available_kb = snapshot.ram.available_kb?;
    let used_kb = total_kb.saturating_sub(available_kb);
    Some((used_kb * 1024, available_kb * 1024, total_kb * 1024))
}

impl Component for MemoryComponent {
    fn title(&self) -> &'static str {
        "RAM"
    }

    fn preferred_rows(&self, snapshot: &Snapshot) -> u16 {
        if ram_bytes(snapshot).is_some() {
            3
        } else {
            1
        }
    }

    fn lines(&self, view: &View, width: u16) -> Vec<Line<'static>> {
        let theme = view.theme;
        let Some((used, available, total)) = ram_bytes(view.snapshot) else {
            return vec![text_line("N/A".to_string(), theme)];
        };
        let usage = view.snapshot.ram_usage_percent().unwrap_or(0.0);
        vec![
            text_line(format!("Used: {} / {}", human_bytes(used), human_bytes(total)), theme),
            text_line(format!("Available: {}", human_bytes(available)), theme),
            PercentBar::new("Usage", usage).to_line(width, theme),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::testing::{contains_row, render_rows};
    use crate::data::history::MetricsHistory;
    use crate::data::snapshot::RamMetrics;
    use crate::theme::{ColorScheme, Theme};

    #[test]
    fn missing_counters_show_placeholder() {
        let snapshot = Snapshot {
            ram: RamMetrics {
                total_kb: Some(0),
                available_kb: Some(10),
            },
            ..Default::default()
        };
        assert_eq!(MemoryComponent.preferred_rows(&snapshot), 1);

        let history = MetricsHistory::new(4);
        let theme = Theme::new(ColorScheme::Nord);
        let view = View {
            snapshot: &snapshot,
            history: &history,
            processes: &[],
            theme: &theme,
        };
        let rows = render_rows(&MemoryComponent, &view, 40, 4);
        assert!(contains_row(&rows, "N/A"));
    }

    #[test]
    fn used_and_available() {
        let snapshot = Snapshot {
            ram: RamMetrics {
                total_kb: Some(16 * 1024 * 1024),
                available_kb: Some(4 * 1024 * 1024),
            },
            ..Default::default()
        };
        assert_eq!(MemoryComponent.preferred_rows(&snapshot), 3);

        let history = MetricsHistory::new(4);
        let theme = Theme::new(ColorScheme::Nord);
        let view = View {
            snapshot: &snapshot,
            history: &history,
            processes: &[],
            theme: &theme,
        };
        let rows = render_rows(&MemoryComponent, &view, 40, 5);
        assert!(contains_row(&rows, "Used: 12.0 GiB / 16.0 GiB"));
        assert!(contains_row(&rows, "Available: 4.0 GiB"));
        assert!(contains_row(&rows, "] 75%"));
    }
}
