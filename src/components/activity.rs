use crate::components::{panel_block, Component, View};
use crate::data::history::Series;
use crate::data::snapshot::{ProcessInfo, Snapshot};
use crate::layout::HISTORY_PREFERRED_ROWS;
use crate::theme::Theme;
use crate::widgets::braille_graph::TrendGraph;
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget, Frame};

const GRAPH_LEFT: u16 = 7;
const MIN_GRAPH_ROWS: u16 = 4;
const MAX_TABLE_ROWS: u16 = 8;
const TABLE_HEADER: &str = "PID    CPU%   MEM%   COMMAND";

/// Trend graph of every history series over a small top-process table.
pub struct ActivityComponent;

/// Rows, relative to the panel's top border, of each part of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRows {
    pub graph_top: u16,
    pub graph_bottom: u16,
    /// First row of the process table, header included.
    pub table_top: Option<u16>,
    pub table_rows: u16,
}

/// Split a panel of `height` rows (borders included) between the graph and
/// the process table. The table needs at least a header and one process.
pub fn activity_rows(height: u16) -> ActivityRows {
    let graph_top = 2;
    let room = height.saturating_sub(2).saturating_sub(graph_top + MIN_GRAPH_ROWS);
    let table_rows = room.min(MAX_TABLE_ROWS);
    let (table_top, table_rows) = if table_rows >= 2 {
        (Some(height - 1 - table_rows), table_rows)
    } else {
        (None, 0)
    };
    let graph_bottom = table_top.unwrap_or(height.saturating_sub(1)).saturating_sub(2);
    ActivityRows {
        graph_top,
        graph_bottom,
        table_top,
        table_rows,
    }
}

pub fn process_row(process: &ProcessInfo) -> String {
    format!(
        "{:>6} {:>6.1} {:>6.1} {}",
        process.pid, process.cpu_percent, process.mem_percent, process.command
    )
}

fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, text: &str, style: Style) {
    if x >= area.width.saturating_sub(1) || y >= area.height {
        return;
    }
    let room = (area.width - 1 - x) as usize;
    buf.set_stringn(area.x + x, area.y + y, text, room, style);
}

fn draw_legend(buf: &mut Buffer, area: Rect, theme: &Theme) {
    let mut column = 2;
    for series in Series::LEGEND_ORDER {
        let text = series.label();
        let style = Style::default().fg(theme.series_color(series));
        put(buf, area, column, 1, &format!("{text} {}", "─".repeat(4)), style);
        column += text.len() as u16 + 7;
    }
}

fn draw_grid(buf: &mut Buffer, area: Rect, rows: &ActivityRows, graph_right: u16, theme: &Theme) {
    let style = theme.muted_style();
    let middle = rows.graph_top + (rows.graph_bottom - rows.graph_top + 1) / 2;
    put(buf, area, 2, rows.graph_top, "100", style);
    put(buf, area, 3, middle, "50", style);
    put(buf, area, 4, rows.graph_bottom, "0", style);
    let line = "─".repeat((graph_right - GRAPH_LEFT + 1) as usize);
    for y in [rows.graph_top, middle, rows.graph_bottom] {
        put(buf, area, GRAPH_LEFT, y, &line, style);
    }
}

fn draw_table(buf: &mut Buffer, area: Rect, table_top: u16, rows: u16, view: &View) {
    let theme = view.theme;
    let separator = "─".repeat(area.width.saturating_sub(2) as usize);
    put(buf, area, 1, table_top - 1, &separator, theme.border_style());
    put(buf, area, 2, table_top, TABLE_HEADER, theme.muted_style());
    for (offset, process) in view.processes.iter().take(rows as usize - 1).enumerate() {
        let y = table_top + 1 + offset as u16;
        put(buf, area, 2, y, &process_row(process), theme.text_style());
    }
}

/// Draw the panel contents inside `area`, whose border is already drawn.
pub fn draw_activity(buf: &mut Buffer, area: Rect, view: &View) {
    let theme = view.theme;
    if area.height < 6 || area.width < 30 {
        put(buf, area, 2, 1, "Expand terminal to view history.", theme.text_style());
        return;
    }
    draw_legend(buf, area, theme);

    let rows = activity_rows(area.height);
    let graph_right = area.width - 3;
    let graph_width = graph_right + 1 - GRAPH_LEFT;
    let graph_height = (rows.graph_bottom + 1).saturating_sub(rows.graph_top);
    if graph_width < 10 || graph_height < 3 {
        put(buf, area, 2, 2, "Not enough space for trend graph.", theme.text_style());
        return;
    }

    draw_grid(buf, area, &rows, graph_right, theme);
    let graph = Series::DRAW_ORDER
        .iter()
        .fold(TrendGraph::new().value_range(0.0, 100.0), |graph, series| {
            graph.layer(view.history.series(*series), theme.series_color(*series))
        });
    graph.render(
        Rect::new(
            area.x + GRAPH_LEFT,
            area.y + rows.graph_top,
            graph_width,
            graph_height,
        ),
        buf,
    );

    if let Some(table_top) = rows.table_top {
        draw_table(buf, area, table_top, rows.table_rows, view);
    }
}

impl Component for ActivityComponent {
    fn title(&self) -> &'static str {
        "Activity"
    }

    fn preferred_rows(&self, _snapshot: &Snapshot) -> u16 {
        HISTORY_PREFERRED_ROWS
    }

    fn render(&self, f: &mut Frame, area: Rect, view: &View) {
        f.render_widget(panel_block(self.title(), view.theme), area);
        draw_activity(f.buffer_mut(), area, view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::testing::{contains_row, render_rows};
    use crate::data::history::MetricsHistory;
    use crate::theme::ColorScheme;

    fn processes() -> Vec<ProcessInfo> {
        (0..10)
            .map(|index| ProcessInfo {
                pid: 100 + index,
                cpu_percent: 50.0 - index as f64,
                mem_percent: 1.5,
                command: format!("worker-{index}"),
            })
            .collect()
    }

    fn render(history: &MetricsHistory, processes: &[ProcessInfo], width: u16, height: u16) -> Vec<String> {
        let snapshot = Snapshot::default();
        let theme = Theme::new(ColorScheme::Graphite);
        let view = View {
            snapshot: &snapshot,
            history,
            processes,
            theme: &theme,
        };
        render_rows(&ActivityComponent, &view, width, height)
    }

    #[test]
    fn row_split() {
        // 20 rows: table gets min(8, 18 - 6) rows and sits above the border.
        let rows = activity_rows(20);
        assert_eq!(rows.table_rows, 8);
        assert_eq!(rows.table_top, Some(11));
        assert_eq!(rows.graph_bottom, 9);

        let small = activity_rows(8);
        assert_eq!(small.table_top, None);
        assert_eq!(small.graph_bottom, 5);
    }

    #[test]
    fn process_row_alignment() {
        let process = ProcessInfo {
            pid: 42,
            cpu_percent: 12.3,
            mem_percent: 0.5,
            command: "/usr/bin/stress".into(),
        };
        assert_eq!(process_row(&process), "    42   12.3    0.5 /usr/bin/stress");
    }

    #[test]
    fn tiny_panel_asks_for_room() {
        let history = MetricsHistory::new(8);
        let rows = render(&history, &[], 28, 10);
        assert!(contains_row(&rows, "Expand terminal"));
    }

    #[test]
    fn graph_legend_and_table() {
        let mut history = MetricsHistory::new(64);
        for step in 0..40 {
            history.append(Series::CpuUsage, Some(step as f64 * 2.5));
        }
        let processes = processes();
        let rows = render(&history, &processes, 80, 20);

        assert!(rows[0].contains(" Activity "));
        assert!(rows[1].contains("CPU ────"));
        assert!(rows[1].contains("DISK ────"));
        assert!(rows[2].contains("100"));
        assert!(rows[9].trim_start_matches('│').trim_start().starts_with('0'));
        assert!(rows[11].contains(TABLE_HEADER));
        assert!(rows[12].contains("100   50.0    1.5 worker-0"));
        // Eight table rows: header plus seven processes.
        assert!(rows[18].contains("worker-6"));
        assert!(!contains_row(&rows, "worker-7"));
    }

    #[test]
    fn without_table_there_is_only_the_graph() {
        let history = MetricsHistory::new(8);
        let rows = render(&history, &processes(), 60, 8);
        assert!(!contains_row(&rows, "PID"));
        assert!(rows[2].contains("100"));
    }
}
