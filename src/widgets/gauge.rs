use crate::theme::Theme;
use ratatui::{
    style::Style,
    text::{Line, Span},
};

/// Cells the bar may use once the label and value text are accounted for.
pub fn bar_width_for_area(area_width: u16, prefix_chars: usize, max_width: usize) -> usize {
    let available = area_width as usize;
    let room_after_prefix = available.saturating_sub(prefix_chars);
    room_after_prefix.min(max_width)
}

const MAX_BAR_CELLS: usize = 48;

/// Number of filled cells for `percent` out of `width`.
pub fn filled_cells(percent: f64, width: usize) -> usize {
    let ratio = percent.clamp(0.0, 100.0) / 100.0;
    ((ratio * width as f64).round() as usize).min(width)
}

/// A one-line `Label[|||    ] 42%` bar. Each filled cell is colored by how
/// far along the fill it sits, so a high value shades from cool to hot.
pub struct PercentBar<'a> {
    label: &'a str,
    value: f64,
    unit: &'a str,
}

impl<'a> PercentBar<'a> {
    pub fn new(label: &'a str, value: f64) -> Self {
        Self {
            label,
            value,
            unit: "%",
        }
    }

    /// Suffix printed after the value, `%` unless changed.
    pub fn unit(mut self, unit: &'a str) -> Self {
        self.unit = unit;
        self
    }

    pub fn to_line(&self, area_width: u16, theme: &Theme) -> Line<'static> {
        let value_text = format!(" {:.0}{}", self.value, self.unit);
        let prefix_chars = self.label.chars().count() + 2 + value_text.chars().count();
        let width = bar_width_for_area(area_width, prefix_chars, MAX_BAR_CELLS);
        let filled = filled_cells(self.value, width);

        let mut spans = Vec::with_capacity(width + 4);
        spans.push(Span::styled(self.label.to_string(), theme.text_style()));
        spans.push(Span::styled("[", theme.muted_style()));
        for index in 0..filled {
            let progress = (index + 1) as f64 / filled as f64 * self.value.clamp(0.0, 100.0);
            spans.push(Span::styled(
                "|",
                Style::default().fg(theme.level_color(progress)),
            ));
        }
        if width > filled {
            spans.push(Span::raw(" ".repeat(width - filled)));
        }
        spans.push(Span::styled("]", theme.muted_style()));
        spans.push(Span::styled(
            value_text,
            Style::default().fg(theme.get_color(ratatui::style::Color::Yellow)),
        ));
        Line::from(spans)
    }
}
