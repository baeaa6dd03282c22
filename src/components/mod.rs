use crate::data::history::MetricsHistory;
use crate::data::snapshot::{ProcessInfo, Snapshot};
use crate::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

pub mod activity;
pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod memory;

/// Everything a panel may draw from during one frame.
pub struct View<'a> {
    pub snapshot: &'a Snapshot,
    pub history: &'a MetricsHistory,
    pub processes: &'a [ProcessInfo],
    pub theme: &'a Theme,
}

/// A bordered dashboard panel.
pub trait Component {
    fn title(&self) -> &'static str;

    /// Content rows the panel would like for this snapshot, borders excluded.
    fn preferred_rows(&self, snapshot: &Snapshot) -> u16;

    /// Text lines for panels that are plain line lists. `width` is the inner
    /// width available to them.
    fn lines(&self, _view: &View, _width: u16) -> Vec<Line<'static>> {
        Vec::new()
    }

    fn render(&self, f: &mut Frame, area: Rect, view: &View) {
        let block = panel_block(self.title(), view.theme);
        let inner = block.inner(area);
        f.render_widget(&block, area);
        let lines = self.lines(view, inner.width);
        f.render_widget(Paragraph::new(lines).style(view.theme.text_style()), inner);
    }
}

pub fn panel_block(title: &'static str, theme: &Theme) -> Block<'static> {
    Block::default()
        .title(Span::styled(format!(" {title} "), theme.title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style())
}

pub(crate) fn text_line(text: String, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(text, theme.text_style()))
}
