use crate::{
    action::Action,
    components::{
        activity::ActivityComponent, cpu::CpuComponent, disk::DiskComponent, gpu::GpuComponent,
        memory::MemoryComponent, Component, View,
    },
    config::AppConfig,
    data::DataManager,
    error::AppError,
    layout::{self, LayoutOutcome, PanelRows},
    theme::Theme,
    tui::Tui,
};
use crossterm::event::{self, Event as CrosstermEvent};
use log::{debug, info, warn};
use ratatui::{
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::{Duration, Instant};

pub const TOO_SMALL_NOTICE: &str = "Terminal too small. Resize to at least 80x18.";

pub struct App {
    tui: Tui,
    data: DataManager,
    theme: Theme,
    /// What is on disk, so one-off command-line overrides are never saved.
    saved_config: AppConfig,
    host: String,
    interval: Duration,
    should_quit: bool,
}

impl App {
    pub fn new(
        tui: Tui,
        data: DataManager,
        theme: Theme,
        saved_config: AppConfig,
        host: String,
        interval: Duration,
    ) -> Self {
        Self {
            tui,
            data,
            theme,
            saved_config,
            host,
            interval,
            should_quit: false,
        }
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        let result = self.event_loop();
        self.tui.exit()?;
        result
    }

    fn event_loop(&mut self) -> Result<(), AppError> {
        info!("polling every {:?}", self.interval);
        let mut next_poll = Instant::now();

        while !self.should_quit {
            let now = Instant::now();
            if now >= next_poll {
                self.data.poll(now);
                next_poll = now + self.interval;
                self.draw_frame()?;
            }

            let timeout = next_poll.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                continue;
            }
            match event::read()? {
                CrosstermEvent::Key(key) => {
                    let action = Action::from_key(key);
                    if action != Action::Tick {
                        self.handle_action(action);
                        if !self.should_quit {
                            self.draw_frame()?;
                        }
                    }
                }
                CrosstermEvent::Resize(width, height) => {
                    // A resize is a full cycle: poll now, restart the timer.
                    self.tui.resize(width, height)?;
                    let now = Instant::now();
                    self.data.poll(now);
                    next_poll = now + self.interval;
                    self.draw_frame()?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn draw_frame(&mut self) -> Result<(), AppError> {
        let view = View {
            snapshot: self.data.snapshot(),
            history: self.data.history(),
            processes: self.data.processes(),
            theme: &self.theme,
        };
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let host = &self.host;
        self.tui
            .draw(|f| render_dashboard(f, &view, host, &timestamp))
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::SwitchTheme => {
                self.theme = self.theme.next();
                debug!("theme switched to {}", self.theme.color_scheme.name());
                self.save_config();
            }
            Action::SaveConfig => {
                self.save_config();
            }
            Action::Tick => {}
        }
    }

    fn save_config(&mut self) {
        self.saved_config.color_scheme = self.theme.color_scheme;
        if let Err(err) = self.saved_config.save() {
            warn!("could not save config: {err}");
        }
    }
}

fn panel_rows(view: &View) -> PanelRows {
    let snapshot = view.snapshot;
    PanelRows {
        cpu: CpuComponent.preferred_rows(snapshot),
        ram: MemoryComponent.preferred_rows(snapshot),
        gpu: GpuComponent.preferred_rows(snapshot),
        disk: DiskComponent.preferred_rows(snapshot),
    }
}

/// The whole screen: header, the four panels, activity when it fits, footer.
pub fn render_dashboard(f: &mut Frame, view: &View, host: &str, timestamp: &str) {
    let area = f.area();
    let theme = view.theme;

    let layout = match layout::solve(area, panel_rows(view)) {
        LayoutOutcome::TooSmall => {
            let notice = Paragraph::new(vec![
                Line::from(Span::styled(TOO_SMALL_NOTICE, theme.text_style())),
                Line::from(Span::styled("Press q to quit.", theme.muted_style())),
            ]);
            let offset = area.width.min(2);
            let inner = ratatui::layout::Rect::new(
                area.x + offset,
                area.y + area.height.min(2),
                area.width - offset,
                area.height.saturating_sub(2),
            );
            f.render_widget(notice, inner);
            return;
        }
        LayoutOutcome::Dashboard(layout) => layout,
    };

    let header = format!(
        "Host: {host}   Time: {timestamp}   Theme: {}",
        theme.color_scheme.name()
    );
    f.render_widget(
        Paragraph::new(Span::styled(header, theme.title_style())),
        layout.header,
    );

    CpuComponent.render(f, layout.cpu, view);
    MemoryComponent.render(f, layout.ram, view);
    GpuComponent.render(f, layout.gpu, view);
    DiskComponent.render(f, layout.disk, view);
    if let Some(history) = layout.history {
        ActivityComponent.render(f, history, view);
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            "Press q to quit   t: next theme   w: save settings",
            theme.muted_style(),
        )),
        layout.footer,
    );
}
