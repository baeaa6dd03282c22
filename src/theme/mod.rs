use crate::data::history::Series;
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Graphite,
    Midnight,
    Nord,
    Gruvbox,
}

impl ColorScheme {
    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::Graphite => "graphite",
            ColorScheme::Midnight => "midnight",
            ColorScheme::Nord => "nord",
            ColorScheme::Gruvbox => "gruvbox",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub color_scheme: ColorScheme,
}

impl Theme {
    pub fn new(color_scheme: ColorScheme) -> Self {
        Self { color_scheme }
    }

    pub fn cycle() -> &'static [ColorScheme] {
        &[
            ColorScheme::Graphite,
            ColorScheme::Midnight,
            ColorScheme::Nord,
            ColorScheme::Gruvbox,
        ]
    }

    pub fn next(&self) -> Self {
        let schemes = Self::cycle();
        let index = schemes
            .iter()
            .position(|scheme| *scheme == self.color_scheme)
            .unwrap_or(0);
        Self::new(schemes[(index + 1) % schemes.len()])
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.get_color(Color::White))
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.get_color(Color::Gray))
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.get_color(Color::DarkGray))
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.get_color(Color::LightBlue))
            .add_modifier(Modifier::BOLD)
    }

    /// Trend line color of each history series.
    pub fn series_color(&self, series: Series) -> Color {
        let base = match series {
            Series::CpuUsage => Color::Cyan,
            Series::CpuTemp => Color::Red,
            Series::RamUsage => Color::Yellow,
            Series::GpuUsage => Color::Green,
            Series::GpuVram => Color::Magenta,
            Series::Disk => Color::Blue,
        };
        self.get_color(base)
    }

    /// Cool below 65%, warm below 85%, hot from there.
    pub fn level_color(&self, percent: f64) -> Color {
        if percent >= 85.0 {
            self.get_color(Color::Red)
        } else if percent >= 65.0 {
            self.get_color(Color::Yellow)
        } else {
            self.get_color(Color::Green)
        }
    }

    pub fn get_color(&self, default_color: Color) -> Color {
        match self.color_scheme {
            ColorScheme::Graphite => graphite_color(default_color),
            ColorScheme::Midnight => midnight_color(default_color),
            ColorScheme::Nord => nord_color(default_color),
            ColorScheme::Gruvbox => gruvbox_color(default_color),
        }
    }
}

fn graphite_color(default_color: Color) -> Color {
    match default_color {
        Color::White => Color::Rgb(228, 236, 245),
        Color::DarkGray => Color::Rgb(52, 66, 86),
        Color::Gray => Color::Rgb(140, 158, 182),
        Color::Cyan => Color::Rgb(117, 184, 194),
        Color::Blue => Color::Rgb(110, 143, 194),
        Color::Green => Color::Rgb(107, 194, 143),
        Color::Yellow => Color::Rgb(199, 179, 110),
        Color::Red => Color::Rgb(194, 122, 133),
        Color::Magenta => Color::Rgb(173, 143, 194),
        Color::LightBlue => Color::Rgb(157, 194, 255),
        _ => default_color,
    }
}

fn midnight_color(default_color: Color) -> Color {
    match default_color {
        Color::White => Color::Rgb(230, 237, 247),
        Color::DarkGray => Color::Rgb(38, 50, 77),
        Color::Gray => Color::Rgb(124, 143, 171),
        Color::Cyan => Color::Rgb(93, 204, 226),
        Color::Blue => Color::Rgb(106, 158, 255),
        Color::Green => Color::Rgb(116, 215, 155),
        Color::Yellow => Color::Rgb(247, 204, 117),
        Color::Red => Color::Rgb(244, 130, 130),
        Color::Magenta => Color::Rgb(200, 151, 255),
        Color::LightBlue => Color::Rgb(159, 199, 255),
        _ => default_color,
    }
}

fn nord_color(default_color: Color) -> Color {
    match default_color {
        Color::White => Color::Rgb(229, 233, 240),
        Color::DarkGray => Color::Rgb(76, 86, 106),
        Color::Gray => Color::Rgb(129, 161, 193),
        Color::Cyan => Color::Rgb(136, 192, 208),
        Color::Blue => Color::Rgb(94, 129, 172),
        Color::Green => Color::Rgb(163, 190, 140),
        Color::Yellow => Color::Rgb(235, 203, 139),
        Color::Red => Color::Rgb(191, 97, 106),
        Color::Magenta => Color::Rgb(180, 142, 173),
        Color::LightBlue => Color::Rgb(143, 188, 187),
        _ => default_color,
    }
}

fn gruvbox_color(default_color: Color) -> Color {
    match default_color {
        Color::White => Color::Rgb(235, 219, 178),
        Color::DarkGray => Color::Rgb(80, 73, 69),
        Color::Gray => Color::Rgb(168, 153, 132),
        Color::Cyan => Color::Rgb(142, 192, 124),
        Color::Blue => Color::Rgb(131, 165, 152),
        Color::Green => Color::Rgb(184, 187, 38),
        Color::Yellow => Color::Rgb(250, 189, 47),
        Color::Red => Color::Rgb(251, 73, 52),
        Color::Magenta => Color::Rgb(211, 134, 155),
        Color::LightBlue => Color::Rgb(158, 193, 179),
        _ => default_color,
    }
}
