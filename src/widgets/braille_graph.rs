use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

pub const DIR_UP: u8 = 0x01;
pub const DIR_DOWN: u8 = 0x02;
pub const DIR_LEFT: u8 = 0x04;
pub const DIR_RIGHT: u8 = 0x08;
pub const DIR_POINT: u8 = 0x10;

const DIRECTIONS: u8 = DIR_UP | DIR_DOWN | DIR_LEFT | DIR_RIGHT;

/// A grid of per-cell connectivity masks. A series is plotted as a path of
/// cells, each remembering which neighbours the path enters and leaves by, so
/// the cell can later be drawn with a single box-drawing glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrailleCanvas {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl BrailleCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn mask(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.cells[y * self.width + x]
    }

    fn add_mask(&mut self, x: i32, y: i32, mask: u8) {
        if self.contains(x, y) {
            let index = y as usize * self.width + x as usize;
            self.cells[index] |= mask;
        }
    }

    /// Join two orthogonally adjacent cells. Anything else is ignored.
    fn connect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        if !self.contains(x0, y0) || !self.contains(x1, y1) {
            return;
        }
        let (from, to) = match (x1 - x0, y1 - y0) {
            (1, 0) => (DIR_RIGHT, DIR_LEFT),
            (-1, 0) => (DIR_LEFT, DIR_RIGHT),
            (0, 1) => (DIR_DOWN, DIR_UP),
            (0, -1) => (DIR_UP, DIR_DOWN),
            _ => return,
        };
        self.add_mask(x0, y0, from);
        self.add_mask(x1, y1, to);
    }

    /// Bresenham walk from one cell to another. A diagonal step goes through
    /// an elbow cell (horizontal first) so every link stays orthogonal.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        if !self.contains(x0, y0) || !self.contains(x1, y1) {
            return;
        }
        let (mut x, mut y) = (x0, y0);
        self.add_mask(x, y, DIR_POINT);

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut error = dx - dy;

        while (x, y) != (x1, y1) {
            let (prev_x, prev_y) = (x, y);
            let twice_error = error * 2;
            let mut moved_x = false;
            let mut moved_y = false;
            if twice_error > -dy {
                error -= dy;
                x += sx;
                moved_x = true;
            }
            if twice_error < dx {
                error += dx;
                y += sy;
                moved_y = true;
            }

            if moved_x && moved_y {
                self.connect(prev_x, prev_y, x, prev_y);
                self.connect(x, prev_y, x, y);
                self.add_mask(x, prev_y, DIR_POINT);
            } else {
                self.connect(prev_x, prev_y, x, y);
            }
            self.add_mask(x, y, DIR_POINT);
        }
    }

    pub fn point(&mut self, x: i32, y: i32) {
        self.add_mask(x, y, DIR_POINT);
    }

    /// Plot the newest `width` samples of `values`, scaled from
    /// `[min, max]` onto the rows with `max` at the top.
    pub fn plot_series(&mut self, values: &[f64], min: f64, max: f64) {
        if self.width == 0 || self.height == 0 || values.is_empty() || max <= min {
            return;
        }
        let count = values.len().min(self.width);
        let visible = &values[values.len() - count..];
        let rows = self.height as f64 - 1.0;

        let to_y = |value: f64| {
            let normalized = (value.clamp(min, max) - min) / (max - min);
            let from_bottom = (normalized * rows).round() as i32;
            (self.height as i32 - 1 - from_bottom).clamp(0, self.height as i32 - 1)
        };
        let to_x = |index: usize| {
            if count <= 1 {
                0
            } else {
                (index * (self.width - 1) / (count - 1)) as i32
            }
        };

        if count == 1 {
            let y = to_y(visible[0]);
            self.point(0, y);
            return;
        }
        let points: Vec<(i32, i32)> = visible
            .iter()
            .enumerate()
            .map(|(index, value)| (to_x(index), to_y(*value)))
            .collect();
        for pair in points.windows(2) {
            self.line(pair[0].0, pair[0].1, pair[1].0, pair[1].1);
        }
    }
}

/// Box-drawing glyph for a cell mask; `None` for an empty cell.
pub fn glyph_for_mask(mask: u8) -> Option<char> {
    let dirs = mask & DIRECTIONS;
    if dirs == 0 {
        return (mask & DIR_POINT != 0).then_some('·');
    }
    let glyph = match dirs {
        d if d == DIR_LEFT | DIR_RIGHT => '─',
        d if d == DIR_UP | DIR_DOWN => '│',
        d if d == DIR_DOWN | DIR_RIGHT => '┌',
        d if d == DIR_DOWN | DIR_LEFT => '┐',
        d if d == DIR_UP | DIR_RIGHT => '└',
        d if d == DIR_UP | DIR_LEFT => '┘',
        d if d == DIR_UP | DIR_DOWN | DIR_RIGHT => '├',
        d if d == DIR_UP | DIR_DOWN | DIR_LEFT => '┤',
        d if d == DIR_LEFT | DIR_RIGHT | DIR_DOWN => '┬',
        d if d == DIR_LEFT | DIR_RIGHT | DIR_UP => '┴',
        DIRECTIONS => '┼',
        d if d & (DIR_LEFT | DIR_RIGHT) != 0 => '─',
        _ => '│',
    };
    Some(glyph)
}

/// Several series drawn over one area, one canvas each. Layers are painted
/// in order, so a later layer covers an earlier one where both have a glyph.
pub struct TrendGraph<'a> {
    layers: Vec<(&'a [f64], Color)>,
    value_range: (f64, f64),
}

impl<'a> TrendGraph<'a> {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            value_range: (0.0, 100.0),
        }
    }

    pub fn layer(mut self, values: &'a [f64], color: Color) -> Self {
        self.layers.push((values, color));
        self
    }

    pub fn value_range(mut self, min: f64, max: f64) -> Self {
        self.value_range = (min, max);
        self
    }
}

impl Default for TrendGraph<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for TrendGraph<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (min, max) = self.value_range;
        for (values, color) in &self.layers {
            let mut canvas = BrailleCanvas::new(area.width as usize, area.height as usize);
            canvas.plot_series(values, min, max);
            let style = Style::default().fg(*color);
            for y in 0..canvas.height() {
                for x in 0..canvas.width() {
                    if let Some(glyph) = glyph_for_mask(canvas.mask(x, y)) {
                        let mut utf8 = [0u8; 4];
                        buf.set_string(
                            area.x + x as u16,
                            area.y + y as u16,
                            glyph.encode_utf8(&mut utf8),
                            style,
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_step_links_both_cells() {
        let mut canvas = BrailleCanvas::new(4, 3);
        canvas.line(1, 1, 2, 1);
        assert_eq!(canvas.mask(1, 1), DIR_RIGHT | DIR_POINT);
        assert_eq!(canvas.mask(2, 1), DIR_LEFT | DIR_POINT);
        assert_eq!(glyph_for_mask(canvas.mask(1, 1)), Some('─'));
        assert_eq!(glyph_for_mask(canvas.mask(2, 1)), Some('─'));
    }

    #[test]
    fn lone_point_and_empty_cell() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.plot_series(&[40.0], 0.0, 100.0);
        assert_eq!(canvas.mask(0, 1), DIR_POINT);
        assert_eq!(glyph_for_mask(canvas.mask(0, 1)), Some('·'));
        assert_eq!(glyph_for_mask(canvas.mask(1, 1)), None);
    }

    #[test]
    fn diagonal_goes_through_elbow() {
        let mut canvas = BrailleCanvas::new(3, 3);
        canvas.line(0, 0, 1, 1);
        assert_eq!(canvas.mask(0, 0), DIR_RIGHT | DIR_POINT);
        assert_eq!(canvas.mask(1, 0), DIR_LEFT | DIR_DOWN | DIR_POINT);
        assert_eq!(canvas.mask(0, 1), 0);
        assert_eq!(canvas.mask(1, 1), DIR_UP | DIR_POINT);
        assert_eq!(glyph_for_mask(canvas.mask(1, 0)), Some('┐'));
        assert_eq!(glyph_for_mask(canvas.mask(1, 1)), Some('│'));
    }

    #[test]
    fn out_of_bounds_line_is_ignored() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.line(0, 0, 5, 0);
        assert!((0..2).all(|y| (0..2).all(|x| canvas.mask(x, y) == 0)));
    }

    #[test]
    fn junction_glyphs() {
        assert_eq!(glyph_for_mask(DIRECTIONS), Some('┼'));
        assert_eq!(glyph_for_mask(DIR_UP | DIR_DOWN | DIR_RIGHT), Some('├'));
        assert_eq!(glyph_for_mask(DIR_LEFT | DIR_RIGHT | DIR_UP | DIR_POINT), Some('┴'));
        assert_eq!(glyph_for_mask(DIR_LEFT), Some('─'));
        assert_eq!(glyph_for_mask(DIR_DOWN), Some('│'));
    }

    #[test]
    fn series_keeps_newest_samples_and_scales() {
        let mut canvas = BrailleCanvas::new(3, 5);
        canvas.plot_series(&[0.0, 0.0, 0.0, 100.0, 50.0, 0.0], 0.0, 100.0);
        assert_eq!(canvas.mask(0, 0) & DIR_POINT, DIR_POINT);
        assert_eq!(canvas.mask(1, 2) & DIR_POINT, DIR_POINT);
        assert_eq!(canvas.mask(2, 4) & DIR_POINT, DIR_POINT);
    }

    #[test]
    fn later_layers_cover_earlier_ones() {
        let low = vec![0.0, 0.0];
        let also_low = vec![0.0, 0.0];
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        TrendGraph::new()
            .layer(&low, Color::Blue)
            .layer(&also_low, Color::Red)
            .render(area, &mut buf);

        assert_eq!(buf.get(0, 1).symbol(), "─");
        assert_eq!(buf.get(0, 1).fg, Color::Red);
        assert_eq!(buf.get(0, 0).symbol(), " ");
    }
}
