//! Screen partitioning for the dashboard.
//!
//! Two columns of stacked panels (CPU over RAM, GPU over Disk) take the
//! height their content asks for; whatever is left below goes to the
//! full-width activity panel, or to nothing when it would be too cramped.

use ratatui::layout::Rect;

pub const MIN_COLS: u16 = 80;
pub const MIN_ROWS: u16 = 18;
pub const MIN_PANEL_HEIGHT: u16 = 4;
/// Activity panel content rows it would like; half of it is the floor.
pub const HISTORY_PREFERRED_ROWS: u16 = 12;

const HEADER_ROWS: u16 = 3;
const GAP: u16 = 1;
const MARGIN: u16 = 1;
/// Top and bottom border of a panel.
const BORDER_ROWS: u16 = 2;

/// Content rows each panel would like, borders excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelRows {
    pub cpu: u16,
    pub ram: u16,
    pub gpu: u16,
    pub disk: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub header: Rect,
    pub cpu: Rect,
    pub ram: Rect,
    pub gpu: Rect,
    pub disk: Rect,
    pub history: Option<Rect>,
    pub footer: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutOutcome {
    TooSmall,
    Dashboard(DashboardLayout),
}

/// Split `total` rows (a gap included) between two stacked panels in
/// proportion to what they prefer. The two heights always sum to the
/// available rows.
pub fn split_column_heights(total: u16, top_pref: u16, bottom_pref: u16, gap: u16) -> (u16, u16) {
    let available = total.saturating_sub(gap).max(MIN_PANEL_HEIGHT * 2);
    let pref_sum = (top_pref as u32 + bottom_pref as u32).max(1);
    let proposed = (available as f64 * top_pref as f64 / pref_sum as f64).round() as u16;
    let top = proposed.clamp(MIN_PANEL_HEIGHT, available - MIN_PANEL_HEIGHT);
    (top, available - top)
}

pub fn history_min_height() -> u16 {
    (HISTORY_PREFERRED_ROWS / 2).max(6)
}

pub fn solve(area: Rect, rows: PanelRows) -> LayoutOutcome {
    if area.width < MIN_COLS || area.height < MIN_ROWS {
        return LayoutOutcome::TooSmall;
    }

    let content_w = area.width - 2 * MARGIN - GAP;
    let left_w = content_w / 2;
    let right_w = content_w - left_w;
    let x_left = area.x + MARGIN;
    let x_right = x_left + left_w + GAP;
    let top = area.y + HEADER_ROWS;

    let content_h = area.height - HEADER_ROWS - 2;
    let min_stack = MIN_PANEL_HEIGHT * 2 + GAP;
    let (cpu_pref, ram_pref) = (rows.cpu + BORDER_ROWS, rows.ram + BORDER_ROWS);
    let (gpu_pref, disk_pref) = (rows.gpu + BORDER_ROWS, rows.disk + BORDER_ROWS);
    let pref_stack = (cpu_pref + GAP + ram_pref).max(gpu_pref + GAP + disk_pref);
    let stack_h = content_h.min(min_stack.max(pref_stack));

    let remaining = content_h - stack_h;
    let history_h = (remaining >= history_min_height() + GAP).then(|| remaining - GAP);

    let (cpu_h, ram_h) = split_column_heights(stack_h, cpu_pref, ram_pref, GAP);
    let (gpu_h, disk_h) = split_column_heights(stack_h, gpu_pref, disk_pref, GAP);

    LayoutOutcome::Dashboard(DashboardLayout {
        header: Rect::new(area.x + 2, area.y + 1, area.width - 4, 1),
        cpu: Rect::new(x_left, top, left_w, cpu_h),
        ram: Rect::new(x_left, top + cpu_h + GAP, left_w, ram_h),
        gpu: Rect::new(x_right, top, right_w, gpu_h),
        disk: Rect::new(x_right, top + gpu_h + GAP, right_w, disk_h),
        history: history_h.map(|height| {
            Rect::new(x_left, top + stack_h + GAP, area.width - 2 * MARGIN, height)
        }),
        footer: Rect::new(area.x + 2, area.y + area.height - 1, area.width - 4, 1),
    })
}
