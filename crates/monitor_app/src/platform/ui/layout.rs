use ratatui::layout::{Constraint, Layout, Rect};

pub struct DashboardAreas {
    pub header: Rect,
    pub tabs: Rect,
    pub body: Rect,
    pub status: Rect,
    pub help: Rect,
}

pub fn dashboard_areas(area: Rect) -> DashboardAreas {
    let [header, tabs, body, status, help] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);
    DashboardAreas {
        header,
        tabs,
        body,
        status,
        help,
    }
}

/// A rectangle of the given percentage size centred in `area`.
pub fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width.saturating_mul(percent_x.min(100)) / 100;
    let height = area.height.saturating_mul(percent_y.min(100)) / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Rows visible inside a bordered block of this height.
pub fn inner_height(area: Rect) -> usize {
    area.height.saturating_sub(2) as usize
}
