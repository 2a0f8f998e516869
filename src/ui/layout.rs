use tui::layout::{Constraint, Layout, Rect, Size};

pub const TOP_BAR_HEIGHT: u16 = 3;
pub const STATUS_HEIGHT: u16 = 1;
pub const DASHBOARD_WIDTH: u16 = 36;
const LOG_PANE_HEIGHT: u16 = 10;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub top_bar: [Rect; 2],
    pub dashboard: Rect,
    pub page: Rect,
    pub logs: Rect,
    pub status: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let [top, body, logs, status] = Layout::vertical([
            Constraint::Length(if full_screen { 0 } else { TOP_BAR_HEIGHT }),
            Constraint::Fill(1),
            Constraint::Length(if show_logs { LOG_PANE_HEIGHT } else { 0 }),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .areas(area);

        let (dashboard, page) = if full_screen {
            (Rect::ZERO, body)
        } else {
            let [dashboard, page] =
                Layout::horizontal([Constraint::Length(DASHBOARD_WIDTH), Constraint::Fill(1)])
                    .areas(body);
            (dashboard, page)
        };

        LayoutAreas { top_bar: Self::split_top_bar(top), dashboard, page, logs, status }
    }

    fn split_top_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(80), Constraint::Percentage(20)]).areas(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_screen_gives_page_the_body() {
        let mut layout = LayoutAreas::new(Size::new(100, 40));
        assert_eq!(layout.dashboard.width, DASHBOARD_WIDTH);
        layout.update(Rect::new(0, 0, 100, 40), true, false);
        assert_eq!(layout.dashboard, Rect::ZERO);
        assert_eq!(layout.page.width, 100);
        assert_eq!(layout.page.height, 40 - STATUS_HEIGHT);
    }

    #[test]
    fn log_pane_takes_rows_only_when_shown() {
        let mut layout = LayoutAreas::new(Size::new(100, 40));
        assert_eq!(layout.logs.height, 0);
        layout.update(Rect::new(0, 0, 100, 40), false, true);
        assert_eq!(layout.logs.height, LOG_PANE_HEIGHT);
    }
}
