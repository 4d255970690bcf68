use tui::layout::{Constraint, Flex, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const LOGS_HEIGHT: u16 = 8;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    /// Bottom line: path prompt or key hints.
    pub status: Rect,
    pub logs: Option<Rect>,
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
        let logs_height = if show_logs { LOGS_HEIGHT } else { 0 };
        let tab_height = if full_screen { 0 } else { TAB_BAR_HEIGHT };

        let [tab, main, logs, status] = Layout::vertical([
            Constraint::Length(tab_height),
            Constraint::Fill(1),
            Constraint::Length(logs_height),
            Constraint::Length(1),
        ])
        .areas(area);

        LayoutAreas {
            tab_bar: if full_screen { [Rect::ZERO, Rect::ZERO] } else { Self::split_tab_bar(tab) },
            main,
            status,
            logs: show_logs.then_some(logs),
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}

/// A `width` x `height` box centered in `area`, shrunk to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [column] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(column);
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_pane_only_when_shown() {
        let mut layout = LayoutAreas::new(Size::new(80, 30));
        assert!(layout.logs.is_none());
        assert_eq!(layout.main.y, TAB_BAR_HEIGHT);

        layout.update(Rect::new(0, 0, 80, 30), true, true);
        assert_eq!(layout.main.y, 0);
        assert_eq!(layout.logs.map(|r| r.height), Some(LOGS_HEIGHT));
        assert_eq!(layout.status.y, 29);
    }

    #[test]
    fn centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let r = centered_rect(area, 20, 4);
        assert_eq!((r.width, r.height), (20, 4));
        assert_eq!((r.x, r.y), (10, 3));
        assert_eq!(centered_rect(area, 100, 100), area);
    }
}
