use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Place a dropdown of `height` rows directly under `anchor`, flipping above it
/// when there is no room below, and clipped to `area`.
pub(crate) fn dropdown_rect(anchor: Rect, height: u16, area: Rect) -> Rect {
    let below = area.bottom().saturating_sub(anchor.bottom());
    let above = anchor.y.saturating_sub(area.y);
    let (y, height) = if below >= height || below >= above {
        (anchor.bottom(), height.min(below))
    } else {
        let height = height.min(above);
        (anchor.y - height, height)
    };
    Rect {
        x: anchor.x,
        y,
        width: anchor.width.min(area.right().saturating_sub(anchor.x)),
        height,
    }
}

/// Row offset of `(column, row)` inside `area`, if the point falls inside it.
pub(crate) fn row_within(area: Rect, column: u16, row: u16) -> Option<usize> {
    if area.contains(Position::new(column, row)) {
        Some(usize::from(row - area.y))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropdown_opens_below_when_it_fits() {
        let area = Rect::new(0, 0, 80, 40);
        let anchor = Rect::new(10, 5, 20, 3);
        assert_eq!(dropdown_rect(anchor, 12, area), Rect::new(10, 8, 20, 12));
    }

    #[test]
    fn dropdown_flips_above_near_the_bottom() {
        let area = Rect::new(0, 0, 80, 40);
        let anchor = Rect::new(10, 34, 20, 3);
        assert_eq!(dropdown_rect(anchor, 12, area), Rect::new(10, 22, 20, 12));
    }

    #[test]
    fn row_within_reports_offsets() {
        let area = Rect::new(2, 4, 10, 5);
        assert_eq!(row_within(area, 3, 6), Some(2));
        assert_eq!(row_within(area, 1, 6), None);
        assert_eq!(row_within(area, 3, 9), None);
    }
}
