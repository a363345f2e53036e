use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Render one `Label: value` form row. Empty fields show their placeholder in
/// a dim style; the focused field is highlighted.
pub(crate) fn field_line(
    label: &str,
    value: &str,
    placeholder: &str,
    is_active: bool,
) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}

/// Cursor column for a form row: just past the typed text.
pub(crate) fn cursor_column(area: Rect, label: &str, value_len: usize) -> u16 {
    let prefix = label.len() as u16 + 2;
    area.x
        .saturating_add(prefix)
        .saturating_add(value_len as u16)
        .min(area.right().saturating_sub(1))
}

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

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = Err::<(), _>(anyhow!("Weight must be a number."))
            .context("failed to save bird")
            .unwrap_err();
        assert_eq!(surface_error(&err), "Weight must be a number.");
    }

    #[test]
    fn cursor_stays_inside_area() {
        let area = Rect::new(2, 0, 10, 1);
        assert_eq!(cursor_column(area, "Name", 0), 8);
        assert_eq!(cursor_column(area, "Name", 50), 11);
    }
}
