use ratatui::text::{Line, Span};

use crate::models::MAX_NAME_LEN;

use super::theme::Theme;

/// Single-line text field for a new tool or borrower name.
#[derive(Default, Clone, Debug)]
pub(crate) struct NameInput {
    pub(crate) value: String,
}

impl NameInput {
    /// Append a character, refusing control characters and anything past the
    /// name length limit.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || self.value.chars().count() >= MAX_NAME_LEN {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    pub(crate) fn clear(&mut self) {
        self.value.clear();
    }

    /// Build a label/value line, with a trailing cursor when focused.
    pub(crate) fn build_line(&self, label: &str, active: bool, theme: &Theme) -> Line<'static> {
        text_line(label, &self.value, active, theme)
    }
}

/// `label value_` rendering shared by the name inputs and the selectors.
pub(crate) fn text_line(label: &str, value: &str, active: bool, theme: &Theme) -> Line<'static> {
    let value_style = if active {
        theme.highlight()
    } else {
        theme.text()
    };
    let mut spans = vec![
        Span::styled(format!("{label} "), theme.muted()),
        Span::styled(value.to_string(), value_style),
    ];
    if active {
        spans.push(Span::styled("_", value_style));
    }
    Line::from(spans)
}
