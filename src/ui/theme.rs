use ratatui::style::{Color, Modifier, Style};

use crate::controller::Severity;

/// Key hint flavour. Danger hints mark destructive actions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ButtonStyle {
    Normal,
    Danger,
}

/// Colours used across the interface. Built once and handed to [`App`](super::App).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub accent_light: Color,
    pub accent_dim: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub danger: Color,
    pub warning: Color,
}

impl Default for Theme {
    /// Green-on-black terminal palette.
    fn default() -> Self {
        Self {
            accent: Color::Rgb(0x00, 0xff, 0x41),
            accent_light: Color::Rgb(0x40, 0xff, 0x70),
            accent_dim: Color::Rgb(0x1a, 0x3a, 0x1a),
            text: Color::Rgb(0x00, 0xff, 0x41),
            muted: Color::Rgb(0x4a, 0x8a, 0x4a),
            border: Color::Rgb(0x1a, 0x4a, 0x1a),
            danger: Color::Rgb(0xff, 0x41, 0x36),
            warning: Color::Rgb(0xff, 0xdc, 0x00),
        }
    }
}

impl Theme {
    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Border colour for a panel, brighter while it has focus.
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent_light)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.accent_light)
            .bg(self.accent_dim)
            .add_modifier(Modifier::BOLD)
    }

    pub fn button(&self, style: ButtonStyle) -> Style {
        match style {
            ButtonStyle::Normal => Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD),
            ButtonStyle::Danger => Style::default()
                .fg(self.danger)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn severity(&self, severity: Severity) -> Style {
        match severity {
            Severity::Info => Style::default().fg(self.accent),
            Severity::Warning => Style::default().fg(self.warning),
            Severity::Error => Style::default().fg(self.danger),
        }
    }
}
