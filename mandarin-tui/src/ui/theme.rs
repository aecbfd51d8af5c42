use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

/// Badge palette for profile tags.
const TAG_COLORS: &[Color] = &[
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Green,
    Color::Cyan,
    Color::LightRed,
];

impl Theme {
    pub fn highlight() -> Style {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    pub fn secondary() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn active() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn error() -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn success() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn title() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn selected_row() -> Style {
        Style::default().bg(Color::DarkGray)
    }

    /// Primary button (follow); the outlined variant is used once following.
    pub fn button(filled: bool) -> Style {
        if filled {
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        }
    }

    pub fn tag_badge(index: usize) -> Style {
        let bg = TAG_COLORS[index % TAG_COLORS.len()];
        let fg = match bg {
            Color::Yellow | Color::Green | Color::Cyan => Color::Black,
            _ => Color::White,
        };
        Style::default().bg(bg).fg(fg)
    }
}
