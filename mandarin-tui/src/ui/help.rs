use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::theme::Theme;

const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("q / Ctrl+C", "Quit"),
            ("?", "This help"),
            ("!", "Logs"),
        ],
    ),
    (
        "Profile",
        &[
            ("r", "Reload"),
            ("m", "My profile"),
            ("e", "Edit (own profile)"),
            ("f", "Follow / Unfollow"),
            ("1 / 2", "Followers / Followings"),
            ("h / Backspace", "Previous profile"),
        ],
    ),
    (
        "Follow list",
        &[
            ("j / k", "Down / Up"),
            ("Enter / l", "Open profile"),
            ("Tab", "Followers ↔ Followings"),
            ("Esc / h", "Back to profile"),
        ],
    ),
    (
        "Edit",
        &[
            ("Tab / ↑↓", "Next / Prev field"),
            ("← / →", "Move cursor, pick gender"),
            ("Enter", "Save"),
            ("Esc", "Cancel"),
        ],
    ),
];

pub fn render(frame: &mut Frame, area: Rect) {
    let content_width = 46u16;
    let content_height = count_lines() as u16 + 2; // border

    let panel_w = content_width.min(area.width.saturating_sub(4));
    let panel_h = content_height.min(area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(panel_w)) / 2;
    let y = area.y + (area.height.saturating_sub(panel_h)) / 2;
    let panel_area = Rect::new(x, y, panel_w, panel_h);

    frame.render_widget(Clear, panel_area);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));

    for (section_name, bindings) in HELP_SECTIONS {
        lines.push(Line::from(Span::styled(
            format!("  {section_name}"),
            Style::default().add_modifier(Modifier::BOLD),
        )));

        for (key, desc) in *bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<16}"), Theme::active()),
                Span::raw(*desc),
            ]));
        }

        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "         Press ? or Esc to close",
        Theme::secondary(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Key Bindings ",
            Style::default().add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(Paragraph::new(lines).block(block), panel_area);
}

fn count_lines() -> usize {
    let mut n = 1; // top padding
    for (_, bindings) in HELP_SECTIONS {
        n += bindings.len() + 2; // title + gap
    }
    n + 1 // close hint
}
