use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::theme::Theme;

use super::{App, Screen};

impl App {
    pub(crate) fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);

        match self.screen {
            Screen::Profile => {
                crate::ui::profile_view::render(frame, chunks[1], self.profile.as_ref(), self.loading);
            }
            Screen::FollowList => {
                if let Some(list) = &mut self.follow_list {
                    crate::ui::follow_list::render(frame, chunks[1], list);
                }
            }
            Screen::Edit => {
                if let Some(edit) = &self.edit {
                    crate::ui::edit_form::render(frame, chunks[1], edit);
                }
            }
        }

        self.render_footer(frame, chunks[2]);

        if self.show_logs {
            crate::ui::log_view::render(frame, frame.area(), &self.logs);
        }
        if self.show_help {
            crate::ui::help::render(frame, frame.area());
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = Span::styled("  MANDARIN", Theme::title());
        let status = match (&self.credential, &self.me) {
            (None, _) => Span::styled("  signed out", Theme::error()),
            (Some(_), Some(me)) => Span::styled(format!("  @{me}"), Theme::secondary()),
            (Some(_), None) => Span::styled("  signed in", Theme::secondary()),
        };

        let mut right = String::new();
        if self.follow_pending {
            right.push_str("updating follow… ");
        }
        if self.logs.unread_count > 0 {
            right.push_str(&format!("[{} new log] ", self.logs.unread_count));
        }

        let left_width = title.content.width() + status.content.width();
        let pad = (area.width as usize).saturating_sub(left_width + right.width());
        let line = Line::from(vec![
            title,
            status,
            Span::raw(" ".repeat(pad)),
            Span::styled(right, Theme::active()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let hints: Vec<(&str, &str)> = match self.screen {
            Screen::Profile if self.profile.as_ref().is_some_and(|v| v.is_own()) => {
                vec![("e", "edit"), ("1/2", "lists"), ("r", "reload"), ("?", "help")]
            }
            Screen::Profile => vec![
                ("f", "follow"),
                ("1/2", "lists"),
                ("m", "me"),
                ("h", "back"),
                ("?", "help"),
            ],
            Screen::FollowList => vec![("j/k", "move"), ("Enter", "open"), ("Tab", "switch"), ("Esc", "back")],
            Screen::Edit => vec![("Tab", "next field"), ("Enter", "save"), ("Esc", "cancel")],
        };

        let spans: Vec<Span> = hints
            .iter()
            .flat_map(|(key, desc)| {
                [
                    Span::styled(format!(" {key}"), Theme::highlight()),
                    Span::styled(format!(" {desc} "), Theme::secondary()),
                ]
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            area,
        );
    }
}
