use mandarin_core::loader::LoadTicket;
use mandarin_core::model::profile::FollowKind;
use mandarin_core::profile::FollowSummary;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::text::truncate_with_dots;
use super::theme::Theme;

pub struct FollowListState {
    pub kind: FollowKind,
    /// Whose followers/followings are listed.
    pub accountname: String,
    pub rows: Vec<FollowSummary>,
    pub selected: usize,
    pub scroll: usize,
    /// Set while a fetch is in flight.
    pub pending: Option<LoadTicket>,
}

impl FollowListState {
    pub fn new(accountname: String, kind: FollowKind) -> Self {
        Self {
            kind,
            accountname,
            rows: Vec::new(),
            selected: 0,
            scroll: 0,
            pending: None,
        }
    }

    pub fn set_rows(&mut self, rows: Vec<FollowSummary>) {
        self.rows = rows;
        self.selected = 0;
        self.scroll = 0;
        self.pending = None;
    }

    pub fn selected_row(&self) -> Option<&FollowSummary> {
        self.rows.get(self.selected)
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keeps the selection within `visible` rows.
    fn adjust_scroll(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + visible {
            self.scroll = self.selected + 1 - visible;
        }
    }
}

fn kind_title(kind: FollowKind) -> &'static str {
    match kind {
        FollowKind::Follower => "Followers",
        FollowKind::Following => "Followings",
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &mut FollowListState) {
    let title = format!(" {} · @{} ", kind_title(state.kind), state.accountname);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::secondary())
        .title(Span::styled(title, Theme::title()));

    let inner_w = area.width.saturating_sub(2) as usize;
    // two lines per row
    let visible = (area.height.saturating_sub(2) / 2) as usize;
    state.adjust_scroll(visible);

    let mut lines: Vec<Line> = Vec::new();
    if state.pending.is_some() {
        lines.push(Line::from(Span::styled(" Loading...", Theme::secondary())));
    } else if state.rows.is_empty() {
        lines.push(Line::from(Span::styled(" Nobody here yet", Theme::secondary())));
    }

    if state.pending.is_none() {
        for (i, row) in state.rows.iter().enumerate().skip(state.scroll).take(visible) {
            let selected = i == state.selected;
            let marker = if row.is_following { "  ✓ following" } else { "" };
            let mut name_line = Line::from(vec![
                Span::styled(format!(" {} ", row.username), Theme::title()),
                Span::styled(format!("@{}", row.accountname), Theme::secondary()),
                Span::styled(marker, Theme::success()),
            ]);
            let mut intro_line = Line::from(Span::styled(
                format!(" {}", truncate_with_dots(&row.intro, inner_w.saturating_sub(1))),
                Theme::secondary(),
            ));
            if selected {
                name_line = name_line.style(Theme::selected_row());
                intro_line = intro_line.style(Theme::selected_row());
            }
            lines.push(name_line);
            lines.push(intro_line);
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
