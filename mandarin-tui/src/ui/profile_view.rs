use mandarin_core::ProfileViewModel;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::text::truncate_with_dots;
use super::theme::Theme;

/// Profile card: counters, names, pet summary, intro, tag badges, and the
/// action row (edit for the own profile, follow for everyone else).
pub fn render(frame: &mut Frame, area: Rect, view: Option<&ProfileViewModel>, loading: bool) {
    let card_w = 60u16.min(area.width.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(card_w) / 2;
    let card = Rect::new(x, area.y, card_w, area.height);

    let Some(view) = view else {
        let text = if loading { "Loading profile..." } else { "No profile loaded" };
        let placeholder = Paragraph::new(Line::from(Span::styled(text, Theme::secondary())))
            .alignment(Alignment::Center);
        frame.render_widget(placeholder, card);
        return;
    };

    let inner_w = card_w.saturating_sub(2) as usize;
    let lines = card_lines(view, inner_w);

    let title = if loading { " Profile · loading " } else { " Profile " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::secondary())
        .title(Span::styled(title, Theme::title()));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, card);
}

fn card_lines(view: &ProfileViewModel, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{}", view.follower_count), Theme::title()),
            Span::styled(" followers", Theme::secondary()),
            Span::raw("      "),
            Span::styled(format!("{}", view.following_count), Theme::title()),
            Span::styled(" followings", Theme::secondary()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            truncate_with_dots(&view.username, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("@ {}", view.accountname),
            Theme::secondary(),
        )),
    ];

    let summary = view.pet_summary();
    if !summary.is_empty() {
        lines.push(Line::from(Span::styled(summary, Theme::active())));
    }

    lines.push(Line::from(""));
    if !view.intro.is_empty() {
        lines.push(Line::from(view.intro.clone()));
        lines.push(Line::from(""));
    }

    let badges: Vec<Span> = view
        .tag_lines()
        .into_iter()
        .filter(|(key, _)| key != "Intro")
        .enumerate()
        .flat_map(|(i, (key, value))| {
            [
                Span::styled(format!(" {key} {value} "), Theme::tag_badge(i)),
                Span::raw(" "),
            ]
        })
        .collect();
    if !badges.is_empty() {
        lines.push(Line::from(badges));
        lines.push(Line::from(""));
    }

    lines.push(action_line(view));
    lines
}

fn action_line(view: &ProfileViewModel) -> Line<'static> {
    if view.is_own() {
        return Line::from(vec![
            Span::styled("[e]", Theme::highlight()),
            Span::raw(" Edit profile"),
        ]);
    }
    let (label, filled) = if view.is_following {
        (" Unfollow ", false)
    } else {
        (" Follow ", true)
    };
    Line::from(vec![
        Span::styled("[f]", Theme::highlight()),
        Span::raw(" "),
        Span::styled(label, Theme::button(filled)),
    ])
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mandarin_core::model::profile::{ProfileEnvelope, RawProfile};
    use mandarin_core::profile::assemble;

    use super::*;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn view(envelope: fn(RawProfile) -> ProfileEnvelope, is_follow: bool) -> ProfileViewModel {
        let raw = RawProfile {
            username: "몽이".into(),
            accountname: "mong".into(),
            intro: Some("#intro:hi #pet:dog #gender:여아 #birthdate:2024-05-01 #location:Seoul".into()),
            is_follow,
            follower_count: 3,
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        assemble(envelope(raw), today).unwrap()
    }

    #[test]
    fn own_card_offers_edit() {
        let lines = text(&card_lines(&view(ProfileEnvelope::own, false), 40));
        assert!(lines.iter().any(|l| l == "[e] Edit profile"));
        assert!(lines.iter().any(|l| l == "♀ dog 19일 Seoul"));
        assert!(lines.iter().any(|l| l.contains("Pet dog")));
        assert!(!lines.iter().any(|l| l.contains("Intro hi")));
    }

    #[test]
    fn other_card_offers_follow_state() {
        let lines = text(&card_lines(&view(ProfileEnvelope::other, false), 40));
        assert!(lines.iter().any(|l| l == "[f]  Follow "));

        let lines = text(&card_lines(&view(ProfileEnvelope::other, true), 40));
        assert!(lines.iter().any(|l| l == "[f]  Unfollow "));
    }
}
