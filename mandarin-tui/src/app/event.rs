use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use mandarin_core::model::profile::FollowKind;

use crate::ui::edit_form::EditField;

use super::{App, AppMessage, Screen};

impl App {
    pub(crate) fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::TermEvent(ev) => self.handle_event(ev),
            AppMessage::ProfileLoaded {
                ticket,
                target,
                step,
                result,
            } => self.on_profile_loaded(ticket, target, step, result),
            AppMessage::MeResolved(result) => self.on_me_resolved(result),
            AppMessage::FollowToggled {
                accountname,
                following,
                result,
            } => self.on_follow_toggled(accountname, following, result),
            AppMessage::FollowListLoaded { ticket, result } => {
                self.on_follow_list_loaded(ticket, result)
            }
            AppMessage::EditSubmitted(result) => self.on_edit_submitted(result),
        }
    }

    pub(crate) fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        // Windows reports releases too
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        // overlays swallow everything but their own keys
        if self.show_help {
            if matches!(key.code, KeyCode::Char('q' | '?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }
        if self.show_logs {
            match key.code {
                KeyCode::Char('q' | '!') | KeyCode::Esc => self.show_logs = false,
                KeyCode::Char('j') | KeyCode::Down => self.logs.scroll_down(),
                KeyCode::Char('k') | KeyCode::Up => self.logs.scroll_up(),
                _ => {}
            }
            return;
        }

        match self.screen {
            Screen::Profile => self.handle_profile_key(key),
            Screen::FollowList => self.handle_list_key(key),
            Screen::Edit => self.handle_edit_key(key),
        }
    }

    /// Keys shared by the read-only screens. Returns whether `key` was used.
    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('!') => {
                self.show_logs = true;
                self.logs.mark_read();
            }
            _ => return false,
        }
        true
    }

    fn handle_profile_key(&mut self, key: KeyEvent) {
        if self.handle_global_key(key) {
            return;
        }
        match key.code {
            KeyCode::Char('r') => self.reload_profile(),
            KeyCode::Char('m') => self.open_own_profile(),
            KeyCode::Char('e') => self.open_edit(),
            KeyCode::Char('f') => self.toggle_follow(),
            KeyCode::Char('1') => self.open_follow_list(FollowKind::Follower),
            KeyCode::Char('2') => self.open_follow_list(FollowKind::Following),
            KeyCode::Char('h') | KeyCode::Backspace | KeyCode::Left => self.go_back(),
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        if self.handle_global_key(key) {
            return;
        }
        let Some(list) = &mut self.follow_list else {
            self.screen = Screen::Profile;
            return;
        };
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => list.move_down(),
            KeyCode::Char('k') | KeyCode::Up => list.move_up(),
            KeyCode::Char('g') => list.selected = 0,
            KeyCode::Char('G') => list.selected = list.rows.len().saturating_sub(1),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => self.open_selected_follow(),
            KeyCode::Tab => self.switch_follow_kind(),
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => self.close_follow_list(),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(state) = &mut self.edit else {
            self.screen = Screen::Profile;
            return;
        };
        if state.submitting {
            return;
        }

        match key.code {
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Enter => self.submit_edit(),
            KeyCode::Tab | KeyCode::Down => state.focus_next(),
            KeyCode::BackTab | KeyCode::Up => state.focus_prev(),
            KeyCode::Left | KeyCode::Right if state.focused == EditField::Gender => {
                state.cycle_gender(key.code == KeyCode::Right);
            }
            code => {
                let Some(input) = state.current_input() else {
                    return;
                };
                match code {
                    KeyCode::Char(c) => input.insert(c),
                    KeyCode::Backspace => input.backspace(),
                    KeyCode::Delete => input.delete(),
                    KeyCode::Left => input.move_left(),
                    KeyCode::Right => input.move_right(),
                    KeyCode::Home => input.home(),
                    KeyCode::End => input.end(),
                    _ => {}
                }
            }
        }
    }
}
