use chrono::Local;
use mandarin_core::edit;
use mandarin_core::loader::{LoadTicket, fetch_view};
use mandarin_core::model::profile::{FollowKind, RawProfile};
use mandarin_core::profile::FollowSummary;
use mandarin_core::{Credential, ProfileShape, ProfileViewModel};

use crate::config::auth_store;
use crate::ui::edit_form::EditState;
use crate::ui::follow_list::FollowListState;
use crate::ui::log_view::LogLevel;

use super::{App, AppMessage, HistoryStep, Screen};

impl App {
    fn require_credential(&mut self) -> Option<Credential> {
        if self.credential.is_none() {
            self.logs.push(
                LogLevel::Warn,
                format!("Not signed in: set {} or fill auth.json", auth_store::TOKEN_ENV),
            );
        }
        self.credential.clone()
    }

    // profile

    /// First fetch. When another account opens before the own name is
    /// known, the own profile is looked up too so that account can be
    /// recognised as ours.
    pub(crate) fn start(&mut self) {
        let initial = self.target.clone();
        let resolve_me = self.me.is_none() && initial.is_some();
        self.load_profile(initial, HistoryStep::Keep);
        if resolve_me {
            self.resolve_me();
        }
    }

    /// Fetches `target` (`None` = own profile) under a fresh ticket; any
    /// earlier fetch still in flight becomes stale. The current view and
    /// its target stay on screen until the result is accepted.
    pub(crate) fn load_profile(&mut self, target: Option<String>, step: HistoryStep) {
        let Some(credential) = self.require_credential() else {
            return;
        };

        let ticket = self.loader.begin();
        self.loading = true;
        self.screen = Screen::Profile;

        let tx = self.msg_tx.clone();
        let api = self.api.clone();
        tokio::spawn(async move {
            let today = Local::now().date_naive();
            let result = fetch_view(api.as_ref(), &credential, target.as_deref(), today).await;
            let _ = tx.send(AppMessage::ProfileLoaded {
                ticket,
                target,
                step,
                result: result.map_err(|e| format!("{e:#}")),
            });
        });
    }

    pub(crate) fn reload_profile(&mut self) {
        self.load_profile(self.target.clone(), HistoryStep::Keep);
    }

    pub(crate) fn open_own_profile(&mut self) {
        self.load_profile(None, HistoryStep::Push);
    }

    pub(crate) fn open_account(&mut self, accountname: String) {
        let target = if self.me.as_deref() == Some(accountname.as_str()) {
            None
        } else {
            Some(accountname)
        };
        self.load_profile(target, HistoryStep::Push);
    }

    /// The entry is only popped once the previous profile has loaded again.
    pub(crate) fn go_back(&mut self) {
        if let Some(previous) = self.history.last().cloned() {
            self.load_profile(previous, HistoryStep::Pop);
        }
    }

    pub(crate) fn on_profile_loaded(
        &mut self,
        ticket: LoadTicket,
        target: Option<String>,
        step: HistoryStep,
        result: Result<ProfileViewModel, String>,
    ) {
        let Some(result) = self.loader.accept(ticket, result) else {
            return;
        };
        self.loading = false;
        let view = match result {
            Ok(view) => view,
            Err(e) => {
                self.logs.push(LogLevel::Error, format!("Failed to load profile: {e}"));
                return;
            }
        };

        match step {
            HistoryStep::Keep => {}
            HistoryStep::Push => {
                if self.profile.is_some() && self.target != target {
                    self.history.push(self.target.clone());
                }
            }
            HistoryStep::Pop => {
                if self.history.last() == Some(&target) {
                    self.history.pop();
                }
            }
        }

        if view.is_own() {
            self.remember_me(&view.accountname);
        }
        self.target = target;
        self.profile = Some(view);
        self.claim_own_view();
    }

    fn resolve_me(&mut self) {
        let Some(credential) = self.credential.clone() else {
            return;
        };
        let tx = self.msg_tx.clone();
        let api = self.api.clone();
        tokio::spawn(async move {
            let result = api
                .fetch_profile(&credential, None)
                .await
                .and_then(|envelope| Ok(envelope.into_shape()?.1.accountname))
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send(AppMessage::MeResolved(result));
        });
    }

    pub(crate) fn on_me_resolved(&mut self, result: Result<String, String>) {
        match result {
            Ok(accountname) if !accountname.is_empty() => {
                self.remember_me(&accountname);
                self.claim_own_view();
            }
            Ok(_) => {}
            Err(e) => self.logs.push(LogLevel::Warn, format!("Could not look up own account: {e}")),
        }
    }

    fn remember_me(&mut self, accountname: &str) {
        if self.me.as_deref() == Some(accountname) {
            return;
        }
        self.me = Some(accountname.to_string());
        let Some(path) = &self.auth_path else {
            return;
        };
        if let Err(e) = auth_store::remember_accountname_in(path, accountname) {
            self.logs.push(LogLevel::Warn, format!("Could not update auth.json: {e:#}"));
        }
    }

    /// A profile opened by name that turns out to be the signed-in account
    /// is shown as the own profile: edit instead of follow.
    fn claim_own_view(&mut self) {
        let Some(me) = self.me.as_deref() else {
            return;
        };
        if let Some(view) = self
            .profile
            .as_mut()
            .filter(|v| !v.is_own() && v.accountname == me)
        {
            view.shape = ProfileShape::Own;
            view.is_following = false;
            self.target = None;
        }
        let me = Some(me.to_string());
        for entry in self.history.iter_mut().filter(|entry| **entry == me) {
            *entry = None;
        }
    }

    // follow

    pub(crate) fn toggle_follow(&mut self) {
        let Some(view) = &self.profile else {
            return;
        };
        if view.is_own() || self.loading || self.follow_pending {
            return;
        }
        let accountname = view.accountname.clone();
        let following = !view.is_following;
        let Some(credential) = self.require_credential() else {
            return;
        };
        self.follow_pending = true;

        let tx = self.msg_tx.clone();
        let api = self.api.clone();
        tokio::spawn(async move {
            let result = api
                .set_follow(&credential, &accountname, following)
                .await
                .and_then(|envelope| Ok(envelope.into_shape()?.1))
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send(AppMessage::FollowToggled {
                accountname,
                following,
                result,
            });
        });
    }

    pub(crate) fn on_follow_toggled(
        &mut self,
        accountname: String,
        following: bool,
        result: Result<RawProfile, String>,
    ) {
        self.follow_pending = false;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                self.logs.push(LogLevel::Error, format!("Follow update failed: {e}"));
                return;
            }
        };

        if let Some(view) = self.profile.as_mut().filter(|v| v.accountname == accountname) {
            view.apply_follow(&raw, following);
        }
        if let Some(list) = &mut self.follow_list {
            for row in list.rows.iter_mut().filter(|r| r.accountname == accountname) {
                row.is_following = following;
            }
        }

        let verb = if following { "Following" } else { "Unfollowed" };
        self.logs.push(LogLevel::Info, format!("{verb} @{accountname}"));
    }

    pub(crate) fn open_follow_list(&mut self, kind: FollowKind) {
        let Some(accountname) = self.profile.as_ref().map(|v| v.accountname.clone()) else {
            return;
        };
        self.load_follow_list(accountname, kind);
    }

    /// Followers ↔ followings of the same account.
    pub(crate) fn switch_follow_kind(&mut self) {
        if let Some(list) = &self.follow_list {
            let (accountname, kind) = (list.accountname.clone(), list.kind.toggle());
            self.load_follow_list(accountname, kind);
        }
    }

    fn load_follow_list(&mut self, accountname: String, kind: FollowKind) {
        let Some(credential) = self.require_credential() else {
            return;
        };
        let ticket = self.list_loader.begin();
        let mut state = FollowListState::new(accountname.clone(), kind);
        state.pending = Some(ticket);
        self.follow_list = Some(state);
        self.screen = Screen::FollowList;

        let tx = self.msg_tx.clone();
        let api = self.api.clone();
        tokio::spawn(async move {
            let result = api
                .follow_list(&credential, &accountname, kind)
                .await
                .map(|rows| rows.into_iter().map(FollowSummary::from).collect())
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send(AppMessage::FollowListLoaded { ticket, result });
        });
    }

    pub(crate) fn on_follow_list_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<FollowSummary>, String>,
    ) {
        let Some(result) = self.list_loader.accept(ticket, result) else {
            return;
        };
        let Some(list) = &mut self.follow_list else {
            return;
        };
        match result {
            Ok(rows) => list.set_rows(rows),
            Err(e) => {
                list.pending = None;
                self.logs.push(LogLevel::Error, format!("Failed to load list: {e}"));
            }
        }
    }

    pub(crate) fn open_selected_follow(&mut self) {
        let selected = self
            .follow_list
            .as_ref()
            .and_then(|list| list.selected_row())
            .map(|row| row.accountname.clone());
        if let Some(accountname) = selected {
            self.open_account(accountname);
        }
    }

    pub(crate) fn close_follow_list(&mut self) {
        self.list_loader.begin();
        self.follow_list = None;
        self.screen = Screen::Profile;
    }

    // edit

    pub(crate) fn open_edit(&mut self) {
        match &self.profile {
            Some(view) if view.is_own() && !self.loading => {
                self.edit = Some(EditState::from_view(view));
                self.screen = Screen::Edit;
            }
            Some(_) => {}
            None => self.logs.push(LogLevel::Warn, "Profile is not loaded yet".to_string()),
        }
    }

    pub(crate) fn cancel_edit(&mut self) {
        self.edit = None;
        self.screen = Screen::Profile;
    }

    pub(crate) fn submit_edit(&mut self) {
        let credential = self.credential.clone();
        let Some(state) = self.edit.as_mut() else {
            return;
        };
        if state.submitting {
            return;
        }
        let form = match state.to_form() {
            Ok(form) => form,
            Err(e) => {
                state.error = Some(e);
                return;
            }
        };
        let Some(credential) = credential else {
            state.error = Some("Not signed in".to_string());
            return;
        };
        state.submitting = true;
        state.error = None;

        let tx = self.msg_tx.clone();
        let api = self.api.clone();
        tokio::spawn(async move {
            let today = Local::now().date_naive();
            let result = edit::submit(api.as_ref(), &credential, &form, today)
                .await
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send(AppMessage::EditSubmitted(result));
        });
    }

    pub(crate) fn on_edit_submitted(&mut self, result: Result<ProfileViewModel, String>) {
        match result {
            Ok(view) => {
                // an older fetch must not replace the saved profile
                self.loader.begin();
                self.loading = false;
                self.remember_me(&view.accountname);
                self.target = None;
                self.profile = Some(view);
                self.edit = None;
                self.screen = Screen::Profile;
                self.logs.push(LogLevel::Info, "Profile saved".to_string());
            }
            Err(e) => {
                self.logs.push(LogLevel::Error, format!("Profile update failed: {e}"));
                if let Some(state) = &mut self.edit {
                    state.submitting = false;
                    state.error = Some(e);
                }
            }
        }
    }
}
