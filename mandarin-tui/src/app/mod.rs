mod actions;
mod event;
mod render;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mandarin_core::loader::{LoadTicket, ProfileLoader};
use mandarin_core::model::profile::RawProfile;
use mandarin_core::profile::FollowSummary;
use mandarin_core::{Credential, MandarinClient, ProfileApi, ProfileViewModel};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use crate::config::{auth_store, paths};
use crate::config::settings::Settings;
use crate::ui::edit_form::EditState;
use crate::ui::follow_list::FollowListState;
use crate::ui::log_view::{LogLevel, LogStore};

/// Results sent from background tasks to the main loop.
pub enum AppMessage {
    /// Terminal input from the reader thread.
    TermEvent(Event),
    ProfileLoaded {
        ticket: LoadTicket,
        target: Option<String>,
        step: HistoryStep,
        result: std::result::Result<ProfileViewModel, String>,
    },
    /// Own account name, looked up when another profile opens first.
    MeResolved(std::result::Result<String, String>),
    FollowToggled {
        accountname: String,
        following: bool,
        result: std::result::Result<RawProfile, String>,
    },
    FollowListLoaded {
        ticket: LoadTicket,
        result: std::result::Result<Vec<FollowSummary>, String>,
    },
    EditSubmitted(std::result::Result<ProfileViewModel, String>),
}

/// What a profile load does to the back stack once it succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStep {
    Keep,
    Push,
    Pop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Profile,
    FollowList,
    Edit,
}

pub struct App {
    pub running: bool,
    pub api: Arc<dyn ProfileApi>,
    /// `None` until a token is configured; nothing is fetched without it.
    pub credential: Option<Credential>,
    /// Signed-in account name, once known.
    pub me: Option<String>,
    /// `auth.json` that learns the account name; `None` leaves it alone.
    pub auth_path: Option<PathBuf>,
    pub screen: Screen,
    pub loader: ProfileLoader,
    pub list_loader: ProfileLoader,
    /// Account of the profile on screen; `None` is the signed-in account.
    /// Only changes once a load for another account succeeds.
    pub target: Option<String>,
    pub history: Vec<Option<String>>,
    pub profile: Option<ProfileViewModel>,
    pub loading: bool,
    pub follow_pending: bool,
    pub follow_list: Option<FollowListState>,
    pub edit: Option<EditState>,
    pub show_help: bool,
    pub show_logs: bool,
    pub logs: LogStore,
    pub msg_tx: mpsc::UnboundedSender<AppMessage>,
    msg_rx: mpsc::UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(settings: &Settings, initial: Option<String>) -> Result<Self> {
        let client = MandarinClient::new(Some(&settings.api.base_url))?;
        let (auth, auth_error) = match auth_store::load() {
            Ok(auth) => (auth, None),
            Err(e) => (None, Some(e)),
        };

        let mut app = Self::with_api(
            Arc::new(client),
            auth.as_ref().map(|a| a.credential()),
            auth.as_ref().and_then(|a| a.accountname.clone()),
            initial,
        );
        app.auth_path = paths::auth_file().ok();

        if let Some(e) = auth_error {
            app.logs.push(LogLevel::Error, format!("Could not read auth.json: {e:#}"));
        }
        if auth.is_none() {
            app.logs.push(
                LogLevel::Warn,
                format!(
                    "No token configured: write {{\"token\": \"...\"}} to auth.json or set {}",
                    auth_store::TOKEN_ENV
                ),
            );
        }
        Ok(app)
    }

    /// App over any [`ProfileApi`], starting on `initial` (`None` = own
    /// profile). Nothing is fetched until [`App::start`].
    pub fn with_api(
        api: Arc<dyn ProfileApi>,
        credential: Option<Credential>,
        me: Option<String>,
        initial: Option<String>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let target = initial.filter(|acc| me.as_deref() != Some(acc.as_str()));

        Self {
            running: true,
            api,
            credential,
            me,
            auth_path: None,
            screen: Screen::Profile,
            loader: ProfileLoader::new(),
            list_loader: ProfileLoader::new(),
            target,
            history: Vec::new(),
            profile: None,
            loading: false,
            follow_pending: false,
            follow_list: None,
            edit: None,
            show_help: false,
            show_logs: false,
            logs: LogStore::new(),
            msg_tx,
            msg_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        // dedicated reader thread so no key press is lost between draws
        let event_tx = self.msg_tx.clone();
        std::thread::spawn(move || {
            while let Ok(ev) = crossterm::event::read() {
                if event_tx.send(AppMessage::TermEvent(ev)).is_err() {
                    break;
                }
            }
        });

        self.start();

        while self.running {
            terminal.draw(|f| self.render(f))?;

            if let Some(msg) = self.msg_rx.recv().await {
                self.handle_message(msg);
            }
            // drain the backlog before the next draw
            while let Ok(msg) = self.msg_rx.try_recv() {
                self.handle_message(msg);
            }
        }
        Ok(())
    }
}
