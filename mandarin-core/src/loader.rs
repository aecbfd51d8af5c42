//! Guards view state against responses that arrive after the user has
//! already moved on to another profile.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use chrono::NaiveDate;

use crate::client::Credential;
use crate::endpoints::ProfileApi;
use crate::profile::{ProfileViewModel, assemble};

/// Stamp of one load; only the most recently issued ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub enum LoadOutcome {
    Ready(Result<ProfileViewModel>),
    /// A newer load started while this one was in flight.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileLoader {
    generation: Arc<AtomicU64>,
}

impl ProfileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation, superseding every earlier ticket.
    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Passes `value` through only while `ticket` is current.
    pub fn accept<T>(&self, ticket: LoadTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "dropping stale profile result");
            None
        }
    }

    /// Fetch and assemble under a fresh ticket. The ticket is taken when
    /// `load` is called, so load order is call order even if the returned
    /// futures are polled out of order.
    pub fn load<'a>(
        &self,
        api: &'a dyn ProfileApi,
        credential: &'a Credential,
        accountname: Option<&'a str>,
        today: NaiveDate,
    ) -> impl Future<Output = LoadOutcome> + Send + use<'a> {
        let ticket = self.begin();
        let loader = self.clone();
        async move {
            let result = fetch_view(api, credential, accountname, today).await;
            match loader.accept(ticket, result) {
                Some(result) => LoadOutcome::Ready(result),
                None => LoadOutcome::Stale,
            }
        }
    }
}

/// One profile fetch followed by assembly. Format errors surface as
/// [`crate::ProfileError`] inside the `anyhow::Error`.
pub async fn fetch_view(
    api: &dyn ProfileApi,
    credential: &Credential,
    accountname: Option<&str>,
    today: NaiveDate,
) -> Result<ProfileViewModel> {
    let envelope = api.fetch_profile(credential, accountname).await?;
    Ok(assemble(envelope, today)?)
}
