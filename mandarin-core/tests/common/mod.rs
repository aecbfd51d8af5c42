//! In-memory `ProfileApi` that records every call.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::oneshot;

use mandarin_core::model::profile::{FollowKind, ProfileEnvelope, RawProfile, UpdateProfileReq};
use mandarin_core::{Credential, ProfileApi};

pub const UPLOAD_BASE: &str = "https://files.test";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(Option<String>),
    Update(UpdateProfileReq),
    Upload { file_name: String, len: usize },
    Follow { accountname: String, follow: bool },
    List { accountname: String, kind: FollowKind },
}

struct Gate {
    accountname: String,
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

#[derive(Default)]
pub struct FakeApi {
    /// `None` key is the signed-in account.
    profiles: Mutex<HashMap<Option<String>, RawProfile>>,
    calls: Mutex<Vec<Call>>,
    gate: Mutex<Option<Gate>>,
    fail_upload: bool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn with_own(self, raw: RawProfile) -> Self {
        self.profiles.lock().unwrap().insert(None, raw);
        self
    }

    pub fn with_other(self, raw: RawProfile) -> Self {
        let key = Some(raw.accountname.clone());
        self.profiles.lock().unwrap().insert(key, raw);
        self
    }

    /// Holds the next fetch of `accountname`: signals `entered` once the
    /// fetch starts and waits for `release`.
    pub fn gate(
        self,
        accountname: &str,
        entered: oneshot::Sender<()>,
        release: oneshot::Receiver<()>,
    ) -> Self {
        *self.gate.lock().unwrap() = Some(Gate {
            accountname: accountname.to_string(),
            entered,
            release,
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_gate(&self, accountname: Option<&str>) -> Option<Gate> {
        let mut slot = self.gate.lock().unwrap();
        let matches = slot
            .as_ref()
            .is_some_and(|gate| Some(gate.accountname.as_str()) == accountname);
        if matches { slot.take() } else { None }
    }
}

pub fn raw_profile(accountname: &str, intro: &str) -> RawProfile {
    RawProfile {
        id: format!("id-{accountname}"),
        username: format!("{accountname} 보호자"),
        accountname: accountname.to_string(),
        intro: Some(intro.to_string()),
        image: format!("{UPLOAD_BASE}/{accountname}.png"),
        follower_count: 1,
        following_count: 2,
        ..Default::default()
    }
}

#[async_trait]
impl ProfileApi for FakeApi {
    async fn fetch_profile(
        &self,
        _credential: &Credential,
        accountname: Option<&str>,
    ) -> Result<ProfileEnvelope> {
        self.record(Call::Fetch(accountname.map(str::to_string)));

        if let Some(gate) = self.take_gate(accountname) {
            let _ = gate.entered.send(());
            let _ = gate.release.await;
        }

        let key = accountname.map(str::to_string);
        let raw = self.profiles.lock().unwrap().get(&key).cloned();
        Ok(match (raw, accountname) {
            (Some(raw), None) => ProfileEnvelope::own(raw),
            (Some(raw), Some(_)) => ProfileEnvelope::other(raw),
            (None, _) => ProfileEnvelope::default(),
        })
    }

    async fn update_profile(
        &self,
        _credential: &Credential,
        req: &UpdateProfileReq,
    ) -> Result<ProfileEnvelope> {
        self.record(Call::Update(req.clone()));
        Ok(ProfileEnvelope::own(RawProfile {
            username: req.user.username.clone(),
            accountname: req.user.accountname.clone(),
            intro: Some(req.user.intro.clone()),
            image: req.user.image.clone().unwrap_or_default(),
            ..Default::default()
        }))
    }

    async fn upload_image(
        &self,
        _credential: &Credential,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        self.record(Call::Upload {
            file_name: file_name.to_string(),
            len: bytes.len(),
        });
        if self.fail_upload {
            return Err(anyhow!("[/image/uploadfile] 413 payload too large"));
        }
        Ok(format!("{UPLOAD_BASE}/{file_name}"))
    }

    async fn set_follow(
        &self,
        _credential: &Credential,
        accountname: &str,
        follow: bool,
    ) -> Result<ProfileEnvelope> {
        self.record(Call::Follow {
            accountname: accountname.to_string(),
            follow,
        });
        let key = Some(accountname.to_string());
        let mut profiles = self.profiles.lock().unwrap();
        let raw = profiles
            .get_mut(&key)
            .ok_or_else(|| anyhow!("[/profile/{accountname}] 해당 계정이 존재하지 않습니다."))?;
        raw.is_follow = follow;
        if follow {
            raw.follower_count += 1;
        } else {
            raw.follower_count = raw.follower_count.saturating_sub(1);
        }
        Ok(ProfileEnvelope::other(raw.clone()))
    }

    async fn follow_list(
        &self,
        _credential: &Credential,
        accountname: &str,
        kind: FollowKind,
    ) -> Result<Vec<RawProfile>> {
        self.record(Call::List {
            accountname: accountname.to_string(),
            kind,
        });
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.as_deref() != Some(accountname))
            .map(|(_, raw)| raw.clone())
            .collect())
    }
}
