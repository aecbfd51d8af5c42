use std::path::Path;

use anyhow::{Context, Result};
use mandarin_core::Credential;
use serde::{Deserialize, Serialize};

use super::paths;

/// Overrides the token stored in `auth.json`.
pub const TOKEN_ENV: &str = "MANDARIN_TOKEN";

/// `auth.json` contents. The token is issued elsewhere (the web client's
/// login); this app only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAuth {
    pub token: String,
    /// Own account name, refreshed after each successful own-profile load.
    #[serde(default)]
    pub accountname: Option<String>,
}

impl StoredAuth {
    pub fn credential(&self) -> Credential {
        Credential::new(self.token.clone())
    }
}

pub fn load() -> Result<Option<StoredAuth>> {
    let stored = load_from(&paths::auth_file()?)?;
    Ok(apply_env(stored, std::env::var(TOKEN_ENV).ok()))
}

pub fn load_from(path: &Path) -> Result<Option<StoredAuth>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let data: StoredAuth =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(data))
}

fn apply_env(stored: Option<StoredAuth>, env_token: Option<String>) -> Option<StoredAuth> {
    match env_token.filter(|t| !t.trim().is_empty()) {
        Some(token) => Some(StoredAuth {
            token: token.trim().to_string(),
            accountname: stored.and_then(|s| s.accountname),
        }),
        None => stored,
    }
}

/// Records the signed-in account name in the `auth.json` at `path`. Does
/// nothing when the token only comes from the environment.
pub fn remember_accountname_in(path: &Path, accountname: &str) -> Result<()> {
    let Some(mut data) = load_from(path)? else {
        return Ok(());
    };
    if data.accountname.as_deref() != Some(accountname) {
        data.accountname = Some(accountname.to_string());
        save_to(path, &data)?;
    }
    Ok(())
}

pub fn save_to(path: &Path, data: &StoredAuth) -> Result<()> {
    let content = serde_json::to_string_pretty(data)?;
    std::fs::write(path, content)?;

    // owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_from(&dir.path().join("auth.json")).unwrap(), None);
    }

    #[test]
    fn saved_auth_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let auth = StoredAuth {
            token: "abc".into(),
            accountname: Some("kong".into()),
        };
        save_to(&path, &auth).unwrap();

        assert_eq!(load_from(&path).unwrap(), Some(auth));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn account_name_is_written_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");

        remember_accountname_in(&path, "kong").unwrap();
        assert!(!path.exists());

        save_to(
            &path,
            &StoredAuth {
                token: "abc".into(),
                accountname: None,
            },
        )
        .unwrap();
        remember_accountname_in(&path, "kong").unwrap();
        let stored = load_from(&path).unwrap().unwrap();
        assert_eq!(stored.token, "abc");
        assert_eq!(stored.accountname.as_deref(), Some("kong"));
    }

    #[test]
    fn env_token_replaces_stored_token() {
        let stored = Some(StoredAuth {
            token: "file".into(),
            accountname: Some("kong".into()),
        });
        let merged = apply_env(stored.clone(), Some(" env ".into())).unwrap();
        assert_eq!(merged.token, "env");
        assert_eq!(merged.accountname.as_deref(), Some("kong"));

        assert_eq!(apply_env(stored.clone(), Some("  ".into())), stored);
        assert_eq!(apply_env(None, None), None);
    }
}
