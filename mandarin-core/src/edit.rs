use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::client::Credential;
use crate::endpoints::ProfileApi;
use crate::error::ProfileError;
use crate::intro::IntroFields;
use crate::model::profile::{UpdateProfileReq, UpdateUser};
use crate::profile::{ProfileViewModel, assemble};

/// Where the avatar comes from at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    None,
    /// Already hosted; sent back unchanged.
    Remote(String),
    /// Picked by the user; uploaded before the update.
    Local(PathBuf),
}

impl ImageSource {
    pub fn needs_upload(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub username: String,
    pub accountname: String,
    pub fields: IntroFields,
    pub image: ImageSource,
}

impl EditForm {
    /// Prefills the form from the signed-in account's profile.
    pub fn from_view(view: &ProfileViewModel) -> Self {
        let image = if view.image.is_empty() {
            ImageSource::None
        } else {
            ImageSource::Remote(view.image.clone())
        };
        Self {
            username: view.username.clone(),
            accountname: view.accountname.clone(),
            fields: view.metadata(),
            image,
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.username.trim().is_empty() {
            return Err(ProfileError::MissingField("username"));
        }
        if self.accountname.trim().is_empty() {
            return Err(ProfileError::MissingField("accountname"));
        }
        Ok(())
    }

    /// `PUT /user` body with the metadata packed into `intro`.
    pub fn to_request(&self, image: Option<String>) -> UpdateProfileReq {
        UpdateProfileReq {
            user: UpdateUser {
                username: self.username.trim().to_string(),
                accountname: self.accountname.trim().to_string(),
                intro: self.fields.encode(),
                image,
            },
        }
    }
}

/// Uploads a newly picked image if there is one, then sends the update.
/// Any failure before the update aborts the whole submission.
pub async fn submit(
    api: &dyn ProfileApi,
    credential: &Credential,
    form: &EditForm,
    today: NaiveDate,
) -> Result<ProfileViewModel> {
    form.validate()?;

    if let Err(e) = form.fields.check_lossless() {
        tracing::warn!(error = %e, "intro will not decode back unchanged");
    }

    let image = match &form.image {
        ImageSource::None => None,
        ImageSource::Remote(url) => Some(url.clone()),
        ImageSource::Local(path) => Some(upload_local(api, credential, path).await?),
    };

    let req = form.to_request(image);
    let envelope = api.update_profile(credential, &req).await?;
    let view = assemble(envelope, today)?;
    tracing::info!(accountname = %view.accountname, "profile updated");
    Ok(view)
}

async fn upload_local(api: &dyn ProfileApi, credential: &Credential, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let url = api
        .upload_image(credential, &file_name, bytes)
        .await
        .map_err(|e| ProfileError::Upload(format!("{e:#}")))?;
    tracing::debug!(%url, "image uploaded");
    Ok(url)
}
