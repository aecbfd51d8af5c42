use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::client::{Credential, MandarinClient};
use crate::error::ProfileError;
use crate::model::image::UploadResp;
use crate::model::profile::{FollowKind, ProfileEnvelope, RawProfile, UpdateProfileReq};

pub const FOLLOW_PAGE_SIZE: u32 = 50;

/// Remote operations the profile flows depend on.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Own profile when `accountname` is `None`, otherwise that account's.
    async fn fetch_profile(
        &self,
        credential: &Credential,
        accountname: Option<&str>,
    ) -> Result<ProfileEnvelope>;

    async fn update_profile(
        &self,
        credential: &Credential,
        req: &UpdateProfileReq,
    ) -> Result<ProfileEnvelope>;

    /// Stores the image and returns its public URL.
    async fn upload_image(
        &self,
        credential: &Credential,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String>;

    async fn set_follow(
        &self,
        credential: &Credential,
        accountname: &str,
        follow: bool,
    ) -> Result<ProfileEnvelope>;

    async fn follow_list(
        &self,
        credential: &Credential,
        accountname: &str,
        kind: FollowKind,
    ) -> Result<Vec<RawProfile>>;
}

#[derive(Serialize)]
pub struct PageQuery {
    pub limit: u32,
    pub skip: u32,
}

impl MandarinClient {
    // profile

    pub async fn my_info(&self, credential: &Credential) -> Result<ProfileEnvelope> {
        self.get("/user/myinfo", credential).await
    }

    pub async fn profile(&self, credential: &Credential, accountname: &str) -> Result<ProfileEnvelope> {
        self.get(&Self::profile_path(accountname, None)?, credential)
            .await
    }

    pub async fn update_user(
        &self,
        credential: &Credential,
        req: &UpdateProfileReq,
    ) -> Result<ProfileEnvelope> {
        self.put("/user", req, credential).await
    }

    // image

    pub async fn upload_file(
        &self,
        credential: &Credential,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let resp: UploadResp = self
            .post_file("/image/uploadfile", "image", file_name, bytes, credential)
            .await?;
        match resp.filename {
            Some(filename) if !filename.is_empty() => Ok(self.file_url(&filename)),
            _ => Err(ProfileError::Upload("response carried no filename".to_string()).into()),
        }
    }

    // follow

    pub async fn follow(&self, credential: &Credential, accountname: &str) -> Result<ProfileEnvelope> {
        self.post(
            &Self::profile_path(accountname, Some("follow"))?,
            &serde_json::json!({}),
            credential,
        )
        .await
    }

    pub async fn unfollow(&self, credential: &Credential, accountname: &str) -> Result<ProfileEnvelope> {
        self.delete(&Self::profile_path(accountname, Some("unfollow"))?, credential)
            .await
    }

    pub async fn follow_page(
        &self,
        credential: &Credential,
        accountname: &str,
        kind: FollowKind,
        query: &PageQuery,
    ) -> Result<Vec<RawProfile>> {
        self.get_with_query(
            &Self::profile_path(accountname, Some(kind.path_segment()))?,
            query,
            credential,
        )
        .await
    }
}

#[async_trait]
impl ProfileApi for MandarinClient {
    async fn fetch_profile(
        &self,
        credential: &Credential,
        accountname: Option<&str>,
    ) -> Result<ProfileEnvelope> {
        match accountname {
            Some(name) => self.profile(credential, name).await,
            None => self.my_info(credential).await,
        }
    }

    async fn update_profile(
        &self,
        credential: &Credential,
        req: &UpdateProfileReq,
    ) -> Result<ProfileEnvelope> {
        self.update_user(credential, req).await
    }

    async fn upload_image(
        &self,
        credential: &Credential,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        self.upload_file(credential, file_name, bytes).await
    }

    async fn set_follow(
        &self,
        credential: &Credential,
        accountname: &str,
        follow: bool,
    ) -> Result<ProfileEnvelope> {
        if follow {
            self.follow(credential, accountname).await
        } else {
            self.unfollow(credential, accountname).await
        }
    }

    async fn follow_list(
        &self,
        credential: &Credential,
        accountname: &str,
        kind: FollowKind,
    ) -> Result<Vec<RawProfile>> {
        self.follow_page(
            credential,
            accountname,
            kind,
            &PageQuery {
                limit: FOLLOW_PAGE_SIZE,
                skip: 0,
            },
        )
        .await
    }
}
