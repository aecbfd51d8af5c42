use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProfileError;
use crate::profile::ProfileShape;

/// Profile object as the API sends it. `intro` is still tag-encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub accountname: String,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub image: String,
    /// Only present on other users' profiles.
    #[serde(rename = "isfollow", default)]
    pub is_follow: bool,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub follower: Vec<String>,
    #[serde(rename = "followerCount", default)]
    pub follower_count: u64,
    #[serde(rename = "followingCount", default)]
    pub following_count: u64,
    /// Everything else (`email`, timestamps, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `/user/myinfo` and `PUT /user` answer with `{"user": ...}`;
/// `/profile/{accountname}` and the follow endpoints with `{"profile": ...}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default)]
    pub user: Option<RawProfile>,
    #[serde(default)]
    pub profile: Option<RawProfile>,
}

impl ProfileEnvelope {
    pub fn own(raw: RawProfile) -> Self {
        Self {
            user: Some(raw),
            profile: None,
        }
    }

    pub fn other(raw: RawProfile) -> Self {
        Self {
            user: None,
            profile: Some(raw),
        }
    }

    /// `user` wins when both keys are present.
    pub fn into_shape(self) -> Result<(ProfileShape, RawProfile), ProfileError> {
        match (self.user, self.profile) {
            (Some(user), _) => Ok((ProfileShape::Own, user)),
            (None, Some(profile)) => Ok((ProfileShape::Other, profile)),
            (None, None) => Err(ProfileError::Format),
        }
    }
}

// request bodies

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateUser {
    pub username: String,
    pub accountname: String,
    pub intro: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// `PUT /user` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateProfileReq {
    pub user: UpdateUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowKind {
    Follower,
    Following,
}

impl FollowKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Follower => "follower",
            Self::Following => "following",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Follower => Self::Following,
            Self::Following => Self::Follower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_other_profile_envelope() {
        let body = r##"{
            "profile": {
                "_id": "abc",
                "username": "콩이",
                "accountname": "kong",
                "intro": "#intro:산책 좋아 #pet:dog #gender:남아 #birthdate:2024-01-01 #location:Seoul",
                "image": "https://api.mandarin.weniv.co.kr/1.png",
                "isfollow": true,
                "following": [],
                "follower": ["x", "y"],
                "followerCount": 2,
                "followingCount": 0
            }
        }"##;
        let envelope: ProfileEnvelope = serde_json::from_str(body).unwrap();
        let (shape, raw) = envelope.into_shape().unwrap();
        assert_eq!(shape, ProfileShape::Other);
        assert_eq!(raw.accountname, "kong");
        assert!(raw.intro.as_deref().is_some_and(|i| i.starts_with("#intro:산책")));
        assert!(raw.is_follow);
        assert_eq!(raw.follower, vec!["x", "y"]);
        assert_eq!(raw.follower_count, 2);
        assert!(raw.extra.is_empty());
    }

    #[test]
    fn own_profile_keeps_unmodelled_fields() {
        let body = r#"{"user": {"_id": "1", "username": "me", "email": "me@example.com",
            "accountname": "me", "image": "", "followerCount": 0, "followingCount": 3}}"#;
        let envelope: ProfileEnvelope = serde_json::from_str(body).unwrap();
        let (shape, raw) = envelope.into_shape().unwrap();
        assert_eq!(shape, ProfileShape::Own);
        assert_eq!(raw.intro, None);
        assert!(!raw.is_follow);
        assert_eq!(raw.extra.get("email"), Some(&Value::from("me@example.com")));
    }

    #[test]
    fn envelope_without_profile_is_a_format_error() {
        let envelope: ProfileEnvelope =
            serde_json::from_str(r#"{"message": "잘못된 접근입니다."}"#).unwrap();
        assert!(matches!(envelope.into_shape(), Err(ProfileError::Format)));
    }

    #[test]
    fn update_request_omits_missing_image() {
        let req = UpdateProfileReq {
            user: UpdateUser {
                username: "콩이".into(),
                accountname: "kong".into(),
                intro: "#intro: #pet: #gender: #birthdate: #location:".into(),
                image: None,
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["user"].get("image").is_none());
        assert_eq!(json["user"]["accountname"], "kong");
    }
}
