use anyhow::{Result, bail};
use reqwest::{StatusCode, Url};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;

use crate::model::ApiMessage;

pub const DEFAULT_BASE_URL: &str = "https://api.mandarin.weniv.co.kr";

/// Bearer token for one signed-in account. Passed to every call instead of
/// living inside the client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential").field("token", &"<redacted>").finish()
    }
}

#[derive(Clone)]
pub struct MandarinClient {
    http: reqwest::Client,
    base_url: String,
}

impl MandarinClient {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("mandarin-core/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Public URL of a file stored through `/image/uploadfile`.
    pub fn file_url(&self, filename: &str) -> String {
        format!("{}/{}", self.base_url, filename.trim_start_matches('/'))
    }

    /// `/profile/<accountname>[/<action>]` with the account name
    /// percent-encoded as one path segment, so `/`, `?` or `..` inside it
    /// cannot reach another endpoint.
    pub(crate) fn profile_path(accountname: &str, action: Option<&str>) -> Result<String> {
        if matches!(accountname.trim(), "" | "." | "..") {
            bail!("invalid account name {accountname:?}");
        }
        let mut url = Url::parse("http://localhost/profile")?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("profile url cannot take path segments"))?;
            segments.push(accountname);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url.path().to_string())
    }

    /// Parses a JSON body, falling back to the API's `{"message": ...}` error
    /// shape. Errors carry the request path and a snippet of the body.
    pub(crate) fn parse_response<T: serde::de::DeserializeOwned>(
        path: &str,
        status: StatusCode,
        text: &str,
    ) -> Result<T> {
        if status.is_success() {
            if let Ok(value) = serde_json::from_str::<T>(text) {
                return Ok(value);
            }
        }
        if let Ok(msg) = serde_json::from_str::<ApiMessage>(text) {
            bail!("[{}] {} (HTTP {})", path, msg, status.as_u16());
        }
        let snippet: String = text.chars().take(200).collect();
        bail!(
            "[{}] unexpected response (HTTP {}): {}",
            path,
            status.as_u16(),
            snippet
        );
    }

    async fn send<T: serde::de::DeserializeOwned>(
        path: &str,
        req: reqwest::RequestBuilder,
        credential: &Credential,
    ) -> Result<T> {
        tracing::debug!(path, "request");
        let resp = req.header(AUTHORIZATION, credential.bearer()).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        Self::parse_response(path, status, &text)
    }

    pub async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        credential: &Credential,
    ) -> Result<T> {
        Self::send(path, self.http.get(self.url(path)), credential).await
    }

    pub async fn get_with_query<Q: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
        credential: &Credential,
    ) -> Result<T> {
        Self::send(path, self.http.get(self.url(path)).query(query), credential).await
    }

    pub async fn post<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        credential: &Credential,
    ) -> Result<T> {
        Self::send(path, self.http.post(self.url(path)).json(body), credential).await
    }

    pub async fn put<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        credential: &Credential,
    ) -> Result<T> {
        Self::send(path, self.http.put(self.url(path)).json(body), credential).await
    }

    pub async fn delete<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        credential: &Credential,
    ) -> Result<T> {
        Self::send(path, self.http.delete(self.url(path)), credential).await
    }

    /// multipart POST with a single file part
    pub async fn post_file<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        field: &'static str,
        file_name: &str,
        bytes: Vec<u8>,
        credential: &Credential,
    ) -> Result<T> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part(field, part);
        Self::send(path, self.http.post(self.url(path)).multipart(form), credential).await
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Flag {
        ok: bool,
    }

    #[test]
    fn parses_success_body() {
        let flag: Flag =
            MandarinClient::parse_response("/flag", StatusCode::OK, r#"{"ok": true}"#).unwrap();
        assert!(flag.ok);
    }

    #[test]
    fn api_message_becomes_error() {
        let err = MandarinClient::parse_response::<Flag>(
            "/profile/nobody",
            StatusCode::NOT_FOUND,
            r#"{"message": "해당 계정이 존재하지 않습니다.", "status": 404}"#,
        )
        .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("/profile/nobody"));
        assert!(text.contains("해당 계정이 존재하지 않습니다."));
        assert!(text.contains("404"));
    }

    #[test]
    fn message_on_success_status_is_still_an_error() {
        let err = MandarinClient::parse_response::<Flag>(
            "/user",
            StatusCode::OK,
            r#"{"message": "이미 사용중인 계정 ID입니다."}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("이미 사용중인 계정 ID입니다."));
    }

    #[test]
    fn non_json_body_is_truncated_on_char_boundary() {
        let body = "오류".repeat(300);
        let err =
            MandarinClient::parse_response::<Flag>("/x", StatusCode::BAD_GATEWAY, &body)
                .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("unexpected response (HTTP 502)"));
        assert!(text.chars().filter(|c| *c == '오').count() == 100);
    }

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let client = MandarinClient::new(Some("https://example.test/")).unwrap();
        assert_eq!(client.url("/user/myinfo"), "https://example.test/user/myinfo");
        assert_eq!(client.file_url("1700.png"), "https://example.test/1700.png");
        assert_eq!(client.file_url("/1700.png"), "https://example.test/1700.png");
    }

    #[test]
    fn account_names_stay_inside_profile_paths() {
        let path = |name: &str, action: Option<&str>| {
            MandarinClient::profile_path(name, action).unwrap()
        };
        assert_eq!(path("kong", None), "/profile/kong");
        assert_eq!(path("kong", Some("follow")), "/profile/kong/follow");
        assert_eq!(path("../user", None), "/profile/..%2Fuser");
        assert_eq!(path("kong?x=1", None), "/profile/kong%3Fx=1");
        assert_eq!(path("a/b", Some("unfollow")), "/profile/a%2Fb/unfollow");
        assert_eq!(path("콩이", None), "/profile/%EC%BD%A9%EC%9D%B4");

        let client = MandarinClient::new(Some("https://example.test")).unwrap();
        let url = client.url(&path("../user", None));
        assert!(url.starts_with("https://example.test/profile/"));
    }

    #[test]
    fn dot_segments_are_rejected() {
        for name in ["", " ", ".", ".."] {
            assert!(MandarinClient::profile_path(name, None).is_err(), "{name:?}");
        }
    }

    #[test]
    fn credential_debug_hides_token() {
        let cred = Credential::new("secret-token");
        assert!(!format!("{cred:?}").contains("secret-token"));
        assert_eq!(cred.bearer(), "Bearer secret-token");
    }
}
