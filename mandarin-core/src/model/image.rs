use serde::Deserialize;

/// `/image/uploadfile` response; the stored file is served from `<base_url>/<filename>`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResp {
    #[serde(default)]
    pub filename: Option<String>,
}
