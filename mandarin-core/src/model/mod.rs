pub mod image;
pub mod profile;

use serde::Deserialize;
use serde_json::Value;

/// Error body returned by the API, e.g. `{"message":"해당 계정이 존재하지 않습니다.","status":404}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    pub message: String,
    /// Sent as a number by some endpoints and as a string by others.
    #[serde(default)]
    pub status: Option<Value>,
}

impl std::fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            Some(Value::String(status)) => write!(f, "[{}] {}", status, self.message),
            Some(Value::Number(status)) => write!(f, "[{}] {}", status, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}
