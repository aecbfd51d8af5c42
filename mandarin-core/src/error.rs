use thiserror::Error;

/// Profile domain errors; transport failures travel as `anyhow::Error`.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Payload carried neither a `user` nor a `profile` object.
    #[error("unexpected profile response format: expected a `user` or `profile` key")]
    Format,

    /// A field value would not survive the tag encoding unchanged.
    #[error("intro field `{field}` is ambiguous once encoded: {value:?}")]
    Decode { field: &'static str, value: String },

    #[error("required field `{0}` is empty")]
    MissingField(&'static str),

    #[error("image upload failed: {0}")]
    Upload(String),
}
