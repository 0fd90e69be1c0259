/// Convenience result type used across cardsmith.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Lookup misses (unknown template, unknown attribute type) are not errors and
/// never show up here.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Structurally valid input that cannot be rendered as-is.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed template or card JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// An image resource could not be resolved, read or decoded.
    #[error("resource error: {0}")]
    Resource(String),

    /// Failures inside the rasterizer (surfaces, fonts).
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing the template collection.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CardError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`CardError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`CardError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
