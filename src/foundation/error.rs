//! Error taxonomy shared by every engine layer.

/// Convenience result type used across augforge.
pub type AugResult<T> = Result<T, AugError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum AugError {
    /// Invalid user-provided configuration or pipeline data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while registering or resolving effect types.
    #[error("registry error: {0}")]
    Registry(String),

    /// Errors while applying a transform primitive to an image.
    #[error("transform error: {0}")]
    Transform(String),

    /// Structural dataset problems (missing directories, unwritable roots).
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Errors when serializing or deserializing pipeline data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AugError {
    /// Build an [`AugError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AugError::Registry`] value.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Build an [`AugError::Transform`] value.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Build an [`AugError::Dataset`] value.
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Build an [`AugError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
