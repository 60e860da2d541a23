/// Convenience result type used across depthflow.
pub type DepthflowResult<T> = Result<T, DepthflowError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum DepthflowError {
    /// Malformed or degenerate depth data, or image/heightfield shape mismatch.
    #[error("data error: {0}")]
    Data(String),

    /// Image decode failures and unreadable source files.
    #[error("resource error: {0}")]
    Resource(String),

    /// Rejected parameter writes and invalid engine options.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DepthflowError {
    /// Build a [`DepthflowError::Data`] value.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Build a [`DepthflowError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`DepthflowError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
