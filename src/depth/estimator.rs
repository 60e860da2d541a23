use std::path::PathBuf;

use crate::depth::normalize::DepthMatrix;
use crate::foundation::error::{DepthflowError, DepthflowResult};

/// Request body sent to a depth-estimation service.
///
/// Only `image_url` is serialized; the bearer token travels in the `Authorization` header.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DepthRequest {
    pub image_url: String,
    #[serde(skip)]
    pub bearer_token: String,
}

impl DepthRequest {
    pub fn new(image_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            bearer_token: bearer_token.into(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }

    pub fn to_json(&self) -> DepthflowResult<String> {
        serde_json::to_string(self).map_err(|e| anyhow::Error::new(e).into())
    }
}

/// A source of raw depth predictions.
///
/// Implementations make a single best-effort attempt; any failure is terminal for that
/// upload and is reported as an error, never retried here.
pub trait DepthEstimator: Send + Sync {
    fn estimate(&self, request: &DepthRequest) -> DepthflowResult<DepthMatrix>;
}

/// Reads a previously fetched JSON depth matrix from disk, ignoring the request URL.
#[derive(Clone, Debug)]
pub struct FileDepthEstimator {
    path: PathBuf,
}

impl FileDepthEstimator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DepthEstimator for FileDepthEstimator {
    fn estimate(&self, _request: &DepthRequest) -> DepthflowResult<DepthMatrix> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            DepthflowError::resource(format!("read depth '{}': {e}", self.path.display()))
        })?;
        DepthMatrix::from_json(&bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/depth/estimator.rs"]
mod tests;
