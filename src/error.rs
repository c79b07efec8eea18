// Error types shared across the crate.
use std::sync::Arc;
use thiserror::Error;

/// Failures of the image fetch pipeline.
///
/// `Network` keeps its cause behind an `Arc` so the error can live inside a
/// cloneable loading state. Equality is kind-level only: two network failures
/// compare equal regardless of cause, which is what state observers care
/// about.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    #[error("invalid image url")]
    InvalidUrl,
    #[error("network failure: {0}")]
    Network(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl PartialEq for ImageError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (ImageError::InvalidUrl, ImageError::InvalidUrl)
                | (ImageError::Network(_), ImageError::Network(_))
        )
    }
}

/// Failures of HTTP client construction and request execution.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Neither a registered base URL nor an explicit default was available
    /// when a client was requested.
    #[error("no base url was supplied or registered")]
    UrlNotFoundOrRegistered,
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] http::uri::InvalidUri),
    #[error("request assembly failed: {0}")]
    Http(#[from] http::Error),
    #[error("transport failure: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("tls setup failed: {0}")]
    Tls(String),
}

/// Failures of the secret store.
///
/// Mutating store operations swallow these after logging; only read paths
/// that callers can meaningfully react to surface them.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("keyring operation failed: {0}")]
    Keyring(#[from] keyring_core::Error),
    #[error("secret index is not valid json: {0}")]
    Index(#[from] serde_json::Error),
}
