// Interceptor injecting every stored secret as a request header.
use crate::client::interceptor::Interceptor;
use crate::error::ClientError;
use crate::secrets::SecretStore;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::Request;
use std::sync::Arc;

/// Injects every key/value pair from the secret store as a request header,
/// unconditionally overwriting any same-named header set earlier.
pub struct SecretHeaderInterceptor {
    secrets: Arc<SecretStore>,
}

impl SecretHeaderInterceptor {
    pub fn new(secrets: Arc<SecretStore>) -> Self {
        Self { secrets }
    }
}

#[async_trait]
impl Interceptor for SecretHeaderInterceptor {
    async fn on_request(&self, req: &mut Request<Bytes>) -> Result<(), ClientError> {
        for (key, value) in self.secrets.all() {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(val)) => {
                    req.headers_mut().insert(name, val);
                }
                _ => {
                    // Stored under a name the HTTP types reject; the request
                    // still goes out without it.
                    log::warn!("secret '{}' is not a valid header, skipping", key);
                }
            }
        }
        Ok(())
    }
}
