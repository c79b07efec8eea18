// Interceptor defaulting a request to JSON content negotiation.
use crate::client::interceptor::Interceptor;
use crate::error::ClientError;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use http::Request;

/// Sets `Content-Type` and `Accept` to `application/json`, but only when the
/// header is absent: earlier interceptors and callers always win.
pub struct JsonHeaderInterceptor;

#[async_trait]
impl Interceptor for JsonHeaderInterceptor {
    async fn on_request(&self, req: &mut Request<Bytes>) -> Result<(), ClientError> {
        let headers = req.headers_mut();
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        Ok(())
    }
}
