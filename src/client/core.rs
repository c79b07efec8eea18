// File: src/client/core.rs
use crate::client::interceptor::Interceptor;
use crate::client::printer::{ResponsePrinter, Verbosity};
use crate::client::transport::{HttpsTransport, build_transport};
use crate::error::ClientError;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response, Uri};
use http_body_util::{BodyExt, Full};
use std::sync::Arc;

/// Everything needed to construct a client, passed explicitly: no hidden
/// registration state decides what a client looks like.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: Uri,
    /// Full chain in execution order. A response logger is appended during
    /// construction when `verbosity` asks for one.
    pub interceptors: Vec<Arc<dyn Interceptor>>,
    pub verbosity: Verbosity,
    pub allow_insecure_certs: bool,
}

impl ClientConfig {
    pub fn new(base_url: Uri) -> Self {
        Self {
            base_url,
            interceptors: Vec::new(),
            verbosity: Verbosity::None,
            allow_insecure_certs: false,
        }
    }
}

/// HTTP client bound to a base URL, with an ordered interceptor chain.
pub struct HttpClient {
    base_url: Uri,
    interceptors: Vec<Arc<dyn Interceptor>>,
    transport: HttpsTransport,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut interceptors = config.interceptors;
        if config.verbosity != Verbosity::None {
            interceptors.push(Arc::new(ResponsePrinter::new(config.verbosity)));
        }
        let transport = build_transport(config.allow_insecure_certs)?;
        Ok(Self {
            base_url: config.base_url,
            interceptors,
            transport,
        })
    }

    pub fn base_url(&self) -> &Uri {
        &self.base_url
    }

    pub async fn get(
        &self,
        path: &str,
        headers: Option<HeaderMap>,
    ) -> Result<Response<Bytes>, ClientError> {
        self.request(Method::GET, path, Bytes::new(), headers).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Bytes,
        headers: Option<HeaderMap>,
    ) -> Result<Response<Bytes>, ClientError> {
        self.request(Method::POST, path, body, headers).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Bytes,
        headers: Option<HeaderMap>,
    ) -> Result<Response<Bytes>, ClientError> {
        self.request(Method::PUT, path, body, headers).await
    }

    pub async fn delete(
        &self,
        path: &str,
        headers: Option<HeaderMap>,
    ) -> Result<Response<Bytes>, ClientError> {
        self.request(Method::DELETE, path, Bytes::new(), headers)
            .await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Bytes,
        headers: Option<HeaderMap>,
    ) -> Result<Response<Bytes>, ClientError> {
        let uri = self.resolve(path)?;
        let mut req = Request::builder().method(method).uri(uri).body(body)?;
        if let Some(extra) = headers {
            for (name, value) in extra.iter() {
                req.headers_mut().insert(name, value.clone());
            }
        }
        self.perform(req).await
    }

    /// Run the full exchange: request chain in registration order, the wire
    /// round-trip, then the response chain in the SAME order, each stage
    /// seeing what earlier stages accumulated.
    pub async fn perform(&self, mut req: Request<Bytes>) -> Result<Response<Bytes>, ClientError> {
        for interceptor in &self.interceptors {
            interceptor.on_request(&mut req).await?;
        }

        let mut outgoing = Request::builder()
            .method(req.method().clone())
            .uri(req.uri().clone())
            .body(Full::new(req.body().clone()))?;
        *outgoing.headers_mut() = req.headers().clone();

        let response = self.transport.request(outgoing).await?;
        let (parts, incoming) = response.into_parts();
        let collected = incoming
            .collect()
            .await
            .map_err(|e| ClientError::Body(e.to_string()))?;
        let mut response = Response::from_parts(parts, collected.to_bytes());

        for interceptor in &self.interceptors {
            interceptor.on_response(&req, &mut response).await?;
        }
        Ok(response)
    }

    fn resolve(&self, path: &str) -> Result<Uri, ClientError> {
        join_url(&self.base_url, path)
    }
}

/// Resolve `path` against `base`: absolute URIs pass through untouched,
/// rooted paths replace the base path, anything else is appended.
pub(crate) fn join_url(base: &Uri, path: &str) -> Result<Uri, ClientError> {
    if let Ok(uri) = path.parse::<Uri>()
        && uri.scheme().is_some()
        && uri.authority().is_some()
    {
        return Ok(uri);
    }

    let scheme = base.scheme_str().unwrap_or("https");
    let authority = base.authority().map(|a| a.as_str()).unwrap_or("");
    let absolute = if path.starts_with('/') {
        format!("{}://{}{}", scheme, authority, path)
    } else {
        let base_path = base.path().trim_end_matches('/');
        format!("{}://{}{}/{}", scheme, authority, base_path, path)
    };
    Ok(absolute.parse::<Uri>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> Uri {
        url.parse().unwrap()
    }

    #[test]
    fn test_join_relative_path() {
        let uri = join_url(&base("http://api.example.com/v2"), "teams/16").unwrap();
        assert_eq!(uri.to_string(), "http://api.example.com/v2/teams/16");
    }

    #[test]
    fn test_join_rooted_path_replaces_base_path() {
        let uri = join_url(&base("http://api.example.com/v2"), "/health").unwrap();
        assert_eq!(uri.to_string(), "http://api.example.com/health");
    }

    #[test]
    fn test_join_absolute_url_passes_through() {
        let uri = join_url(&base("http://api.example.com"), "https://other.example.org/x").unwrap();
        assert_eq!(uri.to_string(), "https://other.example.org/x");
    }

    #[test]
    fn test_join_trailing_slash_base() {
        let uri = join_url(&base("http://api.example.com/v2/"), "teams").unwrap();
        assert_eq!(uri.to_string(), "http://api.example.com/v2/teams");
    }
}
