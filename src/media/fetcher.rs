// Cache-first resolution of image URLs to bytes.
use crate::client::transport::{HttpsTransport, build_transport};
use crate::error::{ClientError, ImageError};
use crate::media::cache::{CachedResource, ImageCache};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use std::sync::Arc;

/// Resolves a URL string to bytes, consulting the cache before the network.
///
/// Concurrent fetches for the same key are NOT de-duplicated here: two
/// simultaneous misses both hit the network and the second store overwrites
/// the first with identical bytes. De-duplication is the view-model layer's
/// job.
pub struct ImageFetcher {
    cache: Arc<ImageCache>,
    transport: HttpsTransport,
}

impl ImageFetcher {
    pub fn new(cache: Arc<ImageCache>) -> Result<Self, ClientError> {
        Self::with_options(cache, false)
    }

    pub fn with_options(
        cache: Arc<ImageCache>,
        allow_insecure_certs: bool,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            cache,
            transport: build_transport(allow_insecure_certs)?,
        })
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    pub async fn fetch(&self, url: &str) -> Result<CachedResource, ImageError> {
        // Cache hit: return without any network involvement.
        if let Some(cached) = self.cache.retrieve(url) {
            return Ok(cached);
        }

        let uri = match url.parse::<Uri>() {
            Ok(uri) if uri.scheme().is_some() && uri.authority().is_some() => uri,
            _ => return Err(ImageError::InvalidUrl),
        };

        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .map_err(|e| ImageError::Network(Arc::new(e)))?;

        // Single attempt, no retry. The body is kept whatever the status;
        // only transport-level failures surface as errors.
        let response = self
            .transport
            .request(request)
            .await
            .map_err(|e| ImageError::Network(Arc::new(e)))?;
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ImageError::Network(Arc::new(e)))?
            .to_bytes();

        let resource = CachedResource::new(url, bytes);
        self.cache.store(resource.clone());
        Ok(resource)
    }

    /// Warm the cache for a batch of URLs with bounded concurrency. Per-URL
    /// failures are ignored; returns how many of the batch are resident
    /// afterwards.
    pub async fn prefetch(&self, urls: &[String]) -> usize {
        let futures = urls
            .iter()
            .map(|url| async move { self.fetch(url).await.is_ok() });

        let mut stream = stream::iter(futures).buffer_unordered(4);
        let mut resident = 0;
        while let Some(ok) = stream.next().await {
            if ok {
                resident += 1;
            }
        }
        resident
    }
}
