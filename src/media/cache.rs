// Bounded in-memory store for fetched image bytes.
use bytes::Bytes;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

pub const DEFAULT_CAPACITY: usize = 100;

/// One fetched resource. Immutable once created; identity is the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResource {
    pub url: String,
    pub bytes: Bytes,
}

impl CachedResource {
    pub fn new(url: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            url: url.into(),
            bytes,
        }
    }

    /// Heuristic SVG detection: the URL's extension or data-URL media type,
    /// falling back to sniffing the document head. Renderers use this to
    /// pick a decode path before parsing anything.
    pub fn looks_like_svg(&self) -> bool {
        let url = self.url.to_ascii_lowercase();
        if url.starts_with("data:") {
            return url.contains("image/svg+xml");
        }
        // Extension check ignores query string and fragment.
        if let Some(path) = url.split(['?', '#']).next()
            && path.ends_with(".svg")
        {
            return true;
        }

        let head = self.bytes.get(..512).unwrap_or(&self.bytes);
        let text = String::from_utf8_lossy(head);
        let trimmed = text.trim_start();
        trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
    }
}

/// Key→bytes store with LRU eviction, capacity-bounded.
///
/// All access funnels through one mutex: at most one mutation in flight,
/// reads observe the latest committed state. Nothing persists across
/// restarts.
pub struct ImageCache {
    entries: Mutex<LruCache<String, Bytes>>,
}

impl ImageCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Insert or overwrite; refreshes the entry's recency.
    pub fn store(&self, resource: CachedResource) {
        self.entries
            .lock()
            .unwrap()
            .put(resource.url, resource.bytes);
    }

    /// Look up a resource. A miss has no effect on the cache contents.
    pub fn retrieve(&self, url: &str) -> Option<CachedResource> {
        self.entries
            .lock()
            .unwrap()
            .get(url)
            .map(|bytes| CachedResource::new(url, bytes.clone()))
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(url: &str, payload: &'static [u8]) -> CachedResource {
        CachedResource::new(url, Bytes::from_static(payload))
    }

    #[test]
    fn test_retrieve_unknown_is_none() {
        let cache = ImageCache::default();
        assert!(cache.retrieve("https://example.com/a.png").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_then_retrieve_round_trips() {
        let cache = ImageCache::default();
        cache.store(resource("https://example.com/a.png", b"payload"));

        let hit = cache.retrieve("https://example.com/a.png").unwrap();
        assert_eq!(hit.url, "https://example.com/a.png");
        assert_eq!(hit.bytes.as_ref(), b"payload");
    }

    #[test]
    fn test_store_overwrites_existing_key() {
        let cache = ImageCache::default();
        cache.store(resource("https://example.com/a.png", b"old"));
        cache.store(resource("https://example.com/a.png", b"new"));

        let hit = cache.retrieve("https://example.com/a.png").unwrap();
        assert_eq!(hit.bytes.as_ref(), b"new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = ImageCache::new(2);
        cache.store(resource("a", b"1"));
        cache.store(resource("b", b"2"));
        // Touch "a" so "b" becomes the eviction candidate.
        assert!(cache.retrieve("a").is_some());
        cache.store(resource("c", b"3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.retrieve("a").is_some());
        assert!(cache.retrieve("b").is_none());
        assert!(cache.retrieve("c").is_some());
    }

    #[test]
    fn test_clear_drops_everything() {
        let cache = ImageCache::default();
        cache.store(resource("a", b"1"));
        cache.store(resource("b", b"2"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.retrieve("a").is_none());
    }

    #[test]
    fn test_svg_detection() {
        assert!(resource("https://cdn.example.com/icons/flash.svg", b"x").looks_like_svg());
        assert!(resource("https://cdn.example.com/icons/flash.svg?v=2", b"x").looks_like_svg());
        assert!(resource("data:image/svg+xml;base64,abcd", b"x").looks_like_svg());
        assert!(resource("https://example.com/asset", b"  <svg xmlns=\"a\">").looks_like_svg());
        assert!(
            resource(
                "https://example.com/asset",
                b"<?xml version=\"1.0\"?>\n<svg>"
            )
            .looks_like_svg()
        );
        assert!(!resource("https://example.com/photo.png", b"\x89PNG").looks_like_svg());
    }
}
