// Per-URL view-model de-duplication.
use crate::media::fetcher::ImageFetcher;
use crate::media::view_model::ImageViewModel;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Hands out one shared `ImageViewModel` per URL.
///
/// The registry holds only weak references: the instance stays shared while
/// any checkout survives and becomes reclaimable the moment the last
/// checkout drops. Reference counts make eviction deterministic; no sweep is
/// needed for correctness, `cleanup()` just prunes dead map entries.
pub struct ImageViewModelFactory {
    fetcher: Arc<ImageFetcher>,
    live: Mutex<HashMap<String, Weak<ImageViewModel>>>,
}

impl ImageViewModelFactory {
    pub fn new(fetcher: Arc<ImageFetcher>) -> Self {
        Self {
            fetcher,
            live: Mutex::new(HashMap::new()),
        }
    }

    /// The shared view-model for `url`: the existing instance while one is
    /// alive, otherwise a fresh one starting from `Idle`.
    pub fn view_model(&self, url: &str) -> Arc<ImageViewModel> {
        let mut live = self.live.lock().unwrap();
        if let Some(existing) = live.get(url).and_then(Weak::upgrade) {
            return existing;
        }

        let vm = Arc::new(ImageViewModel::new(url, self.fetcher.clone()));
        live.insert(url.to_string(), Arc::downgrade(&vm));
        vm
    }

    /// Drop map entries whose view-model no longer has a strong holder.
    /// Not scheduled automatically; hosts call it at convenient points.
    pub fn cleanup(&self) {
        self.live
            .lock()
            .unwrap()
            .retain(|_, weak| weak.strong_count() > 0);
    }

    /// Number of URLs with a currently-live view-model.
    pub fn live_count(&self) -> usize {
        self.live
            .lock()
            .unwrap()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}
