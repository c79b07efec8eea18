// Observable loading state for one remote resource.
use crate::error::ImageError;
use crate::media::cache::CachedResource;
use crate::media::fetcher::ImageFetcher;
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle of one logical resource. Transitions run strictly
/// `Idle → Loading → {Loaded | Error}` and never revert.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingState {
    Idle,
    Loading,
    Loaded(CachedResource),
    Error(ImageError),
}

impl LoadingState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadingState::Loaded(_) | LoadingState::Error(_))
    }
}

/// Shared, observable holder of a resource's loading state.
///
/// Every consumer of the same URL watches the same instance (see
/// `ImageViewModelFactory`), so N observers converge on one fetch.
pub struct ImageViewModel {
    url: String,
    fetcher: Arc<ImageFetcher>,
    state: watch::Sender<LoadingState>,
}

impl ImageViewModel {
    pub fn new(url: impl Into<String>, fetcher: Arc<ImageFetcher>) -> Self {
        let (state, _) = watch::channel(LoadingState::Idle);
        Self {
            url: url.into(),
            fetcher,
            state,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> LoadingState {
        self.state.borrow().clone()
    }

    /// Watch state transitions. The receiver immediately sees the current
    /// value.
    pub fn subscribe(&self) -> watch::Receiver<LoadingState> {
        self.state.subscribe()
    }

    /// Drive the state machine once.
    ///
    /// A no-op in every state but `Idle`: concurrent callers race to claim
    /// the `Idle → Loading` transition atomically, so at most one fetch runs
    /// and losers return immediately with the in-flight or terminal state
    /// observable. `Error` is terminal; a fresh view-model is the only retry
    /// path.
    pub async fn load(&self) {
        let claimed = self.state.send_if_modified(|state| {
            if matches!(state, LoadingState::Idle) {
                *state = LoadingState::Loading;
                true
            } else {
                false
            }
        });
        if !claimed {
            return;
        }

        let next = match self.fetcher.fetch(&self.url).await {
            Ok(resource) => LoadingState::Loaded(resource),
            Err(e) => LoadingState::Error(e),
        };
        self.state.send_replace(next);
    }
}
