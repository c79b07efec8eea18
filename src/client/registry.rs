// Named-client registry: the explicit replacement for the original DI
// container. Registration state lives in one object the host constructs and
// threads where it is needed.
use crate::client::core::{ClientConfig, HttpClient};
use crate::client::interceptor::Interceptor;
use crate::client::json_headers::JsonHeaderInterceptor;
use crate::client::printer::Verbosity;
use crate::client::secret_headers::SecretHeaderInterceptor;
use crate::config::Config;
use crate::error::ClientError;
use crate::secrets::SecretStore;
use http::Uri;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Hands out memoized `HttpClient` instances keyed by an optional name.
///
/// A given name is built at most once per registry; later calls return the
/// identical `Arc`. Construction fails with `UrlNotFoundOrRegistered` when
/// neither a registered base URL nor an explicit default is available.
pub struct ClientRegistry {
    secrets: Arc<SecretStore>,
    base_url: Mutex<Option<Uri>>,
    extra_interceptors: Mutex<Vec<Arc<dyn Interceptor>>>,
    verbosity: Mutex<Option<Verbosity>>,
    allow_insecure_certs: AtomicBool,
    clients: Mutex<HashMap<Option<String>, Arc<HttpClient>>>,
}

impl ClientRegistry {
    pub fn new(secrets: Arc<SecretStore>) -> Self {
        Self {
            secrets,
            base_url: Mutex::new(None),
            extra_interceptors: Mutex::new(Vec::new()),
            verbosity: Mutex::new(None),
            allow_insecure_certs: AtomicBool::new(false),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a registry from the TOML configuration.
    pub fn from_config(config: &Config, secrets: Arc<SecretStore>) -> Self {
        let registry = Self::new(secrets);
        registry
            .allow_insecure_certs
            .store(config.allow_insecure_certs, Ordering::Relaxed);
        if !config.base_url.is_empty() {
            registry.register_base_url(&config.base_url);
        }
        if config.response_log != Verbosity::None {
            registry.enable_response_log(config.response_log);
        }
        registry
    }

    /// Record a base URL for clients built later. An unparseable string is
    /// ignored (with a warning) rather than surfaced.
    pub fn register_base_url(&self, url: &str) {
        match url.parse::<Uri>() {
            Ok(uri) if uri.scheme().is_some() && uri.authority().is_some() => {
                *self.base_url.lock().unwrap() = Some(uri);
            }
            _ => log::warn!("ignoring unparseable base url '{}'", url),
        }
    }

    /// Append an interceptor that will run ahead of the default chain in
    /// every client built afterwards.
    pub fn register_interceptor(&self, interceptor: Arc<dyn Interceptor>) {
        self.extra_interceptors.lock().unwrap().push(interceptor);
    }

    /// Attach a response logger at the given level to clients built
    /// afterwards.
    pub fn enable_response_log(&self, level: Verbosity) {
        *self.verbosity.lock().unwrap() = Some(level);
    }

    /// Look up or build the client for `name`.
    pub fn client(
        &self,
        name: Option<&str>,
        default_url: Option<Uri>,
    ) -> Result<Arc<HttpClient>, ClientError> {
        let key = name.map(str::to_string);
        // The map lock is held across construction so a name can never be
        // built twice.
        let mut clients = self.clients.lock().unwrap();
        if let Some(existing) = clients.get(&key) {
            return Ok(existing.clone());
        }

        let registered = self.base_url.lock().unwrap().clone();
        let base_url = registered
            .or(default_url)
            .ok_or(ClientError::UrlNotFoundOrRegistered)?;

        // Assembly order is fixed: externally registered interceptors,
        // secret headers, JSON defaults, then the optional logger (appended
        // by HttpClient::new).
        let mut interceptors = self.extra_interceptors.lock().unwrap().clone();
        interceptors.push(Arc::new(SecretHeaderInterceptor::new(self.secrets.clone())));
        interceptors.push(Arc::new(JsonHeaderInterceptor));
        let verbosity = self.verbosity.lock().unwrap().unwrap_or(Verbosity::None);

        let client = Arc::new(HttpClient::new(ClientConfig {
            base_url,
            interceptors,
            verbosity,
            allow_insecure_certs: self.allow_insecure_certs.load(Ordering::Relaxed),
        })?);
        clients.insert(key, client.clone());
        Ok(client)
    }
}
