// Durable key/value credential storage over the platform keyring.
//
// Secure stores have no "list all keys" primitive, so a reserved entry holds
// a JSON-encoded ordered array of every other key. The index and the values
// are distinct entries; mutations are serialized on one process-wide queue,
// but the two writes are not atomic across a crash (see DESIGN.md).
use crate::error::SecretError;
use keyring_core::Entry;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

/// Service namespace all credential entries live under.
const SERVICE_NAMESPACE: &str = "com.uplink.secrets";

/// Reserved entry holding the JSON-encoded list of all other keys.
const KEYS_INDEX_KEY: &str = "secret_keys_list";

// One queue guards all keyring interaction, process-wide. Initialized on
// first use, never torn down.
static KEYCHAIN_QUEUE: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Minimal surface the store needs from a credential backend.
pub trait SecretBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, SecretError>;
    fn write(&self, key: &str, value: &str) -> Result<(), SecretError>;
    fn remove(&self, key: &str) -> Result<(), SecretError>;
}

/// Backend over the platform keyring via `keyring_core::Entry`.
///
/// The host application is responsible for installing a credential store
/// (see [`install_platform_store`]) before the first access.
pub struct KeyringBackend {
    service: String,
}

impl KeyringBackend {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl SecretBackend for KeyringBackend {
    fn read(&self, key: &str) -> Result<Option<String>, SecretError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring_core::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let entry = Entry::new(&self.service, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SecretError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.delete_credential() {
            // Deleting a missing entry counts as success.
            Err(keyring_core::Error::NoEntry) | Ok(()) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory backend for tests and keyring-less environments.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SecretError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SecretError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Credential store with an explicit ordered key index.
///
/// Mutating operations log and swallow backend failures: callers treat the
/// store as best-effort, and a header-injection path must not fail a request
/// because one credential could not be persisted.
pub struct SecretStore {
    backend: Box<dyn SecretBackend>,
}

impl SecretStore {
    pub fn new(backend: Box<dyn SecretBackend>) -> Self {
        Self { backend }
    }

    /// Store over the platform keyring under the crate's service namespace.
    pub fn with_keyring() -> Self {
        Self::new(Box::new(KeyringBackend::new(SERVICE_NAMESPACE)))
    }

    /// Store over a process-local map. Nothing persists.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Add (or overwrite) a secret. The key index stays duplicate-free even
    /// when the same key is added repeatedly.
    pub fn add(&self, key: &str, value: &str) {
        let _guard = KEYCHAIN_QUEUE.lock().unwrap();
        if let Err(e) = self.backend.write(key, value) {
            log::warn!("failed to store secret '{}': {}", key, e);
        }
        let mut keys = self.load_index();
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
            self.save_index(&keys);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let _guard = KEYCHAIN_QUEUE.lock().unwrap();
        self.read_value(key)
    }

    pub fn delete(&self, key: &str) {
        let _guard = KEYCHAIN_QUEUE.lock().unwrap();
        if let Err(e) = self.backend.remove(key) {
            log::warn!("failed to delete secret '{}': {}", key, e);
        }
        let mut keys = self.load_index();
        if let Some(idx) = keys.iter().position(|k| k == key) {
            keys.remove(idx);
            self.save_index(&keys);
        }
    }

    /// All known keys, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        let _guard = KEYCHAIN_QUEUE.lock().unwrap();
        self.load_index()
    }

    /// All key/value pairs, in index order. Keys whose value cannot be read
    /// (e.g. a stale index entry after an interrupted delete) are skipped.
    pub fn all(&self) -> Vec<(String, String)> {
        let _guard = KEYCHAIN_QUEUE.lock().unwrap();
        let mut pairs = Vec::new();
        for key in self.load_index() {
            if let Some(value) = self.read_value(&key) {
                pairs.push((key, value));
            }
        }
        pairs
    }

    /// Remove every secret and the index itself.
    pub fn clear(&self) {
        let _guard = KEYCHAIN_QUEUE.lock().unwrap();
        for key in self.load_index() {
            if let Err(e) = self.backend.remove(&key) {
                log::warn!("failed to delete secret '{}': {}", key, e);
            }
        }
        if let Err(e) = self.backend.remove(KEYS_INDEX_KEY) {
            log::warn!("failed to delete secret index: {}", e);
        }
    }

    /// Export all pairs as a JSON object string.
    pub fn export_json(&self) -> Option<String> {
        let _guard = KEYCHAIN_QUEUE.lock().unwrap();
        let mut map = serde_json::Map::new();
        for key in self.load_index() {
            if let Some(value) = self.read_value(&key) {
                map.insert(key, serde_json::Value::String(value));
            }
        }
        serde_json::to_string(&serde_json::Value::Object(map)).ok()
    }

    fn read_value(&self, key: &str) -> Option<String> {
        match self.backend.read(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("failed to read secret '{}': {}", key, e);
                None
            }
        }
    }

    fn load_index(&self) -> Vec<String> {
        let raw = match self.backend.read(KEYS_INDEX_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("failed to read secret index: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("secret index is corrupted, starting over: {}", e);
                Vec::new()
            }
        }
    }

    fn save_index(&self, keys: &[String]) {
        match serde_json::to_string(keys) {
            Ok(json) => {
                if let Err(e) = self.backend.write(KEYS_INDEX_KEY, &json) {
                    log::warn!("failed to persist secret index: {}", e);
                }
            }
            Err(e) => log::warn!("failed to encode secret index: {}", e),
        }
    }
}

// --- Platform store installation ---
//
// `keyring-core` separates the entry API from store selection: the host
// application picks the store. These helpers wire the default store per OS
// for hosts without an opinion of their own.

#[cfg(target_os = "linux")]
pub fn install_platform_store() -> Result<(), SecretError> {
    match dbus_secret_service_keyring_store::Store::new() {
        Ok(store) => {
            keyring_core::set_default_store(store);
            Ok(())
        }
        Err(e) => {
            log::warn!(
                "dbus secret service unavailable ({}), falling back to keyutils",
                e
            );
            let store = linux_keyutils_keyring_store::Store::new()?;
            keyring_core::set_default_store(store);
            Ok(())
        }
    }
}

#[cfg(target_os = "macos")]
pub fn install_platform_store() -> Result<(), SecretError> {
    let store = apple_native_keyring_store::keychain::Store::new()?;
    keyring_core::set_default_store(store);
    Ok(())
}

#[cfg(target_os = "windows")]
pub fn install_platform_store() -> Result<(), SecretError> {
    let store = windows_native_keyring_store::Store::new()?;
    keyring_core::set_default_store(store);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupted_index_resets_to_empty() {
        let backend = MemoryBackend::new();
        backend.write(KEYS_INDEX_KEY, "definitely not json").unwrap();
        let store = SecretStore::new(Box::new(backend));

        assert!(store.keys().is_empty());
        store.add("token", "abc");
        assert_eq!(store.keys(), vec!["token".to_string()]);
    }

    #[test]
    fn test_stale_index_entry_is_skipped_by_all() {
        let backend = MemoryBackend::new();
        backend
            .write(KEYS_INDEX_KEY, r#"["ghost","real"]"#)
            .unwrap();
        backend.write("real", "value").unwrap();
        let store = SecretStore::new(Box::new(backend));

        // "ghost" is indexed but has no value; all() must not invent one.
        assert_eq!(store.all(), vec![("real".to_string(), "value".to_string())]);
        assert_eq!(store.keys().len(), 2);
    }
}
