// Tests for the secret store's index discipline and serialization queue.
use serial_test::serial;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uplink::error::SecretError;
use uplink::secrets::{MemoryBackend, SecretBackend, SecretStore};

#[test]
fn test_add_is_idempotent_on_the_index() {
    let store = SecretStore::in_memory();

    store.add("x-api-key", "first");
    store.add("x-api-key", "second");

    let keys = store.keys();
    assert_eq!(keys, vec!["x-api-key".to_string()]);
    // The value itself is overwritten.
    assert_eq!(store.get("x-api-key").as_deref(), Some("second"));
}

#[test]
fn test_delete_removes_value_and_index_entry() {
    let store = SecretStore::in_memory();
    store.add("a", "1");
    store.add("b", "2");

    store.delete("a");
    assert_eq!(store.get("a"), None);
    assert_eq!(store.keys(), vec!["b".to_string()]);

    // Deleting a key that was never stored is harmless.
    store.delete("ghost");
    assert_eq!(store.keys(), vec!["b".to_string()]);
}

#[test]
fn test_all_preserves_insertion_order() {
    let store = SecretStore::in_memory();
    store.add("charlie", "3");
    store.add("alpha", "1");
    store.add("bravo", "2");

    let pairs = store.all();
    let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["charlie", "alpha", "bravo"]);
}

#[test]
fn test_clear_empties_store_and_index() {
    let store = SecretStore::in_memory();
    store.add("a", "1");
    store.add("b", "2");

    store.clear();
    assert!(store.keys().is_empty());
    assert!(store.all().is_empty());
    assert_eq!(store.get("a"), None);

    // The store keeps working after a clear.
    store.add("c", "3");
    assert_eq!(store.keys(), vec!["c".to_string()]);
}

#[test]
fn test_export_json_round_trips() {
    let store = SecretStore::in_memory();
    store.add("x-api-key", "sekret");
    store.add("x-team", "16");

    let exported = store.export_json().unwrap();
    let decoded: HashMap<String, String> = serde_json::from_str(&exported).unwrap();
    assert_eq!(decoded.get("x-api-key").map(String::as_str), Some("sekret"));
    assert_eq!(decoded.get("x-team").map(String::as_str), Some("16"));
    assert_eq!(decoded.len(), 2);
}

/// Backend that tracks how many writers are inside it at once.
struct ProbeBackend {
    inner: MemoryBackend,
    active: AtomicUsize,
    max_seen: AtomicUsize,
}

impl ProbeBackend {
    fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            active: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        }
    }
}

impl SecretBackend for ProbeBackend {
    fn read(&self, key: &str) -> Result<Option<String>, SecretError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(1));
        let result = self.inner.write(key, value);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn remove(&self, key: &str) -> Result<(), SecretError> {
        self.inner.remove(key)
    }
}

// The queue is process-wide, so these two keep to themselves.

#[test]
#[serial]
fn test_concurrent_adds_do_not_lose_index_entries() {
    let store = Arc::new(SecretStore::in_memory());

    let mut handles = Vec::new();
    for t in 0..8 {
        let store = store.clone();
        handles.push(std::thread::spawn(move || {
            for i in 0..5 {
                store.add(&format!("key-{}-{}", t, i), "v");
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Interleaved read-modify-write of the index would drop entries.
    assert_eq!(store.keys().len(), 40);
}

#[test]
#[serial]
fn test_mutations_are_mutually_exclusive() {
    let probe = Arc::new(ProbeBackend::new());
    let max_seen = {
        let probe_ref = probe.clone();
        struct Shared(Arc<ProbeBackend>);
        impl SecretBackend for Shared {
            fn read(&self, key: &str) -> Result<Option<String>, SecretError> {
                self.0.read(key)
            }
            fn write(&self, key: &str, value: &str) -> Result<(), SecretError> {
                self.0.write(key, value)
            }
            fn remove(&self, key: &str) -> Result<(), SecretError> {
                self.0.remove(key)
            }
        }

        let store = Arc::new(SecretStore::new(Box::new(Shared(probe_ref))));
        let mut handles = Vec::new();
        for t in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..10 {
                    store.add(&format!("k-{}-{}", t, i), "v");
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        probe.max_seen.load(Ordering::SeqCst)
    };

    assert_eq!(max_seen, 1, "at most one mutation may be in flight");
}
