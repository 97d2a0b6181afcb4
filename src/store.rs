use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::{DriverKind, StoreConfig};
use crate::driver::{create_driver, Backends, Driver, Mirror};
use crate::errors::StoreError;

/// Uniform key/value facade over one backing mechanism.
///
/// On construction the whole backing store is read once into an in-memory
/// mirror. Reads are served from the mirror; writes go to the mirror first and
/// are then forwarded to the driver. A failed driver write is logged and
/// reported as `false`, and the mirror keeps the new value.
///
/// ```
/// use gosub_store::{Backends, DriverKind, Store, StoreConfig};
///
/// let backends = Backends::in_memory(url::Url::parse("https://example.com/").unwrap());
///
/// let mut store = Store::new(StoreConfig::new(DriverKind::Cookie), backends.clone());
/// store.set("a", vec![1, 2, 3]);
///
/// let reloaded = Store::new(StoreConfig::new(DriverKind::Cookie), backends);
/// assert_eq!(reloaded.get("a"), Some(&serde_json::json!([1, 2, 3])));
/// ```
pub struct Store {
    config: StoreConfig,          // Configuration the store was built with
    driver: Box<dyn Driver>,      // Adapter for the backing mechanism
    mirror: Mirror,               // Everything the backing mechanism holds, deserialized
}

impl Store {
    // Selects the driver named by the config and loads the mirror from it. An
    // unsupported driver or an unreadable backend yields an empty mirror.
    pub fn new(config: StoreConfig, backends: Backends) -> Self {
        let driver = create_driver(&config, &backends);
        let mirror = driver.dump().unwrap_or_else(|e| {
            log::warn!("{}: initial load failed: {e}", driver.kind());
            Mirror::new()
        });
        log::debug!("{}: loaded {} entries", driver.kind(), mirror.len());

        Self {
            config,
            driver,
            mirror,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn driver_kind(&self) -> DriverKind {
        self.driver.kind()
    }

    /// Returns the value stored under `key`, or `None` when it is absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.mirror.get(key)
    }

    /// Returns the value stored under `key`, or `fallback` when it is absent.
    pub fn get_or(&self, key: &str, fallback: Value) -> Value {
        self.mirror.get(key).cloned().unwrap_or(fallback)
    }

    /// Deserializes the value stored under `key` into `T`. Returns `None` when
    /// the key is absent or the value has a different shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.mirror.get(key)?;
        match T::deserialize(value) {
            Ok(v) => Some(v),
            Err(e) => {
                log::debug!("{key}: stored value does not match requested type: {e}");
                None
            }
        }
    }

    /// Stores `value` under `key`. Returns `false` when the value cannot be
    /// represented as JSON (nothing changes) or the driver write fails.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> bool {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("{}: cannot serialize value for {key}: {e}", self.driver.kind());
                return false;
            }
        };

        self.mirror.insert(key.to_string(), value.clone());
        let result = self.driver.set(key, &value);
        self.report("set", key, result)
    }

    /// Removes `key` from the mirror and the backing store.
    pub fn remove(&mut self, key: &str) -> bool {
        self.mirror.remove(key);
        let result = self.driver.remove(key);
        self.report("remove", key, result)
    }

    pub fn has(&self, key: &str) -> bool {
        self.mirror.contains_key(key)
    }

    /// Empties the mirror and the backing store.
    pub fn clear(&mut self) -> bool {
        self.mirror.clear();
        let result = self.driver.clear();
        self.report("clear", "*", result)
    }

    /// The mirror itself.
    pub fn dump(&self) -> &Mirror {
        &self.mirror
    }

    /// Same as [`dump`](Self::dump).
    pub fn get_all(&self) -> &Mirror {
        self.dump()
    }

    pub fn len(&self) -> usize {
        self.mirror.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirror.is_empty()
    }

    fn report(&self, op: &str, key: &str, result: Result<(), StoreError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{}: {op} {key} failed: {e}", self.driver.kind());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{cookie_jar_handle, DefaultCookieJar, PersistentCookieJar};
    use crate::storage::StorageHandles;
    use serde::Deserialize;
    use serde_json::json;
    use url::Url;

    fn doc() -> Url {
        Url::parse("https://example.com/index.html").unwrap()
    }

    fn all_kinds() -> [DriverKind; 3] {
        [DriverKind::Local, DriverKind::Session, DriverKind::Cookie]
    }

    #[test]
    fn set_then_get_returns_equal_value() {
        for kind in all_kinds() {
            let mut store = Store::new(StoreConfig::new(kind.clone()), Backends::in_memory(doc()));
            let values = [
                json!(null),
                json!(true),
                json!(-12.5),
                json!("text; with=punctuation, and spaces"),
                json!([1, "two", [3]]),
                json!({"nested": {"list": [1, 2, 3], "flag": false}}),
            ];
            for (i, v) in values.iter().enumerate() {
                let key = format!("key-{i}");
                assert!(store.set(&key, v), "{kind}: set {key}");
                assert_eq!(store.get(&key), Some(v), "{kind}: get {key}");
            }
        }
    }

    #[test]
    fn has_follows_set_and_remove() {
        for kind in all_kinds() {
            let mut store = Store::new(StoreConfig::new(kind), Backends::in_memory(doc()));
            assert!(!store.has("k"));
            store.set("k", 1);
            assert!(store.has("k"));
            assert!(store.remove("k"));
            assert!(!store.has("k"));
        }
    }

    #[test]
    fn remove_deletes_the_named_key_and_nothing_else() {
        for kind in all_kinds() {
            let backends = Backends::in_memory(doc());
            let mut store = Store::new(StoreConfig::new(kind.clone()), backends.clone());
            store.set("a", 1);
            store.set("b", 2);
            store.set("key", 3);

            store.remove("a");
            assert_eq!(store.len(), 2);
            assert!(store.has("key"));

            let reloaded = Store::new(StoreConfig::new(kind), backends);
            assert_eq!(reloaded.dump(), store.dump());
        }
    }

    #[test]
    fn clear_empties_mirror_and_backend() {
        for kind in all_kinds() {
            let backends = Backends::in_memory(doc());
            let mut store = Store::new(StoreConfig::new(kind.clone()), backends.clone());
            store.set("a", 1);
            store.set("b", json!({"x": 1}));

            assert!(store.clear());
            assert!(store.is_empty());

            let reloaded = Store::new(StoreConfig::new(kind), backends);
            assert!(reloaded.dump().is_empty());
        }
    }

    #[test]
    fn second_instance_sees_first_instance_mirror() {
        for kind in all_kinds() {
            let backends = Backends::in_memory(doc());
            let mut first = Store::new(StoreConfig::new(kind.clone()), backends.clone());
            first.set("n", 42);
            first.set("list", vec!["a", "b"]);
            first.set("gone", "soon");
            first.remove("gone");

            let second = Store::new(StoreConfig::new(kind), backends);
            assert_eq!(second.dump(), first.dump());
            assert_eq!(second.get_all().len(), 2);
        }
    }

    #[test]
    fn missing_keys_use_fallback_or_none() {
        let store = Store::new(StoreConfig::default(), Backends::in_memory(doc()));
        assert_eq!(store.get_or("missing", json!("fallback")), json!("fallback"));
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.get_as::<String>("missing"), None);
    }

    #[test]
    fn get_or_prefers_the_stored_value() {
        let mut store = Store::new(StoreConfig::default(), Backends::in_memory(doc()));
        store.set("k", "stored");
        assert_eq!(store.get_or("k", json!("fallback")), json!("stored"));
    }

    #[test]
    fn typed_reads() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Prefs {
            theme: String,
            font_size: u8,
        }

        let mut store = Store::new(StoreConfig::new(DriverKind::Cookie), Backends::in_memory(doc()));
        let prefs = Prefs { theme: "dark".into(), font_size: 14 };
        assert!(store.set("prefs", &prefs));

        assert_eq!(store.get_as::<Prefs>("prefs"), Some(prefs));
        assert_eq!(store.get_as::<Vec<u8>>("prefs"), None);
    }

    #[test]
    fn cookie_scenario_survives_reload() {
        let backends = Backends::in_memory(doc());
        let config = StoreConfig::new(DriverKind::Cookie);

        let mut store = Store::new(config.clone(), backends.clone());
        store.set("a", [1, 2, 3]);
        drop(store);

        let store = Store::new(config, backends);
        assert_eq!(store.get("a"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn long_cookie_max_age_is_stored() {
        let backends = Backends::in_memory(doc());
        let config =
            StoreConfig::from_json(r#"{"driver":"cookie","cookie":{"max_age":1000000000000}}"#).unwrap();

        let mut store = Store::new(config.clone(), backends.clone());
        assert!(store.set("a", 1));

        let store = Store::new(config, backends);
        assert_eq!(store.get("a"), Some(&json!(1)));
    }

    #[test]
    fn cookie_set_reports_unreadable_cookies() {
        let cases = [
            (r#"{"driver":"cookie","cookie":{"max_age":0}}"#, "https://example.com/index.html"),
            (r#"{"driver":"cookie","cookie":{"secure":true}}"#, "http://example.com/"),
            (r#"{"driver":"cookie","cookie":{"path":"/admin"}}"#, "https://example.com/index.html"),
        ];
        for (json, url) in cases {
            let backends = Backends::in_memory(Url::parse(url).unwrap());
            let config = StoreConfig::from_json(json).unwrap();

            let mut store = Store::new(config.clone(), backends.clone());
            assert!(!store.set("a", 1), "{json} on {url}");

            let store = Store::new(config, backends);
            assert!(!store.has("a"));
        }
    }

    #[test]
    fn cookie_scenario_survives_process_restart() {
        let dir = tempfile::tempdir().unwrap();
        let cookie_path = dir.path().join("cookies.json");
        let backends = |path: &std::path::Path| {
            let jar = cookie_jar_handle(PersistentCookieJar::open(path).unwrap());
            Backends::new(StorageHandles::in_memory(&doc().origin()), jar, doc())
        };

        {
            let mut store = Store::new(StoreConfig::new(DriverKind::Cookie), backends(&cookie_path));
            assert!(store.set("a", [1, 2, 3]));
        }

        let store = Store::new(StoreConfig::new(DriverKind::Cookie), backends(&cookie_path));
        assert_eq!(store.get("a"), Some(&json!([1, 2, 3])));
    }

    #[cfg(feature = "sqlite_local_store")]
    #[test]
    fn local_store_survives_process_restart() {
        use crate::storage::{LocalStore, SqliteLocalStore};

        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("local.db").to_string_lossy().into_owned();
        let backends = |db: &str| {
            let local = SqliteLocalStore::new(db).unwrap().area(&doc().origin()).unwrap();
            let mut storage = StorageHandles::in_memory(&doc().origin());
            storage.local = local;
            Backends::new(storage, cookie_jar_handle(DefaultCookieJar::new()), doc())
        };

        {
            let mut store = Store::new(StoreConfig::default(), backends(&db));
            store.set("user", json!({"name": "ada", "tags": ["x"]}));
        }

        let store = Store::new(StoreConfig::default(), backends(&db));
        assert_eq!(store.get("user"), Some(&json!({"name": "ada", "tags": ["x"]})));
    }

    #[test]
    fn unsupported_driver_keeps_values_in_memory_only() {
        for name in ["indexedDB", "webSQL"] {
            let backends = Backends::in_memory(doc());
            let config = StoreConfig::new(name.parse().unwrap());

            let mut store = Store::new(config.clone(), backends.clone());
            assert!(store.set("k", 1));
            assert!(store.has("k"));

            let reloaded = Store::new(config, backends.clone());
            assert!(reloaded.is_empty());
            assert!(backends.storage.local.is_empty());
        }
    }

    #[test]
    fn unserializable_values_are_rejected() {
        use std::collections::HashMap;

        // JSON object keys must be strings
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);

        let mut store = Store::new(StoreConfig::default(), Backends::in_memory(doc()));
        assert!(!store.set("bad", bad));
        assert!(!store.has("bad"));
    }

    #[test]
    fn existing_backend_data_is_loaded_on_construction() {
        let backends = Backends::in_memory(doc());
        backends.storage.session.set_item("pre", "{\"v\":1}").unwrap();
        backends.storage.session.set_item("junk", "{{").unwrap();

        let store = Store::new(StoreConfig::new(DriverKind::Session), backends);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("pre"), Some(&json!({"v": 1})));
        assert_eq!(store.driver_kind(), DriverKind::Session);
        assert_eq!(store.config().driver, DriverKind::Session);
    }
}
