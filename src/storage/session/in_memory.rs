use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use anyhow::{anyhow, Result};

use crate::storage::area::{SessionStore, StorageArea};
use crate::storage::types::SessionId;

type AreaKey = (SessionId, String);
type Areas = Arc<RwLock<HashMap<AreaKey, HashMap<String, String>>>>;

// In memory storage
#[derive(Default)]
pub struct InMemorySessionStore {
    data: Areas,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn area(&self, session: SessionId, origin: &url::Origin) -> Arc<dyn StorageArea> {
        let k = (session, origin.ascii_serialization());

        if let Ok(mut guard) = self.data.write() {
            guard.entry(k.clone()).or_default();
        }

        Arc::new(SessionArea {
            data: Arc::clone(&self.data),
            key: k,
        })
    }

    fn drop_session(&self, session: SessionId) {
        if let Ok(mut guard) = self.data.write() {
            guard.retain(|(s, _), _| *s != session);
        }
    }
}

struct SessionArea {
    data: Areas,
    key: AreaKey,
}

fn poisoned() -> anyhow::Error {
    anyhow!("session storage lock poisoned")
}

impl StorageArea for SessionArea {
    fn get_item(&self, k: &str) -> Option<String> {
        self.data.read().ok()?
            .get(&self.key)
            .and_then(|m| m.get(k).cloned())
    }

    fn set_item(&self, k: &str, v: &str) -> Result<()> {
        // A dropped session is recreated on the next write.
        self.data.write().map_err(|_| poisoned())?
            .entry(self.key.clone())
            .or_default()
            .insert(k.to_string(), v.to_string());
        Ok(())
    }

    fn remove_item(&self, k: &str) -> Result<()> {
        if let Some(m) = self.data.write().map_err(|_| poisoned())?.get_mut(&self.key) {
            m.remove(k);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.data.write().map_err(|_| poisoned())?
            .insert(self.key.clone(), HashMap::new());
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.read().ok()
            .and_then(|d| d.get(&self.key).map(|m| m.len()))
            .unwrap_or(0)
    }

    fn keys(&self) -> Vec<String> {
        self.data.read().ok()
            .and_then(|d| d.get(&self.key).map(|m| m.keys().cloned().collect()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn o(s: &str) -> url::Origin {
        url::Url::parse(s).expect("valid URL").origin()
    }

    #[test]
    fn sessions_are_isolated() {
        let store = InMemorySessionStore::new();
        let origin = o("https://example.com");
        let s1 = SessionId::new();
        let s2 = SessionId::new();

        let a = store.area(s1, &origin);
        let b = store.area(s2, &origin);
        a.set_item("k", "1").unwrap();

        assert_eq!(a.get_item("k").as_deref(), Some("1"));
        assert!(b.get_item("k").is_none());

        // a second handle to the same session sees the same data
        let a2 = store.area(s1, &origin);
        assert_eq!(a2.get_item("k").as_deref(), Some("1"));
    }

    #[test]
    fn origins_are_isolated_within_a_session() {
        let store = InMemorySessionStore::new();
        let s = SessionId::new();

        let a = store.area(s, &o("https://a.test"));
        let b = store.area(s, &o("https://b.test"));
        a.set_item("k", "1").unwrap();
        assert!(b.get_item("k").is_none());
        assert!(b.keys().is_empty());
    }

    #[test]
    fn drop_session_discards_only_that_session() {
        let store = InMemorySessionStore::new();
        let origin = o("https://example.com");
        let s1 = SessionId::new();
        let s2 = SessionId::new();

        let a = store.area(s1, &origin);
        let b = store.area(s2, &origin);
        a.set_item("k", "1").unwrap();
        b.set_item("k", "2").unwrap();

        store.drop_session(s1);
        assert_eq!(a.len(), 0);
        assert!(a.get_item("k").is_none());
        assert_eq!(b.get_item("k").as_deref(), Some("2"));

        // writes after the drop start a fresh area
        a.set_item("n", "x").unwrap();
        assert_eq!(a.keys(), vec!["n".to_string()]);
    }
}
