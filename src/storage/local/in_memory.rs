use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use anyhow::{anyhow, Result};
use crate::storage::area::{LocalStore, StorageArea};

/// In‑memory local storage (no persistence). Used when no persistent store is configured.
#[derive(Default)]
pub struct InMemoryLocalStore {
    areas: Mutex<HashMap<url::Origin, Arc<dyn StorageArea>>>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`LocalStore::area`], which cannot fail for this store.
    pub fn area_for(&self, origin: &url::Origin) -> Arc<dyn StorageArea> {
        let mut guard = self.areas.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .entry(origin.clone())
            .or_insert_with(|| Arc::new(InMemoryLocalArea::default()) as Arc<dyn StorageArea>)
            .clone()
    }
}

impl LocalStore for InMemoryLocalStore {
    fn area(&self, origin: &url::Origin) -> Result<Arc<dyn StorageArea>> {
        Ok(self.area_for(origin))
    }
}

#[derive(Default)]
struct InMemoryLocalArea {
    map: Mutex<HashMap<String, String>>,
}

impl InMemoryLocalArea {
    fn map(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.map.lock().map_err(|_| anyhow!("local storage area lock poisoned"))
    }
}

impl StorageArea for InMemoryLocalArea {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.map()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.map()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.map()?.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.map().map(|m| m.len()).unwrap_or(0)
    }

    fn keys(&self) -> Vec<String> {
        let mut v: Vec<String> = match self.map() {
            Ok(m) => m.keys().cloned().collect(),
            Err(_) => return vec![],
        };
        v.sort_unstable();
        v
    }
}
