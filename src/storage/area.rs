use super::types::SessionId;
use anyhow::Result;
use std::sync::Arc;

/// Object-safe key/value storage area (DOM’s Storage).
pub trait StorageArea: Send + Sync {
    /// Retrieves the value associated with the given key, or `None` if not found.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Sets the value for the given key, overwriting any existing value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the item with the given key.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Clears all items in the storage area.
    fn clear(&self) -> Result<()>;

    /// Returns the number of items in the storage area.
    fn len(&self) -> usize;

    /// Returns `true` when the storage area holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a vector of all keys in the storage area.
    fn keys(&self) -> Vec<String>;
}

/// Store for localStorage-like areas (shared per origin).
pub trait LocalStore: Send + Sync {
    /// Retrieves the storage area for the given origin.
    fn area(&self, origin: &url::Origin) -> Result<Arc<dyn StorageArea>>;
}

/// Store for sessionStorage-like areas (isolated per (session, origin)).
pub trait SessionStore: Send + Sync {
    /// Retrieves the storage area for the given session and origin.
    fn area(&self, session: SessionId, origin: &url::Origin) -> Arc<dyn StorageArea>;

    /// Drops all session storage belonging to the given session.
    fn drop_session(&self, session: SessionId);
}
