//! Key/value storage backends.
//!
//! This module provides the string-only storage mechanisms that the
//! [`driver`](crate::driver) layer adapts. They follow the shape of the DOM
//! `Storage` interface: every key maps to a plain string and callers are
//! responsible for any encoding of richer values.
//!
//! # Concepts
//!
//! - **Local storage**: persistent key/value data per origin. Backed by a
//!   [`LocalStore`].
//! - **Session storage**: ephemeral key/value data per `(session, origin)`,
//!   valid until the session is dropped. Backed by a [`SessionStore`].
//!
//! All stores hand out [`StorageArea`]s, which provide `get_item`,
//! `set_item`, `remove_item`, `clear`, `len` and `keys`.
//!
//! # Choosing a backend
//!
//! - For persistent local storage, use [`SqliteLocalStore`].
//! - For session storage, use [`InMemorySessionStore`].
//! - For tests or throwaway documents, [`InMemoryLocalStore`] works for both roles.
//!
//! # Example
//!
//! ```no_run
//! use gosub_store::storage::{LocalStore, SessionStore, SessionId, StorageHandles};
//! use gosub_store::storage::{InMemorySessionStore, SqliteLocalStore};
//!
//! let origin = url::Url::parse("https://example.com").unwrap().origin();
//! let local = SqliteLocalStore::new("local.db").unwrap();
//! let session = InMemorySessionStore::new();
//!
//! let handles = StorageHandles {
//!     local: local.area(&origin).unwrap(),
//!     session: session.area(SessionId::new(), &origin),
//! };
//! handles.local.set_item("greeting", "\"hello\"").unwrap();
//! ```

use std::sync::Arc;

/// Storage area module, defining the key/value storage interface.
pub mod area;
/// Storage types
pub mod types;

/// Local storage module, providing persistent storage areas.
pub mod local {
    /// In-memory local storage implementation.
    pub mod in_memory;
    /// SQLite-backed local storage implementation.
    #[cfg(feature = "sqlite_local_store")]
    pub mod sqlite_store;
}

/// Session storage module, providing in-memory session storage.
pub mod session {
    /// In-memory session storage implementation.
    pub mod in_memory;
}

/// Handles to both local and session storage areas of one document.
#[derive(Clone)]
pub struct StorageHandles {
    /// Local storage area, persistent and shared by every document of the origin.
    pub local: Arc<dyn StorageArea>,
    /// Session storage area, tied to a single browsing session.
    pub session: Arc<dyn StorageArea>,
}

impl StorageHandles {
    /// Creates handles backed by fresh in-memory stores.
    pub fn in_memory(origin: &url::Origin) -> Self {
        Self {
            local: InMemoryLocalStore::new().area_for(origin),
            session: InMemorySessionStore::new().area(SessionId::new(), origin),
        }
    }
}

pub use area::{LocalStore, SessionStore, StorageArea};
pub use local::in_memory::InMemoryLocalStore;
#[cfg(feature = "sqlite_local_store")]
pub use local::sqlite_store::SqliteLocalStore;
pub use session::in_memory::InMemorySessionStore;
pub use types::SessionId;
