//! Drivers adapt one native storage mechanism to the uniform [`Driver`] contract.
//!
//! Every native mechanism only stores strings, so values are serialized to
//! JSON text on the way in and parsed back on the way out. A driver is picked
//! once, from [`StoreConfig::driver`], by [`create_driver`].
//!
//! | [`DriverKind`]   | driver                | mechanism                          |
//! |------------------|-----------------------|------------------------------------|
//! | `Local`          | [`StorageAreaDriver`] | [`StorageHandles::local`]          |
//! | `Session`        | [`StorageAreaDriver`] | [`StorageHandles::session`]        |
//! | `Cookie`         | [`CookieDriver`]      | [`Backends::cookie_jar`]           |
//! | `IndexedDb`      | [`NoopDriver`]        | none, not implemented              |
//! | `Unknown(_)`     | [`NoopDriver`]        | none                               |

mod cookie;
mod noop;
mod storage_area;

use std::collections::HashMap;

use serde_json::Value;
use url::Url;

use crate::config::{DriverKind, StoreConfig};
use crate::cookies::{cookie_jar_handle, CookieJarHandle, DefaultCookieJar};
use crate::errors::StoreError;
use crate::storage::StorageHandles;

pub use cookie::CookieDriver;
pub use noop::NoopDriver;
pub use storage_area::StorageAreaDriver;

/// Fully deserialized contents of a backing store.
pub type Mirror = HashMap<String, Value>;

/// Uniform access to one backing mechanism.
pub trait Driver: Send + Sync {
    /// The mechanism this driver writes to.
    fn kind(&self) -> DriverKind;

    /// Serializes `value` and stores it under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Deletes `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Reads back every stored entry. An empty store yields an empty map.
    fn dump(&self) -> Result<Mirror, StoreError>;

    /// Deletes every entry.
    fn clear(&self) -> Result<(), StoreError>;
}

/// The native mechanisms available to one document.
///
/// Clones share the underlying storage, so two stores built from clones of
/// the same `Backends` see each other's writes once reloaded.
#[derive(Clone)]
pub struct Backends {
    pub storage: StorageHandles,
    pub cookie_jar: CookieJarHandle,
    /// Document the cookie jar is consulted for
    pub document_url: Url,
}

impl Backends {
    pub fn new(storage: StorageHandles, cookie_jar: CookieJarHandle, document_url: Url) -> Self {
        Self {
            storage,
            cookie_jar,
            document_url,
        }
    }

    /// Fresh, non-persistent backends for `document_url`.
    pub fn in_memory(document_url: Url) -> Self {
        Self {
            storage: StorageHandles::in_memory(&document_url.origin()),
            cookie_jar: cookie_jar_handle(DefaultCookieJar::new()),
            document_url,
        }
    }
}

/// Builds the driver named by `config`.
///
/// Fails with [`StoreError::UnsupportedDriver`] for kinds that have no
/// implementation.
pub fn try_create_driver(config: &StoreConfig, backends: &Backends) -> Result<Box<dyn Driver>, StoreError> {
    match &config.driver {
        DriverKind::Local => Ok(Box::new(StorageAreaDriver::new(
            DriverKind::Local,
            backends.storage.local.clone(),
        ))),
        DriverKind::Session => Ok(Box::new(StorageAreaDriver::new(
            DriverKind::Session,
            backends.storage.session.clone(),
        ))),
        DriverKind::Cookie => Ok(Box::new(CookieDriver::new(
            backends.cookie_jar.clone(),
            backends.document_url.clone(),
            config.cookie.clone(),
        ))),
        other @ (DriverKind::IndexedDb | DriverKind::Unknown(_)) => {
            Err(StoreError::UnsupportedDriver(other.to_string()))
        }
    }
}

/// Builds the driver named by `config`, falling back to a [`NoopDriver`]
/// when the kind is not supported.
pub fn create_driver(config: &StoreConfig, backends: &Backends) -> Box<dyn Driver> {
    try_create_driver(config, backends).unwrap_or_else(|e| {
        log::warn!("{e}; values will only be kept in memory");
        Box::new(NoopDriver::new(config.driver.clone()))
    })
}

pub(crate) fn encode_value(value: &Value) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

pub(crate) fn decode_value(key: &str, text: &str) -> Result<Value, StoreError> {
    serde_json::from_str(text).map_err(|e| StoreError::MalformedEntry {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
