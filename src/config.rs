use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// Backing mechanism a [`Store`](crate::Store) is bound to.
///
/// Parsing never fails: names outside the supported set end up as
/// [`DriverKind::Unknown`] and produce a no-op driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DriverKind {
    /// Page-scoped persistent store (`localStorage`).
    Local,
    /// Session-scoped store (`sessionStorage`).
    Session,
    /// Cookie storage (`document.cookie`).
    Cookie,
    /// Transactional indexed store. Recognized but not implemented.
    IndexedDb,
    Unknown(String),
}

impl DriverKind {
    pub fn as_str(&self) -> &str {
        match self {
            DriverKind::Local => "localStorage",
            DriverKind::Session => "sessionStorage",
            DriverKind::Cookie => "cookie",
            DriverKind::IndexedDb => "indexedDB",
            DriverKind::Unknown(name) => name,
        }
    }
}

impl FromStr for DriverKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "localStorage" | "local" => DriverKind::Local,
            "sessionStorage" | "session" => DriverKind::Session,
            "cookie" | "cookies" => DriverKind::Cookie,
            "indexedDB" => DriverKind::IndexedDb,
            other => DriverKind::Unknown(other.to_string()),
        })
    }
}

impl From<String> for DriverKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<DriverKind> for String {
    fn from(kind: DriverKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes written alongside every cookie by the cookie driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    /// Path scope, the whole site by default
    pub path: String,
    /// Lifetime in seconds. `None` writes no expiry at all, so the cookie
    /// lives until it is removed or the jar is dropped.
    pub max_age: Option<u64>,
    pub secure: bool,
    pub same_site: Option<String>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            max_age: None,
            secure: false,
            same_site: None,
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which backing mechanism to use
    pub driver: DriverKind,
    /// Only consulted by the cookie driver
    pub cookie: CookieOptions,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::Local,
            cookie: CookieOptions::default(),
        }
    }
}

impl StoreConfig {
    pub fn new(driver: DriverKind) -> Self {
        Self {
            driver,
            ..Default::default()
        }
    }

    /// Loads a configuration from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }
}
