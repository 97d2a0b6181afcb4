//! JSON-file backed cookie jar.
//!
//! `PersistentCookieJar` wraps a [`DefaultCookieJar`] and rewrites a single
//! JSON file after **every mutation**, so a jar opened later on the same path
//! starts from the state the previous one left behind.
//!
//! ### I/O characteristics & caveats
//! - Every write rewrites the whole file. This is fine for the handful of
//!   cookies a document owns; it is not meant for large datasets.
//! - File writes are not atomic.
//!
//! ### Example
//! ```no_run
//! use gosub_store::cookies::{CookieJar, PersistentCookieJar};
//!
//! let url = url::Url::parse("https://example.com/").unwrap();
//! let mut jar = PersistentCookieJar::open("cookies.json").unwrap();
//! jar.set_cookie(&url, "theme=dark; path=/").unwrap();
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use http::HeaderMap;
use url::Url;

use crate::cookies::cookie_jar::{CookieJar, DefaultCookieJar};

/// A `CookieJar` decorator that persists changes after each mutation.
///
/// This type is *transparent* for reads but *eagerly* persists after writes.
pub struct PersistentCookieJar {
    /// File the jar snapshot is written to.
    path: PathBuf,
    /// Inner cookie jar that holds the actual cookie state.
    inner: DefaultCookieJar,
}

impl PersistentCookieJar {
    /// Opens the jar stored at `path`, creating an empty one if the file does not exist.
    ///
    /// A file that exists but does not hold a valid jar is treated as empty and
    /// will be overwritten on the next mutation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let inner = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("reading cookie jar {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("cookie jar {} is corrupt ({e}), starting empty", path.display());
                DefaultCookieJar::new()
            })
        } else {
            DefaultCookieJar::new()
        };

        Ok(Self { path, inner })
    }

    /// Read-only view of the in-memory state.
    pub fn snapshot(&self) -> &DefaultCookieJar {
        &self.inner
    }

    /// Writes the current state of the jar to disk.
    fn persist(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.inner)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing cookie jar {}", self.path.display()))?;
        log::debug!("persisted {} cookies to {}", self.inner.len(), self.path.display());
        Ok(())
    }
}

impl CookieJar for PersistentCookieJar {
    /// Applies the cookie line, then persists the updated state.
    fn set_cookie(&mut self, url: &Url, line: &str) -> Result<()> {
        self.inner.set_cookie(url, line)?;
        self.persist()
    }

    fn cookie_string(&self, url: &Url) -> String {
        self.inner.cookie_string(url)
    }

    /// Stores cookies from a response, then persists the updated state.
    fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) -> Result<()> {
        self.inner.store_response_cookies(url, headers)?;
        self.persist()
    }

    fn get_request_cookies(&self, url: &Url) -> Option<String> {
        self.inner.get_request_cookies(url)
    }

    /// Removes a single cookie by name for `url`, then persists the updated state.
    fn remove_cookie(&mut self, url: &Url, cookie_name: &str) -> Result<()> {
        self.inner.remove_cookie(url, cookie_name)?;
        self.persist()
    }

    /// Clears all cookies in the jar, then persists the updated state.
    fn clear(&mut self) -> Result<()> {
        self.inner.clear()?;
        self.persist()
    }
}
