//! Cookie jar abstraction and a simple in-memory implementation.
//!
//! A **cookie jar** holds every cookie a document can see. It is reachable
//! from two sides:
//! - the script side (`document.cookie`), through [`CookieJar::set_cookie`]
//!   and [`CookieJar::cookie_string`];
//! - the network side, through [`CookieJar::store_response_cookies`] and
//!   [`CookieJar::get_request_cookies`].
//!
//! ## Notes & limitations
//! - Cookies are bucketed by **origin** (`url.origin().ascii_serialization()`).
//!   Within a bucket, simple host/subdomain and path prefix checks are applied.
//! - Expired cookies are never returned and are purged on the next write to
//!   their bucket. Writing an already-expired cookie is how deletion is expressed.
//! - Size limits, priorities and eviction are not implemented.
//! - This module is **not** internally synchronized. Use it via a
//!   [`CookieJarHandle`](super::CookieJarHandle).
//!
use std::collections::HashMap;
use anyhow::Result;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::cookies::Cookie;

/// A cookie jar keeps the cookies for one browsing profile.
pub trait CookieJar: Send + Sync {
    /// Applies one `name=value; attributes` line, as the `document.cookie` setter does.
    fn set_cookie(&mut self, url: &Url, line: &str) -> Result<()>;

    /// Returns what the `document.cookie` getter would for `url`: matching,
    /// non-`HttpOnly` cookies as `name=value` pairs joined by `"; "`.
    /// Empty when nothing matches.
    fn cookie_string(&self, url: &Url) -> String;

    /// Stores cookies found in response `headers` for the given `url`.
    ///
    /// All `Set-Cookie` headers are applied in order with "last write wins"
    /// semantics when names collide.
    fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) -> Result<()>;

    /// Returns the `Cookie` request header value to send for `url`, if any.
    ///
    /// Unlike [`cookie_string`](CookieJar::cookie_string) this includes
    /// `HttpOnly` cookies.
    fn get_request_cookies(&self, url: &Url) -> Option<String>;

    /// Removes a single cookie with `cookie_name` associated with `url`.
    fn remove_cookie(&mut self, url: &Url, cookie_name: &str) -> Result<()>;

    /// Removes all cookies from the jar.
    fn clear(&mut self) -> Result<()>;
}

/// Default cookie jar, **in-memory only**.
///
/// Cookies are stored per **origin** (`scheme://host:port`) and matched to
/// documents and requests via basic domain/path/secure rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultCookieJar {
    /// Simple hashmap of cookies, bucketed by **origin**.
    pub entries: HashMap<String, Vec<Cookie>>,
}

impl DefaultCookieJar {
    /// Creates an empty in-memory cookie jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of live cookies across all origins.
    pub fn len(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        self.entries
            .values()
            .flat_map(|bucket| bucket.iter())
            .filter(|c| !c.is_expired_at(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply(&mut self, url: &Url, cookie: Cookie) {
        let bucket = self.entries.entry(url.origin().ascii_serialization()).or_default();

        let now = OffsetDateTime::now_utc();
        bucket.retain(|c| !c.is_expired_at(now));

        if cookie.is_expired_at(now) {
            log::debug!("cookie {} expired on write, removing", cookie.name);
            bucket.retain(|c| c.name != cookie.name);
            return;
        }

        // Replace existing cookie with same name
        if let Some(existing) = bucket.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            bucket.push(cookie);
        }
    }

    fn matching<'a>(&'a self, url: &Url) -> impl Iterator<Item = &'a Cookie> + 'a {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let path = url.path().to_string();
        let is_https = url.scheme() == "https";
        let now = OffsetDateTime::now_utc();

        self.entries
            .get(&url.origin().ascii_serialization())
            .into_iter()
            .flat_map(|bucket| bucket.iter())
            .filter(move |cookie| match &cookie.domain {
                Some(domain) => host == *domain || host.ends_with(&format!(".{}", domain)),
                None => true,
            })
            .filter(move |cookie| match &cookie.path {
                Some(cookie_path) => path.starts_with(cookie_path.as_str()),
                None => true,
            })
            .filter(move |cookie| !cookie.secure || is_https)
            .filter(move |cookie| !cookie.is_expired_at(now))
    }
}

/// Directory part of the url path, used as the default `Path` attribute.
fn default_path(url: &Url) -> &str {
    url.path()
        .rsplit_once('/')
        .map_or("/", |(a, _)| if a.is_empty() { "/" } else { a })
}

fn join_pairs<'a>(cookies: impl Iterator<Item = &'a Cookie>) -> String {
    cookies
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

impl CookieJar for DefaultCookieJar {
    fn set_cookie(&mut self, url: &Url, line: &str) -> Result<()> {
        match Cookie::parse(line, default_path(url)) {
            Some(cookie) => self.apply(url, cookie),
            None => log::debug!("ignoring malformed cookie line {line:?}"),
        }
        Ok(())
    }

    fn cookie_string(&self, url: &Url) -> String {
        join_pairs(self.matching(url).filter(|c| !c.http_only))
    }

    fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) -> Result<()> {
        for header in headers.get_all(http::header::SET_COOKIE) {
            match header.to_str() {
                Ok(line) => self.set_cookie(url, line)?,
                Err(_) => log::debug!("skipping non-ASCII Set-Cookie header"),
            }
        }
        Ok(())
    }

    fn get_request_cookies(&self, url: &Url) -> Option<String> {
        let header = join_pairs(self.matching(url));
        if header.is_empty() {
            None
        } else {
            Some(header)
        }
    }

    fn remove_cookie(&mut self, url: &Url, cookie_name: &str) -> Result<()> {
        if let Some(cookies) = self.entries.get_mut(&url.origin().ascii_serialization()) {
            cookies.retain(|c| c.name != cookie_name);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
