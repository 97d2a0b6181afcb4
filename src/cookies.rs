//! Cookies: [`CookieJar`], the [`Cookie`] record and jar implementations.
//!
//! # Concurrency model
//! - [`CookieJarHandle`] is `Arc<RwLock<dyn CookieJar + Send + Sync>>`.
//!   Callers take a **read lock** for queries and a **write lock** for mutations.
//!
//! # Typical usage
//! ```
//! use gosub_store::cookies::{cookie_jar_handle, CookieJar, DefaultCookieJar};
//!
//! let url = url::Url::parse("https://example.com/").unwrap();
//! let jar = cookie_jar_handle(DefaultCookieJar::new());
//!
//! jar.write().unwrap().set_cookie(&url, "theme=dark; path=/").unwrap();
//! assert_eq!(jar.read().unwrap().cookie_string(&url), "theme=dark");
//! ```

mod cookie;
mod cookie_jar;
mod persistent_cookie_jar;

use std::sync::{Arc, RwLock};

pub use cookie::{format_http_date, parse_http_date, Cookie};
pub use cookie_jar::{CookieJar, DefaultCookieJar};
pub use persistent_cookie_jar::PersistentCookieJar;

/// A handle to a cookie jar trait.
///
/// This is a reference-counted, read/write-locked pointer to a type-erased
/// [`CookieJar`]. Clones share the same jar.
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// Wraps a jar into a shareable [`CookieJarHandle`].
pub fn cookie_jar_handle(jar: impl CookieJar + 'static) -> CookieJarHandle {
    Arc::new(RwLock::new(jar))
}
