use serde_json::Value;
use time::OffsetDateTime;
use url::{form_urlencoded, Url};

use crate::config::{CookieOptions, DriverKind};
use crate::cookies::{format_http_date, CookieJarHandle};
use crate::driver::{decode_value, encode_value, Driver, Mirror};
use crate::errors::StoreError;

/// Driver over `document.cookie`.
///
/// Each entry becomes one cookie: `enc(key)=enc(json)` where `enc` is
/// form-urlencoding, so JSON punctuation such as `;`, `,` and `=` cannot
/// break the cookie syntax. Cookies carry the configured [`CookieOptions`];
/// by default that is `path=/` and no expiry. Deletion writes the same cookie
/// with an expiry in the past.
pub struct CookieDriver {
    jar: CookieJarHandle,
    url: Url,
    options: CookieOptions,
}

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Reverses [`encode`]. `None` for text `encode` cannot have produced.
fn decode(s: &str) -> Option<String> {
    if s.contains(['&', '=']) {
        return None;
    }
    Some(
        form_urlencoded::parse(s.as_bytes())
            .next()
            .map(|(name, _)| name.into_owned())
            .unwrap_or_default(),
    )
}

impl CookieDriver {
    pub fn new(jar: CookieJarHandle, url: Url, options: CookieOptions) -> Self {
        Self { jar, url, options }
    }

    fn write(&self, line: &str) -> Result<(), StoreError> {
        let mut jar = self.jar.write().map_err(|_| StoreError::LockPoisoned)?;
        jar.set_cookie(&self.url, line)?;
        Ok(())
    }

    fn document_cookie(&self) -> Result<String, StoreError> {
        let jar = self.jar.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(jar.cookie_string(&self.url))
    }

    /// Expires a cookie by its already-encoded name.
    fn expire(&self, encoded_name: &str) -> Result<(), StoreError> {
        self.write(&format!(
            "{}=; expires={}; path={}",
            encoded_name,
            format_http_date(OffsetDateTime::UNIX_EPOCH),
            self.options.path
        ))
    }

    /// Splits the `document.cookie` string into raw `(name, value)` pairs.
    fn pairs(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .document_cookie()?
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                pair.split_once('=')
                    .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            })
            .collect())
    }
}

impl Driver for CookieDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Cookie
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::MalformedEntry {
                key: String::new(),
                reason: "cookie names cannot be empty".to_string(),
            });
        }

        let name = encode(key);
        let encoded = encode(&encode_value(value)?);
        let mut line = format!("{}={}; path={}", name, encoded, self.options.path);
        if let Some(max_age) = self.options.max_age {
            line.push_str(&format!("; max-age={max_age}"));
        }
        if let Some(same_site) = &self.options.same_site {
            line.push_str(&format!("; samesite={same_site}"));
        }
        if self.options.secure {
            line.push_str("; secure");
        }
        self.write(&line)?;

        // The jar may drop the cookie (max-age=0) or store it where this
        // document cannot read it back (secure on http, a narrower path).
        if self.pairs()?.iter().any(|(n, v)| *n == name && *v == encoded) {
            Ok(())
        } else {
            Err(StoreError::CookieRejected(key.to_string()))
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.expire(&encode(key))
    }

    fn dump(&self) -> Result<Mirror, StoreError> {
        let mut mirror = Mirror::new();
        for (name, value) in self.pairs()? {
            let (Some(key), Some(text)) = (decode(&name), decode(&value)) else {
                log::warn!("cookie: skipping {name}, not written by this store");
                continue;
            };
            match decode_value(&key, &text) {
                Ok(value) => {
                    mirror.insert(key, value);
                }
                Err(e) => log::warn!("cookie: skipping entry: {e}"),
            }
        }
        Ok(mirror)
    }

    fn clear(&self) -> Result<(), StoreError> {
        for (name, _) in self.pairs()? {
            self.expire(&name)?;
        }
        Ok(())
    }
}
