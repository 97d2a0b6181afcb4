//! The serializable [`Cookie`] record and its `Set-Cookie` line parser.
//!
//! ```rust
//! use gosub_store::cookies::Cookie;
//!
//! let c = Cookie::parse("session=abc123; Path=/; Secure; SameSite=lax", "/").unwrap();
//! assert_eq!(c.name, "session");
//! assert_eq!(c.value, "abc123");
//! assert_eq!(c.same_site.as_deref(), Some("Lax"));
//! assert!(c.secure);
//! ```

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// IMF-fixdate, the `Expires` format: `Thu, 01 Jan 1970 00:00:00 GMT`.
const HTTP_DATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Upper bound on a cookie lifetime, 400 days as in RFC 6265bis.
pub const MAX_COOKIE_AGE: Duration = Duration::days(400);

/// A cookie as stored/serialized by the jar.
///
/// This structure captures the essential attributes of an HTTP cookie and
/// is suitable for persistence (e.g. JSON) via `serde`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping (e.g., `"/"`).
    pub path: Option<String>,

    /// Domain scoping (host-only if `None`).
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// Expiration instant. Session cookies have `None`.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,

    /// SameSite policy (`"Strict"`, `"Lax"`, or `"None"`).
    pub same_site: Option<String>,

    /// If `true`, cookie is hidden from `document.cookie`.
    pub http_only: bool,
}

impl Cookie {
    /// Creates a session cookie with no attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            secure: false,
            expires: None,
            same_site: None,
            http_only: false,
        }
    }

    /// Parses a single `Set-Cookie` line (`name=value; Attr=...; Flag`).
    ///
    /// `default_path` is used when the line carries no `Path` attribute.
    /// `Max-Age` wins over `Expires` when both are present. Unparseable
    /// `Expires` values are ignored. Returns `None` when there is no `=` in
    /// the name/value pair or the name is empty.
    pub fn parse(line: &str, default_path: &str) -> Option<Cookie> {
        let (pair, attributes) = match line.split_once(';') {
            Some((pair, rest)) => (pair, rest),
            None => (line, ""),
        };

        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim());
        let mut max_age = None;

        for part in attributes.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((k, v)) = part.split_once('=') {
                let v = v.trim();
                match k.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = Some(v.to_string()),
                    "domain" => cookie.domain = Some(v.trim_start_matches('.').to_ascii_lowercase()),
                    "expires" => match parse_http_date(v) {
                        Some(at) => cookie.expires = Some(at),
                        None => log::debug!("ignoring unparseable Expires attribute {v:?} on cookie {name}"),
                    },
                    "max-age" => match v.parse::<i128>() {
                        Ok(secs) => max_age = Some(secs),
                        Err(_) => log::debug!("ignoring invalid Max-Age {v:?} on cookie {name}"),
                    },
                    "samesite" => {
                        // normalize to "Lax" | "Strict" | "None"
                        let normalized = if v.eq_ignore_ascii_case("lax") {
                            "Lax"
                        } else if v.eq_ignore_ascii_case("strict") {
                            "Strict"
                        } else if v.eq_ignore_ascii_case("none") {
                            "None"
                        } else {
                            v
                        };
                        cookie.same_site = Some(normalized.to_string());
                    }
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if part.eq_ignore_ascii_case("httponly") {
                cookie.http_only = true;
            }
        }

        if let Some(secs) = max_age {
            cookie.expires = Some(if secs <= 0 {
                OffsetDateTime::UNIX_EPOCH
            } else {
                let age = i64::try_from(secs)
                    .map(Duration::seconds)
                    .unwrap_or(MAX_COOKIE_AGE)
                    .min(MAX_COOKIE_AGE);
                OffsetDateTime::now_utc() + age
            });
        }

        if cookie.path.is_none() {
            cookie.path = Some(default_path.to_string());
        }

        Some(cookie)
    }

    /// Returns `true` when the cookie has an expiry at or before `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }
}

/// Parses an IMF-fixdate such as `Thu, 01 Jan 1970 00:00:00 GMT`.
pub fn parse_http_date(s: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(s.trim(), HTTP_DATE)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Formats an instant as an IMF-fixdate. The instant is converted to UTC first.
pub fn format_http_date(at: OffsetDateTime) -> String {
    at.to_offset(time::UtcOffset::UTC)
        .format(HTTP_DATE)
        .unwrap_or_else(|_| "Thu, 01 Jan 1970 00:00:00 GMT".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_name_value_and_attributes() {
        let c = Cookie::parse(
            "id=a3fWa; Expires=Wed, 21 Oct 2037 07:28:00 GMT; Domain=.Example.com; Path=/docs; Secure; HttpOnly; SameSite=STRICT",
            "/",
        )
        .unwrap();

        assert_eq!(c.name, "id");
        assert_eq!(c.value, "a3fWa");
        assert_eq!(c.path.as_deref(), Some("/docs"));
        assert_eq!(c.domain.as_deref(), Some("example.com"));
        assert_eq!(c.expires, Some(datetime!(2037-10-21 07:28:00 UTC)));
        assert_eq!(c.same_site.as_deref(), Some("Strict"));
        assert!(c.secure);
        assert!(c.http_only);
    }

    #[test]
    fn empty_value_does_not_swallow_attributes() {
        let c = Cookie::parse("gone=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/", "/x").unwrap();
        assert_eq!(c.value, "");
        assert_eq!(c.path.as_deref(), Some("/"));
        assert!(c.is_expired());
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let c = Cookie::parse("token=abc==; Path=/", "/").unwrap();
        assert_eq!(c.value, "abc==");
    }

    #[test]
    fn default_path_applies_when_missing() {
        let c = Cookie::parse("a=1", "/app").unwrap();
        assert_eq!(c.path.as_deref(), Some("/app"));
        assert!(c.expires.is_none());
        assert!(!c.is_expired());
    }

    #[test]
    fn max_age_overrides_expires() {
        let c = Cookie::parse("a=1; Max-Age=0; Expires=Wed, 21 Oct 2037 07:28:00 GMT", "/").unwrap();
        assert!(c.is_expired());

        let c = Cookie::parse("a=1; Max-Age=3600", "/").unwrap();
        assert!(!c.is_expired());
        assert!(c.expires.is_some());
    }

    #[test]
    fn huge_max_age_is_capped() {
        let before = OffsetDateTime::now_utc();
        for line in ["a=1; Max-Age=99999999999999", "a=1; Max-Age=999999999999999999999999"] {
            let c = Cookie::parse(line, "/").unwrap();
            let expires = c.expires.unwrap();
            assert!(!c.is_expired());
            assert!(expires <= OffsetDateTime::now_utc() + MAX_COOKIE_AGE);
            assert!(expires >= before + MAX_COOKIE_AGE);
        }

        let c = Cookie::parse("a=1; Max-Age=60", "/").unwrap();
        assert!(c.expires.unwrap() <= OffsetDateTime::now_utc() + Duration::seconds(60));
    }

    #[test]
    fn rejects_lines_without_a_name() {
        assert!(Cookie::parse("novalue", "/").is_none());
        assert!(Cookie::parse("=v; Path=/", "/").is_none());
    }

    #[test]
    fn bad_expires_is_ignored() {
        let c = Cookie::parse("a=1; Expires=tomorrow", "/").unwrap();
        assert!(c.expires.is_none());
    }

    #[test]
    fn http_date_formats_and_parses() {
        let at = datetime!(1970-01-01 00:00:00 UTC);
        assert_eq!(format_http_date(at), "Thu, 01 Jan 1970 00:00:00 GMT");
        assert_eq!(parse_http_date("Thu, 01 Jan 1970 00:00:00 GMT"), Some(at));
        assert_eq!(parse_http_date("not a date"), None);
    }

    #[test]
    fn serde_keeps_expiry() {
        let mut c = Cookie::new("a", "1");
        c.expires = Some(datetime!(2037-10-21 07:28:00 UTC));
        let json = serde_json::to_string(&c).unwrap();
        let back: Cookie = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
