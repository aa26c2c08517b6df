//! Server base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated netTime server URL.
///
/// The URL must be absolute and use HTTPS; plain HTTP is accepted only for
/// localhost. A trailing slash is dropped so that every API path can be
/// appended verbatim.
///
/// # Example
///
/// ```
/// use nettime_core::BaseUrl;
///
/// let base = BaseUrl::new("https://nettime.example.com/").unwrap();
/// assert_eq!(base.endpoint("/api/login"), "https://nettime.example.com/api/login");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Parse and check a server URL.
    ///
    /// # Errors
    ///
    /// [`InvalidInputError::BaseUrl`] naming the first rule the URL breaks.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let checked = Url::parse(s)
            .map_err(|e| e.to_string())
            .and_then(|url| match rejection(&url) {
                Some(reason) => Err(reason.to_string()),
                None => Ok(url),
            });

        checked.map(Self).map_err(|reason| {
            InvalidInputError::BaseUrl {
                value: s.to_string(),
                reason,
            }
            .into()
        })
    }

    /// Returns the absolute URL for an API path such as `/api/settings`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{self}/{}", path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

/// Why `url` cannot serve as a server base, if it cannot.
fn rejection(url: &Url) -> Option<&'static str> {
    let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

    if url.cannot_be_a_base() {
        Some("must be an absolute URL")
    } else if url.host_str().is_none() {
        Some("must have a host")
    } else if url.scheme() != "https" && !(url.scheme() == "http" && loopback) {
        Some("must use HTTPS (HTTP allowed only for localhost)")
    } else if url.query().is_some() || url.fragment().is_some() {
        Some("must not carry a query or fragment")
    } else {
        None
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str().trim_end_matches('/'))
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BaseUrl> for String {
    fn from(url: BaseUrl) -> Self {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let base = BaseUrl::new("https://nettime.example.com").unwrap();
        assert_eq!(base.host(), Some("nettime.example.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let base = BaseUrl::new("http://127.0.0.1:6091").unwrap();
        assert_eq!(base.endpoint("/api/login"), "http://127.0.0.1:6091/api/login");
    }

    #[test]
    fn endpoint_keeps_sub_path() {
        let base = BaseUrl::new("https://example.com/nettime/").unwrap();
        assert_eq!(
            base.endpoint("/api/async/status"),
            "https://example.com/nettime/api/async/status"
        );
        assert_eq!(base.to_string(), "https://example.com/nettime");
    }

    #[test]
    fn endpoint_preserves_trailing_slash_of_path() {
        let base = BaseUrl::new("https://example.com").unwrap();
        assert_eq!(base.endpoint("/api/day/post/"), "https://example.com/api/day/post/");
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(BaseUrl::new("http://nettime.example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(BaseUrl::new("/api/login").is_err());
    }

    #[test]
    fn rejection_names_the_broken_rule() {
        let err = BaseUrl::new("ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("must use HTTPS"), "{err}");
        let err = BaseUrl::new("https://example.com/#top").unwrap_err();
        assert!(err.to_string().contains("query or fragment"), "{err}");
    }

    #[test]
    fn invalid_with_query() {
        assert!(BaseUrl::new("https://example.com/?x=1").is_err());
    }

    #[test]
    fn serde_round_trip_uses_display_form() {
        let base = BaseUrl::new("https://example.com/").unwrap();
        let json = serde_json::to_string(&base).unwrap();
        assert_eq!(json, "\"https://example.com\"");
        let back: BaseUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(back.endpoint("/api/settings"), base.endpoint("/api/settings"));
    }
}
