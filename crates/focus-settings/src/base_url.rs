//! API origin validation.
//!
//! The base URL is checked once at startup:
//!
//! | input                              | result                              |
//! |------------------------------------|-------------------------------------|
//! | `api.example.com`                  | `https://api.example.com`           |
//! | `https://api.example.com/`         | accepted, trailing slash trimmed    |
//! | `http://localhost:8000`            | accepted (loopback development)     |
//! | `http://api.example.com`           | upgraded to https, or rejected      |
//! | `ftp://...`, unparseable           | rejected                            |
//!
//! Plain HTTP to a remote host is only tolerated when the hosting context is
//! itself insecure (`require_https = false`), and even then it is logged.

use std::fmt;
use std::net::IpAddr;

use tracing::{debug, warn};
use url::{Host, Url};

use crate::errors::{Result, SettingsError};
use crate::types::UpgradePolicy;

/// An API origin that passed [`validate_base_url`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecureBaseUrl(Url);

impl SecureBaseUrl {
    /// Origin without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }

    /// The parsed URL.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Append an absolute API path (`/api/tasks`).
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.as_str(), path.trim_start_matches('/'))
    }

    /// Whether requests go over TLS.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.0.scheme() == "https"
    }
}

impl fmt::Display for SecureBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate and normalize the configured API origin.
pub fn validate_base_url(
    raw: &str,
    require_https: bool,
    policy: UpgradePolicy,
) -> Result<SecureBaseUrl> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SettingsError::InvalidValue("API base URL is empty".into()));
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let mut url = Url::parse(&with_scheme)
        .map_err(|e| SettingsError::InvalidValue(format!("API base URL {raw}: {e}")))?;

    match url.scheme() {
        "https" => {}
        "http" if is_loopback(&url) => {
            debug!(url = %url, "using plain HTTP to a loopback API origin");
        }
        "http" if !require_https => {
            warn!(url = %url, "API origin is plain HTTP; requests are not encrypted");
        }
        "http" => match policy {
            UpgradePolicy::Upgrade => {
                let original = url.to_string();
                url.set_scheme("https").map_err(|()| {
                    SettingsError::InvalidValue(format!("cannot upgrade {original} to https"))
                })?;
                warn!(original = %original, upgraded = %url, "upgraded insecure API origin to https");
            }
            UpgradePolicy::Reject => {
                return Err(SettingsError::InsecureBaseUrl(url.to_string()));
            }
        },
        other => {
            return Err(SettingsError::InvalidValue(format!(
                "unsupported API scheme {other}"
            )));
        }
    }

    if url.host().is_none() {
        return Err(SettingsError::InvalidValue(format!(
            "API base URL {raw} has no host"
        )));
    }

    Ok(SecureBaseUrl(url))
}

/// Whether the URL's host is a loopback address (`localhost`, `127.0.0.0/8`, `::1`).
#[must_use]
pub fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(d)) => d.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

/// Request-time check: TLS, or plain HTTP to a loopback host.
#[must_use]
pub fn is_secure_or_loopback(url: &Url) -> bool {
    match url.scheme() {
        "https" => true,
        "http" => is_loopback(url),
        _ => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use focus_core::logging::capture_logs;
    use tracing::Level;

    fn validate(raw: &str) -> Result<SecureBaseUrl> {
        validate_base_url(raw, true, UpgradePolicy::Upgrade)
    }

    #[test]
    fn https_is_accepted_and_trimmed() {
        let url = validate("https://api.example.com/").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com");
        assert!(url.is_https());
    }

    #[test]
    fn missing_scheme_defaults_to_https() {
        let url = validate("api.example.com").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com");
    }

    #[test]
    fn loopback_http_is_exempt() {
        for raw in ["http://localhost:8000", "http://127.0.0.1:9000", "http://[::1]:8000"] {
            let url = validate(raw).unwrap();
            assert!(!url.is_https(), "{raw} should stay http");
        }
    }

    #[test]
    fn remote_http_is_upgraded_with_warning() {
        let (logs, _guard) = capture_logs();
        let url = validate("http://api.example.com").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com");
        assert!(logs.has_event(Level::WARN, "upgraded insecure API origin"));
    }

    #[test]
    fn remote_http_is_rejected_under_reject_policy() {
        let err = validate_base_url("http://api.example.com", true, UpgradePolicy::Reject)
            .unwrap_err();
        assert_matches!(err, SettingsError::InsecureBaseUrl(ref u) if u.starts_with("http://api"));
    }

    #[test]
    fn remote_http_allowed_when_context_insecure() {
        let url = validate_base_url("http://api.example.com", false, UpgradePolicy::Reject).unwrap();
        assert!(!url.is_https());
    }

    #[test]
    fn other_schemes_and_garbage_rejected() {
        assert_matches!(validate("ftp://files.example.com"), Err(SettingsError::InvalidValue(_)));
        assert_matches!(validate(""), Err(SettingsError::InvalidValue(_)));
        assert_matches!(validate("https://"), Err(SettingsError::InvalidValue(_)));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let url = validate("https://api.example.com/").unwrap();
        assert_eq!(url.endpoint("/api/tasks"), "https://api.example.com/api/tasks");
        assert_eq!(url.endpoint("api/groups"), "https://api.example.com/api/groups");
    }

    #[test]
    fn request_time_check() {
        let ok = Url::parse("https://api.example.com/api/tasks").unwrap();
        let local = Url::parse("http://localhost:8000/api/tasks").unwrap();
        let bad = Url::parse("http://api.example.com/api/tasks").unwrap();
        assert!(is_secure_or_loopback(&ok));
        assert!(is_secure_or_loopback(&local));
        assert!(!is_secure_or_loopback(&bad));
    }
}
