//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a settings
//! file may contain any subset of fields; missing fields keep their default.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::base_url::{SecureBaseUrl, validate_base_url};
use crate::errors::Result;

/// Root settings for the client.
///
/// ```json
/// {
///   "api": { "baseUrl": "https://api.example.com", "requestTimeoutMs": 8000 },
///   "polling": { "invitationsIntervalMs": 60000 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Remote API settings.
    pub api: ApiSettings,
    /// Session and credential persistence.
    pub session: SessionSettings,
    /// Background polling.
    pub polling: PollingSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

/// What to do with a plain-HTTP base URL pointing at a remote host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradePolicy {
    /// Rewrite the scheme to `https` once, with a warning.
    #[default]
    Upgrade,
    /// Refuse to start.
    Reject,
}

/// Remote API settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSettings {
    /// Origin of the REST API.
    pub base_url: String,
    /// Whether the hosting context is itself secure, so the API must be too.
    pub require_https: bool,
    /// Handling of an insecure remote base URL when `require_https` is set.
    pub upgrade_policy: UpgradePolicy,
    /// Bounded per-request timeout.
    pub request_timeout_ms: u64,
    /// `User-Agent` header.
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            require_https: true,
            upgrade_policy: UpgradePolicy::Upgrade,
            request_timeout_ms: 10_000,
            user_agent: concat!("focus-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiSettings {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate [`Self::base_url`] against the transport policy.
    pub fn secure_base_url(&self) -> Result<SecureBaseUrl> {
        validate_base_url(&self.base_url, self.require_https, self.upgrade_policy)
    }
}

/// Session and credential persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// File holding the persisted bearer token. `None` keeps it in memory only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_file: Option<PathBuf>,
    /// Lifetime of a persisted token, in days.
    pub token_ttl_days: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            credential_file: Some(crate::loader::focus_dir().join("credentials.json")),
            token_ttl_days: 7,
        }
    }
}

impl SessionSettings {
    /// Token lifetime as a [`Duration`].
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.token_ttl_days) * 24 * 60 * 60)
    }
}

/// Background polling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollingSettings {
    /// Pending-invitations refresh interval.
    pub invitations_interval_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            invitations_interval_ms: 30_000,
        }
    }
}

impl PollingSettings {
    /// Invitations interval as a [`Duration`].
    #[must_use]
    pub fn invitations_interval(&self) -> Duration {
        Duration::from_millis(self.invitations_interval_ms)
    }
}

/// Logging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive (overridden by `RUST_LOG`).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let s = ClientSettings::default();
        assert_eq!(s.api.request_timeout(), Duration::from_secs(10));
        assert!(s.api.require_https);
        assert_eq!(s.session.token_ttl_days, 7);
        assert_eq!(s.polling.invitations_interval(), Duration::from_secs(30));
        assert_eq!(s.logging.level, "warn");
        assert!(s.api.user_agent.starts_with("focus-client/"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s: ClientSettings = serde_json::from_value(json!({
            "api": {"baseUrl": "https://api.example.com"}
        }))
        .unwrap();
        assert_eq!(s.api.base_url, "https://api.example.com");
        assert_eq!(s.api.request_timeout_ms, 10_000);
        assert_eq!(s.polling.invitations_interval_ms, 30_000);
    }

    #[test]
    fn camel_case_wire_names() {
        let v = serde_json::to_value(ClientSettings::default()).unwrap();
        assert!(v["api"].get("requestTimeoutMs").is_some());
        assert_eq!(v["api"]["upgradePolicy"], "upgrade");
        assert!(v["session"].get("tokenTtlDays").is_some());
    }

    #[test]
    fn token_ttl_in_days() {
        let s = SessionSettings {
            credential_file: None,
            token_ttl_days: 2,
        };
        assert_eq!(s.token_ttl(), Duration::from_secs(2 * 86_400));
    }

    #[test]
    fn default_base_url_is_loopback_and_valid() {
        let url = ApiSettings::default().secure_base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000");
    }
}
