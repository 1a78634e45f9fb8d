//! # focus-settings
//!
//! Client configuration, loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ClientSettings::default()`]
//! 2. **User file**: `~/.focus/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `FOCUS_*` overrides (highest priority)
//!
//! The API base URL is validated exactly once, when the client is built, by
//! [`validate_base_url`]. Nothing downstream rewrites URLs.

#![deny(unsafe_code)]

pub mod base_url;
pub mod errors;
pub mod loader;
pub mod types;

pub use base_url::{SecureBaseUrl, is_loopback, is_secure_or_loopback, validate_base_url};
pub use errors::{Result, SettingsError};
pub use loader::{apply_overrides, deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{
    ApiSettings, ClientSettings, LoggingSettings, PollingSettings, SessionSettings, UpgradePolicy,
};
