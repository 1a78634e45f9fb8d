//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ClientSettings::default()`]
//! 2. If `~/.focus/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! | variable                  | field                             | range          |
//! |---------------------------|-----------------------------------|----------------|
//! | `FOCUS_API_URL`           | `api.baseUrl`                     |                |
//! | `FOCUS_REQUIRE_HTTPS`     | `api.requireHttps`                | bool           |
//! | `FOCUS_REQUEST_TIMEOUT_MS`| `api.requestTimeoutMs`            | 100..=120000   |
//! | `FOCUS_CREDENTIAL_FILE`   | `session.credentialFile`          |                |
//! | `FOCUS_POLL_INTERVAL_MS`  | `polling.invitationsIntervalMs`   | 1000..=3600000 |
//! | `FOCUS_LOG_LEVEL`         | `logging.level`                   |                |
//!
//! The same ranges apply to values read from the file; `session.tokenTtlDays`
//! must be within 1..=365. Out-of-range file values fall back to the default.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::ClientSettings;

/// `~/.focus`, or `/tmp/.focus` without a home directory.
pub fn focus_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".focus")
}

/// Resolve the path to the settings file (`~/.focus/settings.json`).
pub fn settings_path() -> PathBuf {
    focus_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ClientSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ClientSettings> {
    let mut settings = load_file(path)?;
    apply_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn load_file(path: &Path) -> Result<ClientSettings> {
    let defaults = serde_json::to_value(ClientSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ClientSettings = serde_json::from_value(merged)?;
    enforce_ranges(&mut settings);
    Ok(settings)
}

const REQUEST_TIMEOUT_MS: (u64, u64) = (100, 120_000);
const POLL_INTERVAL_MS: (u64, u64) = (1_000, 3_600_000);
const TOKEN_TTL_DAYS: (u32, u32) = (1, 365);

fn enforce_ranges(settings: &mut ClientSettings) {
    let defaults = ClientSettings::default();
    in_range(
        "api.requestTimeoutMs",
        &mut settings.api.request_timeout_ms,
        REQUEST_TIMEOUT_MS,
        defaults.api.request_timeout_ms,
    );
    in_range(
        "polling.invitationsIntervalMs",
        &mut settings.polling.invitations_interval_ms,
        POLL_INTERVAL_MS,
        defaults.polling.invitations_interval_ms,
    );
    in_range(
        "session.tokenTtlDays",
        &mut settings.session.token_ttl_days,
        TOKEN_TTL_DAYS,
        defaults.session.token_ttl_days,
    );
}

fn in_range<T>(field: &str, value: &mut T, (min, max): (T, T), default: T)
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    if *value < min || *value > max {
        warn!(field, value = %value, min = %min, max = %max, "setting out of range, using default");
        *value = default;
    }
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply overrides read through `lookup` (the process environment in
/// [`load_settings`]).
///
/// Invalid or out-of-range values are logged and ignored.
pub fn apply_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    let vars = Vars(&lookup);

    if let Some(v) = vars.string("FOCUS_API_URL") {
        settings.api.base_url = v;
    }
    if let Some(v) = vars.bool("FOCUS_REQUIRE_HTTPS") {
        settings.api.require_https = v;
    }
    let (min, max) = REQUEST_TIMEOUT_MS;
    if let Some(v) = vars.u64_in("FOCUS_REQUEST_TIMEOUT_MS", min, max) {
        settings.api.request_timeout_ms = v;
    }
    if let Some(v) = vars.string("FOCUS_CREDENTIAL_FILE") {
        settings.session.credential_file = Some(PathBuf::from(v));
    }
    let (min, max) = POLL_INTERVAL_MS;
    if let Some(v) = vars.u64_in("FOCUS_POLL_INTERVAL_MS", min, max) {
        settings.polling.invitations_interval_ms = v;
    }
    if let Some(v) = vars.string("FOCUS_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = self.string(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u64_in(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = self.string(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, min, max, "invalid integer env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
