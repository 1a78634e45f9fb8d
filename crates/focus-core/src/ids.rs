//! Opaque record identifiers.
//!
//! The API emits integer ids for some resources and string tokens for others.
//! [`EntityId`] accepts either on the wire and always serializes as a string,
//! so downstream code compares ids without caring which form the server used.
//!
//! Optimistic placeholders carry a `pending-` prefixed UUID v7 that can never
//! collide with a server-assigned id.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

const PLACEHOLDER_PREFIX: &str = "pending-";

/// Identifier of a server-owned record (task, project, group, user).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create from an existing string value.
    #[must_use]
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Generate a client-side placeholder id for an optimistic create.
    #[must_use]
    pub fn placeholder() -> Self {
        Self(format!("{PLACEHOLDER_PREFIX}{}", Uuid::now_v7()))
    }

    /// Whether this id was generated locally and has not been confirmed.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Int(i64),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(s) => Self(s),
            Wire::Int(n) => Self(n.to_string()),
        })
    }
}

impl std::ops::Deref for EntityId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_string_id() {
        let id: EntityId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn deserializes_integer_id() {
        let id: EntityId = serde_json::from_str("42").unwrap();
        assert_eq!(id, EntityId::from("42"));
    }

    #[test]
    fn always_serializes_as_string() {
        let id = EntityId::from(7_i64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn placeholder_ids_are_unique_and_flagged() {
        let a = EntityId::placeholder();
        let b = EntityId::placeholder();
        assert_ne!(a, b);
        assert!(a.is_placeholder());
        assert!(!EntityId::from("42").is_placeholder());
    }

    #[test]
    fn placeholder_suffix_is_uuid_v7() {
        let id = EntityId::placeholder();
        let raw = id.as_str().trim_start_matches("pending-");
        let parsed = Uuid::parse_str(raw).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn deref_and_display() {
        let id = EntityId::from("hello");
        let s: &str = &id;
        assert_eq!(s, "hello");
        assert_eq!(format!("{id}"), "hello");
    }

    #[test]
    fn rejects_non_scalar_id() {
        assert!(serde_json::from_str::<EntityId>("{\"id\":1}").is_err());
    }
}
