//! Support group records.

use serde::{Deserialize, Serialize};

use super::{Entity, merge, merge_opt, now_iso};
use crate::ids::EntityId;

/// Feature toggles for a group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct GroupSettings {
    /// Shared focus sessions.
    pub group_focus_sessions: bool,
    /// Members see each other's energy levels.
    pub shared_energy_tracking: bool,
    /// Celebrate completions together.
    pub group_dopamine_celebrations: bool,
    /// Break large tasks down together.
    pub collaborative_task_chunking: bool,
    /// Remind members to take breaks.
    pub group_break_reminders: bool,
    /// Accountability check-ins.
    pub accountability_features: bool,
}

/// A group as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Record id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Member count (server computed).
    #[serde(default)]
    pub member_count: u32,
    /// Whether the group is active.
    pub is_active: bool,
    /// Server creation timestamp.
    pub created_at: String,
    /// Feature toggles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adhd_settings: Option<GroupSettings>,
}

/// Payload for creating a group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDraft {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Feature toggles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adhd_settings: Option<GroupSettings>,
}

/// Partial group update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupPatch {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the group is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Feature toggles (replaced as a whole).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adhd_settings: Option<GroupSettings>,
}

impl Entity for Group {
    type Draft = GroupDraft;
    type Patch = GroupPatch;

    const COLLECTION: &'static str = "groups";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn placeholder(draft: &GroupDraft) -> Self {
        Self {
            id: EntityId::placeholder(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            member_count: 1,
            is_active: true,
            created_at: now_iso(),
            adhd_settings: draft.adhd_settings,
        }
    }

    fn apply_patch(&mut self, patch: &GroupPatch) {
        merge(&mut self.name, patch.name.as_ref());
        merge_opt(&mut self.description, patch.description.as_ref());
        merge(&mut self.is_active, patch.is_active.as_ref());
        merge_opt(&mut self.adhd_settings, patch.adhd_settings.as_ref());
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
    fn partial_settings_default_to_off() {
        let g: Group = serde_json::from_value(json!({
            "id": "g1",
            "name": "Body doubling",
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "adhd_settings": {"group_focus_sessions": true}
        }))
        .unwrap();
        let settings = g.adhd_settings.unwrap();
        assert!(settings.group_focus_sessions);
        assert!(!settings.accountability_features);
    }

    #[test]
    fn placeholder_counts_creator_as_member() {
        let g = Group::placeholder(&GroupDraft {
            name: "Morning crew".into(),
            ..GroupDraft::default()
        });
        assert_eq!(g.member_count, 1);
        assert!(g.is_active);
        assert!(g.id.is_placeholder());
    }

    #[test]
    fn deactivate_patch() {
        let mut g = Group::placeholder(&GroupDraft::default());
        g.apply_patch(&GroupPatch {
            is_active: Some(false),
            ..GroupPatch::default()
        });
        assert!(!g.is_active);
    }
}
