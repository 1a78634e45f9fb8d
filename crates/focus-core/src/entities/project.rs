//! Project records.

use serde::{Deserialize, Serialize};

use super::{Entity, merge, merge_opt, now_iso};
use crate::ids::EntityId;

/// Visibility of a project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// Owner only.
    #[default]
    Personal,
    /// Owner plus invited collaborators.
    Shared,
    /// Anyone.
    Public,
}

impl ProjectType {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Shared => "shared",
            Self::Public => "public",
        }
    }
}

/// Project lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Not started.
    #[default]
    Planning,
    /// In progress.
    Active,
    /// Paused.
    OnHold,
    /// Done.
    Completed,
    /// Hidden from default views.
    Archived,
}

impl ProjectStatus {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

/// A project as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Record id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visibility.
    pub project_type: ProjectType,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Owning user.
    pub owner_id: EntityId,
    /// Number of collaborators (server computed).
    #[serde(default)]
    pub collaborator_count: u32,
    /// Number of tasks (server computed).
    #[serde(default)]
    pub task_count: u32,
    /// Percent of tasks completed (server computed).
    #[serde(default)]
    pub completion_percentage: f64,
    /// Server creation timestamp.
    pub created_at: String,
    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Payload for creating a project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
    /// Initial status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Group the project is shared with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<EntityId>,
}

/// Partial project update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl Entity for Project {
    type Draft = ProjectDraft;
    type Patch = ProjectPatch;

    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &EntityId {
        &self.id
    }

    // Owner is filled in by the server; the placeholder shows it as unknown.
    fn placeholder(draft: &ProjectDraft) -> Self {
        Self {
            id: EntityId::placeholder(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            project_type: draft.project_type.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            owner_id: EntityId::from(""),
            collaborator_count: 0,
            task_count: 0,
            completion_percentage: 0.0,
            created_at: now_iso(),
            due_date: draft.due_date.clone(),
        }
    }

    fn apply_patch(&mut self, patch: &ProjectPatch) {
        merge(&mut self.name, patch.name.as_ref());
        merge_opt(&mut self.description, patch.description.as_ref());
        merge(&mut self.project_type, patch.project_type.as_ref());
        merge(&mut self.status, patch.status.as_ref());
        merge_opt(&mut self.due_date, patch.due_date.as_ref());
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
    fn parses_with_missing_counters() {
        let p: Project = serde_json::from_value(json!({
            "id": 3,
            "name": "Garden",
            "project_type": "shared",
            "status": "on_hold",
            "owner_id": 9,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(p.status, ProjectStatus::OnHold);
        assert_eq!(p.owner_id.as_str(), "9");
        assert_eq!(p.task_count, 0);
    }

    #[test]
    fn apply_patch_keeps_server_counters() {
        let mut p = Project::placeholder(&ProjectDraft {
            name: "Garden".into(),
            ..ProjectDraft::default()
        });
        p.task_count = 4;
        p.apply_patch(&ProjectPatch {
            status: Some(ProjectStatus::Active),
            ..ProjectPatch::default()
        });
        assert_eq!(p.status, ProjectStatus::Active);
        assert_eq!(p.task_count, 4);
        assert_eq!(p.name, "Garden");
    }

    #[test]
    fn draft_serializes_only_set_fields() {
        let draft = ProjectDraft {
            name: "Move house".into(),
            project_type: Some(ProjectType::Personal),
            ..ProjectDraft::default()
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"name": "Move house", "project_type": "personal"})
        );
    }
}
