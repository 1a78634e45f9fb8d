//! Task records.

use serde::{Deserialize, Serialize};

use super::{Entity, merge, merge_opt, now_iso};
use crate::ids::EntityId;

/// Task lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Done.
    Completed,
    /// Set aside for now.
    Paused,
}

impl TaskStatus {
    /// Wire value, as used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Paused => "paused",
        }
    }

    /// Whether the task has reached its terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Task priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low.
    Low,
    /// Medium.
    #[default]
    Medium,
    /// High.
    High,
    /// Urgent.
    Urgent,
}

impl Priority {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// Kind of work a task represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Recurring routine.
    #[default]
    Routine,
    /// Part of a larger project.
    Project,
    /// Upkeep.
    Maintenance,
    /// Needs doing now.
    Emergency,
    /// Deep-focus session.
    Hyperfocus,
}

impl TaskType {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Project => "project",
            Self::Maintenance => "maintenance",
            Self::Emergency => "emergency",
            Self::Hyperfocus => "hyperfocus",
        }
    }
}

/// Rocks / pebbles / sand impact sizing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactSize {
    /// High impact.
    Rock,
    /// Medium impact.
    #[default]
    Pebbles,
    /// Low impact filler.
    Sand,
}

impl ImpactSize {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rock => "rock",
            Self::Pebbles => "pebbles",
            Self::Sand => "sand",
        }
    }
}

/// A task as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Record id.
    pub id: EntityId,
    /// Short title.
    pub title: String,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: Priority,
    /// Kind of work.
    pub task_type: TaskType,
    /// Impact sizing.
    pub impact_size: ImpactSize,
    /// Estimate in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    /// Server creation timestamp (ISO 8601).
    pub created_at: String,
    /// Due date (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Reward promised on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dopamine_reward: Option<String>,
    /// Energy needed to start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level_required: Option<String>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
}

/// Payload for creating a task. Unset enums fall back to server defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Short title.
    pub title: String,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Kind of work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    /// Impact sizing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_size: Option<ImpactSize>,
    /// Estimate in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    /// Due date (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Reward promised on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dopamine_reward: Option<String>,
    /// Energy needed to start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level_required: Option<String>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
}

impl TaskDraft {
    /// Draft with only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial task update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Short title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Kind of work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    /// Impact sizing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_size: Option<ImpactSize>,
    /// Estimate in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    /// Due date (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Reward promised on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dopamine_reward: Option<String>,
    /// Energy needed to start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level_required: Option<String>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
}

impl TaskPatch {
    /// Patch that only changes the status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Optional metadata recorded when a task is completed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionDetails {
    /// Minutes actually spent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<u32>,
    /// Free-text reflection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_notes: Option<String>,
}

impl Entity for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn placeholder(draft: &TaskDraft) -> Self {
        Self {
            id: EntityId::placeholder(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status.unwrap_or_default(),
            priority: draft.priority.unwrap_or_default(),
            task_type: draft.task_type.unwrap_or_default(),
            impact_size: draft.impact_size.unwrap_or_default(),
            estimated_duration: draft.estimated_duration,
            created_at: now_iso(),
            due_date: draft.due_date.clone(),
            dopamine_reward: draft.dopamine_reward.clone(),
            energy_level_required: draft.energy_level_required.clone(),
            project_id: draft.project_id.clone(),
        }
    }

    fn apply_patch(&mut self, patch: &TaskPatch) {
        merge(&mut self.title, patch.title.as_ref());
        merge_opt(&mut self.description, patch.description.as_ref());
        merge(&mut self.status, patch.status.as_ref());
        merge(&mut self.priority, patch.priority.as_ref());
        merge(&mut self.task_type, patch.task_type.as_ref());
        merge(&mut self.impact_size, patch.impact_size.as_ref());
        merge_opt(&mut self.estimated_duration, patch.estimated_duration.as_ref());
        merge_opt(&mut self.due_date, patch.due_date.as_ref());
        merge_opt(&mut self.dopamine_reward, patch.dopamine_reward.as_ref());
        merge_opt(
            &mut self.energy_level_required,
            patch.energy_level_required.as_ref(),
        );
        merge_opt(&mut self.project_id, patch.project_id.as_ref());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Task {
        serde_json::from_value(json!({
            "id": 1,
            "title": "Water plants",
            "status": "todo",
            "priority": "high",
            "task_type": "routine",
            "impact_size": "sand",
            "created_at": "2024-05-01T10:00:00Z",
            "description": null
        }))
        .unwrap()
    }

    #[test]
    fn parses_server_record() {
        let task = sample();
        assert_eq!(task.id.as_str(), "1");
        assert_eq!(task.priority, Priority::High);
        assert!(task.description.is_none());
        assert!(task.project_id.is_none());
    }

    #[test]
    fn rejects_unknown_status() {
        let res = serde_json::from_value::<Task>(json!({
            "id": 1, "title": "x", "status": "done", "priority": "low",
            "task_type": "routine", "impact_size": "rock", "created_at": "t"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn patch_omits_absent_fields() {
        let patch = TaskPatch::status(TaskStatus::Completed);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"status": "completed"})
        );
    }

    #[test]
    fn apply_patch_merges_only_present_fields() {
        let mut task = sample();
        task.apply_patch(&TaskPatch {
            status: Some(TaskStatus::InProgress),
            description: Some("front and back".into()),
            ..TaskPatch::default()
        });
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.description.as_deref(), Some("front and back"));
        assert_eq!(task.title, "Water plants");
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn placeholder_uses_draft_and_defaults() {
        let task = Task::placeholder(&TaskDraft::titled("Buy milk"));
        assert!(task.id.is_placeholder());
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.created_at.is_empty());
    }

    #[test]
    fn completion_details_skip_empty() {
        let details = CompletionDetails {
            actual_duration: Some(25),
            completion_notes: None,
        };
        assert_eq!(
            serde_json::to_value(&details).unwrap(),
            json!({"actual_duration": 25})
        );
    }

    #[test]
    fn status_wire_values() {
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert!(TaskStatus::Completed.is_terminal());
        assert!(!TaskStatus::Paused.is_terminal());
    }
}
