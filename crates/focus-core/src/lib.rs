//! # focus-core
//!
//! Foundation types for the Focus task-manager client:
//!
//! - [`entities`]: Task, Project, Group, User and Invitation records plus the
//!   [`Entity`] trait that ties each record to its create/patch payloads
//! - [`query`]: filter structs and the normalized [`QueryFingerprint`] cache key
//! - [`errors`]: the [`ApiError`] taxonomy shared by gateways and the cache layer
//! - [`dates`]: European display format and HTML input format conversions
//! - [`logging`]: `tracing` subscriber setup and log capture for tests

#![deny(unsafe_code)]

pub mod dates;
pub mod entities;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod query;

pub use entities::{
    CompletionDetails, Entity, Group, GroupDraft, GroupPatch, GroupSettings, ImpactSize,
    Invitation, InvitationList, InvitationStatus, Priority, Project, ProjectDraft,
    ProjectInvite, ProjectPatch, ProjectStatus, ProjectType, Task, TaskDraft, TaskPatch,
    TaskStatus, TaskType, User,
};
pub use errors::{ApiError, FieldError, RequestScope};
pub use ids::EntityId;
pub use query::{GroupFilter, ProjectFilter, QueryFingerprint, TaskFilter};

/// Format a duration in minutes for display (`45min`, `2h`, `1h 30min`).
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes}min");
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins > 0 {
        format!("{hours}h {mins}min")
    } else {
        format!("{hours}h")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_under_an_hour() {
        assert_eq!(format_duration(0), "0min");
        assert_eq!(format_duration(45), "45min");
    }

    #[test]
    fn duration_whole_hours() {
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(180), "3h");
    }

    #[test]
    fn duration_hours_and_minutes() {
        assert_eq!(format_duration(90), "1h 30min");
        assert_eq!(format_duration(125), "2h 5min");
    }
}
