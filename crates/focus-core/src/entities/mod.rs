//! Server-owned records and their mutation payloads.
//!
//! Field names follow the API's `snake_case` JSON. Every mutable collection
//! (tasks, projects, groups) implements [`Entity`], which is what the cache
//! layer and the gateways are generic over.

mod group;
mod invitation;
mod project;
mod task;
mod user;

pub use group::{Group, GroupDraft, GroupPatch, GroupSettings};
pub use invitation::{Invitation, InvitationList, InvitationStatus, ProjectInvite};
pub use project::{Project, ProjectDraft, ProjectPatch, ProjectStatus, ProjectType};
pub use task::{
    CompletionDetails, ImpactSize, Priority, Task, TaskDraft, TaskPatch, TaskStatus, TaskType,
};
pub use user::User;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ids::EntityId;

/// A uniquely identified, server-owned record held in a client-side cache.
pub trait Entity:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Create payload. Server-assigned fields (id, timestamps, counters) are absent.
    type Draft: Serialize + fmt::Debug + Send + Sync;
    /// Partial update payload. Absent fields are omitted from the request body.
    type Patch: Serialize + fmt::Debug + Send + Sync;

    /// Collection segment under `/api/` (e.g. `"tasks"`).
    const COLLECTION: &'static str;

    /// The record's identifier.
    fn id(&self) -> &EntityId;

    /// Build the optimistic record shown while a create is in flight.
    ///
    /// The placeholder gets a fresh [`EntityId::placeholder`] id; the real
    /// record replaces it on the next refetch.
    fn placeholder(draft: &Self::Draft) -> Self;

    /// Merge the fields present in `patch` into this record.
    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// Timestamp used for optimistic placeholders, in the API's ISO 8601 form.
pub(crate) fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Assign `src` into `dst` when present.
pub(crate) fn merge<T: Clone>(dst: &mut T, src: Option<&T>) {
    if let Some(v) = src {
        dst.clone_from(v);
    }
}

/// Assign `src` into an optional `dst` when present.
pub(crate) fn merge_opt<T: Clone>(dst: &mut Option<T>, src: Option<&T>) {
    if let Some(v) = src {
        *dst = Some(v.clone());
    }
}
