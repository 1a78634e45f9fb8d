//! Collection filters and their normalized cache key.
//!
//! A [`QueryFingerprint`] is the single source of truth for both the cache key
//! and the outgoing query string. Blank values are dropped when the
//! fingerprint is built, so `status=""` and "no status" are the same query and
//! produce byte-identical requests.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::{ImpactSize, Priority, ProjectStatus, ProjectType, TaskStatus, TaskType};

/// Normalized filter parameters used as a cache key.
///
/// Keys are kept sorted, so insertion order never affects equality. Values of
/// a multi-valued key keep the order they were added in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryFingerprint(BTreeMap<String, Vec<String>>);

impl QueryFingerprint {
    /// The empty fingerprint (an unfiltered collection).
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a value for `key`. Blank values are dropped.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.push(key, value.as_ref());
        self
    }

    /// Add an optional value for `key`. `None` and blank values are dropped.
    #[must_use]
    pub fn with_opt(mut self, key: &str, value: Option<impl AsRef<str>>) -> Self {
        if let Some(v) = value {
            self.push(key, v.as_ref());
        }
        self
    }

    fn push(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.0
            .entry(key.to_owned())
            .or_default()
            .push(value.to_owned());
    }

    /// Whether no filter is applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values recorded for `key`.
    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.0.get(key).map_or(&[], Vec::as_slice)
    }

    /// Query string pairs in transmission order (repeated keys for multi-values).
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.0
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
            .collect()
    }
}

impl fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("*");
        }
        let mut first = true;
        for (k, v) in self.query_pairs() {
            if !first {
                f.write_str("&")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

/// Task list filters. Values are raw strings as entered in filter controls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Status filter.
    pub status: Option<String>,
    /// Priority filter.
    pub priority: Option<String>,
    /// Task type filter.
    pub task_type: Option<String>,
    /// Impact size filter.
    pub impact_size: Option<String>,
}

impl TaskFilter {
    /// Only tasks with the given status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status.as_str().to_owned()),
            ..Self::default()
        }
    }

    /// Narrow by priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority.as_str().to_owned());
        self
    }

    /// Narrow by task type.
    #[must_use]
    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type.as_str().to_owned());
        self
    }

    /// Narrow by impact size.
    #[must_use]
    pub fn with_impact_size(mut self, impact: ImpactSize) -> Self {
        self.impact_size = Some(impact.as_str().to_owned());
        self
    }
}

impl From<&TaskFilter> for QueryFingerprint {
    fn from(f: &TaskFilter) -> Self {
        Self::all()
            .with_opt("status", f.status.as_deref())
            .with_opt("priority", f.priority.as_deref())
            .with_opt("task_type", f.task_type.as_deref())
            .with_opt("impact_size", f.impact_size.as_deref())
    }
}

impl From<TaskFilter> for QueryFingerprint {
    fn from(f: TaskFilter) -> Self {
        Self::from(&f)
    }
}

/// Project list filters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    /// Any of these project types.
    pub project_type: Vec<String>,
    /// Status filter.
    pub status: Option<String>,
}

impl ProjectFilter {
    /// Projects of any of the given types.
    #[must_use]
    pub fn types(types: &[ProjectType]) -> Self {
        Self {
            project_type: types.iter().map(|t| t.as_str().to_owned()).collect(),
            status: None,
        }
    }

    /// Narrow by status.
    #[must_use]
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status.as_str().to_owned());
        self
    }
}

impl From<&ProjectFilter> for QueryFingerprint {
    fn from(f: &ProjectFilter) -> Self {
        let fp = f
            .project_type
            .iter()
            .fold(Self::all(), |fp, t| fp.with("project_type", t));
        fp.with_opt("status", f.status.as_deref())
    }
}

impl From<ProjectFilter> for QueryFingerprint {
    fn from(f: ProjectFilter) -> Self {
        Self::from(&f)
    }
}

/// Groups are always listed unfiltered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupFilter;

impl From<GroupFilter> for QueryFingerprint {
    fn from(_: GroupFilter) -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
