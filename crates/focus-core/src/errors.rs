//! Error taxonomy for remote calls.
//!
//! Every gateway call returns [`ApiError`] on failure. The cache layer never
//! inspects transport details; it rolls back on any error and hands the value
//! back to the caller unchanged. The variants map onto what a caller does next:
//!
//! | variant             | caller reaction                                  |
//! |---------------------|--------------------------------------------------|
//! | `Validation`        | show field-level feedback                        |
//! | `NotFound`          | treat the record as already gone                 |
//! | `Transport`         | offer a retry                                    |
//! | `Http`              | generic failure with status and body             |
//! | `Authentication`    | session is torn down; go to the login screen     |
//! | `InsecureTransport` | configuration error; nothing was sent            |
//! | `Decode`            | server sent a body this client cannot interpret  |

use serde::Deserialize;
use thiserror::Error;

/// Whether a request addresses a collection or a single record.
///
/// A 404 only means "that record is gone" on record-scoped calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestScope {
    /// `/api/tasks`, `/api/projects`, ...
    Collection,
    /// `/api/tasks/{id}`, `/api/tasks/{id}/complete`, ...
    Record,
}

/// A single field-level validation message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Field name (last segment of the server's location path).
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// Failure of a remote call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network unreachable, connection reset, or client-side timeout.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying error description.
        message: String,
        /// Whether the bounded request timeout elapsed.
        timed_out: bool,
    },

    /// Non-2xx response not otherwise classified.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// 4xx rejecting the request input.
    #[error("validation failed ({status}): {message}")]
    Validation {
        /// Response status.
        status: u16,
        /// Summary message.
        message: String,
        /// Per-field messages, when the server supplied them.
        fields: Vec<FieldError>,
    },

    /// 404 on a record-scoped call.
    #[error("not found: {resource}")]
    NotFound {
        /// Path of the missing record.
        resource: String,
    },

    /// 401; the session has been torn down.
    #[error("authentication required")]
    Authentication,

    /// Refused to send over plain HTTP to a non-loopback origin.
    #[error("refusing insecure request to {url}")]
    InsecureTransport {
        /// The offending URL.
        url: String,
    },

    /// Response body did not match the endpoint's declared shape.
    #[error("unexpected response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path.
        endpoint: String,
        /// Parser message.
        message: String,
    },
}

impl ApiError {
    /// Classify a non-2xx response.
    #[must_use]
    pub fn from_status(status: u16, body: String, scope: RequestScope, resource: &str) -> Self {
        match status {
            401 => Self::Authentication,
            404 if scope == RequestScope::Record => Self::NotFound {
                resource: resource.to_owned(),
            },
            400..=499 => {
                let (message, fields) = parse_detail(&body);
                Self::Validation {
                    status,
                    message,
                    fields,
                }
            }
            _ => Self::Http { status, body },
        }
    }

    /// Build a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>, timed_out: bool) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out,
        }
    }

    /// Whether retrying the same call might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether the record addressed by the call no longer exists.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Short machine-readable code for logging.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "TRANSPORT",
            Self::Http { .. } => "HTTP",
            Self::Validation { .. } => "VALIDATION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Authentication => "AUTHENTICATION",
            Self::InsecureTransport { .. } => "INSECURE_TRANSPORT",
            Self::Decode { .. } => "DECODE",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error body parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Fields(Vec<FieldDetail>),
}

#[derive(Deserialize)]
struct FieldDetail {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

/// Extract a summary and per-field messages from an error body.
///
/// Falls back to the raw body (or a generic message when empty) for bodies
/// without a recognizable `detail`.
fn parse_detail(body: &str) -> (String, Vec<FieldError>) {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Detail::Message(msg),
        }) => (msg, Vec::new()),
        Ok(ErrorBody {
            detail: Detail::Fields(items),
        }) => {
            let fields: Vec<FieldError> = items
                .into_iter()
                .map(|d| FieldError {
                    field: d.loc.last().map(loc_segment).unwrap_or_default(),
                    message: d.msg,
                })
                .collect();
            let summary = fields
                .iter()
                .map(|f| format!("{}: {}", f.field, f.message))
                .collect::<Vec<_>>()
                .join("; ");
            (summary, fields)
        }
        Err(_) if body.trim().is_empty() => ("request rejected".to_owned(), Vec::new()),
        Err(_) => (body.to_owned(), Vec::new()),
    }
}

fn loc_segment(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
