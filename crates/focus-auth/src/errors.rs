//! Auth error types.

use focus_core::ApiError;

/// Errors that can occur during sign-in or credential persistence.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The identity provider redirected back with an error.
    #[error("OAuth error: {0}")]
    Denied(String),

    /// The redirect carried neither an error, a token, nor a code.
    #[error("no authorization code received")]
    MissingCode,

    /// The API rejected the sign-in exchange or the token check.
    #[error("authentication failed: {0}")]
    Api(#[from] ApiError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_display() {
        let err = AuthError::Denied("access_denied".into());
        assert_eq!(err.to_string(), "OAuth error: access_denied");
    }

    #[test]
    fn api_error_wraps() {
        let err: AuthError = ApiError::Authentication.into();
        assert_eq!(err.to_string(), "authentication failed: authentication required");
    }
}
