//! OAuth redirect parsing.
//!
//! The API's Google sign-in redirects back with one of three query shapes:
//!
//! - `?error=access_denied`: the user or provider refused
//! - `?token=...&user_id=...`: the API already minted a bearer token
//! - `?code=...&state=...`: an authorization code still to be exchanged
//!
//! They are checked in that order; a token without a `user_id` is ignored.

use url::form_urlencoded;

use crate::errors::AuthError;

/// Parsed OAuth redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackParams {
    /// The provider reported an error.
    Denied {
        /// Provider error code.
        error: String,
    },
    /// A bearer token issued directly by the API.
    Token {
        /// Bearer token.
        token: String,
        /// Id of the signed-in user.
        user_id: String,
    },
    /// An authorization code to exchange.
    Code {
        /// Authorization code.
        code: String,
        /// Anti-forgery state; empty when absent.
        state: String,
    },
}

impl CallbackParams {
    /// Parse a redirect query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Result<Self, AuthError> {
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut error = None;
        let mut token = None;
        let mut user_id = None;
        let mut code = None;
        let mut state = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "error" => &mut error,
                "token" => &mut token,
                "user_id" => &mut user_id,
                "code" => &mut code,
                "state" => &mut state,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }

        if let Some(error) = error {
            return Ok(Self::Denied { error });
        }
        if let (Some(token), Some(user_id)) = (token, user_id) {
            return Ok(Self::Token { token, user_id });
        }
        match code {
            Some(code) => Ok(Self::Code {
                code,
                state: state.unwrap_or_default(),
            }),
            None => Err(AuthError::MissingCode),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
