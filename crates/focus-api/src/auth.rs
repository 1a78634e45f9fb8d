//! Google sign-in and profile endpoints.

use reqwest::Method;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use focus_auth::{AuthError, CallbackParams, Session};
use focus_core::{ApiError, RequestScope, User};

use crate::client::{ApiClient, Bearer, Call};

/// Response of `/api/auth/google/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUrl {
    /// Provider authorization URL to open in a browser.
    pub auth_url: String,
}

/// Response of the code exchange.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Signed-in user.
    pub user: User,
}

/// Sign-in flow bound to one client and its session.
#[derive(Clone, Debug)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Auth endpoints on `client`.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn session(&self) -> &Session {
        self.client.session()
    }

    /// Ask the API where to send the user to sign in.
    pub async fn start_google_login(&self) -> Result<LoginUrl, ApiError> {
        self.client
            .fetch(Call::new(
                Method::GET,
                "/api/auth/google/login",
                RequestScope::Collection,
            ))
            .await
    }

    /// Profile of the signed-in user.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.client
            .fetch(Call::new(Method::GET, "/api/auth/me", RequestScope::Collection))
            .await
    }

    /// Finish sign-in from the redirect parameters and log the session in.
    pub async fn complete_callback(&self, params: CallbackParams) -> Result<User, AuthError> {
        match params {
            CallbackParams::Denied { error } => {
                warn!(error = %error, "sign-in denied by provider");
                Err(AuthError::Denied(error))
            }
            CallbackParams::Token { token, user_id } => {
                debug!(user_id = %user_id, "validating token from redirect");
                let candidate = SecretString::from(token.clone());
                let user: User = self
                    .client
                    .fetch(
                        Call::new(Method::GET, "/api/auth/me", RequestScope::Collection)
                            .bearer(Bearer::Explicit(&candidate)),
                    )
                    .await?;
                self.session().login(token, Some(user.clone()));
                Ok(user)
            }
            CallbackParams::Code { code, state } => {
                let response: TokenResponse = self
                    .client
                    .fetch(
                        Call::new(
                            Method::GET,
                            "/api/auth/google/callback",
                            RequestScope::Collection,
                        )
                        .query(vec![("code", code.as_str()), ("state", state.as_str())]),
                    )
                    .await?;
                self.session()
                    .login(response.access_token, Some(response.user.clone()));
                Ok(response.user)
            }
        }
    }

    /// Check a restored credential against the API.
    ///
    /// Returns the profile when the token is still accepted. A rejected token
    /// is cleared by the client's 401 handling and yields `Ok(None)`; other
    /// failures leave the credential in place.
    pub async fn restore_session(&self) -> Result<Option<User>, ApiError> {
        if !self.session().is_authenticated() {
            return Ok(None);
        }
        match self.me().await {
            Ok(user) => {
                info!(user = %user.email, "restored session verified");
                self.session().set_user(user.clone());
                Ok(Some(user))
            }
            Err(ApiError::Authentication) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Tell the API, then clear the session regardless of the outcome.
    pub async fn logout(&self) {
        if self.session().is_authenticated() {
            if let Err(e) = self
                .client
                .execute(Call::new(
                    Method::POST,
                    "/api/auth/logout",
                    RequestScope::Collection,
                ))
                .await
            {
                debug!(error = %e, "server-side logout failed, clearing locally");
            }
        }
        self.session().logout();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
