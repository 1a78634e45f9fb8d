//! Session context.
//!
//! A [`Session`] is the single owner of the bearer credential. It is injected
//! into the API client, which reads [`Session::bearer`] for every request and
//! calls [`Session::reject`] when the server answers 401.
//!
//! State transitions:
//!
//! ```text
//! Anonymous ──login──▶ Authenticated ──logout──▶ Anonymous
//!                           │
//!                           └──reject (401)──▶ LoginRequired ──login──▶ Authenticated
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{info, warn};

use focus_core::User;

use crate::store::{CredentialStore, StoredCredential};

/// Default lifetime of a freshly issued credential.
const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Observable session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No credential; nothing has been rejected.
    Anonymous,
    /// A credential is held.
    Authenticated,
    /// The server rejected the credential; the consumer should show the login entry point.
    LoginRequired,
}

/// The active bearer credential.
#[derive(Clone)]
pub struct Credential {
    /// Bearer token.
    pub token: SecretString,
    /// Profile of the signed-in user, once known.
    pub user: Option<User>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    fn to_stored(&self) -> StoredCredential {
        StoredCredential {
            token: self.token.expose_secret().to_owned(),
            user: self.user.clone(),
            expires_at: self.expires_at,
        }
    }
}

impl From<StoredCredential> for Credential {
    fn from(s: StoredCredential) -> Self {
        Self {
            token: SecretString::from(s.token),
            user: s.user,
            expires_at: s.expires_at,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

struct Inner {
    credential: RwLock<Option<Credential>>,
    state: watch::Sender<SessionState>,
    store: Option<Arc<dyn CredentialStore>>,
    ttl: Duration,
}

/// Cloneable handle to the process-wide session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("credential", &*self.inner.credential.read())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Anonymous session that is never persisted.
    pub fn new() -> Self {
        Self::build(None, DEFAULT_TTL, None)
    }

    /// Anonymous session persisting logins to `store`.
    pub fn with_store(store: Arc<dyn CredentialStore>, ttl: Duration) -> Self {
        Self::build(Some(store), ttl, None)
    }

    /// Session resumed from a non-expired credential in `store`, or anonymous.
    pub fn restore(store: Arc<dyn CredentialStore>, ttl: Duration) -> Self {
        let restored = store.load().map(Credential::from);
        if restored.is_some() {
            info!("restored persisted session credential");
        }
        Self::build(Some(store), ttl, restored)
    }

    fn build(
        store: Option<Arc<dyn CredentialStore>>,
        ttl: Duration,
        credential: Option<Credential>,
    ) -> Self {
        let initial = if credential.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                credential: RwLock::new(credential),
                state,
                store,
                ttl,
            }),
        }
    }

    /// Install a freshly issued token and persist it.
    pub fn login(&self, token: impl Into<String>, user: Option<User>) {
        let credential = Credential {
            token: SecretString::from(token.into()),
            user,
            expires_at: self.expiry_from(Utc::now()),
        };
        if let Some(store) = &self.inner.store {
            if let Err(e) = store.save(&credential.to_stored()) {
                warn!(error = %e, "failed to persist session credential");
            }
        }
        info!(user = ?credential.user.as_ref().map(|u| &u.email), "session authenticated");
        *self.inner.credential.write() = Some(credential);
        let _ = self.inner.state.send_replace(SessionState::Authenticated);
    }

    /// Expiry for a credential issued at `now`. A TTL past chrono's range
    /// falls back to the default lifetime.
    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ttl = chrono::Duration::from_std(self.inner.ttl).ok();
        if let Some(expires_at) = ttl.and_then(|ttl| now.checked_add_signed(ttl)) {
            return expires_at;
        }
        warn!(ttl_secs = self.inner.ttl.as_secs(), "credential TTL out of range, using default");
        now + chrono::Duration::days(7)
    }

    /// Record the profile returned by `/api/auth/me` for the current token.
    pub fn set_user(&self, user: User) {
        let mut guard = self.inner.credential.write();
        if let Some(cred) = guard.as_mut() {
            cred.user = Some(user);
            if let Some(store) = &self.inner.store {
                if let Err(e) = store.save(&cred.to_stored()) {
                    warn!(error = %e, "failed to persist session credential");
                }
            }
        }
    }

    /// Drop the credential at the user's request.
    pub fn logout(&self) {
        self.clear();
        let _ = self.inner.state.send_replace(SessionState::Anonymous);
        info!("session logged out");
    }

    /// Drop the credential because the server rejected it.
    pub fn reject(&self) {
        self.clear();
        let _ = self.inner.state.send_replace(SessionState::LoginRequired);
        warn!("session credential rejected; login required");
    }

    fn clear(&self) {
        *self.inner.credential.write() = None;
        if let Some(store) = &self.inner.store {
            if let Err(e) = store.clear() {
                warn!(error = %e, "failed to remove persisted session credential");
            }
        }
    }

    /// The bearer token, unless absent or expired.
    pub fn bearer(&self) -> Option<SecretString> {
        self.inner
            .credential
            .read()
            .as_ref()
            .filter(|c| !c.is_expired())
            .map(|c| c.token.clone())
    }

    /// Profile of the signed-in user.
    pub fn user(&self) -> Option<User> {
        self.inner
            .credential
            .read()
            .as_ref()
            .and_then(|c| c.user.clone())
    }

    /// Whether a non-expired credential is held.
    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
