//! # focus-auth
//!
//! The session context every gateway call reads its bearer credential from.
//!
//! - [`Session`]: cloneable handle with `login`/`logout`/`reject` lifecycle and
//!   a [`SessionState`] watch channel consumers use to route to the login page
//! - [`CredentialStore`]: persistence of the bearer token across restarts,
//!   with a file-backed and an in-memory implementation
//! - [`CallbackParams`]: the tagged result of an OAuth redirect

#![deny(unsafe_code)]

pub mod callback;
pub mod errors;
pub mod session;
pub mod store;

pub use callback::CallbackParams;
pub use errors::AuthError;
pub use session::{Credential, Session, SessionState};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredential};
