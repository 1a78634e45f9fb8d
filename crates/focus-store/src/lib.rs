//! # focus-store
//!
//! Client-side state for the mutable collections.
//!
//! - [`EntityCache`]: one snapshot per [`QueryFingerprint`], with the
//!   optimistic apply / rollback / invalidate primitives
//! - [`EntityStore`]: runs each mutation as snapshot → optimistic write →
//!   gateway call → commit or rollback → invalidate
//! - [`InvitationPoller`]: background refresh of pending invitations
//!
//! Cache primitives are synchronous and each is a single critical section.
//! No lock is held across a gateway call.
//!
//! [`QueryFingerprint`]: focus_core::QueryFingerprint

#![deny(unsafe_code)]

pub mod cache;
pub mod invitations;
pub mod store;

pub use cache::{CacheStatus, EntityCache, LoadTicket, PendingMutation};
pub use invitations::InvitationPoller;
pub use store::EntityStore;
