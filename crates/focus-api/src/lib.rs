//! # focus-api
//!
//! The remote entity gateways. One [`ApiClient`] owns the HTTP connection
//! pool, the validated base URL and the session handle; every gateway is a
//! thin typed view over it.
//!
//! | gateway                 | endpoints                                        |
//! |-------------------------|--------------------------------------------------|
//! | [`RestGateway<Task>`]   | `/api/tasks`, `/api/tasks/{id}`, `.../complete`  |
//! | [`RestGateway<Project>`]| `/api/projects`, `/api/projects/{id}`            |
//! | [`RestGateway<Group>`]  | `/api/groups`, `/api/groups/{id}`                |
//! | [`InvitationGateway`]   | `/api/invitations/...`, `/api/projects/{id}/invite` |
//! | [`AuthApi`]             | `/api/auth/...`                                  |
//!
//! [`RestGateway<Task>`]: RestGateway
//! [`RestGateway<Project>`]: RestGateway
//! [`RestGateway<Group>`]: RestGateway

#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod gateway;
pub mod invitations;

pub use auth::{AuthApi, LoginUrl, TokenResponse};
pub use client::ApiClient;
pub use gateway::{EntityGateway, RestGateway, TaskGateway};
pub use invitations::{InvitationApi, InvitationGateway};
