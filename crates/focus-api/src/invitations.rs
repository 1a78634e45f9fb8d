//! Group and project invitations.

use async_trait::async_trait;
use reqwest::Method;

use focus_core::{ApiError, EntityId, InvitationList, ProjectInvite, RequestScope};

use crate::client::{ApiClient, Call};

/// Invitation endpoints.
#[async_trait]
pub trait InvitationGateway: Send + Sync {
    /// Invitations addressed to the signed-in user.
    async fn pending(&self) -> Result<InvitationList, ApiError>;
    /// Join the inviting group.
    async fn accept(&self, token: &str) -> Result<(), ApiError>;
    /// Refuse an invitation.
    async fn decline(&self, token: &str) -> Result<(), ApiError>;
    /// Invite someone to collaborate on a project.
    async fn invite_to_project(
        &self,
        project_id: &EntityId,
        invite: &ProjectInvite,
    ) -> Result<(), ApiError>;
}

/// REST implementation.
#[derive(Clone, Debug)]
pub struct InvitationApi {
    client: ApiClient,
}

impl InvitationApi {
    /// Invitation endpoints on `client`.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InvitationGateway for InvitationApi {
    async fn pending(&self) -> Result<InvitationList, ApiError> {
        self.client
            .fetch(Call::new(
                Method::GET,
                "/api/invitations/pending",
                RequestScope::Collection,
            ))
            .await
    }

    async fn accept(&self, token: &str) -> Result<(), ApiError> {
        let call = Call::new(Method::POST, "/api/invitations", RequestScope::Record)
            .segment(token)
            .segment("accept");
        self.client.execute(call).await
    }

    async fn decline(&self, token: &str) -> Result<(), ApiError> {
        let call = Call::new(Method::POST, "/api/invitations", RequestScope::Record)
            .segment(token)
            .segment("decline");
        self.client.execute(call).await
    }

    async fn invite_to_project(
        &self,
        project_id: &EntityId,
        invite: &ProjectInvite,
    ) -> Result<(), ApiError> {
        let call = Call::new(Method::POST, "/api/projects", RequestScope::Record)
            .segment(project_id.as_str())
            .segment("invite")
            .json(invite)?;
        self.client.execute(call).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::test_support::client_for;

    #[tokio::test]
    async fn pending_decodes_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/invitations/pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "invitations": [{
                    "id": 1,
                    "token": "inv-abc",
                    "shared_group_id": 4,
                    "invited_email": "sam@example.com",
                    "role": "member",
                    "status": "pending",
                    "created_at": "2024-05-01T10:00:00",
                    "group_name": "Body doubling"
                }],
                "total": 1,
                "pending_count": 1
            })))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server);
        let list = InvitationApi::new(client).pending().await.unwrap();
        assert_eq!(list.pending_count, 1);
        assert_eq!(list.pending().count(), 1);
        assert_eq!(list.invitations[0].group_name.as_deref(), Some("Body doubling"));
    }

    #[tokio::test]
    async fn accept_and_decline_post_to_token_paths() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/invitations/inv-abc/accept"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/invitations/inv-xyz/decline"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client_for(&server);
        let api = InvitationApi::new(client);
        api.accept("inv-abc").await.unwrap();
        api.decline("inv-xyz").await.unwrap();
    }

    #[tokio::test]
    async fn expired_invitation_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server);
        let err = InvitationApi::new(client).accept("gone").await.unwrap_err();
        assert_matches!(err, ApiError::NotFound { .. });
    }

    #[tokio::test]
    async fn invite_to_project_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/projects/12/invite"))
            .and(body_json(json!({"user_email": "kim@example.com", "role": "collaborator"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 99})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client_for(&server);
        let invite = ProjectInvite {
            user_email: "kim@example.com".into(),
            message: None,
            role: Some("collaborator".into()),
        };
        InvitationApi::new(client)
            .invite_to_project(&EntityId::from(12), &invite)
            .await
            .unwrap();
    }
}
