//! Group and project invitations.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Invitation lifecycle status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Awaiting a response.
    Pending,
    /// Accepted by the invitee.
    Accepted,
    /// Declined by the invitee.
    Declined,
    /// Past its expiry.
    Expired,
    /// A status this client does not know about yet.
    #[serde(other)]
    Unknown,
}

/// An invitation to join a shared group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    /// Record id.
    pub id: EntityId,
    /// Opaque token used to accept or decline.
    pub token: String,
    /// Group being joined.
    pub shared_group_id: EntityId,
    /// Address the invitation was sent to.
    pub invited_email: String,
    /// Role granted on acceptance.
    pub role: String,
    /// Lifecycle status.
    pub status: InvitationStatus,
    /// Personal message from the inviter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Server creation timestamp.
    pub created_at: String,
    /// Expiry timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Group display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    /// Group description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_description: Option<String>,
    /// Who sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inviter_name: Option<String>,
}

/// Response of the pending-invitations endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationList {
    /// Invitations addressed to the current user.
    #[serde(default)]
    pub invitations: Vec<Invitation>,
    /// Total count.
    #[serde(default)]
    pub total: u32,
    /// Count still pending.
    #[serde(default)]
    pub pending_count: u32,
}

impl InvitationList {
    /// Invitations still awaiting a response.
    pub fn pending(&self) -> impl Iterator<Item = &Invitation> {
        self.invitations
            .iter()
            .filter(|inv| inv.status == InvitationStatus::Pending)
    }
}

/// Payload for inviting someone to a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInvite {
    /// Invitee email.
    pub user_email: String,
    /// Personal message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Role to grant (server default is `collaborator`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invitation(status: &str) -> serde_json::Value {
        json!({
            "id": "i1",
            "token": "tok",
            "shared_group_id": 4,
            "invited_email": "a@b.c",
            "role": "member",
            "status": status,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn pending_filters_by_status() {
        let list: InvitationList = serde_json::from_value(json!({
            "invitations": [invitation("pending"), invitation("accepted")],
            "total": 2,
            "pending_count": 1
        }))
        .unwrap();
        assert_eq!(list.pending().count(), 1);
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let inv: Invitation = serde_json::from_value(invitation("revoked")).unwrap();
        assert_eq!(inv.status, InvitationStatus::Unknown);
    }

    #[test]
    fn empty_body_parses_as_empty_list() {
        let list: InvitationList = serde_json::from_value(json!({})).unwrap();
        assert!(list.invitations.is_empty());
    }
}
