use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::join_request;
use crate::error::AppError;

/// Leaders invite a user to their team; the invitee accepts or rejects.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateJoinRequestRequest {
    /// The invitee.
    pub user_id: i32,
    /// Optional note to the invitee.
    pub message: Option<String>,
}

pub fn validate_create_join_request(payload: &CreateJoinRequestRequest) -> Result<(), AppError> {
    if let Some(message) = &payload.message
        && message.chars().count() > 512
    {
        return Err(AppError::Validation(
            "Message must be at most 512 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JoinRequestResponse {
    pub id: i32,
    pub team_id: i32,
    pub hackathon_id: i32,
    pub user_id: i32,
    pub sender_id: i32,
    pub message: Option<String>,
    pub status: String,
    pub responded_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<join_request::Model> for JoinRequestResponse {
    fn from(m: join_request::Model) -> Self {
        Self {
            id: m.id,
            team_id: m.team_id,
            hackathon_id: m.hackathon_id,
            user_id: m.user_id,
            sender_id: m.sender_id,
            message: m.message,
            status: m.status,
            responded_at: m.responded_at,
            expires_at: m.expires_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JoinRequestListResponse {
    pub data: Vec<JoinRequestResponse>,
}
