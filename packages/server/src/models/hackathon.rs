use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_title, validate_window};
use crate::entity::hackathon::{self, status};
use crate::entity::hackathon_role::{self, CoordinatorPermissions};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateHackathonRequest {
    pub title: String,
    pub description: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    pub min_members: i32,
    pub max_members: i32,
    pub max_teams: i32,
    /// Registration fee in major currency units; zero means free.
    #[serde(default)]
    pub registration_fee: i64,
    /// ISO currency code; defaults to INR.
    pub fee_currency: Option<String>,
    #[serde(default)]
    pub auto_accept_teams: bool,
    #[serde(default = "default_true")]
    pub allow_team_name_change: bool,
}

fn default_true() -> bool {
    true
}

fn validate_member_bounds(min: i32, max: i32) -> Result<(), AppError> {
    if min < 1 {
        return Err(AppError::Validation(
            "Minimum team members must be >= 1".into(),
        ));
    }
    if max < min {
        return Err(AppError::Validation(
            "Maximum team members must be >= minimum".into(),
        ));
    }
    Ok(())
}

fn validate_currency(currency: Option<&str>) -> Result<(), AppError> {
    if let Some(currency) = currency
        && (currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return Err(AppError::Validation(
            "Currency must be a 3-letter code".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_hackathon(payload: &CreateHackathonRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    validate_window(
        payload.registration_start,
        payload.registration_end,
        "registration",
    )?;
    validate_window(payload.event_start, payload.event_end, "event")?;
    if payload.event_start < payload.registration_start {
        return Err(AppError::Validation(
            "Event must not start before registration opens".into(),
        ));
    }
    validate_member_bounds(payload.min_members, payload.max_members)?;
    if payload.max_teams < 1 {
        return Err(AppError::Validation("Maximum teams must be >= 1".into()));
    }
    if payload.registration_fee < 0 {
        return Err(AppError::Validation(
            "Registration fee must not be negative".into(),
        ));
    }
    validate_currency(payload.fee_currency.as_deref())?;
    Ok(())
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateHackathonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub status: Option<String>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub min_members: Option<i32>,
    pub max_members: Option<i32>,
    pub max_teams: Option<i32>,
    pub registration_fee: Option<i64>,
    pub fee_currency: Option<String>,
    pub auto_accept_teams: Option<bool>,
    pub allow_team_name_change: Option<bool>,
}

pub fn validate_update_hackathon(payload: &UpdateHackathonRequest) -> Result<(), AppError> {
    if let Some(title) = &payload.title {
        validate_title(title)?;
    }
    if let Some(description) = &payload.description
        && description.trim().is_empty()
    {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    if let Some(s) = &payload.status
        && !status::ALL.contains(&s.as_str())
    {
        return Err(AppError::Validation(format!(
            "Status must be one of: {}",
            status::ALL.join(", ")
        )));
    }
    if let Some(fee) = payload.registration_fee
        && fee < 0
    {
        return Err(AppError::Validation(
            "Registration fee must not be negative".into(),
        ));
    }
    if let Some(max_teams) = payload.max_teams
        && max_teams < 1
    {
        return Err(AppError::Validation("Maximum teams must be >= 1".into()));
    }
    validate_currency(payload.fee_currency.as_deref())?;
    Ok(())
}

/// Cross-field date check after PATCH fields are merged onto the stored row.
pub fn validate_effective_dates(
    registration_start: DateTime<Utc>,
    registration_end: DateTime<Utc>,
    event_start: DateTime<Utc>,
    event_end: DateTime<Utc>,
) -> Result<(), AppError> {
    validate_window(registration_start, registration_end, "registration")?;
    validate_window(event_start, event_end, "event")?;
    if event_start < registration_start {
        return Err(AppError::Validation(
            "Event must not start before registration opens".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct HackathonListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    /// Filter by lifecycle status.
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub is_public: bool,
    pub status: String,
    pub organizer_id: i32,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    pub min_members: i32,
    pub max_members: i32,
    pub max_teams: i32,
    pub current_registrations: i32,
    pub registration_fee: i64,
    pub fee_currency: String,
    pub auto_accept_teams: bool,
    pub allow_team_name_change: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<hackathon::Model> for HackathonResponse {
    fn from(m: hackathon::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            is_public: m.is_public,
            status: m.status,
            organizer_id: m.organizer_id,
            registration_start: m.registration_start,
            registration_end: m.registration_end,
            event_start: m.event_start,
            event_end: m.event_end,
            min_members: m.min_members,
            max_members: m.max_members,
            max_teams: m.max_teams,
            current_registrations: m.current_registrations,
            registration_fee: m.registration_fee,
            fee_currency: m.fee_currency,
            auto_accept_teams: m.auto_accept_teams,
            allow_team_name_change: m.allow_team_name_change,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonListResponse {
    pub data: Vec<HackathonResponse>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Coordinator / judge assignments
// ---------------------------------------------------------------------------

#[derive(Deserialize, utoipa::ToSchema)]
pub struct InviteCoordinatorRequest {
    /// Email or username of an existing account.
    #[schema(example = "carol@example.com")]
    pub user: String,
    /// Permission set; omitted means the standard grant.
    pub permissions: Option<CoordinatorPermissions>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct InviteJudgeRequest {
    /// Email or username of an existing account.
    #[schema(example = "judy@example.com")]
    pub user: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdatePermissionsRequest {
    pub permissions: CoordinatorPermissions,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RoleResponse {
    pub id: i32,
    pub hackathon_id: i32,
    pub user_id: i32,
    pub kind: String,
    pub status: String,
    /// Only meaningful for coordinators.
    pub permissions: Option<CoordinatorPermissions>,
    pub invited_by: i32,
    pub invited_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<hackathon_role::Model> for RoleResponse {
    fn from(m: hackathon_role::Model) -> Self {
        let permissions = if m.kind == hackathon_role::kind::COORDINATOR {
            Some(m.permissions())
        } else {
            None
        };
        Self {
            id: m.id,
            hackathon_id: m.hackathon_id,
            user_id: m.user_id,
            kind: m.kind,
            status: m.status,
            permissions,
            invited_by: m.invited_by,
            invited_at: m.invited_at,
            responded_at: m.responded_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CoordinationResponse {
    pub role: RoleResponse,
    pub hackathon: HackathonResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CoordinationListResponse {
    pub data: Vec<CoordinationResponse>,
}
