use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::shared::{Pagination, double_option, validate_optional_url};
use crate::entity::score::{self, Criterion};
use crate::entity::{submission, team, team_member, user};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterTeamRequest {
    pub hackathon_id: i32,
    /// Team name, unique within the hackathon.
    #[schema(example = "Rustaceans")]
    pub team_name: String,
    /// User ids of members besides the leader (the caller).
    #[serde(default)]
    pub member_ids: Vec<i32>,
    pub project_title: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

pub fn validate_register_team(payload: &RegisterTeamRequest) -> Result<(), AppError> {
    validate_team_name(&payload.team_name)?;
    let mut seen = HashSet::new();
    for &id in &payload.member_ids {
        if !seen.insert(id) {
            return Err(AppError::Validation(format!("Duplicate member id: {id}")));
        }
    }
    Ok(())
}

pub fn validate_team_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 64 {
        return Err(AppError::Validation(
            "Team name must be 1-64 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateTeamRequest {
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub project_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub project_description: Option<Option<String>>,
    pub tech_stack: Option<Vec<String>>,
}

pub fn validate_update_team(payload: &UpdateTeamRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.team_name {
        validate_team_name(name)?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct TeamListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Filter by registration status.
    pub status: Option<String>,
    /// Filter by elimination flag.
    pub eliminated: Option<bool>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AssignTeamRequest {
    pub table_number: Option<String>,
    pub team_number: Option<String>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct EliminateTeamRequest {
    /// Round the team was eliminated in.
    #[schema(example = "round-1")]
    pub round_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    #[schema(example = "round-1")]
    pub round_id: String,
    pub project_url: Option<String>,
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub presentation_url: Option<String>,
    pub github_repo: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

pub fn validate_submission(payload: &CreateSubmissionRequest) -> Result<(), AppError> {
    if payload.round_id.trim().is_empty() {
        return Err(AppError::Validation("Round id must not be empty".into()));
    }
    validate_optional_url(payload.project_url.as_deref(), "project_url")?;
    validate_optional_url(payload.demo_url.as_deref(), "demo_url")?;
    validate_optional_url(payload.video_url.as_deref(), "video_url")?;
    validate_optional_url(payload.presentation_url.as_deref(), "presentation_url")?;
    validate_optional_url(payload.github_repo.as_deref(), "github_repo")?;
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ScoreTeamRequest {
    #[schema(example = "round-1")]
    pub round_id: String,
    /// At least one criterion; every score must lie within [0, max_score].
    pub criteria: Vec<Criterion>,
    pub remarks: Option<String>,
    pub feedback: Option<String>,
}

pub fn validate_score_team(payload: &ScoreTeamRequest) -> Result<(), AppError> {
    if payload.round_id.trim().is_empty() {
        return Err(AppError::Validation("Round id must not be empty".into()));
    }
    if payload.criteria.is_empty() {
        return Err(AppError::Validation(
            "At least one criterion is required".into(),
        ));
    }
    for criterion in &payload.criteria {
        if criterion.criteria_name.trim().is_empty() {
            return Err(AppError::Validation(
                "Criterion name must not be empty".into(),
            ));
        }
        if criterion.max_score <= 0.0 {
            return Err(AppError::Validation(format!(
                "Criterion '{}' must have a positive max score",
                criterion.criteria_name
            )));
        }
        if criterion.score < 0.0 || criterion.score > criterion.max_score {
            return Err(AppError::Validation(format!(
                "Criterion '{}' score must be between 0 and {}",
                criterion.criteria_name, criterion.max_score
            )));
        }
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct LeaderboardQuery {
    /// Rank by this round's mean judge total instead of the overall score.
    pub round_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamMemberResponse {
    pub user_id: i32,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub status: String,
    pub checked_in: bool,
    pub joined_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamResponse {
    pub id: i32,
    pub hackathon_id: i32,
    pub team_name: String,
    pub team_number: Option<String>,
    pub table_number: Option<String>,
    pub leader_id: i32,
    pub project_title: Option<String>,
    pub project_description: Option<String>,
    pub tech_stack: Vec<String>,
    pub registration_status: String,
    pub registered_at: DateTime<Utc>,
    pub payment_status: String,
    pub payment_amount: i64,
    pub payment_currency: String,
    pub overall_score: f64,
    pub is_eliminated: bool,
    pub eliminated_in_round: Option<String>,
    pub checked_in: bool,
    pub all_members_checked_in: bool,
    pub members: Vec<TeamMemberResponse>,
    pub created_at: DateTime<Utc>,
}

impl TeamResponse {
    pub fn from_parts(
        team: team::Model,
        members: Vec<(team_member::Model, user::Model)>,
    ) -> Self {
        let tech_stack = team.tech_stack();
        Self {
            id: team.id,
            hackathon_id: team.hackathon_id,
            team_name: team.team_name,
            team_number: team.team_number,
            table_number: team.table_number,
            leader_id: team.leader_id,
            project_title: team.project_title,
            project_description: team.project_description,
            tech_stack,
            registration_status: team.registration_status,
            registered_at: team.registered_at,
            payment_status: team.payment_status,
            payment_amount: team.payment_amount,
            payment_currency: team.payment_currency,
            overall_score: team.overall_score,
            is_eliminated: team.is_eliminated,
            eliminated_in_round: team.eliminated_in_round,
            checked_in: team.checked_in,
            all_members_checked_in: team.all_members_checked_in,
            members: members
                .into_iter()
                .map(|(m, u)| TeamMemberResponse {
                    user_id: m.user_id,
                    username: u.username,
                    full_name: u.full_name,
                    role: m.role,
                    status: m.status,
                    checked_in: m.checked_in,
                    joined_at: m.joined_at,
                })
                .collect(),
            created_at: team.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamListResponse {
    pub data: Vec<TeamResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub team_id: i32,
    pub round_id: String,
    pub submitted_by: i32,
    pub submitted_at: DateTime<Utc>,
    pub project_url: Option<String>,
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub presentation_url: Option<String>,
    pub github_repo: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Vec<String>,
    pub status: String,
}

impl From<submission::Model> for SubmissionResponse {
    fn from(m: submission::Model) -> Self {
        let tech_stack = serde_json::from_value(m.tech_stack).unwrap_or_default();
        Self {
            id: m.id,
            team_id: m.team_id,
            round_id: m.round_id,
            submitted_by: m.submitted_by,
            submitted_at: m.submitted_at,
            project_url: m.project_url,
            demo_url: m.demo_url,
            video_url: m.video_url,
            presentation_url: m.presentation_url,
            github_repo: m.github_repo,
            description: m.description,
            tech_stack,
            status: m.status,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreResponse {
    pub id: i32,
    pub team_id: i32,
    pub round_id: String,
    pub judge_id: i32,
    pub criteria: Vec<Criterion>,
    pub total_score: f64,
    pub max_possible_score: f64,
    pub remarks: Option<String>,
    pub feedback: Option<String>,
    pub is_finalized: bool,
    pub submitted_at: DateTime<Utc>,
}

impl From<score::Model> for ScoreResponse {
    fn from(m: score::Model) -> Self {
        let criteria = m.criteria();
        Self {
            id: m.id,
            team_id: m.team_id,
            round_id: m.round_id,
            judge_id: m.judge_id,
            criteria,
            total_score: m.total_score,
            max_possible_score: m.max_possible_score,
            remarks: m.remarks,
            feedback: m.feedback,
            is_finalized: m.is_finalized,
            submitted_at: m.submitted_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based position after sorting; tied scores keep distinct
    /// consecutive ranks.
    pub rank: u32,
    pub team_id: i32,
    pub team_name: String,
    pub overall_score: f64,
    /// Mean judge total for the requested round; only present with
    /// `?round_id=`.
    pub round_score: Option<f64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardResponse {
    pub hackathon_id: i32,
    pub round_id: Option<String>,
    pub entries: Vec<LeaderboardEntry>,
}
