use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::email;
use crate::entity::{hackathon, score, submission, team, team_member, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::hackathon::{find_hackathon, find_hackathon_for_update, find_user};
use crate::models::shared::Pagination;
use crate::models::team::*;
use crate::state::AppState;
use crate::utils::{access, scoring};

#[utoipa::path(
    post,
    path = "/register",
    tag = "Teams",
    operation_id = "registerTeam",
    summary = "Register a team for a hackathon",
    description = "The caller becomes the leader. All preconditions (registration window, capacity, team size, name uniqueness, every member free of other active memberships) are checked inside one transaction holding the hackathon row; the capacity counter and the inserts commit atomically.",
    request_body = RegisterTeamRequest,
    responses(
        (status = 201, description = "Team registered", body = TeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or closed registration (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon or member not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Hackathon full, name taken, member already on a team, or caller coordinates the hackathon (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(hackathon_id = payload.hackathon_id, team_name = %payload.team_name))]
pub async fn register_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_team(&payload)?;
    if payload.member_ids.contains(&auth_user.id) {
        return Err(AppError::Validation(
            "The leader is a member implicitly".into(),
        ));
    }

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let hackathon = find_hackathon_for_update(&txn, payload.hackathon_id).await?;
    if !hackathon.is_registration_open(now) {
        return Err(AppError::InvalidState(
            "Registration is not open for this hackathon".into(),
        ));
    }
    if !hackathon.has_capacity() {
        return Err(AppError::Conflict(
            "Hackathon has reached its registration limit".into(),
        ));
    }

    let size = 1 + payload.member_ids.len() as i32;
    if size < hackathon.min_members || size > hackathon.max_members {
        return Err(AppError::Validation(format!(
            "Team size must be between {} and {}",
            hackathon.min_members, hackathon.max_members
        )));
    }

    if access::is_accepted_coordinator(&txn, hackathon.id, auth_user.id).await? {
        return Err(AppError::Conflict(
            "Coordinators cannot register teams for their own hackathon".into(),
        ));
    }

    // The leader plus every candidate member must be free of active
    // memberships in this hackathon.
    let mut all_member_ids = vec![auth_user.id];
    all_member_ids.extend(&payload.member_ids);
    for &user_id in &payload.member_ids {
        find_user(&txn, user_id).await?;
    }
    let taken = team_member::Entity::find()
        .filter(team_member::Column::HackathonId.eq(hackathon.id))
        .filter(team_member::Column::UserId.is_in(all_member_ids.clone()))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .count(&txn)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict(
            "A member already belongs to a team in this hackathon".into(),
        ));
    }

    let name_taken = team::Entity::find()
        .filter(team::Column::HackathonId.eq(hackathon.id))
        .filter(team::Column::TeamName.eq(payload.team_name.trim()))
        .count(&txn)
        .await?;
    if name_taken > 0 {
        return Err(AppError::Conflict("Team name already taken".into()));
    }

    let fee = hackathon.registration_fee;
    let registration_status = if hackathon.auto_accept_teams {
        team::registration_status::APPROVED
    } else {
        team::registration_status::PENDING
    };
    let payment_status = if fee == 0 {
        team::payment_status::COMPLETED
    } else {
        team::payment_status::PENDING
    };

    let new_team = team::ActiveModel {
        hackathon_id: Set(hackathon.id),
        team_name: Set(payload.team_name.trim().to_string()),
        leader_id: Set(auth_user.id),
        project_title: Set(payload.project_title),
        project_description: Set(None),
        tech_stack: Set(serde_json::json!(payload.tech_stack)),
        registration_status: Set(registration_status.into()),
        registered_at: Set(now),
        approved_at: Set(hackathon.auto_accept_teams.then_some(now)),
        payment_status: Set(payment_status.into()),
        payment_amount: Set(fee),
        payment_currency: Set(hackathon.fee_currency.clone()),
        overall_score: Set(0.0),
        is_eliminated: Set(false),
        checked_in: Set(false),
        all_members_checked_in: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let new_team = new_team.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Team name already taken".into())
        }
        _ => AppError::from(e),
    })?;

    for &user_id in &all_member_ids {
        let member = team_member::ActiveModel {
            team_id: Set(new_team.id),
            hackathon_id: Set(hackathon.id),
            user_id: Set(user_id),
            role: Set(if user_id == auth_user.id {
                team_member::role::LEADER.into()
            } else {
                team_member::role::MEMBER.into()
            }),
            status: Set(team_member::status::ACTIVE.into()),
            joined_at: Set(now),
            checked_in: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        // The partial unique index backstops a concurrent registration that
        // slipped past the count above.
        member.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("A member already belongs to a team in this hackathon".into())
            }
            _ => AppError::from(e),
        })?;
    }

    let mut counter: hackathon::ActiveModel = hackathon.clone().into();
    counter.current_registrations = Set(hackathon.current_registrations + 1);
    counter.updated_at = Set(now);
    counter.update(&txn).await?;

    txn.commit().await?;

    let leader = find_user(&state.db, auth_user.id).await?;
    email::send_best_effort(
        state.email.as_ref(),
        &leader.email,
        &format!("Team registered for {}", hackathon.title),
        &format!(
            "<p>Hi {},</p><p>Your team <b>{}</b> is registered for <b>{}</b>.</p>",
            leader.full_name, new_team.team_name, hackathon.title
        ),
    )
    .await;

    let response = load_team_response(&state.db, new_team).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/my",
    tag = "Teams",
    operation_id = "myTeams",
    summary = "List the caller's teams across hackathons",
    responses(
        (status = 200, description = "Teams", body = TeamListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn my_teams(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<TeamListResponse>, AppError> {
    let memberships = team_member::Entity::find()
        .filter(team_member::Column::UserId.eq(auth_user.id))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .all(&state.db)
        .await?;
    let team_ids: Vec<i32> = memberships.iter().map(|m| m.team_id).collect();

    let teams = team::Entity::find()
        .filter(team::Column::Id.is_in(team_ids))
        .order_by_desc(team::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut data = Vec::with_capacity(teams.len());
    for t in teams {
        data.push(load_team_response(&state.db, t).await?);
    }

    let total = data.len() as u64;
    Ok(Json(TeamListResponse {
        data,
        pagination: Pagination {
            page: 1,
            per_page: std::cmp::Ord::max(total, 1),
            total,
            total_pages: 1,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/my/hackathon/{hackathon_id}",
    tag = "Teams",
    operation_id = "myTeamForHackathon",
    summary = "Get the caller's team in a hackathon",
    params(("hackathon_id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Team", body = TeamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No active membership (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id))]
pub async fn my_team_for_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    let membership = team_member::Entity::find()
        .filter(team_member::Column::HackathonId.eq(hackathon_id))
        .filter(team_member::Column::UserId.eq(auth_user.id))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("You have no team in this hackathon".into()))?;

    let team = find_team(&state.db, membership.team_id).await?;
    Ok(Json(load_team_response(&state.db, team).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Teams",
    operation_id = "getTeam",
    summary = "Get a team by ID",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team", body = TeamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_team(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    let team = find_team(&state.db, id).await?;
    Ok(Json(load_team_response(&state.db, team).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Teams",
    operation_id = "updateTeam",
    summary = "Update team details",
    description = "Leader only. Renaming is gated by the hackathon's `allow_team_name_change` flag and must stay unique.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Updated team", body = TeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or renames disabled (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    validate_update_team(&payload)?;

    let team = find_team(&state.db, id).await?;
    if team.leader_id != auth_user.id && !access::is_admin(&auth_user) {
        return Err(AppError::PermissionDenied);
    }

    let mut active: team::ActiveModel = team.clone().into();
    if let Some(name) = payload.team_name {
        let name = name.trim().to_string();
        if name != team.team_name {
            let hackathon = find_hackathon(&state.db, team.hackathon_id).await?;
            if !hackathon.allow_team_name_change {
                return Err(AppError::InvalidState(
                    "Team renaming is disabled for this hackathon".into(),
                ));
            }
            let taken = team::Entity::find()
                .filter(team::Column::HackathonId.eq(team.hackathon_id))
                .filter(team::Column::TeamName.eq(name.clone()))
                .filter(team::Column::Id.ne(team.id))
                .count(&state.db)
                .await?;
            if taken > 0 {
                return Err(AppError::Conflict("Team name already taken".into()));
            }
            active.team_name = Set(name);
        }
    }
    if let Some(project_title) = payload.project_title {
        active.project_title = Set(project_title);
    }
    if let Some(project_description) = payload.project_description {
        active.project_description = Set(project_description);
    }
    if let Some(tech_stack) = payload.tech_stack {
        active.tech_stack = Set(serde_json::json!(tech_stack));
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Team name already taken".into())
        }
        _ => AppError::from(e),
    })?;
    Ok(Json(load_team_response(&state.db, updated).await?))
}

#[utoipa::path(
    get,
    path = "/hackathon/{hackathon_id}",
    tag = "Teams",
    operation_id = "listTeamsByHackathon",
    summary = "List a hackathon's teams",
    description = "Coordinator with `can_view_teams`, organizer, or admin. Ordered by overall score, then registration recency.",
    params(("hackathon_id" = i32, Path, description = "Hackathon ID"), TeamListQuery),
    responses(
        (status = 200, description = "Paginated teams", body = TeamListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(hackathon_id))]
pub async fn list_teams_by_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
    Query(query): Query<TeamListQuery>,
) -> Result<Json<TeamListResponse>, AppError> {
    let hackathon = find_hackathon(&state.db, hackathon_id).await?;
    access::require_coordinator_permission(&state.db, &hackathon, &auth_user, |p| {
        p.can_view_teams
    })
    .await?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = team::Entity::find().filter(team::Column::HackathonId.eq(hackathon_id));
    if let Some(ref status) = query.status {
        select = select.filter(team::Column::RegistrationStatus.eq(status));
    }
    if let Some(eliminated) = query.eliminated {
        select = select.filter(team::Column::IsEliminated.eq(eliminated));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let teams = select
        .order_by_desc(team::Column::OverallScore)
        .order_by_desc(team::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let mut data = Vec::with_capacity(teams.len());
    for t in teams {
        data.push(load_team_response(&state.db, t).await?);
    }

    Ok(Json(TeamListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/checkin",
    tag = "Teams",
    operation_id = "checkInTeam",
    summary = "Check a team in at the venue",
    description = "Coordinator with `can_check_in`, organizer, or admin.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Checked in", body = TeamResponse),
        (status = 400, description = "Already checked in (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn check_in_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    let team = find_team(&state.db, id).await?;
    let hackathon = find_hackathon(&state.db, team.hackathon_id).await?;
    access::require_coordinator_permission(&state.db, &hackathon, &auth_user, |p| p.can_check_in)
        .await?;

    if team.checked_in {
        return Err(AppError::InvalidState("Team is already checked in".into()));
    }

    let now = chrono::Utc::now();
    let mut active: team::ActiveModel = team.into();
    active.checked_in = Set(true);
    active.checked_in_at = Set(Some(now));
    active.checked_in_by = Set(Some(auth_user.id));
    active.updated_at = Set(now);
    let updated = active.update(&state.db).await?;

    Ok(Json(load_team_response(&state.db, updated).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/members/{user_id}/checkin",
    tag = "Teams",
    operation_id = "checkInMember",
    summary = "Check a single member in",
    description = "Coordinator with `can_check_in`, organizer, or admin. When the last active member checks in the team's `all_members_checked_in` flag is set.",
    params(
        ("id" = i32, Path, description = "Team ID"),
        ("user_id" = i32, Path, description = "Member's user ID"),
    ),
    responses(
        (status = 200, description = "Member checked in", body = TeamResponse),
        (status = 400, description = "Already checked in (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id))]
pub async fn check_in_member(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<Json<TeamResponse>, AppError> {
    let team = find_team(&state.db, id).await?;
    let hackathon = find_hackathon(&state.db, team.hackathon_id).await?;
    access::require_coordinator_permission(&state.db, &hackathon, &auth_user, |p| p.can_check_in)
        .await?;

    let txn = state.db.begin().await?;

    let member = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(id))
        .filter(team_member::Column::UserId.eq(user_id))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Team member not found".into()))?;

    if member.checked_in {
        return Err(AppError::InvalidState(
            "Member is already checked in".into(),
        ));
    }

    let now = chrono::Utc::now();
    let mut active: team_member::ActiveModel = member.into();
    active.checked_in = Set(true);
    active.checked_in_at = Set(Some(now));
    active.checked_in_by = Set(Some(auth_user.id));
    active.updated_at = Set(now);
    active.update(&txn).await?;

    let unchecked = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(id))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .filter(team_member::Column::CheckedIn.eq(false))
        .count(&txn)
        .await?;
    if unchecked == 0 {
        let mut team_active: team::ActiveModel = team.into();
        team_active.all_members_checked_in = Set(true);
        team_active.updated_at = Set(now);
        team_active.update(&txn).await?;
    }

    txn.commit().await?;

    let team = find_team(&state.db, id).await?;
    Ok(Json(load_team_response(&state.db, team).await?))
}

#[utoipa::path(
    put,
    path = "/{id}/assign",
    tag = "Teams",
    operation_id = "assignTeamNumbers",
    summary = "Assign table and team numbers",
    description = "Coordinator with `can_assign_tables`, organizer, or admin.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = AssignTeamRequest,
    responses(
        (status = 200, description = "Assigned", body = TeamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn assign_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AssignTeamRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    let team = find_team(&state.db, id).await?;
    let hackathon = find_hackathon(&state.db, team.hackathon_id).await?;
    access::require_coordinator_permission(&state.db, &hackathon, &auth_user, |p| {
        p.can_assign_tables
    })
    .await?;

    let mut active: team::ActiveModel = team.into();
    if let Some(table_number) = payload.table_number {
        active.table_number = Set(Some(table_number));
    }
    if let Some(team_number) = payload.team_number {
        active.team_number = Set(Some(team_number));
    }
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(load_team_response(&state.db, updated).await?))
}

#[utoipa::path(
    put,
    path = "/{id}/approve",
    tag = "Teams",
    operation_id = "approveTeam",
    summary = "Approve a pending team",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Approved", body = TeamResponse),
        (status = 400, description = "Not pending (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn approve_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    review_team(&state, &auth_user, id, true).await
}

#[utoipa::path(
    put,
    path = "/{id}/reject",
    tag = "Teams",
    operation_id = "rejectTeam",
    summary = "Reject a pending team",
    description = "Rejection does not release the hackathon's capacity slot.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Rejected", body = TeamResponse),
        (status = 400, description = "Not pending (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn reject_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    review_team(&state, &auth_user, id, false).await
}

async fn review_team(
    state: &AppState,
    auth_user: &AuthUser,
    id: i32,
    approve: bool,
) -> Result<Json<TeamResponse>, AppError> {
    let team = find_team(&state.db, id).await?;
    let hackathon = find_hackathon(&state.db, team.hackathon_id).await?;
    access::require_organizer(&hackathon, auth_user)?;

    if team.registration_status != team::registration_status::PENDING {
        return Err(AppError::InvalidState(
            "Only pending teams can be reviewed".into(),
        ));
    }

    let now = chrono::Utc::now();
    let leader_id = team.leader_id;
    let team_name = team.team_name.clone();
    let mut active: team::ActiveModel = team.into();
    if approve {
        active.registration_status = Set(team::registration_status::APPROVED.into());
        active.approved_at = Set(Some(now));
        active.approved_by = Set(Some(auth_user.id));
    } else {
        active.registration_status = Set(team::registration_status::REJECTED.into());
    }
    active.updated_at = Set(now);
    let updated = active.update(&state.db).await?;

    let leader = find_user(&state.db, leader_id).await?;
    let verdict = if approve { "approved" } else { "rejected" };
    email::send_best_effort(
        state.email.as_ref(),
        &leader.email,
        &format!("Team {verdict} for {}", hackathon.title),
        &format!(
            "<p>Hi {},</p><p>Your team <b>{team_name}</b> was {verdict} for <b>{}</b>.</p>",
            leader.full_name, hackathon.title
        ),
    )
    .await;

    Ok(Json(load_team_response(&state.db, updated).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/submit",
    tag = "Teams",
    operation_id = "submitProject",
    summary = "Submit a project for a round",
    description = "Active members only; one submission per (team, round).",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submitted", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or team not approved (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Round already submitted (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, round_id = %payload.round_id))]
pub async fn submit_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_submission(&payload)?;

    let team = find_team(&state.db, id).await?;
    require_active_member(&state.db, team.id, auth_user.id).await?;

    if team.registration_status != team::registration_status::APPROVED {
        return Err(AppError::InvalidState("Team is not approved".into()));
    }
    if team.is_eliminated {
        return Err(AppError::InvalidState("Team has been eliminated".into()));
    }

    let now = chrono::Utc::now();
    let row = submission::ActiveModel {
        team_id: Set(team.id),
        round_id: Set(payload.round_id.trim().to_string()),
        submitted_by: Set(auth_user.id),
        submitted_at: Set(now),
        project_url: Set(payload.project_url),
        demo_url: Set(payload.demo_url),
        video_url: Set(payload.video_url),
        presentation_url: Set(payload.presentation_url),
        github_repo: Set(payload.github_repo),
        description: Set(payload.description),
        tech_stack: Set(serde_json::json!(payload.tech_stack)),
        status: Set(submission::status::SUBMITTED.into()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let row = row.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("This round already has a submission".into())
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(row))))
}

#[utoipa::path(
    post,
    path = "/{id}/score",
    tag = "Teams",
    operation_id = "scoreTeam",
    summary = "Score a team for a round",
    description = "Accepted judges (organizer and admins bypass). One score per (team, round, judge); totals are computed server-side, finalized at creation, and the team's overall score is recomputed in the same transaction.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = ScoreTeamRequest,
    responses(
        (status = 201, description = "Score recorded", body = ScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or team not scorable (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a judge (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Round already scored by this judge (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, round_id = %payload.round_id))]
pub async fn score_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ScoreTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_score_team(&payload)?;

    let txn = state.db.begin().await?;

    let team = find_team_for_update(&txn, id).await?;
    let hackathon = find_hackathon(&txn, team.hackathon_id).await?;
    if !access::can_judge(&txn, &hackathon, &auth_user).await? {
        return Err(AppError::PermissionDenied);
    }

    if team.registration_status != team::registration_status::APPROVED {
        return Err(AppError::InvalidState("Team is not approved".into()));
    }
    if team.is_eliminated {
        return Err(AppError::InvalidState("Team has been eliminated".into()));
    }

    let (total, max) = scoring::compute_totals(&payload.criteria);
    let now = chrono::Utc::now();
    let row = score::ActiveModel {
        team_id: Set(team.id),
        round_id: Set(payload.round_id.trim().to_string()),
        judge_id: Set(auth_user.id),
        criteria: Set(serde_json::to_value(&payload.criteria)
            .map_err(|e| AppError::Internal(e.to_string()))?),
        total_score: Set(total),
        max_possible_score: Set(max),
        remarks: Set(payload.remarks),
        feedback: Set(payload.feedback),
        is_finalized: Set(true),
        submitted_at: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let row = row.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("You have already scored this round".into())
        }
        _ => AppError::from(e),
    })?;

    recompute_overall_score(&txn, team).await?;

    txn.commit().await?;
    Ok((StatusCode::CREATED, Json(ScoreResponse::from(row))))
}

#[utoipa::path(
    post,
    path = "/{id}/eliminate",
    tag = "Teams",
    operation_id = "eliminateTeam",
    summary = "Eliminate a team",
    description = "Organizer, admin, or coordinator with `can_eliminate_teams`. There is no reversal.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = EliminateTeamRequest,
    responses(
        (status = 200, description = "Eliminated", body = TeamResponse),
        (status = 400, description = "Already eliminated (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn eliminate_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<EliminateTeamRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    let team = find_team(&state.db, id).await?;
    let hackathon = find_hackathon(&state.db, team.hackathon_id).await?;
    access::require_coordinator_permission(&state.db, &hackathon, &auth_user, |p| {
        p.can_eliminate_teams
    })
    .await?;

    if team.is_eliminated {
        return Err(AppError::InvalidState(
            "Team is already eliminated".into(),
        ));
    }

    let now = chrono::Utc::now();
    let mut active: team::ActiveModel = team.into();
    active.is_eliminated = Set(true);
    active.eliminated_at = Set(Some(now));
    active.eliminated_in_round = Set(payload.round_id);
    active.eliminated_by = Set(Some(auth_user.id));
    active.elimination_reason = Set(payload.reason);
    active.updated_at = Set(now);
    let updated = active.update(&state.db).await?;

    Ok(Json(load_team_response(&state.db, updated).await?))
}

#[utoipa::path(
    get,
    path = "/hackathon/{hackathon_id}/leaderboard",
    tag = "Teams",
    operation_id = "leaderboard",
    summary = "Hackathon leaderboard",
    description = "Approved, non-eliminated teams ranked by overall score, or by a round's mean judge total with `?round_id=`. Ranks are 1-based positions; ties keep their relative order with distinct ranks.",
    params(("hackathon_id" = i32, Path, description = "Hackathon ID"), LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard", body = LeaderboardResponse),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(hackathon_id))]
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    find_hackathon(&state.db, hackathon_id).await?;

    let teams = team::Entity::find()
        .filter(team::Column::HackathonId.eq(hackathon_id))
        .filter(team::Column::RegistrationStatus.eq(team::registration_status::APPROVED))
        .filter(team::Column::IsEliminated.eq(false))
        .order_by_asc(team::Column::Id)
        .all(&state.db)
        .await?;

    let round_means: Option<HashMap<i32, f64>> = match &query.round_id {
        Some(round_id) => {
            let team_ids: Vec<i32> = teams.iter().map(|t| t.id).collect();
            let scores = score::Entity::find()
                .filter(score::Column::TeamId.is_in(team_ids))
                .filter(score::Column::RoundId.eq(round_id))
                .filter(score::Column::IsFinalized.eq(true))
                .all(&state.db)
                .await?;
            let mut totals: HashMap<i32, Vec<f64>> = HashMap::new();
            for s in scores {
                totals.entry(s.team_id).or_default().push(s.total_score);
            }
            Some(
                totals
                    .into_iter()
                    .map(|(team_id, totals)| (team_id, scoring::round_score(&totals)))
                    .collect(),
            )
        }
        None => None,
    };

    let mut rows: Vec<(team::Model, f64, Option<f64>)> = teams
        .into_iter()
        .map(|t| {
            let round_score = round_means
                .as_ref()
                .map(|m| m.get(&t.id).copied().unwrap_or(0.0));
            let sort_key = round_score.unwrap_or(t.overall_score);
            (t, sort_key, round_score)
        })
        .collect();
    // Stable sort keeps the id order for ties.
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let keys: Vec<f64> = rows.iter().map(|r| r.1).collect();
    let ranks = scoring::assign_ranks(&keys);

    let entries = rows
        .into_iter()
        .zip(ranks)
        .map(|((t, _, round_score), rank)| LeaderboardEntry {
            rank,
            team_id: t.id,
            team_name: t.team_name,
            overall_score: t.overall_score,
            round_score,
        })
        .collect();

    Ok(Json(LeaderboardResponse {
        hackathon_id,
        round_id: query.round_id,
        entries,
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/leave",
    tag = "Teams",
    operation_id = "leaveTeam",
    summary = "Leave a team",
    description = "Leaders cannot leave; leadership transfer is unsupported. The membership row is status-flagged, never deleted.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Left the team"),
        (status = 400, description = "Leader cannot leave (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No active membership (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn leave_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let team = find_team(&state.db, id).await?;
    if team.leader_id == auth_user.id {
        return Err(AppError::InvalidState(
            "Leaders cannot leave their team".into(),
        ));
    }

    let member = require_active_member(&state.db, team.id, auth_user.id).await?;
    let mut active: team_member::ActiveModel = member.into();
    active.status = Set(team_member::status::LEFT.into());
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{id}/members/{user_id}",
    tag = "Teams",
    operation_id = "removeTeamMember",
    summary = "Remove a member from a team",
    description = "Leader only; the leader cannot be removed. The membership row is status-flagged, never deleted.",
    params(
        ("id" = i32, Path, description = "Team ID"),
        ("user_id" = i32, Path, description = "Member's user ID"),
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "Cannot remove the leader (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No active membership (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id))]
pub async fn remove_member(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let team = find_team(&state.db, id).await?;
    if team.leader_id != auth_user.id && !access::is_admin(&auth_user) {
        return Err(AppError::PermissionDenied);
    }
    if user_id == team.leader_id {
        return Err(AppError::InvalidState(
            "The leader cannot be removed".into(),
        ));
    }

    let member = require_active_member(&state.db, team.id, user_id).await?;
    let mut active: team_member::ActiveModel = member.into();
    active.status = Set(team_member::status::REMOVED.into());
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_team<C: ConnectionTrait>(db: &C, id: i32) -> Result<team::Model, AppError> {
    team::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))
}

pub(crate) async fn find_team_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<team::Model, AppError> {
    use sea_orm::sea_query::LockType;
    team::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))
}

pub(crate) async fn require_active_member<C: ConnectionTrait>(
    db: &C,
    team_id: i32,
    user_id: i32,
) -> Result<team_member::Model, AppError> {
    team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .filter(team_member::Column::UserId.eq(user_id))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .one(db)
        .await?
        .ok_or(AppError::PermissionDenied)
}

/// Recompute the team's overall percentage from every finalized score, in
/// the caller's transaction.
pub(crate) async fn recompute_overall_score(
    txn: &DatabaseTransaction,
    team: team::Model,
) -> Result<(), AppError> {
    let totals: Vec<(f64, f64)> = score::Entity::find()
        .filter(score::Column::TeamId.eq(team.id))
        .filter(score::Column::IsFinalized.eq(true))
        .all(txn)
        .await?
        .into_iter()
        .map(|s| (s.total_score, s.max_possible_score))
        .collect();

    let mut active: team::ActiveModel = team.into();
    active.overall_score = Set(scoring::overall_score(&totals));
    active.updated_at = Set(chrono::Utc::now());
    active.update(txn).await?;
    Ok(())
}

pub(crate) async fn load_team_response<C: ConnectionTrait>(
    db: &C,
    team: team::Model,
) -> Result<TeamResponse, AppError> {
    let members = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team.id))
        .find_also_related(user::Entity)
        .order_by_asc(team_member::Column::JoinedAt)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(m, u)| u.map(|u| (m, u)))
        .collect();
    Ok(TeamResponse::from_parts(team, members))
}
