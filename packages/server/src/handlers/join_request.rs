use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::email;
use crate::entity::{hackathon, join_request, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::hackathon::{find_hackathon, find_user};
use crate::handlers::team::{find_team, find_team_for_update};
use crate::models::join_request::{
    CreateJoinRequestRequest, JoinRequestListResponse, JoinRequestResponse,
    validate_create_join_request,
};
use crate::state::AppState;
use crate::utils::access;

#[utoipa::path(
    post,
    path = "/{id}/join-requests",
    tag = "Join requests",
    operation_id = "createJoinRequest",
    summary = "Invite a user to a team",
    description = "Leader only. The invitation expires after seven days if unanswered.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = CreateJoinRequestRequest,
    responses(
        (status = 201, description = "Invitation sent", body = JoinRequestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or team full (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the leader (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already invited or already on a team (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(team_id, invitee = payload.user_id))]
pub async fn create_join_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<i32>,
    AppJson(payload): AppJson<CreateJoinRequestRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_join_request(&payload)?;

    let team = find_team(&state.db, team_id).await?;
    if team.leader_id != auth_user.id {
        return Err(AppError::PermissionDenied);
    }

    let hackathon = find_hackathon(&state.db, team.hackathon_id).await?;
    let invitee = find_user(&state.db, payload.user_id).await?;

    let active_members = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team.id))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .count(&state.db)
        .await?;
    if active_members as i32 >= hackathon.max_members {
        return Err(AppError::InvalidState("Team is already full".into()));
    }

    let already_on_team = team_member::Entity::find()
        .filter(team_member::Column::HackathonId.eq(hackathon.id))
        .filter(team_member::Column::UserId.eq(invitee.id))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .count(&state.db)
        .await?;
    if already_on_team > 0 {
        return Err(AppError::Conflict(
            "User already belongs to a team in this hackathon".into(),
        ));
    }

    let now = chrono::Utc::now();
    let duplicate = join_request::Entity::find()
        .filter(join_request::Column::TeamId.eq(team.id))
        .filter(join_request::Column::UserId.eq(invitee.id))
        .filter(join_request::Column::Status.eq(join_request::status::PENDING))
        .filter(join_request::Column::ExpiresAt.gt(now))
        .count(&state.db)
        .await?;
    if duplicate > 0 {
        return Err(AppError::Conflict(
            "A pending invitation for this user already exists".into(),
        ));
    }

    let row = join_request::ActiveModel {
        team_id: Set(team.id),
        hackathon_id: Set(hackathon.id),
        user_id: Set(invitee.id),
        sender_id: Set(auth_user.id),
        message: Set(payload.message),
        status: Set(join_request::status::PENDING.into()),
        expires_at: Set(now + chrono::Duration::days(join_request::TTL_DAYS)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let row = row.insert(&state.db).await?;

    email::send_best_effort(
        state.email.as_ref(),
        &invitee.email,
        &format!("Invitation to join {}", team.team_name),
        &format!(
            "<p>Hi {},</p><p>You have been invited to join team <b>{}</b> for <b>{}</b>.</p>",
            invitee.full_name, team.team_name, hackathon.title
        ),
    )
    .await;

    Ok((StatusCode::CREATED, Json(JoinRequestResponse::from(row))))
}

#[utoipa::path(
    get,
    path = "/{id}/join-requests",
    tag = "Join requests",
    operation_id = "listTeamJoinRequests",
    summary = "List a team's invitations",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Invitations", body = JoinRequestListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the leader (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(team_id))]
pub async fn list_team_join_requests(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<i32>,
) -> Result<Json<JoinRequestListResponse>, AppError> {
    let team = find_team(&state.db, team_id).await?;
    if team.leader_id != auth_user.id && !access::is_admin(&auth_user) {
        return Err(AppError::PermissionDenied);
    }

    let rows = join_request::Entity::find()
        .filter(join_request::Column::TeamId.eq(team.id))
        .order_by_desc(join_request::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(JoinRequestListResponse {
        data: rows.into_iter().map(JoinRequestResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/my/join-requests",
    tag = "Join requests",
    operation_id = "myJoinRequests",
    summary = "List the caller's pending invitations",
    description = "Expired invitations are filtered out.",
    responses(
        (status = 200, description = "Pending invitations", body = JoinRequestListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn my_join_requests(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<JoinRequestListResponse>, AppError> {
    let now = chrono::Utc::now();
    let rows = join_request::Entity::find()
        .filter(join_request::Column::UserId.eq(auth_user.id))
        .filter(join_request::Column::Status.eq(join_request::status::PENDING))
        .filter(join_request::Column::ExpiresAt.gt(now))
        .order_by_desc(join_request::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(JoinRequestListResponse {
        data: rows.into_iter().map(JoinRequestResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/join-requests/{request_id}/accept",
    tag = "Join requests",
    operation_id = "acceptJoinRequest",
    summary = "Accept an invitation",
    description = "Invitee only. Capacity and membership freedom are re-validated inside a transaction; accepting rejects the caller's other pending invitations in the same hackathon.",
    params(("request_id" = i32, Path, description = "Join request ID")),
    responses(
        (status = 200, description = "Joined the team", body = JoinRequestResponse),
        (status = 400, description = "Expired or team full (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the invitee (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No pending invitation (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already on a team (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(request_id))]
pub async fn accept_join_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
) -> Result<Json<JoinRequestResponse>, AppError> {
    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let request = find_pending_request(&txn, request_id).await?;
    if request.user_id != auth_user.id {
        return Err(AppError::PermissionDenied);
    }
    if request.is_expired(now) {
        return Err(AppError::InvalidState("Invitation has expired".into()));
    }

    let hackathon = hackathon::Entity::find_by_id(request.hackathon_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))?;

    // Serialize concurrent accepts on the team row so the capacity count
    // below cannot run twice against the same free slot.
    find_team_for_update(&txn, request.team_id).await?;

    let active_members = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(request.team_id))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .count(&txn)
        .await?;
    if active_members as i32 >= hackathon.max_members {
        return Err(AppError::InvalidState("Team is already full".into()));
    }

    let already_on_team = team_member::Entity::find()
        .filter(team_member::Column::HackathonId.eq(request.hackathon_id))
        .filter(team_member::Column::UserId.eq(auth_user.id))
        .filter(team_member::Column::Status.eq(team_member::status::ACTIVE))
        .count(&txn)
        .await?;
    if already_on_team > 0 {
        return Err(AppError::Conflict(
            "You already belong to a team in this hackathon".into(),
        ));
    }

    let member = team_member::ActiveModel {
        team_id: Set(request.team_id),
        hackathon_id: Set(request.hackathon_id),
        user_id: Set(auth_user.id),
        role: Set(team_member::role::MEMBER.into()),
        status: Set(team_member::status::ACTIVE.into()),
        joined_at: Set(now),
        checked_in: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    // First acceptance wins: the partial unique index rejects a second
    // active membership racing through this transaction.
    member.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("You already belong to a team in this hackathon".into())
        }
        _ => AppError::from(e),
    })?;

    let request_id = request.id;
    let mut active: join_request::ActiveModel = request.into();
    active.status = Set(join_request::status::ACCEPTED.into());
    active.responded_at = Set(Some(now));
    active.updated_at = Set(now);
    let accepted = active.update(&txn).await?;

    // The caller's other pending invitations in this hackathon are now moot.
    join_request::Entity::update_many()
        .col_expr(
            join_request::Column::Status,
            Expr::value(join_request::status::REJECTED),
        )
        .col_expr(join_request::Column::RespondedAt, Expr::value(Some(now)))
        .col_expr(join_request::Column::UpdatedAt, Expr::value(now))
        .filter(join_request::Column::HackathonId.eq(accepted.hackathon_id))
        .filter(join_request::Column::UserId.eq(auth_user.id))
        .filter(join_request::Column::Status.eq(join_request::status::PENDING))
        .filter(join_request::Column::Id.ne(request_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(Json(JoinRequestResponse::from(accepted)))
}

#[utoipa::path(
    post,
    path = "/join-requests/{request_id}/reject",
    tag = "Join requests",
    operation_id = "rejectJoinRequest",
    summary = "Reject an invitation",
    params(("request_id" = i32, Path, description = "Join request ID")),
    responses(
        (status = 200, description = "Rejected", body = JoinRequestResponse),
        (status = 400, description = "Expired (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the invitee (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No pending invitation (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(request_id))]
pub async fn reject_join_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
) -> Result<Json<JoinRequestResponse>, AppError> {
    let now = chrono::Utc::now();
    let request = find_pending_request(&state.db, request_id).await?;
    if request.user_id != auth_user.id {
        return Err(AppError::PermissionDenied);
    }
    if request.is_expired(now) {
        return Err(AppError::InvalidState("Invitation has expired".into()));
    }

    let mut active: join_request::ActiveModel = request.into();
    active.status = Set(join_request::status::REJECTED.into());
    active.responded_at = Set(Some(now));
    active.updated_at = Set(now);
    let rejected = active.update(&state.db).await?;

    Ok(Json(JoinRequestResponse::from(rejected)))
}

#[utoipa::path(
    delete,
    path = "/join-requests/{request_id}",
    tag = "Join requests",
    operation_id = "cancelJoinRequest",
    summary = "Cancel a pending invitation",
    description = "The sender (or an admin) can withdraw an invitation before it is answered.",
    params(("request_id" = i32, Path, description = "Join request ID")),
    responses(
        (status = 200, description = "Cancelled", body = JoinRequestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the sender (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No pending invitation (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(request_id))]
pub async fn cancel_join_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
) -> Result<Json<JoinRequestResponse>, AppError> {
    let request = find_pending_request(&state.db, request_id).await?;
    if request.sender_id != auth_user.id && !access::is_admin(&auth_user) {
        return Err(AppError::PermissionDenied);
    }

    let now = chrono::Utc::now();
    let mut active: join_request::ActiveModel = request.into();
    active.status = Set(join_request::status::CANCELLED.into());
    active.responded_at = Set(Some(now));
    active.updated_at = Set(now);
    let cancelled = active.update(&state.db).await?;

    Ok(Json(JoinRequestResponse::from(cancelled)))
}

async fn find_pending_request<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<join_request::Model, AppError> {
    join_request::Entity::find_by_id(id)
        .filter(join_request::Column::Status.eq(join_request::status::PENDING))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No pending invitation found".into()))
}
