use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::email;
use crate::entity::user::{Role, subscription_status};
use crate::entity::{
    hackathon, hackathon_role, join_request, score, submission, team, team_member, user,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::hackathon::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::access;

#[utoipa::path(
    post,
    path = "/",
    tag = "Hackathons",
    operation_id = "createHackathon",
    summary = "Create a hackathon",
    description = "Creates a hackathon in draft status. Requires an active subscription with the `can_create_hackathons` feature; admins bypass the gate.",
    request_body = CreateHackathonRequest,
    responses(
        (status = 201, description = "Hackathon created", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Subscription gate (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateHackathonRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_hackathon(&payload)?;

    if !access::is_admin(&auth_user) && !state.config.billing.bypass_subscription_check {
        let user = find_user(&state.db, auth_user.id).await?;
        let active = user.subscription_status == subscription_status::ACTIVE;
        if !active || !user.features().can_create_hackathons {
            return Err(AppError::PermissionDenied);
        }
    }

    let now = chrono::Utc::now();
    let new_hackathon = hackathon::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        is_public: Set(payload.is_public),
        status: Set(hackathon::status::DRAFT.into()),
        organizer_id: Set(auth_user.id),
        registration_start: Set(payload.registration_start),
        registration_end: Set(payload.registration_end),
        event_start: Set(payload.event_start),
        event_end: Set(payload.event_end),
        min_members: Set(payload.min_members),
        max_members: Set(payload.max_members),
        max_teams: Set(payload.max_teams),
        current_registrations: Set(0),
        registration_fee: Set(payload.registration_fee),
        fee_currency: Set(payload.fee_currency.unwrap_or_else(|| "INR".into())),
        auto_accept_teams: Set(payload.auto_accept_teams),
        allow_team_name_change: Set(payload.allow_team_name_change),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_hackathon.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(HackathonResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Hackathons",
    operation_id = "listHackathons",
    summary = "List public hackathons",
    params(HackathonListQuery),
    responses(
        (status = 200, description = "Paginated list", body = HackathonListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_hackathons(
    State(state): State<AppState>,
    Query(query): Query<HackathonListQuery>,
) -> Result<Json<HackathonListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = hackathon::Entity::find().filter(hackathon::Column::IsPublic.eq(true));

    if let Some(ref status) = query.status {
        if !hackathon::status::ALL.contains(&status.as_str()) {
            return Err(AppError::Validation(format!(
                "status must be one of: {}",
                hackathon::status::ALL.join(", ")
            )));
        }
        select = select.filter(hackathon::Column::Status.eq(status));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(hackathon::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(hackathon::Column::EventStart)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(HackathonResponse::from)
        .collect();

    Ok(Json(HackathonListResponse {
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
    get,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "getHackathon",
    summary = "Get a hackathon by ID",
    description = "Private hackathons return 404 (not 403) to anyone but the organizer, invited staff, and admins.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Hackathon details", body = HackathonResponse),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_hackathon(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<HackathonResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    if !model.is_public {
        let viewer = auth_user.ok_or_else(not_found)?;
        let staff = access::is_admin(&viewer)
            || access::is_organizer(&model, &viewer)
            || hackathon_role::Entity::find()
                .filter(hackathon_role::Column::HackathonId.eq(model.id))
                .filter(hackathon_role::Column::UserId.eq(viewer.id))
                .one(&state.db)
                .await?
                .is_some();
        if !staff {
            return Err(not_found());
        }
    }
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "updateHackathon",
    summary = "Update a hackathon",
    description = "PATCH semantics: absent fields are untouched. Dates are re-validated against the merged row. Organizer or admin only.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = UpdateHackathonRequest,
    responses(
        (status = 200, description = "Updated hackathon", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateHackathonRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    validate_update_hackathon(&payload)?;

    let model = find_hackathon(&state.db, id).await?;
    access::require_organizer(&model, &auth_user)?;

    validate_effective_dates(
        payload.registration_start.unwrap_or(model.registration_start),
        payload.registration_end.unwrap_or(model.registration_end),
        payload.event_start.unwrap_or(model.event_start),
        payload.event_end.unwrap_or(model.event_end),
    )?;
    let min_members = payload.min_members.unwrap_or(model.min_members);
    let max_members = payload.max_members.unwrap_or(model.max_members);
    if min_members < 1 || max_members < min_members {
        return Err(AppError::Validation(
            "Member bounds must satisfy 1 <= min <= max".into(),
        ));
    }

    let mut active: hackathon::ActiveModel = model.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(is_public) = payload.is_public {
        active.is_public = Set(is_public);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(v) = payload.registration_start {
        active.registration_start = Set(v);
    }
    if let Some(v) = payload.registration_end {
        active.registration_end = Set(v);
    }
    if let Some(v) = payload.event_start {
        active.event_start = Set(v);
    }
    if let Some(v) = payload.event_end {
        active.event_end = Set(v);
    }
    if let Some(v) = payload.min_members {
        active.min_members = Set(v);
    }
    if let Some(v) = payload.max_members {
        active.max_members = Set(v);
    }
    if let Some(v) = payload.max_teams {
        active.max_teams = Set(v);
    }
    if let Some(v) = payload.registration_fee {
        active.registration_fee = Set(v);
    }
    if let Some(v) = payload.fee_currency {
        active.fee_currency = Set(v);
    }
    if let Some(v) = payload.auto_accept_teams {
        active.auto_accept_teams = Set(v);
    }
    if let Some(v) = payload.allow_team_name_change {
        active.allow_team_name_change = Set(v);
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "deleteHackathon",
    summary = "Delete a hackathon and its dependents",
    description = "Removes teams, memberships, submissions, scores, join requests and staff roles in one transaction. Organizer or admin only.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    access::require_organizer(&model, &auth_user)?;

    let txn = state.db.begin().await?;

    let team_ids = SeaQuery::select()
        .column(team::Column::Id)
        .from(team::Entity)
        .and_where(team::Column::HackathonId.eq(id))
        .to_owned();

    score::Entity::delete_many()
        .filter(score::Column::TeamId.in_subquery(team_ids.clone()))
        .exec(&txn)
        .await?;
    submission::Entity::delete_many()
        .filter(submission::Column::TeamId.in_subquery(team_ids))
        .exec(&txn)
        .await?;
    join_request::Entity::delete_many()
        .filter(join_request::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    team_member::Entity::delete_many()
        .filter(team_member::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    team::Entity::delete_many()
        .filter(team::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    hackathon_role::Entity::delete_many()
        .filter(hackathon_role::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    hackathon::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/my/organized",
    tag = "Hackathons",
    operation_id = "myOrganizedHackathons",
    summary = "List hackathons organized by the caller",
    responses(
        (status = 200, description = "Hackathons", body = HackathonListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn my_organized(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<HackathonListResponse>, AppError> {
    let data: Vec<HackathonResponse> = hackathon::Entity::find()
        .filter(hackathon::Column::OrganizerId.eq(auth_user.id))
        .order_by_desc(hackathon::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(HackathonResponse::from)
        .collect();

    let total = data.len() as u64;
    Ok(Json(HackathonListResponse {
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
    path = "/my/coordinations",
    tag = "Hackathons",
    operation_id = "myCoordinations",
    summary = "List hackathons the caller coordinates",
    description = "Accepted coordinator assignments joined to their hackathons.",
    responses(
        (status = 200, description = "Coordinations", body = CoordinationListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn my_coordinations(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CoordinationListResponse>, AppError> {
    let rows = hackathon_role::Entity::find()
        .filter(hackathon_role::Column::UserId.eq(auth_user.id))
        .filter(hackathon_role::Column::Kind.eq(hackathon_role::kind::COORDINATOR))
        .filter(hackathon_role::Column::Status.eq(hackathon_role::status::ACCEPTED))
        .find_also_related(hackathon::Entity)
        .all(&state.db)
        .await?;

    let data = rows
        .into_iter()
        .filter_map(|(role, hackathon)| {
            hackathon.map(|h| CoordinationResponse {
                role: role.into(),
                hackathon: h.into(),
            })
        })
        .collect();

    Ok(Json(CoordinationListResponse { data }))
}

// ---------------------------------------------------------------------------
// Coordinator and judge lifecycle
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/{id}/coordinators/invite",
    tag = "Hackathon staff",
    operation_id = "inviteCoordinator",
    summary = "Invite a coordinator",
    description = "Organizer or admin only. The invitee must already have an account; a row of any status for this hackathon and kind is a conflict.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = InviteCoordinatorRequest,
    responses(
        (status = 201, description = "Invitation created", body = RoleResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already invited (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn invite_coordinator(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<InviteCoordinatorRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = payload
        .permissions
        .unwrap_or_else(hackathon_role::CoordinatorPermissions::standard);
    let permissions =
        serde_json::to_value(permissions).map_err(|e| AppError::Internal(e.to_string()))?;
    invite(
        &state,
        &auth_user,
        id,
        &payload.user,
        hackathon_role::kind::COORDINATOR,
        Some(permissions),
    )
    .await
}

#[utoipa::path(
    post,
    path = "/{id}/judges/invite",
    tag = "Hackathon staff",
    operation_id = "inviteJudge",
    summary = "Invite a judge",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = InviteJudgeRequest,
    responses(
        (status = 201, description = "Invitation created", body = RoleResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already invited (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn invite_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<InviteJudgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    invite(
        &state,
        &auth_user,
        id,
        &payload.user,
        hackathon_role::kind::JUDGE,
        None,
    )
    .await
}

async fn invite(
    state: &AppState,
    auth_user: &AuthUser,
    hackathon_id: i32,
    identifier: &str,
    kind: &str,
    permissions: Option<serde_json::Value>,
) -> Result<(StatusCode, Json<RoleResponse>), AppError> {
    let model = find_hackathon(&state.db, hackathon_id).await?;
    access::require_organizer(&model, auth_user)?;

    let invitee = find_user_by_identifier(&state.db, identifier).await?;

    let existing = hackathon_role::Entity::find()
        .filter(hackathon_role::Column::HackathonId.eq(hackathon_id))
        .filter(hackathon_role::Column::UserId.eq(invitee.id))
        .filter(hackathon_role::Column::Kind.eq(kind))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "User already has a {kind} invitation for this hackathon"
        )));
    }

    let now = chrono::Utc::now();
    let row = hackathon_role::ActiveModel {
        hackathon_id: Set(hackathon_id),
        user_id: Set(invitee.id),
        kind: Set(kind.into()),
        status: Set(hackathon_role::status::PENDING.into()),
        permissions: Set(permissions),
        invited_by: Set(auth_user.id),
        invited_at: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let row = row.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("User already invited".into())
        }
        _ => AppError::from(e),
    })?;

    email::send_best_effort(
        state.email.as_ref(),
        &invitee.email,
        &format!("You have been invited as a {kind} for {}", model.title),
        &format!(
            "<p>Hi {},</p><p>You have been invited as a {kind} for <b>{}</b>. \
             Log in to accept or decline.</p>",
            invitee.full_name, model.title
        ),
    )
    .await;

    Ok((StatusCode::CREATED, Json(row.into())))
}

#[utoipa::path(
    post,
    path = "/{id}/coordinators/accept",
    tag = "Hackathon staff",
    operation_id = "acceptCoordinatorInvite",
    summary = "Accept a coordinator invitation",
    description = "Also grants the global coordinator role if the user does not hold it yet.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Accepted", body = RoleResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No pending invitation (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn accept_coordinator(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RoleResponse>, AppError> {
    respond_invitation(
        &state,
        &auth_user,
        id,
        hackathon_role::kind::COORDINATOR,
        true,
    )
    .await
}

#[utoipa::path(
    post,
    path = "/{id}/coordinators/decline",
    tag = "Hackathon staff",
    operation_id = "declineCoordinatorInvite",
    summary = "Decline a coordinator invitation",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Declined", body = RoleResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No pending invitation (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn decline_coordinator(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RoleResponse>, AppError> {
    respond_invitation(
        &state,
        &auth_user,
        id,
        hackathon_role::kind::COORDINATOR,
        false,
    )
    .await
}

#[utoipa::path(
    post,
    path = "/{id}/judges/accept",
    tag = "Hackathon staff",
    operation_id = "acceptJudgeInvite",
    summary = "Accept a judge invitation",
    description = "Also grants the global judge role if the user does not hold it yet.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Accepted", body = RoleResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No pending invitation (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn accept_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RoleResponse>, AppError> {
    respond_invitation(&state, &auth_user, id, hackathon_role::kind::JUDGE, true).await
}

#[utoipa::path(
    post,
    path = "/{id}/judges/decline",
    tag = "Hackathon staff",
    operation_id = "declineJudgeInvite",
    summary = "Decline a judge invitation",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Declined", body = RoleResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No pending invitation (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn decline_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RoleResponse>, AppError> {
    respond_invitation(&state, &auth_user, id, hackathon_role::kind::JUDGE, false).await
}

async fn respond_invitation(
    state: &AppState,
    auth_user: &AuthUser,
    hackathon_id: i32,
    kind: &str,
    accept: bool,
) -> Result<Json<RoleResponse>, AppError> {
    let txn = state.db.begin().await?;

    let row = hackathon_role::Entity::find()
        .filter(hackathon_role::Column::HackathonId.eq(hackathon_id))
        .filter(hackathon_role::Column::UserId.eq(auth_user.id))
        .filter(hackathon_role::Column::Kind.eq(kind))
        .filter(hackathon_role::Column::Status.eq(hackathon_role::status::PENDING))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("No pending invitation".into()))?;

    let now = chrono::Utc::now();
    let mut active: hackathon_role::ActiveModel = row.into();
    active.status = Set(if accept {
        hackathon_role::status::ACCEPTED.into()
    } else {
        hackathon_role::status::DECLINED.into()
    });
    active.responded_at = Set(Some(now));
    active.updated_at = Set(now);
    let row = active.update(&txn).await?;

    if accept {
        let granted = match kind {
            hackathon_role::kind::COORDINATOR => Role::Coordinator,
            _ => Role::Judge,
        };
        let user = user::Entity::find_by_id(auth_user.id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        if !user.has_role(granted) {
            let mut roles = user.roles();
            roles.push(granted);
            let mut active: user::ActiveModel = user.into();
            active.roles = Set(user::roles_to_json(&roles));
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }
    }

    txn.commit().await?;
    Ok(Json(row.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/coordinators/{user_id}/permissions",
    tag = "Hackathon staff",
    operation_id = "updateCoordinatorPermissions",
    summary = "Replace a coordinator's permission set",
    params(
        ("id" = i32, Path, description = "Hackathon ID"),
        ("user_id" = i32, Path, description = "Coordinator's user ID"),
    ),
    request_body = UpdatePermissionsRequest,
    responses(
        (status = 200, description = "Updated", body = RoleResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No coordinator row (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id))]
pub async fn update_coordinator_permissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdatePermissionsRequest>,
) -> Result<Json<RoleResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    access::require_organizer(&model, &auth_user)?;

    let row = hackathon_role::Entity::find()
        .filter(hackathon_role::Column::HackathonId.eq(id))
        .filter(hackathon_role::Column::UserId.eq(user_id))
        .filter(hackathon_role::Column::Kind.eq(hackathon_role::kind::COORDINATOR))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Coordinator not found".into()))?;

    let mut active: hackathon_role::ActiveModel = row.into();
    active.permissions = Set(Some(
        serde_json::to_value(payload.permissions).map_err(|e| AppError::Internal(e.to_string()))?,
    ));
    active.updated_at = Set(chrono::Utc::now());
    let row = active.update(&state.db).await?;

    Ok(Json(row.into()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found() -> AppError {
    AppError::NotFound("Hackathon not found".into())
}

pub(crate) async fn find_hackathon<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub(crate) async fn find_hackathon_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    use sea_orm::sea_query::LockType;
    hackathon::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(not_found)
}

pub(crate) async fn find_user<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn find_user_by_identifier<C: ConnectionTrait>(
    db: &C,
    identifier: &str,
) -> Result<user::Model, AppError> {
    let identifier = identifier.trim().to_lowercase();
    user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(identifier.clone()))
                .add(user::Column::Email.eq(identifier)),
        )
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
