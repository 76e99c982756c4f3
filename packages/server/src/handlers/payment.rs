use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::email;
use crate::entity::user::{SubscriptionFeatures, subscription_status};
use crate::entity::{payment, subscription, subscription_plan, team, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::gateway::{OrderRequest, PlanRequest};
use crate::handlers::hackathon::{find_hackathon, find_user};
use crate::handlers::team::{find_team, find_team_for_update, require_active_member};
use crate::models::payment::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/orders",
    tag = "Payments",
    operation_id = "createOrder",
    summary = "Create a gateway order for a team's registration fee",
    description = "Active members only. Nothing is marked paid here; the local payment row stays `created` until the signature is verified.",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Nothing to pay (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already paid (CONFLICT)", body = ErrorBody),
        (status = 502, description = "Gateway failure (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(team_id = payload.team_id))]
pub async fn create_order(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let team = find_team(&state.db, payload.team_id).await?;
    require_active_member(&state.db, team.id, auth_user.id).await?;

    if team.payment_status == team::payment_status::COMPLETED {
        return Err(AppError::Conflict(
            "Registration fee is already paid".into(),
        ));
    }
    let hackathon = find_hackathon(&state.db, team.hackathon_id).await?;
    if hackathon.registration_fee == 0 {
        return Err(AppError::InvalidState(
            "This hackathon has no registration fee".into(),
        ));
    }

    // The gateway call happens before any local write so a failure leaves
    // nothing to clean up.
    let order = state
        .gateway
        .create_order(&OrderRequest {
            amount: hackathon.registration_fee,
            currency: hackathon.fee_currency.clone(),
            receipt: format!("team_{}", team.id),
        })
        .await?;

    let now = chrono::Utc::now();
    let row = payment::ActiveModel {
        user_id: Set(auth_user.id),
        kind: Set(payment::kind::HACKATHON_REGISTRATION.into()),
        hackathon_id: Set(Some(hackathon.id)),
        team_id: Set(Some(team.id)),
        amount: Set(hackathon.registration_fee),
        currency: Set(hackathon.fee_currency.clone()),
        status: Set(payment::status::CREATED.into()),
        gateway_order_id: Set(Some(order.id.clone())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let row = row.insert(&state.db).await?;

    let mut team_active: team::ActiveModel = team.into();
    team_active.gateway_order_id = Set(Some(order.id.clone()));
    team_active.updated_at = Set(now);
    team_active.update(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            payment_id: row.id,
            gateway_order_id: order.id,
            amount: hackathon.registration_fee,
            currency: hackathon.fee_currency,
            status: order.status,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/verify",
    tag = "Payments",
    operation_id = "verifyPayment",
    summary = "Verify a checkout signature and mark the fee paid",
    description = "The signature is checked before any write. On success the team's payment completes and, if the hackathon auto-accepts, the team is approved.",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified", body = PaymentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Bad signature or not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already paid (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(team_id = payload.team_id, order_id = %payload.order_id))]
pub async fn verify_payment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyPaymentRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    validate_verify_payment(&payload)?;

    if !state.gateway.verify_payment_signature(
        &payload.order_id,
        &payload.payment_id,
        &payload.signature,
    ) {
        tracing::warn!("Payment signature mismatch");
        return Err(AppError::PermissionDenied);
    }

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let team = find_team_for_update(&txn, payload.team_id).await?;
    require_active_member(&txn, team.id, auth_user.id).await?;

    if team.payment_status == team::payment_status::COMPLETED {
        return Err(AppError::Conflict(
            "Registration fee is already paid".into(),
        ));
    }
    if team.gateway_order_id.as_deref() != Some(payload.order_id.as_str()) {
        return Err(AppError::Validation(
            "Order does not belong to this team".into(),
        ));
    }

    let payment_row = payment::Entity::find()
        .filter(payment::Column::GatewayOrderId.eq(payload.order_id.clone()))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".into()))?;

    let mut payment_active: payment::ActiveModel = payment_row.into();
    payment_active.status = Set(payment::status::CAPTURED.into());
    payment_active.gateway_payment_id = Set(Some(payload.payment_id.clone()));
    payment_active.gateway_signature = Set(Some(payload.signature.clone()));
    payment_active.updated_at = Set(now);
    let payment_row = payment_active.update(&txn).await?;

    let hackathon = find_hackathon(&txn, team.hackathon_id).await?;
    let leader_id = team.leader_id;
    let team_name = team.team_name.clone();
    let was_pending = team.registration_status == team::registration_status::PENDING;

    let mut team_active: team::ActiveModel = team.into();
    team_active.payment_status = Set(team::payment_status::COMPLETED.into());
    team_active.gateway_payment_id = Set(Some(payload.payment_id));
    team_active.gateway_signature = Set(Some(payload.signature));
    team_active.paid_at = Set(Some(now));
    team_active.paid_by = Set(Some(auth_user.id));
    if was_pending && hackathon.auto_accept_teams {
        team_active.registration_status = Set(team::registration_status::APPROVED.into());
        team_active.approved_at = Set(Some(now));
    }
    team_active.updated_at = Set(now);
    team_active.update(&txn).await?;

    txn.commit().await?;

    let leader = find_user(&state.db, leader_id).await?;
    email::send_best_effort(
        state.email.as_ref(),
        &leader.email,
        &format!("Payment received for {}", hackathon.title),
        &format!(
            "<p>Hi {},</p><p>The registration fee for team <b>{team_name}</b> has been received.</p>",
            leader.full_name
        ),
    )
    .await;

    Ok(Json(PaymentResponse::from(payment_row)))
}

#[utoipa::path(
    get,
    path = "/plans",
    tag = "Payments",
    operation_id = "listPlans",
    summary = "List active subscription plans",
    responses(
        (status = 200, description = "Plans", body = PlanListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<PlanListResponse>, AppError> {
    let plans = subscription_plan::Entity::find()
        .filter(subscription_plan::Column::IsActive.eq(true))
        .order_by_asc(subscription_plan::Column::SortOrder)
        .order_by_asc(subscription_plan::Column::PriceAmount)
        .all(&state.db)
        .await?;

    Ok(Json(PlanListResponse {
        data: plans.into_iter().map(PlanResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/plans",
    tag = "Payments",
    operation_id = "createPlan",
    summary = "Create a subscription plan",
    description = "Admin only. The gateway plan is created first; the catalog row is only written once the gateway id exists.",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan created", body = PlanResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Plan name taken (CONFLICT)", body = ErrorBody),
        (status = 502, description = "Gateway failure (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_plan(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePlanRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_plan(&payload)?;

    let currency = payload.currency.unwrap_or_else(|| "INR".into());
    let period = gateway_period(&payload.billing_cycle)?;

    let gateway_plan_id = state
        .gateway
        .create_plan(&PlanRequest {
            name: payload.display_name.clone(),
            description: payload.description.clone(),
            amount: payload.price_amount,
            currency: currency.clone(),
            period: period.into(),
        })
        .await?;

    let now = chrono::Utc::now();
    let row = subscription_plan::ActiveModel {
        name: Set(payload.name.trim().to_lowercase()),
        display_name: Set(payload.display_name.trim().to_string()),
        description: Set(payload.description),
        price_amount: Set(payload.price_amount),
        currency: Set(currency),
        billing_cycle: Set(payload.billing_cycle),
        gateway_plan_id: Set(gateway_plan_id),
        features: Set(serde_json::to_value(&payload.features)
            .map_err(|e| AppError::Internal(e.to_string()))?),
        is_active: Set(true),
        sort_order: Set(payload.sort_order),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let row = row.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Plan name already exists".into())
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(PlanResponse::from(row))))
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "Payments",
    operation_id = "subscribe",
    summary = "Subscribe to a plan",
    description = "One live subscription per user. The returned gateway subscription id goes to the browser checkout SDK for authorization; activation arrives via webhook.",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Plan not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "A live subscription exists (CONFLICT)", body = ErrorBody),
        (status = 502, description = "Gateway failure (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(plan_id = payload.plan_id))]
pub async fn subscribe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubscribeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let plan = subscription_plan::Entity::find_by_id(payload.plan_id)
        .filter(subscription_plan::Column::IsActive.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plan not found".into()))?;

    let live = subscription::Entity::find()
        .filter(subscription::Column::UserId.eq(auth_user.id))
        .filter(subscription::Column::Status.is_in(subscription::status::LIVE.to_vec()))
        .count(&state.db)
        .await?;
    if live > 0 {
        return Err(AppError::Conflict(
            "You already have a live subscription".into(),
        ));
    }

    let total_count = cycles_per_year(&plan.billing_cycle);
    let gateway_sub = state
        .gateway
        .create_subscription(&plan.gateway_plan_id, total_count)
        .await?;

    let now = chrono::Utc::now();
    let row = subscription::ActiveModel {
        user_id: Set(auth_user.id),
        plan_id: Set(plan.id),
        status: Set(subscription::status::CREATED.into()),
        gateway_subscription_id: Set(gateway_sub.id.clone()),
        paid_count: Set(0),
        total_count: Set(total_count as i32),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let row = row.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("You already have a live subscription".into())
        }
        _ => AppError::from(e),
    })?;

    let user = find_user(&state.db, auth_user.id).await?;
    let mut user_active: user::ActiveModel = user.into();
    user_active.subscription_plan = Set(plan.name.clone());
    user_active.subscription_status = Set(subscription_status::CREATED.into());
    user_active.gateway_subscription_id = Set(Some(gateway_sub.id));
    user_active.subscription_features = Set(plan.features.clone());
    user_active.updated_at = Set(now);
    user_active.update(&state.db).await?;

    Ok((StatusCode::CREATED, Json(SubscriptionResponse::from(row))))
}

#[utoipa::path(
    post,
    path = "/subscriptions/cancel",
    tag = "Payments",
    operation_id = "cancelSubscription",
    summary = "Cancel the caller's live subscription",
    request_body = CancelSubscriptionRequest,
    responses(
        (status = 200, description = "Cancelled", body = SubscriptionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No live subscription (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Gateway failure (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn cancel_subscription(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CancelSubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, AppError> {
    let sub = subscription::Entity::find()
        .filter(subscription::Column::UserId.eq(auth_user.id))
        .filter(subscription::Column::Status.is_in(subscription::status::LIVE.to_vec()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No live subscription found".into()))?;

    state
        .gateway
        .cancel_subscription(&sub.gateway_subscription_id, payload.at_cycle_end)
        .await?;

    let now = chrono::Utc::now();
    let mut active: subscription::ActiveModel = sub.into();
    active.status = Set(subscription::status::CANCELLED.into());
    active.cancelled_at = Set(Some(now));
    active.updated_at = Set(now);
    let cancelled = active.update(&state.db).await?;

    let user = find_user(&state.db, auth_user.id).await?;
    let mut user_active: user::ActiveModel = user.into();
    user_active.subscription_status = Set(subscription_status::CANCELLED.into());
    user_active.updated_at = Set(now);
    user_active.update(&state.db).await?;

    Ok(Json(SubscriptionResponse::from(cancelled)))
}

#[utoipa::path(
    post,
    path = "/webhook",
    tag = "Payments",
    operation_id = "paymentWebhook",
    summary = "Gateway webhook receiver",
    description = "The HMAC signature over the raw body is checked before anything is parsed. Events for unknown gateway ids are acknowledged without effect; handlers are idempotent because the gateway retries.",
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 400, description = "Malformed payload (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Bad signature (PERMISSION_DENIED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers, body))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers
        .get("x-razorpay-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::PermissionDenied)?;

    if !state.gateway.verify_webhook_signature(&body, signature) {
        tracing::warn!("Webhook signature mismatch");
        return Err(AppError::PermissionDenied);
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|_| AppError::Validation("Malformed webhook payload".into()))?;

    tracing::info!(event = %event.event, "Webhook received");
    match event.event.as_str() {
        "subscription.activated" => {
            apply_subscription_transition(
                &state,
                &event,
                subscription::status::ACTIVE,
                subscription_status::ACTIVE,
            )
            .await?
        }
        "subscription.charged" => subscription_charged(&state, &event).await?,
        "subscription.cancelled" => {
            apply_subscription_transition(
                &state,
                &event,
                subscription::status::CANCELLED,
                subscription_status::CANCELLED,
            )
            .await?
        }
        "subscription.paused" => {
            apply_subscription_transition(
                &state,
                &event,
                subscription::status::PAUSED,
                subscription_status::PAUSED,
            )
            .await?
        }
        "subscription.resumed" => {
            apply_subscription_transition(
                &state,
                &event,
                subscription::status::ACTIVE,
                subscription_status::ACTIVE,
            )
            .await?
        }
        "subscription.completed" => {
            apply_subscription_transition(
                &state,
                &event,
                subscription::status::COMPLETED,
                subscription_status::EXPIRED,
            )
            .await?
        }
        "payment.captured" => payment_event(&state, &event, payment::status::CAPTURED).await?,
        "payment.failed" => payment_event(&state, &event, payment::status::FAILED).await?,
        other => {
            tracing::info!(event = other, "Ignoring unrecognized webhook event");
        }
    }

    Ok(StatusCode::OK)
}

/// Moves a subscription (and the owner's snapshot) to the given statuses.
/// A missing gateway id is acknowledged silently; retries of the same event
/// are no-ops.
async fn apply_subscription_transition(
    state: &AppState,
    event: &WebhookEvent,
    sub_status: &str,
    user_status: &str,
) -> Result<(), AppError> {
    let Some(gateway_id) = event.entity_str("subscription", "id") else {
        return Ok(());
    };
    let Some(sub) = find_subscription_by_gateway_id(&state.db, gateway_id).await? else {
        tracing::info!(gateway_id, "Webhook for unknown subscription");
        return Ok(());
    };
    if sub.status == sub_status {
        return Ok(());
    }

    let now = chrono::Utc::now();
    let user_id = sub.user_id;
    let first_activation = sub.started_at.is_none() && sub_status == subscription::status::ACTIVE;

    let mut active: subscription::ActiveModel = sub.into();
    active.status = Set(sub_status.into());
    if first_activation {
        active.started_at = Set(Some(now));
    }
    if let Some(start) = event.entity_i64("subscription", "current_start") {
        active.current_period_start = Set(chrono::DateTime::from_timestamp(start, 0));
    }
    if let Some(end) = event.entity_i64("subscription", "current_end") {
        active.current_period_end = Set(chrono::DateTime::from_timestamp(end, 0));
    }
    if sub_status == subscription::status::CANCELLED {
        active.cancelled_at = Set(Some(now));
    }
    active.updated_at = Set(now);
    active.update(&state.db).await?;

    let user = find_user(&state.db, user_id).await?;
    let mut user_active: user::ActiveModel = user.into();
    user_active.subscription_status = Set(user_status.into());
    if user_status == subscription_status::EXPIRED || user_status == subscription_status::CANCELLED
    {
        user_active.subscription_plan = Set("free".into());
        user_active.subscription_features = Set(serde_json::to_value(
            SubscriptionFeatures::default(),
        )
        .map_err(|e| AppError::Internal(e.to_string()))?);
    }
    user_active.updated_at = Set(now);
    user_active.update(&state.db).await?;
    Ok(())
}

/// Records a cycle charge: bumps `paid_count`, refreshes the period window
/// and writes a captured payment row for the user's ledger.
async fn subscription_charged(state: &AppState, event: &WebhookEvent) -> Result<(), AppError> {
    let Some(gateway_id) = event.entity_str("subscription", "id") else {
        return Ok(());
    };
    let Some(sub) = find_subscription_by_gateway_id(&state.db, gateway_id).await? else {
        tracing::info!(gateway_id, "Charge for unknown subscription");
        return Ok(());
    };

    let gateway_payment_id = event.entity_str("payment", "id").map(str::to_string);
    if let Some(ref pid) = gateway_payment_id {
        let seen = payment::Entity::find()
            .filter(payment::Column::GatewayPaymentId.eq(pid.clone()))
            .count(&state.db)
            .await?;
        if seen > 0 {
            return Ok(());
        }
    }

    let now = chrono::Utc::now();
    // Minor units on the wire.
    let amount = event.entity_i64("payment", "amount").unwrap_or(0) / 100;
    let currency = event
        .entity_str("payment", "currency")
        .unwrap_or("INR")
        .to_string();

    let row = payment::ActiveModel {
        user_id: Set(sub.user_id),
        kind: Set(payment::kind::SUBSCRIPTION.into()),
        subscription_id: Set(Some(sub.id)),
        amount: Set(amount),
        currency: Set(currency),
        status: Set(payment::status::CAPTURED.into()),
        gateway_payment_id: Set(gateway_payment_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    row.insert(&state.db).await?;

    let user_id = sub.user_id;
    let paid_count = sub.paid_count;
    let started = sub.started_at;
    let mut active: subscription::ActiveModel = sub.into();
    active.status = Set(subscription::status::ACTIVE.into());
    active.paid_count = Set(paid_count + 1);
    if started.is_none() {
        active.started_at = Set(Some(now));
    }
    if let Some(start) = event.entity_i64("subscription", "current_start") {
        active.current_period_start = Set(chrono::DateTime::from_timestamp(start, 0));
    }
    if let Some(end) = event.entity_i64("subscription", "current_end") {
        active.current_period_end = Set(chrono::DateTime::from_timestamp(end, 0));
    }
    active.updated_at = Set(now);
    active.update(&state.db).await?;

    let user = find_user(&state.db, user_id).await?;
    let mut user_active: user::ActiveModel = user.into();
    user_active.subscription_status = Set(subscription_status::ACTIVE.into());
    user_active.updated_at = Set(now);
    user_active.update(&state.db).await?;
    Ok(())
}

/// Settles a registration payment row from a webhook, covering clients that
/// never call the verify endpoint.
async fn payment_event(
    state: &AppState,
    event: &WebhookEvent,
    new_status: &str,
) -> Result<(), AppError> {
    let Some(order_id) = event.entity_str("payment", "order_id") else {
        return Ok(());
    };
    let Some(row) = payment::Entity::find()
        .filter(payment::Column::GatewayOrderId.eq(order_id))
        .one(&state.db)
        .await?
    else {
        tracing::info!(order_id, "Webhook for unknown order");
        return Ok(());
    };
    // Terminal rows stay put; verify() may have landed first.
    if row.status == payment::status::CAPTURED || row.status == new_status {
        return Ok(());
    }

    let now = chrono::Utc::now();
    let mut active: payment::ActiveModel = row.into();
    active.status = Set(new_status.into());
    if let Some(pid) = event.entity_str("payment", "id") {
        active.gateway_payment_id = Set(Some(pid.to_string()));
    }
    if new_status == payment::status::FAILED
        && let Some(reason) = event.entity_str("payment", "error_description")
    {
        active.failure_reason = Set(Some(reason.to_string()));
    }
    active.updated_at = Set(now);
    active.update(&state.db).await?;
    Ok(())
}

async fn find_subscription_by_gateway_id<C: ConnectionTrait>(
    db: &C,
    gateway_id: &str,
) -> Result<Option<subscription::Model>, DbErr> {
    subscription::Entity::find()
        .filter(subscription::Column::GatewaySubscriptionId.eq(gateway_id))
        .one(db)
        .await
}

fn gateway_period(billing_cycle: &str) -> Result<&'static str, AppError> {
    use crate::entity::subscription_plan::billing_cycle as cycle;
    match billing_cycle {
        cycle::MONTHLY => Ok("monthly"),
        cycle::QUARTERLY => Ok("quarterly"),
        cycle::YEARLY => Ok("yearly"),
        other => Err(AppError::Validation(format!(
            "Unknown billing cycle: {other}"
        ))),
    }
}

/// Gateway subscriptions are created for one year's worth of cycles.
fn cycles_per_year(billing_cycle: &str) -> u32 {
    use crate::entity::subscription_plan::billing_cycle as cycle;
    match billing_cycle {
        cycle::QUARTERLY => 4,
        cycle::YEARLY => 1,
        _ => 12,
    }
}
