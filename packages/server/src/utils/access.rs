//! Hackathon-scoped authorization checks. Global admins pass every check;
//! everything else is decided by the `hackathon_role` table.

use sea_orm::*;

use crate::entity::hackathon;
use crate::entity::hackathon_role::{self, CoordinatorPermissions};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;

/// True when the caller holds a platform-wide admin role.
pub fn is_admin(user: &AuthUser) -> bool {
    user.roles.iter().any(|r| r.is_admin())
}

pub fn is_organizer(hackathon: &hackathon::Model, user: &AuthUser) -> bool {
    hackathon.organizer_id == user.id
}

pub fn require_organizer(hackathon: &hackathon::Model, user: &AuthUser) -> Result<(), AppError> {
    if is_admin(user) || is_organizer(hackathon, user) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Fetch the caller's accepted role row of the given kind, if any.
pub async fn accepted_role<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
    user_id: i32,
    kind: &str,
) -> Result<Option<hackathon_role::Model>, DbErr> {
    hackathon_role::Entity::find()
        .filter(hackathon_role::Column::HackathonId.eq(hackathon_id))
        .filter(hackathon_role::Column::UserId.eq(user_id))
        .filter(hackathon_role::Column::Kind.eq(kind))
        .filter(hackathon_role::Column::Status.eq(hackathon_role::status::ACCEPTED))
        .one(db)
        .await
}

/// Organizer and admins always pass; coordinators pass when their permission
/// set satisfies `check`.
pub async fn require_coordinator_permission<C: ConnectionTrait>(
    db: &C,
    hackathon: &hackathon::Model,
    user: &AuthUser,
    check: impl Fn(&CoordinatorPermissions) -> bool,
) -> Result<(), AppError> {
    if is_admin(user) || is_organizer(hackathon, user) {
        return Ok(());
    }
    let role = accepted_role(db, hackathon.id, user.id, hackathon_role::kind::COORDINATOR).await?;
    match role {
        Some(role) if check(&role.permissions()) => Ok(()),
        _ => Err(AppError::PermissionDenied),
    }
}

/// True when the caller may score teams: an accepted judge assignment, the
/// organizer, or a global admin.
pub async fn can_judge<C: ConnectionTrait>(
    db: &C,
    hackathon: &hackathon::Model,
    user: &AuthUser,
) -> Result<bool, DbErr> {
    if is_admin(user) || is_organizer(hackathon, user) {
        return Ok(true);
    }
    Ok(
        accepted_role(db, hackathon.id, user.id, hackathon_role::kind::JUDGE)
            .await?
            .is_some(),
    )
}

/// True when the caller holds an accepted coordinator assignment.
pub async fn is_accepted_coordinator<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
    user_id: i32,
) -> Result<bool, DbErr> {
    Ok(
        accepted_role(db, hackathon_id, user_id, hackathon_role::kind::COORDINATOR)
            .await?
            .is_some(),
    )
}
