use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{hackathon_role, score, submission, team};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite or partial unique
/// indexes, so we create them manually on startup. These back the
/// conflict-on-insert handling in the handlers; without them a race can
/// slip past the read-side checks.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One active membership per user per hackathon. Left and removed rows
    // stay behind as history, so the index is partial.
    ensure(
        db,
        "uq_team_member_active",
        "CREATE UNIQUE INDEX IF NOT EXISTS \"uq_team_member_active\" \
         ON \"team_member\" (\"hackathon_id\", \"user_id\") \
         WHERE \"status\" = 'active'",
    )
    .await?;

    // At most one live subscription per user; terminal rows stay behind as
    // history.
    ensure(
        db,
        "uq_subscription_live",
        "CREATE UNIQUE INDEX IF NOT EXISTS \"uq_subscription_live\" \
         ON \"subscription\" (\"user_id\") \
         WHERE \"status\" IN ('created', 'authenticated', 'active')",
    )
    .await?;

    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_team_hackathon_name")
        .table(team::Entity)
        .col(team::Column::HackathonId)
        .col(team::Column::TeamName)
        .to_string(PostgresQueryBuilder);
    ensure(db, "uq_team_hackathon_name", &stmt).await?;

    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_submission_team_round")
        .table(submission::Entity)
        .col(submission::Column::TeamId)
        .col(submission::Column::RoundId)
        .to_string(PostgresQueryBuilder);
    ensure(db, "uq_submission_team_round", &stmt).await?;

    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_score_team_round_judge")
        .table(score::Entity)
        .col(score::Column::TeamId)
        .col(score::Column::RoundId)
        .col(score::Column::JudgeId)
        .to_string(PostgresQueryBuilder);
    ensure(db, "uq_score_team_round_judge", &stmt).await?;

    // One coordinator row and one judge row per (hackathon, user),
    // whatever their status.
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_hackathon_role_scope")
        .table(hackathon_role::Entity)
        .col(hackathon_role::Column::HackathonId)
        .col(hackathon_role::Column::UserId)
        .col(hackathon_role::Column::Kind)
        .to_string(PostgresQueryBuilder);
    ensure(db, "uq_hackathon_role_scope", &stmt).await?;

    Ok(())
}

async fn ensure(db: &DatabaseConnection, name: &str, stmt: &str) -> Result<(), DbErr> {
    db.execute_unprepared(stmt).await?;
    info!("Ensured index {} exists", name);
    Ok(())
}
