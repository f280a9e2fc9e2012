// src/gamification/mod.rs

//! Points, streaks, badges and ranking.
//!
//! The submodules are pure; this module applies them to the database. Rewards
//! are best-effort: `award_points` and `evaluate_badges` log and swallow
//! failures so a graded attempt is never rolled back or hidden.

pub mod badges;
pub mod points;
pub mod ranking;
pub mod standing;
pub mod streak;

use std::collections::HashSet;

use chrono::Utc;
use sqlx::PgPool;

use crate::models::user::ROLE_STUDENT;

use self::{
    badges::{BadgeSnapshot, CatalogBadge, select_awards},
    points::{Pacing, PointsAward},
    ranking::{RankCandidate, assign_ranks},
    standing::Standing,
};

/// Awards points for a committed attempt, updates the streak and stores the
/// award on the attempt row. Returns the points awarded, or 0 on any failure.
pub async fn award_points(
    pool: &PgPool,
    user_id: i64,
    attempt_id: i64,
    score: i32,
    total: i32,
    time_taken: Option<i32>,
    pacing: &Pacing,
) -> i32 {
    let award = points::calculate(score, total, time_taken, pacing);

    match apply_award(pool, user_id, attempt_id, award).await {
        Ok(standing) => {
            tracing::info!(
                user_id,
                attempt_id,
                points = award.total(),
                total_points = standing.total_points,
                streak_days = standing.streak_days,
                "points awarded"
            );
            award.total()
        }
        Err(e) => {
            tracing::error!(user_id, attempt_id, "Failed to award points: {:?}", e);
            0
        }
    }
}

async fn apply_award(
    pool: &PgPool,
    user_id: i64,
    attempt_id: i64,
    award: PointsAward,
) -> Result<Standing, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Lock the row so concurrent submissions by the same user serialise here.
    let prior = sqlx::query_as::<_, Standing>(
        r#"
        SELECT total_points, streak_days, last_activity, rank
        FROM users
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let next = prior.record_attempt(award.total(), Utc::now());

    sqlx::query(
        r#"
        UPDATE users
        SET total_points = $2, streak_days = $3, last_activity = $4
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(next.total_points)
    .bind(next.streak_days)
    .bind(next.last_activity)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE mcq_attempts SET points_earned = $2 WHERE id = $1")
        .bind(attempt_id)
        .bind(award.total())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(next)
}

/// Awards every badge the user newly qualifies for. Returns the names of the
/// badges inserted by this call; failures are logged and yield an empty list.
pub async fn evaluate_badges(pool: &PgPool, user_id: i64) -> Vec<String> {
    match try_evaluate_badges(pool, user_id).await {
        Ok(names) => names,
        Err(e) => {
            tracing::error!(user_id, "Failed to evaluate badges: {:?}", e);
            Vec::new()
        }
    }
}

async fn try_evaluate_badges(pool: &PgPool, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
    let Some(snapshot) = sqlx::query_as::<_, BadgeSnapshot>(
        r#"
        SELECT
            u.total_points,
            u.streak_days,
            (SELECT COUNT(*) FROM mcq_attempts ma WHERE ma.user_id = u.id) AS total_attempts,
            (SELECT MAX(ma.score::FLOAT8 * 100 / NULLIF(ma.total, 0))
               FROM mcq_attempts ma WHERE ma.user_id = u.id) AS best_percentage
        FROM users u
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(Vec::new());
    };

    let catalog = sqlx::query_as::<_, CatalogBadge>("SELECT id, code, name FROM badges ORDER BY id")
        .fetch_all(pool)
        .await?;

    let earned: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT badge_id FROM user_badges WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    let mut awarded = Vec::new();
    for badge in select_awards(&catalog, &earned, &snapshot) {
        let result = sqlx::query(
            "INSERT INTO user_badges (user_id, badge_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(badge.id)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(user_id, badge = %badge.name, "badge awarded");
            awarded.push(badge.name.clone());
        }
    }

    Ok(awarded)
}

/// Recomputes `rank` for every active student in one statement.
/// Inactive students and admins keep whatever rank they had.
pub async fn recompute_rankings(pool: &PgPool) -> Result<usize, sqlx::Error> {
    let candidates = sqlx::query_as::<_, RankCandidate>(
        r#"
        SELECT id AS user_id, total_points
        FROM users
        WHERE role = $1 AND is_active = TRUE
        "#,
    )
    .bind(ROLE_STUDENT)
    .fetch_all(pool)
    .await?;

    let (ids, ranks): (Vec<i64>, Vec<i32>) = assign_ranks(candidates)
        .into_iter()
        .map(|a| (a.user_id, a.rank))
        .unzip();

    sqlx::query(
        r#"
        UPDATE users u
        SET rank = r.new_rank
        FROM UNNEST($1::BIGINT[], $2::INT[]) AS r(id, new_rank)
        WHERE u.id = r.id
        "#,
    )
    .bind(&ids[..])
    .bind(&ranks[..])
    .execute(pool)
    .await?;

    tracing::info!(ranked = ids.len(), "leaderboard rankings recomputed");
    Ok(ids.len())
}
