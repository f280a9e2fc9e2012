// src/handlers/leaderboard.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::AppError,
    gamification,
    models::leaderboard::{LeaderboardEntry, LeaderboardParams, LeaderboardResponse, Pagination},
    utils::jwt::Claims,
};

const ENTRY_SELECT: &str = r#"
    SELECT
        u.id,
        u.name,
        u.total_points,
        u.rank,
        u.streak_days,
        (SELECT COUNT(*) FROM mcq_attempts ma WHERE ma.user_id = u.id) AS total_tests,
        (SELECT ROUND(AVG(ma.score::NUMERIC * 100 / NULLIF(ma.total, 0)), 2)::FLOAT8
           FROM mcq_attempts ma WHERE ma.user_id = u.id) AS avg_score,
        (SELECT COUNT(*) FROM user_badges ub WHERE ub.user_id = u.id) AS badges_earned,
        (SELECT MAX(ma.created_at) FROM mcq_attempts ma WHERE ma.user_id = u.id) AS last_test_date
    FROM users u
"#;

/// Returns a page of active students ordered by points, plus the caller's own row.
pub async fn get_leaderboard(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let (limit, offset) = params.page();

    let leaderboard = sqlx::query_as::<_, LeaderboardEntry>(&format!(
        r#"{ENTRY_SELECT}
        WHERE u.role = 'student' AND u.is_active = TRUE
        ORDER BY u.total_points DESC, u.rank ASC NULLS LAST, u.id ASC
        LIMIT $1 OFFSET $2
        "#
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(&pool)
    .await?;

    let current_user_rank = sqlx::query_as::<_, LeaderboardEntry>(&format!(
        "{ENTRY_SELECT} WHERE u.id = $1"
    ))
    .bind(user_id)
    .fetch_optional(&pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE role = 'student' AND is_active = TRUE",
    )
    .fetch_one(&pool)
    .await?;

    Ok(Json(LeaderboardResponse {
        leaderboard,
        current_user_rank,
        pagination: Pagination::new(total, limit, offset),
    }))
}

/// Recomputes the cached rank of every active student (Admin only).
pub async fn update_rankings(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let ranked = gamification::recompute_rankings(&pool).await.map_err(|e| {
        tracing::error!("Failed to update rankings: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(json!({
        "message": "Rankings updated successfully",
        "ranked": ranked,
    })))
}
