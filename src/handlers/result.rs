// src/handlers/result.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::attempt::{ChapterAnalytics, MyResult},
    utils::jwt::Claims,
};

/// The caller's attempts, newest first.
pub async fn my_results(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let results = sqlx::query_as::<_, MyResult>(
        r#"
        SELECT
            ma.id, ma.chapter_id, ma.score, ma.total AS total_marks, ma.passed,
            ma.points_earned, ma.created_at AS attempted_at,
            c.name AS chapter_name, s.name AS subject_name
        FROM mcq_attempts ma
        JOIN chapters c ON c.id = ma.chapter_id
        JOIN subjects s ON s.id = c.subject_id
        WHERE ma.user_id = $1
        ORDER BY ma.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}

/// Per-chapter attempt counts and averages (Admin only).
pub async fn analytics(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query_as::<_, ChapterAnalytics>(
        r#"
        SELECT
            s.name AS subject,
            c.name AS chapter,
            COUNT(ma.id) AS attempts,
            AVG(ma.score)::FLOAT8 AS avg_score,
            AVG(ma.total)::FLOAT8 AS avg_total
        FROM chapters c
        JOIN subjects s ON s.id = c.subject_id
        LEFT JOIN mcq_attempts ma ON ma.chapter_id = c.id
        GROUP BY s.name, c.id, c.name
        ORDER BY s.name, c.name
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(rows))
}
