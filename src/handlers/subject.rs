// src/handlers/subject.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::subject::{CreateSubjectRequest, Subject},
    utils::html::clean_html,
};

/// Lists all subjects alphabetically.
pub async fn list_subjects(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let subjects =
        sqlx::query_as::<_, Subject>("SELECT id, name, created_at FROM subjects ORDER BY name")
            .fetch_all(&pool)
            .await?;

    Ok(Json(subjects))
}

/// Creates a subject (Admin only).
pub async fn create_subject(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let subject = sqlx::query_as::<_, Subject>(
        "INSERT INTO subjects (name) VALUES ($1) RETURNING id, name, created_at",
    )
    .bind(clean_html(payload.name.trim()))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Subject already exists".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    tracing::info!(subject_id = subject.id, "subject created");
    Ok((StatusCode::CREATED, Json(subject)))
}

/// Deletes a subject together with its chapters, questions and attempts (Admin only).
pub async fn delete_subject(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    tracing::info!(subject_id = id, "subject deleted");
    Ok(StatusCode::NO_CONTENT)
}
