// src/handlers/chapter.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::chapter::{ChapterSummary, CreateChapterRequest, TestConfig, UpdateTestConfigRequest},
    utils::html::clean_html,
};

const TEST_CONFIG_COLUMNS: &str = "time_limit, passing_percentage, is_active, \
     randomize_questions, randomize_options, questions_per_test";

/// Loads a chapter's test configuration, `None` if the chapter does not exist.
pub async fn fetch_test_config(
    pool: &PgPool,
    chapter_id: i64,
) -> Result<Option<TestConfig>, sqlx::Error> {
    sqlx::query_as::<_, TestConfig>(&format!(
        "SELECT {TEST_CONFIG_COLUMNS} FROM chapters WHERE id = $1"
    ))
    .bind(chapter_id)
    .fetch_optional(pool)
    .await
}

/// Lists the chapters of a subject with their question counts.
pub async fn list_chapters(
    State(pool): State<PgPool>,
    Path(subject_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let chapters = sqlx::query_as::<_, ChapterSummary>(
        r#"
        SELECT
            c.id, c.subject_id, c.name, c.time_limit, c.passing_percentage, c.is_active,
            c.randomize_questions, c.randomize_options, c.questions_per_test,
            (SELECT COUNT(*) FROM mcqs m WHERE m.chapter_id = c.id) AS mcq_count
        FROM chapters c
        WHERE c.subject_id = $1
        ORDER BY c.id
        "#,
    )
    .bind(subject_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(chapters))
}

/// Creates a chapter under an existing subject (Admin only).
pub async fn create_chapter(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateChapterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let subject_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)")
            .bind(payload.subject_id)
            .fetch_one(&pool)
            .await?;

    if !subject_exists {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    let chapter = sqlx::query_as::<_, ChapterSummary>(
        r#"
        INSERT INTO chapters (subject_id, name)
        VALUES ($1, $2)
        RETURNING id, subject_id, name, time_limit, passing_percentage, is_active,
                  randomize_questions, randomize_options, questions_per_test,
                  0::BIGINT AS mcq_count
        "#,
    )
    .bind(payload.subject_id)
    .bind(clean_html(payload.name.trim()))
    .fetch_one(&pool)
    .await?;

    tracing::info!(chapter_id = chapter.id, subject_id = chapter.subject_id, "chapter created");
    Ok((StatusCode::CREATED, Json(chapter)))
}

/// Deletes a chapter with its questions and attempts (Admin only).
pub async fn delete_chapter(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM chapters WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chapter not found".to_string()));
    }

    tracing::info!(chapter_id = id, "chapter deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_test_config(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let config = fetch_test_config(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Chapter not found".to_string()))?;

    Ok(Json(config))
}

/// Replaces a chapter's test configuration (Admin only).
pub async fn update_test_config(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTestConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let config = sqlx::query_as::<_, TestConfig>(&format!(
        r#"
        UPDATE chapters
        SET time_limit = $2,
            passing_percentage = $3,
            is_active = $4,
            randomize_questions = $5,
            randomize_options = $6,
            questions_per_test = $7
        WHERE id = $1
        RETURNING {TEST_CONFIG_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(payload.time_limit)
    .bind(payload.passing_percentage)
    .bind(payload.is_active)
    .bind(payload.randomize_questions)
    .bind(payload.randomize_options)
    .bind(payload.questions_per_test)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Chapter not found".to_string()))?;

    tracing::info!(chapter_id = id, "test configuration updated");
    Ok(Json(config))
}
