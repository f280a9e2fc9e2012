// src/handlers/mcq.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    gamification,
    grading::{self, AnswerKey, GradeReport},
    handlers::chapter::fetch_test_config,
    models::{
        attempt::{
            Attempt, CheckAttemptResponse, PreviousResult, QuestionAttemptRow, SubmitAnswersRequest,
            SubmitResponse,
        },
        mcq::{AnswerKeyRow, CreateMcqRequest, Mcq, McqBody, PublicMcq},
    },
    utils::{
        html::{clean_html, clean_optional},
        jwt::Claims,
    },
};

const MCQ_COLUMNS: &str = "id, chapter_id, question, option_a, option_b, option_c, option_d, \
     correct_options, explanation, difficulty, created_at";

/// Creates a question (Admin only).
pub async fn create_mcq(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateMcqRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let chapter_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM chapters WHERE id = $1)")
            .bind(payload.chapter_id)
            .fetch_one(&pool)
            .await?;

    if !chapter_exists {
        return Err(AppError::NotFound("Chapter not found".to_string()));
    }

    let body = &payload.body;
    let mcq = sqlx::query_as::<_, Mcq>(&format!(
        r#"
        INSERT INTO mcqs (chapter_id, question, option_a, option_b, option_c, option_d,
                          correct_options, explanation, difficulty)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {MCQ_COLUMNS}
        "#
    ))
    .bind(payload.chapter_id)
    .bind(clean_html(&body.question))
    .bind(clean_html(&body.option_a))
    .bind(clean_html(&body.option_b))
    .bind(clean_html(&body.option_c))
    .bind(clean_html(&body.option_d))
    .bind(SqlJson(body.sorted_correct_options()))
    .bind(clean_optional(body.explanation.as_deref()))
    .bind(body.difficulty.as_str())
    .fetch_one(&pool)
    .await?;

    tracing::info!(mcq_id = mcq.id, chapter_id = mcq.chapter_id, "question created");
    Ok((StatusCode::CREATED, Json(mcq)))
}

/// Lists a chapter's questions with their answer keys (Admin only).
pub async fn list_mcqs_admin(
    State(pool): State<PgPool>,
    Path(chapter_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mcqs = sqlx::query_as::<_, Mcq>(&format!(
        "SELECT {MCQ_COLUMNS} FROM mcqs WHERE chapter_id = $1 ORDER BY id"
    ))
    .bind(chapter_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(mcqs))
}

/// Replaces a question's text, options, answer key and difficulty (Admin only).
pub async fn update_mcq(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<McqBody>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mcq = sqlx::query_as::<_, Mcq>(&format!(
        r#"
        UPDATE mcqs
        SET question = $2, option_a = $3, option_b = $4, option_c = $5, option_d = $6,
            correct_options = $7, explanation = $8, difficulty = $9
        WHERE id = $1
        RETURNING {MCQ_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(clean_html(&payload.question))
    .bind(clean_html(&payload.option_a))
    .bind(clean_html(&payload.option_b))
    .bind(clean_html(&payload.option_c))
    .bind(clean_html(&payload.option_d))
    .bind(SqlJson(payload.sorted_correct_options()))
    .bind(clean_optional(payload.explanation.as_deref()))
    .bind(payload.difficulty.as_str())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(mcq))
}

/// Deletes a question (Admin only).
pub async fn delete_mcq(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM mcqs WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Serves a chapter's test to a student, without answer keys.
///
/// Honors the chapter's `randomize_questions` and `questions_per_test` settings.
pub async fn list_mcqs_for_student(
    State(pool): State<PgPool>,
    Path(chapter_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let config = fetch_test_config(&pool, chapter_id)
        .await?
        .filter(|config| config.is_active)
        .ok_or(AppError::NotFound("Chapter not found or inactive".to_string()))?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, question, option_a, option_b, option_c, option_d, difficulty \
         FROM mcqs WHERE chapter_id = ",
    );
    builder.push_bind(chapter_id);

    if config.randomize_questions {
        builder.push(" ORDER BY RANDOM()");
    } else {
        builder.push(" ORDER BY id");
    }

    if let Some(limit) = config.questions_per_test.filter(|n| *n > 0) {
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(limit));
    }

    let mcqs = builder
        .build_query_as::<PublicMcq>()
        .fetch_all(&pool)
        .await?;

    Ok(Json(mcqs))
}

/// Reports whether the caller already attempted a chapter, with the stored verdicts if so.
pub async fn check_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(chapter_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let attempt = sqlx::query_as::<_, Attempt>(
        r#"
        SELECT id, user_id, chapter_id, score, total, time_taken, passed, points_earned, created_at
        FROM mcq_attempts
        WHERE user_id = $1 AND chapter_id = $2
        "#,
    )
    .bind(user_id)
    .bind(chapter_id)
    .fetch_optional(&pool)
    .await?;

    let Some(attempt) = attempt else {
        return Ok(Json(CheckAttemptResponse {
            attempted: false,
            previous_result: None,
        }));
    };

    let results = sqlx::query_as::<_, QuestionAttemptRow>(
        r#"
        SELECT qa.mcq_id, qa.selected_options, qa.is_correct, m.correct_options, m.explanation
        FROM question_attempts qa
        JOIN mcqs m ON m.id = qa.mcq_id
        WHERE qa.attempt_id = $1
        ORDER BY qa.id
        "#,
    )
    .bind(attempt.id)
    .fetch_all(&pool)
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

    Ok(Json(CheckAttemptResponse {
        attempted: true,
        previous_result: Some(PreviousResult {
            score: attempt.score,
            total: attempt.total,
            passed: attempt.passed,
            points_earned: attempt.points_earned,
            results,
        }),
    }))
}

/// Grades and records a chapter test, then applies points, streak and badges.
///
/// The attempt and its per-question verdicts are written in one transaction.
/// A second submission for the same chapter trips the unique constraint and
/// is reported as already attempted. Rewards run after commit and never fail
/// the request.
pub async fn submit_answers(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(chapter_id): Path<i64>,
    payload: Result<Json<SubmitAnswersRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if payload.answers.is_empty() {
        return Err(AppError::BadRequest("Answers are required".to_string()));
    }
    if payload.time_taken.is_some_and(|t| t < 0) {
        return Err(AppError::BadRequest("time_taken cannot be negative".to_string()));
    }

    let user_id = claims.user_id()?;

    let config = fetch_test_config(&pool, chapter_id)
        .await?
        .filter(|config| config.is_active)
        .ok_or(AppError::NotFound("Chapter not found or inactive".to_string()))?;

    let ids: Vec<i64> = payload.answers.iter().map(|a| a.mcq_id).collect();
    let keys: HashMap<i64, AnswerKey> = sqlx::query_as::<_, AnswerKeyRow>(
        "SELECT id, correct_options, explanation FROM mcqs WHERE id = ANY($1) AND chapter_id = $2",
    )
    .bind(&ids[..])
    .bind(chapter_id)
    .fetch_all(&pool)
    .await?
    .into_iter()
    .map(|row| {
        (
            row.id,
            AnswerKey {
                correct_options: row.correct_options.0,
                explanation: row.explanation,
            },
        )
    })
    .collect();

    let report = grading::grade(&payload.answers, &keys, config.passing_percentage());

    let attempt_id = record_attempt(&pool, user_id, chapter_id, &report, payload.time_taken)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::AlreadyAttempted
            } else {
                tracing::error!("Failed to record attempt: {:?}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!(
        user_id,
        chapter_id,
        attempt_id,
        score = report.score,
        total = report.total,
        passed = report.passed,
        "attempt recorded"
    );

    let points_earned = gamification::award_points(
        &pool,
        user_id,
        attempt_id,
        report.score,
        report.total,
        payload.time_taken,
        &config.pacing(),
    )
    .await;
    let badges_earned = gamification::evaluate_badges(&pool, user_id).await;

    Ok(Json(SubmitResponse {
        score: report.score,
        total: report.total,
        passed: report.passed,
        passing_percentage: report.passing_percentage,
        results: report.results,
        points_earned,
        badges_earned,
    }))
}

async fn record_attempt(
    pool: &PgPool,
    user_id: i64,
    chapter_id: i64,
    report: &GradeReport,
    time_taken: Option<i32>,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let attempt_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO mcq_attempts (user_id, chapter_id, score, total, time_taken, passed)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(chapter_id)
    .bind(report.score)
    .bind(report.total)
    .bind(time_taken)
    .bind(report.passed)
    .fetch_one(&mut *tx)
    .await?;

    if !report.results.is_empty() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO question_attempts (attempt_id, user_id, mcq_id, selected_options, is_correct) ",
        );
        builder.push_values(&report.results, |mut row, result| {
            row.push_bind(attempt_id)
                .push_bind(user_id)
                .push_bind(result.mcq_id)
                .push_bind(SqlJson(result.user_answers.clone()))
                .push_bind(result.is_correct);
        });
        builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(attempt_id)
}
