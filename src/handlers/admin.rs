// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::admin::{
        ChapterActivity, DashboardCounts, DashboardStats, RecentAttempt, StudentDetails,
        StudentListItem, StudentRecord, StudentSummary, TestHistoryRow,
        UpdateStudentStatusRequest,
    },
};

/// Platform-wide counters, the most attempted chapters and the latest attempts.
/// Admin only.
pub async fn dashboard_stats(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let counts = sqlx::query_as::<_, DashboardCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users WHERE role = 'student') AS total_students,
            (SELECT COUNT(*) FROM subjects) AS total_subjects,
            (SELECT COUNT(*) FROM chapters) AS total_chapters,
            (SELECT COUNT(*) FROM mcqs) AS total_mcqs,
            (SELECT COUNT(*) FROM mcq_attempts
               WHERE created_at >= date_trunc('day', NOW())) AS attempts_today,
            (SELECT COUNT(*) FROM mcq_attempts
               WHERE created_at >= NOW() - INTERVAL '7 days') AS attempts_week,
            (SELECT ROUND(AVG(score::NUMERIC * 100 / NULLIF(total, 0)), 2)::FLOAT8
               FROM mcq_attempts) AS avg_score
        "#,
    )
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load dashboard counts: {:?}", e);
        AppError::from(e)
    })?;

    let most_attempted = sqlx::query_as::<_, ChapterActivity>(
        r#"
        SELECT c.name AS chapter, s.name AS subject, COUNT(ma.id) AS attempts
        FROM mcq_attempts ma
        JOIN chapters c ON c.id = ma.chapter_id
        JOIN subjects s ON s.id = c.subject_id
        GROUP BY c.id, c.name, s.name
        ORDER BY attempts DESC
        LIMIT 5
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let recent_activity = sqlx::query_as::<_, RecentAttempt>(
        r#"
        SELECT u.name AS student_name, s.name AS subject, c.name AS chapter,
               ma.score, ma.total, ma.created_at AS attempted_at
        FROM mcq_attempts ma
        JOIN users u ON u.id = ma.user_id
        JOIN chapters c ON c.id = ma.chapter_id
        JOIN subjects s ON s.id = c.subject_id
        ORDER BY ma.created_at DESC
        LIMIT 10
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(DashboardStats {
        counts,
        most_attempted,
        recent_activity,
    }))
}

/// Lists all students with their attempt counts.
/// Admin only.
pub async fn list_students(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let students = sqlx::query_as::<_, StudentListItem>(
        r#"
        SELECT
            u.id, u.name, u.email, u.is_active, u.total_points, u.rank, u.created_at,
            COUNT(ma.id) AS total_attempts,
            ROUND(AVG(ma.score::NUMERIC * 100 / NULLIF(ma.total, 0)), 2)::FLOAT8 AS avg_score
        FROM users u
        LEFT JOIN mcq_attempts ma ON ma.user_id = u.id
        WHERE u.role = 'student'
        GROUP BY u.id
        ORDER BY u.created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(students))
}

/// One student's profile, test history and summary.
/// Admin only.
pub async fn student_details(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = sqlx::query_as::<_, StudentRecord>(
        "SELECT id, name, email, is_active, created_at FROM users WHERE id = $1 AND role = 'student'",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Student not found".to_string()))?;

    let test_history = sqlx::query_as::<_, TestHistoryRow>(
        r#"
        SELECT s.name AS subject, c.name AS chapter, ma.score, ma.total, ma.passed,
               ma.time_taken, ma.created_at AS attempted_at
        FROM mcq_attempts ma
        JOIN chapters c ON c.id = ma.chapter_id
        JOIN subjects s ON s.id = c.subject_id
        WHERE ma.user_id = $1
        ORDER BY ma.created_at DESC
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let summary = sqlx::query_as::<_, StudentSummary>(
        r#"
        SELECT
            COUNT(*) AS total_attempts,
            ROUND(AVG(score::NUMERIC * 100 / NULLIF(total, 0)), 2)::FLOAT8 AS avg_score,
            ROUND(AVG(CASE WHEN passed THEN 100.0 ELSE 0 END), 2)::FLOAT8 AS pass_rate
        FROM mcq_attempts
        WHERE user_id = $1
        "#,
    )
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(StudentDetails {
        student,
        test_history,
        summary,
    }))
}

/// Activates or deactivates a student. Deactivated students leave the leaderboard.
/// Admin only.
pub async fn update_student_status(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStudentStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1 AND role = 'student'")
        .bind(id)
        .bind(payload.is_active)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Student not found".to_string()));
    }

    tracing::info!(student_id = id, is_active = payload.is_active, "student status changed");
    Ok(Json(json!({
        "message": "Student status updated",
        "is_active": payload.is_active,
    })))
}
