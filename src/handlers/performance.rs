// src/handlers/performance.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        badge::EarnedBadge,
        performance::{
            ChapterPerformance, DailyActivity, DifficultyPerformance, OverallStats,
            PerformanceInsights, Recommendation, TopicScore,
        },
    },
    utils::jwt::Claims,
};

const WEAK_BELOW: f64 = 60.0;
const STRONG_FROM: f64 = 80.0;
const TOPIC_LIMIT: usize = 5;
const RECENT_LIMIT: usize = 10;

fn topic(row: &ChapterPerformance) -> TopicScore {
    TopicScore {
        chapter_id: row.chapter_id,
        chapter_name: row.chapter_name.clone(),
        subject_name: row.subject_name.clone(),
        percentage: row.percentage,
    }
}

/// Splits chapter results into weak (worst first) and strong (best first) topics.
pub fn classify_topics(chapters: &[ChapterPerformance]) -> (Vec<TopicScore>, Vec<TopicScore>) {
    let mut weak: Vec<TopicScore> = chapters
        .iter()
        .filter(|c| c.percentage < WEAK_BELOW)
        .map(topic)
        .collect();
    weak.sort_by(|a, b| a.percentage.total_cmp(&b.percentage));
    weak.truncate(TOPIC_LIMIT);

    let mut strong: Vec<TopicScore> = chapters
        .iter()
        .filter(|c| c.percentage >= STRONG_FROM)
        .map(topic)
        .collect();
    strong.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    strong.truncate(TOPIC_LIMIT);

    (weak, strong)
}

/// Aggregated view of the caller's progress.
pub async fn insights(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let overall_stats = sqlx::query_as::<_, OverallStats>(
        r#"
        SELECT
            COUNT(ma.id) AS total_tests,
            COUNT(DISTINCT ma.chapter_id) AS chapters_attempted,
            ROUND(AVG(ma.score::NUMERIC * 100 / NULLIF(ma.total, 0)), 2)::FLOAT8 AS avg_score,
            COALESCE(SUM(ma.score), 0)::BIGINT AS total_correct,
            COALESCE(SUM(ma.total), 0)::BIGINT AS total_questions,
            COUNT(ma.id) FILTER (WHERE ma.passed) AS tests_passed,
            AVG(ma.time_taken)::FLOAT8 AS avg_time_taken,
            u.total_points,
            u.rank,
            u.streak_days
        FROM users u
        LEFT JOIN mcq_attempts ma ON ma.user_id = u.id
        WHERE u.id = $1
        GROUP BY u.id
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    let chapter_performance = sqlx::query_as::<_, ChapterPerformance>(
        r#"
        SELECT
            c.id AS chapter_id,
            c.name AS chapter_name,
            s.name AS subject_name,
            ma.score,
            ma.total,
            COALESCE(ROUND(ma.score::NUMERIC * 100 / NULLIF(ma.total, 0), 2), 0)::FLOAT8 AS percentage,
            ma.passed,
            ma.time_taken,
            ma.created_at AS attempted_at
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

    let difficulty_performance = sqlx::query_as::<_, DifficultyPerformance>(
        r#"
        SELECT
            m.difficulty,
            COUNT(*) AS total_attempted,
            COUNT(*) FILTER (WHERE qa.is_correct) AS correct_answers,
            ROUND(COUNT(*) FILTER (WHERE qa.is_correct) * 100.0 / COUNT(*), 2)::FLOAT8 AS accuracy
        FROM question_attempts qa
        JOIN mcqs m ON m.id = qa.mcq_id
        WHERE qa.user_id = $1
        GROUP BY m.difficulty
        ORDER BY m.difficulty
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    let time_analysis = sqlx::query_as::<_, DailyActivity>(
        r#"
        SELECT
            (ma.created_at AT TIME ZONE 'UTC')::DATE AS date,
            COUNT(*) AS tests_taken,
            ROUND(AVG(ma.score::NUMERIC * 100 / NULLIF(ma.total, 0)), 2)::FLOAT8 AS avg_score
        FROM mcq_attempts ma
        WHERE ma.user_id = $1 AND ma.created_at >= NOW() - INTERVAL '30 days'
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    let badges = sqlx::query_as::<_, EarnedBadge>(
        r#"
        SELECT b.id, b.code, b.name, b.description, b.category, b.points_required, ub.earned_at
        FROM user_badges ub
        JOIN badges b ON b.id = ub.badge_id
        WHERE ub.user_id = $1
        ORDER BY ub.earned_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    let (weak_topics, strong_topics) = classify_topics(&chapter_performance);
    let recent_progress = chapter_performance
        .iter()
        .take(RECENT_LIMIT)
        .cloned()
        .collect();

    Ok(Json(PerformanceInsights {
        overall_stats,
        chapter_performance,
        difficulty_performance,
        weak_topics,
        strong_topics,
        recent_progress,
        time_analysis,
        badges,
    }))
}

/// Up to five active chapters where the caller's question accuracy is below 70%.
pub async fn recommendations(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let rows = sqlx::query_as::<_, Recommendation>(
        r#"
        WITH accuracy AS (
            SELECT m.chapter_id,
                   COUNT(*) AS attempted,
                   COUNT(*) FILTER (WHERE qa.is_correct) AS correct
            FROM question_attempts qa
            JOIN mcqs m ON m.id = qa.mcq_id
            WHERE qa.user_id = $1
            GROUP BY m.chapter_id
        ),
        available AS (
            SELECT chapter_id, COUNT(*) AS questions
            FROM mcqs
            GROUP BY chapter_id
        )
        SELECT
            c.id AS chapter_id,
            c.name AS chapter_name,
            s.name AS subject_name,
            av.questions AS available_questions,
            COALESCE(ROUND(a.correct * 100.0 / NULLIF(a.attempted, 0), 2), 0)::FLOAT8 AS current_accuracy,
            CASE WHEN a.attempted IS NULL THEN 'Not attempted yet'
                 ELSE 'Accuracy below 70%'
            END AS reason
        FROM chapters c
        JOIN subjects s ON s.id = c.subject_id
        JOIN available av ON av.chapter_id = c.id
        LEFT JOIN accuracy a ON a.chapter_id = c.id
        WHERE c.is_active = TRUE
          AND COALESCE(a.correct * 100.0 / NULLIF(a.attempted, 0), 0) < 70
        ORDER BY current_accuracy ASC, c.id ASC
        LIMIT 5
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: i64, percentage: f64) -> ChapterPerformance {
        ChapterPerformance {
            chapter_id: id,
            chapter_name: format!("Chapter {id}"),
            subject_name: "Physics".into(),
            score: 0,
            total: 10,
            percentage,
            passed: percentage >= 40.0,
            time_taken: None,
            attempted_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn topics_split_on_sixty_and_eighty() {
        let rows = vec![chapter(1, 59.9), chapter(2, 60.0), chapter(3, 79.9), chapter(4, 80.0)];
        let (weak, strong) = classify_topics(&rows);

        assert_eq!(weak.iter().map(|t| t.chapter_id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(strong.iter().map(|t| t.chapter_id).collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn weak_topics_are_worst_first_and_capped() {
        let rows: Vec<_> = (1..=7).map(|i| chapter(i, 50.0 - i as f64)).collect();
        let (weak, strong) = classify_topics(&rows);

        assert!(strong.is_empty());
        assert_eq!(weak.len(), 5);
        assert_eq!(weak[0].chapter_id, 7);
        assert!(weak.windows(2).all(|w| w[0].percentage <= w[1].percentage));
    }

    #[test]
    fn strong_topics_are_best_first() {
        let rows = vec![chapter(1, 85.0), chapter(2, 100.0), chapter(3, 90.0)];
        let (_, strong) = classify_topics(&rows);
        assert_eq!(
            strong.iter().map(|t| t.chapter_id).collect::<Vec<_>>(),
            vec![2, 3, 1]
        );
    }
}
