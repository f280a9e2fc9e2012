// src/models/performance.rs

use serde::Serialize;
use sqlx::FromRow;

use crate::models::badge::EarnedBadge;

#[derive(Debug, Serialize, FromRow)]
pub struct OverallStats {
    pub total_tests: i64,
    pub chapters_attempted: i64,
    pub avg_score: Option<f64>,
    pub total_correct: i64,
    pub total_questions: i64,
    pub tests_passed: i64,
    /// Seconds.
    pub avg_time_taken: Option<f64>,
    pub total_points: i64,
    pub rank: Option<i32>,
    pub streak_days: i32,
}

/// The caller's result on one chapter.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChapterPerformance {
    pub chapter_id: i64,
    pub chapter_name: String,
    pub subject_name: String,
    pub score: i32,
    pub total: i32,
    pub percentage: f64,
    pub passed: bool,
    pub time_taken: Option<i32>,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct DifficultyPerformance {
    pub difficulty: String,
    pub total_attempted: i64,
    pub correct_answers: i64,
    pub accuracy: f64,
}

/// A chapter singled out as weak or strong.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicScore {
    pub chapter_id: i64,
    pub chapter_name: String,
    pub subject_name: String,
    pub percentage: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct DailyActivity {
    pub date: chrono::NaiveDate,
    pub tests_taken: i64,
    pub avg_score: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInsights {
    pub overall_stats: OverallStats,
    pub chapter_performance: Vec<ChapterPerformance>,
    pub difficulty_performance: Vec<DifficultyPerformance>,
    pub weak_topics: Vec<TopicScore>,
    pub strong_topics: Vec<TopicScore>,
    pub recent_progress: Vec<ChapterPerformance>,
    pub time_analysis: Vec<DailyActivity>,
    pub badges: Vec<EarnedBadge>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Recommendation {
    pub chapter_id: i64,
    pub chapter_name: String,
    pub subject_name: String,
    pub available_questions: i64,
    pub current_accuracy: f64,
    pub reason: String,
}
