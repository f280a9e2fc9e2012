// src/models/admin.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct ChapterActivity {
    pub chapter: String,
    pub subject: String,
    pub attempts: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RecentAttempt {
    pub student_name: String,
    pub subject: String,
    pub chapter: String,
    pub score: i32,
    pub total: i32,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

/// Scalar counters shown on the admin dashboard.
#[derive(Debug, Serialize, FromRow)]
pub struct DashboardCounts {
    pub total_students: i64,
    pub total_subjects: i64,
    pub total_chapters: i64,
    pub total_mcqs: i64,
    pub attempts_today: i64,
    pub attempts_week: i64,
    pub avg_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub counts: DashboardCounts,
    pub most_attempted: Vec<ChapterActivity>,
    pub recent_activity: Vec<RecentAttempt>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct StudentListItem {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub total_points: i64,
    pub rank: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub total_attempts: i64,
    pub avg_score: Option<f64>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TestHistoryRow {
    pub subject: String,
    pub chapter: String,
    pub score: i32,
    pub total: i32,
    pub passed: bool,
    pub time_taken: Option<i32>,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct StudentSummary {
    pub total_attempts: i64,
    pub avg_score: Option<f64>,
    pub pass_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct StudentDetails {
    pub student: StudentRecord,
    pub test_history: Vec<TestHistoryRow>,
    pub summary: StudentSummary,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStudentStatusRequest {
    pub is_active: bool,
}
