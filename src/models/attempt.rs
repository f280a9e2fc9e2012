// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

use crate::{grading::GradedAnswer, models::mcq::OptionLabel};

/// A single label or a list of labels, as the client may send either.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    One(OptionLabel),
    Many(Vec<OptionLabel>),
}

impl Selection {
    pub fn to_vec(&self) -> Vec<OptionLabel> {
        match self {
            Selection::One(label) => vec![*label],
            Selection::Many(labels) => labels.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedAnswer {
    #[serde(rename = "mcqId")]
    pub mcq_id: i64,
    pub selected: Selection,
}

/// DTO for submitting a chapter test.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<SubmittedAnswer>,
    /// Elapsed seconds, as measured by the client.
    pub time_taken: Option<i32>,
}

/// Represents the 'mcq_attempts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub chapter_id: i64,
    pub score: i32,
    pub total: i32,
    pub time_taken: Option<i32>,
    pub passed: bool,
    pub points_earned: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Response for a freshly graded submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub score: i32,
    pub total: i32,
    pub results: Vec<GradedAnswer>,
    pub passed: bool,
    pub passing_percentage: i32,
    pub points_earned: i32,
    pub badges_earned: Vec<String>,
}

/// A stored per-question verdict joined with its question's answer key.
#[derive(Debug, FromRow)]
pub struct QuestionAttemptRow {
    pub mcq_id: i64,
    pub selected_options: Json<Vec<OptionLabel>>,
    pub is_correct: bool,
    pub correct_options: Json<Vec<OptionLabel>>,
    pub explanation: Option<String>,
}

impl From<QuestionAttemptRow> for GradedAnswer {
    fn from(row: QuestionAttemptRow) -> Self {
        GradedAnswer {
            mcq_id: row.mcq_id,
            is_correct: row.is_correct,
            correct_options: row.correct_options.0,
            user_answers: row.selected_options.0,
            explanation: row.explanation,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousResult {
    pub score: i32,
    pub total: i32,
    pub passed: bool,
    pub points_earned: i32,
    pub results: Vec<GradedAnswer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAttemptResponse {
    pub attempted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_result: Option<PreviousResult>,
}

/// A row of "my results".
#[derive(Debug, Serialize, FromRow)]
pub struct MyResult {
    pub id: i64,
    pub chapter_id: i64,
    pub score: i32,
    pub total_marks: i32,
    pub passed: bool,
    pub points_earned: i32,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
    pub chapter_name: String,
    pub subject_name: String,
}

/// Per-chapter aggregate for the admin analytics view.
#[derive(Debug, Serialize, FromRow)]
pub struct ChapterAnalytics {
    pub subject: String,
    pub chapter: String,
    pub attempts: i64,
    pub avg_score: Option<f64>,
    pub avg_total: Option<f64>,
}
