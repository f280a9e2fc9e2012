// src/models/chapter.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{gamification::points::Pacing, grading::resolve_passing_percentage};

/// A chapter as listed under its subject, with its question count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChapterSummary {
    pub id: i64,
    pub subject_id: i64,
    pub name: String,
    /// Minutes.
    pub time_limit: Option<i32>,
    pub passing_percentage: Option<i32>,
    pub is_active: bool,
    pub randomize_questions: bool,
    pub randomize_options: bool,
    pub questions_per_test: Option<i32>,
    pub mcq_count: i64,
}

/// The per-chapter test configuration.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestConfig {
    pub time_limit: Option<i32>,
    pub passing_percentage: Option<i32>,
    pub is_active: bool,
    pub randomize_questions: bool,
    pub randomize_options: bool,
    pub questions_per_test: Option<i32>,
}

impl TestConfig {
    pub fn passing_percentage(&self) -> i32 {
        resolve_passing_percentage(self.passing_percentage)
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            time_limit: self.time_limit,
            questions_per_test: self.questions_per_test,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChapterRequest {
    pub subject_id: i64,
    #[validate(length(min = 1, max = 200, message = "Chapter name required"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTestConfigRequest {
    #[validate(range(min = 1, max = 600))]
    pub time_limit: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub passing_percentage: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub randomize_questions: bool,
    #[serde(default)]
    pub randomize_options: bool,
    #[validate(range(min = 1, max = 500))]
    pub questions_per_test: Option<i32>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_threshold_falls_back_to_default() {
        let config = TestConfig {
            time_limit: None,
            passing_percentage: None,
            is_active: true,
            randomize_questions: false,
            randomize_options: false,
            questions_per_test: Some(10),
        };
        assert_eq!(config.passing_percentage(), 40);
        assert_eq!(config.pacing().questions_per_test, Some(10));
    }

    #[test]
    fn test_config_update_rejects_out_of_range_threshold() {
        let req: UpdateTestConfigRequest =
            serde_json::from_str(r#"{"passing_percentage": 140}"#).unwrap();
        assert!(req.validate().is_err());
        assert!(req.is_active);
    }
}
