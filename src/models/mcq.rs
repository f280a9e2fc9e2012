// src/models/mcq.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// One of the four option slots of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    #[serde(alias = "a")]
    A,
    #[serde(alias = "b")]
    B,
    #[serde(alias = "c")]
    C,
    #[serde(alias = "d")]
    D,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Represents the 'mcqs' table in the database, answer key included.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mcq {
    pub id: i64,
    pub chapter_id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// Non-empty subset of {A, B, C, D}, stored as a JSON array.
    pub correct_options: Json<Vec<OptionLabel>>,

    pub explanation: Option<String>,

    /// 'easy', 'medium' or 'hard'.
    pub difficulty: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for sending a question to a student (excludes answer key and explanation).
#[derive(Debug, Serialize, FromRow)]
pub struct PublicMcq {
    pub id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub difficulty: String,
}

/// Answer key as fetched for grading.
#[derive(Debug, FromRow)]
pub struct AnswerKeyRow {
    pub id: i64,
    pub correct_options: Json<Vec<OptionLabel>>,
    pub explanation: Option<String>,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMcqRequest {
    pub chapter_id: i64,
    #[validate(nested)]
    #[serde(flatten)]
    pub body: McqBody,
}

/// Fields shared by create and update.
#[derive(Debug, Deserialize, Validate)]
pub struct McqBody {
    #[validate(length(min = 1, max = 5000))]
    pub question: String,
    #[validate(length(min = 1, max = 1000))]
    pub option_a: String,
    #[validate(length(min = 1, max = 1000))]
    pub option_b: String,
    #[validate(length(min = 1, max = 1000))]
    pub option_c: String,
    #[validate(length(min = 1, max = 1000))]
    pub option_d: String,
    #[validate(custom(function = validate_correct_options))]
    pub correct_options: Vec<OptionLabel>,
    #[validate(length(max = 5000))]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

fn validate_correct_options(options: &[OptionLabel]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("correct_options_cannot_be_empty"));
    }
    let mut sorted = options.to_vec();
    sorted.sort();
    sorted.dedup();
    if sorted.len() != options.len() {
        return Err(validator::ValidationError::new("correct_options_duplicated"));
    }
    Ok(())
}

impl McqBody {
    /// Canonical, sorted answer key.
    pub fn sorted_correct_options(&self) -> Vec<OptionLabel> {
        let mut options = self.correct_options.clone();
        options.sort();
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> McqBody {
        serde_json::from_value(json).unwrap()
    }

    fn valid() -> serde_json::Value {
        serde_json::json!({
            "question": "Unit of force?",
            "option_a": "Newton",
            "option_b": "Joule",
            "option_c": "Watt",
            "option_d": "Pascal",
            "correct_options": ["A"]
        })
    }

    #[test]
    fn difficulty_defaults_to_medium() {
        let mcq = body(valid());
        assert_eq!(mcq.difficulty, Difficulty::Medium);
        assert!(mcq.validate().is_ok());
    }

    #[test]
    fn empty_or_duplicate_answer_key_is_rejected() {
        let mut json = valid();
        json["correct_options"] = serde_json::json!([]);
        assert!(body(json.clone()).validate().is_err());

        json["correct_options"] = serde_json::json!(["B", "B"]);
        assert!(body(json).validate().is_err());
    }

    #[test]
    fn labels_outside_a_to_d_do_not_parse() {
        let mut json = valid();
        json["correct_options"] = serde_json::json!(["E"]);
        assert!(serde_json::from_value::<McqBody>(json).is_err());
    }

    #[test]
    fn lowercase_labels_are_accepted_and_sorted() {
        let mut json = valid();
        json["correct_options"] = serde_json::json!(["d", "a"]);
        let mcq = body(json);
        assert_eq!(mcq.sorted_correct_options(), vec![OptionLabel::A, OptionLabel::D]);
    }

    #[test]
    fn create_request_flattens_the_body() {
        let mut json = valid();
        json["chapter_id"] = serde_json::json!(3);
        let req: CreateMcqRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.chapter_id, 3);
        assert!(req.validate().is_ok());
    }
}
