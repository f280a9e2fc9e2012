// src/grading.rs

//! Attempt grading: exact set comparison of submitted option labels against
//! each question's answer key, plus the pass/fail decision.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::{
    config::DEFAULT_PASSING_PERCENTAGE,
    models::{attempt::SubmittedAnswer, mcq::OptionLabel},
};

/// The part of a question the grader needs.
#[derive(Debug, Clone)]
pub struct AnswerKey {
    pub correct_options: Vec<OptionLabel>,
    pub explanation: Option<String>,
}

/// Verdict for one submitted answer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub mcq_id: i64,
    pub is_correct: bool,
    pub correct_options: Vec<OptionLabel>,
    pub user_answers: Vec<OptionLabel>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GradeReport {
    /// Number of correct answers.
    pub score: i32,
    /// Number of answers submitted, including ones whose question no longer exists.
    pub total: i32,
    pub passed: bool,
    pub passing_percentage: i32,
    /// One entry per answer whose question was found.
    pub results: Vec<GradedAnswer>,
}

/// `score / total * 100`, or 0 for an empty attempt.
pub fn percentage(score: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    f64::from(score) * 100.0 / f64::from(total)
}

/// A chapter without a positive threshold falls back to the default.
pub fn resolve_passing_percentage(configured: Option<i32>) -> i32 {
    configured
        .filter(|p| *p > 0)
        .unwrap_or(DEFAULT_PASSING_PERCENTAGE)
}

/// Order-independent, exact match. No partial credit.
pub fn is_correct(selected: &[OptionLabel], correct: &[OptionLabel]) -> bool {
    let selected: BTreeSet<_> = selected.iter().collect();
    let correct: BTreeSet<_> = correct.iter().collect();
    selected == correct
}

/// Grades a submission.
///
/// Answers referencing unknown questions are skipped but still count towards
/// `total`, so the denominator is always the number of answers submitted.
pub fn grade(
    answers: &[SubmittedAnswer],
    keys: &HashMap<i64, AnswerKey>,
    passing_percentage: i32,
) -> GradeReport {
    let mut results = Vec::with_capacity(answers.len());
    let mut score = 0;

    for answer in answers {
        let Some(key) = keys.get(&answer.mcq_id) else {
            tracing::debug!(mcq_id = answer.mcq_id, "skipping answer for unknown question");
            continue;
        };

        let user_answers = answer.selected.to_vec();
        let correct = is_correct(&user_answers, &key.correct_options);
        if correct {
            score += 1;
        }

        results.push(GradedAnswer {
            mcq_id: answer.mcq_id,
            is_correct: correct,
            correct_options: key.correct_options.clone(),
            user_answers,
            explanation: key.explanation.clone(),
        });
    }

    let total = i32::try_from(answers.len()).unwrap_or(i32::MAX);
    // Integer form of `score / total * 100 >= passing_percentage`.
    let passed = total > 0 && i64::from(score) * 100 >= i64::from(passing_percentage) * i64::from(total);

    GradeReport {
        score,
        total,
        passed,
        passing_percentage,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attempt::Selection;
    use OptionLabel::{A, B, C, D};

    fn answer(mcq_id: i64, selected: Vec<OptionLabel>) -> SubmittedAnswer {
        SubmittedAnswer {
            mcq_id,
            selected: Selection::Many(selected),
        }
    }

    fn key(correct: Vec<OptionLabel>) -> AnswerKey {
        AnswerKey {
            correct_options: correct,
            explanation: Some("because".to_string()),
        }
    }

    /// Five questions, each with answer A.
    fn five_keys() -> HashMap<i64, AnswerKey> {
        (1..=5).map(|id| (id, key(vec![A]))).collect()
    }

    #[test]
    fn selection_order_does_not_matter() {
        assert!(is_correct(&[B, A], &[A, B]));
        assert!(!is_correct(&[A], &[A, B]));
        assert!(!is_correct(&[A, B, C], &[A, B]));
        assert!(!is_correct(&[], &[D]));
    }

    #[test]
    fn multi_select_needs_the_exact_set() {
        let keys: HashMap<_, _> = [(1, key(vec![A, C])), (2, key(vec![B, D]))].into();
        let report = grade(&[answer(1, vec![C, A]), answer(2, vec![B])], &keys, 40);

        assert_eq!(report.score, 1);
        assert!(report.results[0].is_correct);
        assert!(!report.results[1].is_correct);
        assert_eq!(report.results[1].user_answers, vec![B]);
    }

    #[test]
    fn three_of_five_passes_at_forty_percent() {
        let answers = vec![
            answer(1, vec![A]),
            answer(2, vec![A]),
            answer(3, vec![A]),
            answer(4, vec![B]),
            answer(5, vec![C]),
        ];
        let report = grade(&answers, &five_keys(), 40);

        assert_eq!(report.score, 3);
        assert_eq!(report.total, 5);
        assert_eq!(percentage(report.score, report.total), 60.0);
        assert!(report.passed);
    }

    #[test]
    fn one_of_five_fails_at_forty_percent() {
        let answers = vec![
            answer(1, vec![A]),
            answer(2, vec![B]),
            answer(3, vec![B]),
            answer(4, vec![B]),
            answer(5, vec![B]),
        ];
        let report = grade(&answers, &five_keys(), 40);

        assert_eq!(report.score, 1);
        assert_eq!(percentage(report.score, report.total), 20.0);
        assert!(!report.passed);
    }

    #[test]
    fn exactly_on_the_threshold_passes() {
        let answers = vec![answer(1, vec![A]), answer(2, vec![B])];
        let report = grade(&answers, &five_keys(), 50);
        assert!(report.passed);
    }

    #[test]
    fn denominator_is_answers_submitted_not_chapter_size() {
        // The chapter has five questions but only two are answered, both correctly.
        let answers = vec![answer(1, vec![A]), answer(2, vec![A])];
        let report = grade(&answers, &five_keys(), 90);

        assert_eq!(report.total, 2);
        assert_eq!(percentage(report.score, report.total), 100.0);
        assert!(report.passed);
    }

    #[test]
    fn unknown_questions_are_skipped_but_still_counted() {
        let answers = vec![answer(1, vec![A]), answer(999, vec![A])];
        let report = grade(&answers, &five_keys(), 40);

        assert_eq!(report.score, 1);
        assert_eq!(report.total, 2);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].mcq_id, 1);
        assert!(report.passed);
    }

    #[test]
    fn passing_threshold_defaults_to_forty() {
        assert_eq!(resolve_passing_percentage(None), 40);
        assert_eq!(resolve_passing_percentage(Some(0)), 40);
        assert_eq!(resolve_passing_percentage(Some(75)), 75);
    }

    #[test]
    fn graded_answer_serializes_in_camel_case() {
        let report = grade(&[answer(1, vec![A])], &five_keys(), 40);
        let json = serde_json::to_value(&report.results[0]).unwrap();
        assert_eq!(json["mcqId"], 1);
        assert_eq!(json["isCorrect"], true);
        assert_eq!(json["correctOptions"], serde_json::json!(["A"]));
        assert_eq!(json["userAnswers"], serde_json::json!(["A"]));
    }
}
