// src/gamification/points.rs

use serde::Serialize;

use crate::{config::SECONDS_PER_QUESTION, grading::percentage};

/// Base tiers, highest first. Only the first qualifying tier applies.
pub const POINT_TIERS: [(i32, i32); 5] = [(90, 50), (80, 40), (70, 30), (60, 20), (50, 10)];

pub const PERFECT_SCORE_BONUS: i32 = 25;
pub const SPEED_BONUS: i32 = 15;

/// Chapter settings that decide whether the speed bonus is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pacing {
    /// Minutes; only its presence matters here.
    pub time_limit: Option<i32>,
    pub questions_per_test: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PointsAward {
    pub base: i32,
    pub perfect_bonus: i32,
    pub speed_bonus: i32,
}

impl PointsAward {
    pub fn total(&self) -> i32 {
        self.base + self.perfect_bonus + self.speed_bonus
    }
}

/// Tiered base points for `score` correct out of `total`.
pub fn base_points(score: i32, total: i32) -> i32 {
    let percentage = percentage(score, total);
    POINT_TIERS
        .iter()
        .find(|(threshold, _)| percentage >= f64::from(*threshold))
        .map_or(0, |(_, points)| *points)
}

/// True when the attempt beat the expected pace of two minutes per question by 2x.
pub fn earns_speed_bonus(time_taken: Option<i32>, pacing: &Pacing) -> bool {
    let configured = |v: Option<i32>| v.filter(|n| *n > 0);

    match (
        configured(pacing.time_limit),
        configured(pacing.questions_per_test),
        time_taken,
    ) {
        (Some(_), Some(per_test), Some(taken)) => {
            let expected = i64::from(per_test) * SECONDS_PER_QUESTION;
            i64::from(taken) * 2 < expected
        }
        _ => false,
    }
}

/// Full award for one attempt. An empty attempt earns nothing, bonuses included.
pub fn calculate(score: i32, total: i32, time_taken: Option<i32>, pacing: &Pacing) -> PointsAward {
    if total <= 0 {
        return PointsAward::default();
    }
    let perfect = percentage(score, total) == 100.0;

    PointsAward {
        base: base_points(score, total),
        perfect_bonus: if perfect { PERFECT_SCORE_BONUS } else { 0 },
        speed_bonus: if earns_speed_bonus(time_taken, pacing) {
            SPEED_BONUS
        } else {
            0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMED: Pacing = Pacing {
        time_limit: Some(20),
        questions_per_test: Some(10),
    };

    #[test]
    fn tiers_are_exclusive() {
        // 19/20 = 95%
        assert_eq!(base_points(19, 20), 50);
        assert_eq!(base_points(9, 10), 50);
        assert_eq!(base_points(8, 10), 40);
        assert_eq!(base_points(7, 10), 30);
        assert_eq!(base_points(6, 10), 20);
        assert_eq!(base_points(5, 10), 10);
        assert_eq!(base_points(49, 100), 0);
        assert_eq!(base_points(0, 10), 0);
    }

    #[test]
    fn tiers_are_monotonic() {
        let mut last = 0;
        for score in 0..=100 {
            let points = base_points(score, 100);
            assert!(points >= last, "{score}% gave {points} < {last}");
            last = points;
        }
    }

    #[test]
    fn perfect_score_stacks_with_top_tier() {
        let award = calculate(10, 10, None, &Pacing::default());
        assert_eq!(award.base, 50);
        assert_eq!(award.perfect_bonus, 25);
        assert_eq!(award.total(), 75);
    }

    #[test]
    fn empty_attempt_earns_nothing() {
        // Fast enough for the speed bonus, but there was nothing to grade.
        assert!(earns_speed_bonus(Some(1), &TIMED));
        assert_eq!(calculate(0, 0, Some(1), &TIMED), PointsAward::default());
        assert_eq!(calculate(0, -3, Some(1), &TIMED).total(), 0);
    }

    #[test]
    fn speed_bonus_needs_both_limits_configured() {
        // Expected pace for 10 questions is 1200s; half is 600s.
        assert!(earns_speed_bonus(Some(599), &TIMED));
        assert!(!earns_speed_bonus(Some(600), &TIMED));
        assert!(!earns_speed_bonus(None, &TIMED));

        let untimed = Pacing {
            time_limit: None,
            ..TIMED
        };
        assert!(!earns_speed_bonus(Some(1), &untimed));

        let no_count = Pacing {
            questions_per_test: None,
            ..TIMED
        };
        assert!(!earns_speed_bonus(Some(1), &no_count));

        let zeroed = Pacing {
            time_limit: Some(0),
            ..TIMED
        };
        assert!(!earns_speed_bonus(Some(1), &zeroed));
    }

    #[test]
    fn fast_perfect_run_earns_everything() {
        let award = calculate(10, 10, Some(300), &TIMED);
        assert_eq!(award.total(), 50 + 25 + 15);
    }

    #[test]
    fn speed_bonus_applies_even_below_the_tiers() {
        let award = calculate(1, 10, Some(60), &TIMED);
        assert_eq!(award.base, 0);
        assert_eq!(award.total(), 15);
    }
}
