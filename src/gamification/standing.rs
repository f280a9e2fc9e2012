// src/gamification/standing.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::streak::next_streak;

/// A student's denormalised gamification aggregate (columns on `users`).
///
/// Every change goes through one of the commands below, each returning a new
/// value. None of them touch `rank`, which only the ranking pass rewrites, so
/// it stays stale in between.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Standing {
    pub total_points: i64,
    pub streak_days: i32,
    pub last_activity: Option<DateTime<Utc>>,
    pub rank: Option<i32>,
}

impl Standing {
    /// AwardPoints: adds a non-negative award and stamps the activity time.
    pub fn award_points(&self, points: i32, at: DateTime<Utc>) -> Self {
        Self {
            total_points: self.total_points + i64::from(points.max(0)),
            last_activity: Some(at),
            ..self.clone()
        }
    }

    /// UpdateStreak: day delta between the prior activity and `at`.
    pub fn update_streak(&self, prior_activity: Option<DateTime<Utc>>, at: DateTime<Utc>) -> Self {
        Self {
            streak_days: next_streak(
                self.streak_days,
                prior_activity.map(|t| t.date_naive()),
                at.date_naive(),
            ),
            ..self.clone()
        }
    }

    /// A graded attempt: points first, then the streak against the activity
    /// recorded before this attempt.
    pub fn record_attempt(&self, points: i32, at: DateTime<Utc>) -> Self {
        let prior_activity = self.last_activity;
        self.award_points(points, at).update_streak(prior_activity, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fresh() -> Standing {
        Standing {
            total_points: 0,
            streak_days: 0,
            last_activity: None,
            rank: None,
        }
    }

    fn noon(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn first_attempt_starts_streak_and_adds_points() {
        let next = fresh().record_attempt(75, noon(1));
        assert_eq!(next.total_points, 75);
        assert_eq!(next.streak_days, 1);
        assert_eq!(next.last_activity, Some(noon(1)));
    }

    #[test]
    fn streak_uses_prior_activity_not_the_new_stamp() {
        let day_one = fresh().record_attempt(10, noon(1));
        let day_two = day_one.record_attempt(10, noon(2));
        assert_eq!(day_two.streak_days, 2);

        let same_day = day_two.record_attempt(10, noon(2) + Duration::hours(3));
        assert_eq!(same_day.streak_days, 2);

        let after_gap = same_day.record_attempt(10, noon(5));
        assert_eq!(after_gap.streak_days, 1);
        assert_eq!(after_gap.total_points, 40);
    }

    #[test]
    fn points_never_decrease() {
        let start = fresh().award_points(30, noon(1));
        let next = start.award_points(-5, noon(2));
        assert_eq!(next.total_points, 30);
    }

    #[test]
    fn rank_is_left_stale_by_attempts() {
        let ranked = Standing {
            rank: Some(7),
            ..fresh()
        };
        let next = ranked.record_attempt(50, noon(3));
        assert_eq!(next.rank, Some(7));
    }
}
