// src/gamification/streak.rs

use chrono::NaiveDate;

/// Consecutive-day streak after activity on `today`.
///
/// `last_active_on` must be the date recorded *before* this activity.
/// Same-day (or clock-skewed, future) activity leaves the streak unchanged.
pub fn next_streak(current: i32, last_active_on: Option<NaiveDate>, today: NaiveDate) -> i32 {
    let Some(last) = last_active_on else {
        return 1;
    };

    match (today - last).num_days() {
        1 => current.saturating_add(1),
        gap if gap > 1 => 1,
        _ => current,
    }
}
