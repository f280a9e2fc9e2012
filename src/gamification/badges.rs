// src/gamification/badges.rs

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Every badge the platform knows how to award. Stored as `badges.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    FirstSteps,
    BronzeAchiever,
    SilverStar,
    GoldChampion,
    DiamondElite,
    ThreeDayStreak,
    WeekWarrior,
    MonthMaster,
    PerfectScore,
}

/// Threshold a badge is tied to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BadgeCondition {
    Attempts(i64),
    Points(i64),
    Streak(i32),
    PerfectScore,
}

/// Aggregates the predicates are evaluated against.
#[derive(Debug, Clone, Default, FromRow)]
pub struct BadgeSnapshot {
    pub total_points: i64,
    pub streak_days: i32,
    pub total_attempts: i64,
    /// Best percentage over all attempts, `None` with no attempts.
    pub best_percentage: Option<f64>,
}

/// A row of the `badges` table.
#[derive(Debug, Clone, FromRow)]
pub struct CatalogBadge {
    pub id: i64,
    pub code: String,
    pub name: String,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 9] = [
        BadgeKind::FirstSteps,
        BadgeKind::BronzeAchiever,
        BadgeKind::SilverStar,
        BadgeKind::GoldChampion,
        BadgeKind::DiamondElite,
        BadgeKind::ThreeDayStreak,
        BadgeKind::WeekWarrior,
        BadgeKind::MonthMaster,
        BadgeKind::PerfectScore,
    ];

    pub fn code(self) -> &'static str {
        match self {
            BadgeKind::FirstSteps => "first_steps",
            BadgeKind::BronzeAchiever => "bronze_achiever",
            BadgeKind::SilverStar => "silver_star",
            BadgeKind::GoldChampion => "gold_champion",
            BadgeKind::DiamondElite => "diamond_elite",
            BadgeKind::ThreeDayStreak => "three_day_streak",
            BadgeKind::WeekWarrior => "week_warrior",
            BadgeKind::MonthMaster => "month_master",
            BadgeKind::PerfectScore => "perfect_score",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn condition(self) -> BadgeCondition {
        match self {
            BadgeKind::FirstSteps => BadgeCondition::Attempts(1),
            BadgeKind::BronzeAchiever => BadgeCondition::Points(100),
            BadgeKind::SilverStar => BadgeCondition::Points(500),
            BadgeKind::GoldChampion => BadgeCondition::Points(1000),
            BadgeKind::DiamondElite => BadgeCondition::Points(5000),
            BadgeKind::ThreeDayStreak => BadgeCondition::Streak(3),
            BadgeKind::WeekWarrior => BadgeCondition::Streak(7),
            BadgeKind::MonthMaster => BadgeCondition::Streak(30),
            BadgeKind::PerfectScore => BadgeCondition::PerfectScore,
        }
    }

    pub fn is_earned(self, snapshot: &BadgeSnapshot) -> bool {
        match self.condition() {
            BadgeCondition::Attempts(min) => snapshot.total_attempts >= min,
            BadgeCondition::Points(min) => snapshot.total_points >= min,
            BadgeCondition::Streak(min) => snapshot.streak_days >= min,
            BadgeCondition::PerfectScore => snapshot.best_percentage == Some(100.0),
        }
    }
}

/// Catalog badges not yet in `earned` whose predicate holds for `snapshot`.
/// Badges with an unrecognised code are never awarded.
pub fn select_awards<'a>(
    catalog: &'a [CatalogBadge],
    earned: &HashSet<i64>,
    snapshot: &BadgeSnapshot,
) -> Vec<&'a CatalogBadge> {
    catalog
        .iter()
        .filter(|badge| !earned.contains(&badge.id))
        .filter(|badge| match BadgeKind::from_code(&badge.code) {
            Some(kind) => kind.is_earned(snapshot),
            None => {
                tracing::warn!(code = %badge.code, "badge has no known award condition");
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CatalogBadge> {
        BadgeKind::ALL
            .iter()
            .zip(1..)
            .map(|(kind, id)| CatalogBadge {
                id,
                code: kind.code().to_string(),
                name: format!("{kind:?}"),
            })
            .collect()
    }

    fn codes(awards: &[&CatalogBadge]) -> Vec<String> {
        awards.iter().map(|b| b.code.clone()).collect()
    }

    #[test]
    fn codes_round_trip_and_match_serde() {
        for kind in BadgeKind::ALL {
            assert_eq!(BadgeKind::from_code(kind.code()), Some(kind));
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.code());
        }
        assert_eq!(BadgeKind::from_code("mystery"), None);
    }

    #[test]
    fn point_tiers_unlock_in_order() {
        let snapshot = BadgeSnapshot {
            total_points: 500,
            total_attempts: 3,
            ..Default::default()
        };
        let catalog = catalog();
        let awards = select_awards(&catalog, &HashSet::new(), &snapshot);
        assert_eq!(
            codes(&awards),
            vec!["first_steps", "bronze_achiever", "silver_star"]
        );
    }

    #[test]
    fn streak_badges_follow_streak_days() {
        let snapshot = BadgeSnapshot {
            streak_days: 7,
            ..Default::default()
        };
        assert!(BadgeKind::ThreeDayStreak.is_earned(&snapshot));
        assert!(BadgeKind::WeekWarrior.is_earned(&snapshot));
        assert!(!BadgeKind::MonthMaster.is_earned(&snapshot));
        assert!(!BadgeKind::FirstSteps.is_earned(&snapshot));
    }

    #[test]
    fn perfect_score_needs_exactly_one_hundred() {
        let mut snapshot = BadgeSnapshot {
            best_percentage: Some(99.99),
            ..Default::default()
        };
        assert!(!BadgeKind::PerfectScore.is_earned(&snapshot));
        snapshot.best_percentage = Some(100.0);
        assert!(BadgeKind::PerfectScore.is_earned(&snapshot));
        snapshot.best_percentage = None;
        assert!(!BadgeKind::PerfectScore.is_earned(&snapshot));
    }

    #[test]
    fn evaluating_twice_awards_nothing_new() {
        let catalog = catalog();
        let snapshot = BadgeSnapshot {
            total_points: 1200,
            streak_days: 3,
            total_attempts: 10,
            best_percentage: Some(100.0),
        };
        let mut earned = HashSet::new();

        let first: Vec<i64> = select_awards(&catalog, &earned, &snapshot)
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(first.len(), 6);
        earned.extend(first);

        assert!(select_awards(&catalog, &earned, &snapshot).is_empty());
    }

    #[test]
    fn earned_badges_are_never_revoked_or_reconsidered() {
        let catalog = catalog();
        // Gold was earned earlier; the snapshot no longer qualifies for it.
        let earned: HashSet<i64> = [4].into();
        let snapshot = BadgeSnapshot {
            total_points: 150,
            total_attempts: 1,
            ..Default::default()
        };
        let awards = select_awards(&catalog, &earned, &snapshot);
        assert_eq!(codes(&awards), vec!["first_steps", "bronze_achiever"]);
    }

    #[test]
    fn unknown_codes_are_skipped() {
        let catalog = vec![CatalogBadge {
            id: 1,
            code: "night_owl".into(),
            name: "Night Owl".into(),
        }];
        let snapshot = BadgeSnapshot {
            total_points: 10_000,
            ..Default::default()
        };
        assert!(select_awards(&catalog, &HashSet::new(), &snapshot).is_empty());
    }
}
