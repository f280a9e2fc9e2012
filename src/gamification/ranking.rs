// src/gamification/ranking.rs

use serde::Serialize;
use sqlx::FromRow;

/// An active student eligible for ranking.
#[derive(Debug, Clone, FromRow)]
pub struct RankCandidate {
    pub user_id: i64,
    pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankAssignment {
    pub user_id: i64,
    pub rank: i32,
}

/// Total order: points descending, then user id ascending. Ranks run 1..=N
/// with no gaps and no ties.
pub fn assign_ranks(mut candidates: Vec<RankCandidate>) -> Vec<RankAssignment> {
    candidates.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(a.user_id.cmp(&b.user_id))
    });

    candidates
        .into_iter()
        .zip(1..)
        .map(|(candidate, rank)| RankAssignment {
            user_id: candidate.user_id,
            rank,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(user_id: i64, total_points: i64) -> RankCandidate {
        RankCandidate {
            user_id,
            total_points,
        }
    }

    #[test]
    fn orders_by_points_then_id() {
        let ranks = assign_ranks(vec![
            candidate(5, 100),
            candidate(2, 300),
            candidate(9, 100),
            candidate(1, 100),
        ]);

        assert_eq!(
            ranks,
            vec![
                RankAssignment { user_id: 2, rank: 1 },
                RankAssignment { user_id: 1, rank: 2 },
                RankAssignment { user_id: 5, rank: 3 },
                RankAssignment { user_id: 9, rank: 4 },
            ]
        );
    }

    #[test]
    fn more_points_always_means_better_rank() {
        let candidates: Vec<_> = (1..=50).map(|id| candidate(id, (id * 37) % 11)).collect();
        let points: std::collections::HashMap<i64, i64> =
            candidates.iter().map(|c| (c.user_id, c.total_points)).collect();
        let ranks = assign_ranks(candidates);

        for a in &ranks {
            for b in &ranks {
                if points[&a.user_id] > points[&b.user_id] {
                    assert!(a.rank < b.rank);
                }
            }
        }
        let mut seen: Vec<i32> = ranks.iter().map(|r| r.rank).collect();
        seen.sort();
        assert_eq!(seen, (1..=50).collect::<Vec<i32>>());
    }

    #[test]
    fn empty_input_yields_no_ranks() {
        assert!(assign_ranks(Vec::new()).is_empty());
    }
}
