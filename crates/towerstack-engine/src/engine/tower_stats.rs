use serde::{Deserialize, Serialize};

use crate::core::PlacementGrade;

/// Running totals for one tower.
///
/// - **Score**: 10 points per perfect placement, 5 per other placement
/// - **Placements**: successful drops (the height of the tower above the base)
/// - **Perfect streak**: consecutive perfect placements ending at the latest drop
///
/// A missed drop ends the run and is not counted here.
///
/// # Example
///
/// ```
/// use towerstack_engine::{PlacementGrade, TowerStats};
///
/// let mut stats = TowerStats::new();
/// stats.record_placement(PlacementGrade::Perfect);
/// stats.record_placement(PlacementGrade::Placed);
///
/// assert_eq!(stats.score(), 15);
/// assert_eq!(stats.placements(), 2);
/// assert_eq!(stats.longest_perfect_streak(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerStats {
    score: usize,
    placements: usize,
    perfect_placements: usize,
    perfect_streak: usize,
    longest_perfect_streak: usize,
}

impl TowerStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            placements: 0,
            perfect_placements: 0,
            perfect_streak: 0,
            longest_perfect_streak: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn placements(&self) -> usize {
        self.placements
    }

    #[must_use]
    pub const fn perfect_placements(&self) -> usize {
        self.perfect_placements
    }

    #[must_use]
    pub const fn perfect_streak(&self) -> usize {
        self.perfect_streak
    }

    #[must_use]
    pub const fn longest_perfect_streak(&self) -> usize {
        self.longest_perfect_streak
    }

    /// Updates the totals after a successful drop.
    pub fn record_placement(&mut self, grade: PlacementGrade) {
        self.placements += 1;
        self.score += grade.score();
        if grade.is_perfect() {
            self.perfect_placements += 1;
            self.perfect_streak += 1;
            self.longest_perfect_streak = self.longest_perfect_streak.max(self.perfect_streak);
        } else {
            self.perfect_streak = 0;
        }
    }
}
