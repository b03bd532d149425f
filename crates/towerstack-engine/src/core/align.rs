use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::geometry::{Axis, AxisSet, Rect3, Vec3};

/// Smallest footprint extent a kept block may have.
pub const MIN_BLOCK_SIZE: f32 = 0.01;

/// Overhangs at or below this extent are not worth a falling piece.
pub const MIN_CUT_SIZE: f32 = 1e-4;

/// Default tolerance within which a drop counts as perfect.
pub const DEFAULT_PERFECT_THRESHOLD: f32 = 0.05;

/// How well a successful drop lined up with the block beneath.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum PlacementGrade {
    /// Every aligned axis was within the perfect threshold.
    #[display("perfect")]
    Perfect,
    #[display("placed")]
    Placed,
}

impl PlacementGrade {
    /// Points awarded for a placement of this grade.
    #[must_use]
    pub const fn score(self) -> usize {
        match self {
            Self::Perfect => 10,
            Self::Placed => 5,
        }
    }
}

/// Overhang sliced off along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingCut {
    pub axis: Axis,
    pub rect: Rect3,
}

/// Result of a drop that overlapped the block beneath on every aligned axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    kept: Rect3,
    cuts: ArrayVec<FallingCut, 2>,
    delta: Vec3,
    grade: PlacementGrade,
}

impl Placement {
    /// Geometry of the block that stays on the tower.
    #[must_use]
    pub fn kept(&self) -> &Rect3 {
        &self.kept
    }

    /// Overhangs to release, X cut first.
    #[must_use]
    pub fn cuts(&self) -> &[FallingCut] {
        &self.cuts
    }

    /// Offset of the dropped block from the block beneath, before trimming.
    ///
    /// Axes that were not aligned report zero; `y` is always zero.
    #[must_use]
    pub fn delta(&self) -> Vec3 {
        self.delta
    }

    #[must_use]
    pub fn grade(&self) -> PlacementGrade {
        self.grade
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AlignOutcome {
    Placed(Placement),
    /// No overlap on at least one axis; the whole block falls unmodified.
    Missed { falling: Rect3 },
}

impl AlignOutcome {
    /// Points this outcome is worth.
    #[must_use]
    pub fn score_delta(&self) -> usize {
        match self {
            Self::Placed(placement) => placement.grade.score(),
            Self::Missed { .. } => 0,
        }
    }

    /// Every rectangle that leaves the tower as a result of this drop.
    pub fn falling_rects(&self) -> impl Iterator<Item = Rect3> + '_ {
        let (cuts, missed) = match self {
            Self::Placed(placement) => (placement.cuts(), None),
            Self::Missed { falling } => (&[][..], Some(*falling)),
        };
        cuts.iter().map(|cut| cut.rect).chain(missed)
    }
}

/// Trims a dropped block against the block beneath it.
///
/// `prev` is the top of the tower and `curr` the block that was just
/// stopped. Only the axes in `axes` are compared and trimmed; any other
/// horizontal axis keeps `curr`'s geometry. The kept block takes `prev`'s
/// height and `curr`'s vertical position.
///
/// When both axes overhang, each falling piece uses the other axis's trimmed
/// extent, so the pieces never overlap each other or the kept block.
///
/// # Example
///
/// ```
/// use towerstack_engine::{AlignOutcome, AxisSet, Rect3, Vec3, align};
///
/// let prev = Rect3::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 2.0));
/// let curr = Rect3::new(Vec3::new(0.5, 1.0, 0.0), Vec3::new(2.0, 1.0, 2.0));
///
/// let AlignOutcome::Placed(placement) = align(&prev, &curr, AxisSet::X, 0.05) else {
///     panic!("expected overlap");
/// };
/// assert_eq!(placement.kept().size.x, 1.5);
/// assert_eq!(placement.kept().center.x, 0.25);
/// assert_eq!(placement.cuts()[0].rect.center.x, 1.25);
/// ```
#[must_use]
pub fn align(prev: &Rect3, curr: &Rect3, axes: AxisSet, perfect_threshold: f32) -> AlignOutcome {
    let mut delta = Vec3::ZERO;
    for axis in axes.iter() {
        let d = curr.center.get(axis) - prev.center.get(axis);
        if prev.size.get(axis) - d.abs() <= 0.0 {
            return AlignOutcome::Missed { falling: *curr };
        }
        delta.set(axis, d);
    }

    let mut kept = Rect3::new(
        curr.center,
        Vec3::new(curr.size.x, prev.size.y, curr.size.z),
    );
    for axis in axes.iter() {
        let d = delta.get(axis);
        let overlap = prev.size.get(axis) - d.abs();
        kept.size.set(axis, overlap.max(MIN_BLOCK_SIZE));
        kept.center.set(axis, prev.center.get(axis) + d / 2.0);
    }

    let mut cuts = ArrayVec::new();
    for axis in axes.iter() {
        let kept_size = kept.size.get(axis);
        let cut = curr.size.get(axis) - kept_size;
        if cut <= MIN_CUT_SIZE {
            continue;
        }
        let dir = if delta.get(axis) > 0.0 { 1.0 } else { -1.0 };
        let cut_center = kept.center.get(axis) + dir * (kept_size / 2.0 + cut / 2.0);
        let size = Vec3::new(kept.size.x, curr.size.y, kept.size.z);
        cuts.push(FallingCut {
            axis,
            rect: Rect3::new(kept.center.with(axis, cut_center), size.with(axis, cut)),
        });
    }

    let grade = if axes
        .iter()
        .all(|axis| delta.get(axis).abs() <= perfect_threshold)
    {
        PlacementGrade::Perfect
    } else {
        PlacementGrade::Placed
    };

    AlignOutcome::Placed(Placement {
        kept,
        cuts,
        delta,
        grade,
    })
}
