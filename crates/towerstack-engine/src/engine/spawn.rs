use std::fmt;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Axis, Rect3, Vec3};

use super::config::{SpawnAxis, SpawnOrigin, TowerConfig};

/// Seed for the generator behind [`SpawnAxis::Random`].
///
/// A 128-bit value serialized as a 32-character hex string, so a recorded
/// run can be replayed with the same sequence of travel axes.
///
/// ```
/// use rand::Rng as _;
/// use towerstack_engine::TowerSeed;
///
/// let seed: TowerSeed = rand::rng().random();
/// let hex = seed.to_string();
/// assert_eq!(hex.len(), 32);
/// assert_eq!(hex.parse::<TowerSeed>().unwrap(), seed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TowerSeed([u8; 16]);

impl TowerSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for TowerSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl std::str::FromStr for TowerSeed {
    type Err = String;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for TowerSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TowerSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<TowerSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TowerSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        TowerSeed(seed)
    }
}

/// Decides where each new moving block appears and which way it heads.
#[derive(Debug, Clone)]
pub(crate) struct SpawnPlanner {
    rng: Pcg32,
    axis_policy: SpawnAxis,
    origin_policy: SpawnOrigin,
    spawn_boundary: f32,
    spawned: usize,
}

/// Pose and initial heading of the next moving block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SpawnPlan {
    pub(crate) rect: Rect3,
    pub(crate) axis: Axis,
    pub(crate) direction: Vec3,
}

impl SpawnPlanner {
    pub(crate) fn new(config: &TowerConfig, seed: TowerSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            axis_policy: config.spawn_axis,
            origin_policy: config.spawn_origin,
            spawn_boundary: config.spawn_boundary,
            spawned: 0,
        }
    }

    fn next_axis(&mut self) -> Axis {
        let axis = match self.axis_policy {
            SpawnAxis::X => Axis::X,
            SpawnAxis::Z => Axis::Z,
            SpawnAxis::Alternate => Axis::ALL[self.spawned % Axis::ALL.len()],
            SpawnAxis::Random => {
                if self.rng.random_bool(0.5) {
                    Axis::X
                } else {
                    Axis::Z
                }
            }
        };
        self.spawned += 1;
        axis
    }

    /// Plans a block of horizontal size `footprint` one block height above
    /// `reference`.
    ///
    /// On the travel axis the block starts at the configured origin; on the
    /// other axis it lines up with `reference`.
    pub(crate) fn plan(&mut self, reference: &Rect3, footprint: Vec3, height: f32) -> SpawnPlan {
        let axis = self.next_axis();
        let start = match self.origin_policy {
            SpawnOrigin::Center => reference.center.get(axis),
            SpawnOrigin::Boundary => -self.spawn_boundary,
        };
        let center = Vec3::new(
            reference.center.x,
            reference.center.y + height,
            reference.center.z,
        )
        .with(axis, start);
        SpawnPlan {
            rect: Rect3::new(center, Vec3::new(footprint.x, height, footprint.z)),
            axis,
            direction: Vec3::unit(axis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(byte: u8) -> TowerSeed {
        TowerSeed([byte; 16])
    }

    fn reference() -> Rect3 {
        Rect3::new(Vec3::new(0.5, 2.0, -0.25), Vec3::new(1.5, 1.0, 1.75))
    }

    #[test]
    fn test_seed_hex_roundtrip() {
        let seed = TowerSeed([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        let deserialized: TowerSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed);
    }

    #[test]
    fn test_seed_rejects_bad_hex() {
        assert!(serde_json::from_str::<TowerSeed>("\"abc\"").is_err());
        assert!(serde_json::from_str::<TowerSeed>("\"ghijklmnopqrstuvwxyzghijklmnopqr\"").is_err());
    }

    #[test]
    fn test_center_origin_spawns_above_reference() {
        let config = TowerConfig::default();
        let mut planner = SpawnPlanner::new(&config, seed(0));
        let plan = planner.plan(&reference(), Vec3::new(1.5, 0.0, 1.75), 1.0);
        assert_eq!(plan.axis, Axis::X);
        assert_eq!(plan.direction, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(plan.rect.center, Vec3::new(0.5, 3.0, -0.25));
        assert_eq!(plan.rect.size, Vec3::new(1.5, 1.0, 1.75));
    }

    #[test]
    fn test_boundary_origin_uses_world_boundary() {
        let config = TowerConfig {
            spawn_origin: SpawnOrigin::Boundary,
            spawn_axis: SpawnAxis::Z,
            ..TowerConfig::default()
        };
        let mut planner = SpawnPlanner::new(&config, seed(0));
        let plan = planner.plan(&reference(), Vec3::new(1.5, 0.0, 1.75), 1.0);
        assert_eq!(plan.axis, Axis::Z);
        assert_eq!(plan.rect.center, Vec3::new(0.5, 3.0, -5.0));
    }

    #[test]
    fn test_alternate_axis() {
        let config = TowerConfig {
            spawn_axis: SpawnAxis::Alternate,
            ..TowerConfig::default()
        };
        let mut planner = SpawnPlanner::new(&config, seed(0));
        let axes: Vec<_> = (0..4)
            .map(|_| planner.plan(&reference(), Vec3::new(1.0, 0.0, 1.0), 1.0).axis)
            .collect();
        assert_eq!(axes, [Axis::X, Axis::Z, Axis::X, Axis::Z]);
    }

    #[test]
    fn test_random_axis_is_deterministic_per_seed() {
        let config = TowerConfig {
            spawn_axis: SpawnAxis::Random,
            ..TowerConfig::default()
        };
        let mut a = SpawnPlanner::new(&config, seed(7));
        let mut b = SpawnPlanner::new(&config, seed(7));
        for _ in 0..32 {
            let footprint = Vec3::new(1.0, 0.0, 1.0);
            assert_eq!(
                a.plan(&reference(), footprint, 1.0),
                b.plan(&reference(), footprint, 1.0)
            );
        }
    }
}
