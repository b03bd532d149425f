use serde::{Deserialize, Serialize};

use crate::{
    ConfigurationError,
    core::{AxisSet, DEFAULT_PERFECT_THRESHOLD, Vec3},
};

use super::spawn::TowerSeed;

/// Where a freshly spawned block starts along its travel axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnOrigin {
    /// Directly above the top block's center; the block bounces around it.
    #[default]
    Center,
    /// At `-spawn_boundary` in world space, heading toward positive.
    Boundary,
}

/// Axis each new block travels along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnAxis {
    #[default]
    X,
    Z,
    /// X for the first moving block, then Z, then X again.
    Alternate,
    /// Uniformly random per block, drawn from the seeded generator.
    Random,
}

impl SpawnAxis {
    /// Every axis a block spawned under this policy may travel along.
    #[must_use]
    pub const fn axes(self) -> AxisSet {
        match self {
            Self::X => AxisSet::X,
            Self::Z => AxisSet::Z,
            Self::Alternate | Self::Random => AxisSet::XZ,
        }
    }
}

/// Who integrates the moving block's position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionSource {
    /// The session owns a [`Mover`](super::Mover) advanced by `on_tick`.
    #[default]
    Embedded,
    /// The host moves the block; the session samples its pose on activation.
    Host,
}

/// Tuning for one run of the tower.
///
/// Every field has a default, so a JSON file only needs the values it
/// changes.
///
/// ```
/// use towerstack_engine::{SpawnAxis, TowerConfig};
///
/// let config: TowerConfig = serde_json::from_str(r#"{ "spawn_axis": "alternate" }"#).unwrap();
/// assert_eq!(config.spawn_axis, SpawnAxis::Alternate);
/// assert_eq!(config.move_speed, 3.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    /// Size of the base block and of the first moving block. `y` is the
    /// height of every block in the run.
    pub block_size: Vec3,
    /// Largest per-axis offset that still counts as a perfect drop.
    pub perfect_threshold: f32,
    /// Travel speed of moving blocks, in units per second.
    pub move_speed: f32,
    /// Distance from the spawn point at which a moving block turns around.
    pub travel_limit: f32,
    /// Spawn distance used by [`SpawnOrigin::Boundary`].
    pub spawn_boundary: f32,
    pub spawn_origin: SpawnOrigin,
    pub spawn_axis: SpawnAxis,
    /// Axes compared and trimmed on each drop.
    pub align_axes: AxisSet,
    pub motion: MotionSource,
    /// Seed for [`SpawnAxis::Random`]; a fresh one is drawn when absent.
    pub seed: Option<TowerSeed>,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            block_size: Vec3::new(2.0, 1.0, 2.0),
            perfect_threshold: DEFAULT_PERFECT_THRESHOLD,
            move_speed: 3.0,
            travel_limit: 3.0,
            spawn_boundary: 5.0,
            spawn_origin: SpawnOrigin::default(),
            spawn_axis: SpawnAxis::default(),
            align_axes: AxisSet::XZ,
            motion: MotionSource::default(),
            seed: None,
        }
    }
}

impl TowerConfig {
    /// Checks that a run can start with these values.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let size = self.block_size;
        if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
            return Err(ConfigurationError::InvalidBlockSize { size });
        }
        if !self.perfect_threshold.is_finite() || self.perfect_threshold < 0.0 {
            return Err(ConfigurationError::InvalidPerfectThreshold {
                value: self.perfect_threshold,
            });
        }
        if !self.move_speed.is_finite() || self.move_speed < 0.0 {
            return Err(ConfigurationError::InvalidMoveSpeed {
                value: self.move_speed,
            });
        }
        if !self.travel_limit.is_finite() || self.travel_limit <= 0.0 {
            return Err(ConfigurationError::InvalidTravelLimit {
                value: self.travel_limit,
            });
        }
        if !self.spawn_boundary.is_finite() || self.spawn_boundary < 0.0 {
            return Err(ConfigurationError::InvalidSpawnBoundary {
                value: self.spawn_boundary,
            });
        }
        if self.align_axes.is_empty() {
            return Err(ConfigurationError::NoAlignAxes);
        }
        // A block travelling along an axis alignment ignores could never miss.
        let spawn_axes = self.spawn_axis.axes();
        if !spawn_axes.iter().all(|axis| self.align_axes.contains(axis)) {
            return Err(ConfigurationError::UnalignedSpawnAxis {
                spawn_axes,
                align_axes: self.align_axes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(TowerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_missing_footprint() {
        let config = TowerConfig {
            block_size: Vec3::new(0.0, 1.0, 2.0),
            ..TowerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidBlockSize { .. })
        ));

        let config = TowerConfig {
            block_size: Vec3::new(2.0, f32::NAN, 2.0),
            ..TowerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_tuning() {
        let base = TowerConfig::default();
        let cases = [
            TowerConfig {
                perfect_threshold: -0.1,
                ..base.clone()
            },
            TowerConfig {
                move_speed: f32::INFINITY,
                ..base.clone()
            },
            TowerConfig {
                travel_limit: 0.0,
                ..base.clone()
            },
            TowerConfig {
                spawn_boundary: -1.0,
                ..base.clone()
            },
            TowerConfig {
                align_axes: AxisSet::EMPTY,
                ..base.clone()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_rejects_spawn_axis_outside_alignment() {
        for spawn_axis in [SpawnAxis::Z, SpawnAxis::Alternate, SpawnAxis::Random] {
            let config = TowerConfig {
                align_axes: AxisSet::X,
                spawn_axis,
                ..TowerConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigurationError::UnalignedSpawnAxis {
                    spawn_axes: spawn_axis.axes(),
                    align_axes: AxisSet::X,
                })
            );
        }

        let config = TowerConfig {
            align_axes: AxisSet::Z,
            spawn_axis: SpawnAxis::Z,
            ..TowerConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TowerConfig =
            serde_json::from_str(r#"{ "align_axes": "x", "motion": "host" }"#).unwrap();
        assert_eq!(config.align_axes, AxisSet::X);
        assert_eq!(config.motion, MotionSource::Host);
        assert_eq!(config.block_size, Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(config.spawn_origin, SpawnOrigin::Center);
    }

    #[test]
    fn test_error_message() {
        let err = ConfigurationError::InvalidTravelLimit { value: 0.0 };
        assert_eq!(err.to_string(), "travel limit must be finite and positive, got 0");
    }
}
