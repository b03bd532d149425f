use std::collections::VecDeque;

use anyhow::{Context, ensure};
use rand::{Rng as _, SeedableRng as _};
use rand_distr::Normal;
use rand_pcg::Pcg32;
use towerstack_engine::{BlockHandle, RecordingHost, TowerSession};

/// Decides, frame by frame, when to drop the moving block.
pub trait Player {
    fn should_activate(&mut self, session: &TowerSession<RecordingHost>, frame: u64) -> bool;

    /// `true` once the player will never activate again.
    fn is_exhausted(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
struct Aim {
    block: BlockHandle,
    target: f32,
    last_offset: Option<f32>,
}

/// Bot that tries to drop each block centered on the top of the tower.
///
/// For every new block it picks a target position on the travel axis: the
/// reference center plus a normally distributed aiming error. It drops the
/// block on the first frame the block reaches or passes that target.
#[derive(Debug, Clone)]
pub struct AimPlayer {
    rng: Pcg32,
    error: Normal<f32>,
    aim: Option<Aim>,
}

impl AimPlayer {
    pub fn new(seed: u64, aim_error: f32) -> anyhow::Result<Self> {
        ensure!(
            aim_error.is_finite() && aim_error >= 0.0,
            "aim error must be finite and non-negative, got {aim_error}"
        );
        let error = Normal::new(0.0, aim_error)
            .with_context(|| format!("Invalid aim error: {aim_error}"))?;
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            error,
            aim: None,
        })
    }
}

impl Player for AimPlayer {
    fn should_activate(&mut self, session: &TowerSession<RecordingHost>, _frame: u64) -> bool {
        let (Some(block), Some(reference)) = (session.moving_block(), session.reference_block())
        else {
            return false;
        };
        // Without an embedded mover the block never moves on its own.
        let Some(axis) = session.mover().and_then(|mover| mover.axes().iter().next()) else {
            return true;
        };

        if self
            .aim
            .as_ref()
            .is_some_and(|aim| aim.block != block.handle())
        {
            self.aim = None;
        }
        let aim = self.aim.get_or_insert_with(|| Aim {
            block: block.handle(),
            target: reference.rect().center.get(axis) + self.rng.sample(self.error),
            last_offset: None,
        });

        let offset = block.rect().center.get(axis) - aim.target;
        let crossed = offset == 0.0
            || aim
                .last_offset
                .is_some_and(|last| last.signum() != offset.signum());
        aim.last_offset = Some(offset);
        crossed
    }
}

/// Replays activations at fixed frame indices.
#[derive(Debug, Clone)]
pub struct ReplayPlayer {
    frames: VecDeque<u64>,
}

impl ReplayPlayer {
    pub fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl Player for ReplayPlayer {
    fn should_activate(&mut self, _session: &TowerSession<RecordingHost>, frame: u64) -> bool {
        if self.frames.front() == Some(&frame) {
            self.frames.pop_front();
            return true;
        }
        false
    }

    fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use towerstack_engine::{MotionSource, TowerConfig};

    use super::*;

    fn started(config: TowerConfig) -> TowerSession<RecordingHost> {
        let mut session = TowerSession::new(config, RecordingHost::new()).unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn test_exact_aim_drops_on_first_frame() {
        let session = started(TowerConfig::default());
        let mut player = AimPlayer::new(0, 0.0).unwrap();
        assert!(player.should_activate(&session, 0));
    }

    #[test]
    fn test_aim_waits_until_target_is_crossed() {
        let mut session = started(TowerConfig::default());
        let mut player = AimPlayer::new(0, 0.0).unwrap();
        player.aim = Some(Aim {
            block: session.moving_block().unwrap().handle(),
            target: 0.5,
            last_offset: None,
        });

        assert!(!player.should_activate(&session, 0));
        session.on_tick(0.1);
        assert!(!player.should_activate(&session, 1));
        session.on_tick(0.1);
        assert!(player.should_activate(&session, 2));
    }

    #[test]
    fn test_host_motion_drops_immediately() {
        let session = started(TowerConfig {
            motion: MotionSource::Host,
            ..TowerConfig::default()
        });
        let mut player = AimPlayer::new(0, 1.0).unwrap();
        assert!(player.should_activate(&session, 0));
    }

    #[test]
    fn test_negative_aim_error_is_rejected() {
        assert!(AimPlayer::new(0, -1.0).is_err());
        assert!(AimPlayer::new(0, f32::NAN).is_err());
        assert!(AimPlayer::new(0, f32::INFINITY).is_err());
    }

    #[test]
    fn test_replay_player_fires_on_recorded_frames() {
        let session = started(TowerConfig::default());
        let mut player = ReplayPlayer::new([1, 3]);
        let fired = (0..5)
            .filter(|&frame| player.should_activate(&session, frame))
            .collect::<Vec<_>>();
        assert_eq!(fired, [1, 3]);
        assert!(player.is_exhausted());
    }
}
