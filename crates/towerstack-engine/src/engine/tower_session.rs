use std::time::Duration;

use log::{debug, error, info, warn};
use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigurationError,
    core::{
        AlignOutcome, Block, BlockHandle, BlockKind, BlockState, FallingPiece, Placement, Rect3,
        Vec3, align,
    },
};

use super::{
    config::{MotionSource, TowerConfig},
    host::TowerHost,
    mover::Mover,
    spawn::{SpawnPlanner, TowerSeed},
    tower_stats::TowerStats,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created but not started; nothing has been spawned.
    Idle,
    Running,
    /// Terminal. Activations and ticks are ignored from here on.
    GameOver,
}

/// A drop that landed on the tower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub block: BlockHandle,
    /// Pose of the block at the moment it was stopped.
    pub dropped: Rect3,
    pub placement: Placement,
    /// Total score after this drop.
    pub score: usize,
    pub stack_height: usize,
}

/// A drop that missed the tower entirely and ended the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissReport {
    pub block: BlockHandle,
    pub falling: Rect3,
    pub score: usize,
    pub stack_height: usize,
}

/// What a single activation did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Activation {
    /// No block was moving, or the run is not in progress.
    Ignored,
    Placed(PlacementReport),
    Missed(MissReport),
}

/// Owns the tower and turns activations into placements.
///
/// The session holds the reference block (top of the tower), the single
/// moving block and its [`Mover`], the current footprint, and the running
/// statistics. The host only forwards ticks and activations and simulates
/// released pieces.
///
/// # Example
///
/// ```
/// use towerstack_engine::{RecordingHost, TowerConfig, TowerSession};
///
/// let mut session = TowerSession::new(TowerConfig::default(), RecordingHost::new()).unwrap();
/// session.start().unwrap();
///
/// // Drop the first block before it has moved: a perfect placement.
/// let activation = session.on_activate().unwrap();
/// assert!(activation.is_placed());
/// assert_eq!(session.score(), 10);
/// assert_eq!(session.stack_height(), 1);
///
/// // Let the next block slide far off the tower and drop it.
/// session.on_tick(1.0);
/// assert!(session.on_activate().unwrap().is_missed());
/// assert!(session.is_game_over());
/// ```
#[derive(Debug)]
pub struct TowerSession<H> {
    config: TowerConfig,
    host: H,
    state: SessionState,
    seed: TowerSeed,
    planner: SpawnPlanner,
    reference: Option<Block>,
    moving: Option<Block>,
    mover: Option<Mover>,
    fallen: Option<Block>,
    footprint: Vec3,
    stats: TowerStats,
    elapsed: Duration,
}

impl<H> TowerSession<H>
where
    H: TowerHost,
{
    /// Validates `config` and prepares an idle session.
    ///
    /// When `config.seed` is absent a random one is drawn; it is available
    /// from [`Self::seed`] for replays.
    pub fn new(config: TowerConfig, host: H) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let planner = SpawnPlanner::new(&config, seed);
        let footprint = config.block_size;
        Ok(Self {
            config,
            host,
            state: SessionState::Idle,
            seed,
            planner,
            reference: None,
            moving: None,
            mover: None,
            fallen: None,
            footprint,
            stats: TowerStats::new(),
            elapsed: Duration::ZERO,
        })
    }

    /// Places the base block and spawns the first moving block.
    ///
    /// Does nothing unless the session is idle. If the host cannot create
    /// the base block the session stays idle; if it cannot create the
    /// moving block the session ends.
    pub fn start(&mut self) -> Result<(), ConfigurationError> {
        if !self.state.is_idle() {
            return Ok(());
        }
        let rect = Rect3::new(Vec3::ZERO, self.config.block_size);
        let Some(handle) = self.host.spawn_block(BlockKind::Base, rect) else {
            error!("host could not create the base block");
            return Err(ConfigurationError::MissingBlock {
                kind: BlockKind::Base,
            });
        };
        self.reference = Some(Block::new(handle, rect, BlockState::Placed));
        self.state = SessionState::Running;
        info!("tower started with base block {handle} at {rect}");
        self.spawn_next(&rect)
    }

    /// Advances the moving block by `dt` seconds.
    ///
    /// Only the embedded mover is advanced; with host-driven motion this just
    /// accumulates elapsed time.
    pub fn on_tick(&mut self, dt: f32) {
        if !self.state.is_running() {
            return;
        }
        let Ok(step) = Duration::try_from_secs_f32(dt) else {
            warn!("ignoring invalid tick delta {dt}");
            return;
        };
        self.elapsed += step;

        let (Some(block), Some(mover)) = (self.moving.as_mut(), self.mover.as_mut()) else {
            return;
        };
        mover.advance(dt);
        *block = block.moved_to(*mover.rect());
        self.host.update_pose(block.handle(), *mover.rect());
    }

    /// Stops the moving block and settles it against the top of the tower.
    ///
    /// The moving block is released from the session before alignment runs,
    /// so repeated activations without an intervening spawn are ignored.
    pub fn on_activate(&mut self) -> Result<Activation, ConfigurationError> {
        if !self.state.is_running() {
            return Ok(Activation::Ignored);
        }
        let (Some(block), Some(reference)) = (self.moving.take(), self.reference) else {
            return Ok(Activation::Ignored);
        };
        let dropped = self.sample_pose(&block);

        match align(
            reference.rect(),
            &dropped,
            self.config.align_axes,
            self.config.perfect_threshold,
        ) {
            AlignOutcome::Missed { falling } => {
                self.host.release_as_physics_body(&FallingPiece {
                    source: block.handle(),
                    rect: falling,
                    cut_axis: None,
                });
                self.fallen = Some(block.moved_to(falling).falling());
                self.state = SessionState::GameOver;
                info!(
                    "game over: block {} missed the tower at {} (score {}, height {})",
                    block.handle(),
                    dropped.center,
                    self.stats.score(),
                    self.stats.placements()
                );
                Ok(Activation::Missed(MissReport {
                    block: block.handle(),
                    falling,
                    score: self.stats.score(),
                    stack_height: self.stats.placements(),
                }))
            }
            AlignOutcome::Placed(placement) => {
                let kept = *placement.kept();
                self.stats.record_placement(placement.grade());
                self.host.update_pose(block.handle(), kept);
                for cut in placement.cuts() {
                    self.host.release_as_physics_body(&FallingPiece {
                        source: block.handle(),
                        rect: cut.rect,
                        cut_axis: Some(cut.axis),
                    });
                }
                self.reference = Some(block.placed(kept));
                self.footprint = kept.size;
                info!(
                    "{} placement of block {} (score {}, height {})",
                    placement.grade(),
                    block.handle(),
                    self.stats.score(),
                    self.stats.placements()
                );

                let report = PlacementReport {
                    block: block.handle(),
                    dropped,
                    placement,
                    score: self.stats.score(),
                    stack_height: self.stats.placements(),
                };
                self.spawn_next(&kept)?;
                Ok(Activation::Placed(report))
            }
        }
    }

    fn sample_pose(&mut self, block: &Block) -> Rect3 {
        if let Some(mut mover) = self.mover.take() {
            mover.stop();
            return *mover.rect();
        }
        // Host-driven motion: trust the host's position, not its size.
        match self.host.get_pose(block.handle()) {
            Some(pose) if pose.center.is_finite() => Rect3::new(pose.center, block.rect().size),
            Some(pose) => {
                warn!(
                    "host reported invalid pose {pose} for block {}, using last known pose",
                    block.handle()
                );
                *block.rect()
            }
            None => {
                warn!(
                    "host reported no pose for block {}, using last known pose",
                    block.handle()
                );
                *block.rect()
            }
        }
    }

    fn spawn_next(&mut self, reference: &Rect3) -> Result<(), ConfigurationError> {
        let plan = self.planner.plan(reference, self.footprint, self.config.block_size.y);
        let Some(handle) = self.host.spawn_block(BlockKind::Moving, plan.rect) else {
            error!("host could not create a moving block, ending the run");
            self.state = SessionState::GameOver;
            return Err(ConfigurationError::MissingBlock {
                kind: BlockKind::Moving,
            });
        };
        self.moving = Some(Block::new(handle, plan.rect, BlockState::Moving));
        self.mover = match self.config.motion {
            MotionSource::Embedded => {
                let mut mover = Mover::new(plan.rect, self.config.move_speed);
                mover.initialize(plan.direction, self.config.travel_limit);
                Some(mover)
            }
            MotionSource::Host => None,
        };
        debug!(
            "spawned moving block {handle} at {} travelling along {}",
            plan.rect.center, plan.axis
        );
        Ok(())
    }
}

impl<H> TowerSession<H> {
    #[must_use]
    pub fn config(&self) -> &TowerConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access for hosts that drive motion themselves.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Seed driving the random spawn axis.
    #[must_use]
    pub fn seed(&self) -> TowerSeed {
        self.seed
    }

    #[must_use]
    pub fn stats(&self) -> &TowerStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Number of blocks successfully placed on top of the base.
    #[must_use]
    pub fn stack_height(&self) -> usize {
        self.stats.placements()
    }

    /// Height of the top face of the tower, or `None` before the session starts.
    #[must_use]
    pub fn top_elevation(&self) -> Option<f32> {
        self.reference.map(|block| block.rect().center.y + block.rect().size.y / 2.0)
    }

    /// Size inherited by the next moving block (`y` is the block height).
    #[must_use]
    pub fn footprint(&self) -> Vec3 {
        self.footprint
    }

    /// Top of the tower, or `None` before the session starts.
    #[must_use]
    pub fn reference_block(&self) -> Option<&Block> {
        self.reference.as_ref()
    }

    /// The block currently awaiting activation.
    ///
    /// With embedded motion its pose tracks the mover; with host-driven
    /// motion it is the spawn pose.
    #[must_use]
    pub fn moving_block(&self) -> Option<&Block> {
        self.moving.as_ref()
    }

    /// The block whose drop missed the tower, once the run is over.
    #[must_use]
    pub fn fallen_block(&self) -> Option<&Block> {
        self.fallen.as_ref()
    }

    #[must_use]
    pub fn mover(&self) -> Option<&Mover> {
        self.mover.as_ref()
    }

    /// Total time fed through [`TowerSession::on_tick`] while running.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        core::{Axis, AxisSet, PlacementGrade},
        engine::{config::SpawnAxis, host::RecordingHost},
    };

    use super::*;

    fn started(config: TowerConfig) -> TowerSession<RecordingHost> {
        let mut session = TowerSession::new(config, RecordingHost::new()).unwrap();
        session.start().unwrap();
        session
    }

    fn expect_placed(activation: Activation) -> PlacementReport {
        match activation {
            Activation::Placed(report) => report,
            other => panic!("expected a placement, got {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = TowerConfig {
            block_size: Vec3::new(2.0, 1.0, -1.0),
            ..TowerConfig::default()
        };
        let result = TowerSession::new(config, RecordingHost::new());
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidBlockSize { .. })
        ));
    }

    #[test]
    fn test_idle_session_ignores_input() {
        let mut session = TowerSession::new(TowerConfig::default(), RecordingHost::new()).unwrap();
        session.on_tick(1.0);
        assert_eq!(session.on_activate().unwrap(), Activation::Ignored);
        assert!(session.state().is_idle());
        assert_eq!(session.host().spawned_count(), 0);
        assert_eq!(session.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_start_spawns_base_and_first_moving_block() {
        let session = started(TowerConfig::default());
        assert!(session.state().is_running());
        assert_eq!(session.host().spawned_count(), 2);

        let base = session.reference_block().unwrap();
        assert_eq!(base.rect().center, Vec3::ZERO);
        assert!(base.state().is_placed());

        let moving = session.moving_block().unwrap();
        assert!(moving.state().is_moving());
        assert_eq!(moving.rect().center, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(moving.rect().size, Vec3::new(2.0, 1.0, 2.0));
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut session = started(TowerConfig::default());
        session.start().unwrap();
        assert_eq!(session.host().spawned_count(), 2);
    }

    #[test]
    fn test_missing_base_block_refuses_to_start() {
        let mut session =
            TowerSession::new(TowerConfig::default(), RecordingHost::refusing(BlockKind::Base))
                .unwrap();
        assert_eq!(
            session.start(),
            Err(ConfigurationError::MissingBlock {
                kind: BlockKind::Base
            })
        );
        assert!(session.state().is_idle());
        assert!(session.reference_block().is_none());
    }

    #[test]
    fn test_missing_moving_block_ends_run() {
        let mut session = TowerSession::new(
            TowerConfig::default(),
            RecordingHost::refusing(BlockKind::Moving),
        )
        .unwrap();
        assert_eq!(
            session.start(),
            Err(ConfigurationError::MissingBlock {
                kind: BlockKind::Moving
            })
        );
        assert!(session.is_game_over());
        assert_eq!(session.on_activate().unwrap(), Activation::Ignored);
    }

    #[test]
    fn test_immediate_drop_is_perfect() {
        let mut session = started(TowerConfig::default());
        let report = expect_placed(session.on_activate().unwrap());
        assert_eq!(report.placement.grade(), PlacementGrade::Perfect);
        assert!(report.placement.cuts().is_empty());
        assert_eq!(report.score, 10);
        assert_eq!(report.stack_height, 1);
        assert!(session.host().released().is_empty());

        let next = session.moving_block().unwrap();
        assert_ne!(next.handle(), report.block);
        assert_eq!(next.rect().center.y, 2.0);
        assert_eq!(session.top_elevation(), Some(1.5));
    }

    #[test]
    fn test_offset_drop_trims_and_releases_overhang() {
        let mut session = started(TowerConfig::default());
        session.on_tick(0.5);
        let moving = *session.moving_block().unwrap();
        assert_eq!(moving.rect().center.x, 1.5);
        assert_eq!(session.host().get_pose(moving.handle()), Some(*moving.rect()));

        let report = expect_placed(session.on_activate().unwrap());
        assert_eq!(report.placement.grade(), PlacementGrade::Placed);
        assert_eq!(report.score, 5);

        let kept = *report.placement.kept();
        assert_eq!(kept.center, Vec3::new(0.75, 1.0, 0.0));
        assert_eq!(kept.size, Vec3::new(0.5, 1.0, 2.0));
        assert_eq!(session.footprint(), kept.size);
        assert_eq!(session.reference_block().unwrap().rect(), &kept);
        assert_eq!(session.host().get_pose(moving.handle()), Some(kept));

        let released = session.host().released();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].source, moving.handle());
        assert_eq!(released[0].cut_axis, Some(Axis::X));
        assert_eq!(released[0].rect.center.x, 1.75);
        assert_eq!(released[0].rect.size.x, 1.5);

        let next = session.moving_block().unwrap();
        assert_eq!(next.rect().center, Vec3::new(0.75, 2.0, 0.0));
        assert_eq!(next.rect().size, Vec3::new(0.5, 1.0, 2.0));
    }

    #[test]
    fn test_miss_ends_run_and_releases_whole_block() {
        let mut session = started(TowerConfig::default());
        session.on_tick(0.75);
        let moving = *session.moving_block().unwrap();

        let activation = session.on_activate().unwrap();
        let Activation::Missed(report) = activation else {
            panic!("expected a miss, got {activation:?}");
        };
        assert_eq!(report.falling, *moving.rect());
        assert_eq!(report.score, 0);
        assert!(session.is_game_over());
        assert!(session.moving_block().is_none());
        let fallen = session.fallen_block().unwrap();
        assert_eq!(fallen.handle(), moving.handle());
        assert!(fallen.state().is_falling());

        let released = session.host().released();
        assert_eq!(released.len(), 1);
        assert!(released[0].is_whole_block());
        assert_eq!(released[0].rect, *moving.rect());
    }

    #[test]
    fn test_game_over_is_sticky() {
        let mut session = started(TowerConfig::default());
        session.on_tick(0.75);
        assert!(session.on_activate().unwrap().is_missed());

        let spawned = session.host().spawned_count();
        let elapsed = session.elapsed();
        for _ in 0..3 {
            session.on_tick(0.1);
            assert_eq!(session.on_activate().unwrap(), Activation::Ignored);
        }
        assert_eq!(session.score(), 0);
        assert_eq!(session.host().spawned_count(), spawned);
        assert_eq!(session.host().released().len(), 1);
        assert_eq!(session.elapsed(), elapsed);
    }

    #[test]
    fn test_footprint_never_grows() {
        let mut session = started(TowerConfig::default());
        let mut footprint = session.footprint();
        for dt in [0.0, 0.125, 0.0, 0.0625, 0.0] {
            session.on_tick(dt);
            let report = expect_placed(session.on_activate().unwrap());
            let next = session.footprint();
            assert!(next.x <= footprint.x && next.z <= footprint.z);
            if report.placement.grade().is_perfect() && report.placement.cuts().is_empty() {
                assert_eq!(next, footprint);
            }
            footprint = next;
        }
        assert_eq!(session.stack_height(), 5);
    }

    #[test]
    fn test_alternating_axis_moves_along_z() {
        let mut session = started(TowerConfig {
            spawn_axis: SpawnAxis::Alternate,
            ..TowerConfig::default()
        });
        expect_placed(session.on_activate().unwrap());
        session.on_tick(0.25);
        let moving = session.moving_block().unwrap();
        assert_eq!(moving.rect().center, Vec3::new(0.0, 2.0, 0.75));

        let report = expect_placed(session.on_activate().unwrap());
        assert_eq!(report.placement.cuts()[0].axis, Axis::Z);
        assert_eq!(session.footprint(), Vec3::new(2.0, 1.0, 1.25));
    }

    #[test]
    fn test_host_driven_motion_samples_host_pose() {
        let mut session = started(TowerConfig {
            motion: MotionSource::Host,
            ..TowerConfig::default()
        });
        assert!(session.mover().is_none());

        let moving = *session.moving_block().unwrap();
        session.on_tick(1.0);
        assert_eq!(session.moving_block().unwrap(), &moving);

        let mut pose = *moving.rect();
        pose.center.x = -0.5;
        pose.size.x = 100.0;
        session.host_mut().set_pose(moving.handle(), pose);

        let report = expect_placed(session.on_activate().unwrap());
        assert_eq!(report.dropped.size, moving.rect().size);
        assert_eq!(report.placement.kept().center.x, -0.25);
        assert_eq!(report.placement.kept().size.x, 1.5);
    }

    #[test]
    fn test_non_finite_host_pose_falls_back_to_last_pose() {
        let mut session = started(TowerConfig {
            motion: MotionSource::Host,
            ..TowerConfig::default()
        });
        let moving = *session.moving_block().unwrap();
        let mut pose = *moving.rect();
        pose.center.x = f32::NAN;
        session.host_mut().set_pose(moving.handle(), pose);

        let report = expect_placed(session.on_activate().unwrap());
        assert_eq!(report.dropped, *moving.rect());
        assert!(report.placement.kept().center.is_finite());
        assert_eq!(report.placement.grade(), PlacementGrade::Perfect);

        // Far off the tower on a finite pose, the run still ends.
        let next = *session.moving_block().unwrap();
        let mut pose = *next.rect();
        pose.center.x = 10.0;
        session.host_mut().set_pose(next.handle(), pose);
        assert!(session.on_activate().unwrap().is_missed());
    }

    #[test]
    fn test_spawn_axis_outside_alignment_is_rejected() {
        let config = TowerConfig {
            align_axes: AxisSet::X,
            spawn_axis: SpawnAxis::Z,
            ..TowerConfig::default()
        };
        assert!(matches!(
            TowerSession::new(config, RecordingHost::new()),
            Err(ConfigurationError::UnalignedSpawnAxis { .. })
        ));
    }

    #[test]
    fn test_invalid_tick_is_ignored() {
        let mut session = started(TowerConfig::default());
        session.on_tick(f32::NAN);
        session.on_tick(-1.0);
        assert_eq!(session.moving_block().unwrap().rect().center.x, 0.0);
        assert_eq!(session.elapsed(), Duration::ZERO);
    }
}
