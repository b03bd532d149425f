use anyhow::{Context, bail};
use chrono::Utc;
use log::{debug, info};
use towerstack_engine::{Activation, RecordingHost, TowerConfig, TowerSession};

use crate::{player::Player, schema::record::RecordedRun};

/// Limits and timing for a headless run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub fps: u32,
    /// Stop after this many placements even if the tower still stands.
    pub max_placements: Option<usize>,
    /// Drop the block anyway once it has been moving this many seconds.
    pub activation_timeout: Option<f32>,
}

impl RunOptions {
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn timeout_frames(&self) -> Option<u64> {
        self.activation_timeout
            .map(|secs| (secs * self.fps as f32).ceil().max(1.0) as u64)
    }
}

/// Plays one run at a fixed tick rate and records every activation.
///
/// Each frame either drops the block, if the player asks for it or the
/// timeout has passed, or advances the tower by one tick. Activation frames
/// are recorded, so replaying them
/// with the recorded config reproduces the run exactly.
pub fn run_session<P>(
    config: TowerConfig,
    player: &mut P,
    options: &RunOptions,
) -> anyhow::Result<RecordedRun>
where
    P: Player,
{
    if options.fps == 0 {
        bail!("fps must be positive");
    }
    #[expect(clippy::cast_precision_loss)]
    let dt = 1.0 / options.fps as f32;
    let timeout_frames = options.timeout_frames();

    let mut session =
        TowerSession::new(config, RecordingHost::new()).context("Invalid tower config")?;
    session.start().context("Failed to start the tower")?;

    let mut config = session.config().clone();
    config.seed = Some(session.seed());
    debug!("running tower with seed {}", session.seed());

    let mut activation_frames = vec![];
    let mut placements = vec![];
    let mut miss = None;
    let mut frame = 0;
    let mut block_frames = 0;

    while session.state().is_running() && !player.is_exhausted() {
        if options
            .max_placements
            .is_some_and(|max| placements.len() >= max)
        {
            break;
        }

        let timed_out = timeout_frames.is_some_and(|limit| block_frames >= limit);
        if player.should_activate(&session, frame) || timed_out {
            if timed_out {
                debug!("activation timeout at frame {frame}");
            }
            activation_frames.push(frame);
            block_frames = 0;
            match session.on_activate().context("Failed to settle the block")? {
                Activation::Placed(report) => placements.push(report),
                Activation::Missed(report) => miss = Some(report),
                Activation::Ignored => {}
            }
        } else {
            // A freshly spawned block sits still for the frame it appears in.
            session.on_tick(dt);
            block_frames += 1;
        }
        frame += 1;
    }

    info!(
        "run finished after {frame} frames: score {}, height {}",
        session.score(),
        session.stack_height()
    );

    Ok(RecordedRun {
        recorded_at: Utc::now(),
        config,
        fps: options.fps,
        activation_frames,
        placements,
        miss,
        final_stats: session.stats().clone(),
    })
}
