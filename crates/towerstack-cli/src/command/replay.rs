use std::path::PathBuf;

use anyhow::{bail, ensure};

use crate::{
    player::ReplayPlayer,
    runner::{self, RunOptions},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the recording file (JSON format)
    recording_file: PathBuf,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg { recording_file } = arg;

    eprintln!("Loading recording from {}", recording_file.display());
    let recorded = util::read_recording_file(recording_file)?;
    eprintln!(
        "Loaded {} activations recorded at {}",
        recorded.activation_frames.len(),
        recorded.recorded_at
    );
    ensure!(
        recorded.config.seed.is_some(),
        "Recording has no spawn seed and cannot be replayed"
    );

    let options = RunOptions {
        fps: recorded.fps,
        max_placements: None,
        activation_timeout: None,
    };
    let mut player = ReplayPlayer::new(recorded.activation_frames.iter().copied());
    let replayed = runner::run_session(recorded.config.clone(), &mut player, &options)?;

    if let Some(turn) = recorded
        .placements
        .iter()
        .zip(&replayed.placements)
        .position(|(expected, actual)| expected != actual)
    {
        bail!("Replay diverged at placement {turn}");
    }
    if replayed.placements.len() != recorded.placements.len() {
        bail!(
            "Replay produced {} placements, recording has {}",
            replayed.placements.len(),
            recorded.placements.len()
        );
    }
    if replayed.miss != recorded.miss || replayed.final_stats != recorded.final_stats {
        bail!("Replay ended differently from the recording");
    }

    eprintln!(
        "Replay matches: score {}, height {}",
        replayed.final_stats.score(),
        replayed.final_stats.placements()
    );
    Ok(())
}
