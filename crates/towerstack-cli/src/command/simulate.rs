use std::path::PathBuf;

use towerstack_engine::TowerSeed;

use crate::{
    player::AimPlayer,
    runner::{self, RunOptions},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Tower config file (JSON); missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Spawn seed as 32 hex digits; overrides the config file
    #[arg(long)]
    seed: Option<TowerSeed>,
    /// Ticks per simulated second
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Stop after this many placements
    #[arg(long, default_value_t = 500)]
    max_placements: usize,
    /// Seconds a block may move before it is dropped anyway
    #[arg(long, default_value_t = 10.0)]
    activation_timeout: f32,
    /// Standard deviation of the bot's aiming error, in world units
    #[arg(long, default_value_t = 0.1)]
    aim_error: f32,
    /// Seed for the bot's aiming error
    #[arg(long)]
    player_seed: Option<u64>,
    /// Output file path for the recording
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Default for SimulateArg {
    fn default() -> Self {
        Self {
            config: None,
            seed: None,
            fps: 60,
            max_placements: 500,
            activation_timeout: 10.0,
            aim_error: 0.1,
            player_seed: None,
            output: None,
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        config,
        seed,
        fps,
        max_placements,
        activation_timeout,
        aim_error,
        player_seed,
        output,
    } = arg;

    let mut config = util::load_config(config.as_ref())?;
    if let Some(seed) = seed {
        config.seed = Some(*seed);
    }
    let player_seed = player_seed.unwrap_or_else(rand::random);
    let mut player = AimPlayer::new(player_seed, *aim_error)?;
    let options = RunOptions {
        fps: *fps,
        max_placements: Some(*max_placements),
        activation_timeout: Some(*activation_timeout),
    };

    let run = runner::run_session(config, &mut player, &options)?;

    eprintln!(
        "Seed {} / player seed {player_seed}",
        run.config
            .seed
            .map_or_else(|| "-".to_owned(), |seed| seed.to_string())
    );
    eprintln!(
        "Score {} / height {} / perfect {} (longest streak {})",
        run.final_stats.score(),
        run.final_stats.placements(),
        run.final_stats.perfect_placements(),
        run.final_stats.longest_perfect_streak()
    );
    if let Some(miss) = &run.miss {
        eprintln!("Missed the tower with block {} at {}", miss.block, miss.falling);
    } else {
        eprintln!("Stopped after {max_placements} placements");
    }

    Output::save_json(&run, output.clone())?;
    Ok(())
}
