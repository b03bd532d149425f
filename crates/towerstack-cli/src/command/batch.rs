use std::path::PathBuf;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    player::AimPlayer,
    runner::{self, RunOptions},
    schema::record::RecordedRun,
    summary::Summary,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BatchArg {
    /// Number of runs to play
    #[arg(long, default_value_t = 100)]
    runs: usize,
    /// Tower config file (JSON); the spawn seed is replaced per run
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the whole batch; per-run seeds are drawn from it
    #[arg(long)]
    seed: Option<u64>,
    /// Ticks per simulated second
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Stop each run after this many placements
    #[arg(long, default_value_t = 500)]
    max_placements: usize,
    /// Seconds a block may move before it is dropped anyway
    #[arg(long, default_value_t = 10.0)]
    activation_timeout: f32,
    /// Standard deviation of the bot's aiming error, in world units
    #[arg(long, default_value_t = 0.1)]
    aim_error: f32,
    /// Output file path for the summary
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct BatchSummary {
    runs: usize,
    game_overs: usize,
    score: Option<Summary>,
    stack_height: Option<Summary>,
    perfect_ratio: Option<Summary>,
    longest_perfect_streak: Option<Summary>,
}

impl BatchSummary {
    #[expect(clippy::cast_precision_loss)]
    fn new(runs: &[RecordedRun]) -> Self {
        Self {
            runs: runs.len(),
            game_overs: runs.iter().filter(|run| run.is_game_over()).count(),
            score: Summary::from_counts(runs.iter().map(|run| run.final_stats.score())),
            stack_height: Summary::from_counts(
                runs.iter().map(|run| run.final_stats.placements()),
            ),
            perfect_ratio: Summary::new(runs.iter().map(|run| {
                let stats = &run.final_stats;
                if stats.placements() == 0 {
                    0.0
                } else {
                    stats.perfect_placements() as f32 / stats.placements() as f32
                }
            })),
            longest_perfect_streak: Summary::from_counts(
                runs.iter().map(|run| run.final_stats.longest_perfect_streak()),
            ),
        }
    }
}

pub(crate) fn run(arg: &BatchArg) -> anyhow::Result<()> {
    let BatchArg {
        runs,
        config,
        seed,
        fps,
        max_placements,
        activation_timeout,
        aim_error,
        output,
    } = arg;

    let base_config = util::load_config(config.as_ref())?;
    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(*seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let options = RunOptions {
        fps: *fps,
        max_placements: Some(*max_placements),
        activation_timeout: Some(*activation_timeout),
    };

    eprintln!("Playing {runs} runs...");
    let mut recorded = Vec::with_capacity(*runs);
    for i in 0..*runs {
        let mut config = base_config.clone();
        config.seed = Some(rng.random());
        let mut player = AimPlayer::new(rng.random(), *aim_error)?;
        recorded.push(runner::run_session(config, &mut player, &options)?);
        if (i + 1) % 10 == 0 {
            eprintln!("  {}/{runs} runs done", i + 1);
        }
    }

    let summary = BatchSummary::new(&recorded);
    print_summary(&summary);
    Output::save_json(&summary, output.clone())?;
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    eprintln!();
    eprintln!("{} runs, {} ended by a miss", summary.runs, summary.game_overs);
    eprintln!(
        "  {:<24} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "metric", "min", "median", "mean", "max", "std_dev"
    );
    let rows = [
        ("score", &summary.score),
        ("stack height", &summary.stack_height),
        ("perfect ratio", &summary.perfect_ratio),
        ("longest perfect streak", &summary.longest_perfect_streak),
    ];
    for (name, stats) in rows {
        let Some(stats) = stats else {
            continue;
        };
        eprintln!(
            "  {:<24} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
            name, stats.min, stats.median, stats.mean, stats.max, stats.std_dev
        );
    }
}
