use clap::{Parser, Subcommand};

use self::{align::AlignArg, batch::BatchArg, replay::ReplayArg, simulate::SimulateArg};

mod align;
mod batch;
mod replay;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play one headless run with an aiming bot and print the recording
    Simulate(#[clap(flatten)] SimulateArg),
    /// Play many headless runs and summarize score and height
    Batch(#[clap(flatten)] BatchArg),
    /// Re-run a recording and check that it reproduces
    Replay(#[clap(flatten)] ReplayArg),
    /// Align a single dropped block against the block beneath it
    Align(#[clap(flatten)] AlignArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Simulate(SimulateArg::default())) {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Batch(arg) => batch::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::Align(arg) => align::run(&arg)?,
    }
    Ok(())
}
