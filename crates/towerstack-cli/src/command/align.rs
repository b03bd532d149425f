use anyhow::ensure;
use towerstack_engine::{AlignOutcome, AxisSet, DEFAULT_PERFECT_THRESHOLD, Rect3, align};

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AlignArg {
    /// Block beneath, as `x,y,z:sx,sy,sz`
    #[arg(long)]
    prev: Rect3,
    /// Dropped block, as `x,y,z:sx,sy,sz`
    #[arg(long)]
    curr: Rect3,
    /// Axes to compare and trim (`x`, `z`, or `xz`)
    #[arg(long, default_value = "xz")]
    axes: AxisSet,
    /// Largest per-axis offset that still counts as perfect
    #[arg(long, default_value_t = DEFAULT_PERFECT_THRESHOLD)]
    threshold: f32,
}

pub(crate) fn run(arg: &AlignArg) -> anyhow::Result<()> {
    let outcome = align_blocks(arg)?;
    Output::stdout().write_json(&outcome)
}

fn align_blocks(arg: &AlignArg) -> anyhow::Result<AlignOutcome> {
    let AlignArg {
        prev,
        curr,
        axes,
        threshold,
    } = arg;

    ensure!(!axes.is_empty(), "at least one axis must be given to --axes");
    let outcome = align(prev, curr, *axes, *threshold);
    log::debug!("{prev} vs {curr} along {axes}: {outcome:?}");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(axes: &str) -> AlignArg {
        AlignArg {
            prev: "0,0,0:2,1,2".parse().unwrap(),
            curr: "0.5,1,0:2,1,2".parse().unwrap(),
            axes: axes.parse().unwrap(),
            threshold: DEFAULT_PERFECT_THRESHOLD,
        }
    }

    #[test]
    fn test_empty_axes_are_rejected() {
        assert!(align_blocks(&arg("")).is_err());
    }

    #[test]
    fn test_offset_drop_is_trimmed() {
        let outcome = align_blocks(&arg("xz")).unwrap();
        assert_eq!(outcome.score_delta(), 5);
        assert_eq!(outcome.falling_rects().count(), 1);
    }
}
