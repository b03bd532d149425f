pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Setup problem that prevents a run from starting or continuing.
///
/// These are host-side mistakes (bad tuning values, a host that cannot
/// produce a block), never gameplay outcomes. A missed placement is a state
/// transition, not an error.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigurationError {
    #[display("block size must be finite and positive, got {size}")]
    InvalidBlockSize { size: Vec3 },
    #[display("perfect threshold must be finite and non-negative, got {value}")]
    InvalidPerfectThreshold { value: f32 },
    #[display("move speed must be finite and non-negative, got {value}")]
    InvalidMoveSpeed { value: f32 },
    #[display("travel limit must be finite and positive, got {value}")]
    InvalidTravelLimit { value: f32 },
    #[display("spawn boundary must be finite and non-negative, got {value}")]
    InvalidSpawnBoundary { value: f32 },
    #[display("at least one alignment axis must be enabled")]
    NoAlignAxes,
    #[display("spawn axes {spawn_axes} are not all alignment axes ({align_axes})")]
    UnalignedSpawnAxis {
        spawn_axes: AxisSet,
        align_axes: AxisSet,
    },
    #[display("host could not provide a {kind} block")]
    MissingBlock { kind: BlockKind },
}
