use serde::{Deserialize, Serialize};

use super::geometry::{Axis, Rect3};

/// Opaque identifier the host hands out for every block it creates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct BlockHandle(pub u64);

/// Which prefab the host should instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// The static foundation the tower is built on.
    #[display("base")]
    Base,
    /// A block that slides until the player drops it.
    #[display("moving")]
    Moving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    Moving,
    Placed,
    Falling,
}

/// A block under the control of the tower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    handle: BlockHandle,
    rect: Rect3,
    state: BlockState,
}

impl Block {
    #[must_use]
    pub const fn new(handle: BlockHandle, rect: Rect3, state: BlockState) -> Self {
        Self {
            handle,
            rect,
            state,
        }
    }

    #[must_use]
    pub const fn handle(&self) -> BlockHandle {
        self.handle
    }

    #[must_use]
    pub const fn rect(&self) -> &Rect3 {
        &self.rect
    }

    #[must_use]
    pub const fn state(&self) -> BlockState {
        self.state
    }

    #[must_use]
    pub const fn moved_to(self, rect: Rect3) -> Self {
        Self { rect, ..self }
    }

    /// Returns this block settled on the tower with its trimmed geometry.
    #[must_use]
    pub const fn placed(self, rect: Rect3) -> Self {
        Self {
            handle: self.handle,
            rect,
            state: BlockState::Placed,
        }
    }

    /// Returns this block detached from the tower after a missed drop.
    #[must_use]
    pub const fn falling(self) -> Self {
        Self {
            state: BlockState::Falling,
            ..self
        }
    }
}

/// Geometry handed to the host for physics simulation.
///
/// Once released, the core never looks at the piece again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingPiece {
    /// Block the piece was cut from (or the whole block, on a miss).
    pub source: BlockHandle,
    pub rect: Rect3,
    /// Axis of the overhang, or `None` when the entire block falls.
    pub cut_axis: Option<Axis>,
}

impl FallingPiece {
    #[must_use]
    pub fn is_whole_block(&self) -> bool {
        self.cut_axis.is_none()
    }
}
