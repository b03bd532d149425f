use std::collections::BTreeMap;

use crate::core::{BlockHandle, BlockKind, FallingPiece, Rect3};

/// The scene that displays the tower and simulates whatever falls off it.
///
/// The session never mutates scene objects directly; it asks the host to
/// create blocks, tells it where they are, and hands over pieces that are
/// no longer part of the tower.
pub trait TowerHost {
    /// Creates a block of the given kind at `rect`.
    ///
    /// Returns `None` when the host has nothing to instantiate for `kind`.
    fn spawn_block(&mut self, kind: BlockKind, rect: Rect3) -> Option<BlockHandle>;

    /// Starts falling simulation for `piece`. The core forgets it afterwards.
    fn release_as_physics_body(&mut self, piece: &FallingPiece);

    /// Current displayed pose of `handle`.
    ///
    /// Only consulted when the host drives motion itself.
    fn get_pose(&self, handle: BlockHandle) -> Option<Rect3>;

    /// The core moved or resized `handle`.
    fn update_pose(&mut self, _handle: BlockHandle, _rect: Rect3) {}
}

/// Headless host that keeps poses in memory and logs released pieces.
///
/// Handles are assigned sequentially starting at 0.
///
/// # Example
///
/// ```
/// use towerstack_engine::{BlockKind, Rect3, RecordingHost, TowerHost, Vec3};
///
/// let mut host = RecordingHost::new();
/// let rect = Rect3::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 2.0));
/// let handle = host.spawn_block(BlockKind::Base, rect).unwrap();
/// assert_eq!(host.get_pose(handle), Some(rect));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    poses: BTreeMap<BlockHandle, Rect3>,
    next_handle: u64,
    released: Vec<FallingPiece>,
    refuse: Option<BlockKind>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that cannot instantiate blocks of `kind`.
    #[must_use]
    pub fn refusing(kind: BlockKind) -> Self {
        Self {
            refuse: Some(kind),
            ..Self::default()
        }
    }

    /// Overrides the pose of `handle`, as an externally driven scene would.
    pub fn set_pose(&mut self, handle: BlockHandle, rect: Rect3) {
        self.poses.insert(handle, rect);
    }

    /// Every piece released so far, in release order.
    #[must_use]
    pub fn released(&self) -> &[FallingPiece] {
        &self.released
    }

    /// Number of blocks created so far.
    #[must_use]
    pub fn spawned_count(&self) -> usize {
        self.poses.len()
    }
}

impl TowerHost for RecordingHost {
    fn spawn_block(&mut self, kind: BlockKind, rect: Rect3) -> Option<BlockHandle> {
        if self.refuse == Some(kind) {
            return None;
        }
        let handle = BlockHandle(self.next_handle);
        self.next_handle += 1;
        self.poses.insert(handle, rect);
        Some(handle)
    }

    fn release_as_physics_body(&mut self, piece: &FallingPiece) {
        self.released.push(*piece);
    }

    fn get_pose(&self, handle: BlockHandle) -> Option<Rect3> {
        self.poses.get(&handle).copied()
    }

    fn update_pose(&mut self, handle: BlockHandle, rect: Rect3) {
        self.poses.insert(handle, rect);
    }
}
