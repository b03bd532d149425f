//! Tower state machine and the pieces around it.
//!
//! - [`TowerSession`] - Stack controller: base block, reference block, moving block, score
//! - [`Mover`] - Back-and-forth motion of the moving block
//! - [`TowerHost`] - Interface to the scene that displays blocks and simulates debris
//! - [`RecordingHost`] - In-memory host for headless runs and tests
//! - [`TowerConfig`] - Tuning values, loadable from JSON
//! - [`TowerStats`] - Score and placement counters
//!
//! # Run Flow
//!
//! 1. Create a [`TowerSession`] with a config and a host, then [`start`](TowerSession::start) it
//! 2. Call [`on_tick`](TowerSession::on_tick) once per frame while the block slides
//! 3. Call [`on_activate`](TowerSession::on_activate) when the player drops the block
//! 4. The overhang is sliced off and handed to the host, and the next block spawns
//! 5. Repeat until a drop misses the tower entirely
//!
//! Activation and motion never interleave: the mover is stopped and
//! discarded before alignment runs, and the next block's mover is created
//! only after the tower has been updated.

pub use self::{config::*, host::*, mover::*, spawn::TowerSeed, tower_session::*, tower_stats::*};

mod config;
mod host;
mod mover;
mod spawn;
mod tower_session;
mod tower_stats;
