use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use towerstack_engine::{MissReport, PlacementReport, TowerConfig, TowerStats};

/// Recorded headless run with everything needed to replay it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedRun {
    /// Timestamp when recording was created (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    /// Config the run used, with the spawn seed filled in
    pub config: TowerConfig,
    /// Fixed tick rate; every tick advances the tower by `1 / fps` seconds
    pub fps: u32,
    /// Frame index at which each activation happened, in order
    pub activation_frames: Vec<u64>,
    pub placements: Vec<PlacementReport>,
    /// The drop that ended the run, if it ended by missing the tower
    pub miss: Option<MissReport>,
    pub final_stats: TowerStats,
}

impl RecordedRun {
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.miss.is_some()
    }
}
