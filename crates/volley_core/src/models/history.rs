use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GameConfig, TeamId};

/// Result of a finished set. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetHistory {
    pub set_number: u8,
    pub score_a: u8,
    pub score_b: u8,
    pub winner: TeamId,
}

/// One reversible action in the current set.
///
/// Each entry stores the exact counters it replaced, so undo applies the
/// `prev_*` fields verbatim instead of recomputing. The log clears at every
/// set boundary; boundary undo goes through the aggregate snapshot instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionLogEntry {
    Point {
        team: TeamId,
        prev_score_a: u8,
        prev_score_b: u8,
        prev_serving_team: Option<TeamId>,
        // Not in the legacy log shape. Needed so undoing the point that
        // triggered a sudden-death reset also leaves sudden death.
        #[serde(default)]
        prev_in_sudden_death: bool,
    },
    Timeout {
        team: TeamId,
        prev_timeouts_a: u8,
        prev_timeouts_b: u8,
    },
}

/// Snapshot of a completed match, handed to an external history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: u32,
    pub team_a_name: String,
    pub team_b_name: String,
    pub sets_a: u8,
    pub sets_b: u8,
    pub winner: Option<TeamId>,
    pub sets: Vec<SetHistory>,
    pub config: GameConfig,
}
