use serde::{Deserialize, Serialize};

use super::{Player, Team};

/// Preview of a post-match rotation.
///
/// Computed once when the match ends and replayed verbatim at commit, so the
/// forecast shown to the players always matches the applied result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationReport {
    pub outgoing_team: Team,
    pub incoming_team: Team,
    /// Players pulled from later queue entries to fill the incoming team.
    pub stolen_players: Vec<Player>,
    pub queue_after_rotation: Vec<Team>,
}
