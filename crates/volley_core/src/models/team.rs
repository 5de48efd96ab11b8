use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Player;
use crate::models::config::PLAYER_LIMIT_ON_COURT;

/// Court side. The two on-court teams always carry the fixed ids "A" and "B";
/// queue teams carry generated ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamId {
    A,
    B,
}

impl TeamId {
    pub fn other(&self) -> TeamId {
        match self {
            TeamId::A => TeamId::B,
            TeamId::B => TeamId::A,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamId::A => "A",
            TeamId::B => "B",
        }
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const COURT_A_COLOR: &str = "#3B82F6";
pub const COURT_B_COLOR: &str = "#EF4444";
pub const QUEUE_TEAM_COLOR: &str = "#6B7280";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    pub players: Vec<Player>,
}

fn default_color() -> String {
    QUEUE_TEAM_COLOR.to_string()
}

impl Team {
    /// A queue team with a generated id.
    pub fn new(name: impl Into<String>, players: Vec<Player>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: QUEUE_TEAM_COLOR.to_string(),
            players,
        }
    }

    /// One of the two on-court teams, with its fixed id.
    pub fn court(side: TeamId, name: impl Into<String>) -> Self {
        let color = match side {
            TeamId::A => COURT_A_COLOR,
            TeamId::B => COURT_B_COLOR,
        };
        Self {
            id: side.as_str().to_string(),
            name: name.into(),
            color: color.to_string(),
            players: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= PLAYER_LIMIT_ON_COURT
    }

    pub fn total_skill(&self) -> u32 {
        self.players.iter().map(|p| p.skill_level as u32).sum()
    }

    pub fn average_skill(&self) -> f32 {
        if self.players.is_empty() {
            return 0.0;
        }
        self.total_skill() as f32 / self.players.len() as f32
    }

    /// Splits the roster into locked anchors and the free pool.
    pub fn partition_anchors(&self) -> (Vec<Player>, Vec<Player>) {
        self.players.iter().cloned().partition(|p| p.is_fixed)
    }
}
