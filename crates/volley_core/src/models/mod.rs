//! Core data model: rule configuration, players, teams and match records.

pub mod config;
pub mod history;
pub mod player;
pub mod rotation;
pub mod team;

pub use config::{
    DeuceType, GameConfig, GameMode, RotationMode, MAX_SCORE, MAX_TIMEOUTS_PER_SET,
    MIN_LEAD_TO_WIN, PLAYERS_PER_TEAM, PLAYER_LIMIT_ON_COURT, SUDDEN_DEATH_TARGET,
};
pub use history::{ActionLogEntry, MatchRecord, SetHistory};
pub use player::Player;
pub use rotation::RotationReport;
pub use team::{Team, TeamId};
