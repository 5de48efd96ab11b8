//! Rule configuration for a match.
//!
//! A `GameConfig` is chosen before a match starts and stays immutable while
//! the match is in progress. All rule knobs (set count, set length, tie-break,
//! deuce policy) live here together with the fixed court constants.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Minimum lead required to close a set outside sudden death.
pub const MIN_LEAD_TO_WIN: u8 = 2;

/// Points required to win a sudden-death period.
pub const SUDDEN_DEATH_TARGET: u8 = 3;

/// Sanity ceiling for any score counter.
pub const MAX_SCORE: u8 = 200;

/// Timeouts each side may take per set.
pub const MAX_TIMEOUTS_PER_SET: u8 = 2;

/// Players on court per team, and the capacity of every queue team.
pub const PLAYER_LIMIT_ON_COURT: usize = 6;

/// Capacity of a waiting-queue team.
pub const PLAYERS_PER_TEAM: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Indoor,
    Beach,
}

/// Policy applied once both sides reach the deuce zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeuceType {
    /// Classic unlimited deuce: win by two.
    #[serde(rename = "standard")]
    Standard,
    /// At target-1 / target-1 both scores reset and a capped race to 3 starts.
    #[serde(rename = "sudden_death_3pt")]
    SuddenDeath3Pt,
}

/// How the incoming team is filled after a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    Standard,
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_mode")]
    pub mode: GameMode,
    pub max_sets: u8,
    pub points_per_set: u8,
    pub has_tie_break: bool,
    pub tie_break_points: u8,
    pub deuce_type: DeuceType,
    #[serde(default = "default_rotation_mode")]
    pub rotation_mode: RotationMode,
}

fn default_mode() -> GameMode {
    GameMode::Indoor
}

fn default_rotation_mode() -> RotationMode {
    RotationMode::Standard
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Indoor,
            max_sets: 3,
            points_per_set: 25,
            has_tie_break: true,
            tie_break_points: 15,
            deuce_type: DeuceType::Standard,
            rotation_mode: RotationMode::Standard,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.max_sets, 1 | 3 | 5) {
            return Err(CoreError::InvalidConfig(format!(
                "max_sets must be 1, 3 or 5, found {}",
                self.max_sets
            )));
        }
        if !matches!(self.points_per_set, 15 | 21 | 25) {
            return Err(CoreError::InvalidConfig(format!(
                "points_per_set must be 15, 21 or 25, found {}",
                self.points_per_set
            )));
        }
        if !matches!(self.tie_break_points, 15 | 25) {
            return Err(CoreError::InvalidConfig(format!(
                "tie_break_points must be 15 or 25, found {}",
                self.tie_break_points
            )));
        }
        Ok(())
    }

    /// Sets a side must win to take the match.
    pub fn sets_to_win(&self) -> u8 {
        self.max_sets / 2 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_set_count_rejected() {
        let config = GameConfig { max_sets: 4, ..GameConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sets_to_win() {
        assert_eq!(GameConfig { max_sets: 1, ..GameConfig::default() }.sets_to_win(), 1);
        assert_eq!(GameConfig { max_sets: 3, ..GameConfig::default() }.sets_to_win(), 2);
        assert_eq!(GameConfig { max_sets: 5, ..GameConfig::default() }.sets_to_win(), 3);
    }

    #[test]
    fn test_deuce_type_wire_format() {
        let json = serde_json::to_string(&DeuceType::SuddenDeath3Pt).unwrap();
        assert_eq!(json, "\"sudden_death_3pt\"");
        let back: DeuceType = serde_json::from_str("\"standard\"").unwrap();
        assert_eq!(back, DeuceType::Standard);
    }
}
