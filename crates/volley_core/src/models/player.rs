use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A player instance in the current session.
///
/// Every player is owned by exactly one team (court A, court B or a queue
/// team); moves between teams transfer ownership atomically. `original_index`
/// records the order the player was entered in, so the standard distribution
/// can restore the exact original grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default = "default_skill")]
    pub skill_level: u8,
    /// Locked players are exempt from automatic balancing and rotation.
    #[serde(default)]
    pub is_fixed: bool,
    /// Side or team id a locked player is pinned to.
    #[serde(default)]
    pub fixed_side: Option<String>,
    #[serde(default)]
    pub original_index: usize,
}

fn default_skill() -> u8 {
    3
}

impl Player {
    pub fn new(name: impl Into<String>, skill_level: u8, original_index: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            skill_level: skill_level.clamp(1, 5),
            is_fixed: false,
            fixed_side: None,
            original_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_clamps_skill() {
        assert_eq!(Player::new("Ana", 9, 0).skill_level, 5);
        assert_eq!(Player::new("Bia", 0, 1).skill_level, 1);
    }

    #[test]
    fn test_legacy_player_without_skill_deserializes() {
        let json = r#"{"id":"p1","name":"Ana"}"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.skill_level, 3);
        assert!(!player.is_fixed);
        assert_eq!(player.original_index, 0);
    }
}
