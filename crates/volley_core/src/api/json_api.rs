//! JSON boundary for host integrations.
//!
//! Hosts that cannot link Rust types directly drive the engine through
//! strings: import the current state, apply one command, export the updated
//! state. Commands map one-to-one onto the mutation API; the no-op failure
//! policy of the core carries through, so an invalid command returns the
//! state unchanged rather than an error.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{GameConfig, RotationMode, TeamId};
use crate::state::{GameState, Slot};

/// One mutation, externally triggered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddPoint { team: TeamId },
    SubtractPoint { team: TeamId },
    UseTimeout { team: TeamId },
    Undo,
    ResetMatch,
    TickSecond,
    ToggleSides,
    ToggleService,
    ApplySettings {
        config: GameConfig,
        #[serde(default)]
        reset: bool,
    },
    GenerateTeams { names: Vec<String> },
    BalanceTeams { mode: RotationMode },
    MovePlayer { player_id: String, from: Slot, to: Slot },
    TogglePlayerFixed { player_id: String },
    RotateTeams { winner: TeamId },
    AddPlayer { name: String, to: Slot },
    RemovePlayer { player_id: String },
    UndoRemovePlayer,
    UpdateTeamName { team_id: String, name: String },
    UpdatePlayerName { player_id: String, name: String },
    SetPlayerSkill { player_id: String, skill_level: u8 },
}

pub fn apply_command(state: &mut GameState, command: Command) {
    match command {
        Command::AddPoint { team } => state.add_point(team),
        Command::SubtractPoint { team } => state.subtract_point(team),
        Command::UseTimeout { team } => state.use_timeout(team),
        Command::Undo => state.undo(),
        Command::ResetMatch => state.reset_match(),
        Command::TickSecond => state.tick_second(),
        Command::ToggleSides => state.toggle_sides(),
        Command::ToggleService => state.toggle_service(),
        Command::ApplySettings { config, reset } => state.apply_settings(config, reset),
        Command::GenerateTeams { names } => state.generate_teams(&names),
        Command::BalanceTeams { mode } => state.balance_teams(mode),
        Command::MovePlayer { player_id, from, to } => state.move_player(&player_id, &from, &to),
        Command::TogglePlayerFixed { player_id } => state.toggle_player_fixed(&player_id),
        Command::RotateTeams { winner } => state.rotate_teams(winner, None),
        Command::AddPlayer { name, to } => state.add_player(&name, &to),
        Command::RemovePlayer { player_id } => state.remove_player(&player_id),
        Command::UndoRemovePlayer => state.undo_remove_player(),
        Command::UpdateTeamName { team_id, name } => state.update_team_name(&team_id, &name),
        Command::UpdatePlayerName { player_id, name } => {
            state.update_player_name(&player_id, &name)
        }
        Command::SetPlayerSkill { player_id, skill_level } => {
            state.set_player_skill(&player_id, skill_level)
        }
    }
}

/// Serialize the full aggregate; this is the payload handed to the
/// persistence collaborator after every mutation.
pub fn export_state_json(state: &GameState) -> Result<String> {
    Ok(serde_json::to_string(state)?)
}

/// Rehydrate a state payload. Legacy payloads missing newer fields (action
/// log, queue, config) deserialize with defaults.
pub fn import_state_json(json: &str) -> Result<GameState> {
    Ok(serde_json::from_str(json)?)
}

/// Parse one command, apply it to the given state payload and return the
/// updated payload.
pub fn apply_command_json(state_json: &str, command_json: &str) -> Result<String> {
    let mut state = import_state_json(state_json)?;
    let command: Command = serde_json::from_str(command_json)?;
    apply_command(&mut state, command);
    export_state_json(&state)
}
