//! The game state aggregate.
//!
//! `GameState` holds everything the app mutates: the live match counters and
//! the roster structure (both courts plus the waiting queue). Keeping them in
//! one aggregate is deliberate: the boundary-undo snapshot boxes the whole
//! state, so undoing a set or match transition rolls back scores and rosters
//! in a single step with no cross-store coordination.
//!
//! All mutation methods follow the same failure policy: an invalid request is
//! a silent no-op that leaves the state untouched. Invalid requests mean the
//! caller's UI should have disabled the control, not that live scoring should
//! be interrupted.

use serde::{Deserialize, Serialize};

use crate::engine::{balance, rotation};
use crate::models::{
    ActionLogEntry, GameConfig, Player, RotationReport, SetHistory, Team, TeamId,
    PLAYERS_PER_TEAM, PLAYER_LIMIT_ON_COURT,
};

/// Where a player sits, or where a roster mutation should put one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    CourtA,
    CourtB,
    /// A specific queue team, by id.
    QueueTeam(String),
    /// The last non-full queue team, or a fresh one.
    QueueTail,
}

/// A removed player kept around so the removal can be undone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedPlayer {
    pub player: Player,
    pub origin: Slot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    // Display names, kept in sync with the court team names.
    pub team_a_name: String,
    pub team_b_name: String,

    // Scores and sets
    pub score_a: u8,
    pub score_b: u8,
    pub sets_a: u8,
    pub sets_b: u8,
    pub current_set: u8,

    // History and undo
    pub history: Vec<SetHistory>,
    #[serde(default)]
    pub action_log: Vec<ActionLogEntry>,
    /// Full pre-transition copy, retained only across a single set/match
    /// boundary and cleared on the next ordinary action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_snapshot: Option<Box<GameState>>,
    pub is_match_over: bool,
    pub match_winner: Option<TeamId>,

    // Game status
    pub serving_team: Option<TeamId>,
    #[serde(default)]
    pub swapped_sides: bool,
    #[serde(default)]
    pub config: GameConfig,

    // Timeouts
    pub timeouts_a: u8,
    pub timeouts_b: u8,

    // Advanced state
    #[serde(default)]
    pub in_sudden_death: bool,
    #[serde(default)]
    pub match_duration_seconds: u32,
    #[serde(default)]
    pub is_timer_running: bool,

    // Roster management
    #[serde(default = "default_court_a")]
    pub court_a: Team,
    #[serde(default = "default_court_b")]
    pub court_b: Team,
    #[serde(default)]
    pub queue: Vec<Team>,
    #[serde(default)]
    pub rotation_report: Option<RotationReport>,
    #[serde(default)]
    pub deleted_players: Vec<DeletedPlayer>,
}

fn default_court_a() -> Team {
    Team::court(TeamId::A, "Home")
}

fn default_court_b() -> Team {
    Team::court(TeamId::B, "Guest")
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            team_a_name: "Home".to_string(),
            team_b_name: "Guest".to_string(),
            score_a: 0,
            score_b: 0,
            sets_a: 0,
            sets_b: 0,
            current_set: 1,
            history: Vec::new(),
            action_log: Vec::new(),
            last_snapshot: None,
            is_match_over: false,
            match_winner: None,
            serving_team: None,
            swapped_sides: false,
            config: GameConfig::default(),
            timeouts_a: 0,
            timeouts_b: 0,
            in_sudden_death: false,
            match_duration_seconds: 0,
            is_timer_running: false,
            court_a: default_court_a(),
            court_b: default_court_b(),
            queue: Vec::new(),
            rotation_report: None,
            deleted_players: Vec::new(),
        }
    }

    // ========================
    // Accessors
    // ========================

    pub fn court(&self, side: TeamId) -> &Team {
        match side {
            TeamId::A => &self.court_a,
            TeamId::B => &self.court_b,
        }
    }

    pub fn court_mut(&mut self, side: TeamId) -> &mut Team {
        match side {
            TeamId::A => &mut self.court_a,
            TeamId::B => &mut self.court_b,
        }
    }

    /// Every player in the session, in structural order.
    pub fn all_players(&self) -> Vec<Player> {
        let mut players = self.court_a.players.clone();
        players.extend(self.court_b.players.iter().cloned());
        for team in &self.queue {
            players.extend(team.players.iter().cloned());
        }
        players
    }

    pub fn total_player_count(&self) -> usize {
        self.court_a.players.len()
            + self.court_b.players.len()
            + self.queue.iter().map(|t| t.players.len()).sum::<usize>()
    }

    fn sync_display_names(&mut self) {
        self.team_a_name = self.court_a.name.clone();
        self.team_b_name = self.court_b.name.clone();
    }

    fn next_original_index(&self) -> usize {
        self.all_players().iter().map(|p| p.original_index + 1).max().unwrap_or(0)
    }

    fn find_player_slot(&self, player_id: &str) -> Option<Slot> {
        if self.court_a.players.iter().any(|p| p.id == player_id) {
            return Some(Slot::CourtA);
        }
        if self.court_b.players.iter().any(|p| p.id == player_id) {
            return Some(Slot::CourtB);
        }
        self.queue
            .iter()
            .find(|t| t.players.iter().any(|p| p.id == player_id))
            .map(|t| Slot::QueueTeam(t.id.clone()))
    }

    // ========================
    // Team Generation & Balancing
    // ========================

    /// Build fresh teams from a list of names. The first six fill court A,
    /// the next six court B, the rest chunk into queue teams of six.
    pub fn generate_teams(&mut self, names: &[String]) {
        let players: Vec<Player> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .enumerate()
            .map(|(i, n)| Player::new(n, 3, i))
            .collect();

        let mut chunks = players.chunks(PLAYER_LIMIT_ON_COURT);
        self.court_a.players = chunks.next().map(|c| c.to_vec()).unwrap_or_default();
        self.court_a.name = "Team A".to_string();
        self.court_b.players = chunks.next().map(|c| c.to_vec()).unwrap_or_default();
        self.court_b.name = "Team B".to_string();

        self.queue = chunks
            .enumerate()
            .map(|(i, c)| Team::new(format!("Queue Team {}", i + 1), c.to_vec()))
            .collect();

        self.rotation_report = None;
        self.deleted_players.clear();
        self.sync_display_names();

        log::info!(
            "Generated teams: {} players over 2 courts and {} queue teams",
            self.total_player_count(),
            self.queue.len()
        );
    }

    /// Repartition the whole pool with the given strategy and adopt the
    /// result.
    pub fn balance_teams(&mut self, mode: crate::models::RotationMode) {
        let all = self.all_players();
        let result = balance::rebalance(mode, &all, &self.court_a, &self.court_b, &self.queue);
        self.court_a = result.court_a;
        self.court_b = result.court_b;
        self.queue = result.queue;
        log::debug!("Rebalanced {} players ({mode:?} mode)", all.len());
    }

    // ========================
    // Rotation
    // ========================

    /// Commit a post-match rotation: the loser leaves, the incoming team
    /// takes its court side, and match counters reset for the next match.
    ///
    /// A previously computed preview can be passed to be replayed verbatim;
    /// otherwise one is computed here. No-op (with a warning) when the queue
    /// produces no incoming team.
    pub fn rotate_teams(&mut self, winner: TeamId, report: Option<RotationReport>) {
        let report = report.or_else(|| {
            rotation::rotation_preview(
                self.config.rotation_mode,
                winner,
                &self.court_a,
                &self.court_b,
                &self.queue,
            )
        });

        let Some(report) = report else {
            log::warn!("Rotation produced no incoming team (empty queue); keeping courts as-is");
            return;
        };

        let loser_side = winner.other();
        let mut incoming = report.incoming_team.clone();
        incoming.id = loser_side.as_str().to_string();
        log::info!("Rotating: {} out, {} in", report.outgoing_team.name, incoming.name);

        *self.court_mut(loser_side) = incoming;
        self.queue = report.queue_after_rotation.clone();
        self.rotation_report = Some(report);
        self.sync_display_names();

        // Fresh match on the updated courts.
        self.score_a = 0;
        self.score_b = 0;
        self.sets_a = 0;
        self.sets_b = 0;
        self.current_set = 1;
        self.history.clear();
        self.action_log.clear();
        self.last_snapshot = None;
        self.is_match_over = false;
        self.match_winner = None;
        self.serving_team = None;
        self.timeouts_a = 0;
        self.timeouts_b = 0;
        self.in_sudden_death = false;
        self.match_duration_seconds = 0;
        self.is_timer_running = false;
    }

    // ========================
    // Roster Mutations
    // ========================

    /// Move a player between slots. Capacity-checked; locked players cannot
    /// be moved off a court.
    pub fn move_player(&mut self, player_id: &str, from: &Slot, to: &Slot) {
        // Destination capacity first, so a full target leaves the source
        // untouched.
        if self.slot_is_full(to) {
            return;
        }

        let Some(mut player) = self.take_player(player_id, from) else {
            return;
        };

        // Locked players keep their pin aligned with wherever they now sit.
        if player.is_fixed {
            player.fixed_side = match to {
                Slot::CourtA => Some("A".to_string()),
                Slot::CourtB => Some("B".to_string()),
                Slot::QueueTeam(id) => Some(id.clone()),
                Slot::QueueTail => None,
            };
        } else {
            player.fixed_side = None;
        }

        self.place_player(player, to);
    }

    /// Whether the slot can take one more player. The queue tail always can:
    /// a full tail team just opens a fresh one. A queue team id that no
    /// longer exists counts as full.
    fn slot_is_full(&self, slot: &Slot) -> bool {
        match slot {
            Slot::CourtA => self.court_a.is_full(),
            Slot::CourtB => self.court_b.is_full(),
            Slot::QueueTeam(id) => self
                .queue
                .iter()
                .find(|t| &t.id == id)
                .map(|t| t.players.len() >= PLAYERS_PER_TEAM)
                .unwrap_or(true),
            Slot::QueueTail => false,
        }
    }

    fn take_player(&mut self, player_id: &str, from: &Slot) -> Option<Player> {
        let roster = match from {
            Slot::CourtA => &mut self.court_a.players,
            Slot::CourtB => &mut self.court_b.players,
            Slot::QueueTeam(id) => {
                let team = self.queue.iter_mut().find(|t| &t.id == id)?;
                let idx = team.players.iter().position(|p| p.id == player_id)?;
                let player = team.players.remove(idx);
                self.queue.retain(|t| !t.players.is_empty());
                return Some(player);
            }
            Slot::QueueTail => return None,
        };

        let idx = roster.iter().position(|p| p.id == player_id)?;
        if roster[idx].is_fixed {
            // Locked to the court side; manual moves must unlock first.
            return None;
        }
        Some(roster.remove(idx))
    }

    fn place_player(&mut self, mut player: Player, to: &Slot) {
        match to {
            Slot::CourtA => self.court_a.players.push(player),
            Slot::CourtB => self.court_b.players.push(player),
            Slot::QueueTeam(id) => {
                if let Some(team) = self.queue.iter_mut().find(|t| &t.id == id) {
                    team.players.push(player);
                } else {
                    self.push_to_queue_tail(player);
                }
            }
            Slot::QueueTail => {
                if player.is_fixed {
                    // The pin follows the team the player lands in.
                    player.fixed_side = None;
                }
                self.push_to_queue_tail(player);
            }
        }
    }

    fn push_to_queue_tail(&mut self, mut player: Player) {
        match self.queue.last_mut().filter(|t| t.players.len() < PLAYERS_PER_TEAM) {
            Some(team) => {
                if player.is_fixed {
                    player.fixed_side = Some(team.id.clone());
                }
                team.players.push(player);
            }
            None => {
                let mut team =
                    Team::new(format!("Queue Team {}", self.queue.len() + 1), Vec::new());
                if player.is_fixed {
                    player.fixed_side = Some(team.id.clone());
                }
                team.players.push(player);
                self.queue.push(team);
            }
        }
    }

    /// Flip a player's lock. Locking stamps the current side/team id into
    /// `fixed_side`; unlocking clears it.
    pub fn toggle_player_fixed(&mut self, player_id: &str) {
        fn toggle_in(players: &mut [Player], player_id: &str, side: &str) -> bool {
            match players.iter_mut().find(|p| p.id == player_id) {
                Some(player) => {
                    player.is_fixed = !player.is_fixed;
                    player.fixed_side = player.is_fixed.then(|| side.to_string());
                    true
                }
                None => false,
            }
        }

        if toggle_in(&mut self.court_a.players, player_id, "A") {
            return;
        }
        if toggle_in(&mut self.court_b.players, player_id, "B") {
            return;
        }
        for team in &mut self.queue {
            let side = team.id.clone();
            if toggle_in(&mut team.players, player_id, &side) {
                return;
            }
        }
    }

    /// Add a new player (default skill) to any slot. Full destinations
    /// reject the add.
    pub fn add_player(&mut self, name: &str, to: &Slot) {
        let name = name.trim();
        if name.is_empty() || self.slot_is_full(to) {
            return;
        }
        let player = Player::new(name, 3, self.next_original_index());
        self.place_player(player, to);
    }

    /// Remove a player, remembering the removal so it can be undone.
    /// Locked players are never removed.
    pub fn remove_player(&mut self, player_id: &str) {
        let Some(origin) = self.find_player_slot(player_id) else {
            return;
        };

        let removed = match &origin {
            Slot::CourtA => remove_from(&mut self.court_a.players, player_id),
            Slot::CourtB => remove_from(&mut self.court_b.players, player_id),
            Slot::QueueTeam(id) => {
                let id = id.clone();
                self.queue
                    .iter_mut()
                    .find(|t| t.id == id)
                    .and_then(|t| remove_from(&mut t.players, player_id))
            }
            Slot::QueueTail => None,
        };

        if let Some(player) = removed {
            self.queue.retain(|t| !t.players.is_empty());
            self.deleted_players.push(DeletedPlayer { player, origin });
        }
    }

    /// Restore the most recently removed player to where it came from, or to
    /// the queue tail if that spot is gone or full.
    pub fn undo_remove_player(&mut self) {
        let Some(record) = self.deleted_players.pop() else {
            return;
        };

        let fits = match &record.origin {
            Slot::CourtA => !self.court_a.is_full(),
            Slot::CourtB => !self.court_b.is_full(),
            Slot::QueueTeam(id) => self
                .queue
                .iter()
                .any(|t| &t.id == id && t.players.len() < PLAYERS_PER_TEAM),
            Slot::QueueTail => false,
        };

        if fits {
            self.place_player(record.player, &record.origin);
        } else {
            self.push_to_queue_tail(record.player);
        }
    }

    /// Forget the removal history; removals become final.
    pub fn commit_deletions(&mut self) {
        self.deleted_players.clear();
    }

    pub fn has_deleted_players(&self) -> bool {
        !self.deleted_players.is_empty()
    }

    // ========================
    // Name & Skill Edits
    // ========================

    /// Rename a team by id ("A"/"B" or a queue team id) and propagate court
    /// names to the match display names.
    pub fn update_team_name(&mut self, team_id: &str, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if team_id == self.court_a.id {
            self.court_a.name = name.to_string();
        } else if team_id == self.court_b.id {
            self.court_b.name = name.to_string();
        } else if let Some(team) = self.queue.iter_mut().find(|t| t.id == team_id) {
            team.name = name.to_string();
        }
        self.sync_display_names();
    }

    pub fn update_player_name(&mut self, player_id: &str, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if let Some(player) = self.player_mut(player_id) {
            player.name = name.to_string();
        }
    }

    pub fn set_player_skill(&mut self, player_id: &str, skill_level: u8) {
        if let Some(player) = self.player_mut(player_id) {
            player.skill_level = skill_level.clamp(1, 5);
        }
    }

    fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.court_a
            .players
            .iter_mut()
            .chain(self.court_b.players.iter_mut())
            .chain(self.queue.iter_mut().flat_map(|t| t.players.iter_mut()))
            .find(|p| p.id == player_id)
    }
}

fn remove_from(players: &mut Vec<Player>, player_id: &str) -> Option<Player> {
    let idx = players.iter().position(|p| p.id == player_id)?;
    if players[idx].is_fixed {
        return None;
    }
    Some(players.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn state_with_players(count: usize) -> GameState {
        let list: Vec<String> = (0..count).map(|i| format!("Player {i}")).collect();
        let mut state = GameState::new();
        state.generate_teams(&list);
        state
    }

    #[test]
    fn test_generate_teams_fills_courts_then_queue() {
        let state = state_with_players(15);
        assert_eq!(state.court_a.players.len(), 6);
        assert_eq!(state.court_b.players.len(), 6);
        assert_eq!(state.queue.len(), 1);
        assert_eq!(state.queue[0].players.len(), 3);
        assert_eq!(state.queue[0].name, "Queue Team 1");
        assert_eq!(state.team_a_name, "Team A");
    }

    #[test]
    fn test_generate_teams_skips_blank_names() {
        let mut state = GameState::new();
        state.generate_teams(&names(&["Ana", "  ", "", "Bia"]));
        assert_eq!(state.total_player_count(), 2);
        assert_eq!(state.court_a.players[1].original_index, 1);
    }

    #[test]
    fn test_move_player_respects_capacity() {
        let mut state = state_with_players(13);
        let mover = state.queue[0].players[0].clone();
        let origin = Slot::QueueTeam(state.queue[0].id.clone());

        // Court A is full: the move is refused and the player stays put.
        state.move_player(&mover.id, &origin, &Slot::CourtA);
        assert_eq!(state.total_player_count(), 13);
        assert_eq!(state.queue[0].players.len(), 1);
    }

    #[test]
    fn test_move_locked_player_off_court_is_refused() {
        let mut state = state_with_players(12);
        let player_id = state.court_a.players[0].id.clone();
        state.toggle_player_fixed(&player_id);

        state.move_player(&player_id, &Slot::CourtA, &Slot::QueueTail);

        assert!(state.court_a.players.iter().any(|p| p.id == player_id));
        assert!(state.queue.is_empty());
    }

    #[test]
    fn test_move_to_queue_tail_opens_new_team_when_full() {
        let mut state = state_with_players(18);
        assert_eq!(state.queue.len(), 1);
        let mover = state.court_b.players[5].clone();

        state.move_player(&mover.id, &Slot::CourtB, &Slot::QueueTail);

        // Queue Team 1 already holds six, so a fresh team opens.
        assert_eq!(state.queue.len(), 2);
        assert_eq!(state.queue[1].players.len(), 1);
        assert_eq!(state.total_player_count(), 18);
    }

    #[test]
    fn test_toggle_player_fixed_stamps_side() {
        let mut state = state_with_players(12);
        let player_id = state.court_b.players[0].id.clone();

        state.toggle_player_fixed(&player_id);
        let player = state.court_b.players.iter().find(|p| p.id == player_id).unwrap();
        assert!(player.is_fixed);
        assert_eq!(player.fixed_side.as_deref(), Some("B"));

        state.toggle_player_fixed(&player_id);
        let player = state.court_b.players.iter().find(|p| p.id == player_id).unwrap();
        assert!(!player.is_fixed);
        assert!(player.fixed_side.is_none());
    }

    #[test]
    fn test_add_player_to_full_queue_team_is_refused() {
        // 18 players: both courts full plus one full queue team.
        let mut state = state_with_players(18);
        let queue_id = state.queue[0].id.clone();
        assert_eq!(state.queue[0].players.len(), 6);

        state.add_player("Extra", &Slot::QueueTeam(queue_id));

        assert_eq!(state.queue[0].players.len(), 6);
        assert_eq!(state.total_player_count(), 18);

        // The tail slot still accepts: a fresh queue team opens.
        state.add_player("Extra", &Slot::QueueTail);
        assert_eq!(state.queue.len(), 2);
        assert_eq!(state.total_player_count(), 19);
    }

    #[test]
    fn test_remove_player_is_undoable() {
        let mut state = state_with_players(12);
        let player_id = state.court_a.players[2].id.clone();

        state.remove_player(&player_id);
        assert_eq!(state.total_player_count(), 11);
        assert!(state.has_deleted_players());

        state.undo_remove_player();
        assert_eq!(state.total_player_count(), 12);
        assert!(state.court_a.players.iter().any(|p| p.id == player_id));
        assert!(!state.has_deleted_players());
    }

    #[test]
    fn test_remove_locked_player_is_refused() {
        let mut state = state_with_players(12);
        let player_id = state.court_a.players[0].id.clone();
        state.toggle_player_fixed(&player_id);

        state.remove_player(&player_id);

        assert_eq!(state.total_player_count(), 12);
        assert!(!state.has_deleted_players());
    }

    #[test]
    fn test_update_team_name_syncs_display_names() {
        let mut state = state_with_players(12);
        state.update_team_name("A", "Os Craques");
        assert_eq!(state.court_a.name, "Os Craques");
        assert_eq!(state.team_a_name, "Os Craques");
    }

    #[test]
    fn test_rotate_teams_empty_queue_is_noop() {
        let mut state = state_with_players(12);
        let before = state.clone();
        state.rotate_teams(TeamId::A, None);
        assert_eq!(state, before);
    }

    #[test]
    fn test_rotate_teams_swaps_loser_for_queue_head() {
        let mut state = state_with_players(18);
        let loser_players: Vec<String> =
            state.court_b.players.iter().map(|p| p.id.clone()).collect();

        state.rotate_teams(TeamId::A, None);

        // Court ids stay fixed, the roster changed.
        assert_eq!(state.court_b.id, "B");
        assert!(state.court_b.players.iter().all(|p| !loser_players.contains(&p.id)));
        assert_eq!(state.total_player_count(), 18);
        assert!(state.rotation_report.is_some());
        assert_eq!(state.score_a, 0);
        assert!(!state.is_match_over);
    }

    #[test]
    fn test_rotate_replays_supplied_report_verbatim() {
        let mut state = state_with_players(18);
        let report = rotation::rotation_preview(
            crate::models::RotationMode::Standard,
            TeamId::A,
            &state.court_a,
            &state.court_b,
            &state.queue,
        )
        .unwrap();

        state.rotate_teams(TeamId::A, Some(report.clone()));

        assert_eq!(state.court_b.players, report.incoming_team.players);
        assert_eq!(state.queue, report.queue_after_rotation);
    }

    #[test]
    fn test_balance_teams_conserves_pool() {
        let mut state = state_with_players(17);
        state.balance_teams(crate::models::RotationMode::Balanced);
        assert_eq!(state.total_player_count(), 17);
    }

    #[test]
    fn test_set_player_skill_clamps() {
        let mut state = state_with_players(12);
        let player_id = state.court_a.players[0].id.clone();
        state.set_player_skill(&player_id, 99);
        assert_eq!(state.court_a.players[0].skill_level, 5);
    }

    #[test]
    fn test_legacy_state_json_rehydrates() {
        // Minimal legacy payload: no action_log, no queue, no config block.
        let json = r#"{
            "team_a_name": "Home", "team_b_name": "Guest",
            "score_a": 7, "score_b": 4,
            "sets_a": 0, "sets_b": 0, "current_set": 1,
            "history": [],
            "is_match_over": false, "match_winner": null,
            "serving_team": "A",
            "timeouts_a": 0, "timeouts_b": 1
        }"#;
        let state: GameState = serde_json::from_str(json).unwrap();
        assert_eq!(state.score_a, 7);
        assert!(state.action_log.is_empty());
        assert!(state.queue.is_empty());
        assert_eq!(state.config, GameConfig::default());
        assert_eq!(state.court_a.id, "A");
    }
}
