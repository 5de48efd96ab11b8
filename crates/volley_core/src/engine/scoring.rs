//! Match scoring state machine.
//!
//! Drives a match through `InProgress` -> (set transition) -> `MatchOver` via
//! [`GameState::add_point`]. Ordinary points are reversible through the
//! action log; set and match boundaries are reversible exactly once through
//! the aggregate snapshot taken just before the transition applies.
//!
//! Every guard is a silent no-op. The engine holds no wall clock: elapsed
//! time advances only when the caller drives [`GameState::tick_second`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::rotation;
use crate::models::{
    ActionLogEntry, GameConfig, MatchRecord, SetHistory, TeamId, MAX_SCORE,
    MAX_TIMEOUTS_PER_SET, MIN_LEAD_TO_WIN, SUDDEN_DEATH_TARGET,
};
use crate::state::GameState;

impl GameState {
    // ========================
    // Scoring
    // ========================

    /// Award a rally point.
    pub fn add_point(&mut self, team: TeamId) {
        if self.is_match_over || self.score_a >= MAX_SCORE || self.score_b >= MAX_SCORE {
            return;
        }

        let prev_score_a = self.score_a;
        let prev_score_b = self.score_b;
        let prev_serving_team = self.serving_team;
        let prev_in_sudden_death = self.in_sudden_death;

        let mut score_a = self.score_a + u8::from(team == TeamId::A);
        let mut score_b = self.score_b + u8::from(team == TeamId::B);

        let target = self.points_to_win_current_set();

        // One point short on both sides under the capped deuce policy: the
        // set restarts as a race to three.
        let mut entering_sudden_death = false;
        if self.config.deuce_type == crate::models::DeuceType::SuddenDeath3Pt
            && !self.in_sudden_death
            && score_a == target - 1
            && score_b == target - 1
        {
            score_a = 0;
            score_b = 0;
            entering_sudden_death = true;
        }

        let in_sudden_death = self.in_sudden_death || entering_sudden_death;
        let set_winner = if in_sudden_death {
            sudden_death_winner(score_a, score_b)
        } else {
            regulation_winner(score_a, score_b, target)
        };

        let Some(set_winner) = set_winner else {
            // Ordinary point: log it with the counters it replaced and
            // invalidate any boundary snapshot.
            self.score_a = score_a;
            self.score_b = score_b;
            self.serving_team = Some(team);
            self.is_timer_running = true;
            self.in_sudden_death = in_sudden_death;
            self.action_log.push(ActionLogEntry::Point {
                team,
                prev_score_a,
                prev_score_b,
                prev_serving_team,
                prev_in_sudden_death,
            });
            self.last_snapshot = None;
            return;
        };

        // Set (possibly match) boundary: snapshot the whole aggregate first,
        // minus any older snapshot, so one undo reverses the transition.
        let snapshot = GameState { last_snapshot: None, ..self.clone() };
        self.last_snapshot = Some(Box::new(snapshot));

        self.history.push(SetHistory {
            set_number: self.current_set,
            score_a,
            score_b,
            winner: set_winner,
        });
        match set_winner {
            TeamId::A => self.sets_a += 1,
            TeamId::B => self.sets_b += 1,
        }

        let sets_needed = self.config.sets_to_win();
        let match_winner = if self.sets_a == sets_needed {
            Some(TeamId::A)
        } else if self.sets_b == sets_needed {
            Some(TeamId::B)
        } else {
            None
        };

        self.action_log.clear();
        self.serving_team = None;
        self.timeouts_a = 0;
        self.timeouts_b = 0;
        self.in_sudden_death = false;

        if let Some(match_winner) = match_winner {
            // Final scores stay on the board.
            self.score_a = score_a;
            self.score_b = score_b;
            self.match_winner = Some(match_winner);
            self.is_match_over = true;
            self.is_timer_running = false;
            self.rotation_report = rotation::rotation_preview(
                self.config.rotation_mode,
                match_winner,
                &self.court_a,
                &self.court_b,
                &self.queue,
            );
            if self.rotation_report.is_none() {
                log::warn!("Match over with an empty queue; no rotation to preview");
            }
        } else {
            self.score_a = 0;
            self.score_b = 0;
            self.current_set += 1;
            self.is_timer_running = true;
        }
    }

    /// Manual score correction. Stays out of the action log and leaves any
    /// boundary snapshot alone, deliberately asymmetric with `add_point`.
    pub fn subtract_point(&mut self, team: TeamId) {
        if self.is_match_over {
            return;
        }
        match team {
            TeamId::A if self.score_a > 0 => self.score_a -= 1,
            TeamId::B if self.score_b > 0 => self.score_b -= 1,
            _ => {}
        }
    }

    /// Take a timeout; each side gets two per set.
    pub fn use_timeout(&mut self, team: TeamId) {
        if self.is_match_over {
            return;
        }
        let counter = match team {
            TeamId::A => self.timeouts_a,
            TeamId::B => self.timeouts_b,
        };
        if counter >= MAX_TIMEOUTS_PER_SET {
            return;
        }

        let prev_timeouts_a = self.timeouts_a;
        let prev_timeouts_b = self.timeouts_b;
        match team {
            TeamId::A => self.timeouts_a += 1,
            TeamId::B => self.timeouts_b += 1,
        }
        self.action_log.push(ActionLogEntry::Timeout { team, prev_timeouts_a, prev_timeouts_b });
        self.last_snapshot = None;
    }

    // ========================
    // Undo
    // ========================

    /// Reverse the most recent action.
    ///
    /// Resolution order: a boundary snapshot wins and is restored wholesale
    /// (the only way back across a set or match transition; the aggregate
    /// snapshot also rolls rosters and queue back in the same step). With the
    /// match over and no snapshot there is nothing to undo. Otherwise the
    /// last action-log entry is popped and its stored counters reapplied
    /// verbatim.
    pub fn undo(&mut self) {
        if let Some(snapshot) = self.last_snapshot.take() {
            *self = *snapshot;
            return;
        }
        if self.is_match_over {
            return;
        }
        match self.action_log.pop() {
            Some(ActionLogEntry::Point {
                prev_score_a,
                prev_score_b,
                prev_serving_team,
                prev_in_sudden_death,
                ..
            }) => {
                self.score_a = prev_score_a;
                self.score_b = prev_score_b;
                self.serving_team = prev_serving_team;
                self.in_sudden_death = prev_in_sudden_death;
            }
            Some(ActionLogEntry::Timeout { prev_timeouts_a, prev_timeouts_b, .. }) => {
                self.timeouts_a = prev_timeouts_a;
                self.timeouts_b = prev_timeouts_b;
            }
            None => {}
        }
    }

    pub fn can_undo(&self) -> bool {
        self.last_snapshot.is_some() || !self.action_log.is_empty()
    }

    // ========================
    // Match Lifecycle
    // ========================

    /// Back to the initial match state, keeping team names, rosters, queue
    /// and config.
    pub fn reset_match(&mut self) {
        let mut fresh = GameState::new();
        fresh.team_a_name = self.team_a_name.clone();
        fresh.team_b_name = self.team_b_name.clone();
        fresh.court_a = self.court_a.clone();
        fresh.court_b = self.court_b.clone();
        fresh.queue = std::mem::take(&mut self.queue);
        fresh.config = self.config.clone();
        fresh.deleted_players = std::mem::take(&mut self.deleted_players);
        *self = fresh;
    }

    /// Swap or restore a new rule set. With `should_reset` the match restarts
    /// under the new rules; otherwise the config applies in place (callers
    /// gate this on `is_match_active`).
    pub fn apply_settings(&mut self, config: GameConfig, should_reset: bool) {
        if config.validate().is_err() {
            log::warn!("Rejected invalid config update");
            return;
        }
        if should_reset {
            self.reset_match();
        }
        self.config = config;
    }

    /// One second of elapsed play, driven by an external 1 Hz tick.
    pub fn tick_second(&mut self) {
        if self.is_timer_running && !self.is_match_over {
            self.match_duration_seconds += 1;
        }
    }

    pub fn toggle_sides(&mut self) {
        self.swapped_sides = !self.swapped_sides;
    }

    /// Cycle the serve indicator: A -> B -> none -> A. Display control only,
    /// not logged.
    pub fn toggle_service(&mut self) {
        self.serving_team = match self.serving_team {
            Some(TeamId::A) => Some(TeamId::B),
            Some(TeamId::B) => None,
            None => Some(TeamId::A),
        };
    }

    /// Snapshot a finished match for an external history store. `finished_at`
    /// comes from the caller; the engine keeps no wall clock.
    pub fn finalize_match(&self, finished_at: DateTime<Utc>) -> Option<MatchRecord> {
        let winner = self.match_winner?;
        Some(MatchRecord {
            id: Uuid::new_v4().to_string(),
            timestamp: finished_at,
            duration_seconds: self.match_duration_seconds,
            team_a_name: self.team_a_name.clone(),
            team_b_name: self.team_b_name.clone(),
            sets_a: self.sets_a,
            sets_b: self.sets_b,
            winner: Some(winner),
            sets: self.history.clone(),
            config: self.config.clone(),
        })
    }

    // ========================
    // Derived Status
    // ========================

    /// Points needed to take the current set (tie-break aware).
    pub fn points_to_win_current_set(&self) -> u8 {
        if self.is_tie_break() {
            self.config.tie_break_points
        } else {
            self.config.points_per_set
        }
    }

    pub fn is_tie_break(&self) -> bool {
        self.config.has_tie_break && self.current_set == self.config.max_sets
    }

    pub fn sets_needed_to_win(&self) -> u8 {
        self.config.sets_to_win()
    }

    pub fn is_set_point(&self, side: TeamId) -> bool {
        let (mine, theirs) = self.scores_for(side);
        mine >= self.points_to_win_current_set().saturating_sub(1) && mine > theirs
    }

    pub fn is_match_point(&self, side: TeamId) -> bool {
        let sets = match side {
            TeamId::A => self.sets_a,
            TeamId::B => self.sets_b,
        };
        self.is_set_point(side) && sets + 1 == self.sets_needed_to_win()
    }

    pub fn is_deuce(&self) -> bool {
        self.score_a == self.score_b
            && self.score_a >= self.points_to_win_current_set().saturating_sub(1)
    }

    /// Whether any scoring has happened; callers gate config edits on this.
    pub fn is_match_active(&self) -> bool {
        self.score_a > 0
            || self.score_b > 0
            || self.sets_a > 0
            || self.sets_b > 0
            || self.current_set > 1
    }

    fn scores_for(&self, side: TeamId) -> (u8, u8) {
        match side {
            TeamId::A => (self.score_a, self.score_b),
            TeamId::B => (self.score_b, self.score_a),
        }
    }
}

fn regulation_winner(score_a: u8, score_b: u8, target: u8) -> Option<TeamId> {
    if score_a >= target && score_a >= score_b + MIN_LEAD_TO_WIN {
        Some(TeamId::A)
    } else if score_b >= target && score_b >= score_a + MIN_LEAD_TO_WIN {
        Some(TeamId::B)
    } else {
        None
    }
}

/// Sudden death is an uncapped race to three with a strict lead. A point
/// always breaks a tie, so 3-3 is unreachable; a side coming from behind can
/// still win e.g. 5-3.
fn sudden_death_winner(score_a: u8, score_b: u8) -> Option<TeamId> {
    if score_a >= SUDDEN_DEATH_TARGET && score_a > score_b {
        Some(TeamId::A)
    } else if score_b >= SUDDEN_DEATH_TARGET && score_b > score_a {
        Some(TeamId::B)
    } else {
        None
    }
}
