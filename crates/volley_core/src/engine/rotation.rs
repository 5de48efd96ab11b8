//! Post-match team rotation.
//!
//! When a match ends the losing team leaves the court and the head of the
//! waiting queue comes in. Locked players on the losing side are anchors:
//! they stay on the court and merge into the incoming team. Gaps in the
//! incoming team are filled by stealing non-locked players from later queue
//! entries, under one of two policies.
//!
//! Everything here is pure: the same inputs always produce the same
//! [`RotationResult`], which lets the caller show a preview when the match
//! ends and replay it verbatim when the rotation is committed.

use crate::models::{
    Player, RotationMode, RotationReport, Team, TeamId, PLAYER_LIMIT_ON_COURT,
};

/// Outcome of one rotation: the merged incoming team, the queue that remains,
/// and the audit trail of players pulled out of later queue entries.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationResult {
    pub incoming_team: Team,
    pub queue: Vec<Team>,
    pub stolen_players: Vec<Player>,
}

/// Rotate the loser out and the queue head in.
///
/// Returns `None` when the queue is empty: with nobody waiting there is no
/// incoming team and the rotation is a no-op for the caller.
pub fn rotate(
    mode: RotationMode,
    winner: &Team,
    loser: &Team,
    queue: &[Team],
) -> Option<RotationResult> {
    if queue.is_empty() {
        return None;
    }

    let mut queue: Vec<Team> = queue.to_vec();

    // 1. Split the loser: anchors stay on court, leavers go to the queue tail
    //    as a team of their own, keeping the loser's name.
    let (anchors, leavers) = loser.partition_anchors();
    if !leavers.is_empty() {
        queue.push(Team::new(loser.name.clone(), leavers));
    }

    // 2. The queue head is the incoming base.
    let base = queue.remove(0);
    let mut players = base.players.clone();
    players.extend(anchors);

    // 3. Over capacity after the merge: eject non-locked players first, into
    //    a fresh tail entry.
    let mut overflow = Vec::new();
    while players.len() > PLAYER_LIMIT_ON_COURT {
        let eject_idx = players.iter().position(|p| !p.is_fixed).unwrap_or(0);
        overflow.push(players.remove(eject_idx));
    }
    if !overflow.is_empty() {
        queue.push(Team::new("Overflow", overflow));
    }

    // 4. Fill remaining gaps from the queue.
    let mut stolen_players = Vec::new();
    match mode {
        RotationMode::Standard => {
            fill_standard(&mut players, &mut queue, &mut stolen_players);
        }
        RotationMode::Balanced => {
            fill_balanced(&mut players, &mut queue, &mut stolen_players, winner.average_skill());
        }
    }

    queue.retain(|t| !t.players.is_empty());

    let incoming_team = Team {
        id: uuid::Uuid::new_v4().to_string(),
        name: base.name,
        color: base.color,
        players,
    };

    Some(RotationResult { incoming_team, queue, stolen_players })
}

/// Standard steal policy: scan queue teams in order and, within each, players
/// from last to first; take the first non-locked candidate found, then start
/// over. Stealing from the tail preserves the core of each donor team.
fn fill_standard(players: &mut Vec<Player>, queue: &mut [Team], stolen: &mut Vec<Player>) {
    while players.len() < PLAYER_LIMIT_ON_COURT {
        let candidate = queue.iter_mut().find_map(|team| {
            team.players
                .iter()
                .rposition(|p| !p.is_fixed)
                .map(|idx| team.players.remove(idx))
        });
        match candidate {
            Some(player) => {
                stolen.push(player.clone());
                players.push(player);
            }
            None => break,
        }
    }
}

/// Balanced steal policy: among all non-locked queue players, take whichever
/// single addition brings the incoming team's mean skill closest to the
/// winner's mean. The target is computed once, not updated per steal.
fn fill_balanced(
    players: &mut Vec<Player>,
    queue: &mut [Team],
    stolen: &mut Vec<Player>,
    target_avg: f32,
) {
    while players.len() < PLAYER_LIMIT_ON_COURT {
        let current_sum: u32 = players.iter().map(|p| p.skill_level as u32).sum();
        let next_count = (players.len() + 1) as f32;

        let mut best: Option<(f32, usize, usize)> = None;
        for (t_idx, team) in queue.iter().enumerate() {
            for (p_idx, player) in team.players.iter().enumerate() {
                if player.is_fixed {
                    continue;
                }
                let new_avg = (current_sum + player.skill_level as u32) as f32 / next_count;
                let delta = (new_avg - target_avg).abs();
                if best.map(|(d, _, _)| delta < d).unwrap_or(true) {
                    best = Some((delta, t_idx, p_idx));
                }
            }
        }

        match best {
            Some((_, t_idx, p_idx)) => {
                let player = queue[t_idx].players.remove(p_idx);
                stolen.push(player.clone());
                players.push(player);
            }
            None => break,
        }
    }
}

/// Build the report shown to the players when a match ends.
///
/// `winner_side` names the court that kept the match; the opposite court is
/// the outgoing team. Returns `None` (and lets the caller warn) when the
/// queue is empty.
pub fn rotation_preview(
    mode: RotationMode,
    winner_side: TeamId,
    court_a: &Team,
    court_b: &Team,
    queue: &[Team],
) -> Option<RotationReport> {
    let (winner, loser) = match winner_side {
        TeamId::A => (court_a, court_b),
        TeamId::B => (court_b, court_a),
    };

    rotate(mode, winner, loser, queue).map(|result| RotationReport {
        outgoing_team: loser.clone(),
        incoming_team: result.incoming_team,
        stolen_players: result.stolen_players,
        queue_after_rotation: result.queue,
    })
}
