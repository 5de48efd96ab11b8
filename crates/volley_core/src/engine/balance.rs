//! Team balancing strategies.
//!
//! Both strategies repartition the flat player pool over the two court teams
//! and the waiting queue. They are pure: inputs are borrowed, the result is a
//! freshly built structure the caller adopts wholesale. Locked players
//! (anchors) never move; each bucket holds at most [`PLAYER_LIMIT_ON_COURT`]
//! players and overflow spills into new queue teams.

use std::collections::HashSet;

use crate::models::{Player, Team, TeamId, PLAYER_LIMIT_ON_COURT};

/// Result of a balancing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceResult {
    pub court_a: Team,
    pub court_b: Team,
    pub queue: Vec<Team>,
}

/// Buckets seeded with the anchors of the current structure, in order:
/// court A, court B, then queue teams. Returns the buckets and the ids of
/// the anchored players.
fn seed_anchor_buckets(
    court_a: &Team,
    court_b: &Team,
    queue: &[Team],
) -> (Vec<Vec<Player>>, HashSet<String>) {
    let mut buckets = Vec::with_capacity(2 + queue.len());
    let mut anchored_ids = HashSet::new();

    for team in [court_a, court_b].into_iter().chain(queue.iter()) {
        let anchors: Vec<Player> = team.players.iter().filter(|p| p.is_fixed).cloned().collect();
        for anchor in &anchors {
            anchored_ids.insert(anchor.id.clone());
        }
        buckets.push(anchors);
    }

    (buckets, anchored_ids)
}

/// Rebuild the court/queue structure from filled buckets. Buckets 0 and 1 are
/// the courts and keep their identity; surviving queue buckets keep the id and
/// name of the team previously at that position, fresh buckets get new ones.
fn rebuild(
    buckets: Vec<Vec<Player>>,
    court_a: &Team,
    court_b: &Team,
    queue: &[Team],
) -> BalanceResult {
    let mut buckets = buckets.into_iter();

    let new_court_a = Team { players: buckets.next().unwrap_or_default(), ..court_a.clone() };
    let new_court_b = Team { players: buckets.next().unwrap_or_default(), ..court_b.clone() };

    let mut new_queue = Vec::new();
    for (idx, players) in buckets.enumerate() {
        if players.is_empty() {
            continue;
        }
        match queue.get(idx) {
            Some(existing) => new_queue.push(Team { players, ..existing.clone() }),
            None => new_queue.push(Team::new(format!("Team {}", idx + 3), players)),
        }
    }

    BalanceResult { court_a: new_court_a, court_b: new_court_b, queue: new_queue }
}

/// Standard distribution: restore the original entry order.
///
/// Anchors stay put; everyone else is sorted by `original_index` and dealt
/// linearly into court A, court B, then the queue teams in order.
pub fn distribute_standard(
    all_players: &[Player],
    court_a: &Team,
    court_b: &Team,
    queue: &[Team],
) -> BalanceResult {
    let (mut buckets, anchored_ids) = seed_anchor_buckets(court_a, court_b, queue);

    let mut pool: Vec<Player> =
        all_players.iter().filter(|p| !anchored_ids.contains(&p.id)).cloned().collect();
    pool.sort_by_key(|p| p.original_index);

    let mut idx = 0;
    for player in pool {
        while buckets.get(idx).map(|b| b.len() >= PLAYER_LIMIT_ON_COURT).unwrap_or(false) {
            idx += 1;
        }
        if idx >= buckets.len() {
            buckets.push(Vec::new());
        }
        buckets[idx].push(player);
    }

    rebuild(buckets, court_a, court_b, queue)
}

/// Balanced distribution (greedy snake draft).
///
/// Anchors stay put; the free pool is sorted by skill descending and each
/// player joins the non-full bucket with the lowest current total skill, ties
/// broken by bucket index. Feeding the weakest bucket first approximates a
/// low-variance partition without combinatorial search, which is acceptable
/// for buckets of at most six players on a 1-5 skill scale.
pub fn balance_teams_snake(
    all_players: &[Player],
    court_a: &Team,
    court_b: &Team,
    queue: &[Team],
) -> BalanceResult {
    let (mut buckets, anchored_ids) = seed_anchor_buckets(court_a, court_b, queue);

    let mut pool: Vec<Player> =
        all_players.iter().filter(|p| !anchored_ids.contains(&p.id)).cloned().collect();
    pool.sort_by(|a, b| b.skill_level.cmp(&a.skill_level));

    // Enough buckets to hold everyone at capacity 6, never fewer than the
    // current structure and never fewer than the two courts.
    let required = all_players.len().div_ceil(PLAYER_LIMIT_ON_COURT).max(2).max(buckets.len());
    buckets.resize_with(required, Vec::new);

    for player in pool {
        let target = buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.len() < PLAYER_LIMIT_ON_COURT)
            .min_by_key(|(idx, b)| {
                (b.iter().map(|p| p.skill_level as u32).sum::<u32>(), *idx)
            })
            .map(|(idx, _)| idx);

        match target {
            Some(idx) => buckets[idx].push(player),
            None => {
                // Anchors crowded every bucket to capacity; open a fresh one.
                buckets.push(vec![player]);
            }
        }
    }

    rebuild(buckets, court_a, court_b, queue)
}

/// Convenience wrapper dispatching on the configured mode.
pub fn rebalance(
    mode: crate::models::RotationMode,
    all_players: &[Player],
    court_a: &Team,
    court_b: &Team,
    queue: &[Team],
) -> BalanceResult {
    match mode {
        crate::models::RotationMode::Standard => {
            distribute_standard(all_players, court_a, court_b, queue)
        }
        crate::models::RotationMode::Balanced => {
            balance_teams_snake(all_players, court_a, court_b, queue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_players(skills: &[u8]) -> Vec<Player> {
        skills.iter().enumerate().map(|(i, &s)| Player::new(format!("P{i}"), s, i)).collect()
    }

    fn empty_courts() -> (Team, Team) {
        (Team::court(TeamId::A, "Home"), Team::court(TeamId::B, "Guest"))
    }

    fn result_count(result: &BalanceResult) -> usize {
        result.court_a.players.len()
            + result.court_b.players.len()
            + result.queue.iter().map(|t| t.players.len()).sum::<usize>()
    }

    #[test]
    fn test_standard_restores_entry_order() {
        let players = make_players(&[1, 5, 2, 4, 3, 1, 2, 5]);
        let (court_a, court_b) = empty_courts();

        let result = distribute_standard(&players, &court_a, &court_b, &[]);

        assert_eq!(result.court_a.players.len(), 6);
        assert_eq!(result.court_b.players.len(), 2);
        let indices: Vec<usize> =
            result.court_a.players.iter().map(|p| p.original_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_standard_keeps_anchor_on_its_side() {
        let mut players = make_players(&[3, 3, 3, 3]);
        players[3].is_fixed = true;
        let (mut court_a, mut court_b) = empty_courts();
        court_a.players = players[..2].to_vec();
        court_b.players = players[2..].to_vec();
        let all: Vec<Player> = players.clone();

        let result = distribute_standard(&all, &court_a, &court_b, &[]);

        // The anchor entered last but stays on court B; the free players are
        // dealt to A in entry order.
        assert!(result.court_b.players.iter().any(|p| p.id == players[3].id));
        assert_eq!(result_count(&result), 4);
    }

    #[test]
    fn test_snake_eight_players_two_buckets_diff_within_one() {
        // Skills [5,4,3,3,2,2,1,1] over two buckets must end within 1 point
        // of each other. With eight players and capacity 6 the greedy rule
        // alone keeps both courts in play.
        let players = make_players(&[5, 4, 3, 3, 2, 2, 1, 1]);
        let (court_a, court_b) = empty_courts();

        let result = balance_teams_snake(&players, &court_a, &court_b, &[]);

        let sum_a = result.court_a.total_skill() as i32;
        let sum_b = result.court_b.total_skill() as i32;
        assert!(result.queue.is_empty());
        assert!((sum_a - sum_b).abs() <= 1, "skill sums {sum_a} vs {sum_b}");
    }

    #[test]
    fn test_snake_overflow_spills_into_queue() {
        let players = make_players(&[3; 15]);
        let (court_a, court_b) = empty_courts();

        let result = balance_teams_snake(&players, &court_a, &court_b, &[]);

        assert_eq!(result_count(&result), 15);
        assert!(!result.queue.is_empty());
        for team in &result.queue {
            assert!(team.players.len() <= PLAYER_LIMIT_ON_COURT);
        }
    }

    #[test]
    fn test_snake_keeps_existing_queue_team_identity() {
        let players = make_players(&[3; 14]);
        let (mut court_a, mut court_b) = empty_courts();
        court_a.players = players[..6].to_vec();
        court_b.players = players[6..12].to_vec();
        let queue = vec![Team::new("Os Reservas", players[12..].to_vec())];

        let result = balance_teams_snake(&players, &court_a, &court_b, &queue);

        assert_eq!(result.queue.len(), 1);
        assert_eq!(result.queue[0].id, queue[0].id);
        assert_eq!(result.queue[0].name, "Os Reservas");
    }

    proptest! {
        #[test]
        fn prop_standard_conserves_players(skills in proptest::collection::vec(1u8..=5, 1..30)) {
            let players = make_players(&skills);
            let (court_a, court_b) = empty_courts();
            let result = distribute_standard(&players, &court_a, &court_b, &[]);
            prop_assert_eq!(result_count(&result), players.len());
        }

        #[test]
        fn prop_snake_conserves_players(skills in proptest::collection::vec(1u8..=5, 1..30)) {
            let players = make_players(&skills);
            let (court_a, court_b) = empty_courts();
            let result = balance_teams_snake(&players, &court_a, &court_b, &[]);
            prop_assert_eq!(result_count(&result), players.len());
        }

        #[test]
        fn prop_snake_never_moves_anchors(
            skills in proptest::collection::vec(1u8..=5, 12..18),
            anchor_idx in 0usize..6,
        ) {
            let mut players = make_players(&skills);
            players[anchor_idx].is_fixed = true;
            let anchor_id = players[anchor_idx].id.clone();

            let (mut court_a, mut court_b) = empty_courts();
            court_a.players = players[..6].to_vec();
            court_b.players = players[6..12].to_vec();
            let queue = vec![Team::new("Queue Team 1", players[12..].to_vec())];

            let result = balance_teams_snake(&players, &court_a, &court_b, &queue);

            // The anchor was on court A and must still be there.
            prop_assert!(result.court_a.players.iter().any(|p| p.id == anchor_id));
        }
    }
}
