//! Vote and shot resolution.
//!
//! Both functions are pure: they read tallies and return who, if anyone,
//! is eliminated. Committing the result is the caller's job.

use std::collections::{BTreeMap, BTreeSet};

use super::{Ballot, Game, PlayerIndex, Shot};

/// Resolves a day vote.
///
/// The ballot with the most voters wins only if no other ballot ties it
/// and it names a player. A tie at the top, an abstain majority, or an
/// empty vote jails nobody.
#[must_use]
pub fn resolve_vote(vote: &BTreeMap<Ballot, BTreeSet<PlayerIndex>>) -> Option<PlayerIndex> {
    let most = vote.values().map(BTreeSet::len).max()?;
    if most == 0 {
        return None;
    }

    let mut leaders = vote
        .iter()
        .filter(|(_, voters)| voters.len() == most)
        .map(|(ballot, _)| *ballot);

    match (leaders.next(), leaders.next()) {
        (Some(Ballot::Against(index)), None) => Some(index),
        _ => None,
    }
}

/// Resolves the night shooting.
///
/// Only shots fired by players who are alive and armed right now count.
/// The shooting kills iff every such player fired exactly once, all shots
/// name the same target, and that target is still alive.
#[must_use]
pub fn resolve_shots(game: &Game, shots: &[Shot]) -> Option<PlayerIndex> {
    let armed: BTreeSet<PlayerIndex> = game.living_armed().map(|(i, _)| i).collect();
    if armed.is_empty() {
        return None;
    }

    let mut per_shooter: BTreeMap<PlayerIndex, PlayerIndex> = BTreeMap::new();
    for shot in shots.iter().filter(|s| armed.contains(&s.shooter)) {
        if per_shooter.insert(shot.shooter, shot.target).is_some() {
            return None;
        }
    }
    if per_shooter.len() != armed.len() {
        return None;
    }

    let mut targets = per_shooter.values().copied();
    let target = targets.next()?;
    if targets.any(|t| t != target) {
        return None;
    }

    game.player(target)
        .is_some_and(|p| p.alive)
        .then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameId, Player, Role};

    fn tally(entries: &[(Ballot, &[PlayerIndex])]) -> BTreeMap<Ballot, BTreeSet<PlayerIndex>> {
        entries
            .iter()
            .map(|(b, voters)| (*b, voters.iter().copied().collect()))
            .collect()
    }

    fn table(roles: &[Role]) -> Game {
        let players = roles
            .iter()
            .enumerate()
            .map(|(i, r)| Player::new(i as i64, format!("p{i}"), *r))
            .collect();
        Game::new(GameId::new("g"), 1, players)
    }

    fn shot(shooter: PlayerIndex, target: PlayerIndex) -> Shot {
        Shot { shooter, target }
    }

    #[test]
    fn clear_leader_is_jailed() {
        let vote = tally(&[
            (Ballot::Against(0), &[1, 2, 3]),
            (Ballot::Against(1), &[0]),
        ]);
        assert_eq!(resolve_vote(&vote), Some(0));
    }

    #[test]
    fn tie_at_top_jails_nobody() {
        let vote = tally(&[
            (Ballot::Against(0), &[1]),
            (Ballot::Against(1), &[1]),
            (Ballot::Against(2), &[3]),
        ]);
        // Voter 1 appearing twice cannot happen via handlers, but the rule
        // only looks at counts.
        assert_eq!(resolve_vote(&vote), None);
    }

    #[test]
    fn abstain_majority_jails_nobody() {
        let vote = tally(&[(Ballot::Abstain, &[0, 1, 2]), (Ballot::Against(3), &[4])]);
        assert_eq!(resolve_vote(&vote), None);
    }

    #[test]
    fn tie_with_abstain_jails_nobody() {
        let vote = tally(&[(Ballot::Abstain, &[0, 1]), (Ballot::Against(3), &[2, 4])]);
        assert_eq!(resolve_vote(&vote), None);
    }

    #[test]
    fn empty_vote_jails_nobody() {
        assert_eq!(resolve_vote(&BTreeMap::new()), None);
    }

    #[test]
    fn unanimous_shots_kill() {
        let g = table(&[Role::Mafia, Role::Mafia, Role::Civilian, Role::Don]);
        let shots = [shot(0, 2), shot(1, 2), shot(3, 2)];
        assert_eq!(resolve_shots(&g, &shots), Some(2));
    }

    #[test]
    fn split_shots_miss() {
        let g = table(&[Role::Mafia, Role::Mafia, Role::Civilian, Role::Don, Role::Sheriff]);
        let shots = [shot(0, 2), shot(1, 2), shot(3, 4)];
        assert_eq!(resolve_shots(&g, &shots), None);
    }

    #[test]
    fn partial_participation_misses() {
        let g = table(&[Role::Mafia, Role::Don, Role::Civilian]);
        assert_eq!(resolve_shots(&g, &[shot(0, 2)]), None);
    }

    #[test]
    fn double_shot_by_one_shooter_misses() {
        let g = table(&[Role::Mafia, Role::Civilian, Role::Civilian]);
        assert_eq!(resolve_shots(&g, &[shot(0, 1), shot(0, 1)]), None);
    }

    #[test]
    fn shots_from_dead_shooters_are_ignored() {
        let mut g = table(&[Role::Mafia, Role::Don, Role::Civilian]);
        g.players[0].alive = false;
        // The dead mafia's stale shot disagrees, but only the don counts.
        let shots = [shot(0, 1), shot(1, 2)];
        assert_eq!(resolve_shots(&g, &shots), Some(2));
    }

    #[test]
    fn shots_from_unarmed_players_are_ignored() {
        let g = table(&[Role::Don, Role::Sheriff, Role::Civilian]);
        let shots = [shot(1, 0), shot(0, 2)];
        assert_eq!(resolve_shots(&g, &shots), Some(2));
    }

    #[test]
    fn dead_target_is_not_killed_again() {
        let mut g = table(&[Role::Mafia, Role::Civilian]);
        g.players[1].alive = false;
        assert_eq!(resolve_shots(&g, &[shot(0, 1)]), None);
    }

    #[test]
    fn no_armed_players_no_kill() {
        let g = table(&[Role::Civilian, Role::Sheriff]);
        assert_eq!(resolve_shots(&g, &[shot(0, 1)]), None);
    }
}
