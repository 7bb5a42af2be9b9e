use std::collections::{BTreeMap, BTreeSet};

use nightwatch::game::resolve::{resolve_shots, resolve_vote};
use nightwatch::game::{Ballot, Game, GameId, Player, Role, Shot};
use proptest::prelude::*;

fn roster(roles: &[Role]) -> Game {
    let players = roles
        .iter()
        .enumerate()
        .map(|(i, role)| Player::new(i as i64, format!("p{i}"), *role))
        .collect();
    Game::new(GameId::new("g"), 1, players)
}

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Civilian),
        Just(Role::Mafia),
        Just(Role::Don),
        Just(Role::Sheriff),
    ]
}

/// A vote where every voter of `0..voters` casts exactly one ballot.
fn ballots(voters: usize, players: usize) -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(prop::option::of(0..players), voters)
}

fn tally(choices: &[Option<usize>]) -> BTreeMap<Ballot, BTreeSet<usize>> {
    let mut vote: BTreeMap<Ballot, BTreeSet<usize>> = BTreeMap::new();
    for (voter, choice) in choices.iter().enumerate() {
        let ballot = choice.map_or(Ballot::Abstain, Ballot::Against);
        vote.entry(ballot).or_default().insert(voter);
    }
    vote
}

proptest! {
    #[test]
    fn jailed_player_has_a_strict_plurality(choices in ballots(9, 9)) {
        let vote = tally(&choices);
        if let Some(jailed) = resolve_vote(&vote) {
            let against = vote[&Ballot::Against(jailed)].len();
            for (ballot, voters) in &vote {
                if *ballot != Ballot::Against(jailed) {
                    prop_assert!(voters.len() < against);
                }
            }
        }
    }

    #[test]
    fn vote_result_ignores_voter_identity(choices in ballots(7, 7)) {
        let mut reversed = choices.clone();
        reversed.reverse();
        prop_assert_eq!(resolve_vote(&tally(&choices)), resolve_vote(&tally(&reversed)));
    }

    #[test]
    fn shots_kill_only_on_unanimity(
        roles in prop::collection::vec(role(), 1..10),
        aim in prop::collection::vec(0usize..10, 10),
    ) {
        let game = roster(&roles);
        let shots: Vec<Shot> = game
            .living_armed()
            .map(|(shooter, _)| Shot { shooter, target: aim[shooter] % roles.len() })
            .collect();

        let victim = resolve_shots(&game, &shots);
        match victim {
            Some(target) => {
                prop_assert!(!shots.is_empty());
                prop_assert!(shots.iter().all(|s| s.target == target));
            }
            None => {
                let unanimous = shots.first().is_some_and(|first| {
                    shots.iter().all(|s| s.target == first.target)
                });
                prop_assert!(!unanimous);
            }
        }
    }

    #[test]
    fn a_missing_shooter_saves_the_target(roles in prop::collection::vec(role(), 2..10)) {
        let game = roster(&roles);
        let armed: Vec<usize> = game.living_armed().map(|(i, _)| i).collect();
        prop_assume!(!armed.is_empty());

        let shots: Vec<Shot> = armed
            .iter()
            .skip(1)
            .map(|&shooter| Shot { shooter, target: 0 })
            .collect();
        prop_assert_eq!(resolve_shots(&game, &shots), None);
    }
}

#[test]
fn shots_from_dead_shooters_do_not_count() {
    let mut game = roster(&[Role::Don, Role::Mafia, Role::Civilian, Role::Civilian]);
    game.players[1].alive = false;
    let shots = [
        Shot {
            shooter: 0,
            target: 2,
        },
        Shot {
            shooter: 1,
            target: 3,
        },
    ];
    assert_eq!(resolve_shots(&game, &shots), Some(2));
}

#[test]
fn dead_target_is_not_killed_twice() {
    let mut game = roster(&[Role::Don, Role::Civilian]);
    game.players[1].alive = false;
    let shots = [Shot {
        shooter: 0,
        target: 1,
    }];
    assert_eq!(resolve_shots(&game, &shots), None);
}
