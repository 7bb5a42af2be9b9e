//! Text rendering of rosters and vote tallies.
//!
//! Player numbers shown to users are 1-based positions in the roster, so a
//! player keeps the same number for the whole game even after others die.

use super::{Ballot, Game, Player, RoleTitles};

/// Renders one line per player accepted by `include`: `"{n}. {name}"`,
/// followed by `" - {title}"` when `show_roles` is set.
pub fn format_roster(
    game: &Game,
    titles: &RoleTitles,
    show_roles: bool,
    include: impl Fn(&Player) -> bool,
) -> String {
    game.players
        .iter()
        .enumerate()
        .filter(|(_, p)| include(p))
        .map(|(i, p)| {
            if show_roles {
                format!("{}. {} - {}", i + 1, p.name, titles.title(p.role))
            } else {
                format!("{}. {}", i + 1, p.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the living players without roles.
#[must_use]
pub fn format_living(game: &Game, titles: &RoleTitles) -> String {
    format_roster(game, titles, false, |p| p.alive)
}

/// Renders the live vote: an abstain line numbered `0`, then one line per
/// living player, each followed by the numbers of its voters.
#[must_use]
pub fn format_votes(game: &Game, abstain_label: &str) -> String {
    let line = |number: usize, name: &str, ballot: Ballot| {
        game.vote.get(&ballot).filter(|v| !v.is_empty()).map_or_else(
            || format!("{number}. {name}"),
            |voters| {
                let numbers = voters
                    .iter()
                    .map(|v| (v + 1).to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{number}. {name}: {numbers}")
            },
        )
    };

    std::iter::once(line(0, abstain_label, Ballot::Abstain))
        .chain(
            game.living()
                .map(|(i, p)| line(i + 1, &p.name, Ballot::Against(i))),
        )
        .collect::<Vec<_>>()
        .join("\n")
}
