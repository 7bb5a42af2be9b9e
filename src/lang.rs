//! Localized message templates.
//!
//! Templates use `{name}` placeholders filled by [`fill`]. Every field has
//! an English default, so a configuration only lists what it overrides.

use serde::{Deserialize, Serialize};

use crate::game::RoleTitles;

/// Message templates shown to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lang {
    /// Role display titles
    pub roles: RoleTitles,

    /// Farewell when players never took their cards
    pub cards_not_taken: String,
    /// Notice when the order stages are skipped; no placeholders
    pub no_mafia: String,
    /// Prompt for the don: `{don}`
    pub set_order: String,
    /// Button showing the mafia team
    pub team_button: String,
    /// Button closing the order
    pub end_order_button: String,
    /// Envelope prompt: `{don}`, `{mafia}`
    pub get_order: String,
    /// Button fetching the order
    pub get_order_button: String,
    /// Morning message: `{greeting}`, `{day}`, `{order}`
    pub morning: String,
    /// Greeting of the very first morning
    pub first_morning: String,
    /// Greeting after a night without deaths
    pub peaceful_night: String,
    /// Greeting after a night kill: `{number}`, `{name}`
    pub night_victim: String,
    /// Voting prompt: `{vote}`
    pub vote: String,
    /// Label of the abstain choice
    pub abstain: String,
    /// Notice when nobody is left to vote
    pub no_voters: String,
    /// Vote result with a prisoner: `{number}`, `{name}`
    pub jailed: String,
    /// Vote result without a prisoner
    pub no_criminal: String,
    /// Night notice: `{mafia}`
    pub night: String,
    /// Shooting prompt: `{mafia}`, `{order}`
    pub shooting: String,
    /// Don check prompt: `{mafia}`, `{don}`, `{order}`
    pub don_check: String,
    /// Sheriff check prompt: `{don}`, `{sheriff}`, `{order}`
    pub sheriff_check: String,
    /// Night kill announcement: `{number}`, `{name}`
    pub killed: String,
}

impl Default for Lang {
    fn default() -> Self {
        Self {
            roles: RoleTitles::default(),
            cards_not_taken: "Game over! The players did not take their cards.".into(),
            no_mafia: "There is no mafia team in this game. Skipping the order.".into(),
            set_order: "{don}, set the shooting order of your team.\n\
                        Press the player numbers one after another, then press \"Finish\"."
                .into(),
            team_button: "Meet the team".into(),
            end_order_button: "Finish".into(),
            get_order: "{don} has written the order. {mafia}, collect your envelopes!".into(),
            get_order_button: "\u{2709} Get the order".into(),
            morning: "{greeting}Day {day}.\nStill in the game:\n{order}".into(),
            first_morning: "Good morning, city!\n".into(),
            peaceful_night: "Good morning, city!\nNobody died tonight.\n".into(),
            night_victim: "Good morning, city!\nTonight player {number} ({name}) was killed.\n"
                .into(),
            vote: "Time to vote! Who goes to jail?\n{vote}".into(),
            abstain: "Abstain".into(),
            no_voters: "There are no living players to vote.".into(),
            jailed: "By popular vote player {number} ({name}) goes to jail.".into(),
            no_criminal: "The city did not choose a criminal.".into(),
            night: "Night falls. The city sleeps. {mafia}, get ready to shoot...".into(),
            shooting: "{mafia} chooses a victim.\n{order}".into(),
            don_check: "{mafia} falls asleep. {don} makes a check.\n{order}".into(),
            sheriff_check: "{don} falls asleep. The {sheriff} wakes up and makes a check.\n{order}"
                .into(),
            killed: "Good morning, city!\nSad news: player {number} ({name}) was killed tonight."
                .into(),
        }
    }
}

/// Replaces every `{key}` in `template` with its value.
///
/// Unknown placeholders are left as they are.
#[must_use]
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_replaces_all_occurrences() {
        let text = fill("{a} and {a} but {b}", &[("a", "x"), ("b", "y")]);
        assert_eq!(text, "x and x but y");
    }

    #[test]
    fn fill_leaves_unknown_placeholders() {
        assert_eq!(fill("hi {who}", &[]), "hi {who}");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let lang: Lang = serde_yaml::from_str("abstain: Pass\nroles:\n  mafia: mob\n").unwrap();
        assert_eq!(lang.abstain, "Pass");
        assert_eq!(lang.roles.mafia, "mob");
        assert_eq!(lang.no_criminal, Lang::default().no_criminal);
    }
}
