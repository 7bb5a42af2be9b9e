//! The persisted game record and the typed updates applied to it.
//!
//! Stores never patch a [`Game`] field by field on their own: every write
//! goes through [`Game::apply`] or [`Game::enter_stage`], so the in-memory
//! store and any real backend share one definition of what an update means.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::stage::{DISCUSSION, SHOOTING, VOTE};

use super::{ChatId, GameId, MessageId, PlayerId, PlayerIndex, Role, Stage};

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Chat-platform identifier
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Assigned role
    pub role: Role,
    /// Eliminated players stay in the roster with `alive == false`
    #[serde(default = "default_alive")]
    pub alive: bool,
}

const fn default_alive() -> bool {
    true
}

impl Player {
    /// Creates a living player.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            alive: true,
        }
    }
}

/// What a voter voted for.
///
/// Serialized as an integer so it can key a JSON object: `-1` is
/// [`Ballot::Abstain`], any other value is a player index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Ballot {
    /// "Don't vote"
    Abstain,
    /// Vote to jail the player at this index
    Against(PlayerIndex),
}

impl From<Ballot> for i64 {
    fn from(ballot: Ballot) -> Self {
        match ballot {
            Ballot::Abstain => -1,
            Ballot::Against(index) => Self::try_from(index).unwrap_or(Self::MAX),
        }
    }
}

impl TryFrom<i64> for Ballot {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == -1 {
            return Ok(Self::Abstain);
        }
        usize::try_from(value)
            .map(Self::Against)
            .map_err(|_| format!("invalid ballot key {value}"))
    }
}

/// One shot cast during the shooting stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    /// Armed player who fired
    pub shooter: PlayerIndex,
    /// Player aimed at
    pub target: PlayerIndex,
}

/// Tallies taken out of a finished stage and held until their resolving
/// stage consumes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sealed {
    /// Votes of the last voting stage
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vote: BTreeMap<Ballot, BTreeSet<PlayerIndex>>,
    /// Shots of the last shooting stage
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shots: Vec<Shot>,
}

/// The central mutable game record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Record identifier
    pub id: GameId,
    /// Chat the game is played in
    pub chat: ChatId,
    /// Control message of the current stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    /// Current stage number
    #[serde(default)]
    pub stage: Stage,
    /// When the current stage auto-advances; `None` waits for an explicit trigger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_stage_time: Option<DateTime<Utc>>,
    /// Completed day/night cycles
    #[serde(default)]
    pub day_count: u32,
    /// Players who already acted in the current stage
    #[serde(default)]
    pub played: BTreeSet<PlayerIndex>,
    /// Seated players; order and length never change
    pub players: Vec<Player>,
    /// Live vote of the current stage: ballot → voters
    #[serde(default)]
    pub vote: BTreeMap<Ballot, BTreeSet<PlayerIndex>>,
    /// Live shots of the current stage
    #[serde(default)]
    pub shots: Vec<Shot>,
    /// Tallies awaiting resolution
    #[serde(default)]
    pub sealed: Sealed,
    /// Shooting order chosen by the don
    #[serde(default)]
    pub order: Vec<PlayerIndex>,
    /// Player eliminated by the most recent resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victim: Option<PlayerId>,
}

/// A single typed write against a game record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameUpdate {
    /// Remember the control message of the stage
    SetMessageId(MessageId),
    /// Mark a player as eliminated
    Kill(PlayerIndex),
    /// Record the eliminated player
    SetVictim(PlayerId),
    /// Forget the previous victim
    ClearVictim,
    /// Drop the sealed vote after resolution
    ClearSealedVote,
    /// Drop the sealed shots after resolution
    ClearSealedShots,
    /// Record a ballot, replacing any earlier ballot of the same voter
    CastVote {
        /// Voting player
        voter: PlayerIndex,
        /// Chosen ballot
        ballot: Ballot,
    },
    /// Record a shot
    AddShot(Shot),
    /// Mark a player as having acted this stage
    MarkPlayed(PlayerIndex),
    /// Append a target to the don's shooting order
    AppendOrder(PlayerIndex),
}

/// The atomic part of a stage transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageUpdate {
    /// Stage the game must currently be at for the update to apply
    pub from: Stage,
    /// Stage to enter
    pub to: Stage,
    /// Deadline of the entered stage
    pub next_stage_time: DateTime<Utc>,
}

impl Game {
    /// Creates a game at stage 0 with no timer.
    #[must_use]
    pub fn new(id: GameId, chat: ChatId, players: Vec<Player>) -> Self {
        Self {
            id,
            chat,
            message_id: None,
            stage: 0,
            next_stage_time: None,
            day_count: 0,
            played: BTreeSet::new(),
            players,
            vote: BTreeMap::new(),
            shots: Vec::new(),
            sealed: Sealed::default(),
            order: Vec::new(),
            victim: None,
        }
    }

    /// Returns the player at `index`.
    #[must_use]
    pub fn player(&self, index: PlayerIndex) -> Option<&Player> {
        self.players.get(index)
    }

    /// Iterates living players with their indices.
    pub fn living(&self) -> impl Iterator<Item = (PlayerIndex, &Player)> {
        self.players.iter().enumerate().filter(|(_, p)| p.alive)
    }

    /// Number of living players.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.living().count()
    }

    /// Iterates living players whose role takes part in the shooting.
    pub fn living_armed(&self) -> impl Iterator<Item = (PlayerIndex, &Player)> {
        self.living().filter(|(_, p)| p.role.is_armed())
    }

    /// Whether any seated player holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.players.iter().any(|p| p.role == role)
    }

    /// Ballot currently cast by `voter`, if any.
    #[must_use]
    pub fn ballot_of(&self, voter: PlayerIndex) -> Option<Ballot> {
        self.vote
            .iter()
            .find_map(|(ballot, voters)| voters.contains(&voter).then_some(*ballot))
    }

    /// Whether the stage deadline has passed at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_stage_time.is_some_and(|deadline| deadline <= now)
    }

    /// Whether no night has been played yet.
    #[must_use]
    pub const fn is_first_day(&self) -> bool {
        self.day_count == 0
    }

    fn check_index(&self, index: PlayerIndex) -> Result<(), StoreError> {
        if index < self.players.len() {
            Ok(())
        } else {
            Err(StoreError::PlayerOutOfRange {
                game: self.id.clone(),
                index,
                len: self.players.len(),
            })
        }
    }

    /// Applies one update in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PlayerOutOfRange`] if the update references a
    /// player index outside the roster; the record is left untouched.
    pub fn apply(&mut self, update: &GameUpdate) -> Result<(), StoreError> {
        match *update {
            GameUpdate::SetMessageId(id) => self.message_id = Some(id),
            GameUpdate::Kill(index) => {
                self.check_index(index)?;
                self.players[index].alive = false;
            }
            GameUpdate::SetVictim(id) => self.victim = Some(id),
            GameUpdate::ClearVictim => self.victim = None,
            GameUpdate::ClearSealedVote => self.sealed.vote.clear(),
            GameUpdate::ClearSealedShots => self.sealed.shots.clear(),
            GameUpdate::CastVote { voter, ballot } => {
                self.check_index(voter)?;
                if let Ballot::Against(target) = ballot {
                    self.check_index(target)?;
                }
                for voters in self.vote.values_mut() {
                    voters.remove(&voter);
                }
                self.vote.retain(|_, voters| !voters.is_empty());
                self.vote.entry(ballot).or_default().insert(voter);
            }
            GameUpdate::AddShot(shot) => {
                self.check_index(shot.shooter)?;
                self.check_index(shot.target)?;
                self.shots.push(shot);
            }
            GameUpdate::MarkPlayed(index) => {
                self.check_index(index)?;
                self.played.insert(index);
            }
            GameUpdate::AppendOrder(index) => {
                self.check_index(index)?;
                self.order.push(index);
            }
        }
        Ok(())
    }

    /// Applies a batch of updates; either all apply or none do.
    ///
    /// # Errors
    ///
    /// Returns the first failing update's error.
    pub fn apply_all(&mut self, updates: &[GameUpdate]) -> Result<(), StoreError> {
        let mut staged = self.clone();
        for update in updates {
            staged.apply(update)?;
        }
        *self = staged;
        Ok(())
    }

    /// Enters a new stage.
    ///
    /// Clears `played` and counts a day when leaving stage 0. Leaving
    /// `vote` or `shooting` replaces the matching sealed tally with the live
    /// one, even when nobody acted; any other live tally is dropped.
    pub fn enter_stage(&mut self, update: &StageUpdate) {
        let leaving = self.stage;
        if leaving == DISCUSSION {
            self.day_count += 1;
        }
        self.stage = update.to;
        self.next_stage_time = Some(update.next_stage_time);
        self.played.clear();
        if leaving == VOTE {
            self.sealed.vote = std::mem::take(&mut self.vote);
        } else {
            self.vote.clear();
        }
        if leaving == SHOOTING {
            self.sealed.shots = std::mem::take(&mut self.shots);
        } else {
            self.shots.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(n: usize) -> Game {
        let players = (0..n)
            .map(|i| Player::new(i as i64 + 100, format!("p{i}"), Role::Civilian))
            .collect();
        Game::new(GameId::new("g"), -1, players)
    }

    fn update(from: Stage, to: Stage) -> StageUpdate {
        StageUpdate {
            from,
            to,
            next_stage_time: Utc::now(),
        }
    }

    #[test]
    fn ballot_integer_keys() {
        assert_eq!(i64::from(Ballot::Abstain), -1);
        assert_eq!(i64::from(Ballot::Against(3)), 3);
        assert_eq!(Ballot::try_from(-1), Ok(Ballot::Abstain));
        assert_eq!(Ballot::try_from(2), Ok(Ballot::Against(2)));
        assert!(Ballot::try_from(-5).is_err());
    }

    #[test]
    fn vote_map_serializes_with_integer_keys() {
        let mut g = game(3);
        g.apply(&GameUpdate::CastVote {
            voter: 0,
            ballot: Ballot::Against(2),
        })
        .unwrap();
        g.apply(&GameUpdate::CastVote {
            voter: 1,
            ballot: Ballot::Abstain,
        })
        .unwrap();

        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["vote"]["2"], serde_json::json!([0]));
        assert_eq!(json["vote"]["-1"], serde_json::json!([1]));

        let back: Game = serde_json::from_value(json).unwrap();
        assert_eq!(back.vote, g.vote);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let g: Game = serde_json::from_str(
            r#"{"id":"g1","chat":5,"players":[{"id":1,"name":"a","role":"mafia"}]}"#,
        )
        .unwrap();
        assert_eq!(g.stage, 0);
        assert_eq!(g.day_count, 0);
        assert!(g.players[0].alive);
        assert!(g.next_stage_time.is_none());
    }

    #[test]
    fn recast_vote_replaces_previous_ballot() {
        let mut g = game(3);
        g.apply(&GameUpdate::CastVote {
            voter: 0,
            ballot: Ballot::Against(1),
        })
        .unwrap();
        g.apply(&GameUpdate::CastVote {
            voter: 0,
            ballot: Ballot::Against(2),
        })
        .unwrap();

        assert_eq!(g.ballot_of(0), Some(Ballot::Against(2)));
        assert!(!g.vote.contains_key(&Ballot::Against(1)));
    }

    #[test]
    fn out_of_range_update_is_rejected() {
        let mut g = game(2);
        let err = g.apply(&GameUpdate::Kill(5)).unwrap_err();
        assert!(matches!(err, StoreError::PlayerOutOfRange { index: 5, .. }));
    }

    #[test]
    fn apply_all_is_all_or_nothing() {
        let mut g = game(2);
        let before = g.clone();
        let result = g.apply_all(&[GameUpdate::Kill(0), GameUpdate::Kill(9)]);
        assert!(result.is_err());
        assert_eq!(g, before);
    }

    #[test]
    fn enter_stage_counts_day_only_when_leaving_zero() {
        let mut g = game(2);
        g.enter_stage(&update(0, 1));
        assert_eq!(g.day_count, 1);
        g.enter_stage(&update(1, 2));
        assert_eq!(g.day_count, 1);
    }

    #[test]
    fn leaving_vote_seals_only_the_vote() {
        let mut g = game(3);
        g.stage = 1;
        g.apply(&GameUpdate::MarkPlayed(0)).unwrap();
        g.apply(&GameUpdate::CastVote {
            voter: 0,
            ballot: Ballot::Against(1),
        })
        .unwrap();
        g.apply(&GameUpdate::AddShot(Shot {
            shooter: 1,
            target: 2,
        }))
        .unwrap();

        g.enter_stage(&update(1, 2));

        assert!(g.played.is_empty());
        assert!(g.vote.is_empty());
        assert!(g.shots.is_empty());
        assert_eq!(g.sealed.vote.len(), 1);
        assert!(g.sealed.shots.is_empty());
        assert_eq!(g.stage, 2);
    }

    #[test]
    fn leaving_shooting_seals_the_shots() {
        let mut g = game(3);
        g.stage = 4;
        g.apply(&GameUpdate::AddShot(Shot {
            shooter: 1,
            target: 2,
        }))
        .unwrap();

        g.enter_stage(&update(4, 5));

        assert!(g.shots.is_empty());
        assert_eq!(g.sealed.shots, vec![Shot { shooter: 1, target: 2 }]);
    }

    #[test]
    fn empty_vote_replaces_previous_sealed_vote() {
        let mut g = game(3);
        g.sealed
            .vote
            .insert(Ballot::Against(2), BTreeSet::from([0]));
        g.stage = 1;

        g.enter_stage(&update(1, 2));

        assert!(g.sealed.vote.is_empty());
    }

    #[test]
    fn empty_shooting_replaces_previous_sealed_shots() {
        let mut g = game(3);
        g.sealed.shots.push(Shot {
            shooter: 0,
            target: 1,
        });
        g.stage = 4;

        g.enter_stage(&update(4, 5));

        assert!(g.sealed.shots.is_empty());
    }

    #[test]
    fn other_stages_leave_sealed_tallies_alone() {
        let mut g = game(3);
        g.sealed.shots.push(Shot {
            shooter: 0,
            target: 1,
        });
        g.stage = 5;
        g.enter_stage(&update(5, 6));
        assert_eq!(g.sealed.shots.len(), 1);
    }

    #[test]
    fn is_due_requires_deadline() {
        let mut g = game(1);
        let now = Utc::now();
        assert!(!g.is_due(now));
        g.next_stage_time = Some(now - chrono::Duration::seconds(1));
        assert!(g.is_due(now));
        g.next_stage_time = Some(now + chrono::Duration::seconds(10));
        assert!(!g.is_due(now));
    }
}
