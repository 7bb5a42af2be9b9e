//! The stage table.
//!
//! Built once with [`StageRegistry::builder`] and never changed afterwards;
//! the engine holds it behind an `Arc` and only reads from it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::TimingConfig;
use crate::game::Stage;

use super::duration::StageDuration;

/// Entry action of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageAction {
    /// Players take their cards; nothing to announce
    DealCards,
    /// Farewell after the cards were not taken
    CardsNotTaken,
    /// Don's order keyboard, or skip both order stages without a mafia team
    SetOrder,
    /// Envelope keyboard for the mafia
    GetOrder,
    /// Morning message
    Discussion,
    /// Vote keyboard
    Vote,
    /// Vote resolution
    LastWordsCriminal,
    /// Night notice
    Night,
    /// Shooting keyboard
    Shooting,
    /// Don check keyboard
    DonCheck,
    /// Sheriff check keyboard
    SheriffCheck,
    /// Shooting resolution
    LastWordsVictim,
}

impl StageAction {
    /// Stable stage name, used in logs, metrics and events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DealCards => "deal_cards",
            Self::CardsNotTaken => "cards_not_taken",
            Self::SetOrder => "set_order",
            Self::GetOrder => "get_order",
            Self::Discussion => "discussion",
            Self::Vote => "vote",
            Self::LastWordsCriminal => "last_words_criminal",
            Self::Night => "night",
            Self::Shooting => "shooting",
            Self::DonCheck => "don_check",
            Self::SheriffCheck => "sheriff_check",
            Self::LastWordsVictim => "last_words_victim",
        }
    }
}

/// One registered stage.
#[derive(Debug, Clone)]
pub struct StageDescriptor {
    /// Stage number
    pub number: Stage,
    /// Timer length; `None` means the stage is due as soon as it is entered
    pub duration: Option<StageDuration>,
    /// Entry action
    pub action: StageAction,
    /// Entering this stage deletes the game
    pub terminal: bool,
}

impl StageDescriptor {
    /// Stage name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.action.name()
    }
}

/// Immutable table from stage number to descriptor.
#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    stages: BTreeMap<Stage, StageDescriptor>,
    cycle: Option<(Stage, Stage)>,
}

impl StageRegistry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> StageRegistryBuilder {
        StageRegistryBuilder::default()
    }

    /// The game's stage table with durations from `timings`.
    #[must_use]
    pub fn standard(timings: &TimingConfig) -> Self {
        use super::{
            CARDS_NOT_TAKEN, DEAL_CARDS, DISCUSSION, DON_CHECK, GET_ORDER, LAST_WORDS_CRIMINAL,
            LAST_WORDS_VICTIM, NIGHT, SET_ORDER, SHERIFF_CHECK, SHOOTING, VOTE,
        };

        Self::builder()
            .add(DEAL_CARDS, StageAction::DealCards, timings.cards)
            .add_terminal(CARDS_NOT_TAKEN, StageAction::CardsNotTaken)
            .add(SET_ORDER, StageAction::SetOrder, timings.set_order)
            .add(GET_ORDER, StageAction::GetOrder, timings.get_order)
            .add(
                DISCUSSION,
                StageAction::Discussion,
                StageDuration::discussion(timings.discussion),
            )
            .add(VOTE, StageAction::Vote, timings.vote)
            .add(
                LAST_WORDS_CRIMINAL,
                StageAction::LastWordsCriminal,
                timings.last_words,
            )
            .add(NIGHT, StageAction::Night, timings.night)
            .add(SHOOTING, StageAction::Shooting, timings.shooting)
            .add(DON_CHECK, StageAction::DonCheck, timings.don_check)
            .add(SHERIFF_CHECK, StageAction::SheriffCheck, timings.sheriff_check)
            .add(
                LAST_WORDS_VICTIM,
                StageAction::LastWordsVictim,
                timings.last_words_victim,
            )
            .cycle(DISCUSSION, LAST_WORDS_VICTIM)
            .build()
    }

    /// Descriptor of `number`, if registered.
    #[must_use]
    pub fn lookup(&self, number: Stage) -> Option<&StageDescriptor> {
        self.stages.get(&number)
    }

    /// Whether no stage is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Descriptors in stage order.
    pub fn iter(&self) -> impl Iterator<Item = &StageDescriptor> {
        self.stages.values()
    }

    /// Repeating range of stages, inclusive.
    #[must_use]
    pub const fn cycle_bounds(&self) -> Option<(Stage, Stage)> {
        self.cycle
    }

    /// Stage reached by moving `increment` stages forward from `current`.
    ///
    /// Inside the cycle, stepping past its last stage wraps around to its
    /// first stage plus the overflow. Outside the cycle this is plain
    /// addition.
    #[must_use]
    pub fn target(&self, current: Stage, increment: i32) -> Stage {
        let next = current.saturating_add(increment);
        match self.cycle {
            Some((first, last)) if (first..=last).contains(&current) && next > last => {
                let len = last - first + 1;
                first + (next - last - 1) % len
            }
            _ => next,
        }
    }
}

/// Builder of a [`StageRegistry`].
///
/// Registering a number twice keeps the later descriptor.
#[derive(Debug, Default)]
pub struct StageRegistryBuilder {
    stages: BTreeMap<Stage, StageDescriptor>,
    cycle: Option<(Stage, Stage)>,
}

impl StageRegistryBuilder {
    /// Registers a timed stage.
    #[must_use]
    pub fn add(
        mut self,
        number: Stage,
        action: StageAction,
        duration: impl Into<StageDuration>,
    ) -> Self {
        self.stages.insert(
            number,
            StageDescriptor {
                number,
                duration: Some(duration.into()),
                action,
                terminal: false,
            },
        );
        self
    }

    /// Registers a stage without a timer.
    #[must_use]
    pub fn add_untimed(mut self, number: Stage, action: StageAction) -> Self {
        self.stages.insert(
            number,
            StageDescriptor {
                number,
                duration: None,
                action,
                terminal: false,
            },
        );
        self
    }

    /// Registers a stage whose entry deletes the game.
    #[must_use]
    pub fn add_terminal(mut self, number: Stage, action: StageAction) -> Self {
        self.stages.insert(
            number,
            StageDescriptor {
                number,
                duration: None,
                action,
                terminal: true,
            },
        );
        self
    }

    /// Declares `first..=last` as the repeating day/night cycle.
    #[must_use]
    pub const fn cycle(mut self, first: Stage, last: Stage) -> Self {
        if first <= last {
            self.cycle = Some((first, last));
        }
        self
    }

    /// Freezes the table.
    #[must_use]
    pub fn build(self) -> StageRegistry {
        StageRegistry {
            stages: self.stages,
            cycle: self.cycle,
        }
    }
}
