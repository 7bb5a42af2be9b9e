//! Configuration schema.
//!
//! Every field has a default, so an empty document is a valid
//! configuration. Durations are written in humantime form (`"90s"`,
//! `"1m 30s"`, `"500ms"`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lang::Lang;

use super::loader::env_or;

/// Root of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Stage durations
    pub timings: TimingConfig,
    /// Timer sweep settings
    pub sweep: SweepConfig,
    /// Message templates
    pub lang: Lang,
}

/// Duration of every timed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Time to take the role cards
    #[serde(with = "humantime_serde")]
    pub cards: Duration,
    /// Time for the don to set the shooting order
    #[serde(with = "humantime_serde")]
    pub set_order: Duration,
    /// Time for the mafia to read the order
    #[serde(with = "humantime_serde")]
    pub get_order: Duration,
    /// Day discussion, scaled by the number of living players
    pub discussion: DiscussionTiming,
    /// Voting
    #[serde(with = "humantime_serde")]
    pub vote: Duration,
    /// Last words of the jailed player
    #[serde(with = "humantime_serde")]
    pub last_words: Duration,
    /// Pause before shooting
    #[serde(with = "humantime_serde")]
    pub night: Duration,
    /// Shooting
    #[serde(with = "humantime_serde")]
    pub shooting: Duration,
    /// Don's check
    #[serde(with = "humantime_serde")]
    pub don_check: Duration,
    /// Sheriff's check
    #[serde(with = "humantime_serde")]
    pub sheriff_check: Duration,
    /// Last words of the night victim
    #[serde(with = "humantime_serde")]
    pub last_words_victim: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cards: Duration::from_secs(90),
            set_order: Duration::from_secs(60),
            get_order: Duration::from_secs(5),
            discussion: DiscussionTiming::default(),
            vote: Duration::from_secs(30),
            last_words: Duration::from_secs(20),
            night: Duration::from_secs(5),
            shooting: Duration::from_secs(5),
            don_check: Duration::from_secs(10),
            sheriff_check: Duration::from_secs(10),
            last_words_victim: Duration::from_secs(20),
        }
    }
}

/// `base + max(0, alive - free_players) * per_player`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscussionTiming {
    /// Duration with at most `free_players` alive
    #[serde(with = "humantime_serde")]
    pub base: Duration,
    /// Extra time per living player above `free_players`
    #[serde(with = "humantime_serde")]
    pub per_player: Duration,
    /// Living players covered by `base`
    pub free_players: u32,
}

impl Default for DiscussionTiming {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(90),
            per_player: Duration::from_secs(35),
            free_players: 4,
        }
    }
}

impl DiscussionTiming {
    /// Discussion length for `alive` living players.
    #[must_use]
    pub fn for_alive(&self, alive: usize) -> Duration {
        let free = usize::try_from(self.free_players).unwrap_or(usize::MAX);
        let extra = u32::try_from(alive.saturating_sub(free)).unwrap_or(u32::MAX);
        self.base.saturating_add(self.per_player.saturating_mul(extra))
    }
}

/// Timer sweep settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Time between two sweeps over due games
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(env_or("NIGHTWATCH_SWEEP_INTERVAL_MS", 1000)),
        }
    }
}

/// Serde adapter between `Duration` and humantime strings.
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
