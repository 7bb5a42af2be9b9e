//! Stage durations.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DiscussionTiming;
use crate::game::Game;

/// Function deriving a stage duration from the game entering it.
pub type DurationFn = dyn Fn(&Game) -> Duration + Send + Sync;

/// How long a stage lasts before the timer advances it.
#[derive(Clone)]
pub enum StageDuration {
    /// Constant duration
    Fixed(Duration),
    /// Duration computed from the game record; must be pure and total
    Computed(Arc<DurationFn>),
}

impl StageDuration {
    /// Wraps a computation.
    pub fn computed(f: impl Fn(&Game) -> Duration + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    /// Discussion duration, scaled by the number of living players.
    #[must_use]
    pub fn discussion(timing: DiscussionTiming) -> Self {
        Self::computed(move |game| timing.for_alive(game.alive_count()))
    }

    /// Resolves the duration for `game`.
    #[must_use]
    pub fn resolve(&self, game: &Game) -> Duration {
        match self {
            Self::Fixed(duration) => *duration,
            Self::Computed(f) => f(game),
        }
    }
}

impl fmt::Debug for StageDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(d) => f.debug_tuple("Fixed").field(d).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Duration> for StageDuration {
    fn from(duration: Duration) -> Self {
        Self::Fixed(duration)
    }
}

/// Resolves an optional duration; a stage without one is due immediately.
#[must_use]
pub fn resolve_opt(duration: Option<&StageDuration>, game: &Game) -> Duration {
    duration.map_or(Duration::ZERO, |d| d.resolve(game))
}
