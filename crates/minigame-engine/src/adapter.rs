//! The `GameAdapter` trait: the extension point for individual games.
//!
//! A game supplies content, input rules and scoring; the engine owns the
//! lifecycle, phases, timers and the score itself. Every method is an
//! associated function over explicit state, so an adapter is a plain
//! marker type with no fields of its own.

use std::fmt;
use std::time::Duration;

use minigame_content::{ContentError, RandomSource};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{ScorePolicy, SessionMode};

/// Phase durations for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTiming {
    /// How long content is shown before input opens. `None` skips the
    /// presenting phase.
    pub presenting: Option<Duration>,
    /// Input window. When it elapses the round resolves with whatever
    /// input was collected. `None` waits for the satisfaction condition.
    pub input_limit: Option<Duration>,
    /// Hold after resolution during which input is ignored.
    pub cooldown: Duration,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            presenting: None,
            input_limit: None,
            cooldown: Duration::from_millis(1_000),
        }
    }
}

/// Result of resolving a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoundOutcome {
    pub correct: bool,
    pub delta: i64,
}

impl RoundOutcome {
    pub fn correct(delta: i64) -> Self {
        Self {
            correct: true,
            delta,
        }
    }

    pub fn wrong(delta: i64) -> Self {
        Self {
            correct: false,
            delta,
        }
    }
}

/// The trait every mini-game implements.
///
/// Associated types:
/// - `Extras`: strongly-typed game tunables, decoded from the config's
///   `extra` map (use `#[serde(default, deny_unknown_fields)]`)
/// - `Content`: the per-round payload shown to the player
/// - `Input`: what the player can do
///
/// Round-bounded games implement [`generate_content`](Self::generate_content),
/// [`is_satisfied`](Self::is_satisfied) and [`resolve`](Self::resolve).
/// Duration-bounded games usually implement [`spawn`](Self::spawn),
/// [`apply_input`](Self::apply_input) and [`on_tick`](Self::on_tick)
/// instead, and leave `is_satisfied` false so the round lasts until the
/// countdown ends.
pub trait GameAdapter: Send + 'static {
    type Extras: Clone + Default + DeserializeOwned + Send + fmt::Debug;
    type Content: Clone + Serialize + Send + Sync + fmt::Debug;
    type Input: Clone + Send + fmt::Debug;

    /// Short identifier used in logs and errors.
    const NAME: &'static str;

    /// Rejects extras or a session mode the game cannot finish under.
    /// Called once by `start`, before any content is generated; an error
    /// leaves the engine Idle. Default: accept everything.
    fn check_config(_extras: &Self::Extras, _mode: SessionMode) -> Result<(), String> {
        Ok(())
    }

    /// Builds the content for round `round`.
    fn generate_content(
        extras: &Self::Extras,
        round: u32,
        rng: &mut dyn RandomSource,
    ) -> Result<Self::Content, ContentError>;

    /// Phase durations for the next round. Called once per round, so a game
    /// can randomize them.
    fn round_timing(_extras: &Self::Extras, _rng: &mut dyn RandomSource) -> RoundTiming {
        RoundTiming::default()
    }

    /// Clamping and commit style for the session.
    fn scoring(_extras: &Self::Extras) -> ScorePolicy {
        ScorePolicy::default()
    }

    /// Rejects input that doesn't make sense against the current content.
    /// Rejected input is dropped silently. Default: accept all.
    fn validate_input(
        _extras: &Self::Extras,
        _content: &Self::Content,
        _collected: &[Self::Input],
        _input: &Self::Input,
    ) -> Result<(), String> {
        Ok(())
    }

    /// Applies accepted input to the content and returns a score delta for
    /// it (0 for none). `collected` does not yet contain `input`.
    fn apply_input(
        _extras: &Self::Extras,
        _content: &mut Self::Content,
        _collected: &[Self::Input],
        _input: &Self::Input,
    ) -> i64 {
        0
    }

    /// Whether the round has all the input it needs. Checked after every
    /// accepted input; `true` resolves the round. Default: never.
    fn is_satisfied(
        _extras: &Self::Extras,
        _content: &Self::Content,
        _collected: &[Self::Input],
    ) -> bool {
        false
    }

    /// Scores the round once it is satisfied or its input window closes.
    fn resolve(
        _extras: &Self::Extras,
        _content: &Self::Content,
        _collected: &[Self::Input],
    ) -> RoundOutcome {
        RoundOutcome::default()
    }

    /// Called on every countdown tick of a duration-bounded session, after
    /// `time_left` was decremented.
    fn on_tick(_extras: &Self::Extras, _content: &mut Self::Content, _time_left: u32) {}

    /// Delay before the next spawn in a duration-bounded session.
    /// `None` disables spawning. Called again after every spawn.
    fn spawn_delay(_extras: &Self::Extras, _rng: &mut dyn RandomSource) -> Option<Duration> {
        None
    }

    /// Adds a new scoring opportunity to the content.
    fn spawn(
        _extras: &Self::Extras,
        _content: &mut Self::Content,
        _rng: &mut dyn RandomSource,
    ) -> Result<(), ContentError> {
        Ok(())
    }
}
