//! Session engine for timed mini-games.
//!
//! Every mini-game (memory pattern, math quiz, sorting, collector, ...)
//! runs on the same engine: accept a configuration, play rounds or a fixed
//! duration, report a final score exactly once.
//!
//! # Key types
//!
//! - [`GameAdapter`]: the trait each game implements
//! - [`SessionEngine`]: lifecycle, timers and the single completion
//! - [`RoundController`]: phases and round progression
//! - [`ScoreAccumulator`]: running score with clamping
//! - [`RawSessionConfig`] / [`SessionMode`]: configuration and its
//!   validated form

mod adapter;
mod config;
mod engine;
mod error;
mod round;
mod score;

pub use adapter::{GameAdapter, RoundOutcome, RoundTiming};
pub use config::{Lifecycle, RawSessionConfig, SessionConfig, SessionMode};
pub use engine::{COUNTDOWN_TICK, Completion, SessionEngine, SessionResult, Snapshot};
pub use error::EngineError;
pub use round::{Phase, PhaseTimer, RoundController, RoundRecord, RoundState, TimerKind, TimerTag};
pub use score::{CommitStyle, ScoreAccumulator, ScorePolicy};

pub use minigame_content::RandomSource;
pub use minigame_timer::{Epoch, Scheduler, TimerHandle, TimerQueue};
