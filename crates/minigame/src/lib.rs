//! # minigame
//!
//! Short, timed mini-games that produce one score per session.
//!
//! Every game implements [`GameAdapter`](prelude::GameAdapter); the
//! [`SessionEngine`](prelude::SessionEngine) owns the lifecycle, phases,
//! timers and the score, and reports the result exactly once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minigame::prelude::*;
//! use rand::SeedableRng;
//!
//! # fn main() -> Result<(), MinigameError> {
//! let mut engine = SessionEngine::<MathQuiz>::new(rand::rngs::StdRng::seed_from_u64(1));
//! engine.start(RawSessionConfig::rounds(3), |result| {
//!     println!("final score: {}", result.final_score);
//! })?;
//! let answer = engine.round().map(|r| r.content.problem.answer).unwrap_or_default();
//! engine.record_input(Answer(answer));
//! engine.advance(std::time::Duration::from_millis(800));
//! # Ok(())
//! # }
//! ```
//!
//! Under tokio, [`spawn_session`](prelude::spawn_session) runs the same
//! engine as an actor on real time.

mod error;

pub use error::MinigameError;

pub use minigame_content as content;
pub use minigame_engine as engine;
pub use minigame_games as games;
pub use minigame_runtime as runtime;
pub use minigame_timer as timer;

/// Installs a `tracing` subscriber that honours `RUST_LOG` and falls back
/// to `info`. Calling it again is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

pub mod prelude {
    pub use crate::MinigameError;
    pub use minigame_content::{RandomSource, SequenceSource};
    pub use minigame_engine::{
        CommitStyle, Completion, GameAdapter, Lifecycle, Phase, RawSessionConfig, RoundOutcome,
        RoundTiming, ScorePolicy, SessionEngine, SessionResult, Snapshot,
    };
    pub use minigame_games::{
        Answer, Catch, Collector, ComboMatch, GameKind, MathQuiz, Pad, PatternRecall, Pick,
        SlidingPuzzle, SortOrder, Swap, Tap,
    };
    pub use minigame_runtime::{SessionHandle, SessionId, SessionManager, spawn_session};
}
