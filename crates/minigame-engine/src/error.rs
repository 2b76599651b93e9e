//! Error types for the engine layer.

use minigame_content::ContentError;

use crate::Lifecycle;

/// Errors surfaced by [`SessionEngine::start`](crate::SessionEngine::start).
///
/// Everything that can go wrong during play (late input, stale timers,
/// double completion) is absorbed by the engine and never reaches the host.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Both or neither of `round_count`/`duration_seconds` were given,
    /// or the one given was zero.
    #[error("invalid session config: {0}")]
    InvalidConfig(String),

    /// The `extra` map did not match the game's extras type.
    #[error("invalid extras for {game}: {source}")]
    Extras {
        game: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The game's extras asked a generator for impossible content.
    #[error("content generation failed: {0}")]
    Content(#[from] ContentError),

    /// `start` was called on an engine that is not Idle.
    #[error("session already started (state {0})")]
    AlreadyStarted(Lifecycle),
}
