//! Unified error type for the minigame crates.

use minigame_content::ContentError;
use minigame_engine::EngineError;
use minigame_games::UnknownGame;
use minigame_runtime::RuntimeError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MinigameError {
    /// Content parameters a generator cannot satisfy.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// A session refused to start (config, extras, first round content).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A session actor could not be reached.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// A game name that matches no built-in game.
    #[error(transparent)]
    UnknownGame(#[from] UnknownGame),
}
