//! Error types for the runtime layer.

use minigame_engine::EngineError;

use crate::SessionId;

/// Errors that can occur while spawning or talking to a session actor.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The engine refused to start (bad config or extras).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// No session with this ID is tracked by the manager.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The session actor has stopped, or its command channel is closed.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),
}
