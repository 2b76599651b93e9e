//! Tokio runtime for mini-game sessions.
//!
//! Each session runs as an isolated Tokio task (actor model) owning its
//! `SessionEngine`. Inputs, snapshot requests and termination arrive on a
//! bounded command channel; timers are driven from the tokio clock. Both
//! are handled one at a time, so the engine never sees concurrent events.
//!
//! # Key types
//!
//! - [`spawn_session`]: start a session and its actor
//! - [`SessionHandle`]: send commands, read snapshots
//! - [`SessionManager`]: track several sessions of one game

mod error;
mod manager;
mod session;

pub use error::RuntimeError;
pub use manager::SessionManager;
pub use session::{ResultReceiver, SessionHandle, SessionId, spawn_session};
