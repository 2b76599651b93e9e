//! Session manager: starts, tracks and routes input to session actors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use minigame_engine::{GameAdapter, RandomSource, RawSessionConfig, Snapshot};

use crate::session::spawn_session;
use crate::{ResultReceiver, RuntimeError, SessionHandle, SessionId};

/// Counter for generating unique session IDs.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for session actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks the sessions of one game running side by side, e.g. one per
/// kiosk station.
pub struct SessionManager<G: GameAdapter> {
    sessions: HashMap<SessionId, SessionHandle<G>>,
    channel_size: usize,
}

impl<G: GameAdapter> Default for SessionManager<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GameAdapter> SessionManager<G> {
    pub fn new() -> Self {
        Self::with_channel_size(DEFAULT_CHANNEL_SIZE)
    }

    /// A manager whose actors buffer `channel_size` commands before
    /// senders wait.
    pub fn with_channel_size(channel_size: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            channel_size: channel_size.max(1),
        }
    }

    /// Starts a new session. The receiver resolves with its result.
    pub fn start(
        &mut self,
        config: RawSessionConfig,
        rng: impl RandomSource + Send + 'static,
    ) -> Result<(SessionId, ResultReceiver), RuntimeError> {
        let id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        let (handle, result) = spawn_session::<G>(id, config, rng, self.channel_size)?;
        self.sessions.insert(id, handle);
        tracing::info!(session = %id, game = G::NAME, "session created");
        Ok((id, result))
    }

    pub fn handle(&self, id: SessionId) -> Option<&SessionHandle<G>> {
        self.sessions.get(&id)
    }

    /// Routes a player input to a session.
    pub async fn route_input(&self, id: SessionId, input: G::Input) -> Result<(), RuntimeError> {
        self.get(id)?.send_input(input).await
    }

    /// Fresh snapshot of a session.
    pub async fn snapshot(&self, id: SessionId) -> Result<Snapshot<G::Content>, RuntimeError> {
        self.get(id)?.snapshot().await
    }

    /// Terminates a session and stops tracking it.
    ///
    /// A session that already ended on its own is simply forgotten.
    pub async fn terminate(&mut self, id: SessionId) -> Result<(), RuntimeError> {
        let handle = self.sessions.remove(&id).ok_or(RuntimeError::NotFound(id))?;
        let _ = handle.terminate().await;
        tracing::info!(session = %id, "session removed");
        Ok(())
    }

    /// Forgets every session whose actor has stopped. Returns their IDs.
    pub fn reap(&mut self) -> Vec<SessionId> {
        let mut done: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|(_, h)| h.is_closed() || h.latest().lifecycle.is_terminal())
            .map(|(id, _)| *id)
            .collect();
        done.sort();
        for id in &done {
            self.sessions.remove(id);
        }
        if !done.is_empty() {
            tracing::debug!(count = done.len(), "reaped finished sessions");
        }
        done
    }

    /// Terminates every tracked session.
    pub async fn shutdown(&mut self) {
        for (id, handle) in self.sessions.drain() {
            let _ = handle.terminate().await;
            tracing::debug!(session = %id, "session shut down");
        }
    }

    /// IDs of tracked sessions, in creation order.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn get(&self, id: SessionId) -> Result<&SessionHandle<G>, RuntimeError> {
        self.sessions.get(&id).ok_or(RuntimeError::NotFound(id))
    }
}
