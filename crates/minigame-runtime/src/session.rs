//! Session actor: a Tokio task that owns one `SessionEngine`.
//!
//! The actor is the only thing that touches the engine. Hosts talk to it
//! through a [`SessionHandle`]; the engine's virtual timer queue is pinned
//! to the tokio clock at spawn time and advanced from real time.

use std::fmt;

use minigame_engine::{
    GameAdapter, RandomSource, RawSessionConfig, SessionEngine, SessionResult, Snapshot,
};
use minigame_timer::sleep_until_deadline;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::RuntimeError;

/// Identifies a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Resolves with the session's result, exactly once.
pub type ResultReceiver = oneshot::Receiver<SessionResult>;

/// Commands sent to a session actor through its channel.
pub(crate) enum SessionCommand<G: GameAdapter> {
    /// A player input (fire-and-forget).
    Input(G::Input),

    /// Request a fresh snapshot.
    Snapshot {
        reply: oneshot::Sender<Snapshot<G::Content>>,
    },

    /// End the session now.
    Terminate,
}

/// Handle to a running session actor.
///
/// Cheap to clone. When the last handle is dropped the actor terminates
/// the session, which still reports its result.
pub struct SessionHandle<G: GameAdapter> {
    id: SessionId,
    sender: mpsc::Sender<SessionCommand<G>>,
    snapshots: watch::Receiver<Snapshot<G::Content>>,
}

impl<G: GameAdapter> Clone for SessionHandle<G> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            sender: self.sender.clone(),
            snapshots: self.snapshots.clone(),
        }
    }
}

impl<G: GameAdapter> fmt::Debug for SessionHandle<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl<G: GameAdapter> SessionHandle<G> {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Sends a player input to the session.
    pub async fn send_input(&self, input: G::Input) -> Result<(), RuntimeError> {
        self.sender
            .send(SessionCommand::Input(input))
            .await
            .map_err(|_| RuntimeError::Unavailable(self.id))
    }

    /// Asks the actor for a snapshot taken after every due timer has run.
    pub async fn snapshot(&self) -> Result<Snapshot<G::Content>, RuntimeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::Unavailable(self.id))?;
        reply_rx
            .await
            .map_err(|_| RuntimeError::Unavailable(self.id))
    }

    /// The most recently published snapshot. Stays readable after the
    /// session ended.
    pub fn latest(&self) -> Snapshot<G::Content> {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<G::Content>> {
        self.snapshots.clone()
    }

    /// Tells the session to terminate.
    pub async fn terminate(&self) -> Result<(), RuntimeError> {
        self.sender
            .send(SessionCommand::Terminate)
            .await
            .map_err(|_| RuntimeError::Unavailable(self.id))
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct SessionActor<G: GameAdapter> {
    id: SessionId,
    engine: SessionEngine<G>,
    /// Tokio instant matching the engine queue's time zero.
    origin: Instant,
    receiver: mpsc::Receiver<SessionCommand<G>>,
}

impl<G: GameAdapter> SessionActor<G> {
    /// Runs until the session is Terminal.
    async fn run(mut self) {
        info!(session = %self.id, game = G::NAME, "session actor started");

        while !self.engine.is_terminal() {
            let deadline = self.engine.next_deadline().map(|at| self.origin + at);
            tokio::select! {
                biased;
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => {
                        debug!(session = %self.id, "all handles dropped, terminating");
                        self.engine.terminate();
                    }
                },
                _ = sleep_until_deadline(deadline) => self.catch_up(),
            }
        }

        info!(
            session = %self.id,
            game = G::NAME,
            result = ?self.engine.result(),
            "session actor stopped"
        );
    }

    fn handle(&mut self, cmd: SessionCommand<G>) {
        // Timers due before the command arrived run first, and anything
        // the command schedules is relative to now.
        self.catch_up();
        match cmd {
            SessionCommand::Input(input) => self.engine.record_input(input),
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            SessionCommand::Terminate => {
                info!(session = %self.id, "terminate requested");
                self.engine.terminate();
            }
        }
    }

    fn catch_up(&mut self) {
        self.engine.advance_to(self.origin.elapsed());
    }
}

/// Starts a session and spawns its actor task.
///
/// The engine is started before the task is spawned, so configuration
/// errors surface here and no task is left behind. Must be called from
/// within a Tokio runtime.
pub fn spawn_session<G: GameAdapter>(
    id: SessionId,
    config: RawSessionConfig,
    rng: impl RandomSource + Send + 'static,
    channel_size: usize,
) -> Result<(SessionHandle<G>, ResultReceiver), RuntimeError> {
    let origin = Instant::now();
    let mut engine = SessionEngine::<G>::new(rng);

    let (snap_tx, snap_rx) = watch::channel(engine.snapshot());
    engine.set_render(move |snapshot: &Snapshot<G::Content>| {
        snap_tx.send_replace(snapshot.clone());
    });

    let (result_tx, result_rx) = oneshot::channel();
    engine.start(config, move |result| {
        let _ = result_tx.send(result);
    })?;

    let (tx, rx) = mpsc::channel(channel_size);
    let actor = SessionActor::<G> {
        id,
        engine,
        origin,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    Ok((
        SessionHandle {
            id,
            sender: tx,
            snapshots: snap_rx,
        },
        result_rx,
    ))
}
