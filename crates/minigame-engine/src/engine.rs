//! The session engine: one play-through from `start` to a single result.
//!
//! The engine is a synchronous state machine. It never sleeps; instead it
//! schedules tagged timers on its [`Scheduler`] and reacts when the host
//! reports them through [`SessionEngine::on_timer`] (or, with the built-in
//! [`TimerQueue`], through [`SessionEngine::advance`]). Input and timer
//! events are handled one at a time, each to completion.
//!
//! Three timer slots exist per session:
//!
//! - the round controller's phase timer (present / input limit / cooldown)
//! - the countdown, ticking every second in duration-bounded sessions
//! - the spawner, re-armed after every spawn in duration-bounded sessions
//!
//! All three are cancelled before the engine reports its result.

use std::marker::PhantomData;
use std::time::Duration;

use minigame_content::RandomSource;
use minigame_timer::{Epoch, Scheduler, TimerHandle, TimerQueue, TimerSlot};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::round::PhaseTimer;
use crate::{
    EngineError, GameAdapter, Lifecycle, Phase, RawSessionConfig, RoundController, RoundRecord,
    RoundState, ScoreAccumulator, SessionMode, TimerKind, TimerTag,
};

/// Countdown resolution for duration-bounded sessions.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Results and snapshots
// ---------------------------------------------------------------------------

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Last round resolved, or the countdown reached zero.
    Finished,
    /// The host called [`SessionEngine::terminate`].
    Terminated,
}

/// The terminal value of a session. Produced exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub final_score: i64,
    pub rounds_played: u32,
    pub reason: Completion,
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<C> {
    pub lifecycle: Lifecycle,
    pub round_index: u32,
    /// `None` before start and after the session ended.
    pub phase: Option<Phase>,
    /// Seconds remaining in duration-bounded sessions.
    pub time_left: Option<u32>,
    pub content: Option<C>,
    pub score: i64,
}

type CompletionFn = Box<dyn FnOnce(SessionResult) + Send>;
type RenderFn<C> = Box<dyn FnMut(&Snapshot<C>) + Send>;

/// Everything that only exists once a session is Active.
struct Running<G: GameAdapter> {
    extras: G::Extras,
    rounds: RoundController<G>,
    score: ScoreAccumulator,
}

// ---------------------------------------------------------------------------
// SessionEngine
// ---------------------------------------------------------------------------

/// A single mini-game session.
///
/// ```ignore
/// let mut engine = SessionEngine::<PatternRecall>::new(StdRng::seed_from_u64(7));
/// engine.start(RawSessionConfig::rounds(5), |result| println!("{}", result.final_score))?;
/// engine.advance(Duration::from_millis(2_400)); // presenting ends
/// engine.record_input(Pad(3));
/// ```
pub struct SessionEngine<G, S = TimerQueue<TimerTag>>
where
    G: GameAdapter,
    S: Scheduler<TimerTag>,
{
    lifecycle: Lifecycle,
    scheduler: S,
    rng: Box<dyn RandomSource + Send>,
    running: Option<Running<G>>,
    /// Epoch for the session-owned timers. Bumped on termination.
    session_epoch: Epoch,
    countdown: TimerSlot,
    spawner: TimerSlot,
    on_complete: Option<CompletionFn>,
    render: Option<RenderFn<G::Content>>,
    result: Option<SessionResult>,
    _game: PhantomData<fn() -> G>,
}

impl<G: GameAdapter> SessionEngine<G> {
    /// Creates an idle engine on the built-in virtual timer queue.
    pub fn new(rng: impl RandomSource + Send + 'static) -> Self {
        Self::with_scheduler(TimerQueue::new(), rng)
    }

    /// Runs every timer due within the next `by`, in deadline order.
    pub fn advance(&mut self, by: Duration) {
        let until = self.scheduler.now() + by;
        self.advance_to(until);
    }

    /// Runs every timer due up to `until` (relative to the queue origin).
    ///
    /// Timers scheduled by a handler that fall inside the window fire in
    /// the same call.
    pub fn advance_to(&mut self, until: Duration) {
        while let Some(fired) = self.scheduler.pop_due(until) {
            self.on_timer(fired.handle, fired.tag);
        }
        self.scheduler.settle(until);
    }

    /// Earliest pending deadline, relative to the queue origin.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }
}

impl<G, S> SessionEngine<G, S>
where
    G: GameAdapter,
    S: Scheduler<TimerTag>,
{
    /// Creates an idle engine on a host-provided scheduler.
    pub fn with_scheduler(scheduler: S, rng: impl RandomSource + Send + 'static) -> Self {
        Self {
            lifecycle: Lifecycle::Idle,
            scheduler,
            rng: Box::new(rng),
            running: None,
            session_epoch: Epoch::default(),
            countdown: TimerSlot::new(),
            spawner: TimerSlot::new(),
            on_complete: None,
            render: None,
            result: None,
            _game: PhantomData,
        }
    }

    /// Registers the render callback. It receives a snapshot synchronously
    /// after every state transition.
    pub fn set_render(&mut self, render: impl FnMut(&Snapshot<G::Content>) + Send + 'static) {
        self.render = Some(Box::new(render));
    }

    /// Validates `config`, builds the first round and goes Active.
    ///
    /// On error the engine stays Idle and `on_complete` is dropped unused.
    pub fn start(
        &mut self,
        config: RawSessionConfig,
        on_complete: impl FnOnce(SessionResult) + Send + 'static,
    ) -> Result<(), EngineError> {
        if self.lifecycle != Lifecycle::Idle {
            return Err(EngineError::AlreadyStarted(self.lifecycle));
        }
        let config = config.validate::<G::Extras>(G::NAME)?;
        let extras = config.extras;
        G::check_config(&extras, config.mode)
            .map_err(|reason| EngineError::InvalidConfig(format!("{}: {reason}", G::NAME)))?;

        let content = G::generate_content(&extras, 0, self.rng.as_mut())?;
        let timing = G::round_timing(&extras, self.rng.as_mut());
        let score = ScoreAccumulator::new(G::scoring(&extras));
        let mut rounds = RoundController::new(config.mode);

        self.lifecycle = Lifecycle::Active;
        self.on_complete = Some(Box::new(on_complete));
        info!(game = G::NAME, mode = ?config.mode, "session started");

        if let SessionMode::Duration(_) = config.mode {
            self.countdown.arm_every(
                &mut self.scheduler,
                COUNTDOWN_TICK,
                TimerTag::new(TimerKind::Countdown, self.session_epoch),
            );
            if let Some(delay) = G::spawn_delay(&extras, self.rng.as_mut()) {
                self.spawner.arm_after(
                    &mut self.scheduler,
                    delay,
                    TimerTag::new(TimerKind::Spawn, self.session_epoch),
                );
            }
        }

        rounds.begin_round(0, content, timing, &mut self.scheduler);
        self.running = Some(Running {
            extras,
            rounds,
            score,
        });
        self.publish();
        Ok(())
    }

    /// Feeds one player input into the current round.
    ///
    /// Silently ignored unless the session is Active and the round is
    /// awaiting input, or when the game rejects the input.
    pub fn record_input(&mut self, input: G::Input) {
        if !self.lifecycle.is_active() {
            debug!(game = G::NAME, lifecycle = %self.lifecycle, ?input, "input outside active session, dropped");
            return;
        }
        let Some(run) = self.running.as_mut() else {
            return;
        };
        if !run.rounds.accepts_input() {
            debug!(game = G::NAME, phase = ?run.rounds.phase(), ?input, "input while not accepting, dropped");
            return;
        }
        let Some(round) = run.rounds.round_mut() else {
            return;
        };

        if let Err(reason) = G::validate_input(&run.extras, &round.content, &round.collected, &input) {
            debug!(game = G::NAME, round = round.index, %reason, "input rejected");
            return;
        }
        let delta = G::apply_input(&run.extras, &mut round.content, &round.collected, &input);
        round.collected.push(input);
        if delta != 0 {
            run.score.record(delta);
        }
        let satisfied = G::is_satisfied(&run.extras, &round.content, &round.collected);
        trace!(game = G::NAME, round = round.index, delta, satisfied, "input accepted");

        if satisfied {
            self.resolve_round();
        }
        self.publish();
    }

    /// Ends the session from outside (host unmount, kiosk timeout).
    ///
    /// Cancels every timer and reports the result, once. Calling it again,
    /// or after natural completion, does nothing. An Idle engine has no
    /// session to end and ignores it.
    pub fn terminate(&mut self) {
        if self.lifecycle == Lifecycle::Idle {
            debug!(game = G::NAME, "terminate before start ignored");
            return;
        }
        self.finish(Completion::Terminated);
    }

    /// Entry point for fired timers.
    ///
    /// The tag's epoch is compared against the owner's current epoch; a
    /// mismatch means the timer outlived its phase and it is dropped.
    pub fn on_timer(&mut self, handle: TimerHandle, tag: TimerTag) {
        if !self.lifecycle.is_active() {
            trace!(game = G::NAME, %handle, "timer after session end ignored");
            return;
        }
        match tag.kind {
            TimerKind::Phase => self.on_phase_timer(handle, tag),
            TimerKind::Countdown => self.on_countdown(handle, tag),
            TimerKind::Spawn => self.on_spawn(handle, tag),
        }
    }

    /// Builds a snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot<G::Content> {
        let rounds = self.running.as_ref().map(|r| &r.rounds);
        Snapshot {
            lifecycle: self.lifecycle,
            round_index: rounds.map_or(0, |r| r.round_index()),
            phase: rounds.and_then(|r| r.phase()),
            time_left: rounds.and_then(|r| r.time_left()),
            content: rounds.and_then(|r| r.round()).map(|r| r.content.clone()),
            score: self.score(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_terminal(&self) -> bool {
        self.lifecycle.is_terminal()
    }

    /// Committed score.
    pub fn score(&self) -> i64 {
        self.running.as_ref().map_or(0, |r| r.score.snapshot())
    }

    /// The result, once the session has ended.
    pub fn result(&self) -> Option<SessionResult> {
        self.result
    }

    pub fn round(&self) -> Option<&RoundState<G::Content, G::Input>> {
        self.running.as_ref().and_then(|r| r.rounds.round())
    }

    /// Finished rounds in the order they resolved.
    pub fn history(&self) -> &[RoundRecord] {
        self.running
            .as_ref()
            .map(|r| r.rounds.history())
            .unwrap_or(&[])
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Whether any engine-owned timer is still armed.
    pub fn has_live_timers(&self) -> bool {
        self.countdown.is_armed()
            || self.spawner.is_armed()
            || self.running.as_ref().is_some_and(|r| r.rounds.has_live_timer())
    }

    // -- internals ----------------------------------------------------------

    fn on_phase_timer(&mut self, handle: TimerHandle, tag: TimerTag) {
        let Some(run) = self.running.as_mut() else {
            return;
        };
        match run.rounds.on_phase_timer(handle, tag, &mut self.scheduler) {
            PhaseTimer::Stale => {}
            PhaseTimer::InputOpened => self.publish(),
            PhaseTimer::InputTimedOut => {
                debug!(game = G::NAME, round = run.rounds.round_index(), "input window closed");
                self.resolve_round();
                self.publish();
            }
            PhaseTimer::CooldownElapsed => self.advance_round(),
        }
    }

    fn on_countdown(&mut self, handle: TimerHandle, tag: TimerTag) {
        if tag.epoch != self.session_epoch {
            trace!(game = G::NAME, %handle, "stale countdown tick");
            return;
        }
        let Some(run) = self.running.as_mut() else {
            return;
        };
        let Some(left) = run.rounds.tick() else {
            return;
        };
        if let Some(round) = run.rounds.round_mut() {
            G::on_tick(&run.extras, &mut round.content, left);
        }
        trace!(game = G::NAME, time_left = left, "countdown tick");

        if left == 0 {
            self.finish(Completion::Finished);
        } else {
            self.publish();
        }
    }

    fn on_spawn(&mut self, handle: TimerHandle, tag: TimerTag) {
        self.spawner.release(handle);
        if tag.epoch != self.session_epoch {
            trace!(game = G::NAME, %handle, "stale spawn timer");
            return;
        }
        let Some(run) = self.running.as_mut() else {
            return;
        };
        if let Some(round) = run.rounds.round_mut() {
            if let Err(e) = G::spawn(&run.extras, &mut round.content, self.rng.as_mut()) {
                error!(game = G::NAME, error = %e, "spawn failed, spawner stopped");
                self.publish();
                return;
            }
        }
        if let Some(delay) = G::spawn_delay(&run.extras, self.rng.as_mut()) {
            self.spawner.arm_after(
                &mut self.scheduler,
                delay,
                TimerTag::new(TimerKind::Spawn, self.session_epoch),
            );
        }
        self.publish();
    }

    /// Scores the current round through the adapter and hands it to the
    /// controller for cooldown.
    fn resolve_round(&mut self) {
        let Some(run) = self.running.as_mut() else {
            return;
        };
        let Some(round) = run.rounds.round() else {
            return;
        };
        let outcome = G::resolve(&run.extras, &round.content, &round.collected);
        run.score.record(outcome.delta);
        run.rounds.resolve(outcome, &mut self.scheduler);
    }

    /// Commits the resolved round and moves on, or finishes after the last.
    fn advance_round(&mut self) {
        let Some(run) = self.running.as_mut() else {
            return;
        };
        let total = run.score.commit();
        if run.rounds.is_last_round() {
            debug!(game = G::NAME, score = total, "last round complete");
            self.finish(Completion::Finished);
            return;
        }

        let next = run.rounds.round_index() + 1;
        let content = match G::generate_content(&run.extras, next, self.rng.as_mut()) {
            Ok(c) => c,
            Err(e) => {
                error!(game = G::NAME, round = next, error = %e, "content generation failed, ending session");
                self.finish(Completion::Finished);
                return;
            }
        };
        let timing = G::round_timing(&run.extras, self.rng.as_mut());
        run.rounds.begin_round(next, content, timing, &mut self.scheduler);
        self.publish();
    }

    /// The single path into Terminal.
    fn finish(&mut self, reason: Completion) {
        if self.lifecycle != Lifecycle::Active {
            trace!(game = G::NAME, ?reason, "already finished");
            return;
        }

        let (final_score, rounds_played) = match self.running.as_mut() {
            Some(run) => {
                // A resolved round's staged delta belongs to the session;
                // an unresolved round's does not.
                if run.rounds.phase() == Some(Phase::Resolved) {
                    run.score.commit();
                } else {
                    run.score.discard();
                }
                (run.score.snapshot(), run.rounds.history().len() as u32)
            }
            None => (0, 0),
        };
        self.cancel_timers();

        self.lifecycle = Lifecycle::Terminal;
        let result = SessionResult {
            final_score,
            rounds_played,
            reason,
        };
        self.result = Some(result);
        info!(game = G::NAME, score = final_score, rounds = rounds_played, ?reason, "session ended");

        self.publish();
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(result);
        }
    }

    fn cancel_timers(&mut self) {
        self.countdown.clear(&mut self.scheduler);
        self.spawner.clear(&mut self.scheduler);
        if let Some(run) = self.running.as_mut() {
            run.rounds.halt(&mut self.scheduler);
        }
        self.session_epoch.bump();
    }

    fn publish(&mut self) {
        if self.render.is_none() {
            return;
        }
        let snapshot = self.snapshot();
        if let Some(render) = self.render.as_mut() {
            render(&snapshot);
        }
    }
}

impl<G, S> Drop for SessionEngine<G, S>
where
    G: GameAdapter,
    S: Scheduler<TimerTag>,
{
    fn drop(&mut self) {
        if self.lifecycle.is_active() {
            debug!(game = G::NAME, "engine discarded while active, cancelling timers");
        }
        self.countdown.clear(&mut self.scheduler);
        self.spawner.clear(&mut self.scheduler);
        if let Some(run) = self.running.as_mut() {
            run.rounds.halt(&mut self.scheduler);
        }
    }
}
