//! Round progression and phase timing.
//!
//! A round moves through
//!
//! ```text
//! Presenting → AwaitingInput → Resolved → (next round | session end)
//! ```
//!
//! `Presenting` is skipped when the game has no memorize phase. Every
//! transition bumps the controller's [`Epoch`] and re-arms the single phase
//! timer slot, so a timer scheduled for an earlier phase can never act on
//! a later one.

use std::time::Duration;

use minigame_timer::{Epoch, Scheduler, TimerHandle, TimerSlot};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{GameAdapter, RoundOutcome, RoundTiming, SessionMode};

// ---------------------------------------------------------------------------
// Phases and timer tags
// ---------------------------------------------------------------------------

/// A round's current sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Presenting,
    AwaitingInput,
    Resolved,
}

impl Phase {
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::AwaitingInput)
    }
}

/// Which owner a timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// The round controller's phase timer (present, input limit, cooldown).
    Phase,
    /// The session's one-second countdown.
    Countdown,
    /// The session's spawn timer.
    Spawn,
}

/// Tag carried by every engine timer: its owner and the epoch it was
/// scheduled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTag {
    pub kind: TimerKind,
    pub epoch: Epoch,
}

impl TimerTag {
    pub fn new(kind: TimerKind, epoch: Epoch) -> Self {
        Self { kind, epoch }
    }
}

// ---------------------------------------------------------------------------
// Round state
// ---------------------------------------------------------------------------

/// The live state of one round. Replaced wholesale when the round advances.
#[derive(Debug, Clone)]
pub struct RoundState<C, I> {
    pub index: u32,
    pub phase: Phase,
    pub content: C,
    /// Accepted input, in arrival order. Append-only within the round.
    pub collected: Vec<I>,
}

/// What happened in a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundRecord {
    pub index: u32,
    pub correct: bool,
    pub delta: i64,
}

/// What a phase timer meant, as seen by the controller at fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTimer {
    /// Scheduled for an epoch that is no longer current. Ignore it.
    Stale,
    /// Presenting ended; input is now open.
    InputOpened,
    /// The input window closed before the round was satisfied.
    InputTimedOut,
    /// Cooldown after resolution elapsed.
    CooldownElapsed,
}

// ---------------------------------------------------------------------------
// RoundController
// ---------------------------------------------------------------------------

/// Drives rounds for one session.
///
/// Owns the current [`RoundState`], the phase timer slot and the countdown
/// value. The engine feeds it adapter-produced content and outcomes; it
/// never calls the adapter itself.
pub struct RoundController<G: GameAdapter> {
    mode: SessionMode,
    epoch: Epoch,
    round: Option<RoundState<G::Content, G::Input>>,
    last_index: u32,
    timing: RoundTiming,
    time_left: Option<u32>,
    phase_timer: TimerSlot,
    history: Vec<RoundRecord>,
}

impl<G: GameAdapter> RoundController<G> {
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            epoch: Epoch::default(),
            round: None,
            last_index: 0,
            timing: RoundTiming::default(),
            time_left: mode.duration_seconds(),
            phase_timer: TimerSlot::new(),
            history: Vec::new(),
        }
    }

    /// Installs round `index` and enters its first phase.
    pub fn begin_round<S>(
        &mut self,
        index: u32,
        content: G::Content,
        timing: RoundTiming,
        scheduler: &mut S,
    ) where
        S: Scheduler<TimerTag> + ?Sized,
    {
        self.timing = timing;
        self.last_index = index;
        self.round = Some(RoundState {
            index,
            phase: Phase::Presenting,
            content,
            collected: Vec::new(),
        });

        match timing.presenting {
            Some(delay) => {
                let epoch = self.epoch.bump();
                self.phase_timer
                    .arm_after(scheduler, delay, TimerTag::new(TimerKind::Phase, epoch));
                debug!(game = G::NAME, round = index, %epoch, "round presenting");
            }
            None => self.open_input(scheduler),
        }
    }

    /// Moves to `AwaitingInput`, arming the input limit if there is one.
    fn open_input<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<TimerTag> + ?Sized,
    {
        let epoch = self.epoch.bump();
        if let Some(round) = self.round.as_mut() {
            round.phase = Phase::AwaitingInput;
        }
        match self.timing.input_limit {
            Some(limit) => {
                self.phase_timer
                    .arm_after(scheduler, limit, TimerTag::new(TimerKind::Phase, epoch));
            }
            None => {
                self.phase_timer.clear(scheduler);
            }
        }
        debug!(game = G::NAME, round = self.last_index, %epoch, "awaiting input");
    }

    /// Marks the round resolved, records it and starts the cooldown.
    pub fn resolve<S>(&mut self, outcome: RoundOutcome, scheduler: &mut S)
    where
        S: Scheduler<TimerTag> + ?Sized,
    {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.phase == Phase::Resolved {
            return;
        }
        round.phase = Phase::Resolved;
        let index = round.index;
        let epoch = self.epoch.bump();

        self.history.push(RoundRecord {
            index,
            correct: outcome.correct,
            delta: outcome.delta,
        });
        self.phase_timer.arm_after(
            scheduler,
            self.timing.cooldown,
            TimerTag::new(TimerKind::Phase, epoch),
        );
        debug!(
            game = G::NAME,
            round = index,
            correct = outcome.correct,
            delta = outcome.delta,
            %epoch,
            "round resolved"
        );
    }

    /// Interprets a fired phase timer against the current epoch.
    ///
    /// Transitions that need no adapter input (Presenting → AwaitingInput)
    /// happen here; the rest are reported back to the engine.
    pub fn on_phase_timer<S>(&mut self, handle: TimerHandle, tag: TimerTag, scheduler: &mut S) -> PhaseTimer
    where
        S: Scheduler<TimerTag> + ?Sized,
    {
        self.phase_timer.release(handle);
        if tag.epoch != self.epoch {
            trace!(game = G::NAME, %handle, fired = %tag.epoch, current = %self.epoch, "stale phase timer");
            return PhaseTimer::Stale;
        }
        match self.phase() {
            Some(Phase::Presenting) => {
                self.open_input(scheduler);
                PhaseTimer::InputOpened
            }
            Some(Phase::AwaitingInput) => PhaseTimer::InputTimedOut,
            Some(Phase::Resolved) => PhaseTimer::CooldownElapsed,
            None => PhaseTimer::Stale,
        }
    }

    /// Decrements the countdown. Returns the new `time_left`, or `None` for
    /// round-bounded sessions.
    pub fn tick(&mut self) -> Option<u32> {
        let left = self.time_left.as_mut()?;
        *left = left.saturating_sub(1);
        Some(*left)
    }

    /// Cancels the phase timer, invalidates the epoch and drops the round.
    pub fn halt<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<TimerTag> + ?Sized,
    {
        self.phase_timer.clear(scheduler);
        self.epoch.bump();
        self.round = None;
    }

    /// Whether the current round is the final one of a round-bounded session.
    /// Duration-bounded sessions have no last round.
    pub fn is_last_round(&self) -> bool {
        match self.mode {
            SessionMode::Rounds(n) => self.last_index + 1 >= n.get(),
            SessionMode::Duration(_) => false,
        }
    }

    pub fn accepts_input(&self) -> bool {
        self.phase().is_some_and(|p| p.accepts_input())
    }

    pub fn phase(&self) -> Option<Phase> {
        self.round.as_ref().map(|r| r.phase)
    }

    pub fn round(&self) -> Option<&RoundState<G::Content, G::Input>> {
        self.round.as_ref()
    }

    pub fn round_mut(&mut self) -> Option<&mut RoundState<G::Content, G::Input>> {
        self.round.as_mut()
    }

    /// Index of the current (or, after halt, the last) round.
    pub fn round_index(&self) -> u32 {
        self.last_index
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn has_live_timer(&self) -> bool {
        self.phase_timer.is_armed()
    }

    /// Cooldown of the current round.
    pub fn cooldown(&self) -> Duration {
        self.timing.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    use minigame_content::{ContentError, RandomSource};
    use minigame_timer::TimerQueue;

    struct Dummy;

    impl GameAdapter for Dummy {
        type Extras = ();
        type Content = u32;
        type Input = ();
        const NAME: &'static str = "dummy";

        fn generate_content(_: &(), round: u32, _: &mut dyn RandomSource) -> Result<u32, ContentError> {
            Ok(round)
        }
    }

    fn rounds(n: u32) -> SessionMode {
        SessionMode::Rounds(NonZeroU32::new(n).unwrap())
    }

    fn presenting(ms: u64) -> RoundTiming {
        RoundTiming {
            presenting: Some(Duration::from_millis(ms)),
            ..RoundTiming::default()
        }
    }

    #[test]
    fn test_begin_without_presenting_opens_input() {
        let mut q = TimerQueue::new();
        let mut rc = RoundController::<Dummy>::new(rounds(2));
        rc.begin_round(0, 0, RoundTiming::default(), &mut q);
        assert_eq!(rc.phase(), Some(Phase::AwaitingInput));
        assert!(rc.accepts_input());
        assert_eq!(q.pending(), 0, "no input limit means no timer");
    }

    #[test]
    fn test_presenting_then_input() {
        let mut q = TimerQueue::new();
        let mut rc = RoundController::<Dummy>::new(rounds(2));
        rc.begin_round(0, 0, presenting(500), &mut q);
        assert_eq!(rc.phase(), Some(Phase::Presenting));
        assert!(!rc.accepts_input());

        let fired = q.pop_due(Duration::from_millis(500)).unwrap();
        assert_eq!(rc.on_phase_timer(fired.handle, fired.tag, &mut q), PhaseTimer::InputOpened);
        assert!(rc.accepts_input());
    }

    #[test]
    fn test_stale_tag_is_ignored() {
        let mut q = TimerQueue::new();
        let mut rc = RoundController::<Dummy>::new(rounds(2));
        rc.begin_round(0, 0, presenting(500), &mut q);
        let old = TimerTag::new(TimerKind::Phase, Epoch(0));
        assert_eq!(rc.on_phase_timer(TimerHandle(999), old, &mut q), PhaseTimer::Stale);
        assert_eq!(rc.phase(), Some(Phase::Presenting));
    }

    #[test]
    fn test_resolve_records_and_arms_cooldown() {
        let mut q = TimerQueue::new();
        let mut rc = RoundController::<Dummy>::new(rounds(2));
        rc.begin_round(0, 0, RoundTiming::default(), &mut q);
        rc.resolve(RoundOutcome::correct(20), &mut q);

        assert_eq!(rc.phase(), Some(Phase::Resolved));
        assert_eq!(rc.history(), &[RoundRecord { index: 0, correct: true, delta: 20 }]);
        assert_eq!(q.next_deadline(), Some(Duration::from_millis(1_000)));

        // Resolving twice is a no-op.
        rc.resolve(RoundOutcome::correct(20), &mut q);
        assert_eq!(rc.history().len(), 1);
        assert_eq!(q.pending(), 1);
    }

    #[test]
    fn test_is_last_round() {
        let mut q = TimerQueue::new();
        let mut rc = RoundController::<Dummy>::new(rounds(2));
        rc.begin_round(0, 0, RoundTiming::default(), &mut q);
        assert!(!rc.is_last_round());
        rc.begin_round(1, 1, RoundTiming::default(), &mut q);
        assert!(rc.is_last_round());
    }

    #[test]
    fn test_tick_counts_down_and_saturates() {
        let mut rc = RoundController::<Dummy>::new(SessionMode::Duration(NonZeroU32::new(2).unwrap()));
        assert_eq!(rc.tick(), Some(1));
        assert_eq!(rc.tick(), Some(0));
        assert_eq!(rc.tick(), Some(0));
        assert!(!rc.is_last_round());

        let mut rc = RoundController::<Dummy>::new(rounds(1));
        assert_eq!(rc.tick(), None);
    }

    #[test]
    fn test_halt_cancels_and_invalidates() {
        let mut q = TimerQueue::new();
        let mut rc = RoundController::<Dummy>::new(rounds(2));
        rc.begin_round(0, 0, presenting(500), &mut q);
        let before = rc.epoch();
        rc.halt(&mut q);
        assert_eq!(q.pending(), 0);
        assert!(rc.epoch() > before);
        assert!(rc.round().is_none());
        assert!(!rc.has_live_timer());
    }
}
