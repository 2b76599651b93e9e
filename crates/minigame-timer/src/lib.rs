//! Timer scheduling for mini-game sessions.
//!
//! Sessions only ever suspend on timers: single-shot ("after a delay") and
//! repeating ("every interval"). This crate provides:
//!
//! - [`Scheduler`]: the seam a host implements to give the engine a clock.
//! - [`TimerQueue`]: a virtual, deterministic scheduler. The engine uses it
//!   by default; tests advance it by hand and the tokio runtime advances it
//!   from real time.
//! - [`TimerSlot`]: an owned slot holding at most one live handle, which
//!   cancels the old timer before arming a new one.
//! - [`Epoch`]: a generation tag. Every timer carries the epoch that was
//!   current when it was scheduled, and the owner compares it at fire time.
//!
//! # Integration
//!
//! The queue is designed to sit inside a session actor's `tokio::select!`
//! loop, next to the command channel:
//!
//! ```ignore
//! loop {
//!     let deadline = engine.next_deadline().map(|d| origin + d);
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = sleep_until_deadline(deadline) => {
//!             engine.advance_to(origin.elapsed());
//!         }
//!     }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use tokio::time::{self, Instant as TokioInstant};
use tracing::{trace, warn};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies one scheduled timer. Never reused within a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// Monotonically increasing tag identifying the current round/phase.
///
/// A timer callback acts only if the epoch it was scheduled under is
/// still the owner's current epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(pub u64);

impl Epoch {
    /// The epoch following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Bumps the epoch in place and returns the new value.
    pub fn bump(&mut self) -> Self {
        *self = self.next();
        *self
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Scheduler seam
// ---------------------------------------------------------------------------

/// Monotonic scheduling services consumed by a session.
///
/// Times are offsets from the scheduler's own origin. `T` is the tag handed
/// back when the timer fires; the engine uses it to carry the timer kind and
/// its epoch.
pub trait Scheduler<T> {
    /// Current time relative to the scheduler's origin.
    fn now(&self) -> Duration;

    /// Schedules `tag` to fire once after `delay`.
    fn schedule_after(&mut self, delay: Duration, tag: T) -> TimerHandle;

    /// Schedules `tag` to fire every `interval`, first at `now + interval`.
    fn schedule_every(&mut self, interval: Duration, tag: T) -> TimerHandle;

    /// Cancels a timer. Returns `false` if it already fired (single-shot)
    /// or was cancelled before.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Number of timers still scheduled.
    fn pending(&self) -> usize;
}

// ---------------------------------------------------------------------------
// TimerQueue
// ---------------------------------------------------------------------------

/// A timer that came due, returned by [`TimerQueue::pop_due`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub handle: TimerHandle,
    pub tag: T,
    /// The instant (relative to the origin) the timer was due.
    pub at: Duration,
}

struct Entry<T> {
    tag: T,
    key: (Duration, u64),
    every: Option<Duration>,
}

/// Deterministic virtual-time scheduler.
///
/// Timers due at the same instant fire in the order they were scheduled.
/// Time only moves when the owner calls [`pop_due`](Self::pop_due) or
/// [`settle`](Self::settle), so the same sequence of calls always produces
/// the same sequence of fires.
pub struct TimerQueue<T> {
    now: Duration,
    next_handle: u64,
    next_seq: u64,
    due: BTreeMap<(Duration, u64), TimerHandle>,
    entries: HashMap<TimerHandle, Entry<T>>,
}

impl<T: Clone> TimerQueue<T> {
    /// Smallest repeat interval accepted. Zero would fire forever at one instant.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Creates an empty queue at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 1,
            next_seq: 0,
            due: BTreeMap::new(),
            entries: HashMap::new(),
        }
    }

    /// The earliest deadline among scheduled timers.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.due.keys().next().map(|(at, _)| *at)
    }

    /// Removes and returns the earliest timer due at or before `until`.
    ///
    /// Moves the clock to that timer's deadline. A repeating timer is
    /// rescheduled one interval after its deadline before it is returned,
    /// so cancelling it from the fire handler works.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let (&key, &handle) = self.due.iter().next()?;
        if key.0 > until {
            return None;
        }
        self.due.remove(&key);
        self.now = self.now.max(key.0);

        let (tag, every) = {
            let entry = self.entries.get(&handle)?;
            (entry.tag.clone(), entry.every)
        };
        match every {
            Some(interval) => {
                let next_key = (key.0 + interval, self.bump_seq());
                self.due.insert(next_key, handle);
                if let Some(entry) = self.entries.get_mut(&handle) {
                    entry.key = next_key;
                }
            }
            None => {
                self.entries.remove(&handle);
            }
        }

        trace!(%handle, at_ms = key.0.as_millis() as u64, "timer fired");
        Some(Fired {
            handle,
            tag,
            at: key.0,
        })
    }

    /// Moves the clock forward to `until` once everything due is handled.
    ///
    /// Never moves the clock backwards.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Cancels every scheduled timer. Returns how many were live.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        self.due.clear();
        n
    }

    /// Whether `handle` is still scheduled.
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    fn insert(&mut self, at: Duration, every: Option<Duration>, tag: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let key = (at, self.bump_seq());
        self.due.insert(key, handle);
        self.entries.insert(handle, Entry { tag, key, every });
        handle
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> for TimerQueue<T> {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_after(&mut self, delay: Duration, tag: T) -> TimerHandle {
        let at = self.now + delay;
        let handle = self.insert(at, None, tag);
        trace!(%handle, delay_ms = delay.as_millis() as u64, "timer scheduled");
        handle
    }

    fn schedule_every(&mut self, interval: Duration, tag: T) -> TimerHandle {
        let interval = if interval < Self::MIN_INTERVAL {
            warn!(
                interval_us = interval.as_micros() as u64,
                "repeat interval below minimum, clamping"
            );
            Self::MIN_INTERVAL
        } else {
            interval
        };
        let at = self.now + interval;
        let handle = self.insert(at, Some(interval), tag);
        trace!(%handle, interval_ms = interval.as_millis() as u64, "repeating timer scheduled");
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.entries.remove(&handle) {
            Some(entry) => {
                self.due.remove(&entry.key);
                trace!(%handle, "timer cancelled");
                true
            }
            None => false,
        }
    }

    fn pending(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// TimerSlot
// ---------------------------------------------------------------------------

/// Owner-side slot for at most one live timer.
///
/// Arming always cancels whatever the slot held first, so two timers for
/// the same purpose can never be live at once.
#[derive(Debug, Default)]
pub struct TimerSlot {
    handle: Option<TimerHandle>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the current timer (if any) and arms a single-shot one.
    pub fn arm_after<T, S>(&mut self, scheduler: &mut S, delay: Duration, tag: T) -> TimerHandle
    where
        S: Scheduler<T> + ?Sized,
    {
        self.clear(scheduler);
        let handle = scheduler.schedule_after(delay, tag);
        self.handle = Some(handle);
        handle
    }

    /// Cancels the current timer (if any) and arms a repeating one.
    pub fn arm_every<T, S>(&mut self, scheduler: &mut S, interval: Duration, tag: T) -> TimerHandle
    where
        S: Scheduler<T> + ?Sized,
    {
        self.clear(scheduler);
        let handle = scheduler.schedule_every(interval, tag);
        self.handle = Some(handle);
        handle
    }

    /// Cancels the held timer. Returns `true` if a live timer was cancelled.
    pub fn clear<T, S>(&mut self, scheduler: &mut S) -> bool
    where
        S: Scheduler<T> + ?Sized,
    {
        match self.handle.take() {
            Some(handle) => scheduler.cancel(handle),
            None => false,
        }
    }

    /// Forgets `handle` if it is the one held. Call after a single-shot
    /// timer fired so the slot doesn't keep a dead handle around.
    pub fn release(&mut self, handle: TimerHandle) {
        if self.handle == Some(handle) {
            self.handle = None;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<TimerHandle> {
        self.handle
    }
}

// ---------------------------------------------------------------------------
// Tokio bridge
// ---------------------------------------------------------------------------

/// Sleeps until `deadline`, or pends forever when there is none.
///
/// Used inside `tokio::select!`: with nothing scheduled, the branch never
/// completes and the loop only reacts to commands.
pub async fn sleep_until_deadline(deadline: Option<TokioInstant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
