//! Integration tests for the virtual timer queue and timer slots.
//!
//! The queue never reads a real clock, so these tests are plain `#[test]`s
//! except for the tokio bridge, which runs with paused time.

use std::time::Duration;

use minigame_timer::{Epoch, Scheduler, TimerQueue, TimerSlot, sleep_until_deadline};

// =========================================================================
// Helpers
// =========================================================================

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Drains everything due up to `until`, returning the tags in fire order.
fn drain<T: Clone>(q: &mut TimerQueue<T>, until: Duration) -> Vec<T> {
    let mut out = Vec::new();
    while let Some(fired) = q.pop_due(until) {
        out.push(fired.tag);
    }
    q.settle(until);
    out
}

// =========================================================================
// Single-shot timers
// =========================================================================

#[test]
fn test_new_queue_is_empty() {
    let q: TimerQueue<&str> = TimerQueue::new();
    assert_eq!(q.now(), Duration::ZERO);
    assert_eq!(q.pending(), 0);
    assert_eq!(q.next_deadline(), None);
}

#[test]
fn test_single_shot_fires_once_at_deadline() {
    let mut q = TimerQueue::new();
    q.schedule_after(ms(500), "a");

    assert!(drain(&mut q, ms(499)).is_empty());
    assert_eq!(drain(&mut q, ms(500)), vec!["a"]);
    assert!(drain(&mut q, ms(5_000)).is_empty());
    assert_eq!(q.pending(), 0);
}

#[test]
fn test_fires_in_deadline_order() {
    let mut q = TimerQueue::new();
    q.schedule_after(ms(300), "late");
    q.schedule_after(ms(100), "early");
    q.schedule_after(ms(200), "middle");

    assert_eq!(drain(&mut q, ms(1_000)), vec!["early", "middle", "late"]);
}

#[test]
fn test_same_deadline_fires_in_schedule_order() {
    let mut q = TimerQueue::new();
    q.schedule_after(ms(100), 1);
    q.schedule_after(ms(100), 2);
    q.schedule_after(ms(100), 3);

    assert_eq!(drain(&mut q, ms(100)), vec![1, 2, 3]);
}

#[test]
fn test_clock_moves_to_each_deadline() {
    let mut q = TimerQueue::new();
    q.schedule_after(ms(100), ());

    let fired = q.pop_due(ms(1_000)).unwrap();
    assert_eq!(fired.at, ms(100));
    assert_eq!(q.now(), ms(100));

    // Scheduling from inside a handler is relative to the fire time.
    q.schedule_after(ms(50), ());
    assert_eq!(q.next_deadline(), Some(ms(150)));
}

#[test]
fn test_settle_never_moves_backwards() {
    let mut q: TimerQueue<()> = TimerQueue::new();
    q.settle(ms(500));
    q.settle(ms(100));
    assert_eq!(q.now(), ms(500));
}

// =========================================================================
// Repeating timers
// =========================================================================

#[test]
fn test_repeating_fires_every_interval() {
    let mut q = TimerQueue::new();
    q.schedule_every(Duration::from_secs(1), "tick");

    let fired = drain(&mut q, Duration::from_secs(10));
    assert_eq!(fired.len(), 10);
    assert_eq!(q.pending(), 1, "repeating timer stays scheduled");
    assert_eq!(q.next_deadline(), Some(Duration::from_secs(11)));
}

#[test]
fn test_repeating_cancelled_from_handler_stops() {
    let mut q = TimerQueue::new();
    q.schedule_every(ms(100), "tick");

    let mut count = 0;
    while let Some(fired) = q.pop_due(ms(1_000)) {
        count += 1;
        if count == 3 {
            assert!(q.cancel(fired.handle));
        }
    }
    assert_eq!(count, 3);
    assert_eq!(q.pending(), 0);
}

// =========================================================================
// Cancellation
// =========================================================================

#[test]
fn test_cancel_before_fire() {
    let mut q = TimerQueue::new();
    let h = q.schedule_after(ms(100), "x");
    assert!(q.is_scheduled(h));

    assert!(q.cancel(h));
    assert!(!q.is_scheduled(h));
    assert!(drain(&mut q, ms(1_000)).is_empty());
}

#[test]
fn test_cancel_after_fire_returns_false() {
    let mut q = TimerQueue::new();
    let h = q.schedule_after(ms(100), "x");
    drain(&mut q, ms(100));

    assert!(!q.cancel(h));
}

#[test]
fn test_cancel_all() {
    let mut q = TimerQueue::new();
    q.schedule_after(ms(100), 1);
    q.schedule_every(ms(100), 2);

    assert_eq!(q.cancel_all(), 2);
    assert_eq!(q.pending(), 0);
    assert_eq!(q.next_deadline(), None);
}

#[test]
fn test_handles_are_unique() {
    let mut q = TimerQueue::new();
    let a = q.schedule_after(ms(1), ());
    q.cancel(a);
    let b = q.schedule_after(ms(1), ());
    assert_ne!(a, b);
}

// =========================================================================
// TimerSlot
// =========================================================================

#[test]
fn test_slot_arm_cancels_previous() {
    let mut q = TimerQueue::new();
    let mut slot = TimerSlot::new();

    let first = slot.arm_after(&mut q, ms(100), (Epoch(1), "present"));
    let second = slot.arm_after(&mut q, ms(200), (Epoch(2), "cooldown"));

    assert!(!q.is_scheduled(first), "old timer must be cancelled");
    assert!(q.is_scheduled(second));
    assert_eq!(q.pending(), 1);
    assert_eq!(slot.handle(), Some(second));
}

#[test]
fn test_slot_clear() {
    let mut q = TimerQueue::new();
    let mut slot = TimerSlot::new();
    slot.arm_every(&mut q, ms(100), ());

    assert!(slot.clear(&mut q));
    assert!(!slot.is_armed());
    assert_eq!(q.pending(), 0);
    assert!(!slot.clear(&mut q), "second clear is a no-op");
}

#[test]
fn test_slot_release_only_matching_handle() {
    let mut q = TimerQueue::new();
    let mut slot = TimerSlot::new();
    let h = slot.arm_after(&mut q, ms(100), ());

    slot.release(minigame_timer::TimerHandle(h.0 + 100));
    assert!(slot.is_armed());
    slot.release(h);
    assert!(!slot.is_armed());
}

// =========================================================================
// Tokio bridge
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_sleep_until_deadline_without_deadline_pends() {
    let result =
        tokio::time::timeout(Duration::from_secs(5), sleep_until_deadline(None)).await;
    assert!(result.is_err(), "no deadline should pend forever");
}

#[tokio::test(start_paused = true)]
async fn test_sleep_until_deadline_resolves() {
    let start = tokio::time::Instant::now();
    sleep_until_deadline(Some(start + ms(250))).await;
    assert!(start.elapsed() >= ms(250));
}
