//! Cooperative timer host
//!
//! Single-threaded stand-in for the host's timer and frame-callback
//! facilities. Nothing fires on its own: the host calls [`SchedulerHandle::advance_to`]
//! with the current time and dispatches the returned [`Fired`] entries to
//! whoever owns the ids. Driving it by hand makes it a fake-timer harness.
//!
//! An interval that falls behind fires once and re-anchors one period after
//! the current time, so a long pause never turns into a burst of firings.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Opaque timer handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
enum TimerKind {
    /// Repeats every `period_ms`
    Interval { period_ms: f64 },
    /// Fires once, then is removed
    Timeout,
    /// Fires on every advance (display refresh)
    Frame,
}

#[derive(Debug)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    due_ms: f64,
}

/// A timer that came due during an advance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fired {
    pub id: TimerId,
    /// Scheduled time of this firing (frame timestamp for frame subscriptions)
    pub at_ms: f64,
}

/// Timer table. Use through [`SchedulerHandle`].
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: f64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    fn insert(&mut self, kind: TimerKind, due_ms: f64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { id, kind, due_ms });
        id
    }

    fn advance_to(&mut self, now_ms: f64) -> Vec<Fired> {
        // Time never runs backward
        let now = if now_ms.is_finite() { now_ms.max(self.now_ms) } else { self.now_ms };
        self.now_ms = now;

        let mut fired = Vec::new();
        for timer in &mut self.timers {
            match timer.kind {
                TimerKind::Frame => fired.push(Fired { id: timer.id, at_ms: now }),
                TimerKind::Timeout => {
                    if timer.due_ms <= now {
                        fired.push(Fired { id: timer.id, at_ms: timer.due_ms });
                    }
                }
                TimerKind::Interval { period_ms } => {
                    if timer.due_ms <= now {
                        fired.push(Fired { id: timer.id, at_ms: timer.due_ms });
                        // Missed periods are skipped, not replayed
                        let next = timer.due_ms + period_ms;
                        timer.due_ms = if next > now { next } else { now + period_ms };
                    }
                }
            }
        }
        self.timers
            .retain(|t| !(t.kind == TimerKind::Timeout && t.due_ms <= now));

        // Stable sort keeps registration order for equal due times
        fired.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        trace!(now_ms = now, fired = fired.len(), pending = self.timers.len(), "Scheduler advanced");
        fired
    }
}

/// Shared handle to a [`Scheduler`].
///
/// Every method borrows the table only for its own duration, so owners may
/// cancel or register timers while dispatching a batch of [`Fired`] entries.
#[derive(Clone, Debug, Default)]
pub struct SchedulerHandle(Rc<RefCell<Scheduler>>);

impl SchedulerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last time passed to `advance_to`
    pub fn now_ms(&self) -> f64 {
        self.0.borrow().now_ms
    }

    /// Repeating timer, first firing one period from now.
    /// Non-positive periods are raised to 1 ms.
    pub fn set_interval(&self, period_ms: f64) -> TimerId {
        let period_ms = if period_ms.is_finite() { period_ms.max(1.0) } else { 1.0 };
        let mut inner = self.0.borrow_mut();
        let due = inner.now_ms + period_ms;
        inner.insert(TimerKind::Interval { period_ms }, due)
    }

    /// One-shot timer
    pub fn set_timeout(&self, delay_ms: f64) -> TimerId {
        let delay_ms = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        let mut inner = self.0.borrow_mut();
        let due = inner.now_ms + delay_ms;
        inner.insert(TimerKind::Timeout, due)
    }

    /// Subscribe to frame callbacks: fires once per `advance_to`
    pub fn request_frames(&self) -> TimerId {
        let mut inner = self.0.borrow_mut();
        let now = inner.now_ms;
        inner.insert(TimerKind::Frame, now)
    }

    /// Cancel a timer. Returns false if it was not pending.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut inner = self.0.borrow_mut();
        let before = inner.timers.len();
        inner.timers.retain(|t| t.id != id);
        before != inner.timers.len()
    }

    /// Cancel without panicking if the table is mid-borrow (teardown paths)
    pub(crate) fn try_cancel(&self, id: TimerId) -> bool {
        match self.0.try_borrow_mut() {
            Ok(mut inner) => {
                let before = inner.timers.len();
                inner.timers.retain(|t| t.id != id);
                before != inner.timers.len()
            }
            Err(_) => {
                tracing::warn!(?id, "Scheduler busy, timer not cancelled");
                false
            }
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.0.borrow().timers.iter().any(|t| t.id == id)
    }

    /// Number of registered timers and frame subscriptions
    pub fn pending(&self) -> usize {
        self.0.borrow().timers.len()
    }

    /// Move the clock forward and collect everything that came due,
    /// ordered by scheduled time.
    pub fn advance_to(&self, now_ms: f64) -> Vec<Fired> {
        self.0.borrow_mut().advance_to(now_ms)
    }

    /// Advance relative to the current time
    pub fn advance_by(&self, delta_ms: f64) -> Vec<Fired> {
        let now = self.now_ms() + delta_ms.max(0.0);
        self.advance_to(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_fires_every_period() {
        let sched = SchedulerHandle::new();
        let id = sched.set_interval(1000.0);

        assert!(sched.advance_to(999.0).is_empty());
        let fired = sched.advance_to(1000.0);
        assert_eq!(fired, vec![Fired { id, at_ms: 1000.0 }]);

        let fired = sched.advance_to(2000.0);
        assert_eq!(fired, vec![Fired { id, at_ms: 2000.0 }]);
        assert!(sched.is_pending(id));
    }

    #[test]
    fn test_interval_skips_missed_periods() {
        let sched = SchedulerHandle::new();
        let id = sched.set_interval(1000.0);

        // Ten minutes late: one firing, then cadence restarts from now
        let fired = sched.advance_to(600_000.0);
        assert_eq!(fired, vec![Fired { id, at_ms: 1000.0 }]);
        assert!(sched.advance_to(600_999.0).is_empty());
        assert_eq!(sched.advance_to(601_000.0), vec![Fired { id, at_ms: 601_000.0 }]);

        // Slightly late firings keep the original grid
        assert_eq!(sched.advance_to(602_100.0), vec![Fired { id, at_ms: 602_000.0 }]);
        assert_eq!(sched.advance_to(603_000.0), vec![Fired { id, at_ms: 603_000.0 }]);
    }

    #[test]
    fn test_timeout_fires_once() {
        let sched = SchedulerHandle::new();
        let id = sched.set_timeout(4000.0);
        assert_eq!(sched.pending(), 1);

        assert_eq!(sched.advance_to(4000.0), vec![Fired { id, at_ms: 4000.0 }]);
        assert_eq!(sched.pending(), 0);
        assert!(sched.advance_to(10_000.0).is_empty());
    }

    #[test]
    fn test_frames_fire_each_advance() {
        let sched = SchedulerHandle::new();
        let id = sched.request_frames();

        assert_eq!(sched.advance_to(16.0), vec![Fired { id, at_ms: 16.0 }]);
        assert_eq!(sched.advance_to(32.0), vec![Fired { id, at_ms: 32.0 }]);
    }

    #[test]
    fn test_time_never_runs_backward() {
        let sched = SchedulerHandle::new();
        sched.request_frames();
        sched.advance_to(100.0);
        let fired = sched.advance_to(50.0);
        assert_eq!(fired[0].at_ms, 100.0);
        assert_eq!(sched.now_ms(), 100.0);

        sched.advance_to(f64::NAN);
        assert_eq!(sched.now_ms(), 100.0);
    }

    #[test]
    fn test_cancel() {
        let sched = SchedulerHandle::new();
        let a = sched.set_interval(10.0);
        let b = sched.request_frames();

        assert!(sched.cancel(a));
        assert!(!sched.cancel(a));
        assert!(sched.cancel(b));
        assert_eq!(sched.pending(), 0);
        assert!(sched.advance_by(1000.0).is_empty());
    }

    #[test]
    fn test_fired_ordered_by_due_time() {
        let sched = SchedulerHandle::new();
        let slow = sched.set_interval(300.0);
        let fast = sched.set_timeout(100.0);

        let fired = sched.advance_to(300.0);
        assert_eq!(fired[0].id, fast);
        assert_eq!(fired[1].id, slow);
    }

    #[test]
    fn test_degenerate_periods() {
        let sched = SchedulerHandle::new();
        sched.set_interval(0.0);
        // Clamped to 1 ms; a 5 ms advance fires once and never hangs
        assert_eq!(sched.advance_by(5.0).len(), 1);
        assert_eq!(sched.advance_by(1.0).len(), 1);

        let t = sched.set_timeout(-10.0);
        assert_eq!(sched.advance_by(0.0).iter().filter(|f| f.id == t).count(), 1);
    }
}
