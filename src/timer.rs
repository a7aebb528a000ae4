use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time for deferred work
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

/// A slot holding at most one pending deferred action.
///
/// Arming always replaces whatever was pending, so a stale action can never
/// fire after the slot has been re-armed or cancelled.
#[derive(Debug, Clone)]
pub struct TimerSlot<T> {
    pending: Option<(Instant, T)>,
}

impl<T> TimerSlot<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn arm(&mut self, now: Instant, delay: Duration, payload: T) {
        self.cancel();
        self.pending = Some((now + delay, payload));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Take the payload if its deadline has passed. Fires at most once per arm.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((deadline, payload)) if now >= deadline => Some(payload),
            other => {
                self.pending = other;
                None
            }
        }
    }
}

impl<T> Default for TimerSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();

        other.advance_ms(250);

        assert_eq!(clock.now() - start, Duration::from_millis(250));
    }

    #[test]
    fn test_poll_before_deadline_keeps_payload() {
        let clock = ManualClock::new();
        let mut slot = TimerSlot::new();
        slot.arm(clock.now(), Duration::from_millis(100), "hide");

        clock.advance_ms(99);
        assert_eq!(slot.poll(clock.now()), None);
        assert!(slot.is_armed());
    }

    #[test]
    fn test_poll_fires_once() {
        let clock = ManualClock::new();
        let mut slot = TimerSlot::new();
        slot.arm(clock.now(), Duration::from_millis(100), "hide");

        clock.advance_ms(100);
        assert_eq!(slot.poll(clock.now()), Some("hide"));
        assert_eq!(slot.poll(clock.now()), None);
        assert!(!slot.is_armed());
    }

    #[test]
    fn test_rearm_replaces_pending() {
        let clock = ManualClock::new();
        let mut slot = TimerSlot::new();
        slot.arm(clock.now(), Duration::from_millis(100), 1);
        clock.advance_ms(50);
        slot.arm(clock.now(), Duration::from_millis(100), 2);

        clock.advance_ms(60);
        assert_eq!(slot.poll(clock.now()), None);
        clock.advance_ms(40);
        assert_eq!(slot.poll(clock.now()), Some(2));
        assert_eq!(slot.poll(clock.now()), None);
    }

    #[test]
    fn test_cancel_clears_slot() {
        let clock = ManualClock::new();
        let mut slot = TimerSlot::new();
        slot.arm(clock.now(), Duration::ZERO, ());
        slot.cancel();

        assert_eq!(slot.deadline(), None);
        assert_eq!(slot.poll(clock.now()), None);
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let clock = ManualClock::new();
        let mut slot = TimerSlot::new();
        slot.arm(clock.now(), Duration::ZERO, 'x');
        assert!(slot.is_armed());
        assert_eq!(slot.poll(clock.now()), Some('x'));
    }
}
