use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::timer::{Clock, SystemClock};

/// Redraw and timer cadence of the event loop
pub const TICK_RATE_MS: u64 = 50;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Event source fed from a channel, for tests and scripted runs
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that interleaves terminal events with ticks.
///
/// Ticks are due on a fixed cadence of the runner's clock whether or not
/// input keeps arriving.
pub struct Runner<E: EventSource, T: Ticker, C: Clock = SystemClock> {
    event_source: E,
    ticker: T,
    clock: C,
    next_tick: Cell<Instant>,
}

impl<E: EventSource, T: Ticker> Runner<E, T, SystemClock> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self::with_clock(event_source, ticker, SystemClock)
    }
}

impl<E: EventSource, T: Ticker, C: Clock> Runner<E, T, C> {
    pub fn with_clock(event_source: E, ticker: T, clock: C) -> Self {
        let next_tick = Cell::new(clock.now() + ticker.interval());
        Self {
            event_source,
            ticker,
            clock,
            next_tick,
        }
    }

    /// Returns `Tick` once the tick deadline has passed, otherwise waits for an
    /// event until that deadline.
    pub fn step(&self) -> AppEvent {
        let now = self.clock.now();
        let due = self.next_tick.get();
        if now >= due {
            return self.tick(now);
        }

        let wait = due - now;
        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(self.clock.now()),
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(wait);
                self.tick(self.clock.now())
            }
        }
    }

    fn tick(&self, now: Instant) -> AppEvent {
        self.next_tick.set(now + self.ticker.interval());
        AppEvent::Tick
    }
}
