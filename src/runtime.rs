use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

pub const TICK_RATE_MS: u64 = 100;

/// Terminal event consumed by the poll loop
#[derive(Clone, Debug)]
pub enum TrialEvent {
    Key(KeyEvent),
    Resize,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait TrialEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<TrialEvent, RecvTimeoutError>;
    /// Return an already queued event without blocking.
    fn try_recv(&self) -> Result<TrialEvent, TryRecvError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<TrialEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => TrialEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => TrialEvent::Resize,
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

impl TrialEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrialEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn try_recv(&self) -> Result<TrialEvent, TryRecvError> {
        self.rx.try_recv()
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

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TrialEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TrialEvent>) -> Self {
        Self { rx }
    }
}

impl TrialEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrialEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn try_recv(&self) -> Result<TrialEvent, TryRecvError> {
        self.rx.try_recv()
    }
}

/// Everything that arrived during one poll iteration, in arrival order.
/// The host applies `keys` first and evaluates the clock afterwards.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub keys: Vec<KeyEvent>,
    pub resized: bool,
    pub disconnected: bool,
}

impl Frame {
    fn push(&mut self, event: TrialEvent) {
        match event {
            TrialEvent::Key(key) => self.keys.push(key),
            TrialEvent::Resize => self.resized = true,
        }
    }
}

/// Runner that advances the poll loop one frame at a time
pub struct Runner<E: TrialEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: TrialEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Waits up to one tick interval for the first event, then drains
    /// whatever else is already queued. An empty frame is a plain tick.
    pub fn step(&self) -> Frame {
        let mut frame = Frame::default();

        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => frame.push(ev),
            Err(RecvTimeoutError::Timeout) => return frame,
            Err(RecvTimeoutError::Disconnected) => {
                frame.disconnected = true;
                return frame;
            }
        }

        loop {
            match self.event_source.try_recv() {
                Ok(ev) => frame.push(ev),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    frame.disconnected = true;
                    break;
                }
            }
        }

        frame
    }
}
