use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEventKind};

/// Unified event type consumed by the stage loop
#[derive(Clone, Debug)]
pub enum StageEvent {
    Key(KeyEvent),
    /// Mouse-wheel delta: negative scrolls up, positive scrolls down.
    Scroll(i8),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse wheel, resize, etc.)
pub trait StageEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<StageEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<StageEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(StageEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Mouse(mouse)) => {
                    let delta = match mouse.kind {
                        MouseEventKind::ScrollUp => Some(-1),
                        MouseEventKind::ScrollDown => Some(1),
                        _ => None,
                    };
                    if let Some(delta) = delta {
                        if tx.send(StageEvent::Scroll(delta)).is_err() {
                            break;
                        }
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(StageEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
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

impl StageEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StageEvent, RecvTimeoutError> {
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

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<StageEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<StageEvent>) -> Self {
        Self { rx }
    }
}

impl StageEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StageEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the stage one event/tick at a time
pub struct Runner<E: StageEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: StageEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> StageEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                StageEvent::Tick
            }
        }
    }
}
