use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum QuizEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait QuizEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;

    /// Sender that countdown timers can push ticks into
    fn sender(&self) -> Sender<QuizEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<QuizEvent>,
    rx: Receiver<QuizEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if input_tx.send(QuizEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if input_tx.send(QuizEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<QuizEvent> {
        self.tx.clone()
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
    tx: Sender<QuizEvent>,
    rx: Receiver<QuizEvent>,
}

impl TestEventSource {
    pub fn new(tx: Sender<QuizEvent>, rx: Receiver<QuizEvent>) -> Self {
        Self { tx, rx }
    }

    pub fn channel() -> (Sender<QuizEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx.clone(), Self::new(tx, rx))
    }
}

impl QuizEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<QuizEvent> {
        self.tx.clone()
    }
}

/// Outcome of one runner step. Only a real timer tick advances a countdown;
/// an idle wait just gives the caller a chance to redraw.
#[derive(Clone, Debug)]
pub enum Step {
    Event(QuizEvent),
    Idle,
}

/// Runner that advances the application one event at a time
pub struct Runner<E: QuizEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: QuizEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn event_source(&self) -> &E {
        &self.event_source
    }

    /// Blocks up to the ticker interval and returns the next event, or Idle on timeout
    pub fn step(&self) -> Step {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Step::Event(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Step::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::CountdownTimer;

    #[test]
    fn step_returns_idle_on_timeout() {
        let (_tx, es) = TestEventSource::channel();
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            Step::Idle => {}
            _ => panic!("expected Idle on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, es) = TestEventSource::channel();
        tx.send(QuizEvent::Resize).unwrap();
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            Step::Event(QuizEvent::Resize) => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn timer_ticks_arrive_through_source() {
        let (_tx, es) = TestEventSource::channel();
        let _timer = CountdownTimer::start(es.sender(), Duration::from_millis(2), || {
            QuizEvent::Tick
        });
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(200)));

        match runner.step() {
            Step::Event(QuizEvent::Tick) => {}
            other => panic!("expected Tick, got {other:?}"),
        }
    }
}
