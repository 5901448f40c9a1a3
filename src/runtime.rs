use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, warn};

/// Unified event type consumed by the app runner. Every producer feeds the
/// same queue so the session is only ever touched by the consuming thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Key(KeyEvent),
    Resize,
    /// A round-timer tick, tagged with the generation of the timer that fired it
    Tick(u64),
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError>;

    /// Handle for other producers (the round timer) to post into the same queue
    fn sender(&self) -> Sender<SessionEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        thread::spawn(move || loop {
            let sent = match event::read() {
                Ok(CtEvent::Key(key)) => reader_tx.send(SessionEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => reader_tx.send(SessionEvent::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    warn!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if sent.is_err() {
                break;
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

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<SessionEvent> {
        self.tx.clone()
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<SessionEvent> {
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

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Background thread posting `Tick(generation)` every interval until
/// cancelled. Dropping the timer cancels it.
pub struct IntervalTimer {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl IntervalTimer {
    pub fn start(interval: Duration, generation: u64, tx: Sender<SessionEvent>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = thread::spawn(move || {
            let mut next = Instant::now() + interval;
            loop {
                let now = Instant::now();
                if now < next {
                    thread::park_timeout(next - now);
                }
                if flag.load(Ordering::Acquire) {
                    break;
                }
                // park_timeout may wake spuriously
                if Instant::now() < next {
                    continue;
                }
                if tx.send(SessionEvent::Tick(generation)).is_err() {
                    break;
                }
                next += interval;
            }
        });

        Self {
            generation,
            cancelled,
            handle: Some(handle),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Runner that advances the application one event at a time and owns the
/// round timer.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    timer: Option<IntervalTimer>,
    generation: u64,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            timer: None,
            generation: 0,
        }
    }

    pub fn event_source(&self) -> &E {
        &self.event_source
    }

    /// Start the round timer if it is not already running.
    pub fn arm_timer(&mut self) {
        if self.timer.is_some() {
            return;
        }
        self.generation += 1;
        debug!(generation = self.generation, "round timer armed");
        self.timer = Some(IntervalTimer::start(
            self.ticker.interval(),
            self.generation,
            self.event_source.sender(),
        ));
    }

    /// Cancel the round timer. Ticks it already queued become stale.
    pub fn disarm_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            debug!(generation = timer.generation(), "round timer cancelled");
            timer.cancel();
        }
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Blocks up to `timeout` and returns the next live event. Ticks from a
    /// cancelled timer are swallowed. `None` means nothing arrived in time.
    pub fn step(&self, timeout: Duration) -> Option<SessionEvent> {
        match self.event_source.recv_timeout(timeout) {
            Ok(SessionEvent::Tick(generation)) => {
                let live = self
                    .timer
                    .as_ref()
                    .is_some_and(|timer| timer.generation() == generation);
                live.then_some(SessionEvent::Tick(generation))
            }
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl<E: EventSource, T: Ticker> Drop for Runner<E, T> {
    fn drop(&mut self) {
        self.disarm_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn step_returns_none_on_timeout() {
        let runner = Runner::new(TestEventSource::new(), FixedTicker::new(Duration::from_millis(1)));

        assert_eq!(runner.step(Duration::from_millis(1)), None);
    }

    #[test]
    fn step_passes_through_events() {
        let es = TestEventSource::new();
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        es.sender().send(SessionEvent::Key(key)).unwrap();
        es.sender().send(SessionEvent::Resize).unwrap();
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));

        assert_eq!(runner.step(Duration::from_millis(10)), Some(SessionEvent::Key(key)));
        assert_eq!(runner.step(Duration::from_millis(10)), Some(SessionEvent::Resize));
    }

    #[test]
    fn armed_timer_delivers_ticks() {
        let mut runner = Runner::new(TestEventSource::new(), FixedTicker::new(Duration::from_millis(5)));
        runner.arm_timer();
        assert!(runner.is_timer_armed());

        let ev = runner.step(Duration::from_millis(500));
        assert_eq!(ev, Some(SessionEvent::Tick(1)));
    }

    #[test]
    fn arming_twice_keeps_one_timer() {
        let mut runner = Runner::new(TestEventSource::new(), FixedTicker::new(Duration::from_millis(5)));
        runner.arm_timer();
        runner.arm_timer();

        assert_eq!(runner.step(Duration::from_millis(500)), Some(SessionEvent::Tick(1)));
    }

    #[test]
    fn stale_ticks_are_dropped() {
        let es = TestEventSource::new();
        let tx = es.sender();
        let mut runner = Runner::new(es, FixedTicker::new(Duration::from_secs(60)));

        runner.arm_timer();
        runner.disarm_timer();
        assert!(!runner.is_timer_armed());

        // a tick that was already in flight when the timer was cancelled
        tx.send(SessionEvent::Tick(1)).unwrap();
        assert_eq!(runner.step(Duration::from_millis(10)), None);

        runner.arm_timer();
        tx.send(SessionEvent::Tick(1)).unwrap();
        tx.send(SessionEvent::Tick(2)).unwrap();
        assert_eq!(runner.step(Duration::from_millis(10)), None);
        assert_eq!(runner.step(Duration::from_millis(10)), Some(SessionEvent::Tick(2)));
    }

    #[test]
    fn cancelled_timer_stops_sending() {
        let (tx, rx) = mpsc::channel();
        let mut timer = IntervalTimer::start(Duration::from_millis(2), 9, tx);
        timer.cancel();

        // drain anything sent before cancellation, then nothing more arrives
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropping_timer_cancels_it() {
        let (tx, rx) = mpsc::channel();
        {
            let _timer = IntervalTimer::start(Duration::from_millis(2), 1, tx);
        }
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(20));
        assert!(matches!(rx.try_recv(), Err(mpsc::TryRecvError::Disconnected)));
    }
}
