use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// How often the screen refreshes while nothing is typed, so a running
/// behavior timer keeps counting on screen.
pub const TICK_RATE: Duration = Duration::from_millis(250);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source: a reader thread forwarding crossterm events.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // Windows reports releases too; only presses are input
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    Some(AppEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => Some(AppEvent::Resize),
                Ok(_) => None,
                Err(e) => {
                    tracing::error!(error = %e, "terminal event stream failed");
                    break;
                }
            };
            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
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

/// Scripted event source for headless tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    /// Source preloaded with `events`, plus the sender for feeding more.
    pub fn scripted<I: IntoIterator<Item = AppEvent>>(events: I) -> (Self, Sender<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        for ev in events {
            // The receiver is alive in this scope
            let _ = tx.send(ev);
        }
        (Self::new(rx), tx)
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: EventSource> {
    event_source: E,
    tick_rate: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, tick_rate: Duration) -> Self {
        Self {
            event_source,
            tick_rate,
        }
    }

    /// Blocks up to the tick rate and returns the next event, or Tick on timeout.
    /// A closed source also yields Tick; callers bound their loop themselves.
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.tick_rate) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));
        assert!(matches!(runner.step(), AppEvent::Tick));
    }

    #[test]
    fn scripted_events_arrive_in_order() {
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        let (source, _tx) = TestEventSource::scripted([AppEvent::Resize, AppEvent::Key(key)]);
        let runner = Runner::new(source, Duration::from_millis(10));

        assert!(matches!(runner.step(), AppEvent::Resize));
        match runner.step() {
            AppEvent::Key(k) => assert_eq!(k.code, KeyCode::Char('s')),
            other => panic!("expected key event, got {other:?}"),
        }
        assert!(matches!(runner.step(), AppEvent::Tick));
    }

    #[test]
    fn disconnected_source_ticks() {
        let (source, tx) = TestEventSource::scripted(Vec::<AppEvent>::new());
        drop(tx);
        let runner = Runner::new(source, Duration::from_millis(1));
        assert!(matches!(runner.step(), AppEvent::Tick));
    }
}
