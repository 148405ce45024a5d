//! Clock abstraction so retention, tooltips and polling are testable
//! without real time.

/// Millisecond wall-clock source injected into the engine and scheduler.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> i64;
}

/// Clock backed by the embassy time driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        embassy_time::Instant::now().as_millis() as i64
    }
}
