//! Best-effort telemetry polling.
//!
//! One scheduler task owns the telemetry source and publishes
//! [`PollEvent`]s to the UI through a pub-sub channel. Fetches are
//! single-flight by construction: the loop awaits each fetch before
//! considering the next cycle, so a slow request stretches the cycle
//! instead of stacking a second one. Failures are status, not errors:
//! the store is untouched and the next tick retries.

extern crate alloc;
use alloc::format;
use alloc::string::String;

use embassy_futures::select::{Either3, select3};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::watch::{Receiver as WatchReceiver, Watch};
use embassy_time::{Duration, Timer};
use log::{debug, warn};

use crate::clock::Clock;
use crate::sample::{Sample, TelemetryPayload};

/// Event queue depth; bursts beyond this backpressure the scheduler.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Watch consumers per control signal (scheduler plus one observer).
pub const WATCH_CONSUMERS: usize = 2;

/// Channel carrying poll outcomes to the embedding UI.
pub type PollEvents = Channel<CriticalSectionRawMutex, PollEvent, EVENT_QUEUE_DEPTH>;
pub type PollEventSender<'a> = Sender<'a, CriticalSectionRawMutex, PollEvent, EVENT_QUEUE_DEPTH>;
pub type PollEventReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, PollEvent, EVENT_QUEUE_DEPTH>;

/// Foreground/background signal mirrored from the page.
pub type VisibilityWatch = Watch<CriticalSectionRawMutex, PageVisibility, WATCH_CONSUMERS>;
pub type VisibilityReceiver<'a> =
    WatchReceiver<'a, CriticalSectionRawMutex, PageVisibility, WATCH_CONSUMERS>;

/// Polling interval reconfiguration, in milliseconds.
pub type IntervalWatch = Watch<CriticalSectionRawMutex, u64, WATCH_CONSUMERS>;
pub type IntervalReceiver<'a> = WatchReceiver<'a, CriticalSectionRawMutex, u64, WATCH_CONSUMERS>;

/// Whether the page hosting the dashboard is observable. Polling suspends
/// entirely while hidden and resumes with an immediate fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVisibility {
    Visible,
    Hidden,
}

/// Source of telemetry payloads, usually an HTTP client hitting the
/// device's telemetry endpoint.
#[allow(async_fn_in_trait)]
pub trait TelemetrySource {
    type Error: core::fmt::Display;

    async fn fetch(&mut self) -> Result<TelemetryPayload, Self::Error>;
}

/// Outcome of one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// Fetch succeeded; the sample is stamped and ready to ingest.
    Sample(Sample),
    /// Fetch failed; the message feeds the status indicator, nothing else.
    Failed(String),
}

/// Last-known poll health, for the status UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Idle,
    Ok { at_ms: i64 },
    Failed { at_ms: i64 },
}

/// Periodic telemetry poller.
pub struct PollScheduler<S: TelemetrySource, C: Clock> {
    source: S,
    clock: C,
    interval_ms: u64,
    status: PollStatus,
}

impl<S: TelemetrySource, C: Clock> PollScheduler<S, C> {
    pub fn new(source: S, clock: C, interval_ms: u64) -> Self {
        Self {
            source,
            clock,
            interval_ms,
            status: PollStatus::Idle,
        }
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Run one fetch to completion and report its outcome.
    pub async fn poll_once(&mut self) -> PollEvent {
        match self.source.fetch().await {
            Ok(payload) => {
                let now = self.clock.now_ms();
                self.status = PollStatus::Ok { at_ms: now };
                debug!("telemetry sample fetched at {now}");
                PollEvent::Sample(Sample::from_payload(&payload, now))
            }
            Err(err) => {
                let now = self.clock.now_ms();
                self.status = PollStatus::Failed { at_ms: now };
                warn!("telemetry poll failed: {err}");
                PollEvent::Failed(format!("{err}"))
            }
        }
    }

    /// Poll forever, publishing each outcome.
    ///
    /// While the page is hidden the loop parks without touching the source;
    /// foregrounding polls immediately. An interval change cancels the
    /// pending wait and starts a fresh one at the new cadence.
    pub async fn run(
        mut self,
        events: PollEventSender<'_>,
        mut page: VisibilityReceiver<'_>,
        mut interval: IntervalReceiver<'_>,
    ) -> ! {
        loop {
            if page.try_get() == Some(PageVisibility::Hidden) {
                debug!("page hidden, polling suspended");
                while page.changed().await == PageVisibility::Hidden {}
                debug!("page visible, polling resumed");
            }

            let event = self.poll_once().await;
            events.send(event).await;

            loop {
                match select3(
                    Timer::after(Duration::from_millis(self.interval_ms)),
                    interval.changed(),
                    page.changed(),
                )
                .await
                {
                    Either3::First(()) => break,
                    Either3::Second(interval_ms) => {
                        // Restart the wait at the new cadence.
                        self.interval_ms = interval_ms;
                    }
                    Either3::Third(PageVisibility::Hidden) => break,
                    Either3::Third(PageVisibility::Visible) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use std::collections::VecDeque;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    struct ScriptedSource {
        responses: VecDeque<Result<TelemetryPayload, &'static str>>,
    }

    impl TelemetrySource for ScriptedSource {
        type Error = &'static str;

        async fn fetch(&mut self) -> Result<TelemetryPayload, Self::Error> {
            self.responses.pop_front().unwrap_or(Err("exhausted"))
        }
    }

    fn scheduler(
        responses: Vec<Result<TelemetryPayload, &'static str>>,
    ) -> PollScheduler<ScriptedSource, FixedClock> {
        PollScheduler::new(
            ScriptedSource {
                responses: responses.into_iter().collect(),
            },
            FixedClock(5_000),
            60_000,
        )
    }

    #[test]
    fn success_stamps_the_sample_with_the_clock() {
        let payload = TelemetryPayload::from_json(
            r#"{ "indoor": { "temperatureC": 20.0, "humidity": 45.0 } }"#,
        )
        .unwrap();
        let mut scheduler = scheduler(vec![Ok(payload)]);

        let event = block_on(scheduler.poll_once());
        let PollEvent::Sample(sample) = event else {
            panic!("expected a sample event");
        };
        assert_eq!(sample.timestamp_ms, 5_000);
        assert_eq!(sample.temperature_c, Some(20.0));
        assert_eq!(scheduler.status(), PollStatus::Ok { at_ms: 5_000 });
    }

    #[test]
    fn failure_is_surfaced_and_then_retried() {
        let payload = TelemetryPayload::default();
        let mut scheduler = scheduler(vec![Err("connection reset"), Ok(payload)]);

        let event = block_on(scheduler.poll_once());
        assert_eq!(event, PollEvent::Failed("connection reset".into()));
        assert_eq!(scheduler.status(), PollStatus::Failed { at_ms: 5_000 });

        // The next cycle runs normally; the failure was not sticky.
        let event = block_on(scheduler.poll_once());
        assert!(matches!(event, PollEvent::Sample(_)));
        assert_eq!(scheduler.status(), PollStatus::Ok { at_ms: 5_000 });
    }
}
