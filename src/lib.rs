#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod chart;
pub mod clock;
pub mod config;
pub mod engine;
pub mod poll;
pub mod sample;
pub mod storage;
pub mod visibility;

pub use chart::{Chart, ChartKind, ChartState, ProjectionFrame, TooltipContent};
pub use clock::{Clock, SystemClock};
pub use config::EngineConfig;
pub use engine::DashboardEngine;
pub use poll::{PageVisibility, PollEvent, PollScheduler, PollStatus, TelemetrySource};
pub use sample::{Sample, SeriesKey, TelemetryPayload};
pub use storage::{KvStore, MemoryStore, SampleStore};
pub use visibility::VisibilityController;
