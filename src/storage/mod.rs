//! Sample retention and persistence.
//!
//! [`history`] owns the in-memory ring of telemetry samples with its
//! age/count retention policy; [`persist`] maps snapshots of that ring (and
//! the legend visibility flags) onto a key/value store as tolerant JSON.

pub mod history;
pub mod persist;

pub use history::{RetentionPolicy, SampleStore};
pub use persist::{HISTORY_KEY, KvStore, MemoryStore, PersistError, VISIBILITY_KEY};
