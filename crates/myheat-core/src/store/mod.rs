// ── Snapshot store ──
//
// Holds the single latest device snapshot and the outcome of every
// refresh attempt. Readers never block writers.

mod snapshot;
mod snapshot_store;
mod stream;

pub use snapshot::Snapshot;
pub use snapshot_store::{RefreshOutcome, SnapshotStore, UpdateStatus};
pub use stream::{SnapshotStream, SnapshotWatchStream};
