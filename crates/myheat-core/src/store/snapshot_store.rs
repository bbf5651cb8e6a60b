use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use myheat_api::ErrorKind;

use super::snapshot::Snapshot;
use super::stream::SnapshotStream;

/// Result of one completed refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Success,
    Failed { kind: ErrorKind, message: String },
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Broadcast after every completed refresh attempt.
///
/// `sequence` counts completed attempts, successful or not, starting at 0
/// before the first one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateStatus {
    pub sequence: u64,
    pub outcome: Option<RefreshOutcome>,
    pub at: Option<DateTime<Utc>>,
}

impl UpdateStatus {
    pub fn last_update_success(&self) -> bool {
        self.outcome.as_ref().is_some_and(RefreshOutcome::is_success)
    }
}

/// Latest snapshot plus refresh status, shared by the coordinator and
/// every entity view.
///
/// A failed refresh leaves the previous snapshot in place; only its status
/// is published.
pub struct SnapshotStore {
    current: Arc<ArcSwapOption<Snapshot>>,
    status: watch::Sender<UpdateStatus>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (status, _) = watch::channel(UpdateStatus::default());
        Self {
            current: Arc::new(ArcSwapOption::empty()),
            status,
        }
    }

    // ── Readers ──────────────────────────────────────────────────────

    /// The latest successful snapshot, if any refresh has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    pub fn status(&self) -> UpdateStatus {
        self.status.borrow().clone()
    }

    /// Number of completed refresh attempts.
    pub fn sequence(&self) -> u64 {
        self.status.borrow().sequence
    }

    pub fn last_update_success(&self) -> bool {
        self.status.borrow().last_update_success()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(Arc::clone(&self.current), self.status.subscribe())
    }

    // ── Writers ──────────────────────────────────────────────────────

    /// Replace the snapshot and notify subscribers.
    pub(crate) fn publish(&self, snapshot: Snapshot) {
        self.current.store(Some(Arc::new(snapshot)));
        self.complete(RefreshOutcome::Success);
    }

    /// Record a failed attempt, keeping the previous snapshot.
    pub(crate) fn record_failure(&self, kind: ErrorKind, message: String) {
        self.complete(RefreshOutcome::Failed { kind, message });
    }

    fn complete(&self, outcome: RefreshOutcome) {
        self.status.send_modify(|status| {
            status.sequence += 1;
            status.outcome = Some(outcome);
            status.at = Some(Utc::now());
        });
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
