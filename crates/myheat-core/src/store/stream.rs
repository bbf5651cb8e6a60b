// ── Snapshot subscriptions ──

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use arc_swap::ArcSwapOption;
use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::snapshot::Snapshot;
use super::snapshot_store::UpdateStatus;

/// A subscription to refresh completions.
///
/// Every completed refresh attempt, successful or not, wakes the
/// subscriber; the snapshot it sees is the latest successful one.
pub struct SnapshotStream {
    current: Option<Arc<Snapshot>>,
    snapshots: Arc<ArcSwapOption<Snapshot>>,
    receiver: watch::Receiver<UpdateStatus>,
}

impl SnapshotStream {
    pub(crate) fn new(
        snapshots: Arc<ArcSwapOption<Snapshot>>,
        receiver: watch::Receiver<UpdateStatus>,
    ) -> Self {
        let current = snapshots.load_full();
        Self {
            current,
            snapshots,
            receiver,
        }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> Option<&Arc<Snapshot>> {
        self.current.as_ref()
    }

    /// Latest snapshot (may have changed since the last `changed()`).
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.snapshots.load_full()
    }

    pub fn status(&self) -> UpdateStatus {
        self.receiver.borrow().clone()
    }

    /// Wait for the next completed refresh.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<UpdateStatus> {
        self.receiver.changed().await.ok()?;
        let status = self.receiver.borrow_and_update().clone();
        self.current = self.snapshots.load_full();
        Some(status)
    }

    /// Convert into a `Stream` of refresh statuses.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::from_changes(self.receiver),
        }
    }
}

/// `Stream` adapter yielding an [`UpdateStatus`] per completed refresh.
pub struct SnapshotWatchStream {
    inner: WatchStream<UpdateStatus>,
}

impl Stream for SnapshotWatchStream {
    type Item = UpdateStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
