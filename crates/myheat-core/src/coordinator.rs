// ── Polling coordinator ──
//
// Owns the device snapshot for one entry. A single background task asks
// for `getDeviceInfo` once per scan interval; writers ask for a forced
// refresh after a successful command. At most one request is in flight:
// callers arriving while one runs wait for it and share its outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use myheat_api::{ErrorKind, MhClient};

use crate::error::CoreError;
use crate::store::{RefreshOutcome, Snapshot, SnapshotStore, SnapshotStream, UpdateStatus};

// ── CoordinatorState ─────────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CoordinatorState {
    /// Created, first refresh not yet attempted.
    Uninitialized,
    /// First refresh succeeded. Later failures do not leave this state.
    Ready,
    /// First refresh failed; the host may call `setup()` again.
    SetupFailed,
    /// Shut down. No further requests are made.
    Unloaded,
}

// ── Coordinator ──────────────────────────────────────────────────────

/// Cheaply cloneable handle to one device's polling loop and snapshot.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    client: MhClient,
    scan_interval: Duration,
    store: SnapshotStore,
    state: watch::Sender<CoordinatorState>,
    refresh_lock: Mutex<()>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator. Makes no request until [`setup()`](Self::setup).
    pub fn new(client: MhClient, scan_interval: Duration) -> Self {
        let (state, _) = watch::channel(CoordinatorState::Uninitialized);
        Self {
            inner: Arc::new(CoordinatorInner {
                client,
                scan_interval,
                store: SnapshotStore::new(),
                state,
                refresh_lock: Mutex::new(()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Perform the first refresh.
    ///
    /// On failure the coordinator moves to [`CoordinatorState::SetupFailed`]
    /// and returns [`CoreError::NotReady`]; calling `setup()` again retries.
    pub async fn setup(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Unloaded);
        }

        match self.refresh().await {
            RefreshOutcome::Success => {
                self.inner.state.send_replace(CoordinatorState::Ready);
                info!(device_id = self.inner.client.device_id(), "coordinator ready");
                Ok(())
            }
            RefreshOutcome::Failed { kind, message } => {
                self.inner.state.send_replace(CoordinatorState::SetupFailed);
                warn!(device_id = self.inner.client.device_id(), %kind, "setup failed, device not ready");
                Err(CoreError::NotReady {
                    kind,
                    reason: message,
                })
            }
        }
    }

    /// Spawn the periodic refresh task.
    pub async fn start(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        let handle = tokio::spawn(refresh_task(
            self.clone(),
            self.inner.scan_interval,
            self.inner.cancel.clone(),
        ));
        self.inner.task_handles.lock().await.push(handle);
        debug!(interval_secs = self.inner.scan_interval.as_secs(), "refresh task started");
    }

    /// Stop polling and wait for background tasks to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.state.send_replace(CoordinatorState::Unloaded);
        debug!("coordinator unloaded");
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch a fresh snapshot, or join the fetch already in flight.
    ///
    /// Failures are recorded in the update status and returned as an
    /// outcome; the previous snapshot stays in place.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self.inner.cancel.is_cancelled() {
            return RefreshOutcome::Failed {
                kind: ErrorKind::Unknown,
                message: CoreError::Unloaded.to_string(),
            };
        }

        let seen = self.inner.store.sequence();
        let _guard = self.inner.refresh_lock.lock().await;

        let status = self.inner.store.status();
        if status.sequence != seen {
            if let Some(outcome) = status.outcome {
                debug!("refresh joined the one already in flight");
                return outcome;
            }
        }

        let started = Instant::now();
        let result = self.inner.client.get_device_info(None).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(info) => {
                self.inner.store.publish(Snapshot::new(info));
                debug!(elapsed_secs = elapsed, success = true, "finished fetching device info");
                RefreshOutcome::Success
            }
            Err(e) => {
                let kind = e.kind();
                let message = e.to_string();
                warn!(elapsed_secs = elapsed, %kind, error = %message, "device refresh failed");
                self.inner.store.record_failure(kind, message.clone());
                RefreshOutcome::Failed { kind, message }
            }
        }
    }

    /// Forced refresh, used after a successful write.
    pub async fn request_refresh(&self) -> RefreshOutcome {
        debug!("refresh requested");
        self.refresh().await
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn client(&self) -> &MhClient {
        &self.inner.client
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.inner.store
    }

    /// The latest successful snapshot.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.store.snapshot()
    }

    pub fn status(&self) -> UpdateStatus {
        self.inner.store.status()
    }

    pub fn last_update_success(&self) -> bool {
        self.inner.store.last_update_success()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    pub fn state(&self) -> CoordinatorState {
        *self.inner.state.borrow()
    }

    pub fn state_changes(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    pub fn scan_interval(&self) -> Duration {
        self.inner.scan_interval
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                // Outcome is already logged and recorded in the store.
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = coordinator.refresh() => {}
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use myheat_api::Credentials;
    use url::Url;

    fn coordinator() -> Coordinator {
        let client = MhClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/api/request/").unwrap(),
            Credentials::new("user", "key".to_string().into(), 12),
            Duration::from_secs(1),
        );
        Coordinator::new(client, Duration::from_secs(30))
    }

    #[test]
    fn new_coordinator_is_uninitialized() {
        let coordinator = coordinator();
        assert_eq!(coordinator.state(), CoordinatorState::Uninitialized);
        assert!(coordinator.snapshot().is_none());
        assert_eq!(coordinator.status().sequence, 0);
    }

    #[tokio::test]
    async fn shutdown_stops_refreshing() {
        let coordinator = coordinator();
        coordinator.shutdown().await;

        assert_eq!(coordinator.state(), CoordinatorState::Unloaded);
        let outcome = coordinator.refresh().await;
        assert!(!outcome.is_success());
        assert_eq!(coordinator.status().sequence, 0);
        assert!(matches!(coordinator.setup().await, Err(CoreError::Unloaded)));
    }
}
