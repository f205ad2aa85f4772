// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background push of the local document to the remote store.
//!
//! # Lifecycle
//!
//! - The worker does nothing until [`SyncWorker::start`] spawns it
//! - Each nudge arms a debounce timer; nudges arriving meanwhile coalesce
//! - When the timer fires the whole current document is pushed
//! - Keys captured before the push are acknowledged only on success
//! - [`SyncHandle::shutdown`] cancels a pending timer and stops the task
//!
//! There is no retry loop. A failed push leaves its keys in the ledger and
//! the next nudge tries again.

use crate::error::SyncError;
use crate::remote::{RemoteStore, pupil_records};
use schoolhub::{StateStore, SyncBatch};
use schoolhub_domain::AppState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capacity of the sync event channel.
pub const EVENT_BUFFER_SIZE: usize = 100;
/// Capacity of the nudge channel. Extra nudges are redundant and dropped.
pub const NUDGE_BUFFER_SIZE: usize = 16;

/// The single-writer store shared between request handlers and the worker.
pub type SharedStore = Arc<Mutex<StateStore>>;

/// Where and how often to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// The hub the node is registered under.
    pub hub_id: String,
    /// The node whose document is pushed.
    pub node_id: String,
    /// Quiet period between the last nudge and the push.
    pub delay: Duration,
}

/// Notifications about sync activity.
///
/// Events are informational. The ledger stays the source of truth for what
/// still needs pushing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A push succeeded.
    Pushed {
        /// Keys in the pushed batch.
        keys: usize,
        /// Keys cleared from the ledger.
        cleared: usize,
        /// Keys still pending afterwards.
        remaining: usize,
    },
    /// A push failed and its keys stayed pending.
    Failed {
        /// The failure, rendered for display.
        message: String,
        /// Keys still pending.
        remaining: usize,
    },
    /// The worker stopped.
    Stopped,
}

/// The outcome of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Keys in the pushed batch.
    pub pushed: usize,
    /// Keys cleared from the ledger.
    pub cleared: usize,
    /// Keys still pending afterwards.
    pub remaining: usize,
}

/// A running summary of the worker's activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// Whether the background task is running.
    pub running: bool,
    /// Successful pushes so far.
    pub pushes: u64,
    /// When the last successful push finished (RFC 3339).
    pub last_push_at: Option<String>,
    /// The error of the most recent push, cleared by the next success.
    pub last_error: Option<String>,
}

/// Pushes the local document to a [`RemoteStore`].
pub struct SyncWorker<R: RemoteStore> {
    remote: Arc<R>,
    store: SharedStore,
    config: SyncConfig,
    events: broadcast::Sender<SyncEvent>,
    status: Arc<watch::Sender<SyncStatus>>,
}

impl<R: RemoteStore> Clone for SyncWorker<R> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            events: self.events.clone(),
            status: Arc::clone(&self.status),
        }
    }
}

impl<R: RemoteStore> SyncWorker<R> {
    /// Creates a worker. Nothing runs until [`Self::start`] is called.
    ///
    /// # Arguments
    ///
    /// * `remote` - The remote store to push to
    /// * `store` - The shared state store
    /// * `config` - Node address and debounce delay
    #[must_use]
    pub fn new(remote: Arc<R>, store: SharedStore, config: SyncConfig) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        let (status, _rx) = watch::channel(SyncStatus::default());
        Self {
            remote,
            store,
            config,
            events,
            status: Arc::new(status),
        }
    }

    /// Subscribes to sync events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Pushes the current document if anything is pending.
    ///
    /// The store lock is not held while the remote call is in flight, so
    /// edits made meanwhile stay pending after acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the remote call fails. The
    /// pending keys are left in the ledger.
    pub async fn flush(&self) -> Result<SyncReport, SyncError> {
        let (state, batch): (Arc<AppState>, SyncBatch) = {
            let store = self.store.lock().await;
            (store.snapshot(), store.ledger().batch())
        };

        if batch.is_empty() {
            debug!("Nothing pending, skipping push");
            return Ok(SyncReport::default());
        }

        if let Err(err) = self.push(&state).await {
            let remaining: usize = self.store.lock().await.ledger().len();
            warn!(error = %err, remaining, "Sync push failed");
            self.status.send_modify(|status| {
                status.last_error = Some(err.to_string());
            });
            self.broadcast(SyncEvent::Failed {
                message: err.to_string(),
                remaining,
            });
            return Err(err);
        }

        let (cleared, remaining): (usize, usize) = {
            let mut store = self.store.lock().await;
            let cleared: usize = store.ledger_mut().acknowledge(&batch);
            (cleared, store.ledger().len())
        };

        info!(
            keys = batch.len(),
            cleared,
            remaining,
            hub_id = %self.config.hub_id,
            node_id = %self.config.node_id,
            "Pushed document to remote store"
        );
        let finished_at: Option<String> = OffsetDateTime::now_utc().format(&Rfc3339).ok();
        self.status.send_modify(|status| {
            status.pushes += 1;
            status.last_push_at = finished_at;
            status.last_error = None;
        });
        self.broadcast(SyncEvent::Pushed {
            keys: batch.len(),
            cleared,
            remaining,
        });

        Ok(SyncReport {
            pushed: batch.len(),
            cleared,
            remaining,
        })
    }

    /// Spawns the background task.
    ///
    /// An initial nudge is queued so keys left pending by a previous run are
    /// pushed without waiting for the next mutation.
    #[must_use]
    pub fn start(self) -> SyncHandle<R> {
        let (nudge_tx, nudge_rx) = mpsc::channel(NUDGE_BUFFER_SIZE);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        // The receiver is owned locally, so the channel cannot be closed yet.
        let _ = nudge_tx.try_send(());

        self.status.send_modify(|status| status.running = true);
        info!(
            delay_ms = self.config.delay.as_millis(),
            node_id = %self.config.node_id,
            "Starting sync worker"
        );

        let worker: Self = self.clone();
        let task: JoinHandle<()> = tokio::spawn(async move {
            worker.run(nudge_rx, shutdown_rx).await;
        });

        SyncHandle {
            worker: self,
            nudges: nudge_tx,
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run(self, mut nudges: mpsc::Receiver<()>, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                nudge = nudges.recv() => {
                    if nudge.is_none() {
                        break;
                    }
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        () = tokio::time::sleep(self.config.delay) => {}
                    }
                    while nudges.try_recv().is_ok() {}
                    // Failures are reported through events and status.
                    let _ = self.flush().await;
                }
            }
        }

        self.status.send_modify(|status| status.running = false);
        self.broadcast(SyncEvent::Stopped);
        info!("Sync worker stopped");
    }

    async fn push(&self, state: &AppState) -> Result<(), SyncError> {
        let record: Value = serde_json::to_value(state)?;
        self.remote
            .upsert_record(&self.config.hub_id, &self.config.node_id, record)
            .await?;
        self.remote
            .upsert_pupils(
                &self.config.hub_id,
                &self.config.node_id,
                pupil_records(state),
            )
            .await
    }

    fn broadcast(&self, event: SyncEvent) {
        match self.events.send(event) {
            Ok(count) => debug!(receivers = count, "Broadcast sync event"),
            Err(_) => debug!("No receivers for sync event"),
        }
    }
}

/// Controls a started [`SyncWorker`].
pub struct SyncHandle<R: RemoteStore> {
    worker: SyncWorker<R>,
    nudges: mpsc::Sender<()>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl<R: RemoteStore> SyncHandle<R> {
    /// Asks the worker to push after the debounce delay.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker has stopped.
    pub fn nudge(&self) -> Result<(), SyncError> {
        match self.nudges.try_send(()) {
            // A full queue already guarantees a push.
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(())) => Err(SyncError::WorkerStopped),
        }
    }

    /// Pushes immediately, bypassing the debounce delay.
    ///
    /// # Errors
    ///
    /// Returns an error if the push fails.
    pub async fn flush(&self) -> Result<SyncReport, SyncError> {
        self.worker.flush().await
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.worker.status()
    }

    /// Subscribes to sync events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.worker.subscribe()
    }

    /// Cancels any pending push and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "Sync worker task ended abnormally");
        }
    }
}

/// Fetches a node's document from the remote store.
///
/// Used to seed a node that has no local document yet.
///
/// # Errors
///
/// Returns an error if the remote call fails or the stored record is not a
/// valid document.
pub async fn pull_remote_state<R: RemoteStore>(
    remote: &R,
    hub_id: &str,
    node_id: &str,
) -> Result<Option<AppState>, SyncError> {
    let Some(record) = remote.fetch_record(hub_id, node_id).await? else {
        return Ok(None);
    };
    let state: AppState = serde_json::from_value(record)
        .map_err(|err| SyncError::MalformedRecord(err.to_string()))?;
    info!(hub_id, node_id, "Pulled document from remote store");
    Ok(Some(state))
}
