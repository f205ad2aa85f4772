// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Keeps the persisted pending-sync ledger in step with the sync worker.
//!
//! The worker acknowledges keys in memory only. This task listens to its
//! events and writes the ledger back after every successful push, so a
//! restart does not push keys that were already delivered.

use schoolhub_persistence::Persistence;
use schoolhub_sync::{SharedStore, SyncEvent};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Spawns the ledger writer.
///
/// The task ends when the worker reports [`SyncEvent::Stopped`] or the event
/// channel closes.
///
/// # Arguments
///
/// * `events` - A subscription to the worker's events
/// * `store` - The shared state store
/// * `persistence` - The local persistence layer
pub fn spawn(
    mut events: broadcast::Receiver<SyncEvent>,
    store: SharedStore,
    persistence: Arc<Mutex<Persistence>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Ledger writer started");
        loop {
            match events.recv().await {
                Ok(SyncEvent::Pushed { cleared, .. }) if cleared > 0 => {
                    save_ledger(&store, &persistence).await;
                }
                Ok(SyncEvent::Pushed { .. }) => debug!("Push cleared nothing"),
                Ok(SyncEvent::Failed { message, remaining }) => {
                    debug!(%message, remaining, "Push failed, ledger unchanged");
                }
                Ok(SyncEvent::Stopped) => break,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed events may have cleared keys; the current ledger covers them.
                    warn!(skipped, "Ledger writer lagged behind sync events");
                    save_ledger(&store, &persistence).await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        info!("Ledger writer stopped");
    })
}

/// Writes the current ledger.
///
/// The store lock is held across the write so that a concurrent command
/// cannot persist a newer ledger that this write would then overwrite.
async fn save_ledger(store: &SharedStore, persistence: &Arc<Mutex<Persistence>>) {
    let store = store.lock().await;
    let mut persistence = persistence.lock().await;
    match persistence.save_pending(store.ledger()) {
        Ok(()) => debug!(pending = store.ledger().len(), "Saved pending sync ledger"),
        Err(err) => error!(error = %err, "Failed to save pending sync ledger"),
    }
}
