// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{TEST_HUB, TEST_NODE, create_test_config, create_test_state, create_test_store};
use crate::{
    InMemoryRemote, PupilRecord, RemoteStore, SharedStore, SyncError, SyncEvent, SyncHandle,
    SyncReport, SyncStatus, SyncWorker, pull_remote_state,
};
use schoolhub::{StateStore, SyncKey};
use schoolhub_domain::AppState;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};

const EVENT_WAIT: Duration = Duration::from_secs(5);

async fn next_event(rx: &mut broadcast::Receiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(EVENT_WAIT, rx.recv())
        .await
        .expect("timed out waiting for sync event")
        .expect("event channel closed")
}

/// A remote that edits the document while a push is in flight.
struct EditingRemote {
    inner: InMemoryRemote,
    store: SharedStore,
}

impl RemoteStore for EditingRemote {
    async fn fetch_record(&self, hub_id: &str, node_id: &str) -> Result<Option<Value>, SyncError> {
        self.inner.fetch_record(hub_id, node_id).await
    }

    async fn upsert_record(
        &self,
        hub_id: &str,
        node_id: &str,
        record: Value,
    ) -> Result<(), SyncError> {
        self.store
            .lock()
            .await
            .ledger_mut()
            .mark(SyncKey::roster("Basic 1A"));
        self.inner.upsert_record(hub_id, node_id, record).await
    }

    async fn fetch_pupils(
        &self,
        hub_id: &str,
        node_id: &str,
    ) -> Result<Vec<PupilRecord>, SyncError> {
        self.inner.fetch_pupils(hub_id, node_id).await
    }

    async fn upsert_pupils(
        &self,
        hub_id: &str,
        node_id: &str,
        pupils: Vec<PupilRecord>,
    ) -> Result<(), SyncError> {
        self.inner.upsert_pupils(hub_id, node_id, pupils).await
    }
}

#[tokio::test]
async fn test_flush_pushes_document_and_clears_ledger() {
    let remote: Arc<InMemoryRemote> = Arc::new(InMemoryRemote::new());
    let store: SharedStore = create_test_store();
    let worker: SyncWorker<InMemoryRemote> =
        SyncWorker::new(Arc::clone(&remote), Arc::clone(&store), create_test_config(0));

    let report: SyncReport = worker.flush().await.unwrap();

    assert_eq!(
        report,
        SyncReport {
            pushed: 2,
            cleared: 2,
            remaining: 0
        }
    );
    assert!(store.lock().await.ledger().is_empty());

    let pushed: Value = remote.fetch_record(TEST_HUB, TEST_NODE).await.unwrap().unwrap();
    let expected: Value = serde_json::to_value(create_test_state()).unwrap();
    assert_eq!(pushed, expected);

    let pupils: Vec<PupilRecord> = remote.fetch_pupils(TEST_HUB, TEST_NODE).await.unwrap();
    assert_eq!(pupils.len(), 2);

    let status: SyncStatus = worker.status();
    assert_eq!(status.pushes, 1);
    assert!(status.last_push_at.is_some());
    assert!(status.last_error.is_none());
}

#[tokio::test]
async fn test_flush_with_nothing_pending_skips_remote() {
    let remote: Arc<InMemoryRemote> = Arc::new(InMemoryRemote::new());
    let store: SharedStore = Arc::new(Mutex::new(StateStore::new(create_test_state())));
    let worker: SyncWorker<InMemoryRemote> =
        SyncWorker::new(Arc::clone(&remote), store, create_test_config(0));

    let report: SyncReport = worker.flush().await.unwrap();

    assert_eq!(report, SyncReport::default());
    assert_eq!(remote.record_upserts(), 0);
}

#[tokio::test]
async fn test_failed_flush_keeps_keys_pending() {
    let remote: Arc<InMemoryRemote> = Arc::new(InMemoryRemote::new());
    remote.set_offline(true);
    let store: SharedStore = create_test_store();
    let worker: SyncWorker<InMemoryRemote> =
        SyncWorker::new(Arc::clone(&remote), Arc::clone(&store), create_test_config(0));
    let mut events: broadcast::Receiver<SyncEvent> = worker.subscribe();

    let result: Result<SyncReport, SyncError> = worker.flush().await;

    assert!(matches!(result, Err(SyncError::Unavailable(_))));
    assert_eq!(store.lock().await.ledger().len(), 2);
    assert!(worker.status().last_error.is_some());
    assert!(matches!(
        next_event(&mut events).await,
        SyncEvent::Failed { remaining: 2, .. }
    ));

    remote.set_offline(false);
    let report: SyncReport = worker.flush().await.unwrap();
    assert_eq!(report.remaining, 0);
    assert!(worker.status().last_error.is_none());
}

#[tokio::test]
async fn test_edit_during_push_survives_acknowledgement() {
    let store: SharedStore = create_test_store();
    let remote: Arc<EditingRemote> = Arc::new(EditingRemote {
        inner: InMemoryRemote::new(),
        store: Arc::clone(&store),
    });
    let worker: SyncWorker<EditingRemote> =
        SyncWorker::new(remote, Arc::clone(&store), create_test_config(0));

    let report: SyncReport = worker.flush().await.unwrap();

    assert_eq!(report.cleared, 1);
    assert_eq!(report.remaining, 1);
    let guard = store.lock().await;
    assert!(guard.ledger().contains(&SyncKey::roster("Basic 1A")));
    assert!(!guard.ledger().contains(&SyncKey::Management));
}

#[tokio::test]
async fn test_started_worker_pushes_pending_keys_on_startup() {
    let remote: Arc<InMemoryRemote> = Arc::new(InMemoryRemote::new());
    let store: SharedStore = create_test_store();
    let worker: SyncWorker<InMemoryRemote> =
        SyncWorker::new(Arc::clone(&remote), Arc::clone(&store), create_test_config(10));
    let mut events: broadcast::Receiver<SyncEvent> = worker.subscribe();

    let handle: SyncHandle<InMemoryRemote> = worker.start();

    assert_eq!(
        next_event(&mut events).await,
        SyncEvent::Pushed {
            keys: 2,
            cleared: 2,
            remaining: 0
        }
    );
    assert!(handle.status().running);
    handle.shutdown().await;
}

#[tokio::test]
async fn test_nudges_coalesce_into_one_push() {
    let remote: Arc<InMemoryRemote> = Arc::new(InMemoryRemote::new());
    let store: SharedStore = create_test_store();
    let worker: SyncWorker<InMemoryRemote> =
        SyncWorker::new(Arc::clone(&remote), Arc::clone(&store), create_test_config(50));
    let mut events: broadcast::Receiver<SyncEvent> = worker.subscribe();

    let handle: SyncHandle<InMemoryRemote> = worker.start();
    for _ in 0..5 {
        handle.nudge().unwrap();
    }

    assert!(matches!(
        next_event(&mut events).await,
        SyncEvent::Pushed { .. }
    ));
    handle.shutdown().await;
    assert_eq!(next_event(&mut events).await, SyncEvent::Stopped);
    assert_eq!(remote.record_upserts(), 1);
}

#[tokio::test]
async fn test_shutdown_cancels_pending_push() {
    let remote: Arc<InMemoryRemote> = Arc::new(InMemoryRemote::new());
    let store: SharedStore = create_test_store();
    let worker: SyncWorker<InMemoryRemote> =
        SyncWorker::new(Arc::clone(&remote), Arc::clone(&store), create_test_config(60_000));
    let mut events: broadcast::Receiver<SyncEvent> = worker.subscribe();

    let handle: SyncHandle<InMemoryRemote> = worker.start();
    handle.shutdown().await;

    assert_eq!(next_event(&mut events).await, SyncEvent::Stopped);
    assert_eq!(remote.record_upserts(), 0);
    assert_eq!(store.lock().await.ledger().len(), 2);
}

#[tokio::test]
async fn test_handle_flush_bypasses_delay() {
    let remote: Arc<InMemoryRemote> = Arc::new(InMemoryRemote::new());
    let store: SharedStore = create_test_store();
    let worker: SyncWorker<InMemoryRemote> =
        SyncWorker::new(Arc::clone(&remote), Arc::clone(&store), create_test_config(60_000));

    let handle: SyncHandle<InMemoryRemote> = worker.start();
    let report: SyncReport = handle.flush().await.unwrap();

    assert_eq!(report.cleared, 2);
    assert_eq!(remote.record_upserts(), 1);
    assert!(store.lock().await.ledger().is_empty());
    handle.shutdown().await;
}

#[tokio::test]
async fn test_pull_remote_state_round_trips_document() {
    let remote: InMemoryRemote = InMemoryRemote::new();
    let state: AppState = create_test_state();
    remote
        .upsert_record(TEST_HUB, TEST_NODE, serde_json::to_value(&state).unwrap())
        .await
        .unwrap();

    let pulled: Option<AppState> = pull_remote_state(&remote, TEST_HUB, TEST_NODE).await.unwrap();

    assert_eq!(pulled, Some(state));
}

#[tokio::test]
async fn test_pull_remote_state_missing_record() {
    let remote: InMemoryRemote = InMemoryRemote::new();

    let pulled: Option<AppState> = pull_remote_state(&remote, TEST_HUB, TEST_NODE).await.unwrap();

    assert!(pulled.is_none());
}

#[tokio::test]
async fn test_pull_remote_state_rejects_malformed_record() {
    let remote: InMemoryRemote = InMemoryRemote::new();
    remote
        .upsert_record(TEST_HUB, TEST_NODE, json!({"management": 42}))
        .await
        .unwrap();

    let result: Result<Option<AppState>, SyncError> =
        pull_remote_state(&remote, TEST_HUB, TEST_NODE).await;

    assert!(matches!(result, Err(SyncError::MalformedRecord(_))));
}
