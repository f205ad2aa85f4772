// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_key;
use crate::{PendingSyncLedger, SyncBatch, SyncKey};
use schoolhub_domain::WorkCategory;

#[test]
fn test_mark_is_idempotent_per_key() {
    let mut ledger: PendingSyncLedger = PendingSyncLedger::new();

    ledger.mark(SyncKey::Management);
    ledger.mark(SyncKey::Management);

    assert_eq!(ledger.len(), 1);
    assert!(ledger.contains(&SyncKey::Management));
}

#[test]
fn test_acknowledge_clears_pushed_keys() {
    let mut ledger: PendingSyncLedger = PendingSyncLedger::new();
    ledger.mark(SyncKey::Management);
    ledger.mark(SyncKey::roster("Basic 1A"));

    let batch: SyncBatch = ledger.batch();
    let cleared: usize = ledger.acknowledge(&batch);

    assert_eq!(cleared, 2);
    assert!(ledger.is_empty());
}

#[test]
fn test_edit_during_push_survives_acknowledgement() {
    let mut ledger: PendingSyncLedger = PendingSyncLedger::new();
    let key: SyncKey =
        SyncKey::assessment(WorkCategory::ClassWork, &create_test_key("Basic 1A", "Math"));
    ledger.mark(key.clone());
    ledger.mark(SyncKey::Management);

    let batch: SyncBatch = ledger.batch();
    // Edited again while the push is in flight.
    ledger.mark(key.clone());
    let cleared: usize = ledger.acknowledge(&batch);

    assert_eq!(cleared, 1);
    assert!(ledger.contains(&key));
    assert!(!ledger.contains(&SyncKey::Management));
}

#[test]
fn test_keys_marked_after_batch_are_not_in_it() {
    let mut ledger: PendingSyncLedger = PendingSyncLedger::new();
    ledger.mark(SyncKey::Management);

    let batch: SyncBatch = ledger.batch();
    ledger.mark(SyncKey::roster("Basic 1B"));
    ledger.acknowledge(&batch);

    assert_eq!(batch.len(), 1);
    assert_eq!(ledger.keys(), vec![SyncKey::roster("Basic 1B")]);
}

#[test]
fn test_from_keys_restores_persisted_ledger() {
    let keys: Vec<SyncKey> = vec![SyncKey::Management, SyncKey::roster("Basic 1A")];

    let ledger: PendingSyncLedger = PendingSyncLedger::from_keys(keys.clone());

    assert_eq!(ledger.keys(), keys);
}

#[test]
fn test_empty_batch() {
    let mut ledger: PendingSyncLedger = PendingSyncLedger::new();

    let batch: SyncBatch = ledger.batch();

    assert!(batch.is_empty());
    assert_eq!(ledger.acknowledge(&batch), 0);
}
