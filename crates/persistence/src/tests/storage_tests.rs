// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::create_test_state;
use crate::{Persistence, PersistenceError};
use schoolhub::{PendingSyncLedger, SyncKey};
use schoolhub_domain::AppState;

#[test]
fn test_empty_database_has_no_document() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert_eq!(persistence.load_state().unwrap(), None);
    assert!(persistence.load_pending().unwrap().is_empty());
}

#[test]
fn test_document_survives_save_and_load() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let state: AppState = create_test_state();

    persistence.save_state(&state).unwrap();

    assert_eq!(persistence.load_state().unwrap(), Some(state));
}

#[test]
fn test_last_write_wins() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence.save_state(&create_test_state()).unwrap();

    persistence.save_state(&AppState::new()).unwrap();

    assert_eq!(persistence.load_state().unwrap(), Some(AppState::new()));
}

#[test]
fn test_pending_queue_is_persisted_as_keys() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let mut ledger: PendingSyncLedger = PendingSyncLedger::new();
    ledger.mark(SyncKey::Management);
    ledger.mark(SyncKey::roster("Basic 1A"));

    persistence.save_pending(&ledger).unwrap();
    let restored: PendingSyncLedger = persistence.load_pending().unwrap();

    assert_eq!(restored.keys(), ledger.keys());
}

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first: Persistence = Persistence::new_in_memory().unwrap();
    let mut second: Persistence = Persistence::new_in_memory().unwrap();

    first.save_state(&create_test_state()).unwrap();

    assert_eq!(second.load_state().unwrap(), None);
}

#[test]
fn test_malformed_pending_key_is_reported() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    crate::mutations::write_payload(
        &mut persistence.conn,
        crate::PENDING_SYNC_KEY,
        r#"["management","bogus"]"#,
    )
    .unwrap();

    let result: Result<PendingSyncLedger, PersistenceError> = persistence.load_pending();

    assert!(matches!(
        result,
        Err(PersistenceError::ReconstructionError(_))
    ));
}

#[test]
fn test_malformed_document_is_reported() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    crate::mutations::write_payload(&mut persistence.conn, crate::APP_STATE_KEY, "{not json")
        .unwrap();

    let result: Result<Option<AppState>, PersistenceError> = persistence.load_state();

    assert!(matches!(
        result,
        Err(PersistenceError::SerializationError(_))
    ));
}
