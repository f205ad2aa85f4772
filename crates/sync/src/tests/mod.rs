// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod worker_tests;

use crate::{SharedStore, SyncConfig};
use schoolhub::{StateStore, SyncKey};
use schoolhub_domain::{AppState, MasterPupilEntry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const TEST_HUB: &str = "hub-accra";
pub const TEST_NODE: &str = "node-001";

pub fn create_test_state() -> AppState {
    let mut state: AppState = AppState::new();
    state.management_mut().master_pupils.insert(
        String::from("Basic 1A"),
        vec![
            MasterPupilEntry::new("JOHN DOE", "M", "STU-001"),
            MasterPupilEntry::new("AMA", "F", "STU-002"),
        ],
    );
    state
}

pub fn create_test_store() -> SharedStore {
    let mut store: StateStore = StateStore::new(create_test_state());
    store.ledger_mut().mark(SyncKey::Management);
    store.ledger_mut().mark(SyncKey::roster("Basic 1A"));
    Arc::new(Mutex::new(store))
}

pub fn create_test_config(delay_ms: u64) -> SyncConfig {
    SyncConfig {
        hub_id: String::from(TEST_HUB),
        node_id: String::from(TEST_NODE),
        delay: Duration::from_millis(delay_ms),
    }
}
