// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Local persistence for a SchoolHub node.
//!
//! The node keeps three things on disk, in one `SQLite` database managed by
//! Diesel:
//!
//! - the application document, as JSON under [`APP_STATE_KEY`],
//! - the pending-sync queue, as a JSON array of keys under [`PENDING_SYNC_KEY`],
//! - an append-only log of audit events.
//!
//! Writes are last-write-wins. There is no history of the document itself.
//!
//! ## Testing
//!
//! Tests use [`Persistence::new_in_memory`], which hands out a uniquely named
//! shared in-memory database per call.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use schoolhub::{PendingSyncLedger, SyncKey};
use schoolhub_audit::AuditEvent;
use schoolhub_domain::AppState;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{APP_STATE_KEY, PENDING_SYNC_KEY};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the document, the pending-sync queue and the audit log.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:schoolhub_memdb_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Document
    // ========================================================================

    /// Saves the whole application document, replacing the previous copy.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_state(&mut self, state: &AppState) -> Result<(), PersistenceError> {
        let payload: String = serde_json::to_string(state)?;
        mutations::write_payload(&mut self.conn, APP_STATE_KEY, &payload)
    }

    /// Loads the application document.
    ///
    /// Returns `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored payload is malformed.
    pub fn load_state(&mut self) -> Result<Option<AppState>, PersistenceError> {
        let Some(payload) = queries::read_payload(&mut self.conn, APP_STATE_KEY)? else {
            debug!("No persisted document found");
            return Ok(None);
        };
        let state: AppState = serde_json::from_str(&payload)?;
        info!(
            classes = state.management.master_pupils.len(),
            staff = state.management.staff.len(),
            "Loaded persisted document"
        );
        Ok(Some(state))
    }

    // ========================================================================
    // Pending-sync queue
    // ========================================================================

    /// Saves the pending-sync queue as an array of keys.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_pending(&mut self, ledger: &PendingSyncLedger) -> Result<(), PersistenceError> {
        let keys: Vec<SyncKey> = ledger.keys();
        let payload: String = serde_json::to_string(&keys)?;
        mutations::write_payload(&mut self.conn, PENDING_SYNC_KEY, &payload)
    }

    /// Loads the pending-sync queue. An absent queue is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or a stored key is malformed.
    pub fn load_pending(&mut self) -> Result<PendingSyncLedger, PersistenceError> {
        let Some(payload) = queries::read_payload(&mut self.conn, PENDING_SYNC_KEY)? else {
            return Ok(PendingSyncLedger::new());
        };
        let raw: Vec<String> = serde_json::from_str(&payload)?;
        let keys: Vec<SyncKey> = raw
            .iter()
            .map(|key| key.parse::<SyncKey>())
            .collect::<Result<_, _>>()?;
        debug!(pending = keys.len(), "Loaded pending-sync queue");
        Ok(PendingSyncLedger::from_keys(keys))
    }

    // ========================================================================
    // Audit log
    // ========================================================================

    /// Persists an audit event.
    ///
    /// # Returns
    ///
    /// The event ID assigned to the persisted audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::persist_audit_event(&mut self.conn, event)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Lists recent audit events, newest first, optionally for one class.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_audit_events(
        &mut self,
        class_name: Option<&str>,
        limit: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::list_audit_events(&mut self.conn, class_name, limit)
    }
}
