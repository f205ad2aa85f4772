// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The hosted backend a node pushes its document to.
//!
//! A node owns one persistence record (the serialized document) and a set of
//! rows in the shared pupils table, both addressed by `(hub_id, node_id)`.

use crate::error::SyncError;
use schoolhub_domain::{AppState, MasterPupilEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// One row of the remote pupils table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PupilRecord {
    /// The class the pupil is enrolled in.
    pub class_name: String,
    /// Display name.
    pub name: String,
    /// Gender.
    pub gender: String,
    /// Durable student identifier. May be empty for legacy rows.
    pub student_id: String,
}

impl PupilRecord {
    /// Builds a row from a roster entry.
    #[must_use]
    pub fn from_roster(class_name: &str, entry: &MasterPupilEntry) -> Self {
        Self {
            class_name: class_name.to_string(),
            name: entry.name.clone(),
            gender: entry.gender.clone(),
            student_id: entry.student_id.clone(),
        }
    }

    /// Whether two rows address the same pupil.
    ///
    /// Rows match within a class by student id, or by name when either side
    /// has no student id.
    #[must_use]
    pub fn same_pupil(&self, other: &Self) -> bool {
        if self.class_name != other.class_name {
            return false;
        }
        if !self.student_id.is_empty() && !other.student_id.is_empty() {
            return self.student_id == other.student_id;
        }
        self.name == other.name
    }
}

/// Flattens every class roster of a document into pupil rows.
#[must_use]
pub fn pupil_records(state: &AppState) -> Vec<PupilRecord> {
    state
        .management
        .master_pupils
        .iter()
        .flat_map(|(class_name, roster)| {
            roster
                .iter()
                .map(move |entry| PupilRecord::from_roster(class_name, entry))
        })
        .collect()
}

/// Shallow-merges an incoming record into an existing one.
///
/// Top-level fields of `incoming` replace the existing ones; fields it does
/// not carry are kept. Anything other than two JSON objects is a plain
/// replacement.
#[must_use]
pub fn merge_record(existing: Option<Value>, incoming: Value) -> Value {
    match (existing, incoming) {
        (Some(Value::Object(mut base)), Value::Object(update)) => {
            base.extend(update);
            Value::Object(base)
        }
        (_, incoming) => incoming,
    }
}

/// Upserts rows into a pupils table.
///
/// Rows are never removed: a pupil who was migrated or purged keeps their row
/// under the old class. Returns the number of rows that were inserted rather
/// than updated.
pub fn merge_pupils(table: &mut Vec<PupilRecord>, incoming: Vec<PupilRecord>) -> usize {
    let mut inserted: usize = 0;
    for record in incoming {
        match table.iter_mut().find(|existing| existing.same_pupil(&record)) {
            Some(existing) => *existing = record,
            None => {
                table.push(record);
                inserted += 1;
            }
        }
    }
    inserted
}

/// Remote persistence for node documents.
///
/// Upserts are idempotent: pushing the same document twice leaves the remote
/// in the same state as pushing it once.
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetches the persistence record of a node, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn fetch_record(
        &self,
        hub_id: &str,
        node_id: &str,
    ) -> impl Future<Output = Result<Option<Value>, SyncError>> + Send;

    /// Shallow-merges a record into the node's persistence record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or rejects the record.
    fn upsert_record(
        &self,
        hub_id: &str,
        node_id: &str,
        record: Value,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Fetches the node's rows of the pupils table.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn fetch_pupils(
        &self,
        hub_id: &str,
        node_id: &str,
    ) -> impl Future<Output = Result<Vec<PupilRecord>, SyncError>> + Send;

    /// Upserts rows into the node's pupils table.
    ///
    /// Rows missing from `pupils` are left in place, so stale rows of migrated
    /// or purged pupils persist on the remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or rejects the rows.
    fn upsert_pupils(
        &self,
        hub_id: &str,
        node_id: &str,
        pupils: Vec<PupilRecord>,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}

type NodeAddress = (String, String);

fn address(hub_id: &str, node_id: &str) -> NodeAddress {
    (hub_id.to_string(), node_id.to_string())
}

/// A [`RemoteStore`] held in process memory.
///
/// It can be switched offline to exercise failure paths.
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    records: RwLock<BTreeMap<NodeAddress, Value>>,
    pupils: RwLock<BTreeMap<NodeAddress, Vec<PupilRecord>>>,
    offline: AtomicBool,
    record_upserts: AtomicUsize,
}

impl InMemoryRemote {
    /// Creates an empty, reachable remote.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of record upserts accepted so far.
    #[must_use]
    pub fn record_upserts(&self) -> usize {
        self.record_upserts.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Unavailable(String::from(
                "in-memory remote is offline",
            )));
        }
        Ok(())
    }
}

impl RemoteStore for InMemoryRemote {
    async fn fetch_record(&self, hub_id: &str, node_id: &str) -> Result<Option<Value>, SyncError> {
        self.ensure_online()?;
        let records = self.records.read().await;
        Ok(records.get(&address(hub_id, node_id)).cloned())
    }

    async fn upsert_record(
        &self,
        hub_id: &str,
        node_id: &str,
        record: Value,
    ) -> Result<(), SyncError> {
        self.ensure_online()?;
        if !record.is_object() {
            return Err(SyncError::Rejected(String::from(
                "persistence record must be a JSON object",
            )));
        }

        let key: NodeAddress = address(hub_id, node_id);
        let mut records = self.records.write().await;
        let merged: Value = merge_record(records.remove(&key), record);
        records.insert(key, merged);
        self.record_upserts.fetch_add(1, Ordering::SeqCst);
        debug!(hub_id, node_id, "Upserted persistence record");
        Ok(())
    }

    async fn fetch_pupils(
        &self,
        hub_id: &str,
        node_id: &str,
    ) -> Result<Vec<PupilRecord>, SyncError> {
        self.ensure_online()?;
        let pupils = self.pupils.read().await;
        Ok(pupils
            .get(&address(hub_id, node_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_pupils(
        &self,
        hub_id: &str,
        node_id: &str,
        pupils: Vec<PupilRecord>,
    ) -> Result<(), SyncError> {
        self.ensure_online()?;
        let count: usize = pupils.len();
        let mut tables = self.pupils.write().await;
        let table: &mut Vec<PupilRecord> = tables.entry(address(hub_id, node_id)).or_default();
        let inserted: usize = merge_pupils(table, pupils);
        debug!(hub_id, node_id, count, inserted, "Upserted pupil rows");
        Ok(())
    }
}
