// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The pending-sync ledger.
//!
//! Every dirty sync key carries the revision at which it was last marked.
//! A push captures a [`SyncBatch`] of keys and revisions; acknowledging the
//! batch clears only keys whose revision has not moved since. A key that was
//! marked again while the push was in flight stays pending.

use crate::sync_key::SyncKey;
use std::collections::BTreeMap;

/// The set of sync keys that still need to be pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSyncLedger {
    pending: BTreeMap<SyncKey, u64>,
    revision: u64,
}

/// Keys and revisions captured for one push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncBatch {
    entries: Vec<(SyncKey, u64)>,
}

impl SyncBatch {
    /// The keys in this batch.
    pub fn keys(&self) -> impl Iterator<Item = &SyncKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Number of keys in this batch.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the batch is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PendingSyncLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted keys.
    pub fn from_keys(keys: impl IntoIterator<Item = SyncKey>) -> Self {
        let mut ledger: Self = Self::new();
        for key in keys {
            ledger.mark(key);
        }
        ledger
    }

    /// Marks a key dirty, bumping its revision.
    pub fn mark(&mut self, key: SyncKey) {
        self.revision += 1;
        self.pending.insert(key, self.revision);
    }

    /// Marks several keys dirty.
    pub fn mark_all(&mut self, keys: impl IntoIterator<Item = SyncKey>) {
        for key in keys {
            self.mark(key);
        }
    }

    /// Captures the current pending keys for a push.
    #[must_use]
    pub fn batch(&self) -> SyncBatch {
        SyncBatch {
            entries: self
                .pending
                .iter()
                .map(|(key, revision)| (key.clone(), *revision))
                .collect(),
        }
    }

    /// Clears the keys of a completed push.
    ///
    /// Keys marked again after the batch was taken are kept. Returns the
    /// number of keys cleared.
    pub fn acknowledge(&mut self, batch: &SyncBatch) -> usize {
        let mut cleared: usize = 0;
        for (key, revision) in &batch.entries {
            if self.pending.get(key) == Some(revision) {
                self.pending.remove(key);
                cleared += 1;
            }
        }
        cleared
    }

    /// The pending keys in key order. This is the persisted form.
    #[must_use]
    pub fn keys(&self) -> Vec<SyncKey> {
        self.pending.keys().cloned().collect()
    }

    /// Checks if a key is pending.
    #[must_use]
    pub fn contains(&self, key: &SyncKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Number of pending keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Checks if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
