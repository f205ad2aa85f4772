// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

//! Remote collaborators and the background push of the local document.
//!
//! The node is local-first. Every mutation lands in the local store and marks
//! keys in the pending-sync ledger; the [`SyncWorker`] later pushes the whole
//! document to a [`RemoteStore`] and acknowledges the keys it covered.

mod error;
mod identity;
mod remote;
mod worker;

#[cfg(test)]
mod tests;

pub use error::SyncError;
pub use identity::{Identity, IdentityDirectory, InMemoryDirectory};
pub use remote::{
    InMemoryRemote, PupilRecord, RemoteStore, merge_pupils, merge_record, pupil_records,
};
pub use worker::{
    EVENT_BUFFER_SIZE, NUDGE_BUFFER_SIZE, SharedStore, SyncConfig, SyncEvent, SyncHandle,
    SyncReport, SyncStatus, SyncWorker, pull_remote_state,
};
