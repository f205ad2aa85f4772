// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors raised while talking to remote collaborators.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote backend could not be reached.
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
    /// The remote backend refused the payload.
    #[error("Remote store rejected the request: {0}")]
    Rejected(String),
    /// A remote record could not be turned into an application document.
    #[error("Malformed remote record: {0}")]
    MalformedRecord(String),
    /// Serialization of the local document failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The sync worker is no longer running.
    #[error("Sync worker has stopped")]
    WorkerStopped,
}
