// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Full-document JSON backups.
//!
//! A backup wraps the document with metadata identifying the application,
//! the format version and the exporting node. Restores are all-or-nothing:
//! a file that fails any structural check changes nothing.

use schoolhub_domain::AppState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ApiError;

/// The application name stamped into every backup.
pub const BACKUP_APP_NAME: &str = "schoolhub";
/// The only backup format version this build reads and writes.
pub const BACKUP_FORMAT_VERSION: u32 = 1;

/// Identifies where and when a backup was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    /// Always [`BACKUP_APP_NAME`].
    pub app: String,
    /// Always [`BACKUP_FORMAT_VERSION`] for files written by this build.
    pub format_version: u32,
    /// When the backup was taken (RFC 3339).
    pub exported_at: String,
    /// The node the document came from.
    pub node_id: String,
}

/// A backup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupDocument {
    /// Where and when.
    pub metadata: BackupMetadata,
    /// The full document.
    pub state: AppState,
}

/// Serializes a document into a backup file.
///
/// # Arguments
///
/// * `state` - The document to back up
/// * `node_id` - The exporting node
/// * `exported_at` - The export timestamp
///
/// # Errors
///
/// Returns an error if the timestamp or the document cannot be serialized.
pub fn export_backup(
    state: &AppState,
    node_id: &str,
    exported_at: OffsetDateTime,
) -> Result<String, ApiError> {
    let exported_at: String = exported_at.format(&Rfc3339).map_err(|e| ApiError::Internal {
        message: format!("Failed to format export timestamp: {e}"),
    })?;

    let document: BackupDocument = BackupDocument {
        metadata: BackupMetadata {
            app: String::from(BACKUP_APP_NAME),
            format_version: BACKUP_FORMAT_VERSION,
            exported_at,
            node_id: node_id.to_string(),
        },
        state: state.clone(),
    };

    serde_json::to_string_pretty(&document).map_err(|e| ApiError::Internal {
        message: format!("Failed to serialize backup: {e}"),
    })
}

fn invalid(reason: String) -> ApiError {
    ApiError::InvalidBackup { reason }
}

/// Parses and checks a backup file.
///
/// # Errors
///
/// Returns an error if the content is not JSON, lacks the metadata or state
/// sections, was written by another application, carries another format
/// version, or holds a document that does not deserialize.
pub fn parse_backup(content: &str) -> Result<BackupDocument, ApiError> {
    let raw: Value =
        serde_json::from_str(content).map_err(|e| invalid(format!("Malformed JSON: {e}")))?;

    let metadata: &Value = raw
        .get("metadata")
        .ok_or_else(|| invalid(String::from("Missing 'metadata' section")))?;
    if raw.get("state").is_none() {
        return Err(invalid(String::from("Missing 'state' section")));
    }

    let app: Option<&str> = metadata.get("app").and_then(Value::as_str);
    if app != Some(BACKUP_APP_NAME) {
        return Err(invalid(format!(
            "Backup was not written by {BACKUP_APP_NAME} (app: {})",
            app.unwrap_or("<missing>")
        )));
    }

    let version: Option<u64> = metadata.get("formatVersion").and_then(Value::as_u64);
    if version != Some(u64::from(BACKUP_FORMAT_VERSION)) {
        return Err(invalid(format!(
            "Unsupported format version {} (expected {BACKUP_FORMAT_VERSION})",
            version.map_or_else(|| String::from("<missing>"), |v| v.to_string())
        )));
    }

    serde_json::from_value(raw).map_err(|e| invalid(format!("Backup content is invalid: {e}")))
}
