// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Key/value writes to `local_storage`.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::diesel_schema::local_storage;
use crate::error::PersistenceError;

/// Writes a payload under a storage key, replacing any previous value.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted or the write fails.
pub fn write_payload(
    conn: &mut SqliteConnection,
    storage_key: &str,
    payload: &str,
) -> Result<(), PersistenceError> {
    let updated_at: String = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

    diesel::replace_into(local_storage::table)
        .values((
            local_storage::storage_key.eq(storage_key),
            local_storage::payload.eq(payload),
            local_storage::updated_at.eq(updated_at),
        ))
        .execute(conn)?;

    debug!(storage_key, bytes = payload.len(), "Wrote local storage entry");
    Ok(())
}
