// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::diesel_schema::local_storage;
use crate::error::PersistenceError;

/// Reads the payload stored under a key, if any.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn read_payload(
    conn: &mut SqliteConnection,
    storage_key: &str,
) -> Result<Option<String>, PersistenceError> {
    Ok(local_storage::table
        .filter(local_storage::storage_key.eq(storage_key))
        .select(local_storage::payload)
        .first::<String>(conn)
        .optional()?)
}
