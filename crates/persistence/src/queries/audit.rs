// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use schoolhub_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for full audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventFullRow {
    event_id: i64,
    class_name: Option<String>,
    #[allow(dead_code)]
    action_name: String,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    #[allow(dead_code)]
    created_at: Option<String>,
}

impl AuditEventFullRow {
    fn into_event(self) -> Result<AuditEvent, PersistenceError> {
        let actor_data: ActorData = serde_json::from_str(&self.actor_json)?;
        let cause_data: CauseData = serde_json::from_str(&self.cause_json)?;
        let action_data: ActionData = serde_json::from_str(&self.action_json)?;
        let before_data: StateSnapshotData = serde_json::from_str(&self.before_snapshot_json)?;
        let after_data: StateSnapshotData = serde_json::from_str(&self.after_snapshot_json)?;

        let actor: Actor = Actor::new(actor_data.id, actor_data.actor_type);
        let cause: Cause = Cause::new(cause_data.id, cause_data.description);
        let action: Action = Action::new(action_data.name, action_data.details);
        let before: StateSnapshot = StateSnapshot::new(before_data.data);
        let after: StateSnapshot = StateSnapshot::new(after_data.data);

        let event: AuditEvent = match self.class_name {
            Some(class_name) => AuditEvent::new(actor, cause, action, before, after, class_name),
            None => AuditEvent::school_wide(actor, cause, action, before, after),
        };
        Ok(event.with_id(self.event_id))
    }
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns an error if the event is not found or cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let result: Result<AuditEventFullRow, diesel::result::Error> = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventFullRow::as_select())
        .first::<AuditEventFullRow>(conn);

    match result {
        Ok(row) => row.into_event(),
        Err(diesel::result::Error::NotFound) => Err(PersistenceError::EventNotFound(event_id)),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves the most recent audit events, newest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `class_name` - Restrict to events scoped to this class
/// * `limit` - Maximum number of events
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be deserialized.
pub fn list_audit_events(
    conn: &mut SqliteConnection,
    class_name: Option<&str>,
    limit: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let mut query = audit_events::table
        .select(AuditEventFullRow::as_select())
        .order(audit_events::event_id.desc())
        .limit(limit)
        .into_boxed();
    if let Some(class_name) = class_name {
        query = query.filter(audit_events::class_name.eq(class_name));
    }

    query
        .load::<AuditEventFullRow>(conn)?
        .into_iter()
        .map(AuditEventFullRow::into_event)
        .collect()
}
