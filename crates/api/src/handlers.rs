// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.

use schoolhub::{Command, StateStore};
use schoolhub_audit::{Action, AuditEvent, Cause, StateSnapshot};
use schoolhub_domain::{
    AppState, AssessmentData, AssessmentKey, BonusPolicy, ClassOutcome, CorrectionStatus,
    DomainError, DutyMapping, ExerciseMeta, MasterPupilEntry, NodeStatus, PupilRef,
    RewardReport, SchoolNode, SchoolSettings, Skill, Staff, StaffRole, WeeklyMapping,
    WorkCategory, class_outcome, compute_reward_metrics, outcome_report, validate_class_name,
};
use schoolhub_persistence::Persistence;
use schoolhub_sync::{Identity, IdentityDirectory, SyncStatus};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::backup::{BackupDocument, export_backup, parse_backup};
use crate::csv_roster::{CsvPreviewResult, CsvRowResult, export_roster_csv, preview_roster_csv};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
    translate_sync_error,
};
use crate::request_response::{
    AddInterventionRequest, AddStaffRequest, AddSubjectRequest, AssessmentLocator,
    AssignDutyRequest, AuditEventInfo, CommandResponse, ComputeRewardsRequest,
    DecommissionNodeRequest, EnrollPupilRequest, ImportRosterCsvRequest, ImportRosterCsvResponse,
    ListAuditEventsResponse, ListRosterResponse, MigratePupilRequest, OutcomeReportResponse,
    PreviewRosterCsvRequest, ProvisionNodeRequest, PurgePupilRequest, RecordScoreRequest,
    RemoveStaffRequest, RestoreBackupRequest, SetCorrectionStatusRequest, SetExerciseRequest,
    SyncStatusResponse, UpdateSettingsRequest, UpsertWeeklyPlanRequest, VerifyIdentityRequest,
    VerifyIdentityResponse,
};

/// Upper bound on audit events returned by one listing.
const MAX_AUDIT_EVENTS: i64 = 500;

/// The result of an API operation that includes both the response and the audit event.
///
/// This ensures that successful API operations always produce an audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResult<T> {
    /// The API response.
    pub response: T,
    /// The audit event generated by this operation.
    pub audit_event: AuditEvent,
}

// ============================================================================
// Shared helpers
// ============================================================================

fn parse_locator(locator: &AssessmentLocator) -> Result<(WorkCategory, AssessmentKey), ApiError> {
    let category: WorkCategory = locator.category.parse().map_err(translate_domain_error)?;
    let key: AssessmentKey = locator.key.parse().map_err(translate_domain_error)?;
    Ok((category, key))
}

/// A pupil edit needs either a stored document or a roster to derive one from.
fn ensure_assessment_reachable(
    state: &AppState,
    category: WorkCategory,
    key: &AssessmentKey,
) -> Result<(), ApiError> {
    if state.assessment(category, key).is_some()
        || !state.management.roster(key.class_name()).is_empty()
    {
        return Ok(());
    }
    Err(translate_domain_error(DomainError::AssessmentNotFound {
        category: category.to_string(),
        key: key.to_string(),
    }))
}

/// Executes a command against the store and wraps the outcome.
fn execute(
    store: &mut StateStore,
    command: Command,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    let action: &'static str = command.name();
    let audit_event: AuditEvent = store
        .execute(command, authenticated_actor.to_audit_actor(), cause)
        .map_err(translate_core_error)?;

    debug!(
        action,
        actor = %authenticated_actor.id,
        pending = store.ledger().len(),
        "Command applied"
    );

    let message: String = audit_event
        .action
        .details
        .clone()
        .unwrap_or_else(|| format!("{action} applied"));

    Ok(ApiResult {
        response: CommandResponse {
            action: action.to_string(),
            message,
            event_id: None,
        },
        audit_event,
    })
}

fn format_timestamp(at: OffsetDateTime) -> Result<String, ApiError> {
    at.format(&Rfc3339).map_err(|e| ApiError::Internal {
        message: format!("Failed to format timestamp: {e}"),
    })
}

fn summarize_document(state: &AppState) -> String {
    let documents: usize = WorkCategory::ALL
        .iter()
        .map(|category| state.book(*category).len())
        .sum();
    format!(
        "classes={},staff={},documents={}",
        state.management.master_pupils.len(),
        state.management.staff.len(),
        documents
    )
}

/// Saves the store and the audit event of a committed transition.
///
/// # Returns
///
/// The id assigned to the persisted audit event.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn persist_commit(
    persistence: &mut Persistence,
    store: &StateStore,
    audit_event: &AuditEvent,
) -> Result<i64, ApiError> {
    persistence
        .save_state(store.current())
        .map_err(|e| translate_persistence_error(&e))?;
    persistence
        .save_pending(store.ledger())
        .map_err(|e| translate_persistence_error(&e))?;
    persistence
        .persist_audit_event(audit_event)
        .map_err(|e| translate_persistence_error(&e))
}

// ============================================================================
// Assessment work
// ============================================================================

/// Records or clears one pupil's score.
///
/// # Arguments
///
/// * `store` - The state store
/// * `request` - The score to record
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The category, key or pupil selector is invalid
/// - The document does not exist and the class has no roster to derive it from
/// - The pupil is not in the document
/// - The value is neither empty nor numeric
pub fn record_score(
    store: &mut StateStore,
    request: RecordScoreRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_record_work(authenticated_actor)?;

    let (category, key): (WorkCategory, AssessmentKey) = parse_locator(&request.locator)?;
    ensure_assessment_reachable(store.current(), category, &key)?;
    let pupil: PupilRef = request.pupil.to_pupil_ref()?;

    let command: Command = Command::RecordScore {
        category,
        key,
        pupil,
        exercise: request.exercise,
        value: request.value,
    };
    execute(store, command, authenticated_actor, cause)
}

/// Sets the facilitator and an exercise's metadata on a document.
///
/// Creates the document if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the category, key, exercise number or max score is
/// invalid.
pub fn set_exercise(
    store: &mut StateStore,
    request: SetExerciseRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_record_work(authenticated_actor)?;

    let (category, key): (WorkCategory, AssessmentKey) = parse_locator(&request.locator)?;
    let command: Command = Command::SetExercise {
        category,
        key,
        facilitator: request.facilitator,
        exercise: request.exercise,
        meta: ExerciseMeta {
            max_score: request.max_score,
            date: request.date,
            indicators: request.indicators,
        },
    };
    execute(store, command, authenticated_actor, cause)
}

/// Appends an intervention note to a pupil's record.
///
/// # Errors
///
/// Returns an error if the document or pupil cannot be found.
pub fn add_intervention(
    store: &mut StateStore,
    request: AddInterventionRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_record_work(authenticated_actor)?;

    let (category, key): (WorkCategory, AssessmentKey) = parse_locator(&request.locator)?;
    ensure_assessment_reachable(store.current(), category, &key)?;
    let pupil: PupilRef = request.pupil.to_pupil_ref()?;

    if request.note.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("note"),
            message: String::from("Intervention note cannot be empty"),
        });
    }

    let command: Command = Command::AddIntervention {
        category,
        key,
        pupil,
        date: request.date,
        note: request.note,
    };
    execute(store, command, authenticated_actor, cause)
}

/// Sets correction tracking for one exercise of a pupil.
///
/// # Errors
///
/// Returns an error if the document or pupil cannot be found or the exercise
/// number is invalid.
pub fn set_correction_status(
    store: &mut StateStore,
    request: &SetCorrectionStatusRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_record_work(authenticated_actor)?;

    let (category, key): (WorkCategory, AssessmentKey) = parse_locator(&request.locator)?;
    ensure_assessment_reachable(store.current(), category, &key)?;
    let pupil: PupilRef = request.pupil.to_pupil_ref()?;

    let command: Command = Command::SetCorrectionStatus {
        category,
        key,
        pupil,
        exercise: request.exercise,
        status: CorrectionStatus {
            done: request.done,
            marked: request.marked,
        },
    };
    execute(store, command, authenticated_actor, cause)
}

/// Returns a document with its pupil list derived from the class roster.
///
/// # Errors
///
/// Returns an error if the locator is invalid or neither the document nor a
/// roster for its class exists.
pub fn get_assessment(
    state: &AppState,
    locator: &AssessmentLocator,
) -> Result<AssessmentData, ApiError> {
    let (category, key): (WorkCategory, AssessmentKey) = parse_locator(locator)?;
    ensure_assessment_reachable(state, category, &key)?;
    Ok(state.synced_assessment(category, &key))
}

// ============================================================================
// Rosters
// ============================================================================

/// Adds a pupil to a class roster.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the entry is invalid, or
/// the pupil is already on the roster.
pub fn enroll_pupil(
    store: &mut StateStore,
    request: EnrollPupilRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_roster(authenticated_actor)?;

    let command: Command = Command::EnrollPupil {
        class_name: request.class_name,
        entry: MasterPupilEntry::new(
            request.name.trim(),
            request.gender.trim(),
            request.student_id.trim(),
        ),
    };
    execute(store, command, authenticated_actor, cause)
}

/// Previews a roster CSV upload without changing anything.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the CSV fails the
/// structural check.
pub fn preview_roster_import(
    state: &AppState,
    request: &PreviewRosterCsvRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CsvPreviewResult, ApiError> {
    AuthorizationService::authorize_manage_roster(authenticated_actor)?;
    preview_roster_csv(&request.csv_content, state)
}

/// Imports the valid rows of a roster CSV upload.
///
/// Invalid rows are skipped and counted. Pupils already on a roster are
/// updated in place.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the CSV fails the
/// structural check, or no row is valid.
pub fn import_roster_csv(
    store: &mut StateStore,
    request: &ImportRosterCsvRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<ImportRosterCsvResponse>, ApiError> {
    AuthorizationService::authorize_manage_roster(authenticated_actor)?;

    let preview: CsvPreviewResult = preview_roster_csv(&request.csv_content, store.current())?;
    if preview.valid_count == 0 {
        return Err(ApiError::InvalidCsvFormat {
            reason: format!(
                "No valid rows to import ({} invalid)",
                preview.invalid_count
            ),
        });
    }

    let mut rosters: BTreeMap<String, Vec<MasterPupilEntry>> = BTreeMap::new();
    for (class_name, entry) in preview.rows.iter().filter_map(CsvRowResult::to_entry) {
        rosters.entry(class_name).or_default().push(entry);
    }
    let classes: usize = rosters.len();

    let result: ApiResult<CommandResponse> = execute(
        store,
        Command::ImportRoster { rosters },
        authenticated_actor,
        cause,
    )?;

    info!(
        classes,
        imported = preview.valid_count,
        skipped = preview.invalid_count,
        "Imported roster CSV"
    );

    Ok(ApiResult {
        response: ImportRosterCsvResponse {
            classes,
            imported_rows: preview.valid_count,
            skipped_rows: preview.invalid_count,
            message: result.response.message,
        },
        audit_event: result.audit_event,
    })
}

/// Exports every roster as CSV.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the CSV cannot be written.
pub fn export_roster(
    state: &AppState,
    authenticated_actor: &AuthenticatedActor,
) -> Result<String, ApiError> {
    AuthorizationService::authorize_manage_roster(authenticated_actor)?;
    export_roster_csv(state)
}

/// Lists the roster of a class.
///
/// # Errors
///
/// Returns an error if the class name is invalid.
pub fn list_roster(state: &AppState, class_name: &str) -> Result<ListRosterResponse, ApiError> {
    validate_class_name(class_name).map_err(translate_domain_error)?;
    Ok(ListRosterResponse {
        class_name: class_name.to_string(),
        pupils: state.management.roster(class_name).to_vec(),
    })
}

/// Removes a pupil from a class roster and every document of the class.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the pupil is not found.
pub fn purge_pupil(
    store: &mut StateStore,
    request: PurgePupilRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_roster(authenticated_actor)?;

    let pupil: PupilRef = request.pupil.to_pupil_ref()?;
    let command: Command = Command::PurgePupil {
        class_name: request.class_name,
        pupil,
    };
    execute(store, command, authenticated_actor, cause)
}

/// Moves a pupil and their assessment history to another class.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, a class name is invalid,
/// or the pupil is neither on the source roster nor in any source document.
pub fn migrate_pupil(
    store: &mut StateStore,
    request: MigratePupilRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_roster(authenticated_actor)?;

    let pupil: PupilRef = request.pupil.to_pupil_ref()?;
    let command: Command = Command::MigratePupil {
        pupil,
        from_class: request.from_class,
        to_class: request.to_class,
    };
    execute(store, command, authenticated_actor, cause)
}

// ============================================================================
// Management
// ============================================================================

/// Registers a staff member.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the role is unknown, or
/// the staff id is invalid or taken.
pub fn add_staff(
    store: &mut StateStore,
    request: &AddStaffRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_staff(authenticated_actor)?;

    let role: StaffRole = request.role.parse().map_err(translate_domain_error)?;
    let command: Command = Command::AddStaff {
        staff: Staff::new(request.staff_id.trim(), request.name.trim(), role),
    };
    execute(store, command, authenticated_actor, cause)
}

/// Removes a staff member and their duty assignments.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the staff member does
/// not exist.
pub fn remove_staff(
    store: &mut StateStore,
    request: RemoveStaffRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_staff(authenticated_actor)?;

    let command: Command = Command::RemoveStaff {
        staff_id: request.staff_id,
    };
    execute(store, command, authenticated_actor, cause)
}

/// Assigns a staff member to a class and subject.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the staff member or
/// subject does not exist, or the duty is already assigned.
pub fn assign_duty(
    store: &mut StateStore,
    request: &AssignDutyRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_staff(authenticated_actor)?;

    let command: Command = Command::AssignDuty {
        mapping: DutyMapping::new(&request.staff_id, &request.class_name, &request.subject),
    };
    execute(store, command, authenticated_actor, cause)
}

/// Registers a subject.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the subject is invalid
/// or already registered.
pub fn add_subject(
    store: &mut StateStore,
    request: &AddSubjectRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_staff(authenticated_actor)?;

    let command: Command = Command::AddSubject {
        subject: request.subject.trim().to_string(),
    };
    execute(store, command, authenticated_actor, cause)
}

/// Creates or replaces a weekly plan entry.
///
/// # Errors
///
/// Returns an error if the class name or subject is invalid.
pub fn upsert_weekly_plan(
    store: &mut StateStore,
    request: UpsertWeeklyPlanRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_plan_lessons(authenticated_actor)?;

    let command: Command = Command::UpsertWeeklyPlan {
        plan: WeeklyMapping {
            class_name: request.class_name,
            subject: request.subject,
            week: request.week,
            strand: request.strand,
            sub_strand: request.sub_strand,
            indicators: request.indicators,
        },
    };
    execute(store, command, authenticated_actor, cause)
}

/// Replaces the school-wide settings.
///
/// # Errors
///
/// Returns an error if the actor is not an admin.
pub fn update_settings(
    store: &mut StateStore,
    request: UpdateSettingsRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_staff(authenticated_actor)?;

    let command: Command = Command::UpdateSettings {
        settings: SchoolSettings {
            school_name: request.school_name,
            academic_year: request.academic_year,
            term: request.term,
        },
    };
    execute(store, command, authenticated_actor, cause)
}

/// Adds a node to the registry.
///
/// # Arguments
///
/// * `store` - The state store
/// * `request` - The node to provision
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause or reason for this action
/// * `provisioned_at` - When the node is provisioned
///
/// # Errors
///
/// Returns an error if the actor is not a super admin or the node id is
/// invalid or taken.
pub fn provision_node(
    store: &mut StateStore,
    request: ProvisionNodeRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    provisioned_at: OffsetDateTime,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_nodes(authenticated_actor)?;

    let command: Command = Command::ProvisionNode {
        node: SchoolNode {
            node_id: request.node_id,
            name: request.name,
            hub_id: request.hub_id,
            status: NodeStatus::Active,
            provisioned_at: format_timestamp(provisioned_at)?,
        },
    };
    execute(store, command, authenticated_actor, cause)
}

/// Retires a node. The registry entry is kept.
///
/// # Errors
///
/// Returns an error if the actor is not a super admin or the node is not in
/// the registry.
pub fn decommission_node(
    store: &mut StateStore,
    request: DecommissionNodeRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_manage_nodes(authenticated_actor)?;

    let command: Command = Command::DecommissionNode {
        node_id: request.node_id,
    };
    execute(store, command, authenticated_actor, cause)
}

// ============================================================================
// Reports
// ============================================================================

/// Computes the staff reward leaderboard.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the fund is invalid.
pub fn compute_rewards(
    state: &AppState,
    request: &ComputeRewardsRequest,
    authenticated_actor: &AuthenticatedActor,
    policy: BonusPolicy,
) -> Result<RewardReport, ApiError> {
    AuthorizationService::authorize_view_rewards(authenticated_actor)?;
    compute_reward_metrics(state, request.fund_amount, policy).map_err(translate_domain_error)
}

/// Computes outcome statistics of one skill for every assessed class.
///
/// # Errors
///
/// Returns an error if the skill is unknown.
pub fn get_outcome_report(
    state: &AppState,
    skill: &str,
) -> Result<OutcomeReportResponse, ApiError> {
    let skill: Skill = skill.parse().map_err(translate_domain_error)?;
    Ok(OutcomeReportResponse {
        skill: skill.to_string(),
        classes: outcome_report(state, skill),
    })
}

/// Computes outcome statistics of one skill for one class.
///
/// # Errors
///
/// Returns an error if the class name is invalid or the skill is unknown.
pub fn get_class_outcome(
    state: &AppState,
    class_name: &str,
    skill: &str,
) -> Result<ClassOutcome, ApiError> {
    validate_class_name(class_name).map_err(translate_domain_error)?;
    let skill: Skill = skill.parse().map_err(translate_domain_error)?;
    Ok(class_outcome(state, class_name, skill))
}

/// Lists recent audit events, newest first.
///
/// The limit is clamped to between 1 and 500.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_audit_events(
    persistence: &mut Persistence,
    class_name: Option<&str>,
    limit: i64,
) -> Result<ListAuditEventsResponse, ApiError> {
    let events: Vec<AuditEvent> = persistence
        .list_audit_events(class_name, limit.clamp(1, MAX_AUDIT_EVENTS))
        .map_err(|e| translate_persistence_error(&e))?;

    let events: Vec<AuditEventInfo> = events.into_iter().map(audit_event_info).collect();

    Ok(ListAuditEventsResponse { events })
}

/// Returns one audit event by id.
///
/// # Errors
///
/// Returns an error if no event has that id or the query fails.
pub fn get_audit_event(
    persistence: &mut Persistence,
    event_id: i64,
) -> Result<AuditEventInfo, ApiError> {
    persistence
        .get_audit_event(event_id)
        .map(audit_event_info)
        .map_err(|e| translate_persistence_error(&e))
}

fn audit_event_info(event: AuditEvent) -> AuditEventInfo {
    AuditEventInfo {
        event_id: event.event_id,
        class_name: event.class_name,
        action: event.action.name,
        details: event.action.details,
        actor_id: event.actor.id,
        actor_type: event.actor.actor_type,
        cause_id: event.cause.id,
        cause_description: event.cause.description,
        before: event.before.data,
        after: event.after.data,
    }
}

// ============================================================================
// Backups
// ============================================================================

/// Produces a backup file of the current document.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or serialization fails.
pub fn download_backup(
    state: &AppState,
    node_id: &str,
    authenticated_actor: &AuthenticatedActor,
    exported_at: OffsetDateTime,
) -> Result<String, ApiError> {
    AuthorizationService::authorize_backup(authenticated_actor)?;
    export_backup(state, node_id, exported_at)
}

/// Replaces the whole document with a backup.
///
/// Every key of the restored document is marked for sync.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the backup fails the
/// structural check. The store is unchanged in that case.
pub fn restore_backup(
    store: &mut StateStore,
    request: &RestoreBackupRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApiResult<CommandResponse>, ApiError> {
    AuthorizationService::authorize_backup(authenticated_actor)?;

    let backup: BackupDocument = parse_backup(&request.backup_json)?;
    let before: String = summarize_document(store.current());
    let after: String = summarize_document(&backup.state);
    let message: String = format!(
        "Restored backup of node '{}' taken at {}",
        backup.metadata.node_id, backup.metadata.exported_at
    );

    store.replace(backup.state);
    info!(
        node_id = %backup.metadata.node_id,
        exported_at = %backup.metadata.exported_at,
        pending = store.ledger().len(),
        "Restored backup"
    );

    let audit_event: AuditEvent = AuditEvent::school_wide(
        authenticated_actor.to_audit_actor(),
        cause,
        Action::new(String::from("RestoreBackup"), Some(message.clone())),
        StateSnapshot::new(before),
        StateSnapshot::new(after),
    );

    Ok(ApiResult {
        response: CommandResponse {
            action: String::from("RestoreBackup"),
            message,
            event_id: None,
        },
        audit_event,
    })
}

// ============================================================================
// Sync and identity
// ============================================================================

/// Describes what is waiting to be pushed and how the worker is doing.
#[must_use]
pub fn sync_status(store: &StateStore, status: &SyncStatus) -> SyncStatusResponse {
    SyncStatusResponse {
        pending_keys: store
            .ledger()
            .keys()
            .iter()
            .map(ToString::to_string)
            .collect(),
        running: status.running,
        pushes: status.pushes,
        last_push_at: status.last_push_at.clone(),
        last_error: status.last_error.clone(),
    }
}

/// Verifies a name against a node through the identity directory.
///
/// # Errors
///
/// Returns an error if the input is empty, the directory cannot be reached,
/// or no identity matches.
pub async fn verify_identity<D: IdentityDirectory>(
    directory: &D,
    request: &VerifyIdentityRequest,
) -> Result<VerifyIdentityResponse, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("name"),
            message: String::from("Name cannot be empty"),
        });
    }
    if request.node_id.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("node_id"),
            message: String::from("Node id cannot be empty"),
        });
    }

    let identity: Identity = directory
        .verify(&request.name, request.node_id.trim())
        .await
        .map_err(|e| translate_sync_error(&e))?
        .ok_or_else(|| ApiError::AuthenticationFailed {
            reason: format!(
                "No identity named '{}' on node '{}'",
                request.name.trim(),
                request.node_id.trim()
            ),
        })?;

    Ok(VerifyIdentityResponse {
        name: identity.name,
        node_id: identity.node_id,
        role: identity.role.to_string(),
        balance: identity.balance,
    })
}
