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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod ledger_writer;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use schoolhub::{PendingSyncLedger, StateStore};
use schoolhub_api::{
    AddInterventionRequest, AddStaffRequest, AddSubjectRequest, ApiError, ApiResult,
    AssessmentLocator, AssignDutyRequest, AuditEventInfo, AuthenticatedActor, CommandResponse,
    ComputeRewardsRequest, CsvPreviewResult, DecommissionNodeRequest, EnrollPupilRequest,
    ImportRosterCsvRequest, ImportRosterCsvResponse, ListAuditEventsResponse, ListRosterResponse,
    MigratePupilRequest, OutcomeReportResponse, PreviewRosterCsvRequest, ProvisionNodeRequest,
    PurgePupilRequest, RecordScoreRequest, RemoveStaffRequest, RestoreBackupRequest,
    SetCorrectionStatusRequest, SetExerciseRequest, SyncStatusResponse, UpdateSettingsRequest,
    UpsertWeeklyPlanRequest, VerifyIdentityRequest, VerifyIdentityResponse, add_intervention,
    add_staff, add_subject, assign_duty, authenticate, compute_rewards, decommission_node,
    download_backup, enroll_pupil, export_roster, get_assessment, get_audit_event,
    get_class_outcome, get_outcome_report, import_roster_csv, list_audit_events, list_roster,
    migrate_pupil, persist_commit, preview_roster_import, provision_node, purge_pupil,
    record_score, remove_staff, restore_backup, set_correction_status, set_exercise, sync_status,
    translate_sync_error, update_settings, upsert_weekly_plan, verify_identity,
};
use schoolhub_audit::Cause;
use schoolhub_domain::{
    AppState as Document, AssessmentData, BonusPolicy, ClassOutcome, RewardReport,
};
use schoolhub_persistence::{Persistence, PersistenceError};
use schoolhub_sync::{
    InMemoryDirectory, InMemoryRemote, SharedStore, SyncConfig, SyncHandle, SyncReport, SyncWorker,
    pull_remote_state,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Default number of audit events returned by the timeline.
const DEFAULT_AUDIT_LIMIT: i64 = 100;

/// SchoolHub Server - HTTP server for a local-first SchoolHub node
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Hub the node is registered under
    #[arg(long, default_value = "local-hub")]
    hub_id: String,

    /// Institutional identifier of this node
    #[arg(long, default_value = "node-001")]
    node_id: String,

    /// Quiet period in milliseconds between the last change and a remote push
    #[arg(long, default_value_t = 1500)]
    sync_delay_ms: u64,

    /// How reward bonuses treat staff without duties (`legacy` or `require-duties`)
    #[arg(long, default_value = "legacy")]
    bonus_policy: BonusPolicy,
}

/// Application state shared across handlers.
///
/// The store and persistence each sit behind one async mutex. Handlers that
/// need both lock the store first.
#[derive(Clone)]
struct ServerState {
    /// The single-writer state store.
    store: SharedStore,
    /// The persistence layer for the document, the ledger and audit events.
    persistence: Arc<Mutex<Persistence>>,
    /// The running sync worker.
    sync: Arc<SyncHandle<InMemoryRemote>>,
    /// Identity verification backend.
    directory: Arc<InMemoryDirectory>,
    /// This node's identifier.
    node_id: String,
    /// Bonus policy for the reward leaderboard.
    bonus_policy: BonusPolicy,
}

impl ServerState {
    fn nudge_sync(&self) {
        if let Err(err) = self.sync.nudge() {
            warn!(error = %err, "Failed to nudge sync worker");
        }
    }

    /// Rebuilds this node's identities from the current staff list.
    async fn sync_directory(&self) {
        let document: Arc<Document> = self.store.lock().await.snapshot();
        self.directory
            .sync_staff(&self.node_id, &document.management.staff)
            .await;
    }
}

/// A state-changing request with the identity of its actor and its cause.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorEnvelope<T> {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The operation itself.
    #[serde(flatten)]
    request: T,
}

impl<T> ActorEnvelope<T> {
    fn into_parts(self) -> Result<(AuthenticatedActor, Cause, T), HttpError> {
        let actor: AuthenticatedActor =
            authenticate(&self.actor_id, &self.actor_role).map_err(ApiError::from)?;
        let cause: Cause = Cause::new(self.cause_id, self.cause_description);
        Ok((actor, cause, self.request))
    }
}

/// A read request that still needs an authorized actor.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorRequest<T> {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The operation itself.
    #[serde(flatten)]
    request: T,
}

/// Query parameters identifying the actor of a GET request.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorQuery {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
}

impl ActorQuery {
    fn authenticate(&self) -> Result<AuthenticatedActor, HttpError> {
        Ok(authenticate(&self.actor_id, &self.actor_role).map_err(ApiError::from)?)
    }
}

/// Query parameters for the audit timeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct AuditTimelineQuery {
    /// Restrict the timeline to one class.
    class_name: Option<String>,
    /// Maximum number of events.
    limit: Option<i64>,
}

/// API response for a roster import.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ImportRosterCsvApiResponse {
    /// The import outcome.
    #[serde(flatten)]
    result: ImportRosterCsvResponse,
    /// The persisted audit event ID.
    event_id: i64,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. }
            | ApiError::InvalidCsvFormat { .. }
            | ApiError::InvalidBackup { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::RemoteUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Applies a command, persists the outcome and nudges the sync worker.
///
/// The store stays locked until the document, the ledger and the audit event
/// are written, so persisted state never trails a later command.
async fn commit<T, R, F>(
    app_state: &ServerState,
    envelope: ActorEnvelope<T>,
    handler: F,
) -> Result<(R, i64), HttpError>
where
    F: FnOnce(&mut StateStore, T, &AuthenticatedActor, Cause) -> Result<ApiResult<R>, ApiError>,
{
    let (actor, cause, request): (AuthenticatedActor, Cause, T) = envelope.into_parts()?;

    let mut store = app_state.store.lock().await;
    let result: ApiResult<R> = handler(&mut *store, request, &actor, cause)?;

    let mut persistence = app_state.persistence.lock().await;
    let event_id: i64 = persist_commit(&mut persistence, &store, &result.audit_event)?;
    drop(persistence);
    drop(store);

    app_state.nudge_sync();
    info!(
        event_id,
        actor_id = %actor.id,
        action = %result.audit_event.action.name,
        "Committed command"
    );

    Ok((result.response, event_id))
}

async fn run_command<T, F>(
    app_state: &ServerState,
    envelope: ActorEnvelope<T>,
    handler: F,
) -> Result<Json<CommandResponse>, HttpError>
where
    F: FnOnce(
        &mut StateStore,
        T,
        &AuthenticatedActor,
        Cause,
    ) -> Result<ApiResult<CommandResponse>, ApiError>,
{
    let (mut response, event_id): (CommandResponse, i64) =
        commit(app_state, envelope, handler).await?;
    response.event_id = Some(event_id);
    Ok(Json(response))
}

// ============================================================================
// Assessment work
// ============================================================================

/// Handler for POST `/assessments/score` endpoint.
async fn handle_record_score(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<RecordScoreRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, record_score).await
}

/// Handler for POST `/assessments/exercise` endpoint.
async fn handle_set_exercise(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<SetExerciseRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, set_exercise).await
}

/// Handler for POST `/assessments/intervention` endpoint.
async fn handle_add_intervention(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<AddInterventionRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, add_intervention).await
}

/// Handler for POST `/assessments/correction` endpoint.
async fn handle_set_correction_status(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<SetCorrectionStatusRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, |store, request, actor, cause| {
        set_correction_status(store, &request, actor, cause)
    })
    .await
}

/// Handler for GET `/assessments` endpoint.
///
/// Returns the document with its pupil list synced to the class roster.
async fn handle_get_assessment(
    AxumState(app_state): AxumState<ServerState>,
    Query(locator): Query<AssessmentLocator>,
) -> Result<Json<AssessmentData>, HttpError> {
    let document: Arc<Document> = app_state.store.lock().await.snapshot();
    Ok(Json(get_assessment(&document, &locator)?))
}

// ============================================================================
// Rosters
// ============================================================================

/// Handler for POST `/roster/enroll` endpoint.
async fn handle_enroll_pupil(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<EnrollPupilRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, enroll_pupil).await
}

/// Handler for POST `/roster/purge` endpoint.
async fn handle_purge_pupil(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<PurgePupilRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, purge_pupil).await
}

/// Handler for POST `/roster/migrate` endpoint.
async fn handle_migrate_pupil(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<MigratePupilRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, migrate_pupil).await
}

/// Handler for POST `/roster/preview` endpoint.
async fn handle_preview_roster(
    AxumState(app_state): AxumState<ServerState>,
    Json(body): Json<ActorRequest<PreviewRosterCsvRequest>>,
) -> Result<Json<CsvPreviewResult>, HttpError> {
    let actor: AuthenticatedActor =
        authenticate(&body.actor_id, &body.actor_role).map_err(ApiError::from)?;
    let document: Arc<Document> = app_state.store.lock().await.snapshot();
    Ok(Json(preview_roster_import(&document, &body.request, &actor)?))
}

/// Handler for POST `/roster/import` endpoint.
async fn handle_import_roster(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<ImportRosterCsvRequest>>,
) -> Result<Json<ImportRosterCsvApiResponse>, HttpError> {
    let (result, event_id): (ImportRosterCsvResponse, i64) =
        commit(&app_state, envelope, |store, request, actor, cause| {
            import_roster_csv(store, &request, actor, cause)
        })
        .await?;
    Ok(Json(ImportRosterCsvApiResponse { result, event_id }))
}

/// Handler for GET `/roster/export` endpoint.
async fn handle_export_roster(
    AxumState(app_state): AxumState<ServerState>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, HttpError> {
    let actor: AuthenticatedActor = query.authenticate()?;
    let document: Arc<Document> = app_state.store.lock().await.snapshot();
    let csv_content: String = export_roster(&document, &actor)?;
    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv_content,
    )
        .into_response())
}

/// Handler for GET `/roster/{class_name}` endpoint.
async fn handle_list_roster(
    AxumState(app_state): AxumState<ServerState>,
    Path(class_name): Path<String>,
) -> Result<Json<ListRosterResponse>, HttpError> {
    let document: Arc<Document> = app_state.store.lock().await.snapshot();
    Ok(Json(list_roster(&document, &class_name)?))
}

// ============================================================================
// Management
// ============================================================================

/// Handler for POST `/staff` endpoint.
///
/// A new staff member also becomes verifiable through the identity directory.
async fn handle_add_staff(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<AddStaffRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    let response: Json<CommandResponse> =
        run_command(&app_state, envelope, |store, request, actor, cause| {
            add_staff(store, &request, actor, cause)
        })
        .await?;
    app_state.sync_directory().await;
    Ok(response)
}

/// Handler for POST `/staff/remove` endpoint.
///
/// The removed member can no longer verify their identity.
async fn handle_remove_staff(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<RemoveStaffRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    let response: Json<CommandResponse> =
        run_command(&app_state, envelope, remove_staff).await?;
    app_state.sync_directory().await;
    Ok(response)
}

/// Handler for POST `/duties` endpoint.
async fn handle_assign_duty(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<AssignDutyRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, |store, request, actor, cause| {
        assign_duty(store, &request, actor, cause)
    })
    .await
}

/// Handler for POST `/subjects` endpoint.
async fn handle_add_subject(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<AddSubjectRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, |store, request, actor, cause| {
        add_subject(store, &request, actor, cause)
    })
    .await
}

/// Handler for POST `/weekly_plans` endpoint.
async fn handle_upsert_weekly_plan(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<UpsertWeeklyPlanRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, upsert_weekly_plan).await
}

/// Handler for POST `/settings` endpoint.
async fn handle_update_settings(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<UpdateSettingsRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, update_settings).await
}

/// Handler for POST `/nodes` endpoint.
async fn handle_provision_node(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<ProvisionNodeRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    let provisioned_at: OffsetDateTime = OffsetDateTime::now_utc();
    run_command(&app_state, envelope, |store, request, actor, cause| {
        provision_node(store, request, actor, cause, provisioned_at)
    })
    .await
}

/// Handler for POST `/nodes/decommission` endpoint.
async fn handle_decommission_node(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<DecommissionNodeRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    run_command(&app_state, envelope, decommission_node).await
}

/// Handler for GET `/state` endpoint.
///
/// Returns the whole document as stored.
async fn handle_get_state(AxumState(app_state): AxumState<ServerState>) -> Json<Arc<Document>> {
    Json(app_state.store.lock().await.snapshot())
}

// ============================================================================
// Reports
// ============================================================================

/// Handler for POST `/rewards` endpoint.
async fn handle_compute_rewards(
    AxumState(app_state): AxumState<ServerState>,
    Json(body): Json<ActorRequest<ComputeRewardsRequest>>,
) -> Result<Json<RewardReport>, HttpError> {
    let actor: AuthenticatedActor =
        authenticate(&body.actor_id, &body.actor_role).map_err(ApiError::from)?;
    let document: Arc<Document> = app_state.store.lock().await.snapshot();
    Ok(Json(compute_rewards(
        &document,
        &body.request,
        &actor,
        app_state.bonus_policy,
    )?))
}

/// Handler for GET `/outcomes/{skill}` endpoint.
async fn handle_outcome_report(
    AxumState(app_state): AxumState<ServerState>,
    Path(skill): Path<String>,
) -> Result<Json<OutcomeReportResponse>, HttpError> {
    let document: Arc<Document> = app_state.store.lock().await.snapshot();
    Ok(Json(get_outcome_report(&document, &skill)?))
}

/// Handler for GET `/outcomes/{skill}/{class_name}` endpoint.
async fn handle_class_outcome(
    AxumState(app_state): AxumState<ServerState>,
    Path((skill, class_name)): Path<(String, String)>,
) -> Result<Json<ClassOutcome>, HttpError> {
    let document: Arc<Document> = app_state.store.lock().await.snapshot();
    Ok(Json(get_class_outcome(&document, &class_name, &skill)?))
}

/// Handler for GET `/audit/timeline` endpoint.
async fn handle_audit_timeline(
    AxumState(app_state): AxumState<ServerState>,
    Query(query): Query<AuditTimelineQuery>,
) -> Result<Json<ListAuditEventsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListAuditEventsResponse = list_audit_events(
        &mut persistence,
        query.class_name.as_deref(),
        query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT),
    )?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for GET `/audit/event/{event_id}` endpoint.
async fn handle_get_audit_event(
    AxumState(app_state): AxumState<ServerState>,
    Path(event_id): Path<i64>,
) -> Result<Json<AuditEventInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let event: AuditEventInfo = get_audit_event(&mut persistence, event_id)?;
    drop(persistence);
    Ok(Json(event))
}

// ============================================================================
// Backups
// ============================================================================

/// Handler for GET `/backup` endpoint.
///
/// Returns the backup file as an attachment.
async fn handle_download_backup(
    AxumState(app_state): AxumState<ServerState>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, HttpError> {
    let actor: AuthenticatedActor = query.authenticate()?;
    let document: Arc<Document> = app_state.store.lock().await.snapshot();
    let backup: String = download_backup(
        &document,
        &app_state.node_id,
        &actor,
        OffsetDateTime::now_utc(),
    )?;

    info!(actor_id = %actor.id, bytes = backup.len(), "Exported backup");
    let disposition: String = format!(
        "attachment; filename=\"schoolhub-backup-{}.json\"",
        app_state.node_id
    );
    Ok((
        [
            (header::CONTENT_TYPE, String::from("application/json")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        backup,
    )
        .into_response())
}

/// Handler for POST `/backup/restore` endpoint.
///
/// The identity directory follows the restored staff list.
async fn handle_restore_backup(
    AxumState(app_state): AxumState<ServerState>,
    Json(envelope): Json<ActorEnvelope<RestoreBackupRequest>>,
) -> Result<Json<CommandResponse>, HttpError> {
    let response: Json<CommandResponse> =
        run_command(&app_state, envelope, |store, request, actor, cause| {
            restore_backup(store, &request, actor, cause)
        })
        .await?;
    app_state.sync_directory().await;
    Ok(response)
}

// ============================================================================
// Sync and identity
// ============================================================================

/// Handler for GET `/sync/status` endpoint.
async fn handle_sync_status(
    AxumState(app_state): AxumState<ServerState>,
) -> Json<SyncStatusResponse> {
    let store = app_state.store.lock().await;
    let response: SyncStatusResponse = sync_status(&store, &app_state.sync.status());
    drop(store);
    Json(response)
}

/// Handler for POST `/sync/flush` endpoint.
///
/// Pushes immediately instead of waiting for the debounce delay.
async fn handle_sync_flush(
    AxumState(app_state): AxumState<ServerState>,
) -> Result<Json<SyncReport>, HttpError> {
    info!("Handling sync flush request");
    let report: SyncReport = app_state
        .sync
        .flush()
        .await
        .map_err(|e| translate_sync_error(&e))?;
    Ok(Json(report))
}

/// Handler for POST `/identity/verify` endpoint.
async fn handle_verify_identity(
    AxumState(app_state): AxumState<ServerState>,
    Json(request): Json<VerifyIdentityRequest>,
) -> Result<Json<VerifyIdentityResponse>, HttpError> {
    Ok(Json(
        verify_identity(app_state.directory.as_ref(), &request).await?,
    ))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: ServerState) -> Router {
    Router::new()
        .route("/state", get(handle_get_state))
        .route("/assessments", get(handle_get_assessment))
        .route("/assessments/score", post(handle_record_score))
        .route("/assessments/exercise", post(handle_set_exercise))
        .route("/assessments/intervention", post(handle_add_intervention))
        .route("/assessments/correction", post(handle_set_correction_status))
        .route("/roster/enroll", post(handle_enroll_pupil))
        .route("/roster/purge", post(handle_purge_pupil))
        .route("/roster/migrate", post(handle_migrate_pupil))
        .route("/roster/preview", post(handle_preview_roster))
        .route("/roster/import", post(handle_import_roster))
        .route("/roster/export", get(handle_export_roster))
        .route("/roster/{class_name}", get(handle_list_roster))
        .route("/staff", post(handle_add_staff))
        .route("/staff/remove", post(handle_remove_staff))
        .route("/duties", post(handle_assign_duty))
        .route("/subjects", post(handle_add_subject))
        .route("/weekly_plans", post(handle_upsert_weekly_plan))
        .route("/settings", post(handle_update_settings))
        .route("/nodes", post(handle_provision_node))
        .route("/nodes/decommission", post(handle_decommission_node))
        .route("/rewards", post(handle_compute_rewards))
        .route("/outcomes/{skill}", get(handle_outcome_report))
        .route("/outcomes/{skill}/{class_name}", get(handle_class_outcome))
        .route("/audit/timeline", get(handle_audit_timeline))
        .route("/audit/event/{event_id}", get(handle_get_audit_event))
        .route("/backup", get(handle_download_backup))
        .route("/backup/restore", post(handle_restore_backup))
        .route("/sync/status", get(handle_sync_status))
        .route("/sync/flush", post(handle_sync_flush))
        .route("/identity/verify", post(handle_verify_identity))
        .with_state(app_state)
}

/// Loads the local document, or seeds it from the remote record on first run.
async fn load_store(
    persistence: &mut Persistence,
    remote: &InMemoryRemote,
    hub_id: &str,
    node_id: &str,
) -> Result<StateStore, PersistenceError> {
    if let Some(document) = persistence.load_state()? {
        let ledger: PendingSyncLedger = persistence.load_pending()?;
        info!(pending = ledger.len(), "Loaded local document");
        return Ok(StateStore::with_ledger(document, ledger));
    }

    match pull_remote_state(remote, hub_id, node_id).await {
        Ok(Some(document)) => {
            info!(hub_id, node_id, "Seeded local document from remote record");
            persistence.save_state(&document)?;
            Ok(StateStore::new(document))
        }
        Ok(None) => {
            info!("No local or remote document, starting empty");
            Ok(StateStore::new(Document::new()))
        }
        Err(err) => {
            warn!(error = %err, "Could not pull remote record, starting empty");
            Ok(StateStore::new(Document::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!(
        hub_id = %args.hub_id,
        node_id = %args.node_id,
        bonus_policy = ?args.bonus_policy,
        "Initializing SchoolHub server"
    );

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let remote: Arc<InMemoryRemote> = Arc::new(InMemoryRemote::new());
    let store: StateStore =
        load_store(&mut persistence, &remote, &args.hub_id, &args.node_id).await?;
    let directory: InMemoryDirectory =
        InMemoryDirectory::from_staff(&args.node_id, &store.current().management.staff);

    let store: SharedStore = Arc::new(Mutex::new(store));
    let persistence: Arc<Mutex<Persistence>> = Arc::new(Mutex::new(persistence));

    let worker: SyncWorker<InMemoryRemote> = SyncWorker::new(
        remote,
        Arc::clone(&store),
        SyncConfig {
            hub_id: args.hub_id.clone(),
            node_id: args.node_id.clone(),
            delay: Duration::from_millis(args.sync_delay_ms),
        },
    );
    let writer: JoinHandle<()> = ledger_writer::spawn(
        worker.subscribe(),
        Arc::clone(&store),
        Arc::clone(&persistence),
    );
    let sync: Arc<SyncHandle<InMemoryRemote>> = Arc::new(worker.start());

    let app_state: ServerState = ServerState {
        store,
        persistence,
        sync: Arc::clone(&sync),
        directory: Arc::new(directory),
        node_id: args.node_id.clone(),
        bonus_policy: args.bonus_policy,
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and its state are gone, so this is the last reference.
    match Arc::try_unwrap(sync) {
        Ok(handle) => {
            handle.shutdown().await;
            if let Err(err) = writer.await {
                warn!(error = %err, "Ledger writer ended abnormally");
            }
        }
        Err(_) => {
            warn!("Sync worker still referenced at shutdown");
            writer.abort();
        }
    }

    info!("SchoolHub server stopped");
    Ok(())
}
