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

//! The API boundary of a SchoolHub node.
//!
//! Handlers authorize the actor, translate request DTOs into core commands,
//! execute them against the [`schoolhub::StateStore`] and translate every
//! lower-layer error into an [`ApiError`]. Transport concerns live in the
//! server crate.

mod auth;
mod backup;
mod csv_roster;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate};
pub use backup::{
    BACKUP_APP_NAME, BACKUP_FORMAT_VERSION, BackupDocument, BackupMetadata, export_backup,
    parse_backup,
};
pub use csv_roster::{
    CsvPreviewResult, CsvRowResult, CsvRowStatus, ROSTER_CSV_HEADERS, export_roster_csv,
    preview_roster_csv,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error, translate_sync_error,
};
pub use handlers::{
    ApiResult, add_intervention, add_staff, add_subject, assign_duty, compute_rewards,
    decommission_node, download_backup, enroll_pupil, export_roster, get_assessment,
    get_audit_event, get_class_outcome, get_outcome_report, import_roster_csv, list_audit_events,
    list_roster, migrate_pupil, persist_commit, preview_roster_import, provision_node,
    purge_pupil, record_score, remove_staff, restore_backup, set_correction_status, set_exercise,
    sync_status, update_settings, upsert_weekly_plan, verify_identity,
};
pub use request_response::{
    AddInterventionRequest, AddStaffRequest, AddSubjectRequest, AssessmentLocator,
    AssignDutyRequest, AuditEventInfo, CommandResponse, ComputeRewardsRequest,
    DecommissionNodeRequest, EnrollPupilRequest, ImportRosterCsvRequest, ImportRosterCsvResponse,
    ListAuditEventsResponse, ListRosterResponse, MigratePupilRequest, OutcomeReportResponse,
    PreviewRosterCsvRequest, ProvisionNodeRequest, PupilSelector, PurgePupilRequest,
    RecordScoreRequest, RemoveStaffRequest, RestoreBackupRequest, SetCorrectionStatusRequest,
    SetExerciseRequest, SyncStatusResponse, UpdateSettingsRequest, UpsertWeeklyPlanRequest,
    VerifyIdentityRequest, VerifyIdentityResponse,
};
