// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response DTOs.
//!
//! These are distinct from domain types and represent the API contract.

use schoolhub_domain::{ClassOutcome, MasterPupilEntry, PupilRef};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Identifies a pupil by student id or, failing that, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PupilSelector {
    /// The pupil's display name.
    #[serde(default)]
    pub name: Option<String>,
    /// The pupil's durable student id. Preferred over the name.
    #[serde(default)]
    pub student_id: Option<String>,
}

impl PupilSelector {
    /// Selects a pupil by student id.
    #[must_use]
    pub fn by_student_id(student_id: &str) -> Self {
        Self {
            name: None,
            student_id: Some(student_id.to_string()),
        }
    }

    /// Selects a pupil by name.
    #[must_use]
    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            student_id: None,
        }
    }

    /// Converts the selector into a pupil reference.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a student id nor a name is given.
    pub fn to_pupil_ref(&self) -> Result<PupilRef, ApiError> {
        if let Some(student_id) = non_blank(self.student_id.as_deref()) {
            return Ok(PupilRef::StudentId(student_id));
        }
        if let Some(name) = non_blank(self.name.as_deref()) {
            return Ok(PupilRef::Name(name));
        }
        Err(ApiError::InvalidInput {
            field: String::from("pupil"),
            message: String::from("Either student_id or name is required"),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Identifies one assessment document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssessmentLocator {
    /// The work category (`classWork`, `homeWork`, `projectWork`, `criterionWork`).
    pub category: String,
    /// The pipe-delimited assessment key.
    pub key: String,
}

/// API request to record or clear a score.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecordScoreRequest {
    /// The document.
    #[serde(flatten)]
    pub locator: AssessmentLocator,
    /// The pupil.
    #[serde(flatten)]
    pub pupil: PupilSelector,
    /// The exercise number.
    pub exercise: u32,
    /// The score. An empty value clears it.
    pub value: String,
}

/// API request to set an exercise on a document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetExerciseRequest {
    /// The document.
    #[serde(flatten)]
    pub locator: AssessmentLocator,
    /// The staff member who set the work.
    pub facilitator: String,
    /// The exercise number.
    pub exercise: u32,
    /// The maximum score.
    pub max_score: String,
    /// The date the work was set.
    #[serde(default)]
    pub date: String,
    /// Curriculum indicators covered.
    #[serde(default)]
    pub indicators: Vec<String>,
}

/// API request to log an intervention.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AddInterventionRequest {
    /// The document.
    #[serde(flatten)]
    pub locator: AssessmentLocator,
    /// The pupil.
    #[serde(flatten)]
    pub pupil: PupilSelector,
    /// When the intervention happened.
    pub date: String,
    /// What was done.
    pub note: String,
}

/// API request to set correction tracking for an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetCorrectionStatusRequest {
    /// The document.
    #[serde(flatten)]
    pub locator: AssessmentLocator,
    /// The pupil.
    #[serde(flatten)]
    pub pupil: PupilSelector,
    /// The exercise number.
    pub exercise: u32,
    /// Whether the pupil has done the corrections.
    pub done: bool,
    /// Whether the corrections have been marked.
    pub marked: bool,
}

/// API request to enroll a pupil in a class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnrollPupilRequest {
    /// The class.
    pub class_name: String,
    /// The pupil's name.
    pub name: String,
    /// The pupil's gender.
    #[serde(default)]
    pub gender: String,
    /// The durable student id.
    #[serde(default)]
    pub student_id: String,
}

/// API request to purge a pupil from a class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PurgePupilRequest {
    /// The class.
    pub class_name: String,
    /// The pupil.
    #[serde(flatten)]
    pub pupil: PupilSelector,
}

/// API request to move a pupil to another class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MigratePupilRequest {
    /// The pupil.
    #[serde(flatten)]
    pub pupil: PupilSelector,
    /// The class the pupil leaves.
    pub from_class: String,
    /// The class the pupil joins.
    pub to_class: String,
}

/// API request to register a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AddStaffRequest {
    /// The staff id, usually an email address.
    pub staff_id: String,
    /// The display name.
    pub name: String,
    /// The role (`facilitator`, `administrator`, `superAdmin`).
    pub role: String,
}

/// API request to remove a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoveStaffRequest {
    /// The staff id.
    pub staff_id: String,
}

/// API request to assign a duty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssignDutyRequest {
    /// The staff id.
    pub staff_id: String,
    /// The class.
    pub class_name: String,
    /// The subject.
    pub subject: String,
}

/// API request to register a subject.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AddSubjectRequest {
    /// The subject.
    pub subject: String,
}

/// API request to create or replace a weekly plan entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpsertWeeklyPlanRequest {
    /// The class.
    pub class_name: String,
    /// The subject.
    pub subject: String,
    /// The week label.
    pub week: String,
    /// Curriculum strand.
    #[serde(default)]
    pub strand: String,
    /// Curriculum sub-strand.
    #[serde(default)]
    pub sub_strand: String,
    /// Indicators covered.
    #[serde(default)]
    pub indicators: String,
}

/// API request to replace the school-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpdateSettingsRequest {
    /// The school name.
    pub school_name: String,
    /// The academic year label.
    pub academic_year: String,
    /// The term label.
    pub term: String,
}

/// API request to provision a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProvisionNodeRequest {
    /// The institutional node id.
    pub node_id: String,
    /// The school name.
    pub name: String,
    /// The hub the node registers under.
    pub hub_id: String,
}

/// API request to decommission a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DecommissionNodeRequest {
    /// The node id.
    pub node_id: String,
}

/// API request for the reward leaderboard.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComputeRewardsRequest {
    /// The fund to distribute.
    pub fund_amount: f64,
}

/// API response for an outcome report.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutcomeReportResponse {
    /// The skill reported on.
    pub skill: String,
    /// One entry per class.
    pub classes: Vec<ClassOutcome>,
}

/// API response listing a class roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListRosterResponse {
    /// The class.
    pub class_name: String,
    /// The roster, in roster order.
    pub pupils: Vec<MasterPupilEntry>,
}

/// API request to preview a roster CSV upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PreviewRosterCsvRequest {
    /// The raw CSV content.
    pub csv_content: String,
}

/// API request to import a roster CSV upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImportRosterCsvRequest {
    /// The raw CSV content.
    pub csv_content: String,
}

/// API response for a roster CSV import.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImportRosterCsvResponse {
    /// Classes touched by the import.
    pub classes: usize,
    /// Rows merged into rosters.
    pub imported_rows: usize,
    /// Invalid rows left out.
    pub skipped_rows: usize,
    /// A summary message.
    pub message: String,
}

/// API request to restore a JSON backup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RestoreBackupRequest {
    /// The backup file content.
    pub backup_json: String,
}

/// API response for a state-changing command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommandResponse {
    /// The audit action name.
    pub action: String,
    /// A success message.
    pub message: String,
    /// The persisted audit event id, once known.
    pub event_id: Option<i64>,
}

/// Information about an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuditEventInfo {
    /// The event id.
    pub event_id: Option<i64>,
    /// The class scope, if any.
    pub class_name: Option<String>,
    /// The action name.
    pub action: String,
    /// Action details.
    pub details: Option<String>,
    /// Who acted.
    pub actor_id: String,
    /// The actor's role.
    pub actor_type: String,
    /// Why.
    pub cause_id: String,
    /// Description of the cause.
    pub cause_description: String,
    /// Summary before the change.
    pub before: String,
    /// Summary after the change.
    pub after: String,
}

/// API response listing audit events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListAuditEventsResponse {
    /// Events, newest first.
    pub events: Vec<AuditEventInfo>,
}

/// API request to verify an identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerifyIdentityRequest {
    /// The name to verify.
    pub name: String,
    /// The node the name belongs to.
    pub node_id: String,
}

/// API response for a verified identity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VerifyIdentityResponse {
    /// The registered name.
    pub name: String,
    /// The node.
    pub node_id: String,
    /// The role on that node.
    pub role: String,
    /// The account balance.
    pub balance: f64,
}

/// API response describing sync progress.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncStatusResponse {
    /// Keys waiting to be pushed.
    pub pending_keys: Vec<String>,
    /// Whether the sync worker is running.
    pub running: bool,
    /// Successful pushes since startup.
    pub pushes: u64,
    /// When the last push finished.
    pub last_push_at: Option<String>,
    /// The most recent push error.
    pub last_error: Option<String>,
}
