// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use schoolhub_domain::{
    AssessmentKey, CorrectionStatus, DutyMapping, ExerciseMeta, MasterPupilEntry, PupilRef,
    SchoolNode, SchoolSettings, Staff, WeeklyMapping, WorkCategory,
};
use std::collections::BTreeMap;

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record (or clear, with an empty value) one pupil's score.
    RecordScore {
        /// The work category.
        category: WorkCategory,
        /// The assessment document.
        key: AssessmentKey,
        /// The pupil.
        pupil: PupilRef,
        /// The exercise number.
        exercise: u32,
        /// The string-encoded score.
        value: String,
    },
    /// Set the facilitator and an exercise's metadata on a document.
    SetExercise {
        /// The work category.
        category: WorkCategory,
        /// The assessment document.
        key: AssessmentKey,
        /// The staff member who set the work.
        facilitator: String,
        /// The exercise number.
        exercise: u32,
        /// Max score, date and indicators.
        meta: ExerciseMeta,
    },
    /// Append an intervention note to a pupil's snapshot.
    AddIntervention {
        /// The work category.
        category: WorkCategory,
        /// The assessment document.
        key: AssessmentKey,
        /// The pupil.
        pupil: PupilRef,
        /// When it happened.
        date: String,
        /// What was done.
        note: String,
    },
    /// Set correction tracking for one exercise.
    SetCorrectionStatus {
        /// The work category.
        category: WorkCategory,
        /// The assessment document.
        key: AssessmentKey,
        /// The pupil.
        pupil: PupilRef,
        /// The exercise number.
        exercise: u32,
        /// The new status.
        status: CorrectionStatus,
    },
    /// Add a pupil to a class roster.
    EnrollPupil {
        /// The class.
        class_name: String,
        /// The roster entry.
        entry: MasterPupilEntry,
    },
    /// Merge rosters for several classes. Known pupils are updated in place.
    ImportRoster {
        /// Class name to entries.
        rosters: BTreeMap<String, Vec<MasterPupilEntry>>,
    },
    /// Remove a pupil from a class roster and from every document of the class.
    PurgePupil {
        /// The class.
        class_name: String,
        /// The pupil.
        pupil: PupilRef,
    },
    /// Move a pupil and their assessment history to another class.
    MigratePupil {
        /// The pupil.
        pupil: PupilRef,
        /// The source class.
        from_class: String,
        /// The destination class.
        to_class: String,
    },
    /// Register a staff member.
    AddStaff {
        /// The staff member.
        staff: Staff,
    },
    /// Remove a staff member and their duty assignments.
    RemoveStaff {
        /// The staff id (email).
        staff_id: String,
    },
    /// Assign a staff member to a class and subject.
    AssignDuty {
        /// The assignment.
        mapping: DutyMapping,
    },
    /// Register a subject.
    AddSubject {
        /// The subject name.
        subject: String,
    },
    /// Create or replace the plan entry for a class, subject and week.
    UpsertWeeklyPlan {
        /// The plan entry.
        plan: WeeklyMapping,
    },
    /// Replace the school-wide settings.
    UpdateSettings {
        /// The new settings.
        settings: SchoolSettings,
    },
    /// Add a node to the super admin registry.
    ProvisionNode {
        /// The node.
        node: SchoolNode,
    },
    /// Retire a node. The entry stays in the registry.
    DecommissionNode {
        /// The node id.
        node_id: String,
    },
}

impl Command {
    /// The command name recorded in audit events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RecordScore { .. } => "RecordScore",
            Self::SetExercise { .. } => "SetExercise",
            Self::AddIntervention { .. } => "AddIntervention",
            Self::SetCorrectionStatus { .. } => "SetCorrectionStatus",
            Self::EnrollPupil { .. } => "EnrollPupil",
            Self::ImportRoster { .. } => "ImportRoster",
            Self::PurgePupil { .. } => "PurgePupil",
            Self::MigratePupil { .. } => "MigratePupil",
            Self::AddStaff { .. } => "AddStaff",
            Self::RemoveStaff { .. } => "RemoveStaff",
            Self::AssignDuty { .. } => "AssignDuty",
            Self::AddSubject { .. } => "AddSubject",
            Self::UpsertWeeklyPlan { .. } => "UpsertWeeklyPlan",
            Self::UpdateSettings { .. } => "UpdateSettings",
            Self::ProvisionNode { .. } => "ProvisionNode",
            Self::DecommissionNode { .. } => "DecommissionNode",
        }
    }
}
