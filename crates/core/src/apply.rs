// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::migration::{Migration, migrate_pupil};
use crate::state::TransitionResult;
use crate::sync_key::SyncKey;
use schoolhub_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use schoolhub_domain::{
    AppState, AssessmentBook, AssessmentData, AssessmentKey, CorrectionStatus, DomainError,
    DutyMapping, ExerciseMeta, Intervention, ManagementState, MasterPupilEntry, NodeStatus, Pupil,
    PupilRef, SchoolNode, Staff, WeeklyMapping, WorkCategory, validate_class_name,
    validate_exercise, validate_node_id, validate_roster_entry, validate_score, validate_staff,
    validate_subject,
};
use std::collections::BTreeMap;

/// What a single command changed, before it is wrapped in an audit event.
struct Change {
    new_state: AppState,
    touched: Vec<SyncKey>,
    before: String,
    after: String,
    details: String,
    class_name: Option<String>,
}

/// Applies a command to the current document, producing a new document, an
/// audit event and the sync keys the command touched.
///
/// The input document is never modified. Slices the command does not change
/// are shared between the input and the new document.
///
/// # Arguments
///
/// * `state` - The current document (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the command violates a domain rule. Nothing is changed
/// in that case.
pub fn apply(
    state: &AppState,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let name: &'static str = command.name();

    let change: Change = match command {
        Command::RecordScore {
            category,
            key,
            pupil,
            exercise,
            value,
        } => record_score(state, category, &key, &pupil, exercise, &value)?,
        Command::SetExercise {
            category,
            key,
            facilitator,
            exercise,
            meta,
        } => set_exercise(state, category, &key, &facilitator, exercise, meta)?,
        Command::AddIntervention {
            category,
            key,
            pupil,
            date,
            note,
        } => edit_pupil(state, category, &key, &pupil, |snapshot| {
            let before: String = format!("interventions={}", snapshot.interventions.len());
            snapshot.interventions.push(Intervention {
                date: date.clone(),
                note: note.clone(),
            });
            let after: String = format!("interventions={}", snapshot.interventions.len());
            (before, after, format!("Logged intervention on {date} for {pupil}"))
        })?,
        Command::SetCorrectionStatus {
            category,
            key,
            pupil,
            exercise,
            status,
        } => {
            validate_exercise(exercise)?;
            edit_pupil(state, category, &key, &pupil, |snapshot| {
                let previous: CorrectionStatus = snapshot
                    .correction_status
                    .insert(exercise, status)
                    .unwrap_or_default();
                (
                    format!("done={},marked={}", previous.done, previous.marked),
                    format!("done={},marked={}", status.done, status.marked),
                    format!("Updated corrections for exercise {exercise} of {pupil}"),
                )
            })?
        }
        Command::EnrollPupil { class_name, entry } => enroll_pupil(state, &class_name, entry)?,
        Command::ImportRoster { rosters } => import_roster(state, rosters)?,
        Command::PurgePupil { class_name, pupil } => purge_pupil(state, &class_name, &pupil)?,
        Command::MigratePupil {
            pupil,
            from_class,
            to_class,
        } => {
            let migration: Migration = migrate_pupil(state, &pupil, &from_class, &to_class)?;
            Change {
                details: format!(
                    "Moved {pupil} from '{from_class}' to '{to_class}' ({} snapshots, roster {})",
                    migration.snapshots_moved,
                    if migration.roster_moved {
                        "moved"
                    } else {
                        "unchanged"
                    }
                ),
                new_state: migration.state,
                touched: migration.touched,
                before: format!("class={from_class}"),
                after: format!("class={to_class}"),
                class_name: Some(from_class),
            }
        }
        Command::AddStaff { staff } => add_staff(state, staff)?,
        Command::RemoveStaff { staff_id } => remove_staff(state, &staff_id)?,
        Command::AssignDuty { mapping } => assign_duty(state, mapping)?,
        Command::AddSubject { subject } => add_subject(state, subject)?,
        Command::UpsertWeeklyPlan { plan } => upsert_weekly_plan(state, plan)?,
        Command::UpdateSettings { settings } => {
            let mut new_state: AppState = state.clone();
            let previous_year: String = state.management.settings.academic_year.clone();
            let management: &mut ManagementState = new_state.management_mut();
            management.settings = settings;
            Change {
                before: format!("academic_year={previous_year}"),
                after: format!("academic_year={}", management.settings.academic_year),
                details: format!("Updated settings for '{}'", management.settings.school_name),
                new_state,
                touched: vec![SyncKey::Management],
                class_name: None,
            }
        }
        Command::ProvisionNode { node } => provision_node(state, node)?,
        Command::DecommissionNode { node_id } => decommission_node(state, &node_id)?,
    };

    let action: Action = Action::new(name.to_string(), Some(change.details));
    let before: StateSnapshot = StateSnapshot::new(change.before);
    let after: StateSnapshot = StateSnapshot::new(change.after);
    let audit_event: AuditEvent = match change.class_name {
        Some(class_name) => AuditEvent::new(actor, cause, action, before, after, class_name),
        None => AuditEvent::school_wide(actor, cause, action, before, after),
    };

    Ok(TransitionResult {
        new_state: change.new_state,
        audit_event,
        touched: change.touched,
    })
}

/// Loads the document with any missing roster pupils added, lets `edit`
/// change one pupil's snapshot and stores the document back.
fn edit_pupil<F>(
    state: &AppState,
    category: WorkCategory,
    key: &AssessmentKey,
    pupil: &PupilRef,
    edit: F,
) -> Result<Change, DomainError>
where
    F: FnOnce(&mut Pupil) -> (String, String, String),
{
    let mut document: AssessmentData = state.assessment_for_edit(category, key);
    let position: usize = document
        .find_pupil(pupil)
        .ok_or_else(|| DomainError::PupilNotFound {
            class_name: key.class_name().to_string(),
            pupil: pupil.to_string(),
        })?;
    let (before, after, details): (String, String, String) = edit(&mut document.pupils[position]);

    let mut new_state: AppState = state.clone();
    new_state.book_mut(category).insert(key.clone(), document);

    Ok(Change {
        new_state,
        touched: vec![SyncKey::assessment(category, key)],
        before,
        after,
        details: format!("{details} in {category} '{key}'"),
        class_name: Some(key.class_name().to_string()),
    })
}

fn record_score(
    state: &AppState,
    category: WorkCategory,
    key: &AssessmentKey,
    pupil: &PupilRef,
    exercise: u32,
    value: &str,
) -> Result<Change, DomainError> {
    validate_score(exercise, value)?;
    let value: &str = value.trim();

    edit_pupil(state, category, key, pupil, |snapshot| {
        let previous: Option<String> = if value.is_empty() {
            snapshot.scores.remove(&exercise)
        } else {
            snapshot.scores.insert(exercise, value.to_string())
        };
        (
            format!("score={}", previous.unwrap_or_default()),
            format!("score={value}"),
            format!("Recorded exercise {exercise} for {pupil}"),
        )
    })
}

fn set_exercise(
    state: &AppState,
    category: WorkCategory,
    key: &AssessmentKey,
    facilitator: &str,
    exercise: u32,
    meta: ExerciseMeta,
) -> Result<Change, DomainError> {
    validate_score(exercise, &meta.max_score)?;

    let mut document: AssessmentData = state.assessment_for_edit(category, key);
    if !facilitator.trim().is_empty() {
        document.facilitator = facilitator.trim().to_string();
    }
    let previous: Option<ExerciseMeta> = document.exercises.insert(exercise, meta);
    let before: String = format!(
        "max_score={}",
        previous.map(|p| p.max_score).unwrap_or_default()
    );
    let after: String = format!(
        "max_score={}",
        document
            .exercises
            .get(&exercise)
            .map(|m| m.max_score.as_str())
            .unwrap_or_default()
    );

    let mut new_state: AppState = state.clone();
    new_state.book_mut(category).insert(key.clone(), document);

    Ok(Change {
        new_state,
        touched: vec![SyncKey::assessment(category, key)],
        before,
        after,
        details: format!("Set exercise {exercise} in {category} '{key}'"),
        class_name: Some(key.class_name().to_string()),
    })
}

fn enroll_pupil(
    state: &AppState,
    class_name: &str,
    entry: MasterPupilEntry,
) -> Result<Change, DomainError> {
    validate_class_name(class_name)?;
    validate_roster_entry(&entry)?;

    let roster: &[MasterPupilEntry] = state.management.roster(class_name);
    if roster.iter().any(|existing| existing.same_pupil(&entry)) {
        return Err(DomainError::DuplicatePupil {
            class_name: class_name.to_string(),
            pupil: entry.name,
        });
    }
    let before: String = format!("roster_size={}", roster.len());

    let mut new_state: AppState = state.clone();
    let details: String = format!("Enrolled '{}' in '{class_name}'", entry.name);
    let roster: &mut Vec<MasterPupilEntry> = new_state
        .management_mut()
        .master_pupils
        .entry(class_name.to_string())
        .or_default();
    roster.push(entry);
    let after: String = format!("roster_size={}", roster.len());

    Ok(Change {
        new_state,
        touched: vec![SyncKey::roster(class_name)],
        before,
        after,
        details,
        class_name: Some(class_name.to_string()),
    })
}

fn import_roster(
    state: &AppState,
    rosters: BTreeMap<String, Vec<MasterPupilEntry>>,
) -> Result<Change, DomainError> {
    for (class_name, entries) in &rosters {
        validate_class_name(class_name)?;
        for entry in entries {
            validate_roster_entry(entry)?;
        }
    }

    let mut new_state: AppState = state.clone();
    let management: &mut ManagementState = new_state.management_mut();
    let mut added: usize = 0;
    let mut updated: usize = 0;
    let mut touched: Vec<SyncKey> = Vec::new();

    for (class_name, entries) in rosters {
        touched.push(SyncKey::roster(&class_name));
        let roster: &mut Vec<MasterPupilEntry> =
            management.master_pupils.entry(class_name).or_default();
        for entry in entries {
            if let Some(existing) = roster.iter_mut().find(|e| e.same_pupil(&entry)) {
                existing.gender = entry.gender;
                if !entry.student_id.is_empty() {
                    existing.student_id = entry.student_id;
                }
                updated += 1;
            } else {
                roster.push(entry);
                added += 1;
            }
        }
    }

    Ok(Change {
        before: format!("classes={}", state.management.master_pupils.len()),
        after: format!("classes={}", management.master_pupils.len()),
        details: format!(
            "Imported rosters for {} classes ({added} added, {updated} updated)",
            touched.len()
        ),
        new_state,
        touched,
        class_name: None,
    })
}

fn purge_pupil(
    state: &AppState,
    class_name: &str,
    pupil: &PupilRef,
) -> Result<Change, DomainError> {
    let mut new_state: AppState = state.clone();
    let mut touched: Vec<SyncKey> = Vec::new();

    let on_roster: bool = state
        .management
        .roster(class_name)
        .iter()
        .any(|entry| entry.matches(pupil));
    if on_roster {
        touched.push(SyncKey::roster(class_name));
        if let Some(roster) = new_state.management_mut().master_pupils.get_mut(class_name) {
            roster.retain(|entry| !entry.matches(pupil));
        }
    }

    for category in WorkCategory::ALL {
        let keys: Vec<AssessmentKey> = state
            .class_assessments(category, class_name)
            .filter(|(_, data)| data.find_pupil(pupil).is_some())
            .map(|(key, _)| key.clone())
            .collect();
        if keys.is_empty() {
            continue;
        }
        let book: &mut AssessmentBook = new_state.book_mut(category);
        for key in keys {
            if let Some(document) = book.get_mut(&key) {
                document.pupils.retain(|snapshot| !snapshot.matches(pupil));
            }
            touched.push(SyncKey::assessment(category, &key));
        }
    }

    if touched.is_empty() {
        return Err(DomainError::PupilNotFound {
            class_name: class_name.to_string(),
            pupil: pupil.to_string(),
        });
    }

    Ok(Change {
        before: format!("records={}", touched.len()),
        after: String::from("records=0"),
        details: format!("Purged {pupil} from '{class_name}'"),
        new_state,
        touched,
        class_name: Some(class_name.to_string()),
    })
}

fn add_staff(state: &AppState, staff: Staff) -> Result<Change, DomainError> {
    validate_staff(&staff.id, &staff.name)?;
    if state.management.staff_member(&staff.id).is_some() {
        return Err(DomainError::DuplicateStaff(staff.id));
    }

    let mut new_state: AppState = state.clone();
    let details: String = format!("Added {} '{}' ({})", staff.role, staff.name, staff.id);
    new_state.management_mut().staff.push(staff);

    Ok(management_change(state, new_state, details))
}

fn remove_staff(state: &AppState, staff_id: &str) -> Result<Change, DomainError> {
    if state.management.staff_member(staff_id).is_none() {
        return Err(DomainError::StaffNotFound(staff_id.to_string()));
    }

    let mut new_state: AppState = state.clone();
    let management: &mut ManagementState = new_state.management_mut();
    management.staff.retain(|s| s.id != staff_id);
    management.mappings.retain(|m| m.staff_id != staff_id);

    Ok(management_change(
        state,
        new_state,
        format!("Removed staff member '{staff_id}' and their duties"),
    ))
}

fn assign_duty(state: &AppState, mapping: DutyMapping) -> Result<Change, DomainError> {
    validate_class_name(&mapping.class_name)?;
    validate_subject(&mapping.subject)?;
    if state.management.staff_member(&mapping.staff_id).is_none() {
        return Err(DomainError::StaffNotFound(mapping.staff_id));
    }
    if !state.management.has_subject(&mapping.subject) {
        return Err(DomainError::SubjectNotFound(mapping.subject));
    }
    if state.management.mappings.contains(&mapping) {
        return Err(DomainError::DuplicateDuty {
            staff_id: mapping.staff_id,
            class_name: mapping.class_name,
            subject: mapping.subject,
        });
    }

    let mut new_state: AppState = state.clone();
    let details: String = format!(
        "Assigned '{}' to {} in '{}'",
        mapping.staff_id, mapping.subject, mapping.class_name
    );
    new_state.management_mut().mappings.push(mapping);

    Ok(management_change(state, new_state, details))
}

fn add_subject(state: &AppState, subject: String) -> Result<Change, DomainError> {
    validate_subject(&subject)?;
    if state.management.has_subject(&subject) {
        return Err(DomainError::DuplicateSubject(subject));
    }

    let mut new_state: AppState = state.clone();
    let details: String = format!("Added subject '{subject}'");
    new_state.management_mut().subjects.push(subject);

    Ok(management_change(state, new_state, details))
}

fn upsert_weekly_plan(state: &AppState, plan: WeeklyMapping) -> Result<Change, DomainError> {
    validate_class_name(&plan.class_name)?;
    validate_subject(&plan.subject)?;

    let mut new_state: AppState = state.clone();
    let details: String = format!(
        "Saved week {} plan for {} in '{}'",
        plan.week, plan.subject, plan.class_name
    );
    let plans: &mut Vec<WeeklyMapping> = &mut new_state.management_mut().weekly_mappings;
    match plans.iter_mut().find(|existing| existing.same_slot(&plan)) {
        Some(existing) => *existing = plan,
        None => plans.push(plan),
    }

    Ok(management_change(state, new_state, details))
}

fn provision_node(state: &AppState, node: SchoolNode) -> Result<Change, DomainError> {
    validate_node_id(&node.node_id)?;
    if state.management.node(&node.node_id).is_some() {
        return Err(DomainError::DuplicateNode(node.node_id));
    }

    let mut new_state: AppState = state.clone();
    let details: String = format!(
        "Provisioned node '{}' ({}) under hub '{}'",
        node.node_id, node.name, node.hub_id
    );
    new_state.management_mut().super_admin_registry.push(node);

    Ok(management_change(state, new_state, details))
}

fn decommission_node(state: &AppState, node_id: &str) -> Result<Change, DomainError> {
    if state.management.node(node_id).is_none() {
        return Err(DomainError::NodeNotFound(node_id.to_string()));
    }

    let mut new_state: AppState = state.clone();
    if let Some(node) = new_state
        .management_mut()
        .super_admin_registry
        .iter_mut()
        .find(|n| n.node_id == node_id)
    {
        node.status = NodeStatus::Decommissioned;
    }

    Ok(management_change(
        state,
        new_state,
        format!("Decommissioned node '{node_id}'"),
    ))
}

/// Builds the change for a school-wide management edit.
fn management_change(state: &AppState, new_state: AppState, details: String) -> Change {
    Change {
        before: summarize_management(&state.management),
        after: summarize_management(&new_state.management),
        new_state,
        touched: vec![SyncKey::Management],
        details,
        class_name: None,
    }
}

fn summarize_management(management: &ManagementState) -> String {
    format!(
        "staff={},subjects={},duties={},plans={},nodes={}",
        management.staff.len(),
        management.subjects.len(),
        management.mappings.len(),
        management.weekly_mappings.len(),
        management.super_admin_registry.len()
    )
}
