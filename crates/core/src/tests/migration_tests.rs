// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    create_test_actor, create_test_cause, create_test_document, create_test_key, create_test_pupil,
    create_test_state,
};
use crate::{Command, Migration, SyncKey, TransitionResult, apply, migrate_pupil};
use schoolhub_domain::{
    AppState, AssessmentData, AssessmentKey, CorrectionStatus, DomainError, Intervention,
    MasterPupilEntry, Pupil, PupilRef, WorkCategory,
};
use std::sync::Arc;

fn pupils_named<'a>(data: &'a AssessmentData, name: &str) -> Vec<&'a Pupil> {
    data.pupils.iter().filter(|p| p.name == name).collect()
}

#[test]
fn test_migration_moves_roster_and_history() {
    let state: AppState = create_test_state();
    let pupil: PupilRef = PupilRef::Name(String::from("JOHN DOE"));

    let migration: Migration = migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1B").unwrap();
    let next: AppState = migration.state;

    let destination: &AssessmentData = next
        .assessment(WorkCategory::ClassWork, &create_test_key("Basic 1B", "Math"))
        .unwrap();
    let moved: Vec<&Pupil> = pupils_named(destination, "JOHN DOE");
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].scores.get(&1).map(String::as_str), Some("8"));
    assert_eq!(destination.facilitator, "Ama Owusu");
    assert_eq!(destination.exercises.len(), 1);

    let source: &AssessmentData = next
        .assessment(WorkCategory::ClassWork, &create_test_key("Basic 1A", "Math"))
        .unwrap();
    assert!(pupils_named(source, "JOHN DOE").is_empty());
    assert_eq!(pupils_named(source, "AMA").len(), 1);

    let from_roster: Vec<&str> = next
        .management
        .roster("Basic 1A")
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    let to_roster: Vec<&str> = next
        .management
        .roster("Basic 1B")
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(from_roster, vec!["AMA"]);
    assert_eq!(to_roster, vec!["JOHN DOE"]);

    assert_eq!(migration.snapshots_moved, 2);
    assert!(migration.roster_moved);
}

#[test]
fn test_migration_covers_every_category() {
    let state: AppState = create_test_state();
    let pupil: PupilRef = PupilRef::StudentId(String::from("STU-001"));

    let next: AppState = migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1B")
        .unwrap()
        .state;

    for category in WorkCategory::ALL {
        for (_, data) in next.class_assessments(category, "Basic 1A") {
            assert!(data.find_pupil(&pupil).is_none());
        }
    }
    assert!(
        next.assessment(WorkCategory::HomeWork, &create_test_key("Basic 1B", "Math"))
            .unwrap()
            .find_pupil(&pupil)
            .is_some()
    );
}

#[test]
fn test_migration_to_same_class_is_noop() {
    let state: AppState = create_test_state();
    let pupil: PupilRef = PupilRef::Name(String::from("JOHN DOE"));

    let migration: Migration = migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1A").unwrap();

    assert_eq!(migration.state, state);
    assert!(migration.touched.is_empty());
}

#[test]
fn test_migration_of_unknown_pupil_fails() {
    let state: AppState = create_test_state();
    let pupil: PupilRef = PupilRef::Name(String::from("NOBODY"));

    let result: Result<Migration, DomainError> =
        migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1B");

    assert!(matches!(result, Err(DomainError::PupilNotFound { .. })));
}

#[test]
fn test_migration_rejects_invalid_destination() {
    let state: AppState = create_test_state();
    let pupil: PupilRef = PupilRef::Name(String::from("JOHN DOE"));

    let result: Result<Migration, DomainError> =
        migrate_pupil(&state, &pupil, "Basic 1A", "Basic|1B");

    assert!(matches!(result, Err(DomainError::InvalidClassName(_))));
}

#[test]
fn test_migration_replaces_existing_destination_snapshot() {
    let mut state: AppState = create_test_state();
    state.book_mut(WorkCategory::ClassWork).insert(
        create_test_key("Basic 1B", "Math"),
        create_test_document(vec![create_test_pupil(
            "JOHN DOE",
            "STU-001",
            &[(1, "2")],
        )]),
    );
    let pupil: PupilRef = PupilRef::StudentId(String::from("STU-001"));

    let next: AppState = migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1B")
        .unwrap()
        .state;

    let destination: &AssessmentData = next
        .assessment(WorkCategory::ClassWork, &create_test_key("Basic 1B", "Math"))
        .unwrap();
    let moved: Vec<&Pupil> = pupils_named(destination, "JOHN DOE");
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].scores.get(&1).map(String::as_str), Some("8"));
}

#[test]
fn test_migration_replaces_existing_destination_roster_entry() {
    let mut state: AppState = create_test_state();
    state.management_mut().master_pupils.insert(
        String::from("Basic 1B"),
        vec![
            MasterPupilEntry::new("JOHN DOE", "M", "STU-001"),
            MasterPupilEntry::new("KOFI", "M", "STU-010"),
        ],
    );
    let pupil: PupilRef = PupilRef::StudentId(String::from("STU-001"));

    let migration: Migration = migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1B").unwrap();

    let destination: &[MasterPupilEntry] = migration.state.management.roster("Basic 1B");
    let copies: usize = destination
        .iter()
        .filter(|entry| entry.student_id == "STU-001")
        .count();
    assert_eq!(copies, 1);
    assert_eq!(destination.len(), 2);
    assert!(
        migration
            .state
            .management
            .roster("Basic 1A")
            .iter()
            .all(|entry| entry.student_id != "STU-001")
    );
}

#[test]
fn test_migration_without_roster_entry_moves_snapshots() {
    let mut state: AppState = create_test_state();
    state.management_mut().master_pupils.clear();
    let pupil: PupilRef = PupilRef::Name(String::from("JOHN DOE"));

    let migration: Migration = migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1B").unwrap();

    assert!(!migration.roster_moved);
    assert_eq!(migration.snapshots_moved, 2);
    assert!(migration.state.management.master_pupils.is_empty());
}

#[test]
fn test_migration_keeps_interventions_and_corrections() {
    let mut state: AppState = create_test_state();
    let key: AssessmentKey = create_test_key("Basic 1A", "Math");
    let document: &mut AssessmentData = state
        .book_mut(WorkCategory::ClassWork)
        .get_mut(&key)
        .unwrap();
    document.pupils[0].interventions.push(Intervention {
        date: String::from("2024-09-20"),
        note: String::from("Extra reading time"),
    });
    document.pupils[0].correction_status.insert(
        1,
        CorrectionStatus {
            done: true,
            marked: false,
        },
    );
    let pupil: PupilRef = PupilRef::Name(String::from("JOHN DOE"));

    let next: AppState = migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1B")
        .unwrap()
        .state;

    let destination: &AssessmentData = next
        .assessment(WorkCategory::ClassWork, &key.with_class("Basic 1B"))
        .unwrap();
    let moved: &Pupil = pupils_named(destination, "JOHN DOE")[0];
    assert_eq!(moved.interventions.len(), 1);
    assert_eq!(moved.interventions[0].note, "Extra reading time");
    assert!(moved.correction_status[&1].done);
}

#[test]
fn test_migration_shares_untouched_slices() {
    let state: AppState = create_test_state();
    let pupil: PupilRef = PupilRef::Name(String::from("JOHN DOE"));

    let next: AppState = migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1B")
        .unwrap()
        .state;

    assert!(Arc::ptr_eq(&state.project_work, &next.project_work));
    assert!(Arc::ptr_eq(&state.criterion_work, &next.criterion_work));
    assert!(!Arc::ptr_eq(&state.class_work, &next.class_work));
}

#[test]
fn test_migration_reports_touched_keys() {
    let state: AppState = create_test_state();
    let pupil: PupilRef = PupilRef::Name(String::from("JOHN DOE"));

    let migration: Migration = migrate_pupil(&state, &pupil, "Basic 1A", "Basic 1B").unwrap();

    let expected: [SyncKey; 6] = [
        SyncKey::roster("Basic 1A"),
        SyncKey::roster("Basic 1B"),
        SyncKey::assessment(WorkCategory::ClassWork, &create_test_key("Basic 1A", "Math")),
        SyncKey::assessment(WorkCategory::ClassWork, &create_test_key("Basic 1B", "Math")),
        SyncKey::assessment(WorkCategory::HomeWork, &create_test_key("Basic 1A", "Math")),
        SyncKey::assessment(WorkCategory::HomeWork, &create_test_key("Basic 1B", "Math")),
    ];
    for key in &expected {
        assert!(migration.touched.contains(key), "missing {key}");
    }
    assert_eq!(migration.touched.len(), expected.len());
}

#[test]
fn test_migrate_command_emits_class_scoped_audit_event() {
    let state: AppState = create_test_state();
    let command: Command = Command::MigratePupil {
        pupil: PupilRef::Name(String::from("JOHN DOE")),
        from_class: String::from("Basic 1A"),
        to_class: String::from("Basic 1B"),
    };

    let result: TransitionResult =
        apply(&state, command, create_test_actor(), create_test_cause()).unwrap();

    assert_eq!(result.audit_event.action.name, "MigratePupil");
    assert_eq!(result.audit_event.class_name.as_deref(), Some("Basic 1A"));
    assert_eq!(result.audit_event.before.data, "class=Basic 1A");
    assert_eq!(result.audit_event.after.data, "class=Basic 1B");
    assert!(
        result
            .audit_event
            .action
            .details
            .unwrap()
            .contains("2 snapshots")
    );
}
