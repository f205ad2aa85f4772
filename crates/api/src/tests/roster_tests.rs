// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use schoolhub::{StateStore, SyncKey};
use schoolhub_domain::{AssessmentData, AssessmentKey, WorkCategory};

use crate::{
    ApiError, EnrollPupilRequest, ImportRosterCsvRequest, MigratePupilRequest,
    PreviewRosterCsvRequest, PupilSelector, PurgePupilRequest, enroll_pupil, export_roster,
    import_roster_csv, list_roster, migrate_pupil, preview_roster_import, purge_pupil,
};

use super::helpers::{
    TEST_KEY, create_test_admin, create_test_cause, create_test_facilitator, create_test_store,
};

fn enroll_request(class_name: &str, name: &str, student_id: &str) -> EnrollPupilRequest {
    EnrollPupilRequest {
        class_name: class_name.to_string(),
        name: name.to_string(),
        gender: String::from("F"),
        student_id: student_id.to_string(),
    }
}

#[test]
fn test_enroll_pupil_appends_to_roster() {
    let mut store: StateStore = create_test_store();

    let result = enroll_pupil(
        &mut store,
        enroll_request("Basic 1A", "  ESI  ", "STU-003"),
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(result.audit_event.class_name.as_deref(), Some("Basic 1A"));
    let roster = store.current().management.roster("Basic 1A");
    assert_eq!(roster.len(), 3);
    assert_eq!(roster[2].name, "ESI");
    assert!(store.ledger().contains(&SyncKey::roster("Basic 1A")));
}

#[test]
fn test_enroll_duplicate_pupil_is_rule_violation() {
    let mut store: StateStore = create_test_store();

    let result = enroll_pupil(
        &mut store,
        enroll_request("Basic 1A", "Someone Else", "STU-001"),
        &create_test_admin(),
        create_test_cause(),
    );

    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "unique_pupil"),
        other => panic!("Expected DomainRuleViolation, got {other:?}"),
    }
}

#[test]
fn test_list_roster() {
    let store: StateStore = create_test_store();

    let response = list_roster(store.current(), "Basic 1A").unwrap();
    assert_eq!(response.class_name, "Basic 1A");
    assert_eq!(response.pupils.len(), 2);

    let empty = list_roster(store.current(), "Basic 6").unwrap();
    assert!(empty.pupils.is_empty());

    assert!(matches!(
        list_roster(store.current(), "Basic|1A"),
        Err(ApiError::InvalidInput { .. })
    ));
}

#[test]
fn test_purge_pupil_removes_roster_entry_and_snapshots() {
    let mut store: StateStore = create_test_store();

    purge_pupil(
        &mut store,
        PurgePupilRequest {
            class_name: String::from("Basic 1A"),
            pupil: PupilSelector::by_student_id("STU-001"),
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(store.current().management.roster("Basic 1A").len(), 1);
    let key: AssessmentKey = TEST_KEY.parse().unwrap();
    let document: &AssessmentData = store
        .current()
        .assessment(WorkCategory::ClassWork, &key)
        .unwrap();
    assert_eq!(document.pupils.len(), 1);
    assert_eq!(document.pupils[0].name, "AMA");
}

#[test]
fn test_migrate_pupil_moves_history() {
    let mut store: StateStore = create_test_store();

    let result = migrate_pupil(
        &mut store,
        MigratePupilRequest {
            pupil: PupilSelector::by_student_id("STU-001"),
            from_class: String::from("Basic 1A"),
            to_class: String::from("Basic 2A"),
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(result.response.action, "MigratePupil");
    assert_eq!(result.audit_event.before.data, "class=Basic 1A");
    assert_eq!(result.audit_event.after.data, "class=Basic 2A");

    let management = &store.current().management;
    assert_eq!(management.roster("Basic 1A").len(), 1);
    assert_eq!(management.roster("Basic 2A")[0].name, "JOHN DOE");

    let source: AssessmentKey = TEST_KEY.parse().unwrap();
    let destination: AssessmentKey = source.with_class("Basic 2A");
    let moved: &AssessmentData = store
        .current()
        .assessment(WorkCategory::ClassWork, &destination)
        .unwrap();
    assert_eq!(moved.pupils.len(), 1);
    assert_eq!(moved.pupils[0].score(1), Some(8.0));
    assert_eq!(moved.facilitator, "Ama Owusu");

    assert!(store.ledger().contains(&SyncKey::roster("Basic 2A")));
    assert!(
        store
            .ledger()
            .contains(&SyncKey::assessment(WorkCategory::ClassWork, &destination))
    );
}

#[test]
fn test_migrate_unknown_pupil_fails() {
    let mut store: StateStore = create_test_store();

    let result = migrate_pupil(
        &mut store,
        MigratePupilRequest {
            pupil: PupilSelector::by_name("NOBODY"),
            from_class: String::from("Basic 1A"),
            to_class: String::from("Basic 2A"),
        },
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
    assert!(store.ledger().is_empty());
}

#[test]
fn test_preview_roster_import_flags_existing_pupils() {
    let store: StateStore = create_test_store();
    let request = PreviewRosterCsvRequest {
        csv_content: String::from(
            "Class,Name,Gender,Student ID\nBasic 1A,JOHN DOE,M,STU-001\nBasic 2A,KOFI,M,STU-010\n",
        ),
    };

    let preview = preview_roster_import(store.current(), &request, &create_test_admin()).unwrap();

    assert_eq!(preview.valid_count, 2);
    assert!(preview.rows[0].existing);
    assert!(!preview.rows[1].existing);
}

#[test]
fn test_preview_roster_import_rejects_facilitator() {
    let store: StateStore = create_test_store();
    let request = PreviewRosterCsvRequest {
        csv_content: String::from("Class,Name\nBasic 1A,ESI\n"),
    };

    let result = preview_roster_import(store.current(), &request, &create_test_facilitator());
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_import_roster_csv_skips_invalid_rows() {
    let mut store: StateStore = create_test_store();
    let request = ImportRosterCsvRequest {
        csv_content: String::from(
            "Class,Name,Gender,Student ID\n\
             Basic 1A,JOHN DOE,F,STU-001\n\
             Basic 2A,KOFI,M,STU-010\n\
             Basic 2A,,M,STU-011\n",
        ),
    };

    let result = import_roster_csv(
        &mut store,
        &request,
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(result.response.classes, 2);
    assert_eq!(result.response.imported_rows, 2);
    assert_eq!(result.response.skipped_rows, 1);

    let management = &store.current().management;
    assert_eq!(management.roster("Basic 1A").len(), 2);
    assert_eq!(management.roster("Basic 1A")[0].gender, "F");
    assert_eq!(management.roster("Basic 2A").len(), 1);
    assert!(store.ledger().contains(&SyncKey::roster("Basic 2A")));
}

#[test]
fn test_import_roster_csv_without_valid_rows_fails() {
    let mut store: StateStore = create_test_store();
    let request = ImportRosterCsvRequest {
        csv_content: String::from("Class,Name\n,ESI\nBasic 1A,\n"),
    };

    let result = import_roster_csv(
        &mut store,
        &request,
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::InvalidCsvFormat { .. })));
    assert!(store.ledger().is_empty());
}

#[test]
fn test_export_roster_lists_every_class() {
    let store: StateStore = create_test_store();

    let csv_content = export_roster(store.current(), &create_test_admin()).unwrap();

    assert_eq!(
        csv_content,
        "Class,Name,Gender,Student ID\nBasic 1A,JOHN DOE,M,STU-001\nBasic 1A,AMA,F,STU-002\n"
    );
}
