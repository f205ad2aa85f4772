// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, MasterPupilEntry, validate_class_name, validate_exercise, validate_node_id,
    validate_roster_entry, validate_score, validate_staff, validate_subject,
};

#[test]
fn test_validate_class_name_accepts_spaces() {
    assert!(validate_class_name("Basic 1A").is_ok());
}

#[test]
fn test_validate_class_name_rejects_empty() {
    let result: Result<(), DomainError> = validate_class_name("   ");
    assert!(matches!(result, Err(DomainError::InvalidClassName(_))));
}

#[test]
fn test_validate_class_name_rejects_separator() {
    let result: Result<(), DomainError> = validate_class_name("Basic|1A");
    assert!(matches!(result, Err(DomainError::InvalidClassName(_))));
}

#[test]
fn test_validate_subject_rejects_empty_and_separator() {
    assert!(validate_subject("Math").is_ok());
    assert!(matches!(
        validate_subject(""),
        Err(DomainError::InvalidSubject(_))
    ));
    assert!(matches!(
        validate_subject("Math|Core"),
        Err(DomainError::InvalidSubject(_))
    ));
}

#[test]
fn test_validate_roster_entry_requires_name() {
    assert!(validate_roster_entry(&MasterPupilEntry::new("AMA", "F", "")).is_ok());
    assert!(matches!(
        validate_roster_entry(&MasterPupilEntry::new(" ", "F", "S1")),
        Err(DomainError::InvalidName(_))
    ));
}

#[test]
fn test_validate_staff_requires_id_and_name() {
    assert!(validate_staff("ama@school.edu", "Ama Owusu").is_ok());
    assert!(matches!(
        validate_staff("", "Ama Owusu"),
        Err(DomainError::InvalidStaffId(_))
    ));
    assert!(matches!(
        validate_staff("ama@school.edu", ""),
        Err(DomainError::InvalidName(_))
    ));
}

#[test]
fn test_validate_node_id_rejects_whitespace() {
    assert!(validate_node_id("GH-ACC-001").is_ok());
    assert!(matches!(
        validate_node_id("GH ACC"),
        Err(DomainError::InvalidNodeId(_))
    ));
    assert!(matches!(
        validate_node_id(""),
        Err(DomainError::InvalidNodeId(_))
    ));
}

#[test]
fn test_validate_exercise_rejects_zero() {
    assert!(validate_exercise(1).is_ok());
    assert_eq!(validate_exercise(0), Err(DomainError::InvalidExercise(0)));
}

#[test]
fn test_validate_score_accepts_numbers_and_blank() {
    assert!(validate_score(1, "8").is_ok());
    assert!(validate_score(1, "7.5").is_ok());
    assert!(validate_score(1, "").is_ok());
}

#[test]
fn test_validate_score_rejects_text() {
    assert_eq!(
        validate_score(2, "absent"),
        Err(DomainError::InvalidScore {
            exercise: 2,
            value: String::from("absent"),
        })
    );
}
