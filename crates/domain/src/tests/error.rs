// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InvalidClassName(String::from("test"));
    assert_eq!(format!("{err}"), "Invalid class name: test");

    let err: DomainError = DomainError::InvalidExercise(0);
    assert_eq!(
        format!("{err}"),
        "Invalid exercise number: 0. Must be at least 1"
    );

    let err: DomainError = DomainError::InvalidScore {
        exercise: 3,
        value: String::from("abc"),
    };
    assert_eq!(format!("{err}"), "Invalid score 'abc' for exercise 3");

    let err: DomainError = DomainError::PupilNotFound {
        class_name: String::from("Basic 1A"),
        pupil: String::from("JOHN DOE"),
    };
    assert_eq!(
        format!("{err}"),
        "Pupil 'JOHN DOE' not found in class 'Basic 1A'"
    );

    let err: DomainError = DomainError::DuplicateDuty {
        staff_id: String::from("ama@school.edu"),
        class_name: String::from("Basic 1A"),
        subject: String::from("Math"),
    };
    assert_eq!(
        format!("{err}"),
        "Staff member 'ama@school.edu' is already assigned to Math in 'Basic 1A'"
    );

    let err: DomainError = DomainError::AssessmentNotFound {
        category: String::from("classWork"),
        key: String::from("a|b|c|d|e|f"),
    };
    assert_eq!(
        format!("{err}"),
        "No classWork assessment found for 'a|b|c|d|e|f'"
    );

    let err: DomainError = DomainError::NodeNotFound(String::from("GH-001"));
    assert_eq!(format!("{err}"), "Node 'GH-001' not found in registry");
}
