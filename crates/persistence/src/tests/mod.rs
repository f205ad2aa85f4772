// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod storage_tests;

use schoolhub_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use schoolhub_domain::{
    AppState, AssessmentData, AssessmentKey, MasterPupilEntry, Pupil, Staff, StaffRole,
    WorkCategory,
};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("test-actor"), String::from("system"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn create_test_event(name: &str, class_name: Option<&str>) -> AuditEvent {
    let action: Action = Action::new(name.to_string(), Some(format!("{name} details")));
    let before: StateSnapshot = StateSnapshot::new(String::from("roster_size=1"));
    let after: StateSnapshot = StateSnapshot::new(String::from("roster_size=2"));
    match class_name {
        Some(class_name) => AuditEvent::new(
            create_test_actor(),
            create_test_cause(),
            action,
            before,
            after,
            class_name.to_string(),
        ),
        None => AuditEvent::school_wide(
            create_test_actor(),
            create_test_cause(),
            action,
            before,
            after,
        ),
    }
}

pub fn create_test_state() -> AppState {
    let mut state: AppState = AppState::new();
    let entry: MasterPupilEntry = MasterPupilEntry::new("JOHN DOE", "M", "STU-001");
    let mut pupil: Pupil = Pupil::from_roster(&entry);
    pupil.scores.insert(1, String::from("8"));
    state
        .management_mut()
        .master_pupils
        .insert(String::from("Basic 1A"), vec![entry]);
    state
        .management_mut()
        .staff
        .push(Staff::new("ama@school.edu", "Ama Owusu", StaffRole::Administrator));
    state.book_mut(WorkCategory::ClassWork).insert(
        AssessmentKey::new("2024/2025", "1ST TERM", "MONTH 1", "1", "Basic 1A", "Math").unwrap(),
        AssessmentData {
            facilitator: String::from("Ama Owusu"),
            exercises: std::collections::BTreeMap::new(),
            pupils: vec![pupil],
        },
    );
    state
}
