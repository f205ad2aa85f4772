// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use schoolhub_audit::{Actor, Cause};
use schoolhub_domain::{
    AppState, AssessmentData, AssessmentKey, ExerciseMeta, MasterPupilEntry, Pupil, Staff,
    StaffRole, WorkCategory,
};
use std::collections::BTreeMap;

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("admin@school.edu"), String::from("staff"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

pub fn create_test_key(class_name: &str, subject: &str) -> AssessmentKey {
    AssessmentKey::new("2024/2025", "1ST TERM", "MONTH 1", "1", class_name, subject).unwrap()
}

pub fn create_test_pupil(name: &str, student_id: &str, scores: &[(u32, &str)]) -> Pupil {
    let mut pupil: Pupil = Pupil::from_roster(&MasterPupilEntry::new(name, "M", student_id));
    pupil.scores = scores
        .iter()
        .map(|(exercise, score)| (*exercise, (*score).to_string()))
        .collect();
    pupil
}

pub fn create_test_document(pupils: Vec<Pupil>) -> AssessmentData {
    let mut exercises: BTreeMap<u32, ExerciseMeta> = BTreeMap::new();
    exercises.insert(
        1,
        ExerciseMeta {
            max_score: String::from("10"),
            date: String::from("2024-09-16"),
            indicators: vec![String::from("B1.1.1.1")],
        },
    );
    AssessmentData {
        facilitator: String::from("Ama Owusu"),
        exercises,
        pupils,
    }
}

/// A document with JOHN DOE and AMA on the Basic 1A roster, JOHN DOE scored
/// 8 on exercise 1 of a class work and a home work document.
pub fn create_test_state() -> AppState {
    let mut state: AppState = AppState::new();
    state.management_mut().master_pupils.insert(
        String::from("Basic 1A"),
        vec![
            MasterPupilEntry::new("JOHN DOE", "M", "STU-001"),
            MasterPupilEntry::new("AMA", "F", "STU-002"),
        ],
    );
    for category in [WorkCategory::ClassWork, WorkCategory::HomeWork] {
        state.book_mut(category).insert(
            create_test_key("Basic 1A", "Math"),
            create_test_document(vec![
                create_test_pupil("JOHN DOE", "STU-001", &[(1, "8")]),
                create_test_pupil("AMA", "STU-002", &[(1, "6")]),
            ]),
        );
    }
    state
}

pub fn create_test_staff(id: &str, name: &str) -> Staff {
    Staff::new(id, name, StaffRole::Facilitator)
}
