// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use schoolhub::StateStore;
use schoolhub_audit::Cause;
use schoolhub_domain::{
    AppState, AssessmentData, AssessmentKey, ExerciseMeta, MasterPupilEntry, Pupil, Staff,
    StaffRole, WorkCategory,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{AssessmentLocator, AuthenticatedActor, Role};

pub const TEST_KEY: &str = "2024/2025|1ST TERM|MONTH 1|1|Basic 1A|Math";

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), Role::Admin)
}

pub fn create_test_facilitator() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("facilitator-456"), Role::Facilitator)
}

pub fn create_test_super_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("super-789"), Role::SuperAdmin)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn create_test_timestamp() -> OffsetDateTime {
    datetime!(2025-03-14 09:30:00 UTC)
}

pub fn create_test_locator(category: &str, key: &str) -> AssessmentLocator {
    AssessmentLocator {
        category: category.to_string(),
        key: key.to_string(),
    }
}

/// Basic 1A with JOHN DOE and AMA, a class work document for Math where
/// JOHN DOE scored 8 on exercise 1, and one facilitator on staff.
pub fn create_test_state() -> AppState {
    let mut state: AppState = AppState::new();
    state.management_mut().master_pupils.insert(
        String::from("Basic 1A"),
        vec![
            MasterPupilEntry::new("JOHN DOE", "M", "STU-001"),
            MasterPupilEntry::new("AMA", "F", "STU-002"),
        ],
    );
    state.management_mut().subjects.push(String::from("Math"));
    state
        .management_mut()
        .staff
        .push(Staff::new("T-01", "Ama Owusu", StaffRole::Facilitator));

    let mut john: Pupil = Pupil::from_roster(&MasterPupilEntry::new("JOHN DOE", "M", "STU-001"));
    john.scores.insert(1, String::from("8"));
    let ama: Pupil = Pupil::from_roster(&MasterPupilEntry::new("AMA", "F", "STU-002"));

    let mut exercises: BTreeMap<u32, ExerciseMeta> = BTreeMap::new();
    exercises.insert(
        1,
        ExerciseMeta {
            max_score: String::from("10"),
            date: String::from("2024-09-16"),
            indicators: Vec::new(),
        },
    );
    let key: AssessmentKey = TEST_KEY.parse().unwrap();
    state.book_mut(WorkCategory::ClassWork).insert(
        key,
        AssessmentData {
            facilitator: String::from("Ama Owusu"),
            exercises,
            pupils: vec![john, ama],
        },
    );
    state
}

pub fn create_test_store() -> StateStore {
    StateStore::new(create_test_state())
}
