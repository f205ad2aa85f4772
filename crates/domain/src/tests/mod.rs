// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod analytics;
mod error;
mod validation;

use crate::{AssessmentData, AssessmentKey, ExerciseMeta, Pupil};
use std::collections::BTreeMap;

pub fn create_test_key(class_name: &str, subject: &str, week: &str) -> AssessmentKey {
    AssessmentKey::new("2024/2025", "1ST TERM", "MONTH 1", week, class_name, subject).unwrap()
}

pub fn create_test_pupil(name: &str, student_id: &str, scores: &[(u32, &str)]) -> Pupil {
    Pupil {
        id: student_id.to_string(),
        student_id: student_id.to_string(),
        name: name.to_string(),
        gender: String::from("M"),
        scores: scores
            .iter()
            .map(|(exercise, score)| (*exercise, (*score).to_string()))
            .collect(),
        interventions: Vec::new(),
        correction_status: BTreeMap::new(),
    }
}

pub fn create_test_assessment(
    facilitator: &str,
    max_scores: &[(u32, &str)],
    pupils: Vec<Pupil>,
) -> AssessmentData {
    AssessmentData {
        facilitator: facilitator.to_string(),
        exercises: max_scores
            .iter()
            .map(|(exercise, max)| {
                (
                    *exercise,
                    ExerciseMeta {
                        max_score: (*max).to_string(),
                        date: String::from("2024-09-16"),
                        indicators: Vec::new(),
                    },
                )
            })
            .collect(),
        pupils,
    }
}
