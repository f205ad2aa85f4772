// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod analytics;
mod document;
mod error;
mod management;
mod rewards;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use analytics::{
    AT_RISK_MASTERY, ClassOutcome, Interpretation, LARGE_EFFECT_THRESHOLD, MasteryTally,
    RELIABLE_CHANGE_THRESHOLD, SD_FALLBACK, Skill, class_mastery, class_outcome, classify,
    collect_skill_pairs, effect_size, mean, outcome_report, reliable_change_index, sample_sd,
};
pub use document::{AppState, AssessmentBook};
pub use error::DomainError;
pub use management::{
    DutyMapping, ManagementState, NodeStatus, SchoolNode, SchoolSettings, Staff, StaffRole,
    WeeklyMapping,
};
pub use rewards::{
    ASSESSMENT_POINTS, BonusPolicy, EXERCISE_POINTS, EXERCISE_VOLUME_BONUS, EXERCISES_PER_DUTY,
    PLAN_POINTS, PLAN_STREAK_BONUS, PLANS_PER_DUTY, RewardMetrics, RewardReport,
    compute_reward_metrics,
};
pub use types::{
    AssessmentData, AssessmentKey, CorrectionStatus, ExerciseMeta, Intervention, KEY_SEPARATOR,
    MasterPupilEntry, Pupil, PupilRef, WorkCategory, parse_score,
};
pub use validation::{
    validate_class_name, validate_exercise, validate_node_id, validate_roster_entry,
    validate_score, validate_staff, validate_subject,
};
