// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{create_test_assessment, create_test_key, create_test_pupil};
use crate::{
    AppState, ClassOutcome, DomainError, Interpretation, MasteryTally, SD_FALLBACK, Skill,
    WorkCategory, class_mastery, class_outcome, classify, collect_skill_pairs, effect_size, mean,
    outcome_report, reliable_change_index, sample_sd,
};

const EPSILON: f64 = 1e-9;

fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < EPSILON
}

/// Adds a class work document where each pupil scored `score` out of 10.
fn add_marked_class(state: &mut AppState, class_name: &str, score: &str) {
    state.book_mut(WorkCategory::ClassWork).insert(
        create_test_key(class_name, "Math", "1"),
        create_test_assessment(
            "Ama Owusu",
            &[(1, "10")],
            vec![create_test_pupil("AMA", "S1", &[(1, score)])],
        ),
    );
}

#[test]
fn test_mean_of_empty_slice_is_zero() {
    assert!(approx(mean(&[]), 0.0));
    assert!(approx(mean(&[2.0, 4.0]), 3.0));
}

#[test]
fn test_sample_sd_uses_fallback_below_two_samples() {
    assert!(approx(sample_sd(&[]), SD_FALLBACK));
    assert!(approx(sample_sd(&[7.0]), SD_FALLBACK));
    assert!(approx(sample_sd(&[2.0, 4.0, 6.0]), 2.0));
}

#[test]
fn test_zero_variance_gives_zero_change() {
    let pre: [f64; 3] = [5.0, 5.0, 5.0];
    let post: [f64; 3] = [5.0, 5.0, 5.0];

    assert!(approx(reliable_change_index(&pre, &post), 0.0));
    assert!(approx(effect_size(&pre, &post), 0.0));
}

#[test]
fn test_reliable_change_and_effect_size() {
    let pre: [f64; 3] = [2.0, 4.0, 6.0];
    let post: [f64; 3] = [6.0, 8.0, 10.0];

    assert!(approx(reliable_change_index(&pre, &post), 4.0 / 8.0_f64.sqrt()));
    assert!(approx(effect_size(&pre, &post), 2.0));
}

#[test]
fn test_swapping_pre_and_post_flips_the_sign() {
    let pre: [f64; 3] = [2.0, 4.0, 6.0];
    let post: [f64; 3] = [6.0, 8.0, 10.0];

    let forward: f64 = reliable_change_index(&pre, &post);
    let backward: f64 = reliable_change_index(&post, &pre);
    assert!(approx(forward, -backward));

    let forward_es: f64 = effect_size(&pre, &post);
    let backward_es: f64 = effect_size(&post, &pre);
    assert!(approx(forward_es, -backward_es));
}

#[test]
fn test_single_pair_uses_fallback_sd() {
    let rci: f64 = reliable_change_index(&[1.0], &[3.0]);
    assert!(approx(rci, 2.0 / 0.5_f64.sqrt()));
}

#[test]
fn test_classify_first_matching_rule_wins() {
    assert_eq!(classify(2.5, 1.0, 10.0), Interpretation::TransformativeGrowth);
    assert_eq!(classify(2.5, 0.5, 10.0), Interpretation::ReliableImprovement);
    assert_eq!(classify(-2.5, -1.0, 90.0), Interpretation::SignificantRegression);
    assert_eq!(classify(0.0, 0.0, 39.9), Interpretation::AtRiskBaseline);
    assert_eq!(classify(1.96, 5.0, 40.0), Interpretation::StableProgression);
}

#[test]
fn test_interpretation_labels() {
    assert_eq!(
        Interpretation::TransformativeGrowth.label(),
        "Transformative Growth"
    );
    assert_eq!(Interpretation::AtRiskBaseline.label(), "At-Risk Baseline");
}

#[test]
fn test_skill_exercise_slots() {
    assert_eq!(Skill::Reading.pre_exercise(), 1);
    assert_eq!(Skill::Reading.post_exercise(), 2);
    assert_eq!(Skill::ProblemSolving.pre_exercise(), 11);
    assert_eq!(Skill::ProblemSolving.post_exercise(), 12);
}

#[test]
fn test_skill_parse() {
    assert_eq!("numeracy".parse::<Skill>(), Ok(Skill::Numeracy));
    assert_eq!("problemSolving".parse::<Skill>(), Ok(Skill::ProblemSolving));
    assert_eq!(
        "art".parse::<Skill>(),
        Err(DomainError::UnknownSkill(String::from("art")))
    );
}

#[test]
fn test_skill_pairs_require_both_scores() {
    let mut state: AppState = AppState::new();
    state.book_mut(WorkCategory::CriterionWork).insert(
        create_test_key("Basic 1A", "Literacy", "1"),
        create_test_assessment(
            "Ama Owusu",
            &[(1, "10"), (2, "10")],
            vec![
                create_test_pupil("AMA", "S1", &[(1, "4"), (2, "7")]),
                create_test_pupil("KOFI", "S2", &[(1, "5")]),
                create_test_pupil("ESI", "S3", &[(1, "abc"), (2, "6")]),
            ],
        ),
    );

    let (pre, post): (Vec<f64>, Vec<f64>) =
        collect_skill_pairs(&state, "Basic 1A", Skill::Reading);

    assert_eq!(pre, vec![4.0]);
    assert_eq!(post, vec![7.0]);
    assert!(collect_skill_pairs(&state, "Basic 1B", Skill::Reading).0.is_empty());
}

#[test]
fn test_mastery_counts_only_scored_work_with_max() {
    let mut state: AppState = AppState::new();
    state.book_mut(WorkCategory::ClassWork).insert(
        create_test_key("Basic 1A", "Math", "1"),
        create_test_assessment(
            "Ama Owusu",
            &[(1, "10"), (2, "")],
            vec![
                create_test_pupil("AMA", "S1", &[(1, "8"), (2, "5")]),
                create_test_pupil("KOFI", "S2", &[(1, "")]),
            ],
        ),
    );
    state.book_mut(WorkCategory::CriterionWork).insert(
        create_test_key("Basic 1A", "Literacy", "1"),
        create_test_assessment(
            "Ama Owusu",
            &[(1, "10")],
            vec![create_test_pupil("AMA", "S1", &[(1, "0")])],
        ),
    );

    let tally: MasteryTally = class_mastery(&state, "Basic 1A");

    assert!(approx(tally.obtained, 8.0));
    assert!(approx(tally.possible, 10.0));
    assert!(approx(tally.percentage(), 80.0));
}

#[test]
fn test_mastery_without_marks_is_zero() {
    let state: AppState = AppState::new();
    assert!(approx(class_mastery(&state, "Basic 1A").percentage(), 0.0));
}

#[test]
fn test_outcome_report_ranks_classes_by_z_score() {
    let mut state: AppState = AppState::new();
    add_marked_class(&mut state, "Basic 1A", "8");
    add_marked_class(&mut state, "Basic 1B", "4");
    add_marked_class(&mut state, "Basic 1C", "6");

    let report: Vec<ClassOutcome> = outcome_report(&state, Skill::Reading);

    let names: Vec<&str> = report.iter().map(|o| o.class_name.as_str()).collect();
    assert_eq!(names, vec!["Basic 1A", "Basic 1B", "Basic 1C"]);
    assert!(approx(report[0].z_score, 1.0));
    assert!(approx(report[1].z_score, -1.0));
    assert!(approx(report[2].z_score, 0.0));
}

#[test]
fn test_outcome_report_interpretation() {
    let mut state: AppState = AppState::new();
    add_marked_class(&mut state, "Basic 1A", "3");
    state.book_mut(WorkCategory::CriterionWork).insert(
        create_test_key("Basic 1A", "Literacy", "1"),
        create_test_assessment(
            "Ama Owusu",
            &[(1, "10"), (2, "10")],
            vec![
                create_test_pupil("AMA", "S1", &[(1, "2"), (2, "9")]),
                create_test_pupil("KOFI", "S2", &[(1, "3"), (2, "9")]),
                create_test_pupil("ESI", "S3", &[(1, "4"), (2, "10")]),
            ],
        ),
    );

    let report: Vec<ClassOutcome> = outcome_report(&state, Skill::Reading);
    let outcome: &ClassOutcome = &report[0];

    assert_eq!(outcome.samples, 3);
    assert!(approx(outcome.mean_pre, 3.0));
    assert!(outcome.rci > 1.96);
    assert!(outcome.effect_size > 0.8);
    assert_eq!(outcome.interpretation, Interpretation::TransformativeGrowth);
}

#[test]
fn test_class_outcome_for_unassessed_class() {
    let mut state: AppState = AppState::new();
    add_marked_class(&mut state, "Basic 1A", "8");

    let outcome: ClassOutcome = class_outcome(&state, "Basic 2A", Skill::Numeracy);

    assert_eq!(outcome.samples, 0);
    assert!(approx(outcome.mastery, 0.0));
    assert!(outcome.z_score < 0.0);
    assert_eq!(outcome.interpretation, Interpretation::AtRiskBaseline);
}
