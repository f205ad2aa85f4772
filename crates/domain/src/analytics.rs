// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outcome and compliance analytics.
//!
//! Pre/post criterion scores give a Reliable Change Index and an effect size
//! per class and skill. Marks from the scored work categories give a mastery
//! percentage per class, ranked across classes with a z-score. Each class is
//! then given one fixed threshold interpretation.

use crate::document::AppState;
use crate::error::DomainError;
use crate::types::WorkCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Standard deviation used when fewer than two samples exist.
pub const SD_FALLBACK: f64 = 0.5;
/// |RCI| above this is a reliable change at the 95% level.
pub const RELIABLE_CHANGE_THRESHOLD: f64 = 1.96;
/// Effect size above this is a large effect.
pub const LARGE_EFFECT_THRESHOLD: f64 = 0.8;
/// Mastery percentage below this marks an at-risk baseline.
pub const AT_RISK_MASTERY: f64 = 40.0;

/// The closed set of skills tracked by criterion work.
///
/// Skill `k` (zero-based) stores its pre score in exercise `2k+1` and its post
/// score in exercise `2k+2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    /// Reading.
    Reading,
    /// Writing.
    Writing,
    /// Speaking.
    Speaking,
    /// Listening.
    Listening,
    /// Numeracy.
    Numeracy,
    /// Problem solving.
    ProblemSolving,
}

impl Skill {
    /// Every skill in exercise order.
    pub const ALL: [Self; 6] = [
        Self::Reading,
        Self::Writing,
        Self::Speaking,
        Self::Listening,
        Self::Numeracy,
        Self::ProblemSolving,
    ];

    /// Zero-based position of the skill.
    #[must_use]
    pub const fn index(&self) -> u32 {
        match self {
            Self::Reading => 0,
            Self::Writing => 1,
            Self::Speaking => 2,
            Self::Listening => 3,
            Self::Numeracy => 4,
            Self::ProblemSolving => 5,
        }
    }

    /// Exercise holding the pre-intervention score.
    #[must_use]
    pub const fn pre_exercise(&self) -> u32 {
        2 * self.index() + 1
    }

    /// Exercise holding the post-intervention score.
    #[must_use]
    pub const fn post_exercise(&self) -> u32 {
        2 * self.index() + 2
    }

    /// Converts this skill to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Writing => "writing",
            Self::Speaking => "speaking",
            Self::Listening => "listening",
            Self::Numeracy => "numeracy",
            Self::ProblemSolving => "problemSolving",
        }
    }
}

impl FromStr for Skill {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|skill| skill.as_str() == s)
            .ok_or_else(|| DomainError::UnknownSkill(s.to_string()))
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Threshold classification of a class outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Interpretation {
    /// Reliable improvement with a large effect.
    TransformativeGrowth,
    /// Reliable improvement.
    ReliableImprovement,
    /// Reliable decline.
    SignificantRegression,
    /// Low mastery without a reliable change.
    AtRiskBaseline,
    /// Everything else.
    StableProgression,
}

impl Interpretation {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TransformativeGrowth => "Transformative Growth",
            Self::ReliableImprovement => "Reliable Improvement",
            Self::SignificantRegression => "Significant Regression",
            Self::AtRiskBaseline => "At-Risk Baseline",
            Self::StableProgression => "Stable Progression",
        }
    }
}

/// Marks obtained against marks possible for one class.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryTally {
    /// Sum of recorded scores.
    pub obtained: f64,
    /// Sum of the maximum scores of the exercises those scores belong to.
    pub possible: f64,
}

impl MasteryTally {
    /// Obtained over possible, as a percentage. Zero when nothing was possible.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.possible > 0.0 {
            self.obtained / self.possible * 100.0
        } else {
            0.0
        }
    }
}

/// Outcome statistics for one class and skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOutcome {
    /// The class.
    pub class_name: String,
    /// The skill the pre/post scores belong to.
    pub skill: Skill,
    /// Number of paired pre/post scores.
    pub samples: usize,
    /// Mean pre score.
    pub mean_pre: f64,
    /// Mean post score.
    pub mean_post: f64,
    /// Sample standard deviation of pre scores.
    pub sd_pre: f64,
    /// Sample standard deviation of post scores.
    pub sd_post: f64,
    /// Reliable Change Index.
    pub rci: f64,
    /// Effect size.
    pub effect_size: f64,
    /// Mastery percentage over scored work.
    pub mastery: f64,
    /// Mastery z-score against all assessed classes.
    pub z_score: f64,
    /// Threshold classification.
    pub interpretation: Interpretation,
}

/// Arithmetic mean, zero for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample standard deviation.
///
/// Returns [`SD_FALLBACK`] for fewer than two samples.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_sd(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return SD_FALLBACK;
    }
    let avg: f64 = mean(values);
    let squares: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    (squares / (values.len() - 1) as f64).sqrt()
}

/// Reliable Change Index: `(meanPost - meanPre) / sqrt(2 * sdPre^2)`.
///
/// Zero when the denominator is zero.
#[must_use]
pub fn reliable_change_index(pre: &[f64], post: &[f64]) -> f64 {
    let sd_pre: f64 = sample_sd(pre);
    let denominator: f64 = (2.0 * sd_pre.powi(2)).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    (mean(post) - mean(pre)) / denominator
}

/// Effect size over the pooled standard deviation.
///
/// Zero when the pooled standard deviation is zero.
#[must_use]
pub fn effect_size(pre: &[f64], post: &[f64]) -> f64 {
    let pooled: f64 = f64::midpoint(sample_sd(pre).powi(2), sample_sd(post).powi(2)).sqrt();
    if pooled == 0.0 {
        return 0.0;
    }
    (mean(post) - mean(pre)) / pooled
}

/// Classifies an outcome. The first matching rule wins.
#[must_use]
pub fn classify(rci: f64, effect_size: f64, mastery: f64) -> Interpretation {
    if rci > RELIABLE_CHANGE_THRESHOLD && effect_size > LARGE_EFFECT_THRESHOLD {
        Interpretation::TransformativeGrowth
    } else if rci > RELIABLE_CHANGE_THRESHOLD {
        Interpretation::ReliableImprovement
    } else if rci < -RELIABLE_CHANGE_THRESHOLD {
        Interpretation::SignificantRegression
    } else if mastery < AT_RISK_MASTERY {
        Interpretation::AtRiskBaseline
    } else {
        Interpretation::StableProgression
    }
}

/// Collects paired pre/post scores for a class and skill from criterion work.
///
/// A pupil contributes only when both scores parse as numbers.
#[must_use]
pub fn collect_skill_pairs(
    state: &AppState,
    class_name: &str,
    skill: Skill,
) -> (Vec<f64>, Vec<f64>) {
    let mut pre: Vec<f64> = Vec::new();
    let mut post: Vec<f64> = Vec::new();

    for (_, data) in state.class_assessments(WorkCategory::CriterionWork, class_name) {
        for pupil in &data.pupils {
            if let (Some(before), Some(after)) = (
                pupil.score(skill.pre_exercise()),
                pupil.score(skill.post_exercise()),
            ) {
                pre.push(before);
                post.push(after);
            }
        }
    }

    (pre, post)
}

/// Tallies marks for a class across the scored work categories.
///
/// A score counts when both it and its exercise's maximum parse and the
/// maximum is positive.
#[must_use]
pub fn class_mastery(state: &AppState, class_name: &str) -> MasteryTally {
    let mut tally: MasteryTally = MasteryTally::default();

    for category in WorkCategory::SCORED {
        for (_, data) in state.class_assessments(category, class_name) {
            for (number, exercise) in &data.exercises {
                let Some(max) = exercise.max_value() else {
                    continue;
                };
                for pupil in &data.pupils {
                    if let Some(score) = pupil.score(*number) {
                        tally.obtained += score;
                        tally.possible += max;
                    }
                }
            }
        }
    }

    tally
}

/// Builds the outcome report for every assessed class and the given skill.
///
/// Classes come out in name order.
#[must_use]
pub fn outcome_report(state: &AppState, skill: Skill) -> Vec<ClassOutcome> {
    let classes: BTreeSet<String> = state.assessed_classes();
    let masteries: Vec<(String, f64)> = classes
        .into_iter()
        .map(|class_name| {
            let mastery: f64 = class_mastery(state, &class_name).percentage();
            (class_name, mastery)
        })
        .collect();
    let values: Vec<f64> = masteries.iter().map(|(_, mastery)| *mastery).collect();
    let cross_mean: f64 = mean(&values);
    let cross_sd: f64 = sample_sd(&values);

    masteries
        .into_iter()
        .map(|(class_name, mastery)| {
            build_outcome(state, class_name, skill, mastery, cross_mean, cross_sd)
        })
        .collect()
}

/// Builds the outcome for a single class and skill.
///
/// The z-score is computed against every assessed class, including this one.
#[must_use]
pub fn class_outcome(state: &AppState, class_name: &str, skill: Skill) -> ClassOutcome {
    let mut classes: BTreeSet<String> = state.assessed_classes();
    classes.insert(class_name.to_string());
    let values: Vec<f64> = classes
        .iter()
        .map(|name| class_mastery(state, name).percentage())
        .collect();
    let mastery: f64 = class_mastery(state, class_name).percentage();

    build_outcome(
        state,
        class_name.to_string(),
        skill,
        mastery,
        mean(&values),
        sample_sd(&values),
    )
}

fn build_outcome(
    state: &AppState,
    class_name: String,
    skill: Skill,
    mastery: f64,
    cross_mean: f64,
    cross_sd: f64,
) -> ClassOutcome {
    let (pre, post): (Vec<f64>, Vec<f64>) = collect_skill_pairs(state, &class_name, skill);
    let rci: f64 = reliable_change_index(&pre, &post);
    let effect: f64 = effect_size(&pre, &post);
    let z_score: f64 = if cross_sd == 0.0 {
        0.0
    } else {
        (mastery - cross_mean) / cross_sd
    };

    ClassOutcome {
        class_name,
        skill,
        samples: pre.len(),
        mean_pre: mean(&pre),
        mean_post: mean(&post),
        sd_pre: sample_sd(&pre),
        sd_post: sample_sd(&post),
        rci,
        effect_size: effect,
        mastery,
        z_score,
        interpretation: classify(rci, effect, mastery),
    }
}
