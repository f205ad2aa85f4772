// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Merit point aggregation and cash dividend distribution for staff.
//!
//! The report is derived from the document on every call and never stored.

use crate::document::AppState;
use crate::error::DomainError;
use crate::management::{DutyMapping, ManagementState, Staff};
use crate::types::{AssessmentData, WorkCategory};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Points per completed weekly plan entry.
pub const PLAN_POINTS: u32 = 15;
/// Points per submitted assessment document.
pub const ASSESSMENT_POINTS: u32 = 10;
/// Points per exercise with a maximum score.
pub const EXERCISE_POINTS: u32 = 2;
/// Bonus for meeting the planning threshold.
pub const PLAN_STREAK_BONUS: u32 = 50;
/// Bonus for meeting the exercise volume threshold.
pub const EXERCISE_VOLUME_BONUS: u32 = 100;
/// Completed plans required per assigned duty.
pub const PLANS_PER_DUTY: u32 = 4;
/// Exercises required per assigned duty.
pub const EXERCISES_PER_DUTY: u32 = 12;

/// How bonus thresholds treat staff with no duty assignments.
///
/// With zero duties both thresholds are zero and therefore always met.
/// `Legacy` keeps that behavior; `RequireDuties` withholds bonuses instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BonusPolicy {
    /// Thresholds are applied as-is, even when they are zero.
    #[default]
    Legacy,
    /// Staff without duty assignments never earn bonuses.
    RequireDuties,
}

impl FromStr for BonusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(Self::Legacy),
            "require-duties" => Ok(Self::RequireDuties),
            _ => Err(format!(
                "unknown bonus policy '{s}' (expected 'legacy' or 'require-duties')"
            )),
        }
    }
}

/// Merit points and cash share for one staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardMetrics {
    /// The staff member's id.
    pub staff_id: String,
    /// The staff member's display name.
    pub name: String,
    /// Number of duty mappings assigned.
    pub subject_count: u32,
    /// Completed weekly plans within the staff member's duties.
    pub plans_completed: u32,
    /// Submitted assessment documents facilitated by the staff member.
    pub assessments_submitted: u32,
    /// Exercises with a maximum score across those documents.
    pub exercises_submitted: u32,
    /// Points from planning.
    pub plan_points: u32,
    /// Points from assessment submission.
    pub assessment_points: u32,
    /// Points from exercise volume.
    pub exercise_points: u32,
    /// Threshold bonuses.
    pub bonus_points: u32,
    /// Sum of all point categories.
    pub total_points: u32,
    /// Share of the fund proportional to `total_points`.
    pub cash_dividend: f64,
}

/// The staff leaderboard for a given fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardReport {
    /// The fund that was distributed.
    pub fund_amount: f64,
    /// Sum of every staff member's total points.
    pub points_pool: u64,
    /// Staff sorted by total points, highest first. Ties keep staff order.
    pub leaderboard: Vec<RewardMetrics>,
}

/// Computes merit points and cash dividends for every staff member.
///
/// # Arguments
///
/// * `state` - The application document
/// * `fund_amount` - The amount to distribute
/// * `policy` - How bonus thresholds treat staff without duties
///
/// # Errors
///
/// Returns an error if the fund is negative or not finite.
pub fn compute_reward_metrics(
    state: &AppState,
    fund_amount: f64,
    policy: BonusPolicy,
) -> Result<RewardReport, DomainError> {
    if !fund_amount.is_finite() || fund_amount < 0.0 {
        return Err(DomainError::InvalidFundAmount(fund_amount.to_string()));
    }

    let management: &ManagementState = &state.management;
    let mut leaderboard: Vec<RewardMetrics> = management
        .staff
        .iter()
        .map(|staff| score_staff(state, staff, policy))
        .collect();

    let points_pool: u64 = leaderboard
        .iter()
        .map(|metrics| u64::from(metrics.total_points))
        .sum();
    let pool_as_float: f64 = leaderboard
        .iter()
        .map(|metrics| f64::from(metrics.total_points))
        .sum();

    for metrics in &mut leaderboard {
        metrics.cash_dividend = if points_pool == 0 {
            0.0
        } else {
            f64::from(metrics.total_points) / pool_as_float * fund_amount
        };
    }

    // Vec::sort_by is stable, so ties keep encounter order.
    leaderboard.sort_by(|a, b| b.total_points.cmp(&a.total_points));

    Ok(RewardReport {
        fund_amount,
        points_pool,
        leaderboard,
    })
}

fn score_staff(state: &AppState, staff: &Staff, policy: BonusPolicy) -> RewardMetrics {
    let management: &ManagementState = &state.management;
    let duties: Vec<&DutyMapping> = management.duties_for(&staff.id).collect();
    let subject_count: u32 = saturating_count(duties.len());

    let plans_completed: u32 = saturating_count(
        management
            .weekly_mappings
            .iter()
            .filter(|plan| plan.is_completed())
            .filter(|plan| {
                duties
                    .iter()
                    .any(|duty| duty.covers(&plan.class_name, &plan.subject))
            })
            .count(),
    );

    let facilitated: Vec<&AssessmentData> = WorkCategory::SCORED
        .iter()
        .flat_map(|category| state.book(*category).values())
        .filter(|data| facilitator_matches(&data.facilitator, &staff.name))
        .filter(|data| data.is_submitted())
        .collect();
    let assessments_submitted: u32 = saturating_count(facilitated.len());
    let exercises_submitted: u32 = saturating_count(
        facilitated
            .iter()
            .map(|data| data.submitted_exercise_count())
            .sum(),
    );

    let plan_points: u32 = PLAN_POINTS.saturating_mul(plans_completed);
    let assessment_points: u32 = ASSESSMENT_POINTS.saturating_mul(assessments_submitted);
    let exercise_points: u32 = EXERCISE_POINTS.saturating_mul(exercises_submitted);

    let bonus_eligible: bool = match policy {
        BonusPolicy::Legacy => true,
        BonusPolicy::RequireDuties => subject_count > 0,
    };
    let mut bonus_points: u32 = 0;
    if bonus_eligible {
        if plans_completed >= subject_count.saturating_mul(PLANS_PER_DUTY) {
            bonus_points += PLAN_STREAK_BONUS;
        }
        if exercises_submitted >= subject_count.saturating_mul(EXERCISES_PER_DUTY) {
            bonus_points += EXERCISE_VOLUME_BONUS;
        }
    }

    let total_points: u32 = plan_points
        .saturating_add(assessment_points)
        .saturating_add(exercise_points)
        .saturating_add(bonus_points);

    RewardMetrics {
        staff_id: staff.id.clone(),
        name: staff.name.clone(),
        subject_count,
        plans_completed,
        assessments_submitted,
        exercises_submitted,
        plan_points,
        assessment_points,
        exercise_points,
        bonus_points,
        total_points,
        cash_dividend: 0.0,
    }
}

/// Facilitator names are typed free-hand, so compare trimmed and case-insensitively.
fn facilitator_matches(facilitator: &str, staff_name: &str) -> bool {
    let facilitator: &str = facilitator.trim();
    !facilitator.is_empty() && facilitator.eq_ignore_ascii_case(staff_name.trim())
}

fn saturating_count(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
