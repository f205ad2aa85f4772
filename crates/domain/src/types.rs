// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Separator between the segments of a rendered assessment key.
pub const KEY_SEPARATOR: char = '|';

/// The work categories an assessment document can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkCategory {
    /// Work done in class.
    ClassWork,
    /// Work done at home.
    HomeWork,
    /// Longer-running project work.
    ProjectWork,
    /// Pre/post criterion-referenced assessments used for outcome analytics.
    CriterionWork,
}

impl WorkCategory {
    /// Every category, in document order.
    pub const ALL: [Self; 4] = [
        Self::ClassWork,
        Self::HomeWork,
        Self::ProjectWork,
        Self::CriterionWork,
    ];

    /// The categories that contribute marks and merit points.
    pub const SCORED: [Self; 3] = [Self::ClassWork, Self::HomeWork, Self::ProjectWork];

    /// Returns the document field name for this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClassWork => "classWork",
            Self::HomeWork => "homeWork",
            Self::ProjectWork => "projectWork",
            Self::CriterionWork => "criterionWork",
        }
    }
}

impl FromStr for WorkCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classWork" => Ok(Self::ClassWork),
            "homeWork" => Ok(Self::HomeWork),
            "projectWork" => Ok(Self::ProjectWork),
            "criterionWork" => Ok(Self::CriterionWork),
            _ => Err(DomainError::UnknownWorkCategory(s.to_string())),
        }
    }
}

impl std::fmt::Display for WorkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies one assessment document.
///
/// The key is the `(year, term, month, week, class, subject)` tuple and is
/// rendered as a pipe-delimited string, e.g.
/// `2024/2025|1ST TERM|MONTH 1|1|Basic 1A|Math`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssessmentKey {
    year: String,
    term: String,
    month: String,
    week: String,
    class_name: String,
    subject: String,
}

impl AssessmentKey {
    /// Creates a new `AssessmentKey`.
    ///
    /// # Arguments
    ///
    /// * `year` - The academic year (e.g. `2024/2025`)
    /// * `term` - The term label
    /// * `month` - The month label
    /// * `week` - The week label
    /// * `class_name` - The class the document belongs to
    /// * `subject` - The subject
    ///
    /// # Errors
    ///
    /// Returns an error if any segment is empty or contains the key separator.
    pub fn new(
        year: &str,
        term: &str,
        month: &str,
        week: &str,
        class_name: &str,
        subject: &str,
    ) -> Result<Self, DomainError> {
        let segments: [&str; 6] = [year, term, month, week, class_name, subject];
        for segment in segments {
            if segment.trim().is_empty() {
                return Err(DomainError::InvalidAssessmentKey(String::from(
                    "Key segments cannot be empty",
                )));
            }
            if segment.contains(KEY_SEPARATOR) {
                return Err(DomainError::InvalidAssessmentKey(format!(
                    "Segment '{segment}' contains '{KEY_SEPARATOR}'"
                )));
            }
        }

        Ok(Self {
            year: year.to_string(),
            term: term.to_string(),
            month: month.to_string(),
            week: week.to_string(),
            class_name: class_name.to_string(),
            subject: subject.to_string(),
        })
    }

    /// Returns the academic year segment.
    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }

    /// Returns the term segment.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Returns the month segment.
    #[must_use]
    pub fn month(&self) -> &str {
        &self.month
    }

    /// Returns the week segment.
    #[must_use]
    pub fn week(&self) -> &str {
        &self.week
    }

    /// Returns the class segment.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the subject segment.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the same key with the class segment replaced.
    ///
    /// The caller is responsible for passing a validated class name.
    #[must_use]
    pub fn with_class(&self, class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            ..self.clone()
        }
    }
}

impl std::fmt::Display for AssessmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
            self.year,
            self.term,
            self.month,
            self.week,
            self.class_name,
            self.subject,
            sep = KEY_SEPARATOR
        )
    }
}

impl FromStr for AssessmentKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split(KEY_SEPARATOR).collect();
        if segments.len() != 6 {
            return Err(DomainError::InvalidAssessmentKey(format!(
                "Expected 6 segments in '{s}', found {}",
                segments.len()
            )));
        }
        Self::new(
            segments[0],
            segments[1],
            segments[2],
            segments[3],
            segments[4],
            segments[5],
        )
    }
}

impl Serialize for AssessmentKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssessmentKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a string-encoded score or max score.
///
/// Returns `None` for empty, non-numeric or non-finite values.
#[must_use]
pub fn parse_score(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// How a pupil is identified across rosters and assessment documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "camelCase")]
pub enum PupilRef {
    /// Match on the display name. First match wins; kept for compatibility
    /// with documents whose pupils have no student id.
    Name(String),
    /// Match on the durable student identifier.
    StudentId(String),
}

impl std::fmt::Display for PupilRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::StudentId(id) => write!(f, "#{id}"),
        }
    }
}

/// A dated note recording support given to a pupil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intervention {
    /// When the intervention happened (free-form date string).
    pub date: String,
    /// What was done.
    pub note: String,
}

/// Correction tracking for a single exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionStatus {
    /// The pupil has done the corrections.
    pub done: bool,
    /// The facilitator has marked the corrections.
    pub marked: bool,
}

/// A pupil's snapshot inside one assessment document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pupil {
    /// Snapshot identifier.
    pub id: String,
    /// Durable student identifier (may be empty in legacy documents).
    #[serde(default)]
    pub student_id: String,
    /// Display name.
    pub name: String,
    /// Gender as recorded on the roster.
    #[serde(default)]
    pub gender: String,
    /// Exercise number to string-encoded score.
    #[serde(default)]
    pub scores: BTreeMap<u32, String>,
    /// Append-only intervention log.
    #[serde(default)]
    pub interventions: Vec<Intervention>,
    /// Exercise number to correction state.
    #[serde(default)]
    pub correction_status: BTreeMap<u32, CorrectionStatus>,
}

impl Pupil {
    /// Creates a blank snapshot for a roster entry.
    #[must_use]
    pub fn from_roster(entry: &MasterPupilEntry) -> Self {
        let id: String = if entry.student_id.is_empty() {
            entry.name.clone()
        } else {
            entry.student_id.clone()
        };
        Self {
            id,
            student_id: entry.student_id.clone(),
            name: entry.name.clone(),
            gender: entry.gender.clone(),
            scores: BTreeMap::new(),
            interventions: Vec::new(),
            correction_status: BTreeMap::new(),
        }
    }

    /// Checks whether this snapshot is the referenced pupil.
    #[must_use]
    pub fn matches(&self, pupil: &PupilRef) -> bool {
        match pupil {
            PupilRef::Name(name) => &self.name == name,
            PupilRef::StudentId(id) => !id.is_empty() && &self.student_id == id,
        }
    }

    /// Returns the parsed score for an exercise, if one was recorded.
    #[must_use]
    pub fn score(&self, exercise: u32) -> Option<f64> {
        self.scores.get(&exercise).and_then(|raw| parse_score(raw))
    }
}

/// Metadata for one exercise inside an assessment document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseMeta {
    /// String-encoded maximum score. Empty means the exercise was not set.
    #[serde(default)]
    pub max_score: String,
    /// Date the exercise was given.
    #[serde(default)]
    pub date: String,
    /// Curriculum indicator codes covered.
    #[serde(default)]
    pub indicators: Vec<String>,
}

impl ExerciseMeta {
    /// Whether a maximum score has been entered.
    #[must_use]
    pub fn has_max_score(&self) -> bool {
        !self.max_score.trim().is_empty()
    }

    /// The parsed maximum score, if positive.
    #[must_use]
    pub fn max_value(&self) -> Option<f64> {
        parse_score(&self.max_score).filter(|max| *max > 0.0)
    }
}

/// One assessment document for a single `AssessmentKey`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentData {
    /// Name of the staff member who set the work.
    #[serde(default)]
    pub facilitator: String,
    /// Exercise number to metadata.
    #[serde(default)]
    pub exercises: BTreeMap<u32, ExerciseMeta>,
    /// Pupil snapshots for this document.
    #[serde(default)]
    pub pupils: Vec<Pupil>,
}

impl AssessmentData {
    /// Returns the index of the first snapshot matching the pupil.
    #[must_use]
    pub fn find_pupil(&self, pupil: &PupilRef) -> Option<usize> {
        self.pupils.iter().position(|p| p.matches(pupil))
    }

    /// Returns a copy of this document's shape with no pupils.
    #[must_use]
    pub fn empty_shape(&self) -> Self {
        Self {
            facilitator: self.facilitator.clone(),
            exercises: self.exercises.clone(),
            pupils: Vec::new(),
        }
    }

    /// Number of exercises with a maximum score entered.
    #[must_use]
    pub fn submitted_exercise_count(&self) -> usize {
        self.exercises
            .values()
            .filter(|exercise| exercise.has_max_score())
            .count()
    }

    /// A document counts as submitted once it has a set exercise or a pupil.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted_exercise_count() > 0 || !self.pupils.is_empty()
    }
}

/// Canonical roster entry for a pupil within a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterPupilEntry {
    /// Display name.
    pub name: String,
    /// Gender.
    #[serde(default)]
    pub gender: String,
    /// Durable student identifier.
    #[serde(default)]
    pub student_id: String,
}

impl MasterPupilEntry {
    /// Creates a new roster entry.
    ///
    /// # Arguments
    ///
    /// * `name` - The pupil's display name
    /// * `gender` - The pupil's gender
    /// * `student_id` - The durable student identifier
    #[must_use]
    pub fn new(name: &str, gender: &str, student_id: &str) -> Self {
        Self {
            name: name.to_string(),
            gender: gender.to_string(),
            student_id: student_id.to_string(),
        }
    }

    /// Checks whether this entry is the referenced pupil.
    #[must_use]
    pub fn matches(&self, pupil: &PupilRef) -> bool {
        match pupil {
            PupilRef::Name(name) => &self.name == name,
            PupilRef::StudentId(id) => !id.is_empty() && &self.student_id == id,
        }
    }

    /// Whether two entries describe the same pupil.
    ///
    /// Student ids win when both sides carry one; names are the fallback.
    #[must_use]
    pub fn same_pupil(&self, other: &Self) -> bool {
        if !self.student_id.is_empty() && !other.student_id.is_empty() {
            return self.student_id == other.student_id;
        }
        self.name == other.name
    }
}
