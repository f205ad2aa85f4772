// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A composite assessment key could not be parsed or built.
    InvalidAssessmentKey(String),
    /// A class name is empty or contains a reserved character.
    InvalidClassName(String),
    /// A pupil name is empty or invalid.
    InvalidName(String),
    /// A subject name is empty or invalid.
    InvalidSubject(String),
    /// A staff identifier is empty or invalid.
    InvalidStaffId(String),
    /// A node identifier is empty or invalid.
    InvalidNodeId(String),
    /// Exercise numbers start at 1.
    InvalidExercise(u32),
    /// A score is not a numeric value.
    InvalidScore {
        /// The exercise number the score was recorded against.
        exercise: u32,
        /// The rejected value.
        value: String,
    },
    /// The reward fund must be a finite, non-negative amount.
    InvalidFundAmount(String),
    /// The pupil is not present in the class.
    PupilNotFound {
        /// The class that was searched.
        class_name: String,
        /// The pupil reference that was not found.
        pupil: String,
    },
    /// The pupil is already present in the class roster.
    DuplicatePupil {
        /// The class name.
        class_name: String,
        /// The duplicated pupil reference.
        pupil: String,
    },
    /// The staff member does not exist.
    StaffNotFound(String),
    /// A staff member with the same identifier already exists.
    DuplicateStaff(String),
    /// The duty assignment already exists.
    DuplicateDuty {
        /// The staff identifier.
        staff_id: String,
        /// The class name.
        class_name: String,
        /// The subject.
        subject: String,
    },
    /// The subject is already registered.
    DuplicateSubject(String),
    /// The subject has not been registered.
    SubjectNotFound(String),
    /// No assessment document exists for the key.
    AssessmentNotFound {
        /// The work category searched.
        category: String,
        /// The rendered assessment key.
        key: String,
    },
    /// A node with the same identifier is already provisioned.
    DuplicateNode(String),
    /// The node is not in the registry.
    NodeNotFound(String),
    /// Unrecognized work category name.
    UnknownWorkCategory(String),
    /// Unrecognized skill name.
    UnknownSkill(String),
    /// Unrecognized staff role.
    UnknownStaffRole(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAssessmentKey(msg) => write!(f, "Invalid assessment key: {msg}"),
            Self::InvalidClassName(msg) => write!(f, "Invalid class name: {msg}"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidSubject(msg) => write!(f, "Invalid subject: {msg}"),
            Self::InvalidStaffId(msg) => write!(f, "Invalid staff id: {msg}"),
            Self::InvalidNodeId(msg) => write!(f, "Invalid node id: {msg}"),
            Self::InvalidExercise(number) => {
                write!(f, "Invalid exercise number: {number}. Must be at least 1")
            }
            Self::InvalidScore { exercise, value } => {
                write!(f, "Invalid score '{value}' for exercise {exercise}")
            }
            Self::InvalidFundAmount(amount) => {
                write!(
                    f,
                    "Invalid fund amount: {amount}. Must be finite and non-negative"
                )
            }
            Self::PupilNotFound { class_name, pupil } => {
                write!(f, "Pupil '{pupil}' not found in class '{class_name}'")
            }
            Self::DuplicatePupil { class_name, pupil } => {
                write!(f, "Pupil '{pupil}' already exists in class '{class_name}'")
            }
            Self::StaffNotFound(id) => write!(f, "Staff member '{id}' not found"),
            Self::DuplicateStaff(id) => write!(f, "Staff member '{id}' already exists"),
            Self::DuplicateDuty {
                staff_id,
                class_name,
                subject,
            } => {
                write!(
                    f,
                    "Staff member '{staff_id}' is already assigned to {subject} in '{class_name}'"
                )
            }
            Self::DuplicateSubject(subject) => write!(f, "Subject '{subject}' already exists"),
            Self::SubjectNotFound(subject) => write!(f, "Subject '{subject}' not found"),
            Self::AssessmentNotFound { category, key } => {
                write!(f, "No {category} assessment found for '{key}'")
            }
            Self::DuplicateNode(id) => write!(f, "Node '{id}' is already provisioned"),
            Self::NodeNotFound(id) => write!(f, "Node '{id}' not found in registry"),
            Self::UnknownWorkCategory(name) => write!(f, "Unknown work category: {name}"),
            Self::UnknownSkill(name) => write!(f, "Unknown skill: {name}"),
            Self::UnknownStaffRole(name) => write!(f, "Unknown staff role: {name}"),
        }
    }
}

impl std::error::Error for DomainError {}
