// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{KEY_SEPARATOR, MasterPupilEntry, parse_score};

/// Validates a class name.
///
/// Class names end up as a segment of assessment keys, so the key separator is
/// not allowed.
///
/// # Errors
///
/// Returns an error if the name is empty or contains the key separator.
pub fn validate_class_name(class_name: &str) -> Result<(), DomainError> {
    if class_name.trim().is_empty() {
        return Err(DomainError::InvalidClassName(String::from(
            "Class name cannot be empty",
        )));
    }
    if class_name.contains(KEY_SEPARATOR) {
        return Err(DomainError::InvalidClassName(format!(
            "Class name '{class_name}' cannot contain '{KEY_SEPARATOR}'"
        )));
    }
    Ok(())
}

/// Validates the fields of a roster entry.
///
/// # Errors
///
/// Returns an error if the pupil name is empty.
pub fn validate_roster_entry(entry: &MasterPupilEntry) -> Result<(), DomainError> {
    if entry.name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Pupil name cannot be empty",
        )));
    }
    Ok(())
}

/// Validates a subject name.
///
/// # Errors
///
/// Returns an error if the subject is empty or contains the key separator.
pub fn validate_subject(subject: &str) -> Result<(), DomainError> {
    if subject.trim().is_empty() {
        return Err(DomainError::InvalidSubject(String::from(
            "Subject cannot be empty",
        )));
    }
    if subject.contains(KEY_SEPARATOR) {
        return Err(DomainError::InvalidSubject(format!(
            "Subject '{subject}' cannot contain '{KEY_SEPARATOR}'"
        )));
    }
    Ok(())
}

/// Validates a staff identifier and display name.
///
/// # Errors
///
/// Returns an error if either value is empty.
pub fn validate_staff(staff_id: &str, name: &str) -> Result<(), DomainError> {
    if staff_id.trim().is_empty() {
        return Err(DomainError::InvalidStaffId(String::from(
            "Staff id cannot be empty",
        )));
    }
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Staff name cannot be empty",
        )));
    }
    Ok(())
}

/// Validates an institutional node identifier.
///
/// # Errors
///
/// Returns an error if the id is empty or contains whitespace.
pub fn validate_node_id(node_id: &str) -> Result<(), DomainError> {
    if node_id.is_empty() {
        return Err(DomainError::InvalidNodeId(String::from(
            "Node id cannot be empty",
        )));
    }
    if node_id.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidNodeId(format!(
            "Node id '{node_id}' cannot contain whitespace"
        )));
    }
    Ok(())
}

/// Validates an exercise number.
///
/// # Errors
///
/// Returns an error for exercise 0.
pub const fn validate_exercise(exercise: u32) -> Result<(), DomainError> {
    if exercise == 0 {
        return Err(DomainError::InvalidExercise(exercise));
    }
    Ok(())
}

/// Validates a string-encoded score.
///
/// An empty value clears the score and is accepted.
///
/// # Errors
///
/// Returns an error if the exercise number is invalid or the value is
/// neither empty nor numeric.
pub fn validate_score(exercise: u32, value: &str) -> Result<(), DomainError> {
    validate_exercise(exercise)?;
    if value.trim().is_empty() || parse_score(value).is_some() {
        return Ok(());
    }
    Err(DomainError::InvalidScore {
        exercise,
        value: value.to_string(),
    })
}
