// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use schoolhub::CoreError;
use schoolhub_domain::DomainError;
use schoolhub_persistence::PersistenceError;
use schoolhub_sync::SyncError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A CSV upload failed the structural check.
    InvalidCsvFormat {
        /// Why the upload was rejected.
        reason: String,
    },
    /// A backup file failed the structural check.
    InvalidBackup {
        /// Why the backup was rejected.
        reason: String,
    },
    /// The remote backend could not complete the request.
    RemoteUnavailable {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidCsvFormat { reason } => write!(f, "Invalid CSV format: {reason}"),
            Self::InvalidBackup { reason } => write!(f, "Invalid backup: {reason}"),
            Self::RemoteUnavailable { message } => write!(f, "Remote unavailable: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

fn not_found(resource_type: &str, message: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message,
    }
}

fn rule_violation(rule: &str, message: String) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidAssessmentKey(msg) => invalid_input("key", msg),
        DomainError::InvalidClassName(msg) => invalid_input("class_name", msg),
        DomainError::InvalidName(msg) => invalid_input("name", msg),
        DomainError::InvalidSubject(msg) => invalid_input("subject", msg),
        DomainError::InvalidStaffId(msg) => invalid_input("staff_id", msg),
        DomainError::InvalidNodeId(msg) => invalid_input("node_id", msg),
        DomainError::InvalidExercise(number) => invalid_input(
            "exercise",
            format!("Invalid exercise number: {number}. Must be at least 1"),
        ),
        DomainError::InvalidScore { exercise, value } => invalid_input(
            "value",
            format!("Score '{value}' for exercise {exercise} is not a number"),
        ),
        DomainError::InvalidFundAmount(amount) => invalid_input(
            "fund_amount",
            format!("Fund amount {amount} must be finite and non-negative"),
        ),
        DomainError::UnknownWorkCategory(name) => invalid_input(
            "category",
            format!("Unknown work category '{name}'"),
        ),
        DomainError::UnknownSkill(name) => {
            invalid_input("skill", format!("Unknown skill '{name}'"))
        }
        DomainError::UnknownStaffRole(name) => {
            invalid_input("role", format!("Unknown staff role '{name}'"))
        }
        DomainError::PupilNotFound { class_name, pupil } => not_found(
            "Pupil",
            format!("Pupil '{pupil}' does not exist in class '{class_name}'"),
        ),
        DomainError::StaffNotFound(id) => not_found(
            "Staff member",
            format!("Staff member '{id}' does not exist"),
        ),
        DomainError::SubjectNotFound(subject) => {
            not_found("Subject", format!("Subject '{subject}' does not exist"))
        }
        DomainError::AssessmentNotFound { category, key } => not_found(
            "Assessment",
            format!("No {category} assessment exists for '{key}'"),
        ),
        DomainError::NodeNotFound(id) => {
            not_found("Node", format!("Node '{id}' is not in the registry"))
        }
        DomainError::DuplicatePupil { class_name, pupil } => rule_violation(
            "unique_pupil",
            format!("Pupil '{pupil}' already exists in class '{class_name}'"),
        ),
        DomainError::DuplicateStaff(id) => rule_violation(
            "unique_staff",
            format!("Staff member '{id}' already exists"),
        ),
        DomainError::DuplicateDuty {
            staff_id,
            class_name,
            subject,
        } => rule_violation(
            "unique_duty",
            format!("Staff member '{staff_id}' already teaches {subject} in '{class_name}'"),
        ),
        DomainError::DuplicateSubject(subject) => rule_violation(
            "unique_subject",
            format!("Subject '{subject}' already exists"),
        ),
        DomainError::DuplicateNode(id) => rule_violation(
            "unique_node",
            format!("Node '{id}' is already provisioned"),
        ),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::InvalidSyncKey(key) => ApiError::Internal {
            message: format!("Invalid sync key '{key}'"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: &PersistenceError) -> ApiError {
    match err {
        PersistenceError::EventNotFound(event_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Audit event"),
            message: format!("Audit event {event_id} does not exist"),
        },
        _ => ApiError::Internal {
            message: format!("Persistence failed: {err}"),
        },
    }
}

/// Translates a sync error into an API error.
#[must_use]
pub fn translate_sync_error(err: &SyncError) -> ApiError {
    match err {
        SyncError::Unavailable(_) | SyncError::Rejected(_) | SyncError::WorkerStopped => {
            ApiError::RemoteUnavailable {
                message: err.to_string(),
            }
        }
        SyncError::MalformedRecord(_) | SyncError::Serialization(_) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
