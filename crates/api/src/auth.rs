// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use schoolhub_audit::Actor;
use schoolhub_domain::StaffRole;
use std::str::FromStr;

use crate::error::AuthError;

/// Actor roles for authorization.
///
/// Roles are ordered by authority: a role may perform every action of the
/// roles below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Teaching staff.
    ///
    /// Facilitators may:
    /// - record scores, interventions and correction status
    /// - set exercises on their documents
    /// - fill in weekly plans
    Facilitator,
    /// School administrators.
    ///
    /// Admins may additionally:
    /// - manage rosters (enroll, import, purge, migrate)
    /// - manage staff, subjects, duties and settings
    /// - view the reward leaderboard
    /// - export and restore backups
    Admin,
    /// Operators of the node registry.
    SuperAdmin,
}

impl Role {
    const fn rank(self) -> u8 {
        match self {
            Self::Facilitator => 0,
            Self::Admin => 1,
            Self::SuperAdmin => 2,
        }
    }

    /// Converts this role to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Facilitator => "facilitator",
            Self::Admin => "admin",
            Self::SuperAdmin => "superAdmin",
        }
    }

    /// Whether this role carries at least the authority of `required`.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facilitator" => Ok(Self::Facilitator),
            "admin" | "administrator" => Ok(Self::Admin),
            "superAdmin" => Ok(Self::SuperAdmin),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Unknown role '{s}'"),
            }),
        }
    }
}

impl From<StaffRole> for Role {
    fn from(role: StaffRole) -> Self {
        match role {
            StaffRole::Facilitator => Self::Facilitator,
            StaffRole::Administrator => Self::Admin,
            StaffRole::SuperAdmin => Self::SuperAdmin,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role.as_str().to_string())
    }
}

/// Builds an authenticated actor from the identity fields of a request.
///
/// Identity itself is verified upstream (see `verify_identity`); this only
/// checks that the fields are usable.
///
/// # Errors
///
/// Returns an error if the actor id is empty or the role is unknown.
pub fn authenticate(actor_id: &str, actor_role: &str) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    let role: Role = actor_role.parse()?;
    Ok(AuthenticatedActor::new(actor_id.trim().to_string(), role))
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require(actor: &AuthenticatedActor, action: &str, required: Role) -> Result<(), AuthError> {
        if actor.role.satisfies(required) {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: required.as_str().to_string(),
        })
    }

    /// Checks if an actor may record assessment work.
    ///
    /// Every role may record work.
    ///
    /// # Errors
    ///
    /// This function never fails.
    pub const fn authorize_record_work(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// Checks if an actor may edit weekly plans.
    ///
    /// Every role may plan.
    ///
    /// # Errors
    ///
    /// This function never fails.
    pub const fn authorize_plan_lessons(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// Checks if an actor may change class rosters.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is below the Admin role.
    pub fn authorize_manage_roster(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "manage_roster", Role::Admin)
    }

    /// Checks if an actor may change staff, subjects, duties or settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is below the Admin role.
    pub fn authorize_manage_staff(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "manage_staff", Role::Admin)
    }

    /// Checks if an actor may view the reward leaderboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is below the Admin role.
    pub fn authorize_view_rewards(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "view_rewards", Role::Admin)
    }

    /// Checks if an actor may export or restore backups.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is below the Admin role.
    pub fn authorize_backup(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "backup", Role::Admin)
    }

    /// Checks if an actor may provision or decommission nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a super admin.
    pub fn authorize_manage_nodes(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, "manage_nodes", Role::SuperAdmin)
    }
}
