// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The management aggregate: staff, duties, curriculum plans, rosters and the
//! super admin node registry.

use crate::error::DomainError;
use crate::types::MasterPupilEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A staff member's role within a school node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StaffRole {
    /// Teaching staff who set and mark work.
    #[default]
    Facilitator,
    /// School administrators (head teacher, deputies).
    Administrator,
    /// Operators of the multi-tenant node registry.
    SuperAdmin,
}

impl StaffRole {
    /// Converts this role to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Facilitator => "facilitator",
            Self::Administrator => "administrator",
            Self::SuperAdmin => "superAdmin",
        }
    }
}

impl FromStr for StaffRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facilitator" => Ok(Self::Facilitator),
            "administrator" => Ok(Self::Administrator),
            "superAdmin" => Ok(Self::SuperAdmin),
            _ => Err(DomainError::UnknownStaffRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A staff member. The `id` (usually an email address) is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    /// Unique identifier.
    pub id: String,
    /// Display name, matched against assessment facilitators.
    pub name: String,
    /// Role within the node.
    #[serde(default)]
    pub role: StaffRole,
}

impl Staff {
    /// Creates a new staff member.
    #[must_use]
    pub fn new(id: &str, name: &str, role: StaffRole) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            role,
        }
    }
}

/// A duty assignment: a staff member teaches a subject to a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyMapping {
    /// The assigned staff member.
    pub staff_id: String,
    /// The class taught.
    pub class_name: String,
    /// The subject taught.
    pub subject: String,
}

impl DutyMapping {
    /// Creates a new duty mapping.
    #[must_use]
    pub fn new(staff_id: &str, class_name: &str, subject: &str) -> Self {
        Self {
            staff_id: staff_id.to_string(),
            class_name: class_name.to_string(),
            subject: subject.to_string(),
        }
    }

    /// Whether this duty covers the given class and subject.
    #[must_use]
    pub fn covers(&self, class_name: &str, subject: &str) -> bool {
        self.class_name == class_name && self.subject == subject
    }
}

/// A curriculum plan entry for one class, subject and week.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMapping {
    /// The class the plan is for.
    pub class_name: String,
    /// The subject.
    pub subject: String,
    /// The week label.
    pub week: String,
    /// Curriculum strand.
    #[serde(default)]
    pub strand: String,
    /// Curriculum sub-strand.
    #[serde(default)]
    pub sub_strand: String,
    /// Indicator codes, free text.
    #[serde(default)]
    pub indicators: String,
}

impl WeeklyMapping {
    /// A plan counts as completed once a strand or indicators are filled in.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.strand.trim().is_empty() || !self.indicators.trim().is_empty()
    }

    /// Whether two entries address the same class, subject and week slot.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && self.subject == other.subject
            && self.week == other.week
    }
}

/// School-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolSettings {
    /// Display name of the school.
    #[serde(default)]
    pub school_name: String,
    /// Current academic year label.
    #[serde(default)]
    pub academic_year: String,
    /// Current term label.
    #[serde(default)]
    pub term: String,
}

/// Lifecycle of a provisioned node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeStatus {
    /// The node is in service.
    #[default]
    Active,
    /// The node has been retired. It stays in the registry for history.
    Decommissioned,
}

/// A provisioned school instance in the super admin registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolNode {
    /// Institutional identifier.
    pub node_id: String,
    /// School name.
    pub name: String,
    /// Hub the node is registered under.
    pub hub_id: String,
    /// Current status.
    #[serde(default)]
    pub status: NodeStatus,
    /// When the node was provisioned (RFC 3339).
    #[serde(default)]
    pub provisioned_at: String,
}

/// The single configuration aggregate of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementState {
    /// School-wide settings.
    #[serde(default)]
    pub settings: SchoolSettings,
    /// Registered staff.
    #[serde(default)]
    pub staff: Vec<Staff>,
    /// Registered subjects.
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Duty assignments.
    #[serde(default)]
    pub mappings: Vec<DutyMapping>,
    /// Curriculum plan entries.
    #[serde(default)]
    pub weekly_mappings: Vec<WeeklyMapping>,
    /// Class name to roster.
    #[serde(default)]
    pub master_pupils: BTreeMap<String, Vec<MasterPupilEntry>>,
    /// Provisioned school nodes.
    #[serde(default)]
    pub super_admin_registry: Vec<SchoolNode>,
}

impl ManagementState {
    /// Looks up a staff member by id.
    #[must_use]
    pub fn staff_member(&self, staff_id: &str) -> Option<&Staff> {
        self.staff.iter().find(|s| s.id == staff_id)
    }

    /// Returns the duty mappings assigned to a staff member.
    pub fn duties_for<'a>(&'a self, staff_id: &'a str) -> impl Iterator<Item = &'a DutyMapping> {
        self.mappings.iter().filter(move |m| m.staff_id == staff_id)
    }

    /// Returns the roster for a class, empty if the class has none.
    #[must_use]
    pub fn roster(&self, class_name: &str) -> &[MasterPupilEntry] {
        self.master_pupils
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Checks if a subject is registered.
    #[must_use]
    pub fn has_subject(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }

    /// Looks up a node in the registry.
    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&SchoolNode> {
        self.super_admin_registry
            .iter()
            .find(|n| n.node_id == node_id)
    }
}
