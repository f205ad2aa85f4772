// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use schoolhub_domain::{AppState, AssessmentKey, WorkCategory};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

const MANAGEMENT: &str = "management";
const ROSTER_PREFIX: &str = "roster:";

/// Names one unit of the document that must be pushed to the remote store.
///
/// Rendered as `management`, `roster:<class>` or `<category>:<assessment key>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyncKey {
    /// Settings, staff, subjects, duties, plans and the node registry.
    Management,
    /// The roster of one class.
    Roster(String),
    /// One assessment document.
    Assessment {
        /// The work category.
        category: WorkCategory,
        /// The assessment key.
        key: AssessmentKey,
    },
}

impl SyncKey {
    /// Creates a roster key.
    #[must_use]
    pub fn roster(class_name: &str) -> Self {
        Self::Roster(class_name.to_string())
    }

    /// Creates an assessment key.
    #[must_use]
    pub fn assessment(category: WorkCategory, key: &AssessmentKey) -> Self {
        Self::Assessment {
            category,
            key: key.clone(),
        }
    }

    /// Every key needed to describe a whole document.
    ///
    /// Used when the document is replaced wholesale, e.g. by a backup import.
    #[must_use]
    pub fn all_for(state: &AppState) -> Vec<Self> {
        let mut keys: Vec<Self> = vec![Self::Management];
        keys.extend(
            state
                .management
                .master_pupils
                .keys()
                .map(|class_name| Self::Roster(class_name.clone())),
        );
        for category in WorkCategory::ALL {
            keys.extend(
                state
                    .book(category)
                    .keys()
                    .map(|key| Self::assessment(category, key)),
            );
        }
        keys
    }
}

impl std::fmt::Display for SyncKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Management => write!(f, "{MANAGEMENT}"),
            Self::Roster(class_name) => write!(f, "{ROSTER_PREFIX}{class_name}"),
            Self::Assessment { category, key } => write!(f, "{category}:{key}"),
        }
    }
}

impl FromStr for SyncKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == MANAGEMENT {
            return Ok(Self::Management);
        }
        if let Some(class_name) = s.strip_prefix(ROSTER_PREFIX) {
            if class_name.is_empty() {
                return Err(CoreError::InvalidSyncKey(s.to_string()));
            }
            return Ok(Self::roster(class_name));
        }
        let Some((category, key)) = s.split_once(':') else {
            return Err(CoreError::InvalidSyncKey(s.to_string()));
        };
        let category: WorkCategory = category
            .parse()
            .map_err(|_| CoreError::InvalidSyncKey(s.to_string()))?;
        let key: AssessmentKey = key
            .parse()
            .map_err(|_| CoreError::InvalidSyncKey(s.to_string()))?;
        Ok(Self::Assessment { category, key })
    }
}

impl Serialize for SyncKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SyncKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
