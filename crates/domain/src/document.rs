// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The application-state document.
//!
//! Every top-level slice sits behind an `Arc`. Cloning the document is cheap
//! and a transition only deep-copies the slices it actually changes
//! (`Arc::make_mut`), so untouched slices stay shared between the old and new
//! document.

use crate::management::ManagementState;
use crate::types::{AssessmentData, AssessmentKey, MasterPupilEntry, Pupil, WorkCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// All assessment documents of one work category, keyed by assessment key.
pub type AssessmentBook = BTreeMap<AssessmentKey, AssessmentData>;

/// The full application state of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Class work documents.
    #[serde(default)]
    pub class_work: Arc<AssessmentBook>,
    /// Home work documents.
    #[serde(default)]
    pub home_work: Arc<AssessmentBook>,
    /// Project work documents.
    #[serde(default)]
    pub project_work: Arc<AssessmentBook>,
    /// Criterion work documents.
    #[serde(default)]
    pub criterion_work: Arc<AssessmentBook>,
    /// Management configuration and rosters.
    #[serde(default)]
    pub management: Arc<ManagementState>,
}

impl AppState {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the assessment book of a category.
    #[must_use]
    pub fn book(&self, category: WorkCategory) -> &AssessmentBook {
        match category {
            WorkCategory::ClassWork => &self.class_work,
            WorkCategory::HomeWork => &self.home_work,
            WorkCategory::ProjectWork => &self.project_work,
            WorkCategory::CriterionWork => &self.criterion_work,
        }
    }

    /// Returns a mutable assessment book, detaching it from any other
    /// document that still shares it.
    pub fn book_mut(&mut self, category: WorkCategory) -> &mut AssessmentBook {
        let slot: &mut Arc<AssessmentBook> = match category {
            WorkCategory::ClassWork => &mut self.class_work,
            WorkCategory::HomeWork => &mut self.home_work,
            WorkCategory::ProjectWork => &mut self.project_work,
            WorkCategory::CriterionWork => &mut self.criterion_work,
        };
        Arc::make_mut(slot)
    }

    /// Returns a mutable management aggregate, detaching it if shared.
    pub fn management_mut(&mut self) -> &mut ManagementState {
        Arc::make_mut(&mut self.management)
    }

    /// Looks up a single assessment document.
    #[must_use]
    pub fn assessment(
        &self,
        category: WorkCategory,
        key: &AssessmentKey,
    ) -> Option<&AssessmentData> {
        self.book(category).get(key)
    }

    /// Returns an assessment document with its pupil list derived from the
    /// class roster.
    ///
    /// Pupils come out in roster order. Existing snapshots are reused by name;
    /// roster pupils without a snapshot get a blank one. Snapshots for pupils
    /// no longer on the roster are dropped from the view. A class without a
    /// roster returns the stored snapshots unchanged.
    #[must_use]
    pub fn synced_assessment(&self, category: WorkCategory, key: &AssessmentKey) -> AssessmentData {
        let stored: AssessmentData = self.assessment(category, key).cloned().unwrap_or_default();
        let roster: &[MasterPupilEntry] = self.management.roster(key.class_name());
        if roster.is_empty() {
            return stored;
        }

        let pupils: Vec<Pupil> = roster
            .iter()
            .map(|entry| {
                stored
                    .pupils
                    .iter()
                    .find(|p| p.name == entry.name)
                    .cloned()
                    .unwrap_or_else(|| Pupil::from_roster(entry))
            })
            .collect();

        AssessmentData { pupils, ..stored }
    }

    /// Returns the stored document with a blank snapshot appended for every
    /// roster pupil that has none.
    ///
    /// Snapshots of pupils missing from the roster are kept, so the result
    /// can be written back without losing history.
    #[must_use]
    pub fn assessment_for_edit(
        &self,
        category: WorkCategory,
        key: &AssessmentKey,
    ) -> AssessmentData {
        let mut document: AssessmentData =
            self.assessment(category, key).cloned().unwrap_or_default();
        for entry in self.management.roster(key.class_name()) {
            if !document.pupils.iter().any(|p| p.name == entry.name) {
                document.pupils.push(Pupil::from_roster(entry));
            }
        }
        document
    }

    /// Iterates over every assessment document of a class in a category.
    pub fn class_assessments<'a>(
        &'a self,
        category: WorkCategory,
        class_name: &'a str,
    ) -> impl Iterator<Item = (&'a AssessmentKey, &'a AssessmentData)> {
        self.book(category)
            .iter()
            .filter(move |(key, _)| key.class_name() == class_name)
    }

    /// Returns every class that has at least one assessment document.
    #[must_use]
    pub fn assessed_classes(&self) -> BTreeSet<String> {
        WorkCategory::ALL
            .iter()
            .flat_map(|category| self.book(*category).keys())
            .map(|key| key.class_name().to_string())
            .collect()
    }
}
