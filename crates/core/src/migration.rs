// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Moving a pupil between classes without losing assessment history.
//!
//! Rosters and assessment documents are separate stores, both keyed by class.
//! A migration rewrites both in one new document: the roster entry moves to
//! the destination roster and every snapshot of the pupil in a source-class
//! document moves to the document with the same key except for the class.

use crate::sync_key::SyncKey;
use schoolhub_domain::{
    AppState, AssessmentBook, AssessmentData, AssessmentKey, DomainError, MasterPupilEntry, Pupil,
    PupilRef, WorkCategory, validate_class_name,
};
use std::collections::BTreeMap;

/// The outcome of a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The migrated document.
    pub state: AppState,
    /// Every sync key the migration changed.
    pub touched: Vec<SyncKey>,
    /// Number of assessment snapshots moved.
    pub snapshots_moved: usize,
    /// Whether a roster entry moved.
    pub roster_moved: bool,
}

/// Migrates a pupil from one class to another.
///
/// Migrating to the same class returns the document unchanged with nothing
/// touched. Scores, interventions and correction status move unmodified. If
/// the destination roster or document already holds the pupil, that entry
/// is replaced, so the pupil appears exactly once.
///
/// # Arguments
///
/// * `state` - The current document
/// * `pupil` - The pupil to move
/// * `from_class` - The source class
/// * `to_class` - The destination class
///
/// # Errors
///
/// Returns an error if the destination class name is invalid, or if the pupil
/// is neither on the source roster nor in any source-class document.
pub fn migrate_pupil(
    state: &AppState,
    pupil: &PupilRef,
    from_class: &str,
    to_class: &str,
) -> Result<Migration, DomainError> {
    if from_class == to_class {
        return Ok(Migration {
            state: state.clone(),
            touched: Vec::new(),
            snapshots_moved: 0,
            roster_moved: false,
        });
    }
    validate_class_name(to_class)?;

    let roster_index: Option<usize> = state
        .management
        .roster(from_class)
        .iter()
        .position(|entry| entry.matches(pupil));

    let sources: Vec<(WorkCategory, AssessmentKey)> = WorkCategory::ALL
        .into_iter()
        .flat_map(|category| {
            state
                .class_assessments(category, from_class)
                .filter(|(_, data)| data.find_pupil(pupil).is_some())
                .map(move |(key, _)| (category, key.clone()))
        })
        .collect();

    if roster_index.is_none() && sources.is_empty() {
        return Err(DomainError::PupilNotFound {
            class_name: from_class.to_string(),
            pupil: pupil.to_string(),
        });
    }

    let mut next: AppState = state.clone();
    let mut touched: Vec<SyncKey> = Vec::new();

    if let Some(index) = roster_index {
        move_roster_entry(&mut next, index, from_class, to_class);
        touched.push(SyncKey::roster(from_class));
        touched.push(SyncKey::roster(to_class));
    }

    let mut snapshots_moved: usize = 0;
    for (category, key) in sources {
        let destination: AssessmentKey = key.with_class(to_class);
        if move_snapshot(&mut next, category, &key, &destination, pupil) {
            snapshots_moved += 1;
            touched.push(SyncKey::assessment(category, &key));
            touched.push(SyncKey::assessment(category, &destination));
        }
    }

    Ok(Migration {
        state: next,
        touched,
        snapshots_moved,
        roster_moved: roster_index.is_some(),
    })
}

fn move_roster_entry(state: &mut AppState, index: usize, from_class: &str, to_class: &str) {
    let rosters: &mut BTreeMap<String, Vec<MasterPupilEntry>> =
        &mut state.management_mut().master_pupils;
    let Some(entry) = rosters
        .get_mut(from_class)
        .map(|roster| roster.remove(index))
    else {
        return;
    };
    let destination: &mut Vec<MasterPupilEntry> =
        rosters.entry(to_class.to_string()).or_default();
    destination.retain(|existing| !existing.same_pupil(&entry));
    destination.push(entry);
}

fn move_snapshot(
    state: &mut AppState,
    category: WorkCategory,
    source_key: &AssessmentKey,
    destination_key: &AssessmentKey,
    pupil: &PupilRef,
) -> bool {
    let book: &mut AssessmentBook = state.book_mut(category);

    let Some((snapshot, shape)) = book.get_mut(source_key).and_then(|source| {
        let position: usize = source.find_pupil(pupil)?;
        let snapshot: Pupil = source.pupils.remove(position);
        Some((snapshot, source.empty_shape()))
    }) else {
        return false;
    };

    let destination: &mut AssessmentData = book.entry(destination_key.clone()).or_insert(shape);
    destination.pupils.retain(|existing| !existing.matches(pupil));
    destination.pupils.push(snapshot);
    true
}
