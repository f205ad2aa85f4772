// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV preview, import and export of the pupil registry.
//!
//! Preview parses and validates an upload without mutating state. Import
//! merges the valid rows of a preview through the roster import command.

use csv::StringRecord;
use schoolhub_domain::{AppState, MasterPupilEntry, validate_class_name};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ApiError;

/// Column headers written on export, in order.
pub const ROSTER_CSV_HEADERS: [&str; 4] = ["Class", "Name", "Gender", "Student ID"];

/// Required CSV column headers (case-insensitive, normalized).
const REQUIRED_HEADERS: &[&str] = &["class", "name"];

/// A single row result from CSV preview validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRowResult {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The class (if present).
    pub class_name: Option<String>,
    /// The pupil name (if present).
    pub name: Option<String>,
    /// The gender (if present).
    pub gender: Option<String>,
    /// The student id (if present).
    pub student_id: Option<String>,
    /// Whether the row updates a pupil already on the roster.
    pub existing: bool,
    /// The row status.
    pub status: CsvRowStatus,
    /// Zero or more validation errors.
    pub errors: Vec<String>,
}

impl CsvRowResult {
    /// Returns the class and roster entry of a valid row.
    #[must_use]
    pub fn to_entry(&self) -> Option<(String, MasterPupilEntry)> {
        if self.status != CsvRowStatus::Valid {
            return None;
        }
        let class_name: &String = self.class_name.as_ref()?;
        let name: &String = self.name.as_ref()?;
        Some((
            class_name.clone(),
            MasterPupilEntry::new(
                name,
                self.gender.as_deref().unwrap_or_default(),
                self.student_id.as_deref().unwrap_or_default(),
            ),
        ))
    }
}

/// Status of a CSV row validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsvRowStatus {
    /// Row is valid and can be imported.
    Valid,
    /// Row has validation errors and cannot be imported.
    Invalid,
}

/// Result of CSV preview validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvPreviewResult {
    /// Per-row validation results.
    pub rows: Vec<CsvRowResult>,
    /// Total number of rows.
    pub total_rows: usize,
    /// Number of valid rows.
    pub valid_count: usize,
    /// Number of invalid rows.
    pub invalid_count: usize,
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Validates that all required headers are present in the CSV.
fn validate_headers(headers: &StringRecord) -> Result<HashMap<String, usize>, ApiError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (normalize_header(header), idx))
        .collect();

    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .filter(|required| !header_map.contains_key(**required))
        .copied()
        .collect();

    if !missing.is_empty() {
        return Err(ApiError::InvalidCsvFormat {
            reason: format!("Missing required headers: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

fn field(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<String> {
    header_map
        .get(name)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn preview_row(
    row_number: usize,
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    state: &AppState,
    seen: &mut Vec<(String, MasterPupilEntry)>,
) -> CsvRowResult {
    let class_name: Option<String> = field(record, header_map, "class");
    let name: Option<String> = field(record, header_map, "name");
    let gender: Option<String> = field(record, header_map, "gender");
    let student_id: Option<String> = field(record, header_map, "student_id");

    let mut errors: Vec<String> = Vec::new();
    match &class_name {
        None => errors.push(String::from("class: required field is missing or empty")),
        Some(class_name) => {
            if let Err(e) = validate_class_name(class_name) {
                errors.push(format!("class: {e}"));
            }
        }
    }
    if name.is_none() {
        errors.push(String::from("name: required field is missing or empty"));
    }

    let mut existing: bool = false;
    if let (Some(class_name), Some(name)) = (&class_name, &name) {
        let entry: MasterPupilEntry = MasterPupilEntry::new(
            name,
            gender.as_deref().unwrap_or_default(),
            student_id.as_deref().unwrap_or_default(),
        );

        if seen.iter().any(|(seen_class, seen_entry)| {
            seen_class == class_name && seen_entry.same_pupil(&entry)
        }) {
            errors.push(format!(
                "name: duplicate within CSV - '{name}' appears multiple times in '{class_name}'"
            ));
        }

        existing = state
            .management
            .roster(class_name)
            .iter()
            .any(|on_roster| on_roster.same_pupil(&entry));

        seen.push((class_name.clone(), entry));
    }

    let status: CsvRowStatus = if errors.is_empty() {
        CsvRowStatus::Valid
    } else {
        CsvRowStatus::Invalid
    };

    CsvRowResult {
        row_number,
        class_name,
        name,
        gender,
        student_id,
        existing,
        status,
        errors,
    }
}

/// Previews and validates a roster CSV upload without mutating state.
///
/// # Arguments
///
/// * `csv_content` - The raw CSV content as a string
/// * `state` - The current document, used to flag pupils already on a roster
///
/// # Errors
///
/// Returns an error if the header row is unreadable or lacks a required column.
pub fn preview_roster_csv(
    csv_content: &str,
    state: &AppState,
) -> Result<CsvPreviewResult, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ApiError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();

    let header_map: HashMap<String, usize> = validate_headers(&headers)?;

    let mut rows: Vec<CsvRowResult> = Vec::new();
    let mut seen: Vec<(String, MasterPupilEntry)> = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row_number: usize = idx + 1;
        match result {
            Ok(record) => rows.push(preview_row(
                row_number,
                &record,
                &header_map,
                state,
                &mut seen,
            )),
            Err(e) => rows.push(CsvRowResult {
                row_number,
                class_name: None,
                name: None,
                gender: None,
                student_id: None,
                existing: false,
                status: CsvRowStatus::Invalid,
                errors: vec![format!("CSV parse error: {e}")],
            }),
        }
    }

    let valid_count: usize = rows
        .iter()
        .filter(|row| row.status == CsvRowStatus::Valid)
        .count();

    Ok(CsvPreviewResult {
        total_rows: rows.len(),
        valid_count,
        invalid_count: rows.len() - valid_count,
        rows,
    })
}

/// Exports every class roster as CSV.
///
/// Classes come out in name order, pupils in roster order.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn export_roster_csv(state: &AppState) -> Result<String, ApiError> {
    let write_failed = |e: csv::Error| ApiError::Internal {
        message: format!("Failed to write roster CSV: {e}"),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ROSTER_CSV_HEADERS).map_err(write_failed)?;

    for (class_name, roster) in &state.management.master_pupils {
        for entry in roster {
            writer
                .write_record([
                    class_name.as_str(),
                    entry.name.as_str(),
                    entry.gender.as_str(),
                    entry.student_id.as_str(),
                ])
                .map_err(write_failed)?;
        }
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| ApiError::Internal {
        message: format!("Failed to flush roster CSV: {e}"),
    })?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("Roster CSV is not valid UTF-8: {e}"),
    })
}
