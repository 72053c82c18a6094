//! Backup export and import.
//!
//! Exports are a versioned JSON envelope; older app versions wrote version 1
//! envelopes or a bare array of sets, and both are still accepted on import.
//! The set log can also be exported as CSV for spreadsheets.

use crate::store::sets_from_json;
use crate::{Error, Result, WorkoutSet};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Envelope version written by this release
pub const EXPORT_VERSION: u32 = 2;

/// Full backup document
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: u32,
    pub exported_at: Option<DateTime<Utc>>,
    pub sets: Vec<WorkoutSet>,
    pub exercises: Vec<String>,
}

impl BackupDocument {
    pub fn new(sets: Vec<WorkoutSet>, exercises: Vec<String>, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION,
            exported_at: Some(exported_at),
            sets,
            exercises,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Suggested file name for a backup taken on `date`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("lightweight-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Decoded import payload
#[derive(Clone, Debug, PartialEq)]
pub struct ImportPayload {
    pub sets: Vec<WorkoutSet>,
    /// `Some` only when the envelope carried an exercise list
    pub exercises: Option<Vec<String>>,
}

/// Parse an import document.
///
/// Accepts `{ "version": 1|2, "sets": [...], "exercises": [...] }` or a bare
/// array of sets. Fails with `Error::Format` if no array of set records can be
/// found; nothing is applied in that case.
pub fn parse_import(text: &str) -> Result<ImportPayload> {
    let parsed: Value =
        serde_json::from_str(text).map_err(|e| Error::Format(format!("not valid JSON: {}", e)))?;

    let (sets_value, exercises_value) = match &parsed {
        Value::Array(_) => (&parsed, None),
        Value::Object(map) => {
            if let Some(version) = map.get("version") {
                tracing::debug!("Importing backup version {}", version);
            }
            let sets = map
                .get("sets")
                .ok_or_else(|| Error::Format("missing 'sets'".into()))?;
            (sets, map.get("exercises"))
        }
        _ => return Err(Error::Format("expected an object or an array".into())),
    };

    let sets = sets_from_json(sets_value)?;

    let exercises = match exercises_value {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(name) => Some(name.clone()),
                    other => {
                        tracing::warn!("Ignoring non-text exercise entry {}", other);
                        None
                    }
                })
                .collect(),
        ),
        _ => None,
    };

    Ok(ImportPayload { sets, exercises })
}

/// A row in the CSV export
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow<'a> {
    id: &'a str,
    exercise: &'a str,
    date: &'a str,
    weight: f64,
    reps: u32,
    created_at: i64,
    notes: &'a str,
}

impl<'a> From<&'a WorkoutSet> for CsvRow<'a> {
    fn from(set: &'a WorkoutSet) -> Self {
        CsvRow {
            id: &set.id,
            exercise: &set.exercise,
            date: &set.date,
            weight: set.weight,
            reps: set.reps,
            created_at: set.created_at,
            notes: set.notes.as_deref().unwrap_or(""),
        }
    }
}

/// Write the set log as CSV with a header row. Returns the number of rows.
pub fn write_csv<W: Write>(sets: &[WorkoutSet], writer: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for set in sets {
        writer.serialize(CsvRow::from(set))?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} sets to CSV", sets.len());
    Ok(sets.len())
}
