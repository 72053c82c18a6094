//! Core domain types for LightWeight.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged sets and the draft used to create them
//! - Exercise identity (normalized names)
//! - Lenient field decoding for legacy backups

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format of every stored set date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Exercise Identity
// ============================================================================

/// Normalized form of an exercise name: trimmed and lowercased.
///
/// Two names refer to the same exercise iff their normalized forms are equal.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Identity key for an exercise, always in normalized form
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExerciseKey(String);

impl ExerciseKey {
    pub fn new(name: &str) -> Self {
        Self(normalize(name))
    }

    /// Whether `name` refers to this exercise
    pub fn matches(&self, name: &str) -> bool {
        normalize(name) == self.0
    }
}

// ============================================================================
// Sets
// ============================================================================

/// A single logged set.
///
/// Field names follow the persisted JSON layout (`createdAt`). Fields this
/// version does not know about are kept in `extra` and written back out.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub exercise: String,
    /// ISO `YYYY-MM-DD` local calendar date
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub weight: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub reps: u32,
    /// Epoch millis, only used to order sets logged on the same day
    #[serde(default, deserialize_with = "lenient::millis")]
    pub created_at: i64,
    #[serde(
        default,
        deserialize_with = "lenient::notes",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkoutSet {
    /// Epley estimate for this set, 0 when unknown
    pub fn one_rep_max(&self) -> f64 {
        crate::metrics::estimated_one_rep_max(self.weight, self.reps)
    }
}

/// User input for a new set, before validation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewSet {
    pub exercise: String,
    /// `None` or blank means today
    pub date: Option<String>,
    pub weight: f64,
    pub reps: i64,
    pub notes: Option<String>,
}

impl NewSet {
    pub fn new(exercise: impl Into<String>, weight: f64, reps: i64) -> Self {
        Self {
            exercise: exercise.into(),
            weight,
            reps,
            ..Self::default()
        }
    }

    pub fn on(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Parse a strict `YYYY-MM-DD` date (zero padded, as stored)
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == s).then_some(date)
}

/// Field decoders that accept what older app versions wrote.
///
/// Numbers stored as strings are coerced and unusable values decode as 0,
/// matching how the values were read back before. Structural mismatches
/// (objects or arrays where a scalar belongs) are still rejected.
mod lenient {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(D::Error::custom(format!("expected a string, found {}", other))),
        }
    }

    /// Free text; scalars are kept as text and blank reads as no note
    pub fn notes<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let text = match Value::deserialize(d)? {
            Value::Null => return Ok(None),
            Value::String(s) => s,
            other => other.to_string(),
        };
        Ok((!text.trim().is_empty()).then_some(text))
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let value = match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Value::Bool(b) => f64::from(u8::from(b)),
            Value::Null => 0.0,
            other => {
                return Err(D::Error::custom(format!("expected a number, found {}", other)))
            }
        };
        Ok(if value.is_finite() { value } else { 0.0 })
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let value = number(d)?;
        if value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
            Ok(value as u32)
        } else {
            Ok(0)
        }
    }

    pub fn millis<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(number(d)?.trunc() as i64)
    }
}
