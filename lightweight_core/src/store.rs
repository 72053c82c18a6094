//! The canonical, append-only log of sets.
//!
//! Sets are only ever appended one at a time, or replaced wholesale by an
//! import or a clear. The one in-place change is a rename rewriting the
//! `exercise` field.

use crate::clock::Clock;
use crate::types::{parse_iso_date, ExerciseKey, NewSet, WorkoutSet, DATE_FORMAT};
use crate::{Error, Result};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetStore {
    sets: Vec<WorkoutSet>,
}

impl SetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sets(sets: Vec<WorkoutSet>) -> Self {
        Self { sets }
    }

    /// Validate a draft and append it, assigning `id` and `createdAt`.
    ///
    /// Nothing is appended when validation fails.
    pub fn append(&mut self, draft: NewSet, clock: &dyn Clock) -> Result<WorkoutSet> {
        let set = validate(draft, clock)?;
        tracing::debug!("Appending set {} for '{}'", set.id, set.exercise);
        self.sets.push(set.clone());
        Ok(set)
    }

    pub fn replace_all(&mut self, sets: Vec<WorkoutSet>) {
        tracing::debug!("Replacing {} sets with {}", self.sets.len(), sets.len());
        self.sets = sets;
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    /// All sets in insertion order
    pub fn all(&self) -> &[WorkoutSet] {
        &self.sets
    }

    /// Sets matching `predicate`, in insertion order
    pub fn query<F>(&self, predicate: F) -> Vec<&WorkoutSet>
    where
        F: Fn(&WorkoutSet) -> bool,
    {
        self.sets.iter().filter(|s| predicate(s)).collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Rewrite the exercise of every set matching `from`, returning how many changed
    pub fn rename_exercise(&mut self, from: &ExerciseKey, to: &str) -> usize {
        let mut changed = 0;
        for set in self.sets.iter_mut().filter(|s| from.matches(&s.exercise)) {
            set.exercise = to.to_string();
            changed += 1;
        }
        changed
    }
}

fn validate(draft: NewSet, clock: &dyn Clock) -> Result<WorkoutSet> {
    let exercise = draft.exercise.trim();
    if exercise.is_empty() {
        return Err(Error::Validation("exercise name is empty".into()));
    }
    if !draft.weight.is_finite() || draft.weight <= 0.0 {
        return Err(Error::Validation(format!(
            "weight must be positive, got {}",
            draft.weight
        )));
    }
    if draft.reps <= 0 {
        return Err(Error::Validation(format!(
            "reps must be positive, got {}",
            draft.reps
        )));
    }
    let reps = u32::try_from(draft.reps)
        .map_err(|_| Error::Validation(format!("reps out of range: {}", draft.reps)))?;

    let date = match draft.date.as_deref().map(str::trim) {
        None | Some("") => clock.today(),
        Some(raw) => parse_iso_date(raw)
            .ok_or_else(|| Error::Validation(format!("'{}' is not a YYYY-MM-DD date", raw)))?,
    };

    let notes = draft
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Ok(WorkoutSet {
        id: Uuid::new_v4().to_string(),
        exercise: exercise.to_string(),
        date: date.format(DATE_FORMAT).to_string(),
        weight: draft.weight,
        reps,
        created_at: clock.now_millis(),
        notes,
        extra: Default::default(),
    })
}

/// Decode a JSON array of set records.
///
/// Only the shape is checked: each element must be an object whose known
/// fields have scalar values. Out-of-range values from older data are kept.
pub fn sets_from_json(value: &Value) -> Result<Vec<WorkoutSet>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::Format("sets must be an array".into()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                return Err(Error::Format(format!("set #{} is not an object", i + 1)));
            }
            serde_json::from_value(item.clone())
                .map_err(|e| Error::Format(format!("set #{}: {}", i + 1, e)))
        })
        .collect()
}
