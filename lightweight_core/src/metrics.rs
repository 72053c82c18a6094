//! Derived statistics over the set log.
//!
//! Everything here is a pure function of a slice of sets. Nothing computed in
//! this module is ever persisted; callers recompute after each mutation.
//!
//! - Estimated one-rep max (Epley)
//! - Chronological ordering, last set and best set per exercise
//! - 1RM series for sparklines and trend charts
//! - Weekly set counts

use crate::types::{ExerciseKey, WorkoutSet, DATE_FORMAT};
use chrono::{Datelike, Duration, NaiveDate};
use std::cmp::Ordering;

/// Points shown in an exercise-list sparkline
pub const SPARKLINE_POINTS: usize = 18;

/// Points shown in a detail or charts-screen trend
pub const TREND_POINTS: usize = 30;

/// Epley estimate: `weight * (1 + reps / 30)`.
///
/// Returns 0 when either input is not positive. 0 means "unknown" and must
/// never be plotted or treated as a real max.
pub fn estimated_one_rep_max(weight: f64, reps: u32) -> f64 {
    if !weight.is_finite() || weight <= 0.0 || reps == 0 {
        return 0.0;
    }
    weight * (1.0 + f64::from(reps) / 30.0)
}

/// Sets belonging to `exercise` by identity, in storage order
pub fn sets_for<'a>(sets: &'a [WorkoutSet], exercise: &str) -> Vec<&'a WorkoutSet> {
    let key = ExerciseKey::new(exercise);
    sets.iter().filter(|s| key.matches(&s.exercise)).collect()
}

/// Date ascending, then `createdAt` ascending for the same day.
///
/// ISO dates compare correctly as strings.
pub fn chronological(a: &WorkoutSet, b: &WorkoutSet) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Oldest first. Full ties keep storage order.
pub fn chronological_order<'a>(mut sets: Vec<&'a WorkoutSet>) -> Vec<&'a WorkoutSet> {
    sets.sort_by(|a, b| chronological(a, b));
    sets
}

/// Most recent first. Full ties keep storage order.
pub fn reverse_chronological_order<'a>(mut sets: Vec<&'a WorkoutSet>) -> Vec<&'a WorkoutSet> {
    sets.sort_by(|a, b| chronological(b, a));
    sets
}

/// Most recent set for `exercise`
pub fn last_set<'a>(sets: &'a [WorkoutSet], exercise: &str) -> Option<&'a WorkoutSet> {
    chronological_order(sets_for(sets, exercise)).pop()
}

/// The heaviest set by estimated 1RM
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestSet<'a> {
    pub set: &'a WorkoutSet,
    /// `None` when no set of the exercise has a usable 1RM
    pub value: Option<f64>,
}

/// Best set for `exercise` by estimated 1RM.
///
/// Ties go to the set stored first. A 1RM of 0 never beats a real value; if
/// every set is unknown, the first stored set is reported with no value.
pub fn best_set<'a>(sets: &'a [WorkoutSet], exercise: &str) -> Option<BestSet<'a>> {
    let mut best: Option<(&WorkoutSet, f64)> = None;

    for set in sets_for(sets, exercise) {
        let value = set.one_rep_max();
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((set, value)),
        }
    }

    best.map(|(set, value)| BestSet {
        set,
        value: (value > 0.0).then_some(value),
    })
}

/// Estimated 1RM over time, oldest first.
///
/// Sets without a usable 1RM are dropped (not interpolated), then only the
/// last `max_points` values are kept.
pub fn series(sets: &[WorkoutSet], exercise: &str, max_points: usize) -> Vec<f64> {
    let values: Vec<f64> = chronological_order(sets_for(sets, exercise))
        .into_iter()
        .map(WorkoutSet::one_rep_max)
        .filter(|v| *v > 0.0)
        .collect();

    let skip = values.len().saturating_sub(max_points);
    values.into_iter().skip(skip).collect()
}

/// What a series is good for when charting
#[derive(Clone, Debug, PartialEq)]
pub enum Trend {
    NoData,
    /// One point: something to show, but not a trend
    SinglePoint(f64),
    Series(Vec<f64>),
}

impl Trend {
    pub fn from_series(values: Vec<f64>) -> Self {
        match values.as_slice() {
            [] => Trend::NoData,
            [only] => Trend::SinglePoint(*only),
            _ => Trend::Series(values),
        }
    }

    /// At least two points
    pub fn is_chartable(&self) -> bool {
        matches!(self, Trend::Series(_))
    }

    pub fn latest(&self) -> Option<f64> {
        match self {
            Trend::NoData => None,
            Trend::SinglePoint(v) => Some(*v),
            Trend::Series(values) => values.last().copied(),
        }
    }
}

/// Monday of the week containing `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Sets dated on or after the Monday of `reference`'s week
pub fn weekly_count(sets: &[WorkoutSet], reference: NaiveDate) -> usize {
    let week_start = start_of_week(reference).format(DATE_FORMAT).to_string();
    sets.iter().filter(|s| s.date >= week_start).count()
}

/// Most recently logged sets, newest first, by storage order
pub fn recent(sets: &[WorkoutSet], limit: usize) -> Vec<&WorkoutSet> {
    sets.iter().rev().take(limit).collect()
}

/// History of one exercise, most recent first
pub fn history<'a>(sets: &'a [WorkoutSet], exercise: &str, limit: usize) -> Vec<&'a WorkoutSet> {
    let mut ordered = reverse_chronological_order(sets_for(sets, exercise));
    ordered.truncate(limit);
    ordered
}

/// One row of the exercise list
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseSummary<'a> {
    pub name: String,
    pub last: Option<&'a WorkoutSet>,
    pub best: Option<BestSet<'a>>,
    pub sparkline: Vec<f64>,
}

/// Summary row with a sparkline of at most `sparkline_points` values
pub fn summarize<'a>(
    sets: &'a [WorkoutSet],
    exercise: &str,
    sparkline_points: usize,
) -> ExerciseSummary<'a> {
    ExerciseSummary {
        name: exercise.to_string(),
        last: last_set(sets, exercise),
        best: best_set(sets, exercise),
        sparkline: series(sets, exercise, sparkline_points),
    }
}
