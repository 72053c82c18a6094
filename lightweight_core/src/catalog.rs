//! The user's exercise list.
//!
//! The catalog stores display names as typed. Every lookup goes through the
//! normalized identity, and the list shown to users also includes any
//! exercise that only appears in the set log.

use crate::store::SetStore;
use crate::types::ExerciseKey;
use feruca::Collator;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExerciseCatalog {
    entries: Vec<String>,
}

impl ExerciseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from persisted entries, kept exactly as stored
    pub fn from_entries(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = ExerciseKey::new(name);
        self.entries.iter().any(|e| key.matches(e))
    }

    /// Add an entry unless one with the same identity exists.
    ///
    /// Returns `true` if the catalog changed.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.entries.push(name.to_string());
        sort_for_display(&mut self.entries);
        tracing::debug!("Added '{}' to exercise list", name);
        true
    }

    /// Remove the entry for `name`. Logged sets are not touched.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove_from_list(&mut self, name: &str) -> bool {
        let key = ExerciseKey::new(name);
        let before = self.entries.len();
        self.entries.retain(|e| !key.matches(e));
        before != self.entries.len()
    }

    /// Replace any entry for `from` with `to`.
    ///
    /// An existing entry for the target identity takes the new casing.
    pub fn rename(&mut self, from: &ExerciseKey, to: &str) {
        let target = ExerciseKey::new(to);
        self.entries.retain(|e| !from.matches(e) && !target.matches(e));
        self.add(to);
    }

    /// Every known exercise: catalog entries plus names seen in `sets`.
    ///
    /// One name per identity; the catalog's casing wins over casing found only
    /// in sets. Sorted by display name.
    pub fn list_all(&self, sets: &SetStore) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();

        let from_catalog = self.entries.iter().map(|e| e.trim());
        let from_sets = sets.all().iter().map(|s| s.exercise.trim());

        for name in from_catalog.chain(from_sets) {
            if name.is_empty() {
                continue;
            }
            if seen.insert(ExerciseKey::new(name)) {
                names.push(name.to_string());
            }
        }

        sort_for_display(&mut names);
        names
    }
}

/// Ordering for display names.
///
/// Unicode collation (CLDR root), so "Élévation" sorts with the E's and
/// "bench" before "Deadlift". Falls back to the raw string so the order is
/// total.
pub fn display_order(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}

/// Sort names in display order with a single collator.
pub fn sort_for_display(names: &mut [String]) {
    let mut collator = Collator::default();
    names.sort_by(|a, b| display_order(&mut collator, a, b));
}

/// Keep names containing `query`, ignoring case. A blank query keeps all.
pub fn search(names: &[String], query: &str) -> Vec<String> {
    let query = query.trim().to_lowercase();
    names
        .iter()
        .filter(|n| n.to_lowercase().contains(&query))
        .cloned()
        .collect()
}
