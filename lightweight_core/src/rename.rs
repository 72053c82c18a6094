//! Renaming and delisting exercises.
//!
//! A single user prompt drives three outcomes:
//! - empty or cancelled input does nothing
//! - `DELETE` (any case) removes the exercise from the list only; its logged
//!   sets stay and keep the exercise visible through the set log
//! - anything else renames the exercise in both the set log and the list

use crate::catalog::ExerciseCatalog;
use crate::store::SetStore;
use crate::types::ExerciseKey;

/// Input that delists an exercise instead of renaming it
pub const DELETE_SENTINEL: &str = "DELETE";

/// What the user asked for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenameAction {
    Noop,
    Delete,
    Rename(String),
}

impl RenameAction {
    /// Interpret prompt input; `None` means the prompt was cancelled
    pub fn parse(input: Option<&str>) -> Self {
        let Some(trimmed) = input.map(str::trim).filter(|s| !s.is_empty()) else {
            return RenameAction::Noop;
        };
        if trimmed.to_uppercase() == DELETE_SENTINEL {
            RenameAction::Delete
        } else {
            RenameAction::Rename(trimmed.to_string())
        }
    }
}

/// What actually happened
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenameOutcome {
    Noop,
    Deleted,
    Renamed { name: String, affected: usize },
}

impl RenameOutcome {
    /// Sets whose exercise was rewritten
    pub fn affected_count(&self) -> usize {
        match self {
            RenameOutcome::Renamed { affected, .. } => *affected,
            _ => 0,
        }
    }
}

/// Apply `input` to the exercise `current` across both the set log and the list.
///
/// Both are updated in place together; the caller persists the pair.
pub fn resolve_rename(
    store: &mut SetStore,
    catalog: &mut ExerciseCatalog,
    current: &str,
    input: Option<&str>,
) -> RenameOutcome {
    let from = ExerciseKey::new(current);

    match RenameAction::parse(input) {
        RenameAction::Noop => RenameOutcome::Noop,
        RenameAction::Delete => {
            let removed = catalog.remove_from_list(current);
            tracing::info!(
                "Delisted '{}' (catalog entry removed: {}), logged sets kept",
                current,
                removed
            );
            RenameOutcome::Deleted
        }
        RenameAction::Rename(name) => {
            let affected = store.rename_exercise(&from, &name);
            catalog.rename(&from, &name);
            tracing::info!("Renamed '{}' to '{}' ({} sets)", current, name, affected);
            RenameOutcome::Renamed { name, affected }
        }
    }
}
