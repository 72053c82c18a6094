//! The logbook: set log, exercise list and persistence behind one API.
//!
//! Reads are answered from memory through the pure functions in
//! [`crate::metrics`]. Every write is staged on a copy, persisted, and only
//! then made visible, so a failed write leaves the logbook as it was.

use crate::backup::{self, BackupDocument, ImportPayload};
use crate::catalog::{self, ExerciseCatalog};
use crate::clock::{Clock, SystemClock};
use crate::metrics::{self, BestSet, ExerciseSummary, Trend};
use crate::persist::Persistence;
use crate::rename::{self, RenameOutcome};
use crate::store::SetStore;
use crate::{NewSet, Result, WorkoutSet};
use chrono::{DateTime, NaiveDate, Utc};
use std::io::Write;

/// Counts applied by an import
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportReport {
    pub sets: usize,
    /// `None` when the payload carried no exercise list and the list was kept
    pub exercises: Option<usize>,
}

pub struct Logbook<P: Persistence> {
    store: SetStore,
    catalog: ExerciseCatalog,
    backend: P,
    clock: Box<dyn Clock>,
}

impl<P: Persistence> Logbook<P> {
    /// Hydrate from `backend` using the system clock
    pub fn open(backend: P) -> Result<Self> {
        Self::open_with_clock(backend, Box::new(SystemClock))
    }

    pub fn open_with_clock(backend: P, clock: Box<dyn Clock>) -> Result<Self> {
        let store = SetStore::from_sets(backend.load_sets()?);
        let catalog = ExerciseCatalog::from_entries(backend.load_exercises()?);
        tracing::info!(
            "Opened logbook with {} sets and {} listed exercises",
            store.len(),
            catalog.entries().len()
        );
        Ok(Self {
            store,
            catalog,
            backend,
            clock,
        })
    }

    pub fn store(&self) -> &SetStore {
        &self.store
    }

    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut P {
        &mut self.backend
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn list_all(&self) -> Vec<String> {
        self.catalog.list_all(&self.store)
    }

    /// `list_all` filtered by a case-insensitive substring
    pub fn search(&self, query: &str) -> Vec<String> {
        catalog::search(&self.list_all(), query)
    }

    pub fn sets_for(&self, exercise: &str) -> Vec<&WorkoutSet> {
        metrics::sets_for(self.store.all(), exercise)
    }

    pub fn last_set(&self, exercise: &str) -> Option<&WorkoutSet> {
        metrics::last_set(self.store.all(), exercise)
    }

    pub fn best_set(&self, exercise: &str) -> Option<BestSet<'_>> {
        metrics::best_set(self.store.all(), exercise)
    }

    pub fn series(&self, exercise: &str, max_points: usize) -> Vec<f64> {
        metrics::series(self.store.all(), exercise, max_points)
    }

    pub fn trend(&self, exercise: &str, max_points: usize) -> Trend {
        Trend::from_series(self.series(exercise, max_points))
    }

    pub fn weekly_count(&self, reference: NaiveDate) -> usize {
        metrics::weekly_count(self.store.all(), reference)
    }

    /// Sets logged since Monday of the current week
    pub fn this_week_count(&self) -> usize {
        self.weekly_count(self.clock.today())
    }

    pub fn total_sets(&self) -> usize {
        self.store.len()
    }

    pub fn recent(&self, limit: usize) -> Vec<&WorkoutSet> {
        metrics::recent(self.store.all(), limit)
    }

    pub fn history(&self, exercise: &str, limit: usize) -> Vec<&WorkoutSet> {
        metrics::history(self.store.all(), exercise, limit)
    }

    /// One summary per listed exercise matching `query`, each sparkline
    /// capped at `sparkline_points` values
    pub fn summaries(&self, query: &str, sparkline_points: usize) -> Vec<ExerciseSummary<'_>> {
        self.search(query)
            .iter()
            .map(|name| metrics::summarize(self.store.all(), name, sparkline_points))
            .collect()
    }

    pub fn export(&self) -> BackupDocument {
        let exported_at =
            DateTime::<Utc>::from_timestamp_millis(self.clock.now_millis()).unwrap_or_else(Utc::now);
        BackupDocument::new(
            self.store.all().to_vec(),
            self.catalog.entries().to_vec(),
            exported_at,
        )
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        backup::write_csv(self.store.all(), writer)
    }

    pub fn backup_file_name(&self) -> String {
        backup::backup_file_name(self.clock.today())
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Validate and log a set
    pub fn append(&mut self, draft: NewSet) -> Result<WorkoutSet> {
        let mut store = self.store.clone();
        let set = store.append(draft, &*self.clock)?;
        self.commit(Some(store), None)?;
        tracing::info!(
            "Logged {} x {} of '{}' on {}",
            set.weight,
            set.reps,
            set.exercise,
            set.date
        );
        Ok(set)
    }

    /// Replace every set, keeping the exercise list
    pub fn replace_all(&mut self, sets: Vec<WorkoutSet>) -> Result<()> {
        let mut store = self.store.clone();
        store.replace_all(sets);
        self.commit(Some(store), None)
    }

    /// Import a backup document. A rejected document changes nothing.
    pub fn import(&mut self, text: &str) -> Result<ImportReport> {
        let ImportPayload { sets, exercises } = backup::parse_import(text)?;

        let report = ImportReport {
            sets: sets.len(),
            exercises: exercises.as_ref().map(Vec::len),
        };
        let store = SetStore::from_sets(sets);
        let catalog = exercises.map(ExerciseCatalog::from_entries);
        self.commit(Some(store), catalog)?;

        tracing::info!(
            "Imported {} sets (exercise list replaced: {})",
            report.sets,
            report.exercises.is_some()
        );
        Ok(report)
    }

    /// Remove every set and every listed exercise
    pub fn clear(&mut self) -> Result<()> {
        self.commit(Some(SetStore::new()), Some(ExerciseCatalog::new()))?;
        tracing::info!("Cleared all data");
        Ok(())
    }

    /// Returns `true` if the exercise was not listed yet
    pub fn add_exercise(&mut self, name: &str) -> Result<bool> {
        let mut catalog = self.catalog.clone();
        if !catalog.add(name) {
            return Ok(false);
        }
        self.commit(None, Some(catalog))?;
        tracing::info!("Added exercise '{}'", name.trim());
        Ok(true)
    }

    /// Returns `true` if a list entry was removed. Logged sets are kept.
    pub fn remove_from_list(&mut self, name: &str) -> Result<bool> {
        let mut catalog = self.catalog.clone();
        if !catalog.remove_from_list(name) {
            return Ok(false);
        }
        self.commit(None, Some(catalog))?;
        Ok(true)
    }

    /// Rename or delist `current` according to prompt input.
    ///
    /// Either both the set log and the list change, or neither does.
    pub fn resolve_rename(&mut self, current: &str, input: Option<&str>) -> Result<RenameOutcome> {
        let mut store = self.store.clone();
        let mut catalog = self.catalog.clone();

        let outcome = rename::resolve_rename(&mut store, &mut catalog, current, input);
        match outcome {
            RenameOutcome::Noop => {}
            RenameOutcome::Deleted => self.commit(None, Some(catalog))?,
            RenameOutcome::Renamed { .. } => self.commit(Some(store), Some(catalog))?,
        }
        Ok(outcome)
    }

    /// Persist the staged state, then make it visible.
    ///
    /// If the list fails to save after the sets were written, the previous
    /// sets are written back.
    fn commit(&mut self, store: Option<SetStore>, catalog: Option<ExerciseCatalog>) -> Result<()> {
        if let Some(store) = &store {
            self.backend.save_sets(store.all())?;
        }

        if let Some(catalog) = &catalog {
            if let Err(e) = self.backend.save_exercises(catalog.entries()) {
                if store.is_some() {
                    match self.backend.save_sets(self.store.all()) {
                        Ok(()) => tracing::warn!("Exercise list save failed, sets restored: {}", e),
                        Err(restore) => tracing::error!(
                            "Exercise list save failed ({}) and sets could not be restored: {}",
                            e,
                            restore
                        ),
                    }
                }
                return Err(e);
            }
        }

        if let Some(store) = store {
            self.store = store;
        }
        if let Some(catalog) = catalog {
            self.catalog = catalog;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::persist::{JsonFileBackend, MemoryBackend};
    use crate::Error;
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn logbook() -> Logbook<MemoryBackend> {
        crate::logging::init_test();
        let clock = FixedClock::new(date("2024-01-10"), 1_704_844_800_000);
        Logbook::open_with_clock(MemoryBackend::new(), Box::new(clock)).unwrap()
    }

    #[test]
    fn test_append_persists_and_derives() {
        let mut book = logbook();
        book.append(NewSet::new("Bench Press", 100.0, 5).on("2024-01-01"))
            .unwrap();
        book.append(NewSet::new("bench press", 105.0, 5).on("2024-01-08"))
            .unwrap();

        assert_eq!(book.backend().sets.len(), 2);
        assert_eq!(book.sets_for("BENCH PRESS").len(), 2);
        assert_approx_eq!(book.best_set("Bench Press").unwrap().value.unwrap(), 122.5);
        assert_eq!(book.last_set("bench press").unwrap().date, "2024-01-08");
        assert_eq!(book.list_all(), vec!["Bench Press"]);
    }

    #[test]
    fn test_rejected_append_writes_nothing() {
        let mut book = logbook();
        let err = book.append(NewSet::new("Squat", 0.0, 5)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(book.total_sets(), 0);
        assert_eq!(book.backend().saves, 0);
    }

    #[test]
    fn test_failed_save_keeps_memory_unchanged() {
        let mut book = logbook();
        book.backend_mut().fail_set_saves = true;
        assert!(book.append(NewSet::new("Squat", 100.0, 5)).is_err());
        assert_eq!(book.total_sets(), 0);
    }

    #[test]
    fn test_series_states() {
        let mut book = logbook();
        assert!(book.series("Squat", 18).is_empty());
        assert_eq!(book.trend("Squat", 18), Trend::NoData);

        book.append(NewSet::new("Squat", 100.0, 5)).unwrap();
        assert_eq!(book.series("Squat", 18).len(), 1);
        assert!(matches!(book.trend("Squat", 18), Trend::SinglePoint(_)));

        book.append(NewSet::new("Squat", 110.0, 5)).unwrap();
        assert!(book.trend("Squat", 18).is_chartable());
    }

    #[test]
    fn test_weekly_count_from_wednesday() {
        let mut book = logbook();
        book.append(NewSet::new("Row", 60.0, 8).on("2024-01-07")).unwrap();
        book.append(NewSet::new("Row", 60.0, 8).on("2024-01-08")).unwrap();

        assert_eq!(book.weekly_count(date("2024-01-10")), 1);
        assert_eq!(book.this_week_count(), 1);
        assert_eq!(book.total_sets(), 2);
    }

    #[test]
    fn test_rename_is_all_or_nothing() {
        let mut book = logbook();
        book.add_exercise("Bench").unwrap();
        book.append(NewSet::new("Bench", 100.0, 5)).unwrap();

        book.backend_mut().fail_exercise_saves = true;
        let err = book.resolve_rename("Bench", Some("Bench Press"));
        assert!(err.is_err());

        assert_eq!(book.sets_for("Bench").len(), 1);
        assert_eq!(book.list_all(), vec!["Bench"]);
        assert_eq!(book.backend().sets[0].exercise, "Bench");
        assert_eq!(book.backend().exercises, vec!["Bench"]);

        book.backend_mut().fail_exercise_saves = false;
        let outcome = book.resolve_rename("Bench", Some("Bench Press")).unwrap();
        assert_eq!(outcome.affected_count(), 1);
        assert!(book.sets_for("Bench").is_empty());
        assert_eq!(book.sets_for("bench press").len(), 1);
        assert_eq!(book.backend().exercises, vec!["Bench Press"]);
    }

    #[test]
    fn test_delete_keeps_exercise_with_sets_listed() {
        let mut book = logbook();
        book.add_exercise("OldName").unwrap();
        book.add_exercise("Unused").unwrap();
        book.append(NewSet::new("OldName", 50.0, 10)).unwrap();

        assert_eq!(
            book.resolve_rename("OldName", Some("DELETE")).unwrap(),
            RenameOutcome::Deleted
        );
        assert!(!book.catalog().contains("OldName"));
        assert_eq!(book.list_all(), vec!["OldName", "Unused"]);
        assert_eq!(book.sets_for("OldName").len(), 1);

        book.resolve_rename("Unused", Some("delete")).unwrap();
        assert_eq!(book.list_all(), vec!["OldName"]);
    }

    #[test]
    fn test_cancelled_rename_saves_nothing() {
        let mut book = logbook();
        book.add_exercise("Bench").unwrap();
        let saves = book.backend().saves;
        assert_eq!(book.resolve_rename("Bench", None).unwrap(), RenameOutcome::Noop);
        assert_eq!(book.backend().saves, saves);
    }

    #[test]
    fn test_import_envelope_and_array_match() {
        let sets = r#"[{"id":"1","exercise":"Squat","date":"2024-01-02","weight":140,"reps":5,"createdAt":7}]"#;

        let mut a = logbook();
        a.import(&format!(r#"{{"version":1,"sets":{}}}"#, sets)).unwrap();
        let mut b = logbook();
        b.import(sets).unwrap();

        assert_eq!(a.store(), b.store());
        assert_eq!(a.total_sets(), 1);
    }

    #[test]
    fn test_import_keeps_sets_with_odd_notes() {
        let mut book = logbook();
        let report = book
            .import(r#"[{"id":"1","exercise":"Row","date":"2024-01-02","weight":60,"reps":8,"createdAt":3,"notes":5}]"#)
            .unwrap();

        assert_eq!(report.sets, 1);
        assert_eq!(book.sets_for("row")[0].notes.as_deref(), Some("5"));
    }

    #[test]
    fn test_preloaded_legacy_sets_survive_append() {
        let legacy: WorkoutSet = serde_json::from_value(serde_json::json!({
            "id": "old", "exercise": "Row", "date": "2023-12-30",
            "weight": "60", "reps": 8, "notes": false
        }))
        .unwrap();
        let backend = MemoryBackend::with_data(vec![legacy], vec!["Row".into()]);
        let clock = FixedClock::new(date("2024-01-10"), 1_704_844_800_000);
        let mut book = Logbook::open_with_clock(backend, Box::new(clock)).unwrap();

        book.append(NewSet::new("Row", 62.5, 8)).unwrap();
        assert_eq!(book.backend().sets.len(), 2);
        assert_eq!(book.backend().sets[0].id, "old");
        assert_eq!(book.backend().sets[0].notes.as_deref(), Some("false"));
    }

    #[test]
    fn test_rejected_import_changes_nothing() {
        let mut book = logbook();
        book.append(NewSet::new("Squat", 100.0, 5)).unwrap();
        let before = book.store().clone();

        let err = book.import(r#"{"version":2,"sets":{}}"#).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert_eq!(book.store(), &before);
        assert_eq!(book.backend().sets.len(), 1);
    }

    #[test]
    fn test_import_replaces_list_only_when_present() {
        let mut book = logbook();
        book.add_exercise("Curl").unwrap();

        let report = book.import("[]").unwrap();
        assert_eq!(report, ImportReport { sets: 0, exercises: None });
        assert_eq!(book.catalog().entries(), ["Curl"]);

        let report = book
            .import(r#"{"version":2,"sets":[],"exercises":["Dip","Row"]}"#)
            .unwrap();
        assert_eq!(report.exercises, Some(2));
        assert_eq!(book.list_all(), vec!["Dip", "Row"]);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut book = logbook();
        book.add_exercise("Curl").unwrap();
        book.append(NewSet::new("Row", 60.0, 8)).unwrap();

        book.clear().unwrap();
        assert!(book.list_all().is_empty());
        assert!(book.backend().sets.is_empty());
        assert!(book.backend().exercises.is_empty());
    }

    #[test]
    fn test_summaries_and_history() {
        let mut book = logbook();
        book.append(NewSet::new("Bench", 100.0, 5).on("2024-01-01")).unwrap();
        book.append(NewSet::new("Leg Press", 200.0, 10).on("2024-01-02")).unwrap();
        book.append(NewSet::new("Bench", 90.0, 8).on("2024-01-03")).unwrap();

        let summaries = book.summaries("bench", metrics::SPARKLINE_POINTS);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].last.unwrap().weight, 90.0);
        assert_eq!(summaries[0].sparkline.len(), 2);

        let short = book.summaries("bench", 1);
        assert_eq!(short[0].sparkline.len(), 1);

        let history: Vec<f64> = book.history("Bench", 30).iter().map(|s| s.weight).collect();
        assert_eq!(history, vec![90.0, 100.0]);
        assert_eq!(book.recent(1)[0].weight, 90.0);
    }

    #[test]
    fn test_export_carries_everything() {
        let mut book = logbook();
        book.add_exercise("Curl").unwrap();
        book.append(NewSet::new("Row", 60.0, 8)).unwrap();

        let doc = book.export();
        assert_eq!(doc.version, backup::EXPORT_VERSION);
        assert!(doc.exported_at.is_some());
        assert_eq!(doc.sets.len(), 1);
        assert_eq!(doc.exercises, vec!["Curl"]);
        assert_eq!(book.backup_file_name(), "lightweight-backup-2024-01-10.json");
    }

    #[test]
    fn test_file_backend_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut book = Logbook::open(JsonFileBackend::new(temp_dir.path())).unwrap();
        book.add_exercise("Bench").unwrap();
        book.append(NewSet::new("Bench", 100.0, 5).on("2024-01-01"))
            .unwrap();
        book.resolve_rename("bench", Some("Bench Press")).unwrap();
        drop(book);

        let book = Logbook::open(JsonFileBackend::new(temp_dir.path())).unwrap();
        assert_eq!(book.list_all(), vec!["Bench Press"]);
        assert_eq!(book.sets_for("bench press").len(), 1);
    }
}
