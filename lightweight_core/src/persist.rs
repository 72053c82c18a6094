//! Persistence for the set log and the exercise list.
//!
//! The core only talks to a `Persistence` implementation. `JsonFileBackend`
//! keeps two JSON arrays on disk with file locking and atomic replacement;
//! `MemoryBackend` is an in-memory stand-in for tests.

use crate::{Error, Result, WorkoutSet};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the set log inside the data directory
pub const SETS_FILE: &str = "sets.json";

/// File name of the exercise list inside the data directory
pub const EXERCISES_FILE: &str = "exercises.json";

/// Load/save hooks for persisted state
pub trait Persistence {
    fn load_sets(&self) -> Result<Vec<WorkoutSet>>;
    fn save_sets(&mut self, sets: &[WorkoutSet]) -> Result<()>;
    fn load_exercises(&self) -> Result<Vec<String>>;
    fn save_exercises(&mut self, exercises: &[String]) -> Result<()>;
}

/// JSON files in a data directory
#[derive(Clone, Debug)]
pub struct JsonFileBackend {
    sets_path: PathBuf,
    exercises_path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            sets_path: data_dir.join(SETS_FILE),
            exercises_path: data_dir.join(EXERCISES_FILE),
        }
    }

    pub fn sets_path(&self) -> &Path {
        &self.sets_path
    }

    pub fn exercises_path(&self) -> &Path {
        &self.exercises_path
    }
}

impl Persistence for JsonFileBackend {
    fn load_sets(&self) -> Result<Vec<WorkoutSet>> {
        read_json_array(&self.sets_path)
    }

    fn save_sets(&mut self, sets: &[WorkoutSet]) -> Result<()> {
        write_json_atomic(&self.sets_path, sets)?;
        tracing::debug!("Saved {} sets to {:?}", sets.len(), self.sets_path);
        Ok(())
    }

    fn load_exercises(&self) -> Result<Vec<String>> {
        read_json_array(&self.exercises_path)
    }

    fn save_exercises(&mut self, exercises: &[String]) -> Result<()> {
        write_json_atomic(&self.exercises_path, exercises)?;
        tracing::debug!(
            "Saved {} exercises to {:?}",
            exercises.len(),
            self.exercises_path
        );
        Ok(())
    }
}

/// Read a JSON array with a shared lock.
///
/// A missing file reads as empty. A file that is not a JSON array is logged
/// and read as empty; individual elements that fail to decode are skipped.
fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        tracing::debug!("No file at {:?}, starting empty", path);
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    let items = match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) => Vec::new(),
        Ok(_) => {
            tracing::warn!("{:?} does not hold a JSON array. Starting empty.", path);
            return Ok(Vec::new());
        }
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Starting empty.", path, e);
            return Ok(Vec::new());
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(value) => out.push(value),
            Err(e) => {
                tracing::warn!("Skipping entry {} in {:?}: {}", index + 1, path, e);
            }
        }
    }

    tracing::debug!("Read {} entries from {:?}", out.len(), path);
    Ok(out)
}

/// Write `value` as JSON by replacing `path` atomically.
///
/// 1. Write to a temp file in the same directory
/// 2. Sync it to disk
/// 3. Rename it over the original
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Other(format!("{:?} has no parent directory", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// In-memory persistence for tests and previews
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    pub sets: Vec<WorkoutSet>,
    pub exercises: Vec<String>,
    /// Make every `save_sets` fail
    pub fail_set_saves: bool,
    /// Make every `save_exercises` fail
    pub fail_exercise_saves: bool,
    /// Number of successful saves of either kind
    pub saves: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(sets: Vec<WorkoutSet>, exercises: Vec<String>) -> Self {
        Self {
            sets,
            exercises,
            ..Self::default()
        }
    }
}

impl Persistence for MemoryBackend {
    fn load_sets(&self) -> Result<Vec<WorkoutSet>> {
        Ok(self.sets.clone())
    }

    fn save_sets(&mut self, sets: &[WorkoutSet]) -> Result<()> {
        if self.fail_set_saves {
            return Err(Error::Other("set save failed".into()));
        }
        self.sets = sets.to_vec();
        self.saves += 1;
        Ok(())
    }

    fn load_exercises(&self) -> Result<Vec<String>> {
        Ok(self.exercises.clone())
    }

    fn save_exercises(&mut self, exercises: &[String]) -> Result<()> {
        if self.fail_exercise_saves {
            return Err(Error::Other("exercise save failed".into()));
        }
        self.exercises = exercises.to_vec();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_set(exercise: &str) -> WorkoutSet {
        serde_json::from_value(serde_json::json!({
            "id": format!("id-{}", exercise),
            "exercise": exercise,
            "date": "2024-01-01",
            "weight": 100,
            "reps": 5,
            "createdAt": 1,
            "tempo": "3-1-1"
        }))
        .unwrap()
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut backend = JsonFileBackend::new(temp_dir.path());

        let sets = vec![sample_set("Bench"), sample_set("Squat")];
        backend.save_sets(&sets).unwrap();
        backend
            .save_exercises(&["Bench".to_string(), "Squat".to_string()])
            .unwrap();

        assert_eq!(backend.load_sets().unwrap(), sets);
        assert_eq!(backend.load_exercises().unwrap(), vec!["Bench", "Squat"]);
    }

    #[test]
    fn test_load_nonexistent_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(temp_dir.path().join("missing"));
        assert!(backend.load_sets().unwrap().is_empty());
        assert!(backend.load_exercises().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_file_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join(SETS_FILE), "{ invalid json }").unwrap();
        std::fs::write(temp_dir.path().join(EXERCISES_FILE), r#"{"a": 1}"#).unwrap();

        let backend = JsonFileBackend::new(temp_dir.path());
        assert!(backend.load_sets().unwrap().is_empty());
        assert!(backend.load_exercises().unwrap().is_empty());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(EXERCISES_FILE),
            r#"["Bench", 42, "Squat"]"#,
        )
        .unwrap();

        let backend = JsonFileBackend::new(temp_dir.path());
        assert_eq!(backend.load_exercises().unwrap(), vec!["Bench", "Squat"]);
    }

    #[test]
    fn test_sets_with_numeric_notes_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(SETS_FILE),
            r#"[{"id":"1","exercise":"Row","date":"2024-01-02","weight":60,"reps":8,"createdAt":3,"notes":5}]"#,
        )
        .unwrap();

        let mut backend = JsonFileBackend::new(temp_dir.path());
        let sets = backend.load_sets().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].notes.as_deref(), Some("5"));

        backend.save_sets(&sets).unwrap();
        assert_eq!(backend.load_sets().unwrap(), sets);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut backend = JsonFileBackend::new(temp_dir.path());
        backend.save_sets(&[sample_set("Row")]).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != SETS_FILE)
            .collect();
        assert!(extras.is_empty(), "unexpected files: {:?}", extras);
    }

    #[test]
    fn test_memory_backend_failures() {
        let mut backend = MemoryBackend::new();
        backend.fail_exercise_saves = true;
        assert!(backend.save_exercises(&["Bench".into()]).is_err());
        assert!(backend.save_sets(&[sample_set("Bench")]).is_ok());
        assert_eq!(backend.saves, 1);
    }
}
