//! Key/value persistence for todos, daily stats, history and the
//! last-active-day marker.
//!
//! Every record set is written wholesale on each mutation; a reader never
//! sees a partially written file because the file store writes to a temp
//! file and renames it into place.

use crate::error::StoreError;
use crate::model::{day_key, normalize_day_key, DailyStats, HistoryRecord, Todo};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub mod keys {
    pub const TODOS: &str = "todos";
    pub const DAILY_STATS: &str = "daily_stats";
    pub const HISTORY: &str = "history";
    pub const LAST_ACTIVE_DAY: &str = "last_active_day";
}

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "FOCUSME_DATA_DIR";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Resolve the data directory: `FOCUSME_DATA_DIR`, else the platform data dir.
pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let proj_dirs = ProjectDirs::from("com", "focusme", "FocusMe").ok_or(StoreError::NoDataDir)?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&path).map_err(|e| e.error)?;
        debug!(key, path = %path.display(), "record written");
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the Focus Me records on top of a [`KeyValueStore`].
///
/// Loads never fail: a missing key yields the default value, and a key that
/// cannot be read or parsed is logged and treated as missing.
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> S {
        self.store
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!(key, error = %e, "failed to read record, using empty value");
                return T::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "discarding corrupt record");
                T::default()
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)?;
        self.store.set(key, &json)
    }

    pub fn load_todos(&self) -> Vec<Todo> {
        self.load_or_default(keys::TODOS)
    }

    pub fn save_todos(&mut self, todos: &[Todo]) -> Result<(), StoreError> {
        self.save(keys::TODOS, todos)
    }

    pub fn load_daily_stats(&self) -> DailyStats {
        self.load_or_default(keys::DAILY_STATS)
    }

    pub fn save_daily_stats(&mut self, stats: &DailyStats) -> Result<(), StoreError> {
        self.save(keys::DAILY_STATS, stats)
    }

    /// Loads the history, rewriting legacy day identifiers into ISO form.
    pub fn load_history(&self) -> Vec<HistoryRecord> {
        let mut history: Vec<HistoryRecord> = self.load_or_default(keys::HISTORY);
        for record in &mut history {
            match normalize_day_key(&record.date) {
                Some(key) => record.date = key,
                None => warn!(date = %record.date, "history record has an unrecognised date"),
            }
        }
        history
    }

    pub fn save_history(&mut self, history: &[HistoryRecord]) -> Result<(), StoreError> {
        self.save(keys::HISTORY, history)
    }

    /// The stored marker, normalized when it is a recognised day format.
    pub fn load_last_active_day(&self) -> Option<String> {
        let marker: Option<String> = self.load_or_default(keys::LAST_ACTIVE_DAY);
        marker.map(|raw| normalize_day_key(&raw).unwrap_or(raw))
    }

    pub fn save_last_active_day(&mut self, day: NaiveDate) -> Result<(), StoreError> {
        self.save(keys::LAST_ACTIVE_DAY, &day_key(day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DailyStats;
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_todos() -> Vec<Todo> {
        let created = Local.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap();
        vec![
            Todo {
                id: 1,
                text: "Write report".to_string(),
                completed: false,
                created_at: created,
            },
            Todo {
                id: 2,
                text: "Review PR".to_string(),
                completed: true,
                created_at: created,
            },
        ]
    }

    #[test]
    fn test_round_trip_file_store() {
        let temp_dir = tempdir().unwrap();
        let mut persistence = Persistence::new(FileStore::open(temp_dir.path()).unwrap());

        let todos = sample_todos();
        let stats = DailyStats {
            pomodoros_completed: 4,
            tasks_completed: 1,
            focus_minutes: 100,
        };
        let history = vec![HistoryRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            stats,
        )];
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        persistence.save_todos(&todos).unwrap();
        persistence.save_daily_stats(&stats).unwrap();
        persistence.save_history(&history).unwrap();
        persistence.save_last_active_day(day).unwrap();

        let reopened = Persistence::new(FileStore::open(temp_dir.path()).unwrap());
        assert_eq!(reopened.load_todos(), todos);
        assert_eq!(reopened.load_daily_stats(), stats);
        assert_eq!(reopened.load_history(), history);
        assert_eq!(reopened.load_last_active_day().as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_missing_keys_load_defaults() {
        let persistence = Persistence::new(MemoryStore::new());
        assert!(persistence.load_todos().is_empty());
        assert_eq!(persistence.load_daily_stats(), DailyStats::default());
        assert!(persistence.load_history().is_empty());
        assert_eq!(persistence.load_last_active_day(), None);
    }

    #[test]
    fn test_corrupt_history_is_discarded() {
        let mut store = MemoryStore::new();
        store.set(keys::HISTORY, "[{\"date\": \"2024-01-01\",").unwrap();
        store.set(keys::DAILY_STATS, "not json").unwrap();

        let persistence = Persistence::new(store);
        assert!(persistence.load_history().is_empty());
        assert_eq!(persistence.load_daily_stats(), DailyStats::default());
    }

    #[test]
    fn test_legacy_dates_normalized_on_load() {
        let mut store = MemoryStore::new();
        store
            .set(
                keys::HISTORY,
                r#"[{"date":"Mon Jan 01 2024","pomodoros":2,"completedTodos":1,"minutes":50},
                    {"date":"someday","pomodoros":1,"completedTodos":0,"minutes":25}]"#,
            )
            .unwrap();
        store.set(keys::LAST_ACTIVE_DAY, "\"Tue Jan 02 2024\"").unwrap();

        let persistence = Persistence::new(store);
        let history = persistence.load_history();
        assert_eq!(history[0].date, "2024-01-01");
        assert_eq!(history[0].stats.pomodoros_completed, 2);
        assert_eq!(history[1].date, "someday");
        assert_eq!(persistence.load_last_active_day().as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_file_store_missing_key() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("nested");
        let store = FileStore::open(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(store.get("todos").unwrap(), None);
    }
}
