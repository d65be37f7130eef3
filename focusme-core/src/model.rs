//! Persisted records: todos, today's counters and archived days.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Canonical calendar-day identifier format (ISO date).
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Day format written by older Focus Me builds (`Mon Jan 01 2024`).
const LEGACY_DAY_KEY_FORMAT: &str = "%a %b %d %Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    #[serde(default, alias = "pomodoros")]
    pub pomodoros_completed: u32,
    #[serde(default, alias = "completedTodos")]
    pub tasks_completed: u32,
    #[serde(default, alias = "minutes")]
    pub focus_minutes: u32,
}

impl DailyStats {
    pub fn record_pomodoro(&mut self, focus_minutes: u32) {
        self.pomodoros_completed += 1;
        self.focus_minutes += focus_minutes;
    }

    pub fn task_completed(&mut self) {
        self.tasks_completed += 1;
    }

    /// Never drops below zero.
    pub fn task_uncompleted(&mut self) {
        self.tasks_completed = self.tasks_completed.saturating_sub(1);
    }

    pub fn is_empty(&self) -> bool {
        self.pomodoros_completed == 0 && self.tasks_completed == 0 && self.focus_minutes == 0
    }
}

/// One archived day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: String,
    #[serde(flatten)]
    pub stats: DailyStats,
}

impl HistoryRecord {
    pub fn new(date: NaiveDate, stats: DailyStats) -> Self {
        Self {
            date: day_key(date),
            stats,
        }
    }

    /// The record's day, if its identifier is in canonical form.
    pub fn day(&self) -> Option<NaiveDate> {
        parse_day_key(&self.date)
    }
}

pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DAY_KEY_FORMAT).ok()
}

/// Rewrites a legacy day identifier into canonical form.
///
/// Returns `None` when the value is in neither format; callers keep such
/// values verbatim so nothing is silently lost.
pub fn normalize_day_key(key: &str) -> Option<String> {
    let key = key.trim();
    parse_day_key(key)
        .or_else(|| NaiveDate::parse_from_str(key, LEGACY_DAY_KEY_FORMAT).ok())
        .map(day_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_day_key() {
        assert_eq!(normalize_day_key("2024-01-01").as_deref(), Some("2024-01-01"));
        assert_eq!(normalize_day_key("Mon Jan 01 2024").as_deref(), Some("2024-01-01"));
        assert_eq!(normalize_day_key("Tue Jan 02 2024 ").as_deref(), Some("2024-01-02"));
        assert_eq!(normalize_day_key("yesterday"), None);
    }

    #[test]
    fn test_task_counter_clamps_at_zero() {
        let mut stats = DailyStats::default();
        stats.task_uncompleted();
        assert_eq!(stats.tasks_completed, 0);

        stats.task_completed();
        stats.task_uncompleted();
        stats.task_uncompleted();
        assert_eq!(stats.tasks_completed, 0);
    }

    #[test]
    fn test_record_pomodoro() {
        let mut stats = DailyStats::default();
        stats.record_pomodoro(25);
        stats.record_pomodoro(30);
        assert_eq!(stats.pomodoros_completed, 2);
        assert_eq!(stats.focus_minutes, 55);
    }

    #[test]
    fn test_legacy_field_names() {
        let json = r#"{"date":"Mon Jan 01 2024","pomodoros":3,"completedTodos":2,"minutes":75}"#;
        let record: HistoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, "Mon Jan 01 2024");
        assert_eq!(
            record.stats,
            DailyStats {
                pomodoros_completed: 3,
                tasks_completed: 2,
                focus_minutes: 75,
            }
        );
    }

    #[test]
    fn test_legacy_todo() {
        let json = r#"{"id":1704103200000,"text":"Write report","completed":false,"createdAt":"2024-01-01T10:00:00.000Z"}"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.id, 1704103200000);
        assert_eq!(todo.text, "Write report");
        assert!(!todo.completed);
    }
}
