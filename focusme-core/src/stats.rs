//! Daily rollover: archive yesterday's counters and start today at zero.

use crate::model::{day_key, DailyStats, HistoryRecord};
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rollover {
    /// The marker already names today.
    SameDay,
    /// No marker was stored; nothing to archive.
    FirstRun,
    /// A new day started; the previous day had no pomodoros worth keeping.
    Reset { previous: String },
    /// A new day started and the previous day was appended to history.
    Archived { previous: String },
}

impl Rollover {
    pub fn changed(&self) -> bool {
        *self != Rollover::SameDay
    }
}

/// Compare the last-active marker with `today` and roll the counters over.
///
/// The caller persists the marker, stats and history when
/// [`Rollover::changed`] is true.
pub fn rollover(
    last_active: Option<&str>,
    today: NaiveDate,
    stats: &mut DailyStats,
    history: &mut Vec<HistoryRecord>,
) -> Rollover {
    let today_key = day_key(today);
    let outcome = match last_active {
        Some(previous) if previous == today_key => return Rollover::SameDay,
        None => Rollover::FirstRun,
        Some(previous) if stats.pomodoros_completed > 0 => {
            history.push(HistoryRecord {
                date: previous.to_string(),
                stats: *stats,
            });
            info!(
                day = previous,
                pomodoros = stats.pomodoros_completed,
                minutes = stats.focus_minutes,
                "archived previous day"
            );
            Rollover::Archived {
                previous: previous.to_string(),
            }
        }
        Some(previous) => Rollover::Reset {
            previous: previous.to_string(),
        },
    };
    *stats = DailyStats::default();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stats(pomodoros: u32, tasks: u32, minutes: u32) -> DailyStats {
        DailyStats {
            pomodoros_completed: pomodoros,
            tasks_completed: tasks,
            focus_minutes: minutes,
        }
    }

    #[test]
    fn test_archives_previous_day() {
        let mut today_stats = stats(3, 2, 75);
        let mut history = Vec::new();

        let outcome = rollover(Some("2024-01-01"), day(2024, 1, 2), &mut today_stats, &mut history);

        assert_eq!(
            outcome,
            Rollover::Archived {
                previous: "2024-01-01".to_string()
            }
        );
        assert_eq!(history, vec![HistoryRecord::new(day(2024, 1, 1), stats(3, 2, 75))]);
        assert_eq!(today_stats, DailyStats::default());
    }

    #[test]
    fn test_same_day_is_untouched() {
        let mut today_stats = stats(1, 1, 25);
        let mut history = Vec::new();

        let outcome = rollover(Some("2024-01-02"), day(2024, 1, 2), &mut today_stats, &mut history);

        assert_eq!(outcome, Rollover::SameDay);
        assert!(!outcome.changed());
        assert_eq!(today_stats, stats(1, 1, 25));
        assert!(history.is_empty());
    }

    #[test]
    fn test_day_without_pomodoros_is_not_archived() {
        let mut today_stats = stats(0, 4, 0);
        let mut history = Vec::new();

        let outcome = rollover(Some("2024-01-01"), day(2024, 1, 5), &mut today_stats, &mut history);

        assert_eq!(
            outcome,
            Rollover::Reset {
                previous: "2024-01-01".to_string()
            }
        );
        assert!(history.is_empty());
        assert_eq!(today_stats, DailyStats::default());
    }

    #[test]
    fn test_first_run_archives_nothing() {
        let mut today_stats = stats(2, 0, 50);
        let mut history = Vec::new();

        let outcome = rollover(None, day(2024, 1, 2), &mut today_stats, &mut history);

        assert_eq!(outcome, Rollover::FirstRun);
        assert!(outcome.changed());
        assert!(history.is_empty());
        assert_eq!(today_stats, DailyStats::default());
    }

    #[test]
    fn test_appends_after_existing_history() {
        let mut today_stats = stats(1, 0, 25);
        let mut history = vec![HistoryRecord::new(day(2023, 12, 30), stats(4, 1, 100))];

        rollover(Some("2024-01-01"), day(2024, 1, 2), &mut today_stats, &mut history);

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, "2023-12-30");
        assert_eq!(history[1].date, "2024-01-01");
    }
}
