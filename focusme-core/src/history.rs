//! Groups archived days into chart buckets for a week, month or year window.

use crate::model::{day_key, DailyStats, HistoryRecord};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Window {
    #[default]
    Week,
    Month,
    Year,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::Week, Window::Month, Window::Year];

    /// First day included in the window ending on `today`.
    pub fn start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Window::Week => today - Duration::days(6),
            Window::Month => today.with_day(1).unwrap_or(today),
            Window::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
        }
    }

    pub fn contains(&self, day: NaiveDate, today: NaiveDate) -> bool {
        day >= self.start(today) && day <= today
    }

    pub fn next(&self) -> Window {
        match self {
            Window::Week => Window::Month,
            Window::Month => Window::Year,
            Window::Year => Window::Week,
        }
    }

    /// Sort key and label of the bucket a day falls into.
    fn bucket_for(&self, day: NaiveDate) -> (NaiveDate, String) {
        match self {
            Window::Week => (day, day.format("%a %-m/%-d").to_string()),
            Window::Month => (day, day.format("%-m/%-d").to_string()),
            Window::Year => {
                let month = day.with_day(1).unwrap_or(day);
                (month, month.format("%b").to_string())
            }
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Window::Week => "week",
            Window::Month => "month",
            Window::Year => "year",
        };
        f.write_str(name)
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "w" => Ok(Window::Week),
            "month" | "m" => Ok(Window::Month),
            "year" | "y" => Ok(Window::Year),
            other => Err(format!("unknown window '{}', expected week, month or year", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub pomodoros: u32,
    pub minutes: u32,
    pub tasks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_pomodoros: u32,
    pub total_tasks: u32,
    pub total_minutes: u32,
    /// One decimal place, e.g. `"2.5"`.
    pub avg_pomodoros: String,
    pub avg_minutes: u32,
}

impl Summary {
    fn from_buckets(buckets: &[Bucket]) -> Self {
        let total_pomodoros: u32 = buckets.iter().map(|b| b.pomodoros).sum();
        let total_tasks: u32 = buckets.iter().map(|b| b.tasks).sum();
        let total_minutes: u32 = buckets.iter().map(|b| b.minutes).sum();
        let (avg_pomodoros, avg_minutes) = if buckets.is_empty() {
            (0.0, 0.0)
        } else {
            let count = buckets.len() as f64;
            (
                f64::from(total_pomodoros) / count,
                f64::from(total_minutes) / count,
            )
        };
        Self {
            total_pomodoros,
            total_tasks,
            total_minutes,
            avg_pomodoros: format!("{:.1}", avg_pomodoros),
            avg_minutes: avg_minutes.round() as u32,
        }
    }
}

/// Chart-ready output for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub window: Window,
    pub buckets: Vec<Bucket>,
    pub summary: Summary,
}

/// Merge the live stats for `today` into the history.
///
/// A same-day record and the live counters are combined by taking the
/// maximum of each counter. An idle today with no record adds nothing.
pub fn merge_today(history: &[HistoryRecord], today: NaiveDate, live: &DailyStats) -> Vec<HistoryRecord> {
    let today_key = day_key(today);
    let mut merged: Vec<HistoryRecord> = Vec::with_capacity(history.len() + 1);
    let mut seen_today = false;

    for record in history {
        if record.date == today_key {
            seen_today = true;
            let mut record = record.clone();
            record.stats = max_merge(&record.stats, live);
            merged.push(record);
        } else {
            merged.push(record.clone());
        }
    }

    if !seen_today && !live.is_empty() {
        merged.push(HistoryRecord::new(today, *live));
    }
    merged
}

fn max_merge(a: &DailyStats, b: &DailyStats) -> DailyStats {
    DailyStats {
        pomodoros_completed: a.pomodoros_completed.max(b.pomodoros_completed),
        tasks_completed: a.tasks_completed.max(b.tasks_completed),
        focus_minutes: a.focus_minutes.max(b.focus_minutes),
    }
}

pub fn aggregate(
    history: &[HistoryRecord],
    live: &DailyStats,
    today: NaiveDate,
    window: Window,
) -> Series {
    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();

    for record in merge_today(history, today, live) {
        let Some(day) = record.day() else {
            warn!(date = %record.date, "skipping history record with unparseable date");
            continue;
        };
        if !window.contains(day, today) {
            continue;
        }
        let (key, label) = window.bucket_for(day);
        let bucket = buckets.entry(key).or_insert_with(|| Bucket {
            label,
            pomodoros: 0,
            minutes: 0,
            tasks: 0,
        });
        bucket.pomodoros += record.stats.pomodoros_completed;
        bucket.minutes += record.stats.focus_minutes;
        bucket.tasks += record.stats.tasks_completed;
    }

    let buckets: Vec<Bucket> = buckets.into_values().collect();
    let summary = Summary::from_buckets(&buckets);
    Series {
        window,
        buckets,
        summary,
    }
}

/// The `limit` most recent archived days, newest first, labelled `Jan 5`.
pub fn recent(history: &[HistoryRecord], limit: usize) -> Vec<(String, DailyStats)> {
    let mut dated: Vec<(NaiveDate, DailyStats)> = history
        .iter()
        .filter_map(|record| record.day().map(|day| (day, record.stats)))
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated
        .into_iter()
        .take(limit)
        .map(|(day, stats)| (day.format("%b %-d").to_string(), stats))
        .collect()
}

/// Pomodoros, tasks and minutes for the six days before today, oldest first.
const SAMPLE_PAST: [(u32, u32, u32); 6] = [
    (8, 5, 200),
    (12, 8, 300),
    (6, 4, 150),
    (10, 6, 250),
    (14, 10, 350),
    (4, 2, 100),
];
const SAMPLE_TODAY: (u32, u32, u32) = (2, 1, 50);

/// A week of made-up activity ending at `today`, for previewing the chart.
///
/// Past days come back as history records; today's numbers come back as live
/// stats so a later rollover archives them exactly once.
pub fn sample_week(today: NaiveDate) -> (Vec<HistoryRecord>, DailyStats) {
    let to_stats = |(pomodoros, tasks, minutes): (u32, u32, u32)| DailyStats {
        pomodoros_completed: pomodoros,
        tasks_completed: tasks,
        focus_minutes: minutes,
    };
    let history = SAMPLE_PAST
        .iter()
        .zip((1..=SAMPLE_PAST.len() as i64).rev())
        .map(|(counts, offset)| HistoryRecord::new(today - Duration::days(offset), to_stats(*counts)))
        .collect();
    (history, to_stats(SAMPLE_TODAY))
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

    fn record(date: NaiveDate, pomodoros: u32, tasks: u32, minutes: u32) -> HistoryRecord {
        HistoryRecord::new(date, stats(pomodoros, tasks, minutes))
    }

    #[test]
    fn test_week_of_identical_days() {
        let today = day(2024, 1, 15);
        let history: Vec<HistoryRecord> = (0..7)
            .map(|offset| record(today - Duration::days(offset), 1, 1, 25))
            .collect();

        let series = aggregate(&history, &DailyStats::default(), today, Window::Week);

        assert_eq!(series.buckets.len(), 7);
        for bucket in &series.buckets {
            assert_eq!((bucket.pomodoros, bucket.minutes, bucket.tasks), (1, 25, 1));
        }
        assert_eq!(series.summary.total_pomodoros, 7);
        assert_eq!(series.summary.total_minutes, 175);
        assert_eq!(series.summary.total_tasks, 7);
        assert_eq!(series.summary.avg_pomodoros, "1.0");
        assert_eq!(series.summary.avg_minutes, 25);
    }

    #[test]
    fn test_week_buckets_are_chronological() {
        let today = day(2024, 1, 15);
        // Stored out of order
        let history = vec![
            record(day(2024, 1, 14), 2, 0, 50),
            record(day(2024, 1, 9), 1, 0, 25),
            record(day(2024, 1, 8), 9, 9, 9), // outside the window
            record(day(2024, 1, 12), 3, 1, 75),
        ];

        let series = aggregate(&history, &DailyStats::default(), today, Window::Week);

        let labels: Vec<&str> = series.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Tue 1/9", "Fri 1/12", "Sun 1/14"]);
        assert_eq!(series.summary.total_pomodoros, 6);
        assert_eq!(series.summary.avg_pomodoros, "2.0");
    }

    #[test]
    fn test_month_window_starts_on_first() {
        let today = day(2024, 3, 10);
        let history = vec![
            record(day(2024, 2, 29), 5, 0, 125),
            record(day(2024, 3, 1), 2, 1, 50),
            record(day(2024, 3, 10), 1, 0, 25),
        ];

        let series = aggregate(&history, &DailyStats::default(), today, Window::Month);

        let labels: Vec<&str> = series.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["3/1", "3/10"]);
    }

    #[test]
    fn test_year_window_sums_months() {
        let today = day(2024, 5, 20);
        let history = vec![
            record(day(2023, 12, 31), 8, 0, 200),
            record(day(2024, 3, 4), 3, 1, 75),
            record(day(2024, 3, 18), 4, 2, 100),
            record(day(2024, 1, 2), 2, 0, 50),
        ];

        let series = aggregate(&history, &DailyStats::default(), today, Window::Year);

        assert_eq!(
            series.buckets,
            vec![
                Bucket {
                    label: "Jan".to_string(),
                    pomodoros: 2,
                    minutes: 50,
                    tasks: 0,
                },
                Bucket {
                    label: "Mar".to_string(),
                    pomodoros: 7,
                    minutes: 175,
                    tasks: 3,
                },
            ]
        );
        assert_eq!(series.summary.avg_pomodoros, "4.5");
        assert_eq!(series.summary.avg_minutes, 113);
    }

    #[test]
    fn test_today_is_max_merged() {
        let today = day(2024, 1, 15);
        let history = vec![record(today, 2, 5, 50)];
        let live = stats(3, 1, 75);

        let merged = merge_today(&history, today, &live);
        assert_eq!(merged, vec![record(today, 3, 5, 75)]);

        let series = aggregate(&history, &live, today, Window::Week);
        assert_eq!(series.buckets.len(), 1);
        assert_eq!(series.buckets[0].pomodoros, 3);
        assert_eq!(series.buckets[0].tasks, 5);
    }

    #[test]
    fn test_live_today_added_when_active() {
        let today = day(2024, 1, 15);
        let history = vec![record(day(2024, 1, 14), 1, 0, 25)];

        let idle = aggregate(&history, &DailyStats::default(), today, Window::Week);
        assert_eq!(idle.buckets.len(), 1);

        let active = aggregate(&history, &stats(2, 0, 50), today, Window::Week);
        assert_eq!(active.buckets.len(), 2);
        assert_eq!(active.buckets[1].label, "Mon 1/15");
    }

    #[test]
    fn test_unparseable_dates_are_skipped() {
        let today = day(2024, 1, 15);
        let history = vec![
            HistoryRecord {
                date: "someday".to_string(),
                stats: stats(9, 9, 9),
            },
            record(day(2024, 1, 15), 1, 0, 25),
        ];

        let series = aggregate(&history, &DailyStats::default(), today, Window::Week);
        assert_eq!(series.buckets.len(), 1);
        assert_eq!(series.summary.total_pomodoros, 1);
    }

    #[test]
    fn test_empty_summary() {
        let series = aggregate(&[], &DailyStats::default(), day(2024, 1, 15), Window::Month);
        assert!(series.buckets.is_empty());
        assert_eq!(series.summary.avg_pomodoros, "0.0");
        assert_eq!(series.summary.avg_minutes, 0);
    }

    #[test]
    fn test_recent_sorts_by_date() {
        let history = vec![
            record(day(2024, 1, 3), 3, 0, 75),
            record(day(2024, 1, 5), 5, 0, 125),
            record(day(2024, 1, 1), 1, 0, 25),
        ];

        let rows = recent(&history, 2);
        let labels: Vec<&str> = rows.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["Jan 5", "Jan 3"]);
    }

    #[test]
    fn test_window_parse() {
        assert_eq!("Week".parse::<Window>(), Ok(Window::Week));
        assert_eq!("m".parse::<Window>(), Ok(Window::Month));
        assert!("decade".parse::<Window>().is_err());
        assert_eq!(Window::Year.next(), Window::Week);
    }

    #[test]
    fn test_sample_week_fills_the_chart() {
        let today = day(2024, 1, 21);
        let (history, live) = sample_week(today);

        assert_eq!(history.len(), 6);
        assert_eq!(history[0].date, "2024-01-15");
        assert_eq!(history[5].date, "2024-01-20");
        assert_eq!(live, stats(2, 1, 50));

        let series = aggregate(&history, &live, today, Window::Week);
        assert_eq!(series.buckets.len(), 7);
        assert_eq!(series.summary.total_pomodoros, 56);
        assert_eq!(series.summary.total_tasks, 36);
        assert_eq!(series.summary.total_minutes, 1400);
        assert_eq!(series.summary.avg_pomodoros, "8.0");
        assert_eq!(series.summary.avg_minutes, 200);
    }
}
