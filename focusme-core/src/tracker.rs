//! The single owned state container behind both front ends.
//!
//! `Tracker::open` loads every record and runs the daily rollover before
//! anything can read today's stats. Every mutation persists the record set
//! it touched; write failures are logged and do not undo the change.

use crate::clock::Clock;
use crate::error::StoreError;
use crate::history::{self, Series, Window};
use crate::model::{DailyStats, HistoryRecord, Todo};
use crate::sink::{ConfirmPrompt, Sinks, TONE_HZ, TONE_MS};
use crate::stats::{self, Rollover};
use crate::store::{KeyValueStore, Persistence};
use crate::timer::{Durations, Tick, TimerEngine, TimerSession, TimerState};
use crate::todo::TodoList;
use tracing::{error, info, warn};

pub const BREAK_PROMPT: &str = "Focus time complete! Start break?";

pub struct Tracker<S: KeyValueStore> {
    persistence: Persistence<S>,
    clock: Box<dyn Clock>,
    sinks: Sinks,
    timer: TimerEngine,
    todos: TodoList,
    today: DailyStats,
    history: Vec<HistoryRecord>,
    rollover: Rollover,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn open(store: S, clock: impl Clock + 'static, sinks: Sinks, durations: Durations) -> Self {
        let mut persistence = Persistence::new(store);
        let todos = persistence.load_todos();
        let mut today = persistence.load_daily_stats();
        let mut history = persistence.load_history();
        let last_active = persistence.load_last_active_day();

        let current_day = clock.today();
        let rollover = stats::rollover(last_active.as_deref(), current_day, &mut today, &mut history);
        if rollover.changed() {
            info!(?rollover, day = %current_day, "daily rollover");
            let result = persistence
                .save_last_active_day(current_day)
                .and_then(|_| persistence.save_daily_stats(&today))
                .and_then(|_| persistence.save_history(&history));
            log_write("rollover", result);
        }

        Self {
            persistence,
            clock: Box::new(clock),
            sinks,
            timer: TimerEngine::new(durations),
            todos: TodoList::new(todos),
            today,
            history,
            rollover,
        }
    }

    // ---- snapshots -------------------------------------------------------

    pub fn rollover(&self) -> &Rollover {
        &self.rollover
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn session(&self) -> TimerSession {
        self.timer.session()
    }

    pub fn durations(&self) -> Durations {
        self.timer.durations()
    }

    pub fn todos(&self) -> &[Todo] {
        self.todos.items()
    }

    pub fn today(&self) -> &DailyStats {
        &self.today
    }

    pub fn series(&self, window: Window) -> Series {
        history::aggregate(&self.history, &self.today, self.clock.today(), window)
    }

    pub fn recent(&self, limit: usize) -> Vec<(String, DailyStats)> {
        history::recent(&self.history, limit)
    }

    // ---- timer -----------------------------------------------------------

    pub fn set_focus_minutes(&mut self, input: &str) -> bool {
        self.timer.set_focus_minutes(input)
    }

    pub fn set_break_minutes(&mut self, input: &str) -> bool {
        self.timer.set_break_minutes(input)
    }

    pub fn start(&mut self) -> bool {
        self.timer.start()
    }

    pub fn pause(&mut self) -> bool {
        self.timer.pause()
    }

    pub fn reset(&mut self) {
        self.timer.reset();
    }

    /// Advance the countdown by one second and react to completions.
    ///
    /// After [`Tick::FocusCompleted`] the timer waits in
    /// [`TimerState::BreakReady`] until [`begin_break`](Self::begin_break)
    /// or [`skip_break`](Self::skip_break) is called.
    pub fn tick(&mut self) -> Tick {
        let tick = self.timer.tick();
        match tick {
            Tick::FocusCompleted => {
                let minutes = self.timer.durations().focus_minutes;
                self.today.record_pomodoro(minutes);
                info!(
                    pomodoros = self.today.pomodoros_completed,
                    minutes = self.today.focus_minutes,
                    "pomodoro completed"
                );
                self.save_stats();
                self.signal("Focus complete", "Great work! Time for a break.");
            }
            Tick::BreakCompleted => {
                self.signal("Break complete", "Ready to focus again?");
            }
            Tick::Ignored | Tick::Counting { .. } => {}
        }
        tick
    }

    pub fn begin_break(&mut self) -> bool {
        self.timer.begin_break()
    }

    pub fn skip_break(&mut self) -> bool {
        self.timer.skip_break()
    }

    /// Resolve a pending break decision with a blocking prompt.
    ///
    /// Returns `true` if the break started.
    pub fn resolve_break(&mut self, prompt: &mut dyn ConfirmPrompt) -> bool {
        if self.timer.state() != TimerState::BreakReady {
            return false;
        }
        if prompt.confirm(BREAK_PROMPT) {
            self.begin_break()
        } else {
            self.skip_break();
            false
        }
    }

    fn signal(&self, title: &str, body: &str) {
        if let Err(e) = self.sinks.audio.play_tone(TONE_HZ, TONE_MS) {
            warn!(error = %e, "could not play completion tone");
        }
        if let Err(e) = self.sinks.notifier.notify(title, body) {
            warn!(error = %e, "could not show notification");
        }
    }

    // ---- todos -----------------------------------------------------------

    pub fn add_todo(&mut self, text: &str) -> Option<i64> {
        let now = self.clock.now();
        let id = self.todos.add(text, now)?.id;
        self.save_todos();
        Some(id)
    }

    /// Returns the new completion state, or `None` for an unknown id.
    pub fn toggle_todo(&mut self, id: i64) -> Option<bool> {
        let completed = self.todos.toggle(id)?;
        if completed {
            self.today.task_completed();
        } else {
            self.today.task_uncompleted();
        }
        self.save_todos();
        self.save_stats();
        Some(completed)
    }

    pub fn delete_todo(&mut self, id: i64) -> Option<Todo> {
        let removed = self.todos.delete(id)?;
        if removed.completed {
            self.today.task_uncompleted();
            self.save_stats();
        }
        self.save_todos();
        Some(removed)
    }

    /// Replace history and today's stats with a sample week. Todos are kept.
    pub fn load_sample_week(&mut self) {
        let current_day = self.clock.today();
        let (history, today) = history::sample_week(current_day);
        self.history = history;
        self.today = today;
        info!(day = %current_day, "loaded sample week");
        let result = self
            .persistence
            .save_history(&self.history)
            .and_then(|_| self.persistence.save_last_active_day(current_day));
        log_write("sample history", result);
        self.save_stats();
    }

    // ---- persistence -----------------------------------------------------

    fn save_todos(&mut self) {
        let result = self.persistence.save_todos(self.todos.items());
        log_write("todos", result);
    }

    fn save_stats(&mut self) {
        let result = self.persistence.save_daily_stats(&self.today);
        log_write("daily stats", result);
    }
}

fn log_write(what: &str, result: Result<(), StoreError>) {
    if let Err(e) = result {
        error!(record = what, error = %e, "failed to persist");
    }
}
