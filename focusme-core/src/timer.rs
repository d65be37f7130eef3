//! Focus/break countdown state machine.
//!
//! The engine is pure: it knows nothing about stats, storage or sinks. The
//! [`Tracker`](crate::Tracker) reacts to the [`Tick`] outcomes it returns.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
/// Longest accepted focus or break duration.
pub const MAX_MINUTES: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Focus,
    Break,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimerState {
    #[default]
    Idle,
    Focusing,
    OnBreak,
    /// Paused from the given running mode.
    Paused(Mode),
    /// A focus interval just finished; the break is loaded and waits for
    /// the user to accept or skip it.
    BreakReady,
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Focusing | Self::OnBreak)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Ready to start",
            Self::Focusing => "Focusing...",
            Self::OnBreak => "On break...",
            Self::Paused(_) => "Paused",
            Self::BreakReady => "Break time!",
        }
    }
}

/// Snapshot of the countdown for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSession {
    pub mode: Mode,
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub running: bool,
    pub paused: bool,
}

impl TimerSession {
    pub fn progress(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        1.0 - f64::from(self.remaining_seconds) / f64::from(self.total_seconds)
    }

    /// `MM:SS`
    pub fn clock(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl Durations {
    /// Parse raw user input; anything that is not a positive integer falls
    /// back to the defaults.
    pub fn parse(focus: &str, break_: &str) -> Self {
        Self {
            focus_minutes: parse_minutes(focus, DEFAULT_FOCUS_MINUTES),
            break_minutes: parse_minutes(break_, DEFAULT_BREAK_MINUTES),
        }
    }

    fn seconds(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus_minutes.saturating_mul(60),
            Mode::Break => self.break_minutes.saturating_mul(60),
        }
    }
}

pub fn parse_minutes(input: &str, default: u32) -> u32 {
    input.trim().parse::<u32>().ok().and_then(valid_minutes).unwrap_or(default)
}

/// A duration in minutes is usable when it is positive and at most one day.
pub fn valid_minutes(minutes: u32) -> Option<u32> {
    (1..=MAX_MINUTES).contains(&minutes).then_some(minutes)
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The timer is not running; nothing happened.
    Ignored,
    Counting { remaining_seconds: u32 },
    FocusCompleted,
    BreakCompleted,
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    durations: Durations,
    state: TimerState,
    mode: Mode,
    total_seconds: u32,
    remaining_seconds: u32,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

impl TimerEngine {
    pub fn new(durations: Durations) -> Self {
        let total = durations.seconds(Mode::Focus);
        Self {
            durations,
            state: TimerState::Idle,
            mode: Mode::Focus,
            total_seconds: total,
            remaining_seconds: total,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn session(&self) -> TimerSession {
        TimerSession {
            mode: self.mode,
            total_seconds: self.total_seconds,
            remaining_seconds: self.remaining_seconds,
            running: self.state.is_running(),
            paused: self.state.is_paused(),
        }
    }

    /// Durations are read-only unless the timer is idle.
    pub fn is_locked(&self) -> bool {
        self.state != TimerState::Idle
    }

    /// Returns `false` when the change was rejected because a session is active.
    pub fn set_focus_minutes(&mut self, input: &str) -> bool {
        if self.is_locked() {
            return false;
        }
        self.durations.focus_minutes = parse_minutes(input, DEFAULT_FOCUS_MINUTES);
        self.load(Mode::Focus);
        true
    }

    pub fn set_break_minutes(&mut self, input: &str) -> bool {
        if self.is_locked() {
            return false;
        }
        self.durations.break_minutes = parse_minutes(input, DEFAULT_BREAK_MINUTES);
        true
    }

    fn load(&mut self, mode: Mode) {
        self.mode = mode;
        self.total_seconds = self.durations.seconds(mode);
        self.remaining_seconds = self.total_seconds;
    }

    /// Returns `true` if the timer started or resumed.
    pub fn start(&mut self) -> bool {
        let next = match self.state {
            TimerState::Idle => {
                self.load(Mode::Focus);
                TimerState::Focusing
            }
            TimerState::BreakReady => {
                self.load(Mode::Break);
                TimerState::OnBreak
            }
            TimerState::Paused(Mode::Focus) => TimerState::Focusing,
            TimerState::Paused(Mode::Break) => TimerState::OnBreak,
            TimerState::Focusing | TimerState::OnBreak => return false,
        };
        debug!(from = ?self.state, to = ?next, remaining = self.remaining_seconds, "timer start");
        self.state = next;
        true
    }

    /// Returns `true` if a running timer was paused.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }
        self.state = TimerState::Paused(self.mode);
        debug!(remaining = self.remaining_seconds, "timer paused");
        true
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.load(Mode::Focus);
        debug!("timer reset");
    }

    /// Accept the pending break. Only valid in [`TimerState::BreakReady`].
    pub fn begin_break(&mut self) -> bool {
        self.state == TimerState::BreakReady && self.start()
    }

    /// Decline the pending break and go back to idle.
    pub fn skip_break(&mut self) -> bool {
        if self.state != TimerState::BreakReady {
            return false;
        }
        self.reset();
        true
    }

    pub fn tick(&mut self) -> Tick {
        if !self.state.is_running() {
            return Tick::Ignored;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return Tick::Counting {
                remaining_seconds: self.remaining_seconds,
            };
        }
        self.complete()
    }

    fn complete(&mut self) -> Tick {
        match self.mode {
            Mode::Focus => {
                self.state = TimerState::BreakReady;
                self.load(Mode::Break);
                debug!("focus interval complete");
                Tick::FocusCompleted
            }
            Mode::Break => {
                self.reset();
                debug!("break interval complete");
                Tick::BreakCompleted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(focus: u32, break_: u32) -> TimerEngine {
        TimerEngine::new(Durations {
            focus_minutes: focus,
            break_minutes: break_,
        })
    }

    fn run_ticks(engine: &mut TimerEngine, n: u32) -> Tick {
        let mut last = Tick::Ignored;
        for _ in 0..n {
            last = engine.tick();
        }
        last
    }

    #[test]
    fn test_defaults() {
        let engine = TimerEngine::default();
        let session = engine.session();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(session.total_seconds, 1500);
        assert_eq!(session.remaining_seconds, 1500);
        assert!(!session.running);
        assert!(!session.paused);
    }

    #[test]
    fn test_remaining_after_ticks() {
        for minutes in [1, 2, 25] {
            let mut engine = engine(minutes, 5);
            assert!(engine.start());
            let d = minutes * 60;
            assert_eq!(engine.session().remaining_seconds, d);

            for n in [1, d / 2, d - 1] {
                let mut engine = engine.clone();
                run_ticks(&mut engine, n);
                assert_eq!(engine.session().remaining_seconds, d - n);
            }
        }
    }

    #[test]
    fn test_pause_resume_preserves_remaining() {
        let mut engine = engine(1, 1);
        engine.start();
        run_ticks(&mut engine, 17);
        assert!(engine.pause());
        assert_eq!(engine.state(), TimerState::Paused(Mode::Focus));

        // Ticks delivered while paused are ignored
        assert_eq!(run_ticks(&mut engine, 5), Tick::Ignored);
        assert_eq!(engine.session().remaining_seconds, 43);

        assert!(engine.start());
        assert_eq!(engine.state(), TimerState::Focusing);
        assert_eq!(engine.session().remaining_seconds, 43);
        assert_eq!(engine.session().total_seconds, 60);
    }

    #[test]
    fn test_focus_completion_loads_break() {
        let mut engine = engine(1, 2);
        engine.start();
        assert_eq!(run_ticks(&mut engine, 60), Tick::FocusCompleted);
        assert_eq!(engine.state(), TimerState::BreakReady);
        assert_eq!(engine.session().mode, Mode::Break);
        assert_eq!(engine.session().remaining_seconds, 120);
        assert!(engine.is_locked());

        assert!(engine.begin_break());
        assert_eq!(engine.state(), TimerState::OnBreak);
        assert_eq!(run_ticks(&mut engine, 120), Tick::BreakCompleted);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.session().mode, Mode::Focus);
        assert_eq!(engine.session().remaining_seconds, 60);
    }

    #[test]
    fn test_skip_break_resets() {
        let mut engine = engine(1, 5);
        engine.start();
        run_ticks(&mut engine, 60);
        assert!(engine.skip_break());
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.session().remaining_seconds, 60);
        assert!(!engine.skip_break());
    }

    #[test]
    fn test_pause_on_break_resumes_break() {
        let mut engine = engine(1, 1);
        engine.start();
        run_ticks(&mut engine, 60);
        engine.begin_break();
        run_ticks(&mut engine, 10);
        engine.pause();
        assert_eq!(engine.state(), TimerState::Paused(Mode::Break));
        engine.start();
        assert_eq!(engine.state(), TimerState::OnBreak);
        assert_eq!(engine.session().remaining_seconds, 50);
    }

    #[test]
    fn test_reset_discards_progress() {
        let mut engine = engine(2, 1);
        engine.start();
        run_ticks(&mut engine, 30);
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.session().remaining_seconds, 120);
        assert_eq!(engine.tick(), Tick::Ignored);
    }

    #[test]
    fn test_durations_locked_while_active() {
        let mut engine = TimerEngine::default();
        assert!(engine.set_focus_minutes("10"));
        assert_eq!(engine.session().remaining_seconds, 600);

        engine.start();
        assert!(!engine.set_focus_minutes("50"));
        assert!(!engine.set_break_minutes("50"));
        engine.pause();
        assert!(!engine.set_focus_minutes("50"));
        assert_eq!(engine.durations().focus_minutes, 10);
    }

    #[test]
    fn test_invalid_input_falls_back_to_defaults() {
        assert_eq!(parse_minutes("", 25), 25);
        assert_eq!(parse_minutes("abc", 25), 25);
        assert_eq!(parse_minutes("0", 5), 5);
        assert_eq!(parse_minutes("-3", 5), 5);
        assert_eq!(parse_minutes(" 40 ", 25), 40);

        let durations = Durations::parse("x", "");
        assert_eq!(durations, Durations::default());
    }

    #[test]
    fn test_huge_minutes_fall_back() {
        assert_eq!(parse_minutes("1440", 25), 1440);
        assert_eq!(parse_minutes("1441", 25), 25);
        assert_eq!(parse_minutes("71582789", 25), 25);
        assert_eq!(parse_minutes("99999999999", 5), 5);

        let mut engine = TimerEngine::default();
        assert!(engine.set_focus_minutes("71582789"));
        assert!(engine.start());
        assert_eq!(engine.session().total_seconds, 25 * 60);

        let engine = TimerEngine::new(Durations::parse("99999999", "5"));
        assert_eq!(engine.durations(), Durations::default());
    }

    #[test]
    fn test_oversized_durations_saturate() {
        let engine = engine(u32::MAX, 5);
        assert_eq!(engine.session().total_seconds, u32::MAX);
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut engine = TimerEngine::default();
        assert!(engine.start());
        assert!(!engine.start());
        assert!(!engine.begin_break());
    }

    #[test]
    fn test_session_clock() {
        let mut engine = engine(25, 5);
        engine.start();
        run_ticks(&mut engine, 61);
        assert_eq!(engine.session().clock(), "23:59");
    }
}
