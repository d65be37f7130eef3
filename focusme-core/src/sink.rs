//! Collaborators the core calls into: notifications, sounds and the
//! yes/no prompt shown when a focus interval ends.

use crate::error::SinkError;
use std::io::{self, BufRead, Write};
use tracing::info;

/// Frequency of the completion tone.
pub const TONE_HZ: u32 = 800;
/// Length of the completion tone.
pub const TONE_MS: u64 = 500;

pub trait Notifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), SinkError>;
}

pub trait AudioCue {
    fn play_tone(&self, frequency_hz: u32, duration_ms: u64) -> Result<(), SinkError>;
}

pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _title: &str, _body: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

impl AudioCue for Silent {
    fn play_tone(&self, _frequency_hz: u32, _duration_ms: u64) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), SinkError> {
        info!(title, body, "notification");
        Ok(())
    }
}

/// Rings the terminal bell. Terminals have a single fixed tone, so the
/// requested frequency and duration are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AudioCue for TerminalBell {
    fn play_tone(&self, _frequency_hz: u32, _duration_ms: u64) -> Result<(), SinkError> {
        let mut out = io::stdout();
        out.write_all(b"\x07")
            .and_then(|_| out.flush())
            .map_err(|e| SinkError::Unavailable(e.to_string()))
    }
}

/// Asks on stdout and reads `y`/`n` from stdin. Anything but yes declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        self.0
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// The sinks used when an interval completes.
pub struct Sinks {
    pub notifier: Box<dyn Notifier>,
    pub audio: Box<dyn AudioCue>,
}

impl Sinks {
    pub fn new(notifier: impl Notifier + 'static, audio: impl AudioCue + 'static) -> Self {
        Self {
            notifier: Box::new(notifier),
            audio: Box::new(audio),
        }
    }

    pub fn silent() -> Self {
        Self::new(Silent, Silent)
    }
}
