//! Core of Focus Me: the pomodoro state machine, todos, daily rollover and
//! history aggregation.
//!
//! Everything here is plain data and synchronous logic. Front ends own a
//! [`Tracker`], feed it ticks from a [`Ticker`] and render its snapshots.

pub mod clock;
pub mod error;
pub mod history;
pub mod model;
pub mod sink;
pub mod stats;
pub mod store;
pub mod ticker;
pub mod timer;
pub mod todo;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{SinkError, StoreError};
pub use history::{Bucket, Series, Summary, Window};
pub use model::{DailyStats, HistoryRecord, Todo};
pub use sink::{AudioCue, ConfirmPrompt, Notifier, Sinks};
pub use stats::Rollover;
pub use store::{default_data_dir, FileStore, KeyValueStore, MemoryStore, Persistence};
pub use ticker::Ticker;
pub use timer::{Durations, Mode, Tick, TimerEngine, TimerSession, TimerState};
pub use tracker::Tracker;
