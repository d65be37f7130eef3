//! One-second tick driver.
//!
//! Ticks are produced by a spawned tokio task and delivered through the
//! host's event channel. Each start bumps a generation number carried by
//! every tick, so ticks queued before a pause or reset can be discarded.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Ticker<E> {
    tx: UnboundedSender<E>,
    make_event: fn(u64) -> E,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl<E: Send + 'static> Ticker<E> {
    pub fn new(tx: UnboundedSender<E>, make_event: fn(u64) -> E) -> Self {
        Self {
            tx,
            make_event,
            generation: 0,
            handle: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether a tick with this generation belongs to the current run.
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_active() && generation == self.generation
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.stop();
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        let make_event = self.make_event;
        self.handle = Some(tokio::spawn(async move {
            // First tick one period from now, not immediately.
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                interval.tick().await;
                if tx.send(make_event(generation)).is_err() {
                    break;
                }
            }
        }));
        debug!(generation, "ticker started");
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(generation = self.generation, "ticker stopped");
        }
    }

    /// Start or stop so that ticks flow exactly while `running`.
    pub fn sync(&mut self, running: bool) {
        match (running, self.is_active()) {
            (true, false) => self.start(),
            (false, true) => self.stop(),
            _ => {}
        }
    }
}

impl<E> Drop for Ticker<E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
