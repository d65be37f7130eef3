//! Desktop sinks for interval completion.

use crate::config::TimerConfig;
use focusme_core::sink::{Silent, TerminalBell};
use focusme_core::{Notifier, SinkError, Sinks};

pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), SinkError> {
        notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .appname("focusme")
            .show()
            .map(|_| ())
            .map_err(|e| SinkError::Unavailable(e.to_string()))
    }
}

pub fn sinks(config: &TimerConfig) -> Sinks {
    match (config.notifications, config.sound) {
        (true, true) => Sinks::new(DesktopNotifier, TerminalBell),
        (true, false) => Sinks::new(DesktopNotifier, Silent),
        (false, true) => Sinks::new(Silent, TerminalBell),
        (false, false) => Sinks::silent(),
    }
}
