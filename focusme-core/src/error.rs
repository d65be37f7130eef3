use thiserror::Error;

/// Failures of the key/value store backing todos, stats and history.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not determine data directory")]
    NoDataDir,
}

/// Failures of best-effort side effects (notifications, sounds).
///
/// These are logged and swallowed by the core, never propagated to the
/// timer state machine.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied by host")]
    PermissionDenied,
}
