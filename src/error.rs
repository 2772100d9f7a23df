//! Error types for starpath.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Init error: {0}")]
    Init(#[from] InitError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),
}

/// Dataset loading errors. All variants are surfaced to the caller as a
/// single `LoaderEvent::Error` message; the subtype exists for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Dataset request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Dataset request returned status {status}")]
    Status { status: u16 },

    #[error("Failed to decode dataset: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Environment initialization errors. Fatal for the worker: no `Ready` is
/// ever emitted and the component cannot serve requests.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to construct computation environment: {reason}")]
    EnvironmentBuild { reason: String },

    #[error("Failed to load computation program: {reason}")]
    ProgramLoad { reason: String },

    #[error("Invalid readiness transition: {reason}")]
    InvalidTransition { reason: String },
}

/// Per-request task errors. Converted to a correlated `TaskFailed` event;
/// never terminate the worker.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Route path is empty")]
    EmptyPath,

    #[error("Unknown system in path: {name}")]
    UnknownSystem { name: String },

    #[error("Task kind {kind} requires parameter {name}")]
    MissingParameter { kind: String, name: String },

    #[error("Computation failed: {reason}")]
    ExecutionFailed { reason: String },
}

/// Result type alias for starpath.
pub type Result<T> = std::result::Result<T, Error>;
