//! Configuration types.

/// Dataset loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// URL of the bulk star-system JSON file.
    pub dataset_url: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            dataset_url: "http://localhost:8080/universe_data.json".to_string(),
        }
    }
}

/// Task worker channel sizing.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Capacity of the request channel. Requests sent before the worker is
    /// ready queue here and are served once initialization completes.
    pub request_capacity: usize,
    /// Capacity of the event channel back to the caller.
    pub event_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            request_capacity: 64,
            event_capacity: 64,
        }
    }
}
