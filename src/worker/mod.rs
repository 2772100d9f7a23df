//! Task worker system.
//!
//! - `state` — readiness state machine (Uninitialized → Initializing → Ready)
//! - `worker` — the request reactor: owns the computation environment and
//!   answers every accepted request with exactly one correlated event

pub mod state;
pub mod worker;

pub use state::{Readiness, ReadinessState};
pub use worker::TaskWorker;
