//! Starpath — background workers for a star-map route planner.
//!
//! Two independent components keep heavy work off the caller's thread and
//! communicate exclusively through channels:
//! - `loader::DataLoader` fetches the bulk star-system dataset and reshapes
//!   it into a name-keyed map for O(1) lookup.
//! - `worker::TaskWorker` warms a computation environment once, then serves
//!   a stream of identified route-computation requests, correlating each
//!   answer back to its request by id.

pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod messages;
pub mod model;
pub mod worker;
