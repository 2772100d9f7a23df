//! Computation environment seam.
//!
//! The worker only ever talks to `ComputeEnvironment`; the concrete
//! optimizer behind it is interchangeable (and mockable in tests). The
//! factory mirrors the environment lifecycle: built exactly once per worker,
//! at startup, and owned exclusively by that worker afterwards.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{InitError, TaskError};
use crate::messages::RouteSolution;
use crate::model::KeyedDataset;

pub mod optimizer;

pub use optimizer::RouteOptimizer;

/// An initialized computation environment exposing exactly two operations.
///
/// Implementations must return results detached from any internal state:
/// the caller never holds a reference back into the environment.
#[async_trait]
pub trait ComputeEnvironment: Send + Sync {
    /// Fast initial route over `path`, starting from `origin`.
    async fn compute_baseline(
        &self,
        path: Vec<String>,
        systems: KeyedDataset,
        origin: String,
    ) -> Result<RouteSolution, TaskError>;

    /// One time-boxed deep-search pass over an existing route.
    async fn compute_iterative_pass(
        &self,
        path: Vec<String>,
        systems: KeyedDataset,
        time_per_pass: f64,
    ) -> Result<RouteSolution, TaskError>;
}

/// Builds the computation environment once at worker startup.
#[async_trait]
pub trait EnvironmentFactory: Send + Sync {
    async fn build(&self) -> Result<Arc<dyn ComputeEnvironment>, InitError>;
}

/// Default factory: warms the native route optimizer.
pub struct OptimizerFactory;

#[async_trait]
impl EnvironmentFactory for OptimizerFactory {
    async fn build(&self) -> Result<Arc<dyn ComputeEnvironment>, InitError> {
        tracing::debug!("Warming route optimizer");
        Ok(Arc::new(RouteOptimizer::new()))
    }
}
