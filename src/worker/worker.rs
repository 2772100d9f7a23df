//! Task worker reactor.
//!
//! Amortizes one expensive environment construction across many requests.
//! The environment is built at startup (not on first request); `Ready` is
//! emitted exactly once when construction finishes, and an out-of-band
//! `InitFailed` is emitted instead when it does not. Requests sent before
//! `Ready` simply wait in the request channel and are served once
//! initialization completes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::engine::{ComputeEnvironment, EnvironmentFactory};
use crate::error::{InitError, TaskError};
use crate::messages::{RouteSolution, TaskKind, TaskRequest, WorkerEvent};
use crate::worker::state::{Readiness, ReadinessState};

/// Background task worker. Owns the computation environment exclusively;
/// nothing behind the environment ever crosses the channel boundary.
pub struct TaskWorker {
    factory: Arc<dyn EnvironmentFactory>,
    readiness: Readiness,
    environment: Option<Arc<dyn ComputeEnvironment>>,
}

impl TaskWorker {
    pub fn new(factory: Arc<dyn EnvironmentFactory>) -> Self {
        Self {
            factory,
            readiness: Readiness::new(),
            environment: None,
        }
    }

    /// Spawn the worker reactor. Environment construction begins
    /// immediately. Requests are handled one at a time, to completion, in
    /// arrival order; callers must correlate answers by id, never by order.
    pub fn spawn(
        self,
        rx: mpsc::Receiver<TaskRequest>,
        tx: mpsc::Sender<WorkerEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(rx, tx))
    }

    async fn run(mut self, mut rx: mpsc::Receiver<TaskRequest>, tx: mpsc::Sender<WorkerEvent>) {
        match self.initialize().await {
            Ok(()) => {
                tracing::info!("Task worker ready");
                if tx.send(WorkerEvent::Ready).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Environment initialization failed; worker cannot serve requests");
                let _ = tx
                    .send(WorkerEvent::InitFailed {
                        error: e.to_string(),
                    })
                    .await;
                return;
            }
        }

        while let Some(request) = rx.recv().await {
            let id = request.id;
            let kind = request.kind;
            let event = match self.dispatch(request).await {
                Ok(result) => {
                    tracing::debug!(%id, %kind, "Task completed");
                    WorkerEvent::Result { id, result }
                }
                Err(e) => {
                    tracing::warn!(%id, %kind, error = %e, "Task failed");
                    WorkerEvent::TaskFailed {
                        id,
                        error: e.to_string(),
                    }
                }
            };
            if tx.send(event).await.is_err() {
                tracing::debug!("Worker event receiver dropped; stopping");
                return;
            }
        }
    }

    /// Idempotence is enforced by the readiness machine: this runs once per
    /// worker lifetime and the states never regress.
    async fn initialize(&mut self) -> Result<(), InitError> {
        self.readiness
            .transition_to(ReadinessState::Initializing)
            .map_err(|reason| InitError::InvalidTransition { reason })?;

        tracing::debug!("Constructing computation environment");
        let environment = self.factory.build().await?;
        self.environment = Some(environment);

        self.readiness
            .transition_to(ReadinessState::Ready)
            .map_err(|reason| InitError::InvalidTransition { reason })?;
        Ok(())
    }

    /// Route one request to its task kind. Exactly one of the two
    /// operations runs; every failure is converted to a per-request error.
    async fn dispatch(&self, request: TaskRequest) -> Result<RouteSolution, TaskError> {
        let environment = self
            .environment
            .as_ref()
            .ok_or_else(|| TaskError::ExecutionFailed {
                reason: "environment not initialized".to_string(),
            })?;

        match request.kind {
            TaskKind::Baseline => {
                // Origin is the first path element by convention.
                let origin = request.path.first().cloned().ok_or(TaskError::EmptyPath)?;
                environment
                    .compute_baseline(request.path, request.systems_data, origin)
                    .await
            }
            TaskKind::IterativePass => {
                let time_per_pass =
                    request
                        .time_per_pass
                        .ok_or_else(|| TaskError::MissingParameter {
                            kind: TaskKind::IterativePass.to_string(),
                            name: "time_per_pass".to_string(),
                        })?;
                environment
                    .compute_iterative_pass(request.path, request.systems_data, time_per_pass)
                    .await
            }
        }
    }
}
