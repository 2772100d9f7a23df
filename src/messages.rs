//! Message contracts between the caller and the background components.
//!
//! Every payload that crosses a component boundary is a tagged union with an
//! explicit direction: commands in, events out. No data is shared; the
//! caller hands datasets over by value and receives detached results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::KeyedDataset;

// ── DataLoader ──────────────────────────────────────────────────────

/// Commands accepted by the dataset loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoaderCommand {
    /// Trigger one independent load cycle.
    LoadData,
}

/// Terminal events emitted by the dataset loader, exactly one per command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoaderEvent {
    /// The full dataset, keyed by system name. Ownership transfers to the
    /// caller; the loader retains nothing.
    Success { data: KeyedDataset },
    /// Any failure in the cycle (transport, status, decode), flattened to
    /// one human-readable message.
    Error { error: String },
}

// ── TaskWorker ──────────────────────────────────────────────────────

/// Which computation a task request routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Fast initial route: nearest-neighbor plus 2-opt refinement.
    Baseline,
    /// One time-boxed deep-search pass over an existing route.
    IterativePass,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Baseline => "baseline",
            Self::IterativePass => "iterative_pass",
        };
        write!(f, "{s}")
    }
}

/// An identified route-computation request. Consumed once by the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Correlation token. The answer to this request carries the same id.
    pub id: Uuid,
    pub kind: TaskKind,
    /// Ordered system names to route through. The first element is the
    /// origin by convention.
    pub path: Vec<String>,
    /// Systems referenced by `path`, handed over by value.
    pub systems_data: KeyedDataset,
    /// Wall-clock budget in seconds for an iterative pass. Required for
    /// `IterativePass`, ignored by `Baseline`.
    pub time_per_pass: Option<f64>,
}

impl TaskRequest {
    /// Build a baseline request with a fresh correlation id.
    pub fn baseline(path: Vec<String>, systems_data: KeyedDataset) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TaskKind::Baseline,
            path,
            systems_data,
            time_per_pass: None,
        }
    }

    /// Build an iterative-pass request with a fresh correlation id.
    pub fn iterative_pass(
        path: Vec<String>,
        systems_data: KeyedDataset,
        time_per_pass: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TaskKind::IterativePass,
            path,
            systems_data,
            time_per_pass: Some(time_per_pass),
        }
    }
}

/// A computed route, detached from the environment that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSolution {
    pub path: Vec<String>,
    pub distance: f64,
}

/// Events emitted by the task worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerEvent {
    /// Environment construction finished. Emitted exactly once, before any
    /// task result.
    Ready,
    /// Environment construction failed. Out-of-band and fatal: the worker
    /// never becomes ready and serves no requests.
    InitFailed { error: String },
    /// One successful result per accepted request.
    Result { id: Uuid, result: RouteSolution },
    /// One failure per failed request. The worker keeps serving others.
    TaskFailed { id: Uuid, error: String },
}

impl WorkerEvent {
    /// Correlation id, if this event answers a specific request.
    pub fn request_id(&self) -> Option<Uuid> {
        match self {
            Self::Result { id, .. } | Self::TaskFailed { id, .. } => Some(*id),
            Self::Ready | Self::InitFailed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_event_tagged_serialization() {
        let json = serde_json::to_string(&WorkerEvent::Ready).unwrap();
        assert_eq!(json, r#"{"type":"ready"}"#);

        let id = Uuid::new_v4();
        let event = WorkerEvent::TaskFailed {
            id,
            error: "boom".to_string(),
        };
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "task_failed");
        assert_eq!(value["id"], id.to_string());
    }

    #[test]
    fn request_id_only_on_correlated_events() {
        let id = Uuid::new_v4();
        assert_eq!(WorkerEvent::Ready.request_id(), None);
        assert_eq!(
            WorkerEvent::InitFailed {
                error: "x".to_string()
            }
            .request_id(),
            None
        );
        assert_eq!(
            WorkerEvent::TaskFailed {
                id,
                error: "x".to_string()
            }
            .request_id(),
            Some(id)
        );
    }

    #[test]
    fn request_constructors_set_kind_and_budget() {
        let baseline = TaskRequest::baseline(vec!["A".to_string()], KeyedDataset::new());
        assert_eq!(baseline.kind, TaskKind::Baseline);
        assert!(baseline.time_per_pass.is_none());

        let pass =
            TaskRequest::iterative_pass(vec!["A".to_string()], KeyedDataset::new(), 5.0);
        assert_eq!(pass.kind, TaskKind::IterativePass);
        assert_eq!(pass.time_per_pass, Some(5.0));
        assert_ne!(baseline.id, pass.id);
    }
}
