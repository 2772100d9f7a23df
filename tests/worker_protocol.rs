//! End-to-end task worker protocol tests: readiness, correlation, and
//! per-request error isolation over real channels.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use starpath::engine::{ComputeEnvironment, EnvironmentFactory, OptimizerFactory};
use starpath::error::InitError;
use starpath::messages::{TaskRequest, WorkerEvent};
use starpath::model::{key_by_name, KeyedDataset, StarSystem};
use starpath::worker::TaskWorker;

fn system(name: &str, x: f64, y: f64) -> StarSystem {
    StarSystem {
        id: 0,
        name: name.to_string(),
        x,
        y,
        z: 0.0,
        extra: serde_json::Map::new(),
    }
}

fn square() -> KeyedDataset {
    key_by_name(vec![
        system("A", 0.0, 0.0),
        system("B", 10.0, 0.0),
        system("C", 10.0, 10.0),
        system("D", 0.0, 10.0),
    ])
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn spawn_worker(
    factory: Arc<dyn EnvironmentFactory>,
) -> (mpsc::Sender<TaskRequest>, mpsc::Receiver<WorkerEvent>) {
    let (request_tx, request_rx) = mpsc::channel(64);
    let (event_tx, event_rx) = mpsc::channel(64);
    TaskWorker::new(factory).spawn(request_rx, event_tx);
    (request_tx, event_rx)
}

#[tokio::test]
async fn requests_sent_before_ready_are_queued_and_answered() {
    let (request_tx, mut event_rx) = spawn_worker(Arc::new(OptimizerFactory));

    // Fire both requests immediately, without waiting for readiness.
    let baseline = TaskRequest::baseline(names(&["A", "C", "B", "D"]), square());
    let pass = TaskRequest::iterative_pass(names(&["A", "B", "C", "D"]), square(), 0.02);
    let baseline_id = baseline.id;
    let pass_id = pass.id;
    request_tx.send(baseline).await.unwrap();
    request_tx.send(pass).await.unwrap();

    // Ready must still come first; the queued requests follow.
    assert!(matches!(event_rx.recv().await, Some(WorkerEvent::Ready)));

    let mut answered: Vec<Uuid> = Vec::new();
    for _ in 0..2 {
        match event_rx.recv().await {
            Some(WorkerEvent::Result { id, result }) => {
                if id == baseline_id {
                    assert_eq!(result.path[0], "A");
                }
                assert!(result.distance > 0.0);
                answered.push(id);
            }
            other => panic!("expected Result, got {other:?}"),
        }
    }
    answered.sort();
    let mut expected = vec![baseline_id, pass_id];
    expected.sort();
    assert_eq!(answered, expected);
}

#[tokio::test]
async fn back_to_back_requests_yield_two_correlated_results() {
    let (request_tx, mut event_rx) = spawn_worker(Arc::new(OptimizerFactory));
    assert!(matches!(event_rx.recv().await, Some(WorkerEvent::Ready)));

    let baseline = TaskRequest::baseline(names(&["A", "B", "C"]), square());
    let pass = TaskRequest::iterative_pass(names(&["A", "B", "C"]), square(), 0.01);
    let baseline_id = baseline.id;
    let pass_id = pass.id;
    request_tx.send(baseline).await.unwrap();
    request_tx.send(pass).await.unwrap();

    let mut seen = Vec::new();
    for _ in 0..2 {
        match event_rx.recv().await {
            Some(event @ WorkerEvent::Result { .. }) => {
                seen.push(event.request_id().unwrap());
            }
            other => panic!("expected Result, got {other:?}"),
        }
    }
    assert!(seen.contains(&baseline_id));
    assert!(seen.contains(&pass_id));
}

#[tokio::test]
async fn malformed_request_fails_correlated_and_worker_survives() {
    let (request_tx, mut event_rx) = spawn_worker(Arc::new(OptimizerFactory));
    assert!(matches!(event_rx.recv().await, Some(WorkerEvent::Ready)));

    // Empty path: the downstream operation must fail, not panic.
    let bad = TaskRequest::baseline(Vec::new(), square());
    let bad_id = bad.id;
    request_tx.send(bad).await.unwrap();

    match event_rx.recv().await {
        Some(WorkerEvent::TaskFailed { id, error }) => {
            assert_eq!(id, bad_id);
            assert!(!error.is_empty());
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }

    // The worker keeps serving subsequent requests.
    let good = TaskRequest::baseline(names(&["A", "B"]), square());
    let good_id = good.id;
    request_tx.send(good).await.unwrap();

    match event_rx.recv().await {
        Some(WorkerEvent::Result { id, result }) => {
            assert_eq!(id, good_id);
            assert_eq!(result.path, names(&["A", "B"]));
        }
        other => panic!("expected Result, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_system_is_a_per_request_error() {
    let (request_tx, mut event_rx) = spawn_worker(Arc::new(OptimizerFactory));
    assert!(matches!(event_rx.recv().await, Some(WorkerEvent::Ready)));

    let request = TaskRequest::baseline(names(&["A", "Nowhere"]), square());
    let id = request.id;
    request_tx.send(request).await.unwrap();

    match event_rx.recv().await {
        Some(WorkerEvent::TaskFailed { id: failed_id, error }) => {
            assert_eq!(failed_id, id);
            assert!(error.contains("Nowhere"));
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_time_per_pass_is_a_per_request_error() {
    let (request_tx, mut event_rx) = spawn_worker(Arc::new(OptimizerFactory));
    assert!(matches!(event_rx.recv().await, Some(WorkerEvent::Ready)));

    let mut request = TaskRequest::iterative_pass(names(&["A", "B"]), square(), 1.0);
    request.time_per_pass = None;
    let id = request.id;
    request_tx.send(request).await.unwrap();

    match event_rx.recv().await {
        Some(WorkerEvent::TaskFailed { id: failed_id, error }) => {
            assert_eq!(failed_id, id);
            assert!(error.contains("time_per_pass"));
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
}

struct FailingFactory;

#[async_trait]
impl EnvironmentFactory for FailingFactory {
    async fn build(&self) -> Result<Arc<dyn ComputeEnvironment>, InitError> {
        Err(InitError::EnvironmentBuild {
            reason: "interpreter download failed".to_string(),
        })
    }
}

#[tokio::test]
async fn init_failure_emits_init_failed_and_never_ready() {
    let (request_tx, mut event_rx) = spawn_worker(Arc::new(FailingFactory));

    match event_rx.recv().await {
        Some(WorkerEvent::InitFailed { error }) => {
            assert!(error.contains("interpreter download failed"));
        }
        other => panic!("expected InitFailed, got {other:?}"),
    }

    // The worker is gone: its event channel closes and no Ready ever comes.
    assert!(event_rx.recv().await.is_none());
    drop(request_tx);
}
