use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::sync::mpsc;

use starpath::config::{LoaderConfig, WorkerConfig};
use starpath::engine::OptimizerFactory;
use starpath::loader::DataLoader;
use starpath::messages::{LoaderCommand, LoaderEvent, TaskRequest, WorkerEvent};
use starpath::worker::TaskWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let dataset_url = std::env::var("STARPATH_DATASET_URL")
        .unwrap_or_else(|_| LoaderConfig::default().dataset_url);

    let passes: u32 = std::env::var("STARPATH_PASSES")
        .unwrap_or_else(|_| "3".to_string())
        .parse()
        .unwrap_or(3);

    let time_per_pass: f64 = std::env::var("STARPATH_TIME_PER_PASS")
        .unwrap_or_else(|_| "2".to_string())
        .parse()
        .unwrap_or(2.0);

    eprintln!("🚀 starpath v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Dataset: {}", dataset_url);
    eprintln!("   Passes: {} x {}s\n", passes, time_per_pass);

    // ── Dataset ──────────────────────────────────────────────────────────
    let (command_tx, command_rx) = mpsc::channel(4);
    let (loader_event_tx, mut loader_event_rx) = mpsc::channel(4);
    let loader = DataLoader::new(LoaderConfig { dataset_url });
    let _loader_handle = loader.spawn(command_rx, loader_event_tx);

    command_tx
        .send(LoaderCommand::LoadData)
        .await
        .context("loader stopped before accepting commands")?;
    let systems = match loader_event_rx.recv().await {
        Some(LoaderEvent::Success { data }) => data,
        Some(LoaderEvent::Error { error }) => bail!("dataset load failed: {error}"),
        None => bail!("loader stopped without responding"),
    };

    // Route: explicit system list, or a small sample of the dataset.
    let route: Vec<String> = match std::env::var("STARPATH_ROUTE") {
        Ok(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => systems.keys().take(8).cloned().collect(),
    };
    if route.len() < 2 {
        bail!("need at least two systems to route");
    }
    tracing::info!(systems = route.len(), "Routing over {}", route.join(" → "));

    // ── Task worker ──────────────────────────────────────────────────────
    let worker_config = WorkerConfig::default();
    let (request_tx, request_rx) = mpsc::channel(worker_config.request_capacity);
    let (event_tx, mut event_rx) = mpsc::channel(worker_config.event_capacity);
    let worker = TaskWorker::new(Arc::new(OptimizerFactory));
    let _worker_handle = worker.spawn(request_rx, event_tx);

    match event_rx.recv().await {
        Some(WorkerEvent::Ready) => {}
        Some(WorkerEvent::InitFailed { error }) => bail!("worker initialization failed: {error}"),
        other => bail!("unexpected worker event: {other:?}"),
    }

    // Baseline first, then refine with time-boxed passes.
    let request = TaskRequest::baseline(route, systems.clone());
    let baseline_id = request.id;
    request_tx.send(request).await?;

    let mut best = match event_rx.recv().await {
        Some(WorkerEvent::Result { id, result }) if id == baseline_id => result,
        Some(WorkerEvent::TaskFailed { id, error }) if id == baseline_id => {
            bail!("baseline failed: {error}")
        }
        other => bail!("unexpected worker event: {other:?}"),
    };
    tracing::info!(distance = best.distance, "Baseline route computed");

    for pass in 1..=passes {
        let request = TaskRequest::iterative_pass(best.path.clone(), systems.clone(), time_per_pass);
        let pass_id = request.id;
        request_tx.send(request).await?;

        match event_rx.recv().await {
            Some(WorkerEvent::Result { id, result }) if id == pass_id => {
                if result.distance < best.distance {
                    best = result;
                }
                tracing::info!(pass, distance = best.distance, "Iterative pass complete");
            }
            Some(WorkerEvent::TaskFailed { id, error }) if id == pass_id => {
                tracing::warn!(pass, error = %error, "Iterative pass failed");
            }
            other => bail!("unexpected worker event: {other:?}"),
        }
    }

    println!("Best route ({:.2} units):", best.distance);
    for name in &best.path {
        println!("  {name}");
    }

    Ok(())
}
