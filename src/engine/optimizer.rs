//! Native route optimizer.
//!
//! Baseline routes are built by nearest-neighbor construction followed by
//! 2-opt refinement. Iterative passes perturb an existing route and run a
//! time-boxed simulated annealing loop over it. Both passes are CPU-bound
//! and run on the blocking thread pool so the worker's reactor stays
//! responsive; a panic inside a pass surfaces as a per-request error.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;

use crate::engine::ComputeEnvironment;
use crate::error::TaskError;
use crate::messages::RouteSolution;
use crate::model::{KeyedDataset, StarSystem};

const COOLING_RATE: f64 = 0.985;
const MIN_TEMPERATURE: f64 = 1e-8;

/// Route optimizer backed by native passes.
pub struct RouteOptimizer;

impl RouteOptimizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RouteOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComputeEnvironment for RouteOptimizer {
    async fn compute_baseline(
        &self,
        path: Vec<String>,
        systems: KeyedDataset,
        origin: String,
    ) -> Result<RouteSolution, TaskError> {
        tokio::task::spawn_blocking(move || baseline_route(&path, &systems, &origin))
            .await
            .map_err(|e| TaskError::ExecutionFailed {
                reason: format!("baseline pass aborted: {e}"),
            })?
    }

    async fn compute_iterative_pass(
        &self,
        path: Vec<String>,
        systems: KeyedDataset,
        time_per_pass: f64,
    ) -> Result<RouteSolution, TaskError> {
        tokio::task::spawn_blocking(move || iterative_pass(&path, &systems, time_per_pass))
            .await
            .map_err(|e| TaskError::ExecutionFailed {
                reason: format!("iterative pass aborted: {e}"),
            })?
    }
}

fn lookup<'a>(systems: &'a KeyedDataset, name: &str) -> Result<&'a StarSystem, TaskError> {
    systems.get(name).ok_or_else(|| TaskError::UnknownSystem {
        name: name.to_string(),
    })
}

/// Resolve every path entry up front so the passes below cannot fail
/// mid-flight on a missing system.
fn resolve<'a>(
    path: &[String],
    systems: &'a KeyedDataset,
) -> Result<Vec<&'a StarSystem>, TaskError> {
    if path.is_empty() {
        return Err(TaskError::EmptyPath);
    }
    path.iter().map(|name| lookup(systems, name)).collect()
}

/// Total distance of an ordered open path. Fewer than two nodes is 0.0.
fn route_distance(route: &[&StarSystem]) -> f64 {
    route.windows(2).map(|leg| leg[0].distance_to(leg[1])).sum()
}

fn route_names(route: &[&StarSystem]) -> Vec<String> {
    route.iter().map(|system| system.name.clone()).collect()
}

/// Nearest-neighbor construction from `origin`, then 2-opt refinement.
pub(crate) fn baseline_route(
    path: &[String],
    systems: &KeyedDataset,
    origin: &str,
) -> Result<RouteSolution, TaskError> {
    if path.is_empty() {
        return Err(TaskError::EmptyPath);
    }
    let origin_system = lookup(systems, origin)?;

    let mut unvisited: Vec<&StarSystem> = path
        .iter()
        .filter(|name| name.as_str() != origin)
        .map(|name| lookup(systems, name))
        .collect::<Result<_, _>>()?;

    let mut route: Vec<&StarSystem> = Vec::with_capacity(path.len());
    route.push(origin_system);
    let mut current = origin_system;
    while !unvisited.is_empty() {
        let mut nearest = 0;
        for (i, candidate) in unvisited.iter().enumerate().skip(1) {
            if current.distance_to(candidate) < current.distance_to(unvisited[nearest]) {
                nearest = i;
            }
        }
        current = unvisited.swap_remove(nearest);
        route.push(current);
    }

    two_opt(&mut route);

    Ok(RouteSolution {
        distance: route_distance(&route),
        path: route_names(&route),
    })
}

/// 2-opt refinement: repeatedly reverse the segment `[i, j)` whenever that
/// shortens the route, restarting after each improvement. The origin at
/// index 0 is pinned.
fn two_opt(route: &mut [&StarSystem]) {
    let n = route.len();
    let mut improved = true;
    while improved {
        improved = false;
        'scan: for i in 1..n.saturating_sub(1) {
            for j in (i + 1)..n {
                let current = route[i - 1].distance_to(route[i])
                    + route[j - 1].distance_to(route[j]);
                let swapped = route[i - 1].distance_to(route[j - 1])
                    + route[i].distance_to(route[j]);
                if swapped < current {
                    route[i..j].reverse();
                    improved = true;
                    break 'scan;
                }
            }
        }
    }
}

/// One time-boxed simulated annealing pass over an existing route.
///
/// The incoming route is shaken first (three random segment reversals when
/// long enough) so successive passes explore different basins. Moves are
/// segment reversal or single-node relocation; interior nodes only, the
/// origin stays pinned. A worse candidate is still accepted with probability
/// exp(-cost_diff / temperature).
pub(crate) fn iterative_pass(
    path: &[String],
    systems: &KeyedDataset,
    time_per_pass: f64,
) -> Result<RouteSolution, TaskError> {
    let resolved = resolve(path, systems)?;
    let n = resolved.len();
    let mut rng = rand::thread_rng();

    let mut best = resolved;
    if n > 4 {
        for _ in 0..3 {
            let (i, j) = distinct_interior_pair(&mut rng, n);
            best[i..j].reverse();
        }
    }

    let mut best_distance = route_distance(&best);
    let average_leg = if n > 1 {
        best_distance / (n - 1) as f64
    } else {
        1.0
    };
    let mut temperature = average_leg;

    // Non-finite or negative budgets collapse to zero: the perturbed route
    // is returned as-is rather than panicking on a bad Duration.
    let budget = if time_per_pass.is_finite() {
        time_per_pass.max(0.0)
    } else {
        0.0
    };
    let deadline = Instant::now() + Duration::from_secs_f64(budget);

    while Instant::now() < deadline {
        let mut candidate = best.clone();

        if rng.gen_range(0.0..1.0) < 0.5 && n > 3 {
            let (i, j) = distinct_interior_pair(&mut rng, n);
            candidate[i..=j].reverse();
        } else if n > 2 {
            let from = rng.gen_range(1..n);
            let system = candidate.remove(from);
            let to = rng.gen_range(1..=candidate.len());
            candidate.insert(to, system);
        }

        let candidate_distance = route_distance(&candidate);
        let cost_diff = candidate_distance - best_distance;
        let accept = cost_diff < 0.0
            || (temperature > MIN_TEMPERATURE
                && rng.gen_range(0.0..1.0) < (-cost_diff / temperature).exp());
        if accept {
            best = candidate;
            best_distance = candidate_distance;
        }

        temperature *= COOLING_RATE;
    }

    Ok(RouteSolution {
        distance: best_distance,
        path: route_names(&best),
    })
}

/// Two distinct indices in `1..n`, sorted ascending. Requires `n > 2`.
fn distinct_interior_pair(rng: &mut impl Rng, n: usize) -> (usize, usize) {
    let mut i = rng.gen_range(1..n);
    let mut j = rng.gen_range(1..n);
    while j == i {
        j = rng.gen_range(1..n);
    }
    if i > j {
        std::mem::swap(&mut i, &mut j);
    }
    (i, j)
}
