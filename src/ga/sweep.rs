use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::domain::model::AdjacencyList;
use crate::ga::detection::{detect, DetectionResult};
use crate::ga::params::GaParams;
use crate::utils::error::{EgonetError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub params: GaParams,
    pub communities: usize,
    pub best_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub generated_at: String,
    pub combinations: usize,
    pub results: BTreeMap<String, SweepOutcome>,
}

pub fn outcome_key(params: &GaParams) -> String {
    format!(
        "pop={} gen={} cx={} mut={}",
        params.population, params.generations, params.crossover_rate, params.mutation_rate
    )
}

/// Evaluate every grid point, at most `workers` at a time. Detection is
/// CPU-bound, so each evaluation runs on the blocking pool. With a seed the
/// sweep is reproducible: grid point `i` gets rng seed `seed + i`.
pub async fn run_sweep(
    adj: AdjacencyList,
    combos: Vec<GaParams>,
    workers: usize,
    seed: Option<u64>,
) -> Result<SweepReport> {
    let total = combos.len();
    if total == 0 {
        return Err(EgonetError::ProcessingError {
            message: "parameter grid is empty".to_string(),
        });
    }

    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let adj = Arc::new(adj);
    let mut tasks: JoinSet<Result<(GaParams, DetectionResult)>> = JoinSet::new();

    for (i, params) in combos.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let adj = adj.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.map_err(|_| {
                EgonetError::ProcessingError {
                    message: "sweep scheduler shut down".to_string(),
                }
            })?;

            tracing::info!(
                combination = i + 1,
                total,
                key = %outcome_key(&params),
                "evaluating grid point"
            );

            let handle = tokio::task::spawn_blocking(move || {
                let mut rng = match seed {
                    Some(s) => StdRng::seed_from_u64(s.wrapping_add(i as u64)),
                    None => StdRng::from_entropy(),
                };
                detect(&adj, &params, &mut rng).map(|result| (params, result))
            });

            handle.await.map_err(|e| EgonetError::ProcessingError {
                message: format!("sweep worker crashed: {}", e),
            })?
        });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (params, detection) = joined.map_err(|e| EgonetError::ProcessingError {
            message: format!("sweep task failed: {}", e),
        })??;

        results.insert(
            outcome_key(&params),
            SweepOutcome {
                communities: detection.communities.len(),
                best_score: detection.best_score,
                params,
            },
        );
    }

    Ok(SweepReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        combinations: total,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> AdjacencyList {
        let mut adj = AdjacencyList::new();
        adj.insert(1, vec![2, 3]);
        adj.insert(2, vec![3]);
        adj.insert(4, vec![5]);
        adj
    }

    fn small_params(generations: usize) -> GaParams {
        GaParams {
            population: 10,
            generations,
            ..GaParams::default()
        }
    }

    #[tokio::test]
    async fn test_sweep_covers_every_grid_point() {
        let combos = vec![small_params(2), small_params(3)];
        let report = run_sweep(small_graph(), combos, 2, Some(1)).await.unwrap();

        assert_eq!(report.combinations, 2);
        assert_eq!(report.results.len(), 2);
        assert!(report.results.contains_key("pop=10 gen=2 cx=0.7 mut=0.2"));
        assert!(report.results.contains_key("pop=10 gen=3 cx=0.7 mut=0.2"));

        for outcome in report.results.values() {
            assert!(outcome.communities >= 1);
            assert!(outcome.best_score >= 0.0);
        }
    }

    #[tokio::test]
    async fn test_sweep_empty_grid_is_error() {
        let err = run_sweep(small_graph(), vec![], 2, None).await.unwrap_err();
        assert!(matches!(err, EgonetError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_sweep_seeded_is_reproducible() {
        let combos = vec![small_params(2)];
        let a = run_sweep(small_graph(), combos.clone(), 1, Some(9)).await.unwrap();
        let b = run_sweep(small_graph(), combos, 1, Some(9)).await.unwrap();

        let key = "pop=10 gen=2 cx=0.7 mut=0.2";
        assert_eq!(a.results[key].best_score, b.results[key].best_score);
        assert_eq!(a.results[key].communities, b.results[key].communities);
    }
}
