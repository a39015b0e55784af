use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::domain::model::AdjacencyList;
use crate::ga::params::GaParams;
use crate::graph::{AdjMatrix, NodeIndex};
use crate::utils::error::{EgonetError, Result};
use crate::utils::validation::Validate;

/// Locus-based encoding: gene `g[i]` points at a neighbor of node `i`, so
/// every individual describes a valid partition of the graph.
type Individual = Vec<usize>;

#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    /// Detected communities, as original node ids.
    pub communities: Vec<Vec<i64>>,
    /// Community Score of the winning individual.
    pub best_score: f64,
    pub generations: usize,
}

fn random_individual<R: Rng>(neighbors: &[Vec<usize>], rng: &mut R) -> Individual {
    neighbors
        .iter()
        .enumerate()
        .map(|(i, candidates)| {
            if candidates.is_empty() {
                // Isolated node: the self-gene keeps it a singleton.
                i
            } else {
                candidates[rng.gen_range(0..candidates.len())]
            }
        })
        .collect()
}

/// Decode an individual into its partition: nodes connected through the
/// `i -> g[i]` links end up in the same community.
fn decode(genes: &[usize]) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..genes.len()).collect();

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for (i, &g) in genes.iter().enumerate() {
        let root_i = find(&mut parent, i);
        let root_g = find(&mut parent, g);
        if root_i != root_g {
            parent[root_g] = root_i;
        }
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..genes.len() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(i);
    }
    groups.into_values().collect()
}

/// Community Score: per community, the volume of its submatrix times the
/// power mean (order `r`) of the submatrix row means.
fn community_score(subsets: &[Vec<usize>], r: f64, matrix: &AdjMatrix) -> f64 {
    let mut fitness = 0.0;
    for sub in subsets {
        let k = sub.len() as f64;
        let mut volume = 0.0;
        let mut power_mean = 0.0;
        for &i in sub {
            let row_sum = sub.iter().filter(|&&j| matrix.is_edge(i, j)).count() as f64;
            power_mean += (row_sum / k).powf(r) / k;
            volume += row_sum;
        }
        fitness += power_mean * volume;
    }
    fitness
}

/// Fitness-proportional selection over `(population index, score)` pairs.
fn roulette<R: Rng>(pool: &[(usize, f64)], rng: &mut R) -> usize {
    let total: f64 = pool.iter().map(|(_, score)| *score).sum();
    if total <= 0.0 {
        return pool[rng.gen_range(0..pool.len())].0;
    }

    let spin = rng.gen::<f64>();
    let mut acc = 0.0;
    for &(idx, score) in pool {
        acc += score;
        if spin < acc / total {
            return idx;
        }
    }
    // Floating-point slack: the spin landed past the last fraction.
    pool[pool.len() - 1].0
}

fn uniform_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rate: f64,
    rng: &mut R,
) -> Individual {
    if rng.gen::<f64>() < rate {
        parent1
            .iter()
            .zip(parent2)
            .map(|(&a, &b)| if rng.gen::<bool>() { a } else { b })
            .collect()
    } else if rng.gen::<bool>() {
        parent1.to_vec()
    } else {
        parent2.to_vec()
    }
}

/// Re-point one gene at another neighbor of its node. Only nodes with more
/// than one neighbor can mutate, so the partition stays valid.
fn mutate<R: Rng>(genes: &mut Individual, neighbors: &[Vec<usize>], rate: f64, rng: &mut R) {
    if rng.gen::<f64>() >= rate {
        return;
    }

    let eligible: Vec<usize> = (0..genes.len())
        .filter(|&i| neighbors[i].len() > 1)
        .collect();
    if let Some(&node) = eligible.choose(rng) {
        if let Some(&gene) = neighbors[node].choose(rng) {
            genes[node] = gene;
        }
    }
}

/// Run the generational loop and decode the best individual found.
pub fn detect<R: Rng>(adj: &AdjacencyList, params: &GaParams, rng: &mut R) -> Result<DetectionResult> {
    params.validate()?;

    let index = NodeIndex::from_adjacency(adj);
    if index.is_empty() {
        return Err(EgonetError::ProcessingError {
            message: "cannot detect communities in an empty graph".to_string(),
        });
    }

    let matrix = AdjMatrix::from_adjacency(adj, &index);
    let neighbors = matrix.neighbor_lists();
    let elite_count = (params.population as f64 * params.elite_fraction).floor() as usize;

    let mut population: Vec<Individual> = (0..params.population)
        .map(|_| random_individual(&neighbors, rng))
        .collect();

    for generation in 0..params.generations {
        let scores: Vec<f64> = population
            .iter()
            .map(|individual| community_score(&decode(individual), params.r, &matrix))
            .collect();

        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
        });

        tracing::debug!(
            generation = generation + 1,
            total = params.generations,
            best_score = scores[order[0]],
            "generation scored"
        );

        // Elites survive unchanged; everyone else breeds by roulette.
        let pool: Vec<(usize, f64)> = order[elite_count..]
            .iter()
            .map(|&i| (i, scores[i]))
            .collect();

        let mut next: Vec<Individual> = order[..elite_count]
            .iter()
            .map(|&i| population[i].clone())
            .collect();

        while next.len() < params.population {
            let p1 = roulette(&pool, rng);
            let p2 = roulette(&pool, rng);
            let mut child =
                uniform_crossover(&population[p1], &population[p2], params.crossover_rate, rng);
            mutate(&mut child, &neighbors, params.mutation_rate, rng);
            next.push(child);
        }

        population = next;
    }

    let (best_index, best_score) = population
        .iter()
        .enumerate()
        .map(|(i, individual)| (i, community_score(&decode(individual), params.r, &matrix)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .ok_or_else(|| EgonetError::ProcessingError {
            message: "population is empty".to_string(),
        })?;

    let communities: Vec<Vec<i64>> = decode(&population[best_index])
        .into_iter()
        .map(|sub| sub.into_iter().map(|i| index.id(i)).collect())
        .collect();

    Ok(DetectionResult {
        communities,
        best_score,
        generations: params.generations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_triangles() -> AdjacencyList {
        let mut adj = AdjacencyList::new();
        adj.insert(1, vec![2, 3]);
        adj.insert(2, vec![3]);
        adj.insert(10, vec![11, 12]);
        adj.insert(11, vec![12]);
        adj
    }

    #[test]
    fn test_decode_groups_linked_genes() {
        // 0 <-> 1 and 2 <-> 3.
        let communities = decode(&[1, 0, 3, 2]);
        assert_eq!(communities, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_decode_chain_collapses_to_one_group() {
        let communities = decode(&[1, 2, 3, 3]);
        assert_eq!(communities, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_community_score_of_triangle() {
        let mut adj = AdjacencyList::new();
        adj.insert(1, vec![2, 3]);
        adj.insert(2, vec![3]);

        let index = NodeIndex::from_adjacency(&adj);
        let matrix = AdjMatrix::from_adjacency(&adj, &index);

        // Whole triangle as one community, r = 1: volume 6, mean row mean
        // 2/3, score 4.
        let score = community_score(&[vec![0, 1, 2]], 1.0, &matrix);
        assert!((score - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_roulette_respects_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = vec![(3, 1.0), (5, 2.0)];
        for _ in 0..50 {
            let picked = roulette(&pool, &mut rng);
            assert!(picked == 3 || picked == 5);
        }
    }

    #[test]
    fn test_roulette_with_zero_scores_still_picks() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = vec![(0, 0.0), (1, 0.0)];
        let picked = roulette(&pool, &mut rng);
        assert!(picked <= 1);
    }

    #[test]
    fn test_detect_partitions_all_nodes_exactly_once() {
        let adj = two_triangles();
        let params = GaParams {
            population: 40,
            generations: 10,
            ..GaParams::default()
        };
        let mut rng = StdRng::seed_from_u64(42);

        let result = detect(&adj, &params, &mut rng).unwrap();

        let mut seen: Vec<i64> = result.communities.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 10, 11, 12]);
    }

    #[test]
    fn test_detect_never_merges_disconnected_components() {
        // Genes only ever point at real neighbors, so no community can span
        // the two triangles.
        let adj = two_triangles();
        let params = GaParams {
            population: 40,
            generations: 10,
            ..GaParams::default()
        };
        let mut rng = StdRng::seed_from_u64(7);

        let result = detect(&adj, &params, &mut rng).unwrap();

        for community in &result.communities {
            let left = community.iter().any(|&id| id < 10);
            let right = community.iter().any(|&id| id >= 10);
            assert!(!(left && right), "community spans components: {:?}", community);
        }
        assert!(result.best_score > 0.0);
    }

    #[test]
    fn test_detect_isolated_node_stays_singleton() {
        let mut adj = AdjacencyList::new();
        adj.insert(1, vec![2]);
        adj.insert(99, vec![]);

        let params = GaParams {
            population: 10,
            generations: 3,
            ..GaParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let result = detect(&adj, &params, &mut rng).unwrap();
        assert!(result.communities.contains(&vec![99]));
    }

    #[test]
    fn test_detect_empty_graph_is_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = detect(&AdjacencyList::new(), &GaParams::default(), &mut rng).unwrap_err();
        assert!(matches!(err, EgonetError::ProcessingError { .. }));
    }

    #[test]
    fn test_detect_is_deterministic_for_a_seed() {
        let adj = two_triangles();
        let params = GaParams {
            population: 30,
            generations: 5,
            ..GaParams::default()
        };

        let mut rng_a = StdRng::seed_from_u64(123);
        let mut rng_b = StdRng::seed_from_u64(123);

        let a = detect(&adj, &params, &mut rng_a).unwrap();
        let b = detect(&adj, &params, &mut rng_b).unwrap();

        assert_eq!(a.communities, b.communities);
        assert_eq!(a.best_score, b.best_score);
    }
}
