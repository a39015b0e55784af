use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::domain::model::AdjacencyList;

/// Headline numbers for a collected graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub min_degree: usize,
    pub max_degree: usize,
    pub mean_degree: f64,
}

pub fn compute(adj: &AdjacencyList) -> GraphStats {
    let mut nodes: BTreeSet<i64> = adj.keys().copied().collect();
    let mut edges: BTreeSet<(i64, i64)> = BTreeSet::new();

    for (&from, members) in adj {
        for &to in members {
            nodes.insert(to);
            if from != to {
                edges.insert((from.min(to), from.max(to)));
            }
        }
    }

    let mut degrees: HashMap<i64, usize> = nodes.iter().map(|&id| (id, 0)).collect();
    for &(a, b) in &edges {
        *degrees.entry(a).or_insert(0) += 1;
        *degrees.entry(b).or_insert(0) += 1;
    }

    let n = nodes.len();
    let e = edges.len();
    let density = if n > 1 {
        (2 * e) as f64 / (n * (n - 1)) as f64
    } else {
        0.0
    };
    let mean_degree = if n > 0 { (2 * e) as f64 / n as f64 } else { 0.0 };

    GraphStats {
        nodes: n,
        edges: e,
        density,
        min_degree: degrees.values().copied().min().unwrap_or(0),
        max_degree: degrees.values().copied().max().unwrap_or(0),
        mean_degree,
    }
}
