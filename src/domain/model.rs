use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::metrics::GraphStats;

/// Adjacency list keyed by VK user id. Edges may be recorded on either
/// endpoint; consumers symmetrize. BTreeMap keeps output deterministic.
pub type AdjacencyList = BTreeMap<i64, Vec<i64>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl UserProfile {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Raw extraction result: the ego, the mutual-friend adjacency around them,
/// and display labels for every node.
#[derive(Debug, Clone)]
pub struct EgoSnapshot {
    pub ego: UserProfile,
    pub adjacency: AdjacencyList,
    pub labels: BTreeMap<i64, String>,
    /// Friends whose friend list was fetched successfully.
    pub hits: usize,
    /// Friends whose profile is deleted, banned or private.
    pub dead_users: usize,
}

/// Everything the load phase writes out.
#[derive(Debug, Clone)]
pub struct GraphArtifacts {
    pub adjacency_json: String,
    pub nodes_csv: Vec<u8>,
    pub gexf: String,
    pub stats: GraphStats,
}
