use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::domain::model::{AdjacencyList, EgoSnapshot, GraphArtifacts};
use crate::domain::ports::{ConfigProvider, FriendSource, Pipeline, Storage};
use crate::graph::{gexf, metrics};
use crate::utils::error::{EgonetError, Result};

pub const FILENAME_ADJACENCY: &str = "friends.json";
pub const FILENAME_NODES: &str = "friends.csv";
pub const FILENAME_GEXF: &str = "graph.gexf";

/// Collects one ego-graph: the seed user, their friends, and the mutual
/// friendships between those friends.
pub struct EgoPipeline<S: Storage, C: ConfigProvider, F: FriendSource> {
    storage: S,
    config: C,
    source: F,
}

impl<S: Storage, C: ConfigProvider, F: FriendSource> EgoPipeline<S, C, F> {
    pub fn new(storage: S, config: C, source: F) -> Self {
        Self {
            storage,
            config,
            source,
        }
    }
}

#[async_trait]
impl<S: Storage, C: ConfigProvider, F: FriendSource> Pipeline for EgoPipeline<S, C, F> {
    async fn extract(&self) -> Result<EgoSnapshot> {
        let ego = self.source.resolve_user(self.config.seed_user()).await?;
        let mut friends = self.source.friend_ids(ego.id).await?;

        let mut seen = HashSet::new();
        friends.retain(|id| seen.insert(*id));
        let total = friends.len();

        tracing::info!(ego = ego.id, total_friends = total, "resolved seed user");

        let friend_set: HashSet<i64> = friends.iter().copied().collect();

        // Expand every friend with bounded concurrency; the source's
        // throttle keeps the request rate legal.
        let fetches: Vec<_> = stream::iter(friends.iter().copied().enumerate())
            .map(|(i, friend_id)| {
                let source = &self.source;
                async move {
                    tracing::debug!(progress = i + 1, total, friend = friend_id, "expanding friend");
                    let profile = source.resolve_user(&friend_id.to_string()).await;
                    let list = source.friend_ids(friend_id).await;
                    (friend_id, profile, list)
                }
            })
            .buffer_unordered(self.config.concurrent_requests().max(1))
            .collect()
            .await;

        let mut adjacency = AdjacencyList::new();
        let mut labels = BTreeMap::new();
        adjacency.insert(ego.id, friends.clone());
        labels.insert(ego.id, ego.name());

        let mut hits = 0;
        let mut dead_users = 0;

        for (friend_id, profile, list) in fetches {
            match profile {
                Ok(p) => {
                    labels.insert(friend_id, p.name());
                }
                Err(EgonetError::VkApiError { .. }) => {
                    labels.insert(friend_id, friend_id.to_string());
                }
                Err(e) => return Err(e),
            }

            match list {
                Ok(ids) => {
                    let mut mutual: Vec<i64> = ids
                        .into_iter()
                        .filter(|id| friend_set.contains(id) && *id != friend_id)
                        .collect();
                    mutual.sort_unstable();
                    mutual.dedup();
                    adjacency.insert(friend_id, mutual);
                    hits += 1;
                }
                Err(e @ EgonetError::VkApiError { .. }) => {
                    if e.is_unreachable_user() {
                        tracing::debug!(friend = friend_id, "friend profile unreachable");
                    } else {
                        tracing::warn!(friend = friend_id, error = %e, "skipping friend after API error");
                    }
                    dead_users += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(hits, dead_users, nodes = adjacency.len(), "extraction finished");

        Ok(EgoSnapshot {
            ego,
            adjacency,
            labels,
            hits,
            dead_users,
        })
    }

    async fn transform(&self, snapshot: EgoSnapshot) -> Result<GraphArtifacts> {
        let adjacency_json = serde_json::to_string_pretty(&snapshot.adjacency)?;

        let nodes_csv = {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(["ID", "Name"])?;
            for (id, name) in &snapshot.labels {
                writer.write_record([id.to_string(), name.clone()])?;
            }
            writer
                .into_inner()
                .map_err(|e| EgonetError::ProcessingError {
                    message: format!("failed to flush node table: {}", e),
                })?
        };

        let gexf = gexf::render(&snapshot.adjacency, &snapshot.labels);
        let stats = metrics::compute(&snapshot.adjacency);

        tracing::info!(
            nodes = stats.nodes,
            edges = stats.edges,
            density = stats.density,
            "graph assembled"
        );

        Ok(GraphArtifacts {
            adjacency_json,
            nodes_csv,
            gexf,
            stats,
        })
    }

    async fn load(&self, artifacts: GraphArtifacts) -> Result<String> {
        self.storage
            .write_file(FILENAME_ADJACENCY, artifacts.adjacency_json.as_bytes())
            .await?;
        self.storage
            .write_file(FILENAME_NODES, &artifacts.nodes_csv)
            .await?;
        self.storage
            .write_file(FILENAME_GEXF, artifacts.gexf.as_bytes())
            .await?;

        tracing::debug!(
            "wrote {}, {} and {}",
            FILENAME_ADJACENCY,
            FILENAME_NODES,
            FILENAME_GEXF
        );
        Ok(self.config.output_path().to_string())
    }
}
