pub mod adjacency;
pub mod gexf;
pub mod metrics;

pub use adjacency::{adjacency_from_json, AdjMatrix, NodeIndex};
pub use metrics::GraphStats;
