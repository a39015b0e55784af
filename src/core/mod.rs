pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{AdjacencyList, EgoSnapshot, GraphArtifacts, UserProfile};
pub use crate::domain::ports::{ConfigProvider, FriendSource, Pipeline, Storage};
pub use crate::utils::error::Result;
