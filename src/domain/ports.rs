use crate::domain::model::{EgoSnapshot, GraphArtifacts, UserProfile};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn api_version(&self) -> &str;
    fn seed_user(&self) -> &str;
    fn output_path(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    fn requests_per_second(&self) -> u32;
}

/// Where friend data comes from. Implemented by the VK client; tests swap
/// in fixtures.
#[async_trait]
pub trait FriendSource: Send + Sync {
    /// Resolve a numeric id or screen name to a profile.
    async fn resolve_user(&self, query: &str) -> Result<UserProfile>;
    /// Friend ids of the given user.
    async fn friend_ids(&self, user_id: i64) -> Result<Vec<i64>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<EgoSnapshot>;
    async fn transform(&self, snapshot: EgoSnapshot) -> Result<GraphArtifacts>;
    async fn load(&self, artifacts: GraphArtifacts) -> Result<String>;
}
