use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::model::UserProfile;
use crate::domain::ports::FriendSource;
use crate::utils::error::{EgonetError, Result};
use crate::vk::throttle::RequestThrottle;

pub const DEFAULT_API_BASE: &str = "https://api.vk.com";
pub const DEFAULT_API_VERSION: &str = "5.131";

/// Retries for VK error 6 (too many requests) before giving up.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Token-authenticated VK API client. Cheap to clone; the throttle is
/// shared so concurrent workers stay inside one request budget.
#[derive(Clone)]
pub struct VkClient {
    http: Client,
    api_base: String,
    token: String,
    version: String,
    throttle: Arc<RequestThrottle>,
}

#[derive(Debug, Deserialize)]
struct FriendsResponse {
    count: Option<u64>,
    items: Vec<i64>,
}

impl VkClient {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        version: impl Into<String>,
        requests_per_second: u32,
    ) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into(),
            token: token.into(),
            version: version.into(),
            throttle: Arc::new(RequestThrottle::per_second(requests_per_second)),
        }
    }

    /// One VK method call. Unwraps the `{"response": ...}` envelope and maps
    /// the `{"error": ...}` envelope to a typed error, retrying rate limits.
    async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<serde_json::Value> {
        let url = format!(
            "{}/method/{}",
            self.api_base.trim_end_matches('/'),
            method
        );

        let mut attempt: u32 = 0;
        loop {
            self.throttle.acquire().await;

            let response = self
                .http
                .get(&url)
                .query(params)
                .query(&[
                    ("access_token", self.token.as_str()),
                    ("v", self.version.as_str()),
                ])
                .send()
                .await?;

            tracing::trace!(method, status = %response.status(), "VK API response");
            let body: serde_json::Value = response.json().await?;

            if let Some(err) = body.get("error") {
                let code = err.get("error_code").and_then(|v| v.as_i64()).unwrap_or(-1);
                let message = err
                    .get("error_msg")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown error")
                    .to_string();

                if code == 6 && attempt < MAX_RATE_LIMIT_RETRIES {
                    attempt += 1;
                    let delay = Duration::from_millis(400 * u64::from(attempt));
                    tracing::warn!(method, attempt, ?delay, "VK rate limit hit, backing off");
                    tokio::time::sleep(delay).await;
                    continue;
                }

                return Err(EgonetError::vk(code, message));
            }

            return body.get("response").cloned().ok_or_else(|| {
                EgonetError::ProcessingError {
                    message: format!("VK response for {} had no payload", method),
                }
            });
        }
    }
}

#[async_trait]
impl FriendSource for VkClient {
    async fn resolve_user(&self, query: &str) -> Result<UserProfile> {
        let response = self
            .call("users.get", &[("user_ids", query.to_string())])
            .await?;
        let mut users: Vec<UserProfile> = serde_json::from_value(response)?;

        if users.is_empty() {
            return Err(EgonetError::ProcessingError {
                message: format!("no VK user matches '{}'", query),
            });
        }
        Ok(users.remove(0))
    }

    async fn friend_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let response = self
            .call("friends.get", &[("user_id", user_id.to_string())])
            .await?;
        let friends: FriendsResponse = serde_json::from_value(response)?;

        tracing::debug!(
            user_id,
            count = friends.count.unwrap_or(friends.items.len() as u64),
            "fetched friend list"
        );
        Ok(friends.items)
    }
}
