use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// Who the configured credentials resolve to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub account: String,
    pub arn: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("log store endpoint is not configured")]
    NotConfigured,
}

impl LogStoreError {
    pub fn user_message(&self) -> String {
        match self {
            LogStoreError::Network(err) => {
                if err.is_connect() {
                    "Could not reach the log store gateway. Check the endpoint and your network."
                        .to_string()
                } else if let Some(status) = err.status() {
                    format!("The log store request failed with status {}.", status.as_u16())
                } else {
                    "A network error occurred while contacting the log store.".to_string()
                }
            }
            LogStoreError::NotConfigured => {
                "No log store endpoint is configured. Set `endpoint` in the config file or pass --endpoint."
                    .to_string()
            }
        }
    }
}

#[async_trait]
pub trait LogStore: Send + Sync {
    /// Resolve the caller's identity. Used as the bootstrap credential check.
    async fn caller_identity(&self) -> Result<Identity, LogStoreError>;

    /// List up to `limit` log groups, as raw backend records.
    async fn describe_log_groups(&self, limit: usize) -> Result<Vec<Value>, LogStoreError>;
}

/// HTTP client for a log-store gateway. Region and profile are plain
/// configuration values sent with every request; nothing is read from or
/// written to the process environment.
pub struct HttpLogStore {
    http: Client,
    endpoint: String,
    region: String,
    profile: String,
}

impl HttpLogStore {
    pub fn new(
        endpoint: impl Into<String>,
        region: impl Into<String>,
        profile: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            region: region.into(),
            profile: profile.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let trimmed = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{trimmed}/{path}")
    }
}

#[derive(Debug, Serialize)]
struct StoreRequest<'a> {
    region: &'a str,
    profile: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct DescribeLogGroupsResponse {
    #[serde(rename = "logGroups", default)]
    log_groups: Vec<Value>,
}

#[async_trait]
impl LogStore for HttpLogStore {
    async fn caller_identity(&self) -> Result<Identity, LogStoreError> {
        info!(region = %self.region, profile = %self.profile, "verifying log store identity");
        let identity: Identity = self
            .http
            .post(self.url("/identity"))
            .json(&StoreRequest {
                region: &self.region,
                profile: &self.profile,
                limit: None,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(account = %identity.account, "log store identity verified");
        Ok(identity)
    }

    async fn describe_log_groups(&self, limit: usize) -> Result<Vec<Value>, LogStoreError> {
        debug!(limit, "listing log groups");
        let response: DescribeLogGroupsResponse = self
            .http
            .post(self.url("/log-groups"))
            .json(&StoreRequest {
                region: &self.region,
                profile: &self.profile,
                limit: Some(limit),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(count = response.log_groups.len(), "listed log groups");
        Ok(response.log_groups)
    }
}
