use super::Extracted;
use super::agent::{Agent, AgentError, AgentOptions};
use super::jsonblock::extract_json_from_text;
use super::tooling::ToolSession;
use super::transcript::{TranscriptGap, extract_last_assistant_content};
use crate::config::AppConfig;
use crate::domain::result::QueryResult;
use crate::infrastructure::logstore::LogStore;
use crate::infrastructure::model::ModelProvider;
use serde_json::Value;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

/// Everything one query submission produced.
#[derive(Debug)]
pub struct QueryOutcome {
    pub answer: Extracted<String, TranscriptGap>,
    /// Classified render input. `None` exactly when no answer text existed.
    pub result: Option<QueryResult>,
}

/// Run one query end to end: open a scoped tool session, drive the agent,
/// extract the answer, classify the render input. The tool session is shut
/// down on every path, including agent failure.
pub async fn run_query<P: ModelProvider>(
    provider: Arc<P>,
    config: &AppConfig,
    query: String,
) -> Result<QueryOutcome, AgentError> {
    let span = info_span!("query", id = %Uuid::new_v4());
    async move {
        info!(query = %query, "executing query");

        let session = ToolSession::open(&config.tool_server).await?;

        let mut options = AgentOptions::new(config.model.clone());
        options.system_prompt = config.system_prompt.clone();
        options.max_steps = config.max_steps;
        let agent = Agent::new(provider, options);

        let run = agent.run(query, &session).await;
        session.shutdown().await;
        let conversation = run?;

        let answer = extract_last_assistant_content(&conversation);
        let result = answer
            .as_found()
            .map(|text| match extract_json_from_text(text) {
                Extracted::Found(value) => QueryResult::classify(value),
                Extracted::Missing(_) => QueryResult::from_text(text.clone()),
            });

        info!(
            messages = conversation.len(),
            answered = answer.is_found(),
            "query completed"
        );
        Ok(QueryOutcome { answer, result })
    }
    .instrument(span)
    .await
}

/// List log groups for the groups view. Failures never propagate: the
/// caller gets an empty list plus a message to show the user.
pub async fn refresh_log_groups(
    store: &dyn LogStore,
    limit: usize,
) -> (Vec<Value>, Option<String>) {
    match store.describe_log_groups(limit).await {
        Ok(groups) => (groups, None),
        Err(err) => {
            error!(%err, "failed to list log groups");
            (Vec::new(), Some(err.user_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logstore::{Identity, LogStoreError};
    use async_trait::async_trait;
    use serde_json::json;

    struct FailingStore;

    #[async_trait]
    impl LogStore for FailingStore {
        async fn caller_identity(&self) -> Result<Identity, LogStoreError> {
            Err(LogStoreError::NotConfigured)
        }

        async fn describe_log_groups(&self, _limit: usize) -> Result<Vec<Value>, LogStoreError> {
            Err(LogStoreError::NotConfigured)
        }
    }

    struct TenGroups;

    #[async_trait]
    impl LogStore for TenGroups {
        async fn caller_identity(&self) -> Result<Identity, LogStoreError> {
            Ok(Identity {
                account: "123456789012".into(),
                arn: "arn:aws:iam::123456789012:user/dev".into(),
                user_id: "AIDAEXAMPLE".into(),
            })
        }

        async fn describe_log_groups(&self, limit: usize) -> Result<Vec<Value>, LogStoreError> {
            Ok((0..limit.min(10))
                .map(|n| json!({"logGroupName": format!("group-{n}")}))
                .collect())
        }
    }

    #[tokio::test]
    async fn refresh_degrades_to_empty_list_with_message() {
        let (groups, error) = refresh_log_groups(&FailingStore, 10).await;
        assert!(groups.is_empty());
        assert!(error.is_some());
    }

    #[tokio::test]
    async fn refresh_passes_groups_through() {
        let (groups, error) = refresh_log_groups(&TenGroups, 3).await;
        assert_eq!(groups.len(), 3);
        assert!(error.is_none());
        assert_eq!(groups[0]["logGroupName"], "group-0");
    }
}
