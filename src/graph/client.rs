use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::SubgraphSettings;

/// Transport-level failures of a GraphQL request.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error("graphql errors: {0}")]
    Query(String),
    #[error("response has no data")]
    MissingData,
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A queryable GraphQL endpoint.
///
/// Returns the `data` object of the response. Implemented over HTTP for the
/// real subgraphs and in memory for tests.
#[async_trait]
pub trait GraphQuery: Send + Sync {
    async fn query(&self, document: &str, variables: Value) -> Result<Value, GraphError>;
}

/// Run a query and decode its `data` into a typed result.
pub async fn query_as<T: DeserializeOwned>(
    client: &dyn GraphQuery,
    document: &str,
    variables: Value,
) -> Result<T, GraphError> {
    let data = client.query(document, variables).await?;
    Ok(serde_json::from_value(data)?)
}

#[derive(Serialize)]
struct GraphRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphErrorMessage>,
}

#[derive(Deserialize)]
struct GraphErrorMessage {
    message: String,
}

/// GraphQL client over HTTP POST.
#[derive(Clone)]
pub struct HttpGraphClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpGraphClient {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid GraphQL endpoint: {endpoint}"))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl GraphQuery for HttpGraphClient {
    async fn query(&self, document: &str, variables: Value) -> Result<Value, GraphError> {
        debug!("POST {} ({} bytes)", self.endpoint, document.len());

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&GraphRequest {
                query: document,
                variables,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GraphError::Status(status.as_u16()));
        }

        let body: GraphResponse = response.json().await?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(GraphError::Query(messages.join("; ")));
        }

        match body.data {
            Some(Value::Null) | None => Err(GraphError::MissingData),
            Some(data) => Ok(data),
        }
    }
}

/// The three remote services the data layer talks to.
#[derive(Clone)]
pub struct Subgraphs {
    /// Pairs, tokens, transactions and daily snapshots
    pub exchange: Arc<dyn GraphQuery>,
    /// Timestamp to block number index
    pub blocks: Arc<dyn GraphQuery>,
    /// Indexing status
    pub health: Arc<dyn GraphQuery>,
}

impl Subgraphs {
    pub fn from_settings(settings: &SubgraphSettings) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);

        Ok(Self {
            exchange: Arc::new(HttpGraphClient::new(&settings.exchange_url, timeout)?),
            blocks: Arc::new(HttpGraphClient::new(&settings.blocks_url, timeout)?),
            health: Arc::new(HttpGraphClient::new(&settings.health_url, timeout)?),
        })
    }
}
