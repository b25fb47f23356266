use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{client::query_as, queries, GraphQuery};
use crate::utils::de_u64;

#[derive(Deserialize)]
struct IndexingStatusResult {
    #[serde(rename = "indexingStatusForCurrentVersion")]
    status: Option<RawStatus>,
}

#[derive(Deserialize)]
struct RawStatus {
    synced: bool,
    health: String,
    #[serde(default)]
    chains: Vec<RawChain>,
}

#[derive(Deserialize)]
struct RawChain {
    #[serde(rename = "chainHeadBlock")]
    chain_head_block: Option<BlockNumber>,
    #[serde(rename = "latestBlock")]
    latest_block: Option<BlockNumber>,
}

#[derive(Deserialize)]
struct BlockNumber {
    #[serde(deserialize_with = "de_u64")]
    number: u64,
}

/// Sync status of the exchange subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexerStatus {
    pub synced: bool,
    pub health: String,
    pub chain_head_block: Option<u64>,
    pub latest_block: Option<u64>,
}

impl IndexerStatus {
    /// Blocks the indexer is behind the chain head, if both are known.
    pub fn lag(&self) -> Option<u64> {
        Some(self.chain_head_block?.saturating_sub(self.latest_block?))
    }

    pub fn is_healthy(&self) -> bool {
        self.health == "healthy"
    }
}

/// Fetch the indexing status of `subgraph_name`.
///
/// Returns `Ok(None)` when the health endpoint does not know the subgraph.
pub async fn fetch_indexer_status(
    client: &dyn GraphQuery,
    subgraph_name: &str,
) -> Result<Option<IndexerStatus>> {
    let result: IndexingStatusResult = query_as(
        client,
        queries::INDEXING_STATUS,
        json!({ "subgraphName": subgraph_name }),
    )
    .await
    .with_context(|| format!("Failed to fetch indexing status for {subgraph_name}"))?;

    Ok(result.status.map(|status| {
        let chain = status.chains.into_iter().next();
        IndexerStatus {
            synced: status.synced,
            health: status.health,
            chain_head_block: chain
                .as_ref()
                .and_then(|c| c.chain_head_block.as_ref())
                .map(|b| b.number),
            latest_block: chain
                .as_ref()
                .and_then(|c| c.latest_block.as_ref())
                .map(|b| b.number),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::mock::MockGraph;

    #[tokio::test]
    async fn test_parses_status_and_lag() {
        let graph = MockGraph::new().on(
            "indexingStatusForCurrentVersion",
            json!({
                "indexingStatusForCurrentVersion": {
                    "synced": true,
                    "health": "healthy",
                    "chains": [{
                        "chainHeadBlock": { "number": "18000050" },
                        "latestBlock": { "number": "18000000" }
                    }]
                }
            }),
        );

        let status = fetch_indexer_status(&graph, "exchange")
            .await
            .unwrap()
            .unwrap();

        assert!(status.synced);
        assert!(status.is_healthy());
        assert_eq!(status.lag(), Some(50));
    }

    #[tokio::test]
    async fn test_unknown_subgraph() {
        let graph = MockGraph::new().on(
            "indexingStatusForCurrentVersion",
            json!({ "indexingStatusForCurrentVersion": null }),
        );

        assert_eq!(fetch_indexer_status(&graph, "missing").await.unwrap(), None);
    }

    #[test]
    fn test_lag_saturates() {
        let status = IndexerStatus {
            synced: true,
            health: "healthy".into(),
            chain_head_block: Some(10),
            latest_block: Some(12),
        };
        assert_eq!(status.lag(), Some(0));
    }
}
