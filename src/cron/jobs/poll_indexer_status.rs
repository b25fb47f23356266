//! Job to poll the indexing status of the exchange subgraph.
//!
//! Stores the latest status in the global cache and warns when the indexer
//! falls behind the chain head.

use anyhow::{anyhow, Result};
use log::{info, warn};

use crate::{
    cache::GlobalCache,
    graph::{fetch_indexer_status, GraphQuery},
};

/// Fetches the indexer status and records it.
///
/// Returns the lag in blocks when both the chain head and the latest indexed
/// block are known.
pub async fn run(
    health: &dyn GraphQuery,
    subgraph_name: &str,
    cache: &GlobalCache,
    lag_warning_blocks: u64,
) -> Result<Option<u64>> {
    let status = fetch_indexer_status(health, subgraph_name)
        .await?
        .ok_or_else(|| anyhow!("Subgraph {} is unknown to the health endpoint", subgraph_name))?;

    let lag = status.lag();

    if !status.is_healthy() {
        warn!("Subgraph {} reports health {}", subgraph_name, status.health);
    }

    match lag {
        Some(lag) if lag > lag_warning_blocks => {
            warn!(
                "Subgraph {} is {} blocks behind the chain head",
                subgraph_name, lag
            );
        },
        Some(lag) => info!("Subgraph {} synced={} lag={}", subgraph_name, status.synced, lag),
        None => info!("Subgraph {} synced={} lag=unknown", subgraph_name, status.synced),
    }

    cache.set_indexer_status(status);

    Ok(lag)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        config::DataSettings,
        data::{pairs::tests::blocks_graph, GlobalAssembler},
        graph::{mock::MockGraph, BlockResolver},
    };

    fn cache() -> GlobalCache {
        GlobalCache::new(GlobalAssembler::new(
            Arc::new(MockGraph::new()),
            BlockResolver::new(blocks_graph(), 100, 600),
            "0xfactory",
            DataSettings::default(),
        ))
    }

    #[tokio::test]
    async fn test_records_status_and_lag() {
        let health = MockGraph::new().on(
            "query indexingStatus",
            json!({ "indexingStatusForCurrentVersion": {
                "synced": false,
                "health": "healthy",
                "chains": [{
                    "chainHeadBlock": { "number": "1050" },
                    "latestBlock": { "number": "1000" }
                }]
            }}),
        );
        let cache = cache();

        let lag = run(&health, "uniswap/uniswap-v2", &cache, 30).await.unwrap();

        assert_eq!(lag, Some(50));
        assert_eq!(cache.indexer_status().map(|s| s.synced), Some(false));
    }

    #[tokio::test]
    async fn test_unknown_subgraph_is_an_error() {
        let health = MockGraph::new().on(
            "query indexingStatus",
            json!({ "indexingStatusForCurrentVersion": null }),
        );
        let cache = cache();

        assert!(run(&health, "missing", &cache, 30).await.is_err());
        assert!(cache.indexer_status().is_none());
    }
}
