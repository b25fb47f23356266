use std::sync::Arc;
use std::time::Duration;

use log::warn;
use moka::future::Cache;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use serde_json::json;

use super::{
    batcher::{BatchFragment, QueryBatcher},
    client::{query_as, GraphQuery},
    queries,
};
use crate::models::Block;

#[derive(Deserialize)]
struct BlocksResult {
    blocks: Vec<Block>,
}

/// Lookup of the first block inside `(timestamp, timestamp + window)`.
struct BlockWindow {
    timestamp: i64,
    window: i64,
}

impl BatchFragment for BlockWindow {
    fn alias(&self) -> String {
        format!("t{}", self.timestamp)
    }

    fn fragment(&self) -> String {
        queries::block_in_window(self.timestamp, self.timestamp + self.window)
    }
}

/// Resolves UTC timestamps to block numbers through the blocks subgraph.
///
/// A timestamp with no block yet (too recent, or the index is lagging)
/// resolves to `None`. Resolved blocks never change, so they are memoized;
/// unresolved timestamps are not, and are retried on the next call.
#[derive(Clone)]
pub struct BlockResolver {
    client: Arc<dyn GraphQuery>,
    batcher: QueryBatcher,
    window: i64,
    known: Cache<i64, Block>,
}

impl BlockResolver {
    pub const DEFAULT_WINDOW_SECS: i64 = 600;

    pub fn new(client: Arc<dyn GraphQuery>, batch_size: usize, window: i64) -> Self {
        let known = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(24 * 3600))
            .build();

        Self {
            batcher: QueryBatcher::new(client.clone(), batch_size),
            client,
            window: window.max(1),
            known,
        }
    }

    pub async fn block_from_timestamp(&self, timestamp: i64) -> Option<Block> {
        if let Some(block) = self.known.get(&timestamp).await {
            return Some(block);
        }

        let result: Result<BlocksResult, _> = query_as(
            self.client.as_ref(),
            queries::BLOCK_AFTER,
            json!({
                "timestampFrom": timestamp,
                "timestampTo": timestamp + self.window,
            }),
        )
        .await;

        match result {
            Ok(found) => {
                let block = found.blocks.into_iter().next()?;
                self.known.insert(timestamp, block).await;
                Some(block)
            },
            Err(e) => {
                warn!("Failed to resolve block for timestamp {}: {}", timestamp, e);
                None
            },
        }
    }

    /// Resolve many timestamps at once, preserving input order.
    pub async fn blocks_from_timestamps(&self, timestamps: &[i64]) -> Vec<Option<Block>> {
        let mut resolved: FxHashMap<i64, Block> = FxHashMap::default();
        let mut missing: Vec<BlockWindow> = Vec::new();
        let mut seen: FxHashSet<i64> = FxHashSet::default();

        for &timestamp in timestamps {
            if !seen.insert(timestamp) {
                continue;
            }
            match self.known.get(&timestamp).await {
                Some(block) => {
                    resolved.insert(timestamp, block);
                },
                None => missing.push(BlockWindow {
                    timestamp,
                    window: self.window,
                }),
            }
        }

        if !missing.is_empty() {
            let results = self.batcher.run(&missing).await;

            for lookup in &missing {
                let Some(value) = results.get(&lookup.alias()) else {
                    continue;
                };
                match serde_json::from_value::<Vec<Block>>(value.clone()) {
                    Ok(blocks) => {
                        if let Some(block) = blocks.into_iter().next() {
                            self.known.insert(lookup.timestamp, block).await;
                            resolved.insert(lookup.timestamp, block);
                        }
                    },
                    Err(e) => warn!(
                        "Malformed block result for timestamp {}: {}",
                        lookup.timestamp, e
                    ),
                }
            }
        }

        timestamps
            .iter()
            .map(|timestamp| resolved.get(timestamp).copied())
            .collect()
    }
}
