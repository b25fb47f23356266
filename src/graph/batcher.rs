use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};
use serde_json::{json, Value};

use super::client::GraphQuery;

/// One aliased sub-query inside a batched document.
pub trait BatchFragment: Send + Sync {
    /// Deterministic alias used to match the result back to this item.
    /// Must be a valid GraphQL name (start with a letter).
    fn alias(&self) -> String;

    /// Sub-query body, without the alias.
    fn fragment(&self) -> String;
}

/// Issues many point lookups as a few aliased multi-query documents.
///
/// Subgraph endpoints cap document size and complexity, so items are split
/// into batches of `batch_size` sub-queries each. Results of all batches are
/// merged into one alias-keyed map. A failed batch is retried item by item
/// so a single bad sub-query only loses its own alias; callers must treat a
/// missing alias as "unavailable".
#[derive(Clone)]
pub struct QueryBatcher {
    client: Arc<dyn GraphQuery>,
    batch_size: usize,
}

impl QueryBatcher {
    pub const DEFAULT_BATCH_SIZE: usize = 100;

    pub fn new(client: Arc<dyn GraphQuery>, batch_size: usize) -> Self {
        Self {
            client,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Build one document containing every item as an aliased sub-query.
    pub fn document<I: BatchFragment>(items: &[I]) -> String {
        let mut document = String::from("query batched {\n");
        for item in items {
            document.push_str("  ");
            document.push_str(&item.alias());
            document.push_str(": ");
            document.push_str(&item.fragment());
            document.push('\n');
        }
        document.push('}');
        document
    }

    pub async fn run<I: BatchFragment>(&self, items: &[I]) -> BTreeMap<String, Value> {
        let mut merged = BTreeMap::new();
        let batch_count = items.len().div_ceil(self.batch_size);

        for (index, chunk) in items.chunks(self.batch_size).enumerate() {
            match self.client.query(&Self::document(chunk), json!({})).await {
                Ok(Value::Object(results)) => {
                    debug!(
                        "Batch {}/{} returned {} results",
                        index + 1,
                        batch_count,
                        results.len()
                    );
                    merged.extend(results);
                },
                Ok(other) => {
                    warn!(
                        "Batch {}/{} returned a non-object payload, retrying items individually: {}",
                        index + 1,
                        batch_count,
                        other
                    );
                    merged.extend(self.run_each(chunk).await);
                },
                Err(e) => {
                    warn!(
                        "Batch {}/{} ({} items) failed, retrying items individually: {}",
                        index + 1,
                        batch_count,
                        chunk.len(),
                        e
                    );
                    merged.extend(self.run_each(chunk).await);
                },
            }
        }

        merged
    }

    async fn run_each<I: BatchFragment>(&self, chunk: &[I]) -> Vec<(String, Value)> {
        join_all(chunk.iter().map(|item| self.run_single(item)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn run_single<I: BatchFragment>(&self, item: &I) -> Option<(String, Value)> {
        let alias = item.alias();
        let document = Self::document(std::slice::from_ref(item));

        match self.client.query(&document, json!({})).await {
            Ok(mut data) => {
                let value = data.get_mut(&alias).map(Value::take)?;
                Some((alias, value))
            },
            Err(e) => {
                warn!("Sub-query {} failed: {}", alias, e);
                None
            },
        }
    }
}
