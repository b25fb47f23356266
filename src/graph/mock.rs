//! In-memory GraphQL endpoint for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::client::{GraphError, GraphQuery};

type Handler = Box<dyn Fn(&str, &Value) -> Result<Value, GraphError> + Send + Sync>;

/// Routes each document to the first handler whose needle it contains.
pub(crate) struct MockGraph {
    routes: Vec<(String, Handler)>,
    calls: Mutex<Vec<(String, Value)>>,
    yields: bool,
}

impl MockGraph {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            calls: Mutex::new(Vec::new()),
            yields: false,
        }
    }

    /// Yield to the runtime once per query, so concurrent callers interleave.
    pub fn yielding(mut self) -> Self {
        self.yields = true;
        self
    }

    pub fn on(self, needle: &str, response: Value) -> Self {
        self.on_fn(needle, move |_, _| Ok(response.clone()))
    }

    pub fn fail_on(self, needle: &str) -> Self {
        let message = format!("mock failure for {needle}");
        self.on_fn(needle, move |_, _| Err(GraphError::Query(message.clone())))
    }

    pub fn on_fn<F>(mut self, needle: &str, handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, GraphError> + Send + Sync + 'static,
    {
        self.routes.push((needle.to_string(), Box::new(handler)));
        self
    }

    /// Number of documents received that contain `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(document, _)| document.contains(needle))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl GraphQuery for MockGraph {
    async fn query(&self, document: &str, variables: Value) -> Result<Value, GraphError> {
        self.calls
            .lock()
            .push((document.to_string(), variables.clone()));

        if self.yields {
            tokio::task::yield_now().await;
        }

        for (needle, handler) in &self.routes {
            if document.contains(needle.as_str()) {
                return handler(document, &variables);
            }
        }

        Err(GraphError::Query(format!(
            "no mock route for document: {}",
            document.trim()
        )))
    }
}

/// Parse the `t<timestamp>` aliases out of a batched block document.
pub(crate) fn block_aliases(document: &str) -> Vec<i64> {
    document
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (alias, _) = line.split_once(':')?;
            alias.strip_prefix('t')?.parse().ok()
        })
        .collect()
}
