//! GraphQL plumbing: transport, query documents, batching, block resolution
//! and indexer health.

pub mod batcher;
pub mod blocks;
pub mod client;
pub mod health;
#[cfg(test)]
pub(crate) mod mock;
pub mod queries;

pub use batcher::{BatchFragment, QueryBatcher};
pub use blocks::BlockResolver;
pub use client::{query_as, GraphError, GraphQuery, HttpGraphClient, Subgraphs};
pub use health::fetch_indexer_status;
