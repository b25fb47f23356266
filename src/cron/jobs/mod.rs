pub mod poll_indexer_status;
pub mod refresh_global;
