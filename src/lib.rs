pub mod cache;
pub mod config;
pub mod cron;
pub mod data;
pub mod graph;
pub mod models;
pub mod utils;

pub use cache::{GlobalCache, PairCache};
pub use config::Settings;
pub use cron::CronScheduler;
pub use data::{GlobalAssembler, PairAssembler};
pub use graph::{BlockResolver, GraphQuery, HttpGraphClient, QueryBatcher, Subgraphs};
