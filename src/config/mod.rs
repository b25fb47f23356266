#[allow(clippy::module_inception)]
mod config;

pub use config::{DataSettings, LoggingSettings, SchedulerSettings, Settings, SubgraphSettings};
