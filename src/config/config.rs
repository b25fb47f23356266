use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Remote GraphQL endpoints.
///
/// The exchange subgraph serves pairs, tokens, transactions and daily snapshots.
/// The blocks subgraph maps timestamps to block numbers, and the health endpoint
/// reports indexing status for `subgraph_name`.
#[derive(Debug, Deserialize, Clone)]
pub struct SubgraphSettings {
    pub exchange_url: String,
    pub blocks_url: String,
    pub health_url: String,
    pub subgraph_name: String,
    #[serde(default = "default_factory_address")]
    pub factory_address: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_factory_address() -> String {
    "0x5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Tuning for the data assemblers.
#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    /// Number of aliased sub-queries per batched document
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Width of the window searched for the first block after a timestamp
    #[serde(default = "default_block_window_secs")]
    pub block_window_secs: i64,
    /// How many of the deepest pairs are scanned for top liquidity providers
    #[serde(default = "default_top_lp_pairs")]
    pub top_lp_pairs: usize,
    /// Maximum number of liquidity positions kept after sorting
    #[serde(default = "default_top_lp_limit")]
    pub top_lp_limit: usize,
    /// Pairs never scanned for liquidity providers
    #[serde(default)]
    pub excluded_lp_pairs: Vec<String>,
    /// Oldest date requested for the global chart
    #[serde(default = "default_chart_start_timestamp")]
    pub chart_start_timestamp: i64,
    /// Pairs kept warm by the refresh job
    #[serde(default)]
    pub tracked_pairs: Vec<String>,
}

fn default_batch_size() -> usize {
    100
}

fn default_block_window_secs() -> i64 {
    600
}

fn default_top_lp_pairs() -> usize {
    99
}

fn default_top_lp_limit() -> usize {
    100
}

fn default_chart_start_timestamp() -> i64 {
    1_588_636_800 // 2020-05-05
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            block_window_secs: default_block_window_secs(),
            top_lp_pairs: default_top_lp_pairs(),
            top_lp_limit: default_top_lp_limit(),
            excluded_lp_pairs: Vec::new(),
            chart_start_timestamp: default_chart_start_timestamp(),
            tracked_pairs: Vec::new(),
        }
    }
}

/// Intervals for the background refresh jobs.
#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerSettings {
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Indexer lag (in blocks) above which a warning is logged
    #[serde(default = "default_lag_warning_blocks")]
    pub lag_warning_blocks: u64,
}

fn default_health_interval_secs() -> u64 {
    60
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_lag_warning_blocks() -> u64 {
    30
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            health_interval_secs: default_health_interval_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            lag_warning_blocks: default_lag_warning_blocks(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup, with `VANTAGE__SECTION__KEY`
/// environment variables taking precedence (e.g. `VANTAGE__SUBGRAPH__EXCHANGE_URL`).
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub subgraph: SubgraphSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(Environment::with_prefix("VANTAGE").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
