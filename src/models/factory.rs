use serde::{Deserialize, Serialize};

use crate::utils::{de_f64, de_u64};

/// Exchange-wide aggregate maintained by the factory entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorySnapshot {
    pub id: String,
    #[serde(rename = "totalVolumeUSD", deserialize_with = "de_f64")]
    pub total_volume_usd: f64,
    #[serde(rename = "totalVolumeETH", deserialize_with = "de_f64")]
    pub total_volume_eth: f64,
    #[serde(rename = "untrackedVolumeUSD", deserialize_with = "de_f64")]
    pub untracked_volume_usd: f64,
    #[serde(rename = "totalLiquidityUSD", deserialize_with = "de_f64")]
    pub total_liquidity_usd: f64,
    #[serde(rename = "totalLiquidityETH", deserialize_with = "de_f64")]
    pub total_liquidity_eth: f64,
    #[serde(rename = "txCount", deserialize_with = "de_u64")]
    pub tx_count: u64,
    #[serde(rename = "pairCount", deserialize_with = "de_u64")]
    pub pair_count: u64,
}

/// Factory snapshot with one-day and one-week derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalData {
    #[serde(flatten)]
    pub snapshot: FactorySnapshot,
    #[serde(rename = "oneDayVolumeUSD")]
    pub one_day_volume_usd: f64,
    #[serde(rename = "volumeChangeUSD")]
    pub volume_change_usd: Option<f64>,
    #[serde(rename = "oneWeekVolume")]
    pub one_week_volume: f64,
    #[serde(rename = "weeklyVolumeChange")]
    pub weekly_volume_change: Option<f64>,
    #[serde(rename = "oneDayTxns")]
    pub one_day_txns: f64,
    #[serde(rename = "txnChange")]
    pub txn_change: Option<f64>,
    /// Liquidity re-priced with the current ETH price
    #[serde(rename = "liquidityUSD")]
    pub liquidity_usd: f64,
    #[serde(rename = "liquidityChangeUSD")]
    pub liquidity_change_usd: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Bundle {
    pub id: String,
    #[serde(rename = "ethPrice", deserialize_with = "de_f64")]
    pub eth_price: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EthPrice {
    pub current: f64,
    pub one_day_ago: f64,
    pub change: Option<f64>,
}
