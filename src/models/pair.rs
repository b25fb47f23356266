use serde::{Deserialize, Serialize};

use crate::utils::{de_f64, de_i64, de_u64};

/// Token as embedded in a pair snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenInfo {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "totalLiquidity", deserialize_with = "de_f64")]
    pub total_liquidity: f64,
    #[serde(rename = "derivedETH", deserialize_with = "de_f64")]
    pub derived_eth: f64,
}

/// Point-in-time state of a trading pair as reported by the subgraph.
///
/// Volumes are cumulative since pair creation; the assembler derives
/// windowed values by subtracting historical snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairSnapshot {
    pub id: String,
    #[serde(rename = "txCount", deserialize_with = "de_u64")]
    pub tx_count: u64,
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    #[serde(deserialize_with = "de_f64")]
    pub reserve0: f64,
    #[serde(deserialize_with = "de_f64")]
    pub reserve1: f64,
    #[serde(rename = "reserveUSD", deserialize_with = "de_f64")]
    pub reserve_usd: f64,
    #[serde(rename = "totalSupply", deserialize_with = "de_f64")]
    pub total_supply: f64,
    #[serde(rename = "trackedReserveETH", deserialize_with = "de_f64")]
    pub tracked_reserve_eth: f64,
    #[serde(rename = "reserveETH", deserialize_with = "de_f64")]
    pub reserve_eth: f64,
    #[serde(rename = "volumeUSD", deserialize_with = "de_f64")]
    pub volume_usd: f64,
    #[serde(rename = "untrackedVolumeUSD", deserialize_with = "de_f64")]
    pub untracked_volume_usd: f64,
    #[serde(rename = "token0Price", deserialize_with = "de_f64")]
    pub token0_price: f64,
    #[serde(rename = "token1Price", deserialize_with = "de_f64")]
    pub token1_price: f64,
    #[serde(rename = "createdAtTimestamp", deserialize_with = "de_i64")]
    pub created_at_timestamp: i64,
    #[serde(rename = "createdAtBlockNumber", deserialize_with = "de_u64")]
    pub created_at_block_number: u64,
}

/// Pair snapshot enriched with windowed volumes and percent changes.
///
/// Percent changes are `None` when the baseline period had no positive value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairData {
    #[serde(flatten)]
    pub snapshot: PairSnapshot,
    #[serde(rename = "oneDayVolumeUSD")]
    pub one_day_volume_usd: f64,
    #[serde(rename = "oneDayVolumeUntracked")]
    pub one_day_volume_untracked: f64,
    #[serde(rename = "volumeChangeUSD")]
    pub volume_change_usd: Option<f64>,
    #[serde(rename = "volumeChangeUntracked")]
    pub volume_change_untracked: Option<f64>,
    #[serde(rename = "oneWeekVolumeUSD")]
    pub one_week_volume_usd: f64,
    #[serde(rename = "oneWeekVolumeUntracked")]
    pub one_week_volume_untracked: f64,
    #[serde(rename = "liquidityChangeUSD")]
    pub liquidity_change_usd: Option<f64>,
    #[serde(rename = "trackedReserveUSD")]
    pub tracked_reserve_usd: f64,
}

impl PairData {
    pub fn id(&self) -> &str {
        &self.snapshot.id
    }

    /// "TOKEN0-TOKEN1"
    pub fn name(&self) -> String {
        format!(
            "{}-{}",
            self.snapshot.token0.symbol, self.snapshot.token1.symbol
        )
    }
}
