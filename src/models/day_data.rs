use serde::{Deserialize, Serialize};

use crate::{
    data::series::SeriesPoint,
    utils::{de_f64, de_i64, ONE_DAY},
};

/// Exchange-wide daily snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalDayData {
    pub id: String,
    #[serde(deserialize_with = "de_i64")]
    pub date: i64,
    #[serde(rename = "totalVolumeUSD", deserialize_with = "de_f64")]
    pub total_volume_usd: f64,
    #[serde(rename = "dailyVolumeUSD", deserialize_with = "de_f64")]
    pub daily_volume_usd: f64,
    #[serde(rename = "dailyVolumeETH", deserialize_with = "de_f64")]
    pub daily_volume_eth: f64,
    #[serde(rename = "totalLiquidityUSD", deserialize_with = "de_f64")]
    pub total_liquidity_usd: f64,
    #[serde(rename = "totalLiquidityETH", deserialize_with = "de_f64")]
    pub total_liquidity_eth: f64,
}

impl SeriesPoint for GlobalDayData {
    fn timestamp(&self) -> i64 {
        self.date
    }

    fn carry_forward(&self, timestamp: i64) -> Self {
        Self {
            id: (timestamp / ONE_DAY).to_string(),
            date: timestamp,
            total_volume_usd: self.total_volume_usd,
            daily_volume_usd: 0.0,
            daily_volume_eth: 0.0,
            total_liquidity_usd: self.total_liquidity_usd,
            total_liquidity_eth: self.total_liquidity_eth,
        }
    }
}

/// Daily snapshot of a single pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairDayData {
    pub id: String,
    #[serde(deserialize_with = "de_i64")]
    pub date: i64,
    #[serde(rename = "dailyVolumeToken0", deserialize_with = "de_f64")]
    pub daily_volume_token0: f64,
    #[serde(rename = "dailyVolumeToken1", deserialize_with = "de_f64")]
    pub daily_volume_token1: f64,
    #[serde(rename = "dailyVolumeUSD", deserialize_with = "de_f64")]
    pub daily_volume_usd: f64,
    #[serde(rename = "reserveUSD", deserialize_with = "de_f64")]
    pub reserve_usd: f64,
}

impl SeriesPoint for PairDayData {
    fn timestamp(&self) -> i64 {
        self.date
    }

    fn carry_forward(&self, timestamp: i64) -> Self {
        Self {
            id: String::new(),
            date: timestamp,
            daily_volume_token0: 0.0,
            daily_volume_token1: 0.0,
            daily_volume_usd: 0.0,
            reserve_usd: self.reserve_usd,
        }
    }
}

/// Volume summed over one ISO week; `date` is the last day in the bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeeklyVolume {
    pub date: i64,
    #[serde(rename = "weeklyVolumeUSD")]
    pub weekly_volume_usd: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub daily: Vec<GlobalDayData>,
    pub weekly: Vec<WeeklyVolume>,
}
