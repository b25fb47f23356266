use serde::{Deserialize, Serialize};

use crate::utils::{de_f64, de_i64};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenRef {
    pub id: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairTokens {
    pub token0: TokenRef,
    pub token1: TokenRef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRef {
    pub id: String,
    #[serde(deserialize_with = "de_i64")]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mint {
    pub transaction: TransactionRef,
    pub pair: PairTokens,
    #[serde(default)]
    pub to: String,
    #[serde(deserialize_with = "de_f64")]
    pub liquidity: f64,
    #[serde(deserialize_with = "de_f64")]
    pub amount0: f64,
    #[serde(deserialize_with = "de_f64")]
    pub amount1: f64,
    #[serde(rename = "amountUSD", deserialize_with = "de_f64")]
    pub amount_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burn {
    pub transaction: TransactionRef,
    pub pair: PairTokens,
    #[serde(default)]
    pub sender: String,
    #[serde(deserialize_with = "de_f64")]
    pub liquidity: f64,
    #[serde(deserialize_with = "de_f64")]
    pub amount0: f64,
    #[serde(deserialize_with = "de_f64")]
    pub amount1: f64,
    #[serde(rename = "amountUSD", deserialize_with = "de_f64")]
    pub amount_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swap {
    pub id: String,
    pub transaction: TransactionRef,
    pub pair: PairTokens,
    #[serde(rename = "amount0In", deserialize_with = "de_f64")]
    pub amount0_in: f64,
    #[serde(rename = "amount0Out", deserialize_with = "de_f64")]
    pub amount0_out: f64,
    #[serde(rename = "amount1In", deserialize_with = "de_f64")]
    pub amount1_in: f64,
    #[serde(rename = "amount1Out", deserialize_with = "de_f64")]
    pub amount1_out: f64,
    #[serde(rename = "amountUSD", deserialize_with = "de_f64")]
    pub amount_usd: f64,
    #[serde(default)]
    pub to: String,
}

/// Most recent mints, burns and swaps of a pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transactions {
    pub mints: Vec<Mint>,
    pub burns: Vec<Burn>,
    pub swaps: Vec<Swap>,
}

impl Transactions {
    pub fn len(&self) -> usize {
        self.mints.len() + self.burns.len() + self.swaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
