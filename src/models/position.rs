use serde::{Deserialize, Serialize};

use super::transaction::TokenRef;
use crate::utils::de_f64;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PositionPair {
    pub id: String,
    #[serde(rename = "totalSupply", deserialize_with = "de_f64")]
    pub total_supply: f64,
    #[serde(rename = "reserveUSD", deserialize_with = "de_f64")]
    pub reserve_usd: f64,
    pub token0: TokenRef,
    pub token1: TokenRef,
}

/// A user's liquidity token balance in one pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiquidityPosition {
    pub user: UserRef,
    pub pair: PositionPair,
    #[serde(rename = "liquidityTokenBalance", deserialize_with = "de_f64")]
    pub liquidity_token_balance: f64,
}

impl LiquidityPosition {
    /// USD value of the position: `balance / totalSupply * reserveUSD`.
    /// A pair with no supply is worth nothing.
    pub fn usd_value(&self) -> f64 {
        if self.pair.total_supply <= 0.0 {
            return 0.0;
        }
        self.liquidity_token_balance / self.pair.total_supply * self.pair.reserve_usd
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLp {
    pub user: String,
    #[serde(rename = "pairName")]
    pub pair_name: String,
    #[serde(rename = "pairAddress")]
    pub pair_address: String,
    pub token0: String,
    pub token1: String,
    pub usd: f64,
}

impl From<LiquidityPosition> for TopLp {
    fn from(position: LiquidityPosition) -> Self {
        let usd = position.usd_value();
        Self {
            user: position.user.id,
            pair_name: format!(
                "{}-{}",
                position.pair.token0.symbol, position.pair.token1.symbol
            ),
            pair_address: position.pair.id,
            token0: position.pair.token0.id,
            token1: position.pair.token1.id,
            usd,
        }
    }
}
