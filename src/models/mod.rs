//! Typed subgraph result shapes and the derived bundles built from them.

pub mod block;
pub mod day_data;
pub mod factory;
pub mod pair;
pub mod position;
pub mod transaction;

pub use block::Block;
pub use day_data::{ChartData, GlobalDayData, PairDayData, WeeklyVolume};
pub use factory::{Bundle, EthPrice, FactorySnapshot, GlobalData};
pub use pair::{PairData, PairSnapshot, TokenInfo};
pub use position::{LiquidityPosition, TopLp};
pub use transaction::{Burn, Mint, PairTokens, Swap, TokenRef, TransactionRef, Transactions};
