use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::json;

use super::{
    fetch_paged, period_change,
    series::{aggregate_weekly, fill_gaps},
    Baseline,
};
use crate::{
    config::DataSettings,
    graph::{query_as, queries, BlockResolver, GraphQuery},
    models::{
        Block, Bundle, ChartData, EthPrice, FactorySnapshot, GlobalData, GlobalDayData,
        LiquidityPosition, PairSnapshot, TopLp,
    },
    utils::{normalize_address, percent_change, ChangeTimestamps, ONE_DAY},
};

#[derive(Deserialize)]
struct FactoriesResult {
    #[serde(rename = "uniswapFactories")]
    factories: Vec<FactorySnapshot>,
}

#[derive(Deserialize)]
struct BundlesResult {
    bundles: Vec<Bundle>,
}

#[derive(Deserialize)]
struct PairsResult {
    pairs: Vec<PairSnapshot>,
}

#[derive(Deserialize)]
struct PositionsResult {
    #[serde(rename = "liquidityPositions")]
    positions: Vec<LiquidityPosition>,
}

/// Assembles exchange-wide metrics: factory totals with period changes,
/// ETH price, the global chart and the top liquidity providers.
#[derive(Clone)]
pub struct GlobalAssembler {
    exchange: Arc<dyn GraphQuery>,
    blocks: BlockResolver,
    factory_address: String,
    settings: DataSettings,
}

impl GlobalAssembler {
    pub fn new(
        exchange: Arc<dyn GraphQuery>,
        blocks: BlockResolver,
        factory_address: &str,
        settings: DataSettings,
    ) -> Self {
        Self {
            exchange,
            blocks,
            factory_address: normalize_address(factory_address),
            settings,
        }
    }

    pub fn factory_address(&self) -> &str {
        &self.factory_address
    }

    pub async fn global_data(&self, eth_price: f64, one_day_eth_price: f64) -> Option<GlobalData> {
        self.global_data_at(eth_price, one_day_eth_price, Utc::now().timestamp())
            .await
    }

    /// Factory totals with one-day, one-week and transaction-count changes.
    ///
    /// Returns `None` only when the current factory state is unavailable. A
    /// failed historical lookup makes that period's metrics unavailable.
    pub async fn global_data_at(
        &self,
        eth_price: f64,
        one_day_eth_price: f64,
        now: i64,
    ) -> Option<GlobalData> {
        let timestamps = ChangeTimestamps::at(now);
        let blocks = self
            .blocks
            .blocks_from_timestamps(&[
                timestamps.one_day,
                timestamps.two_day,
                timestamps.one_week,
                timestamps.two_week,
            ])
            .await;

        let (current, one_day, two_day, one_week, two_week) = tokio::join!(
            self.fetch_factory(None),
            self.fetch_factory_at(blocks[0]),
            self.fetch_factory_at(blocks[1]),
            self.fetch_factory_at(blocks[2]),
            self.fetch_factory_at(blocks[3]),
        );

        let current = current?;
        let one_day = Baseline::from_lookup(blocks[0], one_day, None);
        let two_day = Baseline::from_lookup(blocks[1], two_day, None);
        let one_week = Baseline::from_lookup(blocks[2], one_week, None);
        let two_week = Baseline::from_lookup(blocks[3], two_week, None);

        let volume = |f: &FactorySnapshot| f.total_volume_usd;
        let txns = |f: &FactorySnapshot| f.tx_count as f64;

        let (one_day_volume_usd, volume_change_usd) =
            period_change(&current, &one_day, &two_day, volume);
        let (one_week_volume, weekly_volume_change) =
            period_change(&current, &one_week, &two_week, volume);
        let (one_day_txns, txn_change) = period_change(&current, &one_day, &two_day, txns);

        let liquidity_usd = current.total_liquidity_eth * eth_price;
        let liquidity_change_usd = one_day
            .value(&current, |f| f.total_liquidity_eth)
            .and_then(|then| percent_change(liquidity_usd, then * one_day_eth_price));

        Some(GlobalData {
            snapshot: current,
            one_day_volume_usd,
            volume_change_usd,
            one_week_volume,
            weekly_volume_change,
            one_day_txns,
            txn_change,
            liquidity_usd,
            liquidity_change_usd,
        })
    }

    async fn fetch_factory_at(&self, block: Option<Block>) -> Option<FactorySnapshot> {
        self.fetch_factory(Some(block?.number)).await
    }

    async fn fetch_factory(&self, block: Option<u64>) -> Option<FactorySnapshot> {
        let result: Result<FactoriesResult, _> = query_as(
            self.exchange.as_ref(),
            &queries::factory_at_block(block),
            json!({ "factory": self.factory_address }),
        )
        .await;

        match result {
            Ok(found) => found.factories.into_iter().next(),
            Err(e) => {
                warn!("Failed to fetch factory at block {:?}: {}", block, e);
                None
            },
        }
    }

    pub async fn eth_price(&self) -> EthPrice {
        self.eth_price_at(Utc::now().timestamp()).await
    }

    /// Current ETH price and its one-day change.
    pub async fn eth_price_at(&self, now: i64) -> EthPrice {
        let block = self
            .blocks
            .blocks_from_timestamps(&[ChangeTimestamps::at(now).one_day])
            .await
            .into_iter()
            .next()
            .flatten();

        let (current, one_day) = tokio::join!(self.fetch_eth_price(None), async {
            match block {
                Some(block) => Some(self.fetch_eth_price(Some(block.number)).await),
                None => None,
            }
        });

        let current = current.unwrap_or_default();
        let one_day_ago = match one_day {
            None => current,
            Some(price) => price.unwrap_or_default(),
        };

        EthPrice {
            current,
            one_day_ago,
            change: percent_change(current, one_day_ago),
        }
    }

    async fn fetch_eth_price(&self, block: Option<u64>) -> Option<f64> {
        let result: Result<BundlesResult, _> = query_as(
            self.exchange.as_ref(),
            &queries::eth_price_at_block(block),
            json!({}),
        )
        .await;

        match result {
            Ok(found) => found.bundles.into_iter().next().map(|b| b.eth_price),
            Err(e) => {
                warn!("Failed to fetch ETH price at block {:?}: {}", block, e);
                None
            },
        }
    }

    pub async fn chart_data(&self) -> ChartData {
        self.chart_data_at(self.settings.chart_start_timestamp, Utc::now().timestamp())
            .await
    }

    /// Daily global history since `oldest`, gap-filled, plus weekly volumes.
    pub async fn chart_data_at(&self, oldest: i64, now: i64) -> ChartData {
        let days: Vec<GlobalDayData> = fetch_paged(
            self.exchange.as_ref(),
            queries::GLOBAL_CHART,
            json!({ "startTime": oldest }),
            "uniswapDayDatas",
        )
        .await;

        let fetched = days.len();
        let daily = fill_gaps(days, ONE_DAY, now);
        let weekly = aggregate_weekly(&daily);

        info!(
            "Global chart: {} days fetched, {} after backfill, {} weeks",
            fetched,
            daily.len(),
            weekly.len()
        );

        ChartData { daily, weekly }
    }

    /// The `first` pairs with the deepest tracked liquidity.
    pub async fn top_pairs(&self, first: usize) -> Vec<PairSnapshot> {
        let result: Result<PairsResult, _> = query_as(
            self.exchange.as_ref(),
            &queries::top_pairs(),
            json!({ "first": first }),
        )
        .await;

        match result {
            Ok(found) => found.pairs,
            Err(e) => {
                warn!("Failed to fetch top pairs: {}", e);
                Vec::new()
            },
        }
    }

    /// Top liquidity providers over the current deepest pairs.
    pub async fn top_liquidity_providers(&self) -> Vec<TopLp> {
        let pairs = self.top_pairs(self.settings.top_lp_pairs).await;
        self.top_lps(&pairs).await
    }

    /// Largest liquidity positions across the deepest pairs.
    ///
    /// One query per pair, run concurrently. A pair whose query fails
    /// contributes no positions.
    pub async fn top_lps(&self, pairs: &[PairSnapshot]) -> Vec<TopLp> {
        let mut ranked: Vec<&PairSnapshot> = pairs.iter().collect();
        ranked.sort_by(|a, b| b.reserve_usd.total_cmp(&a.reserve_usd));
        ranked.truncate(self.settings.top_lp_pairs);
        ranked.retain(|pair| !self.is_excluded(&pair.id));

        let lists = join_all(ranked.iter().map(|pair| self.fetch_positions(&pair.id))).await;

        let mut top: Vec<TopLp> = lists.into_iter().flatten().map(TopLp::from).collect();
        top.sort_by(|a, b| b.usd.total_cmp(&a.usd));
        top.truncate(self.settings.top_lp_limit);

        top
    }

    fn is_excluded(&self, pair: &str) -> bool {
        let pair = normalize_address(pair);
        self.settings
            .excluded_lp_pairs
            .iter()
            .any(|excluded| normalize_address(excluded) == pair)
    }

    async fn fetch_positions(&self, pair: &str) -> Vec<LiquidityPosition> {
        let result: Result<PositionsResult, _> = query_as(
            self.exchange.as_ref(),
            queries::TOP_LPS_PER_PAIR,
            json!({ "pair": normalize_address(pair) }),
        )
        .await;

        match result {
            Ok(found) => found.positions,
            Err(e) => {
                debug!("Skipping liquidity positions of {}: {}", pair, e);
                Vec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::pairs::tests::{blocks_graph, pair_json, NOW},
        graph::{mock::MockGraph, GraphError},
    };
    use serde_json::Value;

    const FACTORY: &str = "0xfactory";

    fn factory_json(volume: f64, liquidity_eth: f64, tx_count: u64) -> Value {
        json!({ "uniswapFactories": [{
            "id": FACTORY,
            "totalVolumeUSD": volume.to_string(),
            "totalVolumeETH": "0",
            "untrackedVolumeUSD": "0",
            "totalLiquidityUSD": "0",
            "totalLiquidityETH": liquidity_eth.to_string(),
            "txCount": tx_count.to_string(),
            "pairCount": "42"
        }]})
    }

    fn assembler(exchange: Arc<MockGraph>, settings: DataSettings) -> GlobalAssembler {
        GlobalAssembler::new(
            exchange,
            BlockResolver::new(blocks_graph(), 100, 600),
            FACTORY,
            settings,
        )
    }

    fn factory_graph() -> MockGraph {
        with_factory_history(MockGraph::new())
    }

    fn with_factory_history(graph: MockGraph) -> MockGraph {
        graph.on_fn("query factoryAtBlock", |document, _| {
            Ok(if document.contains("number: 300") {
                factory_json(9_000.0, 90.0, 900)
            } else if document.contains("number: 200") {
                factory_json(8_500.0, 80.0, 850)
            } else if document.contains("number: 100") {
                factory_json(6_000.0, 60.0, 600)
            } else if document.contains("number: 50") {
                factory_json(5_000.0, 50.0, 500)
            } else {
                factory_json(10_000.0, 100.0, 1_000)
            })
        })
    }

    #[tokio::test]
    async fn test_global_data() {
        let global = assembler(Arc::new(factory_graph()), DataSettings::default());

        let data = global.global_data_at(2.0, 1.0, NOW).await.unwrap();

        assert_eq!(data.one_day_volume_usd, 1_000.0);
        assert_eq!(data.volume_change_usd, Some(100.0));
        assert_eq!(data.one_week_volume, 4_000.0);
        assert_eq!(data.weekly_volume_change, Some(300.0));
        assert_eq!(data.one_day_txns, 100.0);
        assert_eq!(data.txn_change, Some(100.0));
        assert_eq!(data.liquidity_usd, 200.0);
        // 200 now against 90 ETH at 1 USD a day ago
        let expected = (200.0 - 90.0) / 90.0 * 100.0;
        assert_eq!(data.liquidity_change_usd, Some(expected));
        assert_eq!(data.snapshot.pair_count, 42);
    }

    #[tokio::test]
    async fn test_global_data_without_current_factory() {
        let global = assembler(
            Arc::new(MockGraph::new().fail_on("query factoryAtBlock")),
            DataSettings::default(),
        );

        assert!(global.global_data_at(1.0, 1.0, NOW).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_one_day_lookup_is_unavailable() {
        let exchange = with_factory_history(MockGraph::new().fail_on("number: 300"));
        let global = assembler(Arc::new(exchange), DataSettings::default());

        let data = global.global_data_at(2.0, 1.0, NOW).await.unwrap();

        // not the factory's lifetime volume
        assert_eq!(data.one_day_volume_usd, 0.0);
        assert_eq!(data.volume_change_usd, None);
        assert_eq!(data.one_day_txns, 0.0);
        assert_eq!(data.txn_change, None);
        assert_eq!(data.liquidity_usd, 200.0);
        assert_eq!(data.liquidity_change_usd, None);
        assert_eq!(data.one_week_volume, 4_000.0);
        assert_eq!(data.weekly_volume_change, Some(300.0));
    }

    #[tokio::test]
    async fn test_eth_price() {
        let exchange = Arc::new(MockGraph::new().on_fn("query ethPrice", |document, _| {
            let price = if document.contains("number: 300") { "1600" } else { "2000" };
            Ok(json!({ "bundles": [{ "id": "1", "ethPrice": price }] }))
        }));
        let global = assembler(exchange, DataSettings::default());

        let price = global.eth_price_at(NOW).await;

        assert_eq!(price.current, 2_000.0);
        assert_eq!(price.one_day_ago, 1_600.0);
        assert_eq!(price.change, Some(25.0));
    }

    #[tokio::test]
    async fn test_chart_pages_until_short_page() {
        let day0 = 1_704_067_200;
        let exchange = Arc::new(MockGraph::new().on_fn("query globalChart", move |_, variables| {
            let skip = variables["skip"].as_i64().unwrap_or_default();
            let len = if skip == 0 { 1_000 } else { 3 };
            let days: Vec<Value> = (0..len)
                .map(|i| {
                    json!({
                        "id": (skip + i).to_string(),
                        "date": day0 + (skip + i) * ONE_DAY,
                        "dailyVolumeUSD": "1",
                        "totalLiquidityUSD": "10"
                    })
                })
                .collect();
            Ok(json!({ "uniswapDayDatas": days }))
        }));
        let global = assembler(exchange.clone(), DataSettings::default());

        let chart = global
            .chart_data_at(day0 - ONE_DAY, day0 + 1_003 * ONE_DAY)
            .await;

        assert_eq!(chart.daily.len(), 1_003);
        assert_eq!(exchange.count("query globalChart"), 2);
        let total: f64 = chart.weekly.iter().map(|w| w.weekly_volume_usd).sum();
        assert_eq!(total, 1_003.0);
    }

    #[tokio::test]
    async fn test_chart_backfill_and_weekly_buckets() {
        // Monday 2024-01-01, with days 2..=12 missing
        let day0 = 1_704_067_200;
        let exchange = Arc::new(MockGraph::new().on(
            "query globalChart",
            json!({ "uniswapDayDatas": [
                { "id": "a", "date": day0, "dailyVolumeUSD": "10", "totalLiquidityUSD": "100" },
                { "id": "b", "date": day0 + ONE_DAY, "dailyVolumeUSD": "20", "totalLiquidityUSD": "110" },
                { "id": "c", "date": day0 + 13 * ONE_DAY, "dailyVolumeUSD": "5", "totalLiquidityUSD": "120" }
            ]}),
        ));
        let global = assembler(exchange, DataSettings::default());

        let chart = global.chart_data_at(day0 - ONE_DAY, day0 + 14 * ONE_DAY).await;

        assert_eq!(chart.daily.len(), 14);
        assert!(chart.daily[2..13].iter().all(|d| d.daily_volume_usd == 0.0));
        assert!(chart.daily[2..13].iter().all(|d| d.total_liquidity_usd == 110.0));
        assert_eq!(chart.weekly.len(), 2);
        assert_eq!(chart.weekly[0].weekly_volume_usd, 30.0);
        assert_eq!(chart.weekly[1].weekly_volume_usd, 5.0);
    }

    #[tokio::test]
    async fn test_top_lps() {
        let exchange = Arc::new(
            MockGraph::new().on_fn("query topLpsPerPair", |_, variables| {
                let pair = variables["pair"].as_str().unwrap_or_default().to_string();
                if pair == "0xbad" {
                    return Err(GraphError::Query("timeout".into()));
                }
                let reserve = if pair == "0xa" { "1000" } else { "500" };
                let positions: Vec<Value> = (1..=3)
                    .map(|i| {
                        json!({
                            "user": { "id": format!("0xuser{i}") },
                            "pair": {
                                "id": pair,
                                "totalSupply": "100",
                                "reserveUSD": reserve,
                                "token0": { "id": "0xt0", "symbol": "USDC" },
                                "token1": { "id": "0xt1", "symbol": "WETH" }
                            },
                            "liquidityTokenBalance": (i * 10).to_string()
                        })
                    })
                    .collect();
                Ok(json!({ "liquidityPositions": positions }))
            }),
        );
        let settings = DataSettings {
            top_lp_limit: 4,
            excluded_lp_pairs: vec!["0xSKIP".to_string()],
            ..Default::default()
        };
        let global = assembler(exchange.clone(), settings);

        let pairs: Vec<PairSnapshot> = [
            ("0xa", 1_000.0),
            ("0xb", 500.0),
            ("0xbad", 900.0),
            ("0xskip", 5_000.0),
        ]
        .into_iter()
        .map(|(id, reserve)| serde_json::from_value(pair_json(id, 1.0, reserve, 1)).unwrap())
        .collect();

        let top = global.top_lps(&pairs).await;

        let values: Vec<f64> = top.iter().map(|lp| lp.usd).collect();
        assert_eq!(values, vec![300.0, 200.0, 150.0, 100.0]);
        assert_eq!(top[0].pair_address, "0xa");
        assert_eq!(top[0].pair_name, "USDC-WETH");
        assert_eq!(exchange.count("query topLpsPerPair"), 3);
    }
}
