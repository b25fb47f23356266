use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use serde_json::json;

use super::{delta_since, fetch_paged, period_change, series::fill_gaps, Baseline};
use crate::{
    graph::{
        query_as,
        queries::{self, PAIRS_BULK_LIMIT},
        BlockResolver, GraphQuery,
    },
    models::{Block, PairData, PairDayData, PairSnapshot, Transactions},
    utils::{normalize_address, percent_change, ChangeTimestamps, ONE_DAY},
};

#[derive(Deserialize)]
struct PairsResult {
    pairs: Vec<PairSnapshot>,
}

/// Historical snapshots of one pair used for its derived metrics.
struct PairHistory<'a> {
    one_day: Baseline<&'a PairSnapshot>,
    two_day: Baseline<&'a PairSnapshot>,
    one_week: Baseline<&'a PairSnapshot>,
}

/// Snapshots of many pairs at one historical block, or `None` when the block
/// could not be resolved.
type HistoricalPairs = Option<FxHashMap<String, PairSnapshot>>;

/// Assembles pair snapshots into [`PairData`] bundles.
///
/// Bulk assembly needs one batched block lookup, one current bulk query and
/// one bulk query per historical period (not one per pair), each split into
/// chunks of [`PAIRS_BULK_LIMIT`] addresses. Pairs absent from a historical
/// bulk result are looked up individually, concurrently.
#[derive(Clone)]
pub struct PairAssembler {
    exchange: Arc<dyn GraphQuery>,
    blocks: BlockResolver,
}

impl PairAssembler {
    pub fn new(exchange: Arc<dyn GraphQuery>, blocks: BlockResolver) -> Self {
        Self { exchange, blocks }
    }

    pub async fn assemble_bulk(&self, addresses: &[String], eth_price: f64) -> Vec<PairData> {
        self.assemble_bulk_at(addresses, eth_price, Utc::now().timestamp())
            .await
    }

    /// Assemble the requested pairs as seen at `now`.
    ///
    /// Output follows the order of `addresses`; pairs the subgraph does not
    /// know at all are left out.
    pub async fn assemble_bulk_at(
        &self,
        addresses: &[String],
        eth_price: f64,
        now: i64,
    ) -> Vec<PairData> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let requested: Vec<String> = addresses
            .iter()
            .map(|address| normalize_address(address))
            .filter(|address| seen.insert(address.clone()))
            .collect();

        if requested.is_empty() {
            return Vec::new();
        }

        let timestamps = ChangeTimestamps::at(now);
        let blocks = self
            .blocks
            .blocks_from_timestamps(&[timestamps.one_day, timestamps.two_day, timestamps.one_week])
            .await;

        let (current, one_day, two_day, one_week) = tokio::join!(
            self.fetch_current(&requested),
            self.fetch_historical(&requested, blocks[0]),
            self.fetch_historical(&requested, blocks[1]),
            self.fetch_historical(&requested, blocks[2]),
        );

        let assembled: Vec<PairData> = requested
            .iter()
            .filter_map(|address| {
                let snapshot = current.get(address)?;
                let history = PairHistory {
                    one_day: lookup(&one_day, blocks[0], snapshot),
                    two_day: lookup(&two_day, blocks[1], snapshot),
                    one_week: lookup(&one_week, blocks[2], snapshot),
                };
                Some(derive_pair_data(snapshot, &history, eth_price))
            })
            .collect();

        info!(
            "Assembled {}/{} pairs (blocks: 1d={:?} 2d={:?} 1w={:?})",
            assembled.len(),
            requested.len(),
            blocks[0].map(|b| b.number),
            blocks[1].map(|b| b.number),
            blocks[2].map(|b| b.number),
        );

        assembled
    }

    async fn fetch_current(&self, addresses: &[String]) -> FxHashMap<String, PairSnapshot> {
        self.fetch_bulk(&queries::pairs_bulk(), addresses, None).await
    }

    async fn fetch_historical(&self, addresses: &[String], block: Option<Block>) -> HistoricalPairs {
        let block = block?;

        let mut found = self
            .fetch_bulk(
                &queries::pairs_historical_bulk(block.number),
                addresses,
                Some(block.number),
            )
            .await;

        let missing: Vec<&String> = addresses
            .iter()
            .filter(|address| !found.contains_key(*address))
            .collect();

        let fallbacks = join_all(
            missing
                .iter()
                .map(|address| self.fetch_pair_at(address, Some(block.number))),
        )
        .await;

        for snapshot in fallbacks.into_iter().flatten() {
            found.insert(normalize_address(&snapshot.id), snapshot);
        }

        Some(found)
    }

    /// Run a bulk pairs document over `addresses`, one request per chunk of
    /// [`PAIRS_BULK_LIMIT`], concurrently. Failed chunks contribute nothing.
    async fn fetch_bulk(
        &self,
        document: &str,
        addresses: &[String],
        block: Option<u64>,
    ) -> FxHashMap<String, PairSnapshot> {
        let chunks: Vec<&[String]> = addresses.chunks(PAIRS_BULK_LIMIT).collect();

        let results = join_all(chunks.iter().map(|chunk| {
            query_as::<PairsResult>(
                self.exchange.as_ref(),
                document,
                json!({ "allPairs": chunk }),
            )
        }))
        .await;

        let mut found = FxHashMap::default();
        for (chunk, result) in chunks.iter().zip(results) {
            match result {
                Ok(page) => found.extend(index_by_id(page.pairs)),
                Err(e) => warn!(
                    "Failed to fetch {} pairs at block {:?}: {}",
                    chunk.len(),
                    block,
                    e
                ),
            }
        }

        found
    }

    /// Fetch one pair, optionally as of a block.
    pub async fn fetch_pair_at(&self, address: &str, block: Option<u64>) -> Option<PairSnapshot> {
        let result: Result<PairsResult, _> = query_as(
            self.exchange.as_ref(),
            &queries::pair_at_block(block),
            json!({ "pairAddress": normalize_address(address) }),
        )
        .await;

        match result {
            Ok(found) => found.pairs.into_iter().next(),
            Err(e) => {
                warn!(
                    "Failed to fetch pair {} at block {:?}: {}",
                    address, block, e
                );
                None
            },
        }
    }

    /// Latest mints, burns and swaps of a pair.
    pub async fn pair_transactions(&self, address: &str) -> Option<Transactions> {
        let result: Result<Transactions, _> = query_as(
            self.exchange.as_ref(),
            queries::PAIR_TRANSACTIONS,
            json!({ "allPairs": [normalize_address(address)] }),
        )
        .await;

        match result {
            Ok(transactions) => Some(transactions),
            Err(e) => {
                warn!("Failed to fetch transactions for pair {}: {}", address, e);
                None
            },
        }
    }

    pub async fn pair_chart(&self, address: &str) -> Vec<PairDayData> {
        self.pair_chart_at(address, Utc::now().timestamp()).await
    }

    /// Daily history of a pair, gap-filled up to the day before `now`.
    pub async fn pair_chart_at(&self, address: &str, now: i64) -> Vec<PairDayData> {
        let days: Vec<PairDayData> = fetch_paged(
            self.exchange.as_ref(),
            queries::PAIR_CHART,
            json!({ "pairAddress": normalize_address(address) }),
            "pairDayDatas",
        )
        .await;

        fill_gaps(days, ONE_DAY, now)
    }
}

fn index_by_id(pairs: Vec<PairSnapshot>) -> FxHashMap<String, PairSnapshot> {
    pairs
        .into_iter()
        .map(|pair| (normalize_address(&pair.id), pair))
        .collect()
}

fn lookup<'a>(
    period: &'a HistoricalPairs,
    block: Option<Block>,
    current: &PairSnapshot,
) -> Baseline<&'a PairSnapshot> {
    let snapshot = period
        .as_ref()
        .and_then(|found| found.get(&normalize_address(&current.id)));

    Baseline::from_lookup(block, snapshot, Some(current.created_at_block_number))
}

/// Derive windowed metrics for one pair.
///
/// A pair created after a period's block counts as zero there, so a pair
/// younger than a day reports its lifetime volume as its one-day volume (and
/// likewise for the week). A pair that existed but could not be fetched makes
/// that period unavailable instead.
fn derive_pair_data(current: &PairSnapshot, history: &PairHistory<'_>, eth_price: f64) -> PairData {
    let (one_day_volume_usd, volume_change_usd) =
        period_change(&current, &history.one_day, &history.two_day, |p| p.volume_usd);

    let (one_day_volume_untracked, volume_change_untracked) = period_change(
        &current,
        &history.one_day,
        &history.two_day,
        |p| p.untracked_volume_usd,
    );

    let one_week_volume_usd = delta_since(&current, &history.one_week, |p| p.volume_usd);
    let one_week_volume_untracked =
        delta_since(&current, &history.one_week, |p| p.untracked_volume_usd);

    let liquidity_change_usd = history
        .one_day
        .value(&current, |p| p.reserve_usd)
        .and_then(|then| percent_change(current.reserve_usd, then));

    PairData {
        snapshot: current.clone(),
        one_day_volume_usd,
        one_day_volume_untracked,
        volume_change_usd,
        volume_change_untracked,
        one_week_volume_usd,
        one_week_volume_untracked,
        liquidity_change_usd,
        tracked_reserve_usd: current.tracked_reserve_eth * eth_price,
    }
}
