use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use super::{Reducer, SessionStore};
use crate::{
    data::PairAssembler,
    models::{PairData, PairDayData, Transactions},
    utils::normalize_address,
};

/// Everything cached about one pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairEntry {
    pub data: Option<PairData>,
    pub transactions: Option<Transactions>,
    pub chart: Option<Vec<PairDayData>>,
}

#[derive(Debug, Clone, Default)]
pub struct PairState {
    entries: FxHashMap<String, PairEntry>,
}

impl PairState {
    pub fn get(&self, address: &str) -> Option<&PairEntry> {
        self.entries.get(&normalize_address(address))
    }

    pub fn data(&self, address: &str) -> Option<&PairData> {
        self.get(address)?.data.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&mut self, address: &str) -> &mut PairEntry {
        self.entries.entry(normalize_address(address)).or_default()
    }

    fn store_data(&mut self, address: &str, data: PairData) {
        let address = normalize_address(address);
        if normalize_address(data.id()) != address {
            warn!(
                "Rejected pair update: payload {} does not match key {}",
                data.id(),
                address
            );
            return;
        }
        self.entry(&address).data = Some(data);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PairKey {
    Data(String),
    Transactions(String),
    Chart(String),
}

impl PairKey {
    fn data(address: &str) -> Self {
        PairKey::Data(normalize_address(address))
    }
}

#[derive(Debug, Clone)]
pub enum PairAction {
    Update { address: String, data: PairData },
    UpdateBulk(Vec<PairData>),
    UpdateTransactions { address: String, transactions: Transactions },
    UpdateChart { address: String, chart: Vec<PairDayData> },
}

impl Reducer for PairState {
    type Action = PairAction;
    type Key = PairKey;

    fn reduce(&mut self, action: PairAction) {
        match action {
            PairAction::Update { address, data } => self.store_data(&address, data),
            PairAction::UpdateBulk(pairs) => {
                for data in pairs {
                    let address = data.id().to_string();
                    self.store_data(&address, data);
                }
            },
            PairAction::UpdateTransactions {
                address,
                transactions,
            } => self.entry(&address).transactions = Some(transactions),
            PairAction::UpdateChart { address, chart } => self.entry(&address).chart = Some(chart),
        }
    }
}

/// Pair store backed by the pairs assembler.
pub struct PairCache {
    store: SessionStore<PairState>,
    assembler: PairAssembler,
}

impl PairCache {
    pub fn new(assembler: PairAssembler) -> Self {
        Self {
            store: SessionStore::new(PairState::default()),
            assembler,
        }
    }

    pub fn store(&self) -> &SessionStore<PairState> {
        &self.store
    }

    pub async fn pair(&self, address: &str, eth_price: f64) -> Option<PairData> {
        self.pairs(&[address.to_string()], eth_price)
            .await
            .into_iter()
            .next()
    }

    /// Cached data for `addresses`, fetching in one bulk assembly the pairs
    /// not attempted yet this session.
    ///
    /// Pairs still in flight elsewhere, or whose fetch came back empty, are
    /// left out of the result.
    pub async fn pairs(&self, addresses: &[String], eth_price: f64) -> Vec<PairData> {
        let missing: Vec<String> = addresses
            .iter()
            .filter(|address| self.store.read(|s| s.data(address).is_none()))
            .filter(|address| self.store.begin_fetch(PairKey::data(address)))
            .map(|address| normalize_address(address))
            .collect();

        if !missing.is_empty() {
            let fetched = self.assembler.assemble_bulk(&missing, eth_price).await;
            self.store.dispatch(PairAction::UpdateBulk(fetched));
        }

        self.cached(addresses)
    }

    /// Re-assemble `addresses` and overwrite whatever is cached.
    pub async fn refresh(&self, addresses: &[String], eth_price: f64) -> usize {
        for address in addresses {
            self.store.begin_fetch(PairKey::data(address));
        }

        let fetched = self.assembler.assemble_bulk(addresses, eth_price).await;
        let count = fetched.len();
        self.store.dispatch(PairAction::UpdateBulk(fetched));

        info!("Refreshed {}/{} pairs", count, addresses.len());
        count
    }

    pub async fn transactions(&self, address: &str) -> Option<Transactions> {
        let address = normalize_address(address);
        if self.store.begin_fetch(PairKey::Transactions(address.clone())) {
            if let Some(transactions) = self.assembler.pair_transactions(&address).await {
                self.store.dispatch(PairAction::UpdateTransactions {
                    address: address.clone(),
                    transactions,
                });
            }
        }

        self.store
            .read(|s| s.get(&address).and_then(|e| e.transactions.clone()))
    }

    pub async fn chart(&self, address: &str) -> Option<Vec<PairDayData>> {
        let address = normalize_address(address);
        if self.store.begin_fetch(PairKey::Chart(address.clone())) {
            let chart = self.assembler.pair_chart(&address).await;
            self.store.dispatch(PairAction::UpdateChart {
                address: address.clone(),
                chart,
            });
        }

        self.store
            .read(|s| s.get(&address).and_then(|e| e.chart.clone()))
    }

    fn cached(&self, addresses: &[String]) -> Vec<PairData> {
        let mut seen = FxHashSet::default();
        self.store.read(|s| {
            addresses
                .iter()
                .map(|address| normalize_address(address))
                .filter(|address| seen.insert(address.clone()))
                .filter_map(|address| s.data(&address).cloned())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        data::pairs::tests::{blocks_graph, pair_json},
        graph::{mock::MockGraph, BlockResolver},
    };

    fn exchange() -> Arc<MockGraph> {
        Arc::new(
            MockGraph::new()
                .on_fn("query pairsBulk", |_, variables| {
                    let pairs: Vec<_> = variables["allPairs"]
                        .as_array()
                        .into_iter()
                        .flatten()
                        .filter_map(|id| id.as_str())
                        .filter(|id| *id != "0xgone")
                        .map(|id| pair_json(id, 100.0, 1_000.0, 10))
                        .collect();
                    Ok(json!({ "pairs": pairs }))
                })
                .on("query pairsHistoricalBulk", json!({ "pairs": [] }))
                .on("query pairAtBlock", json!({ "pairs": [] }))
                .on(
                    "query pairTransactions",
                    json!({ "mints": [], "burns": [], "swaps": [] }),
                )
                .on("query pairChart", json!({ "pairDayDatas": [] })),
        )
    }

    fn cache(exchange: Arc<MockGraph>) -> PairCache {
        let blocks = BlockResolver::new(blocks_graph(), 100, 600);
        PairCache::new(PairAssembler::new(exchange, blocks))
    }

    fn data(id: &str) -> PairData {
        let snapshot = serde_json::from_value(pair_json(id, 1.0, 1.0, 1)).unwrap();
        PairData {
            snapshot,
            one_day_volume_usd: 0.0,
            one_day_volume_untracked: 0.0,
            volume_change_usd: None,
            volume_change_untracked: None,
            one_week_volume_usd: 0.0,
            one_week_volume_untracked: 0.0,
            liquidity_change_usd: None,
            tracked_reserve_usd: 0.0,
        }
    }

    #[test]
    fn test_update_rejects_mismatched_key() {
        let mut state = PairState::default();

        state.reduce(PairAction::Update {
            address: "0xa".to_string(),
            data: data("0xb"),
        });
        assert!(state.is_empty());

        state.reduce(PairAction::Update {
            address: "0xA".to_string(),
            data: data("0xa"),
        });
        assert_eq!(state.data("0xa").map(|d| d.id()), Some("0xa"));
    }

    #[test]
    fn test_sub_field_updates_keep_other_fields() {
        let mut state = PairState::default();

        state.reduce(PairAction::UpdateBulk(vec![data("0xa"), data("0xb")]));
        state.reduce(PairAction::UpdateTransactions {
            address: "0xa".to_string(),
            transactions: Transactions::default(),
        });

        let entry = state.get("0xa").unwrap();
        assert!(entry.data.is_some());
        assert!(entry.transactions.is_some());
        assert!(entry.chart.is_none());
        assert_eq!(state.len(), 2);
    }

    #[tokio::test]
    async fn test_pairs_fetch_once_per_key() {
        let exchange = exchange();
        let cache = cache(exchange.clone());
        let addresses = vec!["0xa".to_string(), "0xb".to_string()];

        let first = cache.pairs(&addresses, 1.0).await;
        let second = cache.pairs(&addresses, 1.0).await;

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(exchange.count("query pairsBulk"), 1);

        // only the new key is requested
        cache.pairs(&["0xa".to_string(), "0xc".to_string()], 1.0).await;
        assert_eq!(exchange.count("query pairsBulk"), 2);
    }

    #[tokio::test]
    async fn test_failed_key_is_not_refetched() {
        let exchange = exchange();
        let cache = cache(exchange.clone());

        assert!(cache.pair("0xgone", 1.0).await.is_none());
        assert!(cache.pair("0xgone", 1.0).await.is_none());
        assert_eq!(exchange.count("query pairsBulk"), 1);
    }

    #[tokio::test]
    async fn test_refresh_overwrites() {
        let exchange = exchange();
        let cache = cache(exchange.clone());
        let addresses = vec!["0xa".to_string()];

        cache.pairs(&addresses, 1.0).await;
        assert_eq!(cache.refresh(&addresses, 1.0).await, 1);
        assert_eq!(exchange.count("query pairsBulk"), 2);
        assert!(cache.store().read(|s| s.data("0xa").is_some()));
    }

    #[tokio::test]
    async fn test_transactions_and_chart_cached() {
        let exchange = exchange();
        let cache = cache(exchange.clone());

        assert!(cache.transactions("0xa").await.is_some());
        assert!(cache.transactions("0xA").await.is_some());
        assert_eq!(exchange.count("query pairTransactions"), 1);

        assert_eq!(cache.chart("0xa").await, Some(Vec::new()));
        cache.chart("0xa").await;
        assert_eq!(exchange.count("query pairChart"), 1);
    }
}
