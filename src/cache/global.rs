use log::{info, warn};

use super::{Reducer, SessionStore};
use crate::{
    data::GlobalAssembler,
    graph::health::IndexerStatus,
    models::{ChartData, EthPrice, GlobalData, TopLp},
    utils::normalize_address,
};

/// Exchange-wide values of one factory.
#[derive(Debug, Clone, Default)]
pub struct GlobalState {
    factory_address: String,
    pub global: Option<GlobalData>,
    pub eth_price: Option<EthPrice>,
    pub chart: Option<ChartData>,
    pub top_lps: Option<Vec<TopLp>>,
    pub indexer_status: Option<IndexerStatus>,
}

impl GlobalState {
    pub fn for_factory(factory_address: &str) -> Self {
        Self {
            factory_address: normalize_address(factory_address),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalKey {
    Global,
    EthPrice,
    Chart,
    TopLps,
}

#[derive(Debug, Clone)]
pub enum GlobalAction {
    UpdateGlobal(GlobalData),
    UpdateChart(ChartData),
    UpdateEthPrice(EthPrice),
    UpdateTopLps(Vec<TopLp>),
    UpdateIndexerStatus(IndexerStatus),
}

impl Reducer for GlobalState {
    type Action = GlobalAction;
    type Key = GlobalKey;

    fn reduce(&mut self, action: GlobalAction) {
        match action {
            GlobalAction::UpdateGlobal(data) => {
                if normalize_address(&data.snapshot.id) != self.factory_address {
                    warn!(
                        "Rejected global update: payload {} does not match factory {}",
                        data.snapshot.id, self.factory_address
                    );
                    return;
                }
                self.global = Some(data);
            },
            GlobalAction::UpdateChart(chart) => self.chart = Some(chart),
            GlobalAction::UpdateEthPrice(price) => self.eth_price = Some(price),
            GlobalAction::UpdateTopLps(top_lps) => self.top_lps = Some(top_lps),
            GlobalAction::UpdateIndexerStatus(status) => self.indexer_status = Some(status),
        }
    }
}

/// Global store backed by the global assembler.
pub struct GlobalCache {
    store: SessionStore<GlobalState>,
    assembler: GlobalAssembler,
}

impl GlobalCache {
    pub fn new(assembler: GlobalAssembler) -> Self {
        Self {
            store: SessionStore::new(GlobalState::for_factory(assembler.factory_address())),
            assembler,
        }
    }

    pub fn store(&self) -> &SessionStore<GlobalState> {
        &self.store
    }

    pub async fn eth_price(&self) -> Option<EthPrice> {
        if self.store.begin_fetch(GlobalKey::EthPrice) {
            let price = self.assembler.eth_price().await;
            self.store.dispatch(GlobalAction::UpdateEthPrice(price));
        }

        self.store.read(|s| s.eth_price)
    }

    /// Global metrics, priced with the cached ETH price.
    ///
    /// While the price is still in flight elsewhere, it is fetched directly
    /// rather than pricing with zero.
    pub async fn global(&self) -> Option<GlobalData> {
        if self.store.begin_fetch(GlobalKey::Global) {
            let price = match self.eth_price().await {
                Some(price) => price,
                None => self.assembler.eth_price().await,
            };
            if let Some(data) = self
                .assembler
                .global_data(price.current, price.one_day_ago)
                .await
            {
                self.store.dispatch(GlobalAction::UpdateGlobal(data));
            }
        }

        self.store.read(|s| s.global.clone())
    }

    pub async fn chart(&self) -> Option<ChartData> {
        if self.store.begin_fetch(GlobalKey::Chart) {
            let chart = self.assembler.chart_data().await;
            self.store.dispatch(GlobalAction::UpdateChart(chart));
        }

        self.store.read(|s| s.chart.clone())
    }

    pub async fn top_lps(&self) -> Option<Vec<TopLp>> {
        if self.store.begin_fetch(GlobalKey::TopLps) {
            let top_lps = self.assembler.top_liquidity_providers().await;
            self.store.dispatch(GlobalAction::UpdateTopLps(top_lps));
        }

        self.store.read(|s| s.top_lps.clone())
    }

    pub fn indexer_status(&self) -> Option<IndexerStatus> {
        self.store.read(|s| s.indexer_status.clone())
    }

    pub fn set_indexer_status(&self, status: IndexerStatus) {
        self.store.dispatch(GlobalAction::UpdateIndexerStatus(status));
    }

    /// Re-fetch the ETH price and global metrics, overwriting the cache.
    ///
    /// Returns the fresh ETH price so dependent refreshes can reuse it.
    pub async fn refresh(&self) -> EthPrice {
        self.store.begin_fetch(GlobalKey::EthPrice);
        self.store.begin_fetch(GlobalKey::Global);

        let price = self.assembler.eth_price().await;
        self.store.dispatch(GlobalAction::UpdateEthPrice(price));

        match self
            .assembler
            .global_data(price.current, price.one_day_ago)
            .await
        {
            Some(data) => {
                info!(
                    "Refreshed global data: 24h volume {:.2} USD, liquidity {:.2} USD",
                    data.one_day_volume_usd, data.liquidity_usd
                );
                self.store.dispatch(GlobalAction::UpdateGlobal(data));
            },
            None => warn!("Global data unavailable, keeping cached value"),
        }

        price
    }
}
