use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use vantage::{
    BlockResolver, CronScheduler, GlobalAssembler, GlobalCache, PairAssembler, PairCache,
    Settings, Subgraphs,
};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Arc::new(
        Settings::new()
            .context("Failed to load config.yaml. Please ensure it exists and is valid")?,
    );

    let level = settings
        .logging
        .level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Info);

    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("Failed to initialize logger")?;

    let subgraphs = Subgraphs::from_settings(&settings.subgraph)
        .context("Failed to create subgraph clients")?;

    let blocks = BlockResolver::new(
        subgraphs.blocks.clone(),
        settings.data.batch_size,
        settings.data.block_window_secs,
    );

    let global = Arc::new(GlobalCache::new(GlobalAssembler::new(
        subgraphs.exchange.clone(),
        blocks.clone(),
        &settings.subgraph.factory_address,
        settings.data.clone(),
    )));
    let pairs = Arc::new(PairCache::new(PairAssembler::new(
        subgraphs.exchange.clone(),
        blocks,
    )));

    warm_up(&settings, &global, &pairs).await;

    let cancellation_token = CancellationToken::new();

    let cron_scheduler = CronScheduler::new(
        settings.clone(),
        subgraphs.health.clone(),
        global.clone(),
        pairs.clone(),
    );

    let cron_token = cancellation_token.child_token();
    let cron_handle = tokio::spawn(async move {
        if let Err(e) = cron_scheduler.run(cron_token).await {
            error!("Cron scheduler failed: {:#}", e);
        }
    });

    info!("Cron scheduler started - caches will be refreshed periodically");

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Vantage running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    cancellation_token.cancel();

    info!("Waiting for cron scheduler to stop...");
    let _ = cron_handle.await;

    info!("Shutdown complete");
    Ok(())
}

/// First population of the caches, so the scheduler only ever refreshes.
async fn warm_up(settings: &Settings, global: &GlobalCache, pairs: &PairCache) {
    let eth_price = global.eth_price().await.unwrap_or_default();

    let (global_data, chart, top_lps, tracked) = tokio::join!(
        global.global(),
        global.chart(),
        global.top_lps(),
        pairs.pairs(&settings.data.tracked_pairs, eth_price.current),
    );

    match global_data {
        Some(data) => info!(
            "Global: {} pairs, 24h volume {:.2} USD, liquidity {:.2} USD",
            data.snapshot.pair_count, data.one_day_volume_usd, data.liquidity_usd
        ),
        None => warn!("Global data unavailable at startup"),
    }

    info!(
        "Warmed up: ETH {:.2} USD, {} chart days, {} top LPs, {}/{} tracked pairs",
        eth_price.current,
        chart.map(|c| c.daily.len()).unwrap_or_default(),
        top_lps.map(|lps| lps.len()).unwrap_or_default(),
        tracked.len(),
        settings.data.tracked_pairs.len()
    );
}
