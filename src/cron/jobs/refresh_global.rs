//! Job to refresh the session caches.
//!
//! Re-fetches the ETH price, global metrics and every tracked pair, writing
//! the results over whatever is cached.

use anyhow::Result;
use log::info;

use crate::cache::{GlobalCache, PairCache};

/// Refreshes global data, then the tracked pairs priced with the fresh ETH price.
pub async fn run(global: &GlobalCache, pairs: &PairCache, tracked_pairs: &[String]) -> Result<()> {
    info!("Starting refresh_global job...");

    let start = std::time::Instant::now();

    let eth_price = global.refresh().await;

    let refreshed = if tracked_pairs.is_empty() {
        0
    } else {
        pairs.refresh(tracked_pairs, eth_price.current).await
    };

    info!(
        "Completed refresh_global job in {:?} (ETH {:.2} USD, {} pairs)",
        start.elapsed(),
        eth_price.current,
        refreshed
    );
    Ok(())
}
