//! Cron scheduler for periodic background tasks.
//!
//! Runs jobs like:
//! - Polling the subgraph indexing status
//! - Refreshing the ETH price, global metrics and tracked pairs

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::{
    cache::{GlobalCache, PairCache},
    config::Settings,
    graph::GraphQuery,
};

use super::jobs;

/// Cron scheduler that keeps the session caches warm.
pub struct CronScheduler {
    settings: Arc<Settings>,
    health: Arc<dyn GraphQuery>,
    global: Arc<GlobalCache>,
    pairs: Arc<PairCache>,
}

impl CronScheduler {
    pub fn new(
        settings: Arc<Settings>,
        health: Arc<dyn GraphQuery>,
        global: Arc<GlobalCache>,
        pairs: Arc<PairCache>,
    ) -> Self {
        Self {
            settings,
            health,
            global,
            pairs,
        }
    }

    /// Starts the cron scheduler and runs until cancellation.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        let mut scheduler = JobScheduler::new().await?;

        self.register_poll_indexer_status_job(&scheduler).await?;
        self.register_refresh_global_job(&scheduler).await?;

        scheduler.start().await?;
        info!("Cron scheduler started with {} jobs", 2);

        cancellation_token.cancelled().await;
        info!("Cron scheduler shutting down...");

        scheduler.shutdown().await?;
        Ok(())
    }

    async fn register_poll_indexer_status_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let health = self.health.clone();
        let global = self.global.clone();
        let subgraph_name = self.settings.subgraph.subgraph_name.clone();
        let lag_warning_blocks = self.settings.scheduler.lag_warning_blocks;
        let interval = self.settings.scheduler.health_interval_secs;

        let job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _lock| {
            let health = health.clone();
            let global = global.clone();
            let subgraph_name = subgraph_name.clone();
            Box::pin(async move {
                if let Err(e) = jobs::poll_indexer_status::run(
                    health.as_ref(),
                    &subgraph_name,
                    &global,
                    lag_warning_blocks,
                )
                .await
                {
                    error!("Failed to poll indexer status: {:#}", e);
                }
            })
        })?;

        scheduler.add(job).await?;
        info!("Registered poll_indexer_status job (every {}s)", interval);
        Ok(())
    }

    async fn register_refresh_global_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let global = self.global.clone();
        let pairs = self.pairs.clone();
        let tracked_pairs = Arc::new(self.settings.data.tracked_pairs.clone());
        let interval = self.settings.scheduler.refresh_interval_secs;

        let job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _lock| {
            let global = global.clone();
            let pairs = pairs.clone();
            let tracked_pairs = tracked_pairs.clone();
            Box::pin(async move {
                if let Err(e) = jobs::refresh_global::run(&global, &pairs, &tracked_pairs).await {
                    error!("Failed to refresh global data: {:#}", e);
                }
            })
        })?;

        scheduler.add(job).await?;
        info!("Registered refresh_global job (every {}s)", interval);
        Ok(())
    }
}
