//! The `watch` subcommand: the scheduler in the foreground.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use dolarhoy_lib::{ScrapeCycle, ScraperSettings, Scheduler, SiteRenderer};

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between scrapes (default: DOLARHOY_INTERVAL_SECS or 600)
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

pub async fn run(args: &WatchArgs, settings: ScraperSettings) -> Result<()> {
    let period = args
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or(settings.interval);

    let cycle = Arc::new(ScrapeCycle::from_settings(
        SiteRenderer::from_settings(&settings),
        &settings,
    ));
    let scheduler = Scheduler::start(cycle, period);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    scheduler.stop().await;
    Ok(())
}
