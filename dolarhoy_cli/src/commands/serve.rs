//! The `serve` subcommand: read API, on-demand trigger and background schedule.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use dolarhoy_lib::{ScrapeCycle, ScraperSettings, Scheduler, SiteRenderer};

use crate::routes::{router, AppState};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Directory served at / (index.html and assets)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Do not run the background scheduler (also START_SCRAPER=false)
    #[arg(long)]
    pub no_scraper: bool,

    /// /api/scrape returns the record without appending it to the history
    #[arg(long)]
    pub read_only_trigger: bool,
}

impl ServeArgs {
    fn scheduler_enabled(&self, start_scraper: Option<&str>) -> bool {
        !self.no_scraper && start_scraper.map_or(true, |v| v.trim() != "false")
    }
}

pub async fn run(args: &ServeArgs, settings: ScraperSettings) -> Result<()> {
    let renderer = SiteRenderer::from_settings(&settings);
    let cycle = Arc::new(ScrapeCycle::from_settings(renderer, &settings));

    let start_scraper = std::env::var("START_SCRAPER").ok();
    let scheduler = if args.scheduler_enabled(start_scraper.as_deref()) {
        Some(Scheduler::start(Arc::clone(&cycle), settings.interval))
    } else {
        tracing::info!("Scraper disabled");
        None
    };

    let state = AppState {
        cycle,
        read_only_trigger: args.read_only_trigger,
    };
    let app = router(state, args.static_dir.clone());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(%addr, "Server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }
    Ok(())
}
