//! The `scrape` subcommand: one cycle, then print the record.

use anyhow::{Context, Result};
use clap::Args;
use dolarhoy_lib::{ScrapeCycle, ScraperSettings, SiteRenderer};

use crate::output::{print_record, OutputFormat};

#[derive(Args)]
pub struct ScrapeArgs {
    /// Extract and print without appending to the history file
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(args: &ScrapeArgs, settings: &ScraperSettings, format: &OutputFormat) -> Result<()> {
    let cycle = ScrapeCycle::from_settings(SiteRenderer::from_settings(settings), settings);

    let result = if args.dry_run {
        cycle.preview().await
    } else {
        cycle.run().await
    };
    let record = result.with_context(|| format!("scrape of {} failed", settings.url))?;

    if !args.dry_run {
        eprintln!("Saved to {}", settings.data_file.display());
    }
    print_record(&record, format)
}
