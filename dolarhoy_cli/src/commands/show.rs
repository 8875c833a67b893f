//! The `latest` and `history` subcommands: read the stored history.

use anyhow::{Context, Result};
use clap::Args;
use dolarhoy_lib::{HistoryStore, Latest, ScrapeRecord, ScraperSettings};

use crate::output::{print_history, print_json, print_record, OutputFormat};

#[derive(Args)]
pub struct HistoryArgs {
    /// Show only the last N records
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn latest(settings: &ScraperSettings, format: &OutputFormat) -> Result<()> {
    let store = HistoryStore::new(&settings.data_file);
    match store.latest()? {
        Latest::Record(value) if *format == OutputFormat::Json => print_json(&value),
        Latest::Record(value) => {
            let record: ScrapeRecord = serde_json::from_value(value)
                .context("latest history entry is not a scrape record")?;
            print_record(&record, format)?;
        }
        Latest::Empty => eprintln!("No data available"),
        Latest::Missing => eprintln!("Data file not found: {}", settings.data_file.display()),
    }
    Ok(())
}

pub fn history(args: &HistoryArgs, settings: &ScraperSettings, format: &OutputFormat) -> Result<()> {
    let store = HistoryStore::new(&settings.data_file);
    let records = store.load()?;
    let shown = tail(&records, args.limit);

    if shown.is_empty() {
        eprintln!("No data available");
        return Ok(());
    }
    print_history(shown, format)
}

fn tail<T>(items: &[T], limit: Option<usize>) -> &[T] {
    match limit {
        Some(n) => &items[items.len().saturating_sub(n)..],
        None => items,
    }
}
