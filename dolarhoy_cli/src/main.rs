mod commands;
mod output;
mod routes;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::SettingsArgs;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "dolarhoy")]
#[command(about = "Scrape and serve Argentine peso exchange rates from DolarHoy")]
struct Cli {
    /// Output format: table, json, csv, markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scrape cycle and append the result to the history
    Scrape(commands::scrape::ScrapeArgs),
    /// Scrape now and then on a fixed period until Ctrl-C
    Watch(commands::watch::WatchArgs),
    /// Serve the read API (and optionally the scheduler)
    Serve(commands::serve::ServeArgs),
    /// Show the most recent stored record
    Latest,
    /// Show stored records
    History(commands::show::HistoryArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dolarhoy=info".parse()?)
                .add_directive("dolarhoy_lib=info".parse()?)
                .add_directive("dolarhoy_page=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "md" | "markdown" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let settings = cli.settings.resolve()?;

    match &cli.command {
        Commands::Scrape(args) => commands::scrape::run(args, &settings, &format).await?,
        Commands::Watch(args) => commands::watch::run(args, settings).await?,
        Commands::Serve(args) => commands::serve::run(args, settings).await?,
        Commands::Latest => commands::show::latest(&settings, &format)?,
        Commands::History(args) => commands::show::history(args, &settings, &format)?,
    }

    Ok(())
}
