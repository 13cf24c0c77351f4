mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "malinaw")]
#[command(about = "Scrape, parse, and store House of Representatives bill histories")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and parse bill histories for a list of row ids
    Scrape(commands::scrape::ScrapeArgs),
    /// Insert a checkpoint file into the SQLite store
    Upload(commands::upload::UploadArgs),
    /// Parse one saved history modal
    Parse(commands::parse::ParseArgs),
    /// Extract row ids from the bills listing page
    RowIds(commands::row_ids::RowIdsArgs),
    /// List bills in the SQLite store
    Bills(commands::bills::BillsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("malinaw=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_flag(&cli.output);

    match &cli.command {
        Commands::Scrape(args) => commands::scrape::run(args, &format).await?,
        Commands::Upload(args) => commands::upload::run(args, &format)?,
        Commands::Parse(args) => commands::parse::run(args, &format)?,
        Commands::RowIds(args) => commands::row_ids::run(args, &format).await?,
        Commands::Bills(args) => commands::bills::run(args, &format)?,
    }

    Ok(())
}
