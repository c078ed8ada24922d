//! catalog-scraper: collect product listings into a spreadsheet

use anyhow::{Context, Result};
use catalog_scraper::{
    export::{catalog_tables, detail_table},
    progress::LogProgress,
    Aggregator, HttpFetcher, RunStatistics, ScraperConfig, TabularWriter, XlsxWriter,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "catalog-scraper")]
#[command(about = "Scrape catalog categories and product pages into xlsx")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "scraper.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Paginate category pages, one sheet per category
    Catalog {
        /// Category URLs
        urls: Vec<String>,

        /// File with one category URL per line
        #[arg(short, long)]
        links_file: Option<PathBuf>,

        /// Output file (defaults to the configured catalog output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print run statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Harvest product links from one category and scrape every product page
    Start {
        /// Start category URL
        url: String,

        /// Output file (defaults to the configured start output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Delay between product pages in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Print run statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = if cli.config.exists() {
        ScraperConfig::load(&cli.config)?
    } else {
        ScraperConfig::default()
    };

    match cli.command {
        Commands::Catalog {
            urls,
            links_file,
            output,
            json,
        } => {
            let mut seeds = urls;
            if let Some(path) = links_file {
                seeds.extend(read_links(&path)?);
            }
            let output = output.unwrap_or_else(|| PathBuf::from(&config.catalog_output));
            run_catalog(config, &seeds, &output, json)
        }
        Commands::Start {
            url,
            output,
            delay_ms,
            json,
        } => {
            if let Some(delay) = delay_ms {
                config.detail_delay_ms = delay;
            }
            let output = output.unwrap_or_else(|| PathBuf::from(&config.start_output));
            run_start(config, &url, &output, json)
        }
    }
}

fn read_links(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read links file {}", path.display()))?;
    Ok(content.lines().map(String::from).collect())
}

fn run_catalog(config: ScraperConfig, seeds: &[String], output: &Path, json: bool) -> Result<()> {
    let fetcher = HttpFetcher::new(&config);
    let mut aggregator = Aggregator::new(config, fetcher, LogProgress::default())?;
    let report = aggregator.run_catalog(seeds)?;

    XlsxWriter.write_file(&catalog_tables(&report), output)?;
    info!(sheets = report.categories.len(), "catalog export done");
    print_stats(&report.stats, json)
}

fn run_start(config: ScraperConfig, url: &str, output: &Path, json: bool) -> Result<()> {
    let fetcher = HttpFetcher::new(&config);
    let mut aggregator = Aggregator::new(config, fetcher, LogProgress::default())?;
    let report = aggregator.run_start(url)?;

    XlsxWriter.write_file(&[detail_table(&report.records)], output)?;
    info!(products = report.records.len(), "start export done");
    print_stats(&report.stats, json)
}

fn print_stats(stats: &RunStatistics, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("{}", stats.summary());
    if !stats.failed_links.is_empty() {
        println!("Failed links:");
        for link in &stats.failed_links {
            println!("  {link}");
        }
    }
    Ok(())
}
