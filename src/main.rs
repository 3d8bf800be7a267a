use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use shelfscrape::export::{ExportStats, ReportSummary};
use shelfscrape::logging::init_logging;
use shelfscrape::{AppConfig, CategoryStatsMap, ShelfScrape};

#[derive(Parser)]
#[command(name = "shelfscrape")]
#[command(about = "Crawl a book catalog into per-category datasets and price statistics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(short, long, global = true, help = "Configuration file path")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every category, aggregate and export
    Crawl {
        #[arg(short, long, help = "Output root directory")]
        output: Option<PathBuf>,

        #[arg(long, help = "Append to existing datasets instead of starting clean")]
        keep_existing: bool,

        #[arg(long, help = "Skip cover image downloads")]
        no_images: bool,
    },

    /// Aggregate existing datasets for the given categories
    Stats {
        #[arg(required = true, help = "Category names, e.g. travel mystery")]
        categories: Vec<String>,

        #[arg(short, long, help = "Output root directory")]
        output: Option<PathBuf>,
    },

    /// Aggregate every existing dataset and write the report exports
    Report {
        #[arg(short, long, help = "Output root directory")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path).await?,
        None => AppConfig::load().await?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    match cli.command {
        Commands::Crawl { output, keep_existing, no_images } => {
            if let Some(root) = output {
                config.output.root = root;
            }
            if keep_existing {
                config.output.clean_on_start = false;
            }
            if no_images {
                config.scraping.download_images = false;
            }
            init_logging(&config.logging)?;
            crawl(ShelfScrape::new(config)?).await?;
        }
        Commands::Stats { categories, output } => {
            if let Some(root) = output {
                config.output.root = root;
            }
            init_logging(&config.logging)?;
            let app = ShelfScrape::new(config)?;
            print_stats(&app.aggregate(&categories));
        }
        Commands::Report { output } => {
            if let Some(root) = output {
                config.output.root = root;
            }
            init_logging(&config.logging)?;
            let app = ShelfScrape::new(config)?;
            let stats = app.aggregate_existing()?;
            print_stats(&stats);
            print_exports(&app.export(&stats).await?);
        }
    }

    Ok(())
}

async fn crawl(app: ShelfScrape) -> Result<()> {
    info!("shelfscrape v{} crawling {}", env!("CARGO_PKG_VERSION"), app.config().site.base_url);
    let started = std::time::Instant::now();

    let stats = app.crawl_all().await?;
    print_stats(&stats);
    print_exports(&app.export(&stats).await?);

    let http = app.http_stats().await;
    println!(
        "\n{} requests ({} failed, peak {} in flight), {} bytes, finished in {}",
        http.total_requests,
        http.error_count,
        http.peak_in_flight,
        http.total_bytes_transferred,
        shelfscrape::utils::format_duration(started.elapsed())
    );
    Ok(())
}

fn print_stats(stats: &CategoryStatsMap) {
    println!("{:<28} {:>8} {:>14}", "Category", "Books", "Avg price (£)");
    println!("{}", "-".repeat(52));
    for (name, entry) in stats {
        println!("{:<28} {:>8} {:>14.2}", name, entry.count, entry.average_price);
    }

    let summary = ReportSummary::from_stats(stats);
    println!("{}", "-".repeat(52));
    println!("Most books:       {}", summary.most_records.as_deref().unwrap_or("-"));
    println!("Highest average:  {}", summary.highest_average.as_deref().unwrap_or("-"));
    println!("Overall average:  £{:.2}", summary.overall_average);
}

fn print_exports(exports: &[ExportStats]) {
    for export in exports {
        println!("Wrote {} ({} bytes)", export.file_path.display(), export.file_size_bytes);
    }
}
