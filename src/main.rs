//! imgcrawl - crawl a site graph for images and compare scheduling strategies.
//!
//! Usage:
//!   imgcrawl crawl <MANIFEST> --root <LOC>     Crawl with one strategy
//!   imgcrawl compare <MANIFEST> --root <LOC>   Crawl with every strategy
//!   imgcrawl --help                            Show help

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use strum::IntoEnumIterator;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use imgcrawl_core::{CrawlOptions, Platform, StrategyKind};
use imgcrawl_engine::{CrawlEvent, CrawlReport, ImageCrawler};
use imgcrawl_site::{MemoryPlatform, SiteGraph};
use imgcrawl_transform::{TransformKind, TransformPipeline};

#[derive(Parser)]
#[command(
    name = "imgcrawl",
    version,
    about = "Image crawler with interchangeable scheduling strategies",
    long_about = "imgcrawl walks a site graph described by a JSON manifest, \
                  downloads every image it finds and runs each one through a \
                  transform pipeline.\n\n\
                  Use `crawl` to run one strategy or `compare` to check that \
                  all strategies agree."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl with one strategy and print a report
    Crawl {
        #[command(flatten)]
        crawl: CrawlArgs,

        /// Scheduling strategy (sequential, fork-join, future-pipeline)
        #[arg(short, long, default_value = "sequential")]
        strategy: StrategyKind,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Crawl with every strategy and check the counts agree
    Compare {
        #[command(flatten)]
        crawl: CrawlArgs,
    },
}

#[derive(Args)]
struct CrawlArgs {
    /// Site manifest (JSON)
    manifest: PathBuf,

    /// Location to start crawling from
    #[arg(short, long)]
    root: String,

    /// Maximum link depth (the root is depth 0)
    #[arg(short, long, default_value = "3")]
    depth: u32,

    /// Transforms to apply, comma separated (identity, grayscale, tint)
    #[arg(short, long, value_delimiter = ',', default_value = "identity")]
    transforms: Vec<TransformKind>,

    /// Directory transformed images are stored under
    #[arg(long, default_value = "downloaded-images")]
    download_path: PathBuf,

    /// Worker threads for pooled strategies (0 = pool default)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Emit per-call crawl traces
    #[arg(long)]
    diagnostics: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let diagnostics = match &cli.command {
        Command::Crawl { crawl, .. } | Command::Compare { crawl } => crawl.diagnostics,
    };
    let default_level = if diagnostics { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Crawl {
            crawl,
            strategy,
            format,
        } => run_crawl(&crawl, strategy, format),
        Command::Compare { crawl } => run_compare(&crawl),
    }
}

/// Outcome of one strategy run.
struct RunSummary {
    report: CrawlReport,
    failures: usize,
    stored_bytes: u64,
}

/// Crawl once with `strategy` against a fresh site and platform.
fn crawl_once(args: &CrawlArgs, strategy: StrategyKind) -> Result<RunSummary> {
    let site = Arc::new(load_site(&args.manifest)?);
    let platform = Arc::new(MemoryPlatform::new(
        Arc::clone(&site),
        args.download_path.clone(),
    ));

    let options = CrawlOptions::builder()
        .root(args.root.as_str())
        .max_depth(args.depth)
        .download_path(args.download_path.clone())
        .strategy(strategy)
        .threads(args.threads)
        .diagnostics(args.diagnostics)
        .build()
        .context("Invalid crawl options")?;

    let storage: Arc<dyn Platform> = platform.clone();
    let crawler = ImageCrawler::builder()
        .options(options)
        .fetcher(site)
        .platform(storage)
        .pipeline(TransformPipeline::from_kinds(&args.transforms))
        .build()
        .context("Failed to set up crawler")?;
    debug!(?crawler, "crawler ready");

    let failures = count_failures(crawler.subscribe());
    let report = crawler.run().context("Crawl failed")?;
    drop(crawler);

    let failures = failures.join().unwrap_or(0);
    Ok(RunSummary {
        report,
        failures,
        stored_bytes: platform.stored_bytes(),
    })
}

/// Count unit failures on a background thread until the crawler is dropped.
fn count_failures(
    mut events: tokio::sync::broadcast::Receiver<CrawlEvent>,
) -> JoinHandle<usize> {
    thread::spawn(move || {
        let mut failures = 0;
        loop {
            match events.blocking_recv() {
                Ok(CrawlEvent::UnitFailed { .. }) => failures += 1,
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => debug!(missed, "progress events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
        failures
    })
}

/// Run one strategy and print its report.
fn run_crawl(args: &CrawlArgs, strategy: StrategyKind, format: OutputFormat) -> Result<()> {
    info!(manifest = %args.manifest.display(), %strategy, "crawling");
    let summary = crawl_once(args, strategy)?;
    let report = &summary.report;

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(60));
            println!(" {} ({})", report.root, report.strategy);
            println!("{}", "─".repeat(60));
            println!(" Images processed:   {}", report.images_processed);
            println!(" Pages visited:      {}", report.pages_visited);
            println!(" Transforms claimed: {}", report.transforms_claimed);
            println!(" Stored:             {}", format_size(summary.stored_bytes));
            println!(" Unit failures:      {}", summary.failures);
            println!(
                " Crawled in {:.2}s ({:.0} images/s)",
                report.elapsed.as_secs_f64(),
                report.images_per_second()
            );
            println!("{}", "─".repeat(60));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }

    Ok(())
}

/// Run every strategy and check that they count the same images.
fn run_compare(args: &CrawlArgs) -> Result<()> {
    info!(manifest = %args.manifest.display(), "comparing strategies");

    let mut summaries = Vec::new();
    for strategy in StrategyKind::iter() {
        summaries.push(crawl_once(args, strategy)?);
    }

    println!();
    println!(
        " {:<18} {:>8} {:>8} {:>10} {:>10}",
        "Strategy", "Images", "Pages", "Failures", "Time"
    );
    println!("{}", "─".repeat(60));
    for summary in &summaries {
        let report = &summary.report;
        println!(
            " {:<18} {:>8} {:>8} {:>10} {:>9.2}s",
            report.strategy.to_string(),
            report.images_processed,
            report.pages_visited,
            summary.failures,
            report.elapsed.as_secs_f64()
        );
    }
    println!("{}", "─".repeat(60));

    let expected = summaries
        .first()
        .map(|summary| summary.report.images_processed)
        .unwrap_or(0);
    if summaries
        .iter()
        .any(|summary| summary.report.images_processed != expected)
    {
        bail!("Strategies disagree on the image count");
    }
    println!(" All strategies counted {expected} images.");

    Ok(())
}

fn load_site(manifest: &Path) -> Result<SiteGraph> {
    SiteGraph::from_json_file(manifest)
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))
}

/// Format bytes as human-readable size.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
