// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing-subscriber, to stderr)
// 3. Build the fetcher for the chosen subcommand
// 4. Run the crawl, streaming results as they arrive
// 5. Exit with proper code (0 = every fetch worked, 1 = some failed,
//    2 = could not start)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, CrawlArgs};
use frontier_crawl::{
    ConsoleSink, CrawlOptions, CrawlSink, CrawlStats, Crawler, Fetcher, FixtureFetcher,
    HttpFetcher, JsonLinesSink, StatsSink,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Demo { seed, fixture, crawl } => {
            let fetcher = match fixture {
                Some(path) => FixtureFetcher::from_json_file(&path)
                    .with_context(|| format!("cannot use fixture {}", path.display()))?,
                None => FixtureFetcher::golang_tour(),
            };
            run_crawl(fetcher, &seed, &crawl).await
        }
        Commands::Site { website_url, any_domain, crawl } => {
            let fetcher = HttpFetcher::new(&website_url, !any_domain)?;
            // Same spelling the fetcher gives discovered links, so the seed
            // page is not claimed twice ("https://x.com" vs "https://x.com/")
            let seed = fetcher.seed().to_string();
            run_crawl(fetcher, &seed, &crawl).await
        }
    }
}

async fn run_crawl(fetcher: impl Fetcher + 'static, seed: &str, args: &CrawlArgs) -> Result<i32> {
    let options = args.options();
    watch_ctrl_c(options.shutdown_flag());

    let stats = if args.json {
        crawl_into(fetcher, JsonLinesSink, seed, options).await
    } else {
        crawl_into(fetcher, ConsoleSink::default(), seed, options).await
    };

    // Summary goes to stderr so --json output stays machine-readable
    eprintln!();
    eprintln!("📊 Summary:");
    eprintln!("   ✅ Found: {}", stats.found);
    eprintln!("   ❌ Failed: {}", stats.failed);
    eprintln!("   📋 Total: {}", stats.total());

    Ok(if stats.failed > 0 { 1 } else { 0 })
}

async fn crawl_into<S: CrawlSink + 'static>(
    fetcher: impl Fetcher + 'static,
    sink: S,
    seed: &str,
    options: CrawlOptions,
) -> CrawlStats {
    let sink = Arc::new(StatsSink::new(sink));
    Crawler::new(fetcher)
        .with_sink(Arc::clone(&sink))
        .with_options(options)
        .run(seed)
        .await;
    sink.stats()
}

// First Ctrl-C stops new work; the crawl then finishes on its own
fn watch_ctrl_c(shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, letting in-flight fetches finish");
            shutdown.store(true, Ordering::Relaxed);
        }
    });
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("frontier_crawl=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("frontier_crawl=info,warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
