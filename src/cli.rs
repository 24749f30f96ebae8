// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - demo: crawl an in-memory graph (the built-in sample, or a JSON fixture)
// - site: crawl a real website over HTTP
//
// Both share the same output and tuning flags (CrawlArgs).
// =============================================================================

use clap::{Args, Parser, Subcommand};
use frontier_crawl::CrawlOptions;
use std::path::PathBuf;

// Seed of the built-in sample graph
pub const DEMO_SEED: &str = "http://golang.org/";

#[derive(Parser, Debug)]
#[command(
    name = "frontier-crawl",
    version,
    about = "Concurrently crawl every node reachable from a seed, visiting each exactly once",
    long_about = "frontier-crawl explores a link graph starting from one seed. Every discovered \
                  node gets its own task; each node is fetched at most once, and the run ends \
                  by itself when nothing is left in flight."
)]
pub struct Cli {
    /// Show debug logs (worker spawns, claims, completions)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl an in-memory graph
    ///
    /// Example: frontier-crawl demo --fixture graph.json --seed root
    Demo {
        /// Identifier to start from
        #[arg(long, default_value = DEMO_SEED)]
        seed: String,

        /// JSON file mapping identifiers to {"body": ..., "urls": [...]}.
        /// Without it, the built-in golang.org sample is used.
        #[arg(long)]
        fixture: Option<PathBuf>,

        #[command(flatten)]
        crawl: CrawlArgs,
    },

    /// Crawl a website over HTTP
    ///
    /// Example: frontier-crawl site https://example.com --max-in-flight 8
    Site {
        /// Website URL to start from (e.g., https://example.com)
        website_url: String,

        /// Follow links to other domains too (by default the crawl stays on
        /// the seed's domain)
        #[arg(long)]
        any_domain: bool,

        #[command(flatten)]
        crawl: CrawlArgs,
    },
}

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Output results as JSON lines instead of text
    #[arg(long)]
    pub json: bool,

    /// Bound the pending queue; discovery pauses while it is full
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub queue_capacity: Option<u64>,

    /// Maximum number of fetches running at the same time
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_in_flight: Option<u64>,
}

impl CrawlArgs {
    pub fn options(&self) -> CrawlOptions {
        CrawlOptions {
            queue_capacity: self.queue_capacity.map(|n| n as usize),
            max_in_flight: self.max_in_flight.map(|n| n as usize),
            ..CrawlOptions::default()
        }
    }
}
