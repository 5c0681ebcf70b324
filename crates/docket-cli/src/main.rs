//! Docket CLI - hybrid retrieval over enterprise agreement documents.
//!
//! # Usage
//!
//! ```bash
//! # Index a directory of extracted pages and report partition counts
//! dk ingest ./pages
//!
//! # Search one partition
//! dk search "warranty coverage" --corpus ./pages --partition IBM_PurchaseTerms
//! dk search "payment terms" --corpus ./pages --partition general -n 3 --json
//!
//! # List partitions
//! dk partitions --corpus ./pages
//! ```
//!
//! Indexes live in memory only: every invocation rebuilds from the corpus
//! directory, the same posture the production service takes at startup.

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docket_core::config::{DEFAULT_ALPHA, DEFAULT_TOP_K};
use tracing_subscriber::EnvFilter;

/// Docket hybrid document retrieval CLI.
///
/// Searches extracted agreement pages with combined semantic + keyword
/// ranking, scoped to one document partition per query.
#[derive(Parser)]
#[command(name = "dk", version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index a corpus directory and report per-partition chunk counts
    Ingest {
        /// Directory holding pages.jsonl or <document>.p<N>.txt files
        dir: PathBuf,
    },
    /// Run one hybrid search within a partition
    Search {
        /// Search query
        query: String,

        /// Corpus directory to rebuild the index from
        #[arg(long)]
        corpus: PathBuf,

        /// Partition to search
        #[arg(short, long)]
        partition: String,

        /// Maximum number of results to return
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_K)]
        limit: usize,

        /// Weight of the semantic channel, within [0, 1]
        #[arg(long, default_value_t = DEFAULT_ALPHA)]
        alpha: f32,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
    /// List indexed partitions and their chunk counts
    Partitions {
        /// Corpus directory to rebuild the index from
        #[arg(long)]
        corpus: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Command::Ingest { dir } => commands::run_ingest(&dir).await,
        Command::Search {
            query,
            corpus,
            partition,
            limit,
            alpha,
            json,
        } => commands::run_search(&query, &corpus, &partition, limit, alpha, json).await,
        Command::Partitions { corpus } => commands::run_partitions(&corpus).await,
    }
}
