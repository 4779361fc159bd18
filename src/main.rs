// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Followgraph CLI - graph-store ingestion and cached JSON views

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

mod commands;

use followgraph::config;
use followgraph::service::ViewKind;

#[derive(Parser)]
#[command(name = "followgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "FOLLOWGRAPH_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Graph store URL override
    #[arg(long, env = "NEO4J_URL")]
    store_url: Option<String>,

    /// Cache directory override
    #[arg(long, env = "FOLLOWGRAPH_CACHE_DIR")]
    cache_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Selects a cached view on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ViewArg {
    /// Full bipartite node/link graph
    Nodes,
    /// Longest-path subgraph
    Longest,
}

impl From<ViewArg> for ViewKind {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Nodes => Self::FullGraph,
            ViewArg::Longest => Self::LongestPath,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a CSV edge list into the graph store
    Ingest {
        /// Path to the edge list (rows are repo,<ignored>,user)
        csv: std::path::PathBuf,

        /// Source rows per dispatched batch
        #[arg(long)]
        batch_rows: Option<usize>,

        /// Ingest even if the store already holds nodes
        #[arg(long)]
        force: bool,
    },

    /// Print the full-graph view JSON (computing and caching it if needed)
    Nodes {
        /// Recompute even if a cached payload exists
        #[arg(long)]
        refresh: bool,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Follower threshold override
        #[arg(long)]
        threshold: Option<u64>,
    },

    /// Print the longest-path view JSON (computing and caching it if needed)
    Longest {
        /// Recompute even if a cached payload exists
        #[arg(long)]
        refresh: bool,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Number of paths override
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete cached view payloads
    Invalidate {
        /// View to invalidate (both when omitted)
        view: Option<ViewArg>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(store_url) = cli.store_url {
        config.store_url = store_url;
    }
    if let Some(cache_dir) = cli.cache_dir {
        config.cache_dir = cache_dir;
    }

    // Execute command
    match cli.command {
        Commands::Ingest { csv, batch_rows, force } => {
            if let Some(batch_rows) = batch_rows {
                config.batch_rows = batch_rows;
            }
            commands::ingest::run(&config, &csv, force)
        }
        Commands::Nodes { refresh, pretty, threshold } => {
            if let Some(threshold) = threshold {
                config.follower_threshold = threshold;
            }
            commands::view::run(&config, ViewKind::FullGraph, refresh, pretty)
        }
        Commands::Longest { refresh, pretty, limit } => {
            if let Some(limit) = limit {
                config.path_limit = limit;
            }
            commands::view::run(&config, ViewKind::LongestPath, refresh, pretty)
        }
        Commands::Invalidate { view } => {
            commands::invalidate::run(&config, view.map(ViewKind::from))
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}
