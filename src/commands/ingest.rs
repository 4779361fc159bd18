// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Ingest command - loads the CSV edge list into the graph store

use anyhow::{Context, Result};
use followgraph::cache::ViewCache;
use followgraph::config::Config;
use followgraph::ingest;
use followgraph::service::ViewKind;
use followgraph::store::RestStore;
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::info;

/// Run the ingest command
pub fn run(config: &Config, csv: &Path, force: bool) -> Result<()> {
    info!("Ingesting {} into {}", csv.display(), config.store_url);

    // Fresh data invalidates the served graph
    ViewCache::new(config.cache_dir.join(ViewKind::FullGraph.cache_file())).invalidate();

    let store = RestStore::new(&config.store_url);
    let report = ingest::run(&store, csv, config.batch_rows, force)
        .with_context(|| format!("Failed to ingest {}", csv.display()))?;

    if report.skipped {
        println!("{}", "Nothing to do, store already populated".yellow());
    } else {
        println!(
            "{} {} rows, {} commands in {} batches",
            "Ingested".green(),
            report.rows,
            report.commands,
            report.batches
        );
    }

    Ok(())
}
