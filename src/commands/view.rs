// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! View command - prints a cached view's JSON payload to stdout

use anyhow::{Context, Result};
use followgraph::config::Config;
use followgraph::service::{ViewKind, ViewService};
use followgraph::store::RestStore;
use followgraph::views::GraphView;
use std::io::Write;

/// Run the nodes/longest command for the given view kind
pub fn run(config: &Config, kind: ViewKind, refresh: bool, pretty: bool) -> Result<()> {
    let store = RestStore::new(&config.store_url);
    let mut service = ViewService::new(
        &store,
        &config.cache_dir,
        config.follower_threshold,
        config.path_limit,
    );

    let payload = match kind {
        ViewKind::FullGraph => service.full_graph(refresh),
        ViewKind::LongestPath => service.longest_path(refresh),
    }
    .context("Failed to produce view")?;

    let mut stdout = std::io::stdout().lock();
    if pretty {
        let view: GraphView =
            serde_json::from_slice(&payload).context("Cached view payload is not valid JSON")?;
        serde_json::to_writer_pretty(&mut stdout, &view)?;
    } else {
        stdout.write_all(&payload)?;
    }
    stdout.write_all(b"\n")?;

    Ok(())
}
