// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invalidate command - deletes cached view payloads

use anyhow::Result;
use followgraph::cache::ViewCache;
use followgraph::config::Config;
use followgraph::service::ViewKind;
use owo_colors::OwoColorize;

/// Run the invalidate command; both views when `kind` is omitted
pub fn run(config: &Config, kind: Option<ViewKind>) -> Result<()> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => vec![ViewKind::FullGraph, ViewKind::LongestPath],
    };

    for kind in kinds {
        let path = config.cache_dir.join(kind.cache_file());
        let existed = path.exists();
        ViewCache::new(path.clone()).invalidate();
        if existed {
            println!("{} {}", "Deleted".green(), path.display());
        } else {
            println!("No cache at {}", path.display());
        }
    }

    Ok(())
}
