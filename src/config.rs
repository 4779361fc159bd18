// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management

use crate::batch::DEFAULT_BATCH_ROWS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Repos need strictly more followers than this to appear in the full view
pub const DEFAULT_FOLLOWER_THRESHOLD: u64 = 2;

/// Number of longest paths returned by the longest-path view
pub const DEFAULT_PATH_LIMIT: usize = 5;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the graph store REST endpoint
    pub store_url: String,
    /// Directory holding the view cache files
    pub cache_dir: PathBuf,
    /// Source rows accumulated before a batch is flushed
    pub batch_rows: usize,
    /// Follower threshold for the full-graph view
    pub follower_threshold: u64,
    /// Path count for the longest-path view
    pub path_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: std::env::var("NEO4J_URL")
                .unwrap_or_else(|_| "http://localhost:7474".to_string()),
            cache_dir: directories::ProjectDirs::from("org", "hyperpolymath", "followgraph")
                .map(|d| d.cache_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".followgraph")),
            batch_rows: DEFAULT_BATCH_ROWS,
            follower_threshold: DEFAULT_FOLLOWER_THRESHOLD,
            path_limit: DEFAULT_PATH_LIMIT,
        }
    }
}

/// Load configuration from an optional TOML file, falling back to defaults
pub fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}
