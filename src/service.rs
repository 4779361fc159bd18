// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! View service - compute-or-serve for the two cached views

use crate::cache::ViewCache;
use crate::error::ViewError;
use crate::store::GraphStore;
use crate::types::{FollowerRow, RepoRow};
use crate::views::{assemble_full_graph, assemble_longest_path, GraphView};
use std::path::Path;
use tracing::debug;

/// The two derived views this crate serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Full bipartite node/link graph
    FullGraph,
    /// Longest-path subgraph
    LongestPath,
}

impl ViewKind {
    /// Cache file name for this view
    #[must_use]
    pub fn cache_file(self) -> &'static str {
        match self {
            Self::FullGraph => "nodes_cache.json",
            Self::LongestPath => "longest_path_cache.json",
        }
    }
}

/// Serves the derived views, caching each as a JSON file
pub struct ViewService<'a, S: GraphStore> {
    store: &'a S,
    full_graph: ViewCache,
    longest_path: ViewCache,
    follower_threshold: u64,
    path_limit: usize,
}

impl<'a, S: GraphStore> ViewService<'a, S> {
    /// Bind the service to a store and a cache directory
    pub fn new(store: &'a S, cache_dir: &Path, follower_threshold: u64, path_limit: usize) -> Self {
        Self {
            store,
            full_graph: ViewCache::new(cache_dir.join(ViewKind::FullGraph.cache_file())),
            longest_path: ViewCache::new(cache_dir.join(ViewKind::LongestPath.cache_file())),
            follower_threshold,
            path_limit,
        }
    }

    /// Serve the full-graph view as JSON bytes
    pub fn full_graph(&mut self, force_refresh: bool) -> Result<Vec<u8>, ViewError> {
        if force_refresh {
            self.full_graph.invalidate();
        }
        let store = self.store;
        let threshold = self.follower_threshold;
        self.full_graph
            .serve(|| compute_full_graph(store, threshold))
    }

    /// Serve the longest-path view as JSON bytes
    pub fn longest_path(&mut self, force_refresh: bool) -> Result<Vec<u8>, ViewError> {
        if force_refresh {
            self.longest_path.invalidate();
        }
        let store = self.store;
        let limit = self.path_limit;
        self.longest_path
            .serve(|| Ok(assemble_longest_path(&store.longest_paths(limit)?)))
    }

    /// Drop the cached payload for one view
    pub fn invalidate(&mut self, kind: ViewKind) {
        match kind {
            ViewKind::FullGraph => self.full_graph.invalidate(),
            ViewKind::LongestPath => self.longest_path.invalidate(),
        }
    }

    /// Drop both cached payloads
    pub fn invalidate_all(&mut self) {
        self.full_graph.invalidate();
        self.longest_path.invalidate();
    }
}

fn compute_full_graph<S: GraphStore>(store: &S, threshold: u64) -> Result<GraphView, ViewError> {
    let repos = store.repos_with_min_followers(threshold)?;
    debug!("full graph: {} repos over threshold {}", repos.len(), threshold);

    let mut repos_with_followers: Vec<(RepoRow, Vec<FollowerRow>)> =
        Vec::with_capacity(repos.len());
    for repo in repos {
        let followers = store.followers_of(repo.id)?;
        repos_with_followers.push((repo, followers));
    }

    Ok(assemble_full_graph(&repos_with_followers))
}
