// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! View cache manager - file-backed cache with an explicit state machine
//!
//! Each view kind owns one cache file. The state enum is authoritative within
//! a process; the file is backing storage, re-probed on construction so a
//! cache survives restarts. Concurrent misses are not coordinated: two
//! processes may both compute and write, last write wins, which is acceptable
//! because recomputation is deterministic for a given store state.

use crate::error::ViewError;
use crate::views::GraphView;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Cache lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No cached payload exists
    Absent,
    /// A computation for this view is in flight in this process
    Populating,
    /// The cache file holds the canonical payload
    Present,
}

/// A single view's file-backed cache
#[derive(Debug)]
pub struct ViewCache {
    path: PathBuf,
    state: CacheState,
}

impl ViewCache {
    /// Bind a cache to its backing file, adopting the file if it exists
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let state = if path.exists() {
            CacheState::Present
        } else {
            CacheState::Absent
        };
        Self { path, state }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Backing file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serve the cached payload, or compute, persist and serve a fresh one.
    ///
    /// A persistence failure is logged and the computed payload is still
    /// returned; caching is best-effort.
    pub fn serve<F>(&mut self, compute: F) -> Result<Vec<u8>, ViewError>
    where
        F: FnOnce() -> Result<GraphView, ViewError>,
    {
        if self.state == CacheState::Present {
            debug!("cache hit: {}", self.path.display());
            return fs::read(&self.path).map_err(|source| ViewError::CacheRead {
                path: self.path.clone(),
                source,
            });
        }

        self.state = CacheState::Populating;
        let view = match compute() {
            Ok(view) => view,
            Err(err) => {
                self.state = CacheState::Absent;
                return Err(err);
            }
        };
        let payload = serde_json::to_vec(&view).expect("view serialization is infallible");

        match self.persist(&payload) {
            Ok(()) => self.state = CacheState::Present,
            Err(err) => {
                warn!("cannot persist view cache {}: {err}", self.path.display());
                self.state = CacheState::Absent;
            }
        }

        Ok(payload)
    }

    fn persist(&self, payload: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, payload)
    }

    /// Drop the cached payload, deleting the backing file if present
    pub fn invalidate(&mut self) {
        if self.path.exists() {
            if let Err(err) = fs::remove_file(&self.path) {
                warn!("cannot delete view cache {}: {err}", self.path.display());
            }
        }
        self.state = CacheState::Absent;
    }
}
