// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Graph store collaborator interface
//!
//! The store owns node/relationship storage, index lookups and path-finding;
//! this crate only issues commands and read queries against it. [`RestStore`]
//! speaks the Neo4j REST API; [`MemoryStore`] implements the same semantics
//! in-process for offline use and tests.

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use crate::batch::Batch;
use crate::error::StoreError;
use crate::types::{FollowerRow, PathStep, RepoRow, StoreId};

/// The external graph store, as consumed by ingestion and the view layer.
///
/// Implementations must provide unique-creation semantics: creating a node
/// that already exists under the same `(type, name)` key returns the existing
/// node, and re-creating an existing `follows` edge is a no-op.
pub trait GraphStore {
    /// Send a full batch as one request. Commands execute in order; a
    /// [`crate::batch::BatchRef`] is resolved against positions within this
    /// batch only.
    fn dispatch(&self, batch: Batch) -> Result<(), StoreError>;

    /// Whether the store already holds ingested nodes
    fn is_populated(&self) -> Result<bool, StoreError>;

    /// Repos whose distinct-follower count is strictly greater than
    /// `threshold`, ordered by store id ascending
    fn repos_with_min_followers(&self, threshold: u64) -> Result<Vec<RepoRow>, StoreError>;

    /// Users with a `follows` edge into the given repo
    fn followers_of(&self, repo: StoreId) -> Result<Vec<FollowerRow>, StoreError>;

    /// The `limit` longest simple paths in the undirected follows graph,
    /// longest first, ties broken by store order
    fn longest_paths(&self, limit: usize) -> Result<Vec<Vec<PathStep>>, StoreError>;
}
