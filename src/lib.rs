// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Followgraph library - batched graph-store ingestion and cached JSON views
//!
//! This crate turns a CSV edge list of "repository contributed-to-by user"
//! relationships into deduplicated, bounded batches of graph-store commands,
//! and serves two derived JSON views of the resulting graph (the full
//! bipartite graph and a longest-path subgraph), caching each view as a file.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod service;
pub mod source;
pub mod store;
pub mod views;

/// Core data types shared between ingestion and view serving
pub mod types {
    use serde::{Deserialize, Serialize};

    /// Identifier assigned by the graph store on node creation. Opaque to
    /// this crate beyond ordering.
    pub type StoreId = u64;

    /// The two node types of the bipartite contribution graph
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum NodeType {
        /// A contributing user
        User,
        /// A contributed-to repository
        Repo,
    }

    impl NodeType {
        /// Index/label name for this node type
        #[must_use]
        pub fn as_str(self) -> &'static str {
            match self {
                Self::User => "user",
                Self::Repo => "repo",
            }
        }

        /// Display group for the force-graph front end (repos 1, users 2)
        #[must_use]
        pub fn group(self) -> u32 {
            match self {
                Self::User => 2,
                Self::Repo => 1,
            }
        }
    }

    /// A repo row from the followers query
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RepoRow {
        /// Store-assigned node id
        pub id: StoreId,
        /// Repo name
        pub name: String,
        /// Distinct `follows` edges into this repo
        pub followers: u64,
    }

    /// A user row from the per-repo relationship query
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FollowerRow {
        /// Store-assigned node id
        pub id: StoreId,
        /// User name
        pub name: String,
    }

    /// One node along a returned path
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PathStep {
        /// Store-assigned node id
        pub id: StoreId,
        /// Node name
        pub name: String,
        /// Node type
        pub node_type: NodeType,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{IngestError, SourceReadError, StoreError, ViewError};
    pub use crate::store::GraphStore;
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
