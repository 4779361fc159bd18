// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Dedup ledger - tracks names already materialized during one ingestion run
//!
//! The ledger only gates index-add commands. Node creation always goes through
//! because the store's unique-creation primitive deduplicates nodes itself.

use crate::types::NodeType;
use std::collections::HashSet;

/// Per-run record of which user and repo names have been seen
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen_users: HashSet<String>,
    seen_repos: HashSet<String>,
}

impl DedupLedger {
    /// Create an empty ledger for a fresh ingestion run
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once per `(node_type, name)` pair, marking it seen
    pub fn first_sighting(&mut self, node_type: NodeType, name: &str) -> bool {
        let set = match node_type {
            NodeType::User => &mut self.seen_users,
            NodeType::Repo => &mut self.seen_repos,
        };
        if set.contains(name) {
            false
        } else {
            set.insert(name.to_string());
            true
        }
    }

    /// Number of distinct names seen for a node type
    #[must_use]
    pub fn distinct(&self, node_type: NodeType) -> usize {
        match node_type {
            NodeType::User => self.seen_users.len(),
            NodeType::Repo => self.seen_repos.len(),
        }
    }
}
