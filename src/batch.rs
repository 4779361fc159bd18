// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Batch command builder - turns edges into bounded batches of store commands
//!
//! Commands within a batch may reference the result of an earlier command in
//! the same batch through a [`BatchRef`]. A `BatchRef` is only meaningful
//! inside the batch that issued it; the dispatching store resolves it to a
//! wire position at send time.

use crate::ledger::DedupLedger;
use crate::source::EdgeRecord;
use crate::types::NodeType;

/// Index holding one entry per node type, used for typed view queries
pub const NODES_INDEX: &str = "nodes_index";

/// Default number of source rows accumulated before a batch is flushed
pub const DEFAULT_BATCH_ROWS: usize = 1000;

/// Opaque reference to an earlier command's result within the same batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRef(usize);

impl BatchRef {
    /// Wire position of the referenced command, for dispatch-time resolution
    #[must_use]
    pub fn position(self) -> usize {
        self.0
    }
}

/// A single store command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a node keyed by name, or return the existing one
    CreateUniqueNode {
        /// Node type, also the unique-index the store keys the node under
        node_type: NodeType,
        /// Node name, the unique key value
        name: String,
    },
    /// Register a just-created node under the type index
    AddToIndex {
        /// Node type recorded as the index value
        node_type: NodeType,
        /// The create command whose resulting node is being indexed
        target: BatchRef,
    },
    /// Locate user and repo by index lookup and create-unique a `follows` edge.
    ///
    /// Does not chain the unique-create results above: the store's
    /// unique-create does not return a reference usable in a relationship
    /// command, so endpoints are re-resolved by name.
    RelateFollows {
        /// Follower user name
        user: String,
        /// Followed repo name
        repo: String,
    },
}

/// An ordered group of commands sent to the store as one request
#[derive(Debug, Default)]
pub struct Batch {
    commands: Vec<Command>,
}

impl Batch {
    /// Create an empty batch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command, returning a reference valid within this batch only
    pub fn push(&mut self, command: Command) -> BatchRef {
        self.commands.push(command);
        BatchRef(self.commands.len() - 1)
    }

    /// Commands in emission order
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of commands accumulated
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the batch holds no commands
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Hand off the accumulated commands, leaving this batch empty
    pub fn take(&mut self) -> Batch {
        Batch {
            commands: std::mem::take(&mut self.commands),
        }
    }
}

/// Append the command sequence for one `(repo, user)` edge.
///
/// Emission order per edge: user node, user index-add (first sighting only),
/// repo node, repo index-add (first sighting only), follows query. Node
/// creation is never suppressed; the ledger only avoids redundant index-adds.
pub fn push_edge(batch: &mut Batch, ledger: &mut DedupLedger, edge: &EdgeRecord) {
    let user_ref = batch.push(Command::CreateUniqueNode {
        node_type: NodeType::User,
        name: edge.user.clone(),
    });
    if ledger.first_sighting(NodeType::User, &edge.user) {
        batch.push(Command::AddToIndex {
            node_type: NodeType::User,
            target: user_ref,
        });
    }

    let repo_ref = batch.push(Command::CreateUniqueNode {
        node_type: NodeType::Repo,
        name: edge.repo.clone(),
    });
    if ledger.first_sighting(NodeType::Repo, &edge.repo) {
        batch.push(Command::AddToIndex {
            node_type: NodeType::Repo,
            target: repo_ref,
        });
    }

    batch.push(Command::RelateFollows {
        user: edge.user.clone(),
        repo: edge.repo.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(repo: &str, user: &str) -> EdgeRecord {
        EdgeRecord {
            repo: repo.into(),
            user: user.into(),
        }
    }

    #[test]
    fn test_first_edge_emits_five_commands() {
        let mut batch = Batch::new();
        let mut ledger = DedupLedger::new();

        push_edge(&mut batch, &mut ledger, &edge("rails", "dhh"));

        let commands = batch.commands();
        assert_eq!(commands.len(), 5);
        assert!(matches!(
            &commands[0],
            Command::CreateUniqueNode { node_type: NodeType::User, name } if name == "dhh"
        ));
        assert!(matches!(
            &commands[1],
            Command::AddToIndex { node_type: NodeType::User, target } if target.position() == 0
        ));
        assert!(matches!(
            &commands[2],
            Command::CreateUniqueNode { node_type: NodeType::Repo, name } if name == "rails"
        ));
        assert!(matches!(
            &commands[3],
            Command::AddToIndex { node_type: NodeType::Repo, target } if target.position() == 2
        ));
        assert!(matches!(
            &commands[4],
            Command::RelateFollows { user, repo } if user == "dhh" && repo == "rails"
        ));
    }

    #[test]
    fn test_repeat_names_skip_index_adds_but_not_creates() {
        let mut batch = Batch::new();
        let mut ledger = DedupLedger::new();

        push_edge(&mut batch, &mut ledger, &edge("rails", "dhh"));
        push_edge(&mut batch, &mut ledger, &edge("rails", "dhh"));

        // Second edge: create user, create repo, relate. No index-adds.
        assert_eq!(batch.len(), 8);
        let index_adds = batch
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::AddToIndex { .. }))
            .count();
        assert_eq!(index_adds, 2);
    }

    #[test]
    fn test_index_add_targets_stay_in_sync_after_skips() {
        let mut batch = Batch::new();
        let mut ledger = DedupLedger::new();

        push_edge(&mut batch, &mut ledger, &edge("a", "u1"));
        push_edge(&mut batch, &mut ledger, &edge("b", "u1"));

        // Second edge: u1 create at 5 (no index-add), b create at 6, its
        // index-add must reference position 6.
        assert!(matches!(
            &batch.commands()[7],
            Command::AddToIndex { node_type: NodeType::Repo, target } if target.position() == 6
        ));
    }

    #[test]
    fn test_take_leaves_batch_empty() {
        let mut batch = Batch::new();
        let mut ledger = DedupLedger::new();
        push_edge(&mut batch, &mut ledger, &edge("a", "u"));

        let flushed = batch.take();
        assert_eq!(flushed.len(), 5);
        assert!(batch.is_empty());
    }
}
