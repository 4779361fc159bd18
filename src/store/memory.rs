// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! In-memory graph store
//!
//! Implements the same unique-creation, index and query semantics as the REST
//! store, entirely in-process. Used for offline experimentation and as the
//! test double for ingestion and view tests.

use crate::batch::{Batch, Command};
use crate::error::StoreError;
use crate::types::{FollowerRow, NodeType, PathStep, RepoRow, StoreId};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    /// Node storage; a node's store id is its position here
    nodes: Vec<(NodeType, String)>,
    /// Unique-creation key: one node per (type, name)
    by_key: HashMap<(NodeType, String), StoreId>,
    /// Type-index membership (only indexed nodes are visible to queries)
    type_index: BTreeMap<NodeType, BTreeSet<StoreId>>,
    /// Directed follows edges, user id -> repo id
    follows: BTreeSet<(StoreId, StoreId)>,
}

impl Inner {
    fn get_or_create(&mut self, node_type: NodeType, name: &str) -> StoreId {
        let key = (node_type, name.to_string());
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = self.nodes.len() as StoreId;
        self.nodes.push((node_type, name.to_string()));
        self.by_key.insert(key, id);
        id
    }

    fn lookup(&self, node_type: NodeType, name: &str) -> Result<StoreId, StoreError> {
        self.by_key
            .get(&(node_type, name.to_string()))
            .copied()
            .ok_or_else(|| {
                StoreError::Query(format!("no {} node named {name}", node_type.as_str()))
            })
    }

    fn indexed(&self, node_type: NodeType) -> impl Iterator<Item = StoreId> + '_ {
        self.type_index
            .get(&node_type)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

/// In-process [`GraphStore`](super::GraphStore) implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total nodes held, for test assertions
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.lock().expect("store lock").nodes.len()
    }

    /// Total follows edges held, for test assertions
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.lock().expect("store lock").follows.len()
    }

    /// Entries registered under the type index for `node_type`
    #[must_use]
    pub fn indexed_count(&self, node_type: NodeType) -> usize {
        self.inner
            .lock()
            .expect("store lock")
            .type_index
            .get(&node_type)
            .map_or(0, BTreeSet::len)
    }
}

impl super::GraphStore for MemoryStore {
    fn dispatch(&self, batch: Batch) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");

        // Result slots for positional references, one per command
        let mut created: Vec<Option<StoreId>> = Vec::with_capacity(batch.len());

        for command in batch.commands() {
            let result = match command {
                Command::CreateUniqueNode { node_type, name } => {
                    Some(inner.get_or_create(*node_type, name))
                }
                Command::AddToIndex { node_type, target } => {
                    let id = created
                        .get(target.position())
                        .copied()
                        .flatten()
                        .ok_or_else(|| {
                            StoreError::Query(format!(
                                "batch reference {{{}}} does not name a created node",
                                target.position()
                            ))
                        })?;
                    inner.type_index.entry(*node_type).or_default().insert(id);
                    None
                }
                Command::RelateFollows { user, repo } => {
                    let user_id = inner.lookup(NodeType::User, user)?;
                    let repo_id = inner.lookup(NodeType::Repo, repo)?;
                    inner.follows.insert((user_id, repo_id));
                    None
                }
            };
            created.push(result);
        }

        Ok(())
    }

    fn is_populated(&self) -> Result<bool, StoreError> {
        Ok(!self.inner.lock().expect("store lock").nodes.is_empty())
    }

    fn repos_with_min_followers(&self, threshold: u64) -> Result<Vec<RepoRow>, StoreError> {
        let inner = self.inner.lock().expect("store lock");
        let rows = inner
            .indexed(NodeType::Repo)
            .filter_map(|repo_id| {
                let followers = inner
                    .follows
                    .iter()
                    .filter(|(_, r)| *r == repo_id)
                    .count() as u64;
                (followers > threshold).then(|| RepoRow {
                    id: repo_id,
                    name: inner.nodes[repo_id as usize].1.clone(),
                    followers,
                })
            })
            .collect();
        Ok(rows)
    }

    fn followers_of(&self, repo: StoreId) -> Result<Vec<FollowerRow>, StoreError> {
        let inner = self.inner.lock().expect("store lock");
        let rows = inner
            .follows
            .iter()
            .filter(|(_, r)| *r == repo)
            .map(|&(user_id, _)| FollowerRow {
                id: user_id,
                name: inner.nodes[user_id as usize].1.clone(),
            })
            .collect();
        Ok(rows)
    }

    fn longest_paths(&self, limit: usize) -> Result<Vec<Vec<PathStep>>, StoreError> {
        let inner = self.inner.lock().expect("store lock");

        // Undirected view of the follows graph
        let mut graph: UnGraph<StoreId, ()> = UnGraph::new_undirected();
        let mut indices: BTreeMap<StoreId, NodeIndex> = BTreeMap::new();
        for &(user_id, repo_id) in &inner.follows {
            let u = *indices
                .entry(user_id)
                .or_insert_with(|| graph.add_node(user_id));
            let r = *indices
                .entry(repo_id)
                .or_insert_with(|| graph.add_node(repo_id));
            graph.add_edge(u, r, ());
        }

        // Every simple path expanded from an indexed user node, as the
        // variable-length cypher match would produce
        let mut paths: Vec<Vec<StoreId>> = Vec::new();
        for start_id in inner.indexed(NodeType::User) {
            let Some(&start) = indices.get(&start_id) else {
                continue;
            };
            let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
            let mut trail = vec![start];
            expand(&graph, start, &mut visited, &mut trail, &mut paths);
        }

        paths.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        paths.truncate(limit);

        Ok(paths
            .into_iter()
            .map(|path| {
                path.into_iter()
                    .map(|id| {
                        let (node_type, name) = &inner.nodes[id as usize];
                        PathStep {
                            id,
                            name: name.clone(),
                            node_type: *node_type,
                        }
                    })
                    .collect()
            })
            .collect())
    }
}

fn expand(
    graph: &UnGraph<StoreId, ()>,
    from: NodeIndex,
    visited: &mut HashSet<NodeIndex>,
    trail: &mut Vec<NodeIndex>,
    paths: &mut Vec<Vec<StoreId>>,
) {
    let mut neighbors: Vec<NodeIndex> = graph.neighbors(from).collect();
    neighbors.sort_by_key(|&n| graph[n]);
    neighbors.dedup();
    for next in neighbors {
        if !visited.insert(next) {
            continue;
        }
        trail.push(next);
        paths.push(trail.iter().map(|&n| graph[n]).collect());
        expand(graph, next, visited, trail, paths);
        trail.pop();
        visited.remove(&next);
    }
}
