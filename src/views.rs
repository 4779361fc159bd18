// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! View assembler - reshapes query rows into the JSON graphs the front end draws
//!
//! The front end indexes nodes positionally, so link `source`/`target` are
//! positions into the `nodes` array, never store ids.

use crate::types::{FollowerRow, NodeType, PathStep, RepoRow, StoreId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A node as rendered by the force-graph front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewNode {
    /// Node name
    pub name: String,
    /// Node type
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Store-assigned id, carried for tooltips/debugging only
    pub id: StoreId,
    /// Display group (repos 1, users 2)
    pub group: u32,
}

/// A link between two positions in the node list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLink {
    /// Position of the source node
    pub source: usize,
    /// Position of the target node
    pub target: usize,
    /// Link weight, always 1
    pub value: u32,
}

/// A cacheable node/link graph, serialized as `{"nodes":[...],"links":[...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    /// Ordered node list
    pub nodes: Vec<ViewNode>,
    /// Links referencing node positions
    pub links: Vec<ViewLink>,
}

fn view_node(id: StoreId, name: &str, node_type: NodeType) -> ViewNode {
    ViewNode {
        name: name.to_string(),
        node_type,
        id,
        group: node_type.group(),
    }
}

/// Build the full bipartite view: repos first (in query order), then unique
/// users in first-seen order across all relationship sets.
///
/// Links are emitted against user store ids during the first pass, then fixed
/// up to node positions once every unique user has been assigned one.
#[must_use]
pub fn assemble_full_graph(repos_with_followers: &[(RepoRow, Vec<FollowerRow>)]) -> GraphView {
    let mut out = GraphView::default();
    let mut users: Vec<ViewNode> = Vec::new();
    let mut user_positions: HashMap<StoreId, usize> = HashMap::new();

    for (repo_position, (repo, followers)) in repos_with_followers.iter().enumerate() {
        out.nodes.push(view_node(repo.id, &repo.name, NodeType::Repo));

        for follower in followers {
            if !user_positions.contains_key(&follower.id) {
                user_positions.insert(follower.id, users.len());
                users.push(view_node(follower.id, &follower.name, NodeType::User));
            }

            // Target holds the user's store id until the fixup pass below
            out.links.push(ViewLink {
                source: repo_position,
                target: follower.id as usize,
                value: 1,
            });
        }
    }

    let repo_count = repos_with_followers.len();
    for link in &mut out.links {
        link.target = repo_count + user_positions[&(link.target as StoreId)];
    }

    out.nodes.extend(users);
    out
}

/// Flatten the returned paths into one view, node indices running globally
/// across paths. Paths are not deduplicated against each other: a node on two
/// paths appears twice, as the front end draws each path separately.
#[must_use]
pub fn assemble_longest_path(paths: &[Vec<PathStep>]) -> GraphView {
    let mut out = GraphView::default();
    let mut position = 0;

    for path in paths {
        for (offset, step) in path.iter().enumerate() {
            out.nodes.push(view_node(step.id, &step.name, step.node_type));
            if offset + 1 < path.len() {
                out.links.push(ViewLink {
                    source: position,
                    target: position + 1,
                    value: 1,
                });
            }
            position += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(id: StoreId, name: &str, followers: u64) -> RepoRow {
        RepoRow { id, name: name.into(), followers }
    }

    fn follower(id: StoreId, name: &str) -> FollowerRow {
        FollowerRow { id, name: name.into() }
    }

    fn step(id: StoreId, name: &str, node_type: NodeType) -> PathStep {
        PathStep { id, name: name.into(), node_type }
    }

    #[test]
    fn test_full_graph_orders_repos_then_unique_users() {
        let input = vec![
            (repo(10, "a", 2), vec![follower(20, "u1"), follower(21, "u2")]),
            (repo(11, "b", 1), vec![follower(21, "u2")]),
        ];
        let view = assemble_full_graph(&input);

        let names: Vec<_> = view.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "u1", "u2"]);
        assert_eq!(view.nodes[0].group, 1);
        assert_eq!(view.nodes[2].group, 2);
    }

    #[test]
    fn test_full_graph_links_reference_positions() {
        let input = vec![
            (repo(10, "a", 2), vec![follower(20, "u1"), follower(21, "u2")]),
            (repo(11, "b", 1), vec![follower(21, "u2")]),
        ];
        let view = assemble_full_graph(&input);

        assert_eq!(view.links.len(), 3);
        // b -> u2: repo position 1, u2 is second unique user after 2 repos
        assert_eq!(view.links[2].source, 1);
        assert_eq!(view.links[2].target, 3);
        for link in &view.links {
            assert!(link.source < view.nodes.len());
            assert!(link.target < view.nodes.len());
        }
    }

    #[test]
    fn test_full_graph_empty_input() {
        let view = assemble_full_graph(&[]);
        assert!(view.nodes.is_empty());
        assert!(view.links.is_empty());
    }

    #[test]
    fn test_longest_path_links_consecutive_pairs() {
        let paths = vec![vec![
            step(1, "u1", NodeType::User),
            step(2, "a", NodeType::Repo),
            step(3, "u2", NodeType::User),
        ]];
        let view = assemble_longest_path(&paths);

        assert_eq!(view.nodes.len(), 3);
        assert_eq!(view.links.len(), 2);
        assert_eq!((view.links[0].source, view.links[0].target), (0, 1));
        assert_eq!((view.links[1].source, view.links[1].target), (1, 2));
    }

    #[test]
    fn test_longest_path_counter_runs_across_paths_without_dedup() {
        let paths = vec![
            vec![step(1, "u1", NodeType::User), step(2, "a", NodeType::Repo)],
            vec![step(2, "a", NodeType::Repo), step(3, "u2", NodeType::User)],
        ];
        let view = assemble_longest_path(&paths);

        // Node 2 appears twice; no link bridges the two paths
        assert_eq!(view.nodes.len(), 4);
        assert_eq!(view.links.len(), 2);
        assert_eq!((view.links[1].source, view.links[1].target), (2, 3));
    }

    #[test]
    fn test_view_json_shape() {
        let paths = vec![vec![
            step(7, "u1", NodeType::User),
            step(8, "a", NodeType::Repo),
        ]];
        let json = serde_json::to_value(assemble_longest_path(&paths)).unwrap();

        assert_eq!(
            json["nodes"][0],
            serde_json::json!({ "name": "u1", "type": "user", "id": 7, "group": 2 })
        );
        assert_eq!(
            json["links"][0],
            serde_json::json!({ "source": 0, "target": 1, "value": 1 })
        );
    }
}
