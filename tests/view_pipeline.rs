// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! End-to-end tests for ingestion through view serving

use followgraph::ingest;
use followgraph::service::{ViewKind, ViewService};
use followgraph::store::MemoryStore;
use followgraph::views::GraphView;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn edge_file(rows: &[(&str, &str)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for (repo, user) in rows {
        writeln!(file, "{repo},x,{user}").unwrap();
    }
    file
}

fn ingested(rows: &[(&str, &str)]) -> MemoryStore {
    let store = MemoryStore::new();
    let file = edge_file(rows);
    ingest::run(&store, file.path(), 1000, false).unwrap();
    store
}

#[test]
fn test_two_repos_two_users_three_edges() {
    let store = ingested(&[("A", "u1"), ("B", "u2"), ("A", "u2")]);
    let dir = TempDir::new().unwrap();
    let mut service = ViewService::new(&store, dir.path(), 0, 5);

    let payload = service.full_graph(false).unwrap();
    let view: GraphView = serde_json::from_slice(&payload).unwrap();

    assert_eq!(view.nodes.len(), 4);
    assert_eq!(view.links.len(), 3);

    // No duplicate user node for u2
    let u2_count = view.nodes.iter().filter(|n| n.name == "u2").count();
    assert_eq!(u2_count, 1);

    // Repos lead the node list, users follow
    assert_eq!(view.nodes[0].group, 1);
    assert_eq!(view.nodes[1].group, 1);
    assert_eq!(view.nodes[2].group, 2);
    assert_eq!(view.nodes[3].group, 2);
}

#[test]
fn test_full_graph_node_count_is_repos_plus_unique_users() {
    let store = ingested(&[
        ("a", "u1"),
        ("a", "u2"),
        ("a", "u3"),
        ("b", "u2"),
        ("b", "u3"),
        ("b", "u4"),
    ]);
    let dir = TempDir::new().unwrap();
    let mut service = ViewService::new(&store, dir.path(), 0, 5);

    let view: GraphView =
        serde_json::from_slice(&service.full_graph(false).unwrap()).unwrap();

    // 2 repos + 4 unique users across all relationship sets
    assert_eq!(view.nodes.len(), 6);
    assert_eq!(view.links.len(), 6);
    for link in &view.links {
        assert!(link.source < view.nodes.len());
        assert!(link.target < view.nodes.len());
        assert_eq!(view.nodes[link.source].group, 1);
        assert_eq!(view.nodes[link.target].group, 2);
    }
}

#[test]
fn test_follower_threshold_is_strict() {
    let store = ingested(&[("a", "u1"), ("a", "u2"), ("b", "u1")]);
    let dir = TempDir::new().unwrap();
    let mut service = ViewService::new(&store, dir.path(), 1, 5);

    let view: GraphView =
        serde_json::from_slice(&service.full_graph(false).unwrap()).unwrap();

    // Only repo a (2 followers) clears "strictly greater than 1"
    let repos: Vec<_> = view.nodes.iter().filter(|n| n.group == 1).collect();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].name, "a");
}

#[test]
fn test_longest_path_view_walks_the_chain() {
    // u1 - a - u2 - b: the longest undirected simple path has 4 nodes
    let store = ingested(&[("a", "u1"), ("a", "u2"), ("b", "u2")]);
    let dir = TempDir::new().unwrap();
    let mut service = ViewService::new(&store, dir.path(), 0, 1);

    let view: GraphView =
        serde_json::from_slice(&service.longest_path(false).unwrap()).unwrap();

    assert_eq!(view.nodes.len(), 4);
    assert_eq!(view.links.len(), 3);
    // Links chain consecutive positions
    for (offset, link) in view.links.iter().enumerate() {
        assert_eq!(link.source, offset);
        assert_eq!(link.target, offset + 1);
    }
    // Alternating user/repo groups along a bipartite path
    let groups: Vec<_> = view.nodes.iter().map(|n| n.group).collect();
    assert!(groups == vec![2, 1, 2, 1] || groups == vec![1, 2, 1, 2]);
}

#[test]
fn test_cache_coherency_after_forced_refresh() {
    let store = ingested(&[("a", "u1"), ("a", "u2"), ("b", "u1")]);
    let dir = TempDir::new().unwrap();
    let mut service = ViewService::new(&store, dir.path(), 0, 5);

    service.full_graph(false).unwrap();
    let refreshed = service.full_graph(true).unwrap();
    let cached = service.full_graph(false).unwrap();

    assert_eq!(refreshed, cached);
}

#[test]
fn test_cache_file_survives_a_new_service() {
    let store = ingested(&[("a", "u1"), ("a", "u2"), ("b", "u1")]);
    let dir = TempDir::new().unwrap();

    let first = ViewService::new(&store, dir.path(), 0, 5)
        .full_graph(false)
        .unwrap();

    // A fresh service adopts the existing file instead of recomputing
    let second = ViewService::new(&store, dir.path(), 0, 5)
        .full_graph(false)
        .unwrap();

    assert_eq!(first, second);
    assert!(dir.path().join(ViewKind::FullGraph.cache_file()).exists());
}

#[test]
fn test_invalidate_forces_recompute_on_next_request() {
    let store = ingested(&[("a", "u1"), ("a", "u2")]);
    let dir = TempDir::new().unwrap();
    let mut service = ViewService::new(&store, dir.path(), 0, 5);

    let before = service.full_graph(false).unwrap();
    service.invalidate(ViewKind::FullGraph);
    assert!(!dir.path().join(ViewKind::FullGraph.cache_file()).exists());

    let after = service.full_graph(false).unwrap();
    assert_eq!(before, after);
}
