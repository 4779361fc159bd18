// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Neo4j REST store client
//!
//! Speaks the legacy REST surface: `/db/data/batch` for command batches and
//! `/db/data/cypher` for read queries. Batch jobs may reference earlier jobs
//! in the same request with the `{N}` placeholder syntax, which is where
//! [`BatchRef`](crate::batch::BatchRef) positions end up on the wire.

use crate::batch::{Batch, Command, NODES_INDEX};
use crate::error::StoreError;
use crate::types::{FollowerRow, NodeType, PathStep, RepoRow, StoreId};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

const REPOS_QUERY: &str = "START n = node:nodes_index(type = \"repo\") \
     MATCH n<-[r:follows]-m \
     WITH n, count(m) AS follow_count \
     WHERE follow_count > {threshold} \
     RETURN ID(n), n.name, follow_count \
     ORDER BY ID(n)";

const FOLLOWERS_QUERY: &str = "START user = node:nodes_index(type = \"user\"), repo = node:nodes_index(type = \"repo\") \
     MATCH user-[r:follows]->repo \
     WHERE ID(repo) = {repo_id} \
     RETURN ID(user), user.name";

const LONGEST_PATHS_QUERY: &str = "START user = node:nodes_index(type = \"user\") \
     MATCH path=user-[:follows*]-repo \
     WITH path, LENGTH(path) AS cnt \
     RETURN extract(n in nodes(path): [ID(n), n.name, n.type]) \
     ORDER BY cnt DESC \
     LIMIT {limit}";

// Relationship creation re-resolves both endpoints by index lookup instead of
// chaining the unique-create jobs: unique-create does not return a reference
// usable in a relationship job (https://github.com/neo4j/neo4j/issues/84).
const RELATE_QUERY: &str = "START a = node:user(name={user}), b = node:repo(name={repo}) \
     CREATE UNIQUE a-[new_rel:follows]->b \
     RETURN new_rel";

/// One job within a REST batch request
#[derive(Debug, Serialize)]
struct BatchJob {
    method: &'static str,
    to: String,
    id: usize,
    body: Value,
}

/// Blocking client for a Neo4j REST endpoint
pub struct RestStore {
    client: Client,
    base_url: String,
}

impl RestStore {
    /// Create a client for the store at `base_url` (e.g. `http://localhost:7474`)
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn data_url(&self, path: &str) -> String {
        format!("{}/db/data/{}", self.base_url, path)
    }

    fn job(command: &Command, position: usize) -> BatchJob {
        match command {
            Command::CreateUniqueNode { node_type, name } => BatchJob {
                method: "POST",
                to: format!("/index/node/{}?uniqueness=get_or_create", node_type.as_str()),
                id: position,
                body: json!({
                    "key": "name",
                    "value": name,
                    "properties": { "name": name, "type": node_type.as_str() },
                }),
            },
            Command::AddToIndex { node_type, target } => BatchJob {
                method: "POST",
                to: format!("/index/node/{NODES_INDEX}"),
                id: position,
                body: json!({
                    "key": "type",
                    "value": node_type.as_str(),
                    "uri": format!("{{{}}}", target.position()),
                }),
            },
            Command::RelateFollows { user, repo } => BatchJob {
                method: "POST",
                to: "/cypher".to_string(),
                id: position,
                body: json!({
                    "query": RELATE_QUERY,
                    "params": { "user": user, "repo": repo },
                }),
            },
        }
    }

    fn cypher(&self, query: &str, params: Value) -> Result<Vec<Vec<Value>>, StoreError> {
        debug!("cypher: {}", query);
        let response = self
            .client
            .post(self.data_url("cypher"))
            .json(&json!({ "query": query, "params": params }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let envelope: Value = response.json()?;
        let data = envelope
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::Decode("missing data array in cypher response".into()))?;
        data.iter()
            .map(|row| {
                row.as_array()
                    .cloned()
                    .ok_or_else(|| StoreError::Decode("cypher row is not an array".into()))
            })
            .collect()
    }
}

fn decode_id(value: &Value) -> Result<StoreId, StoreError> {
    value
        .as_u64()
        .ok_or_else(|| StoreError::Decode(format!("expected node id, got {value}")))
}

fn decode_str(value: &Value) -> Result<String, StoreError> {
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| StoreError::Decode(format!("expected string, got {value}")))
}

fn decode_type(value: &Value) -> Result<NodeType, StoreError> {
    match value.as_str() {
        Some("user") => Ok(NodeType::User),
        Some("repo") => Ok(NodeType::Repo),
        _ => Err(StoreError::Decode(format!("expected node type, got {value}"))),
    }
}

impl super::GraphStore for RestStore {
    fn dispatch(&self, batch: Batch) -> Result<(), StoreError> {
        let jobs: Vec<BatchJob> = batch
            .commands()
            .iter()
            .enumerate()
            .map(|(position, command)| Self::job(command, position))
            .collect();

        let response = self
            .client
            .post(self.data_url("batch"))
            .json(&jobs)
            .send()?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Rejected {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            })
        }
    }

    fn is_populated(&self) -> Result<bool, StoreError> {
        // Node 1 carrying a name means a previous ingestion run committed.
        let response = self.client.get(self.data_url("node/1/properties")).send()?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let properties: Value = response.json()?;
        Ok(properties.get("name").is_some())
    }

    fn repos_with_min_followers(&self, threshold: u64) -> Result<Vec<RepoRow>, StoreError> {
        self.cypher(REPOS_QUERY, json!({ "threshold": threshold }))?
            .iter()
            .map(|row| match row.as_slice() {
                [id, name, followers] => Ok(RepoRow {
                    id: decode_id(id)?,
                    name: decode_str(name)?,
                    followers: decode_id(followers)?,
                }),
                _ => Err(StoreError::Decode("repo row is not a triple".into())),
            })
            .collect()
    }

    fn followers_of(&self, repo: StoreId) -> Result<Vec<FollowerRow>, StoreError> {
        self.cypher(FOLLOWERS_QUERY, json!({ "repo_id": repo }))?
            .iter()
            .map(|row| match row.as_slice() {
                [id, name] => Ok(FollowerRow {
                    id: decode_id(id)?,
                    name: decode_str(name)?,
                }),
                _ => Err(StoreError::Decode("follower row is not a pair".into())),
            })
            .collect()
    }

    fn longest_paths(&self, limit: usize) -> Result<Vec<Vec<PathStep>>, StoreError> {
        self.cypher(LONGEST_PATHS_QUERY, json!({ "limit": limit }))?
            .iter()
            .map(|row| {
                let steps = row
                    .first()
                    .and_then(Value::as_array)
                    .ok_or_else(|| StoreError::Decode("path row is not a node list".into()))?;
                steps
                    .iter()
                    .map(|step| match step.as_array().map(Vec::as_slice) {
                        Some([id, name, node_type]) => Ok(PathStep {
                            id: decode_id(id)?,
                            name: decode_str(name)?,
                            node_type: decode_type(node_type)?,
                        }),
                        _ => Err(StoreError::Decode("path step is not a triple".into())),
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::DedupLedger;
    use crate::source::EdgeRecord;

    #[test]
    fn test_create_unique_node_job_shape() {
        let command = Command::CreateUniqueNode {
            node_type: NodeType::User,
            name: "dhh".into(),
        };
        let job = RestStore::job(&command, 0);

        assert_eq!(job.to, "/index/node/user?uniqueness=get_or_create");
        assert_eq!(job.body["key"], "name");
        assert_eq!(job.body["value"], "dhh");
        assert_eq!(job.body["properties"]["type"], "user");
    }

    #[test]
    fn test_index_add_resolves_batch_ref_to_placeholder() {
        let mut batch = Batch::new();
        let mut ledger = DedupLedger::new();
        crate::batch::push_edge(
            &mut batch,
            &mut ledger,
            &EdgeRecord { repo: "rails".into(), user: "dhh".into() },
        );

        // Repo index-add at position 3 references the repo create at 2
        let job = RestStore::job(&batch.commands()[3], 3);
        assert_eq!(job.to, "/index/node/nodes_index");
        assert_eq!(job.body["uri"], "{2}");
        assert_eq!(job.body["value"], "repo");
    }

    #[test]
    fn test_relate_job_carries_names_not_positions() {
        let command = Command::RelateFollows {
            user: "dhh".into(),
            repo: "rails".into(),
        };
        let job = RestStore::job(&command, 4);

        assert_eq!(job.to, "/cypher");
        assert_eq!(job.body["params"]["user"], "dhh");
        assert_eq!(job.body["params"]["repo"], "rails");
        let query = job.body["query"].as_str().unwrap();
        assert!(query.contains("CREATE UNIQUE"));
        assert!(query.contains("node:user(name={user})"));
    }
}
