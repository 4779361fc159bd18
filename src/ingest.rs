// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Ingestion run - edge list in, bounded command batches out
//!
//! One run is strictly sequential: batches are dispatched in source order
//! because later batches rely on index state committed by earlier ones. A
//! store failure aborts the run; already-committed batches are not rolled
//! back, and re-running is safe because every command is unique-creating.

use crate::batch::{push_edge, Batch};
use crate::error::IngestError;
use crate::ledger::DedupLedger;
use crate::source::EdgeReader;
use crate::store::GraphStore;
use std::path::Path;
use tracing::info;

/// Outcome of a completed ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Total commands dispatched to the store
    pub commands: usize,
    /// Source rows consumed
    pub rows: usize,
    /// Batches dispatched
    pub batches: usize,
    /// True when the run was skipped because the store was already populated
    pub skipped: bool,
}

/// Ingest the CSV edge list at `path`, flushing every `batch_rows` source rows.
///
/// When the store already holds nodes the run is skipped unless `force` is
/// set; the data load is one-shot and re-ingestion is only useful after the
/// store has been wiped or when new rows were appended.
pub fn run(
    store: &dyn GraphStore,
    path: &Path,
    batch_rows: usize,
    force: bool,
) -> Result<IngestReport, IngestError> {
    if !force && store.is_populated()? {
        info!("nothing to do, store is already populated");
        return Ok(IngestReport { commands: 0, rows: 0, batches: 0, skipped: true });
    }

    let mut ledger = DedupLedger::new();
    let mut batch = Batch::new();
    let mut report = IngestReport { commands: 0, rows: 0, batches: 0, skipped: false };
    let mut rows_in_batch = 0;

    for record in EdgeReader::open(path)? {
        if rows_in_batch >= batch_rows {
            report.commands += batch.len();
            report.batches += 1;
            info!("{} commands dispatched, at row {}", report.commands, report.rows);
            store.dispatch(batch.take())?;
            rows_in_batch = 0;
        }

        let record = record?;
        push_edge(&mut batch, &mut ledger, &record);
        report.rows += 1;
        rows_in_batch += 1;
    }

    // Final partial batch is flushed unconditionally
    if !batch.is_empty() {
        report.commands += batch.len();
        report.batches += 1;
        info!("{} commands dispatched, final batch", report.commands);
        store.dispatch(batch.take())?;
    }

    info!(
        "ingestion finished: {} rows, {} commands in {} batches",
        report.rows, report.commands, report.batches
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::NodeType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn edge_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_small_csv_single_batch() {
        let store = MemoryStore::new();
        let file = edge_file("A,x,u1\nB,x,u2\nA,x,u2\n");

        let report = run(&store, file.path(), 1000, false).unwrap();

        // 3 rows: 4 index-adds total, 6 creates, 3 relates
        assert_eq!(report.rows, 3);
        assert_eq!(report.batches, 1);
        assert_eq!(report.commands, 13);
        assert_eq!(store.node_count(), 4);
        assert_eq!(store.edge_count(), 3);
    }

    #[test]
    fn test_batches_bounded_by_row_threshold() {
        let store = MemoryStore::new();
        let file = edge_file("a,x,u1\nb,x,u2\nc,x,u3\nd,x,u4\ne,x,u5\n");

        let report = run(&store, file.path(), 2, false).unwrap();

        // 5 rows at 2 per batch: two full batches plus the final partial one
        assert_eq!(report.batches, 3);
        assert_eq!(store.node_count(), 10);
        assert_eq!(store.edge_count(), 5);
    }

    #[test]
    fn test_empty_csv_dispatches_nothing() {
        let store = MemoryStore::new();
        let file = edge_file("");

        let report = run(&store, file.path(), 1000, false).unwrap();

        assert_eq!(report, IngestReport { commands: 0, rows: 0, batches: 0, skipped: false });
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn test_malformed_row_aborts_before_dispatch() {
        let store = MemoryStore::new();
        let file = edge_file("A,x,u1\nonlyonecolumn\n");

        let result = run(&store, file.path(), 1000, false);

        assert!(matches!(result, Err(IngestError::Source(_))));
        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_populated_store_skips_unless_forced() {
        let store = MemoryStore::new();
        let file = edge_file("A,x,u1\n");

        let first = run(&store, file.path(), 1000, false).unwrap();
        assert!(!first.skipped);

        let second = run(&store, file.path(), 1000, false).unwrap();
        assert!(second.skipped);
        assert_eq!(second.commands, 0);

        let forced = run(&store, file.path(), 1000, true).unwrap();
        assert!(!forced.skipped);
        assert!(forced.commands > 0);
    }

    #[test]
    fn test_reingest_is_idempotent() {
        let store = MemoryStore::new();
        let file = edge_file("A,x,u1\nB,x,u2\nA,x,u2\n");

        run(&store, file.path(), 1000, false).unwrap();
        run(&store, file.path(), 1000, true).unwrap();

        assert_eq!(store.node_count(), 4);
        assert_eq!(store.edge_count(), 3);
        assert_eq!(store.indexed_count(NodeType::User), 2);
        assert_eq!(store.indexed_count(NodeType::Repo), 2);
    }
}
