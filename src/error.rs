// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for ingestion and view serving

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading the CSV edge list
#[derive(Debug, Error)]
pub enum SourceReadError {
    /// The edge list file could not be opened
    #[error("cannot open edge list {path}")]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A line could not be read from the edge list
    #[error("cannot read edge list at line {line}")]
    Read {
        /// 1-based line number
        line: usize,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A row had fewer columns than `repo,<ignored>,user` requires
    #[error("malformed row at line {line}: expected 3 columns, found {found}")]
    MalformedRow {
        /// 1-based line number
        line: usize,
        /// Number of columns actually present
        found: usize,
    },
}

/// Failures talking to the graph store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure reaching the store
    #[error("graph store request failed")]
    Http(#[from] reqwest::Error),

    /// The store rejected a batch or query
    #[error("graph store rejected request ({status}): {body}")]
    Rejected {
        /// HTTP status returned by the store
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// A read query failed inside the store
    #[error("graph store query failed: {0}")]
    Query(String),

    /// A query response could not be decoded into the expected rows
    #[error("cannot decode graph store response: {0}")]
    Decode(String),
}

/// Failures of the end-to-end ingestion run
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading the edge list failed
    #[error(transparent)]
    Source(#[from] SourceReadError),

    /// Dispatching a batch failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures serving a derived view
#[derive(Debug, Error)]
pub enum ViewError {
    /// Querying the store for the view failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An existing cache file could not be read back
    #[error("cannot read view cache {path}")]
    CacheRead {
        /// Path of the unreadable cache file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
