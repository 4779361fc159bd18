// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Edge source reader - parses the CSV edge list into `(repo, user)` pairs
//!
//! Rows are `repo,<ignored>,user`. Blank lines are skipped; a row with fewer
//! than three columns fails the whole read rather than being silently dropped.

use crate::error::SourceReadError;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// A single `repo,<ignored>,user` row, reduced to its two endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Repository name (first column)
    pub repo: String,
    /// Contributing user name (third column)
    pub user: String,
}

/// Lazy reader over the CSV edge list
#[derive(Debug)]
pub struct EdgeReader {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl EdgeReader {
    /// Open the edge list at `path`
    pub fn open(path: &Path) -> Result<Self, SourceReadError> {
        let file = File::open(path).map_err(|source| SourceReadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }

    fn parse(&self, line: &str) -> Result<EdgeRecord, SourceReadError> {
        let mut columns = line.split(',');
        let repo = columns.next();
        let _url = columns.next();
        let user = columns.next();
        match (repo, user) {
            (Some(repo), Some(user)) => Ok(EdgeRecord {
                repo: repo.to_string(),
                user: user.to_string(),
            }),
            _ => Err(SourceReadError::MalformedRow {
                line: self.line_number,
                found: line.split(',').count(),
            }),
        }
    }
}

impl Iterator for EdgeReader {
    type Item = Result<EdgeRecord, SourceReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_number += 1;
            match self.lines.next()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(self.parse(&line)),
                Err(source) => {
                    return Some(Err(SourceReadError::Read {
                        line: self.line_number,
                        source,
                    }))
                }
            }
        }
    }
}
