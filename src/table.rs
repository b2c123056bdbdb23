// src/table.rs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// An untyped table as scraped off a page: header row plus string cells.
/// Headers are what the page claims; the transform step owns the mapping
/// to canonical column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        RawTable {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, rejecting any row whose width disagrees with the header.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.headers.len() {
            bail!(
                "row has {} cells but table has {} columns",
                row.len(),
                self.headers.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    /// Index of the column whose header matches `name` after normalization.
    pub fn column(&self, name: &str) -> Option<usize> {
        let want = normalize_header(name);
        self.headers
            .iter()
            .position(|h| normalize_header(h) == want)
    }
}

/// Lowercase and collapse all interior whitespace to single spaces, so that
/// "Overall  rank" and "overall rank" name the same column.
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
