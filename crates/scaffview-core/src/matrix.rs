//! Adjacency matrix interpretation.
//!
//! Only the lower triangle (diagonal included) is consulted: row `r` is scanned over columns
//! `0..=r`. A non-symmetric matrix therefore contributes nothing from its strict upper
//! triangle, and a `1` on the diagonal yields a self-loop.

use crate::error::{Error, Result};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    order: usize,
    cells: Vec<u8>,
}

/// An edge found while scanning the matrix. `id` is the discovery counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscoveredEdge {
    pub id: usize,
    pub row: usize,
    pub column: usize,
}

impl DiscoveredEdge {
    pub fn is_self_loop(&self) -> bool {
        self.row == self.column
    }

    /// Endpoints as an unordered pair (smaller index first).
    pub fn pair(&self) -> (usize, usize) {
        (self.row.min(self.column), self.row.max(self.column))
    }
}

impl AdjacencyMatrix {
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let order = rows.len();
        let mut cells = Vec::with_capacity(order * order);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != order {
                return Err(Error::invalid_matrix(format!(
                    "matrix is not square: row {r} has {} columns, expected {order}",
                    row.len()
                )));
            }
            if let Some((c, v)) = row.iter().enumerate().find(|(_, v)| **v > 1) {
                return Err(Error::invalid_matrix(format!(
                    "cell ({r}, {c}) holds {v}; only 0 and 1 are allowed"
                )));
            }
            cells.extend(row);
        }
        Ok(Self { order, cells })
    }

    /// Number of rows (and columns).
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order == 0
    }

    pub fn get(&self, row: usize, column: usize) -> Option<u8> {
        if row >= self.order || column >= self.order {
            return None;
        }
        Some(self.cells[row * self.order + column])
    }

    /// Edges of one row, restricted to columns `0..=row`. Ids continue from `next_id`.
    pub fn row_edges(&self, row: usize, next_id: usize) -> impl Iterator<Item = DiscoveredEdge> {
        let cells = if row < self.order {
            let start = row * self.order;
            &self.cells[start..=start + row]
        } else {
            &[][..]
        };
        cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 1)
            .enumerate()
            .map(move |(k, (column, _))| DiscoveredEdge {
                id: next_id + k,
                row,
                column,
            })
    }

    /// All edges in discovery order.
    pub fn edges(&self) -> Vec<DiscoveredEdge> {
        let mut out = Vec::new();
        for row in 0..self.order {
            let next_id = out.len();
            out.extend(self.row_edges(row, next_id));
        }
        out
    }

    pub fn edge_pairs(&self) -> BTreeSet<(usize, usize)> {
        self.edges().iter().map(DiscoveredEdge::pair).collect()
    }
}
