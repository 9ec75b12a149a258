//! 0/1 edge masks over rows × columns.

use std::collections::BTreeSet;

use crate::bitlist::BitList;

/// Adjacency mask (row-major, true = edge present)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Adjacency {
    pub rows: usize,
    pub cols: usize,
    bits: BitList,
}

impl Adjacency {
    pub fn empty(rows: usize, cols: usize) -> Self {
        let len = rows
            .checked_mul(cols)
            .expect("Adjacency::empty: rows * cols overflowed");
        Self {
            rows,
            cols,
            bits: BitList::zeros(len),
        }
    }

    /// Build from a shape and predicate returning whether (r, c) is an edge.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut adj = Self::empty(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                if f(r, c) {
                    adj.set(r, c, true);
                }
            }
        }
        adj
    }

    pub fn from_vec(matrix: Vec<Vec<bool>>) -> Self {
        let rows = matrix.len();
        let cols = matrix.first().map_or(0, Vec::len);
        Self::from_fn(rows, cols, |r, c| matrix[r].get(c).copied().unwrap_or(false))
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.bits.get(row * self.cols + col)
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(
            row < self.rows && col < self.cols,
            "Adjacency::set: ({row}, {col}) out of bounds for {}x{}",
            self.rows,
            self.cols
        );
        self.bits.set(row * self.cols + col, value);
    }

    /// Columns connected to a given row, ascending
    pub fn row_neighbors(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        let start = row * self.cols;
        self.bits
            .ones_in(start, start + self.cols)
            .map(move |i| i - start)
    }

    /// Rows connected to a given column, ascending
    pub fn col_neighbors(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.rows).filter(move |&r| self.get(r, col))
    }

    /// Union of the column neighborhoods of `rows`, de-duplicated
    pub fn neighbors_of<'a, I>(&self, rows: I) -> BTreeSet<usize>
    where
        I: IntoIterator<Item = &'a usize>,
    {
        rows.into_iter()
            .flat_map(|&r| self.row_neighbors(r))
            .collect()
    }

    pub fn row_degree(&self, row: usize) -> usize {
        self.row_neighbors(row).count()
    }

    /// Count total edges
    pub fn edge_count(&self) -> usize {
        self.bits.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_deduplicated() {
        let adj = Adjacency::from_vec(vec![
            vec![true, false, true],
            vec![true, true, false],
            vec![false, false, false],
        ]);
        let rows = [0, 1];
        assert_eq!(
            adj.neighbors_of(&rows).into_iter().collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(adj.neighbors_of(&[2]).is_empty());
        assert_eq!(adj.col_neighbors(0).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(adj.row_degree(0), 2);
        assert_eq!(adj.edge_count(), 4);
    }

    #[test]
    fn test_get_out_of_range_is_absent() {
        let adj = Adjacency::from_fn(2, 2, |_, _| true);
        assert!(adj.get(1, 1));
        assert!(!adj.get(2, 0));
    }
}
