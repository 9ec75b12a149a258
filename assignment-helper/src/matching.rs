//! Matchings in a bipartite row/column graph.

use crate::MatrixIndex;

/// A single row–column pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub row: MatrixIndex,
    pub col: MatrixIndex,
}

impl Edge {
    pub const fn new(row: MatrixIndex, col: MatrixIndex) -> Self {
        Self { row, col }
    }
}

impl From<(MatrixIndex, MatrixIndex)> for Edge {
    fn from((row, col): (MatrixIndex, MatrixIndex)) -> Self {
        Self { row, col }
    }
}

/// Which side of the bipartition a vertex lives on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Row,
    Col,
}

/// Represents a matching in a bipartite graph
///
/// Both directions are stored so freeness and mate lookups are O(1); every row
/// and every column appears in at most one pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matching {
    /// row_to_col[r] = Some(c) means row r is matched to column c
    row_to_col: Vec<Option<MatrixIndex>>,
    /// col_to_row[c] = Some(r) means column c is matched to row r
    col_to_row: Vec<Option<MatrixIndex>>,
    size: usize,
}

impl Matching {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            row_to_col: vec![None; rows],
            col_to_row: vec![None; cols],
            size: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.row_to_col.len()
    }

    pub fn cols(&self) -> usize {
        self.col_to_row.len()
    }

    /// Add a pair, displacing any previous partners of either endpoint.
    pub fn match_pair(&mut self, row: MatrixIndex, col: MatrixIndex) {
        if let Some(old_col) = self.row_to_col[row] {
            self.unmatch(Edge::new(row, old_col));
        }
        if let Some(old_row) = self.col_to_row[col] {
            self.unmatch(Edge::new(old_row, col));
        }
        self.row_to_col[row] = Some(col);
        self.col_to_row[col] = Some(row);
        self.size += 1;
    }

    /// Remove a pair. Returns false if the pair was not in the matching.
    pub fn unmatch(&mut self, edge: Edge) -> bool {
        if !self.contains(edge) {
            return false;
        }
        self.row_to_col[edge.row] = None;
        self.col_to_row[edge.col] = None;
        self.size -= 1;
        true
    }

    pub fn contains(&self, edge: Edge) -> bool {
        self.row_to_col.get(edge.row).copied().flatten() == Some(edge.col)
    }

    pub fn is_free(&self, vertex: MatrixIndex, side: Side) -> bool {
        match side {
            Side::Row => self.row_to_col[vertex].is_none(),
            Side::Col => self.col_to_row[vertex].is_none(),
        }
    }

    pub fn mate_of_row(&self, row: MatrixIndex) -> Option<MatrixIndex> {
        self.row_to_col[row]
    }

    pub fn mate_of_col(&self, col: MatrixIndex) -> Option<MatrixIndex> {
        self.col_to_row[col]
    }

    /// Lowest-index unmatched row
    pub fn first_free_row(&self) -> Option<MatrixIndex> {
        self.row_to_col.iter().position(Option::is_none)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Pairs ordered by row
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.row_to_col
            .iter()
            .enumerate()
            .filter_map(|(r, c)| c.map(|c| Edge::new(r, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_and_unmatch() {
        let mut m = Matching::new(3, 3);
        m.match_pair(0, 2);
        m.match_pair(1, 0);
        assert_eq!(m.size(), 2);
        assert!(!m.is_free(0, Side::Row));
        assert!(!m.is_free(2, Side::Col));
        assert!(m.is_free(1, Side::Col));
        assert_eq!(m.first_free_row(), Some(2));
        assert_eq!(m.mate_of_col(0), Some(1));

        assert!(m.unmatch(Edge::new(0, 2)));
        assert!(!m.unmatch(Edge::new(0, 2)));
        assert_eq!(m.size(), 1);
        assert!(m.is_free(2, Side::Col));
    }

    #[test]
    fn test_match_pair_keeps_injectivity() {
        let mut m = Matching::new(2, 2);
        m.match_pair(0, 0);
        m.match_pair(1, 0);
        assert_eq!(m.size(), 1);
        assert!(m.is_free(0, Side::Row));
        assert_eq!(m.edges().collect::<Vec<_>>(), vec![Edge::new(1, 0)]);
    }
}
