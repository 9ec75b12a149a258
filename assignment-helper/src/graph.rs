//! Labeled complete bipartite graphs and their equality subgraphs.

use std::collections::BTreeSet;

use crate::adjacency::Adjacency;
use crate::error::{Error, Result};
use crate::labeling::{apply_delta, compute_delta, Labeling};
use crate::matching::Matching;
use crate::weights::{Weight, WeightMatrix};
use crate::MatrixIndex;

/// A weight matrix together with a row/column labeling.
///
/// The matching is deliberately not stored here: the solver owns it and
/// passes it in where a query needs it.
#[derive(Clone, Debug)]
pub struct LabeledGraph<W> {
    weights: WeightMatrix<W>,
    labels: Labeling<W>,
    tolerance: W,
}

impl<W: Weight> LabeledGraph<W> {
    pub fn new(weights: WeightMatrix<W>, row_labels: Vec<W>, col_labels: Vec<W>) -> Result<Self> {
        if row_labels.len() != weights.rows {
            return Err(Error::DimensionMismatch {
                what: "row labels",
                expected: weights.rows,
                got: row_labels.len(),
            });
        }
        if col_labels.len() != weights.cols {
            return Err(Error::DimensionMismatch {
                what: "column labels",
                expected: weights.cols,
                got: col_labels.len(),
            });
        }
        Ok(Self {
            weights,
            labels: Labeling {
                rows: row_labels,
                cols: col_labels,
            },
            tolerance: W::default_tolerance(),
        })
    }

    /// Graph with the trivial feasible labeling (rows 0, columns at their maxima).
    pub fn standard(weights: WeightMatrix<W>) -> Self {
        let labels = Labeling::trivial(&weights);
        Self {
            weights,
            labels,
            tolerance: W::default_tolerance(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: W) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn weights(&self) -> &WeightMatrix<W> {
        &self.weights
    }

    pub fn labels(&self) -> &Labeling<W> {
        &self.labels
    }

    pub fn tolerance(&self) -> W {
        self.tolerance
    }

    pub fn rows(&self) -> usize {
        self.weights.rows
    }

    pub fn cols(&self) -> usize {
        self.weights.cols
    }

    pub fn slack(&self, row: MatrixIndex, col: MatrixIndex) -> Result<W> {
        self.labels.slack(&self.weights, row, col)
    }

    /// Present and `|slack| <= tolerance`.
    pub fn is_tight(&self, row: MatrixIndex, col: MatrixIndex) -> Result<bool> {
        if !self.weights.is_present(row, col) {
            return Ok(false);
        }
        Ok(self.slack(row, col)?.abs() <= self.tolerance)
    }

    /// Every present edge has slack no less than `-tolerance`.
    pub fn is_feasible(&self) -> Result<bool> {
        for i in 0..self.rows() {
            for j in 0..self.cols() {
                if self.weights.is_present(i, j) && self.slack(i, j)? < -self.tolerance {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Only meaningful for square matrices: every row is matched.
    pub fn is_perfect_matching(&self, matching: &Matching) -> bool {
        matching.size() == self.rows()
    }

    pub fn weight_of_matching(&self, matching: &Matching) -> Result<W> {
        matching
            .edges()
            .try_fold(W::zero(), |acc, e| acc.add_weight(self.weights.get(e.row, e.col)))
            .ok_or_else(Error::overflow)
    }

    /// Columns with a present edge from some row in `rows`, ignoring labels.
    pub fn neighbors_of<'a, I>(&self, rows: I) -> BTreeSet<MatrixIndex>
    where
        I: IntoIterator<Item = &'a MatrixIndex>,
    {
        rows.into_iter()
            .flat_map(|&r| (0..self.cols()).filter(move |&c| self.weights.is_present(r, c)))
            .collect()
    }

    /// Project onto the tight edges of the current labeling. Does not mutate `self`.
    pub fn equality_subgraph(&self) -> Result<EqualityGraph<'_, W>> {
        let mut adjacency = Adjacency::empty(self.rows(), self.cols());
        for r in 0..self.rows() {
            for c in 0..self.cols() {
                if self.is_tight(r, c)? {
                    adjacency.set(r, c, true);
                }
            }
        }
        Ok(EqualityGraph {
            graph: self,
            adjacency,
        })
    }

    /// Minimal label delta that lets the tree (`s`, `t`) reach a new column.
    pub fn compute_delta(
        &self,
        s: &BTreeSet<MatrixIndex>,
        t: &BTreeSet<MatrixIndex>,
    ) -> Result<W> {
        compute_delta(&self.weights, &self.labels, s, t)
    }

    pub fn apply_delta(
        &mut self,
        s: &BTreeSet<MatrixIndex>,
        t: &BTreeSet<MatrixIndex>,
        delta: W,
    ) -> Result<()> {
        apply_delta(&mut self.labels, s, t, delta)
    }

    pub fn into_labels(self) -> Labeling<W> {
        self.labels
    }
}

/// Tight edges of a [`LabeledGraph`] under its labeling at construction time.
///
/// Borrowing the graph means it cannot outlive a label change; rebuild it
/// after every relabel.
#[derive(Clone, Debug)]
pub struct EqualityGraph<'g, W> {
    graph: &'g LabeledGraph<W>,
    adjacency: Adjacency,
}

impl<'g, W: Weight> EqualityGraph<'g, W> {
    pub fn graph(&self) -> &'g LabeledGraph<W> {
        self.graph
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    pub fn rows(&self) -> usize {
        self.adjacency.rows
    }

    pub fn cols(&self) -> usize {
        self.adjacency.cols
    }

    pub fn has_edge(&self, row: MatrixIndex, col: MatrixIndex) -> bool {
        self.adjacency.get(row, col)
    }

    /// The weight if (row, col) is tight, `None` otherwise.
    pub fn weight(&self, row: MatrixIndex, col: MatrixIndex) -> Option<W> {
        self.has_edge(row, col)
            .then(|| self.graph.weights.get(row, col))
    }

    pub fn row_neighbors(&self, row: MatrixIndex) -> impl Iterator<Item = MatrixIndex> + '_ {
        self.adjacency.row_neighbors(row)
    }

    pub fn neighbors_of<'a, I>(&self, rows: I) -> BTreeSet<MatrixIndex>
    where
        I: IntoIterator<Item = &'a MatrixIndex>,
    {
        self.adjacency.neighbors_of(rows)
    }

    pub fn is_perfect_matching(&self, matching: &Matching) -> bool {
        self.graph.is_perfect_matching(matching)
    }

    /// Every matched pair is an edge of this graph.
    pub fn contains_matching(&self, matching: &Matching) -> bool {
        matching.edges().all(|e| self.has_edge(e.row, e.col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(rows: Vec<Vec<i64>>) -> LabeledGraph<i64> {
        LabeledGraph::standard(WeightMatrix::from_rows(rows).unwrap())
    }

    #[test]
    fn test_label_dimensions_checked() {
        let w = WeightMatrix::from_rows(vec![vec![1i64, 2], vec![3, 4]]).unwrap();
        let err = LabeledGraph::new(w.clone(), vec![0], vec![3, 4]).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                what: "row labels",
                expected: 2,
                got: 1
            }
        );
        assert!(matches!(
            LabeledGraph::new(w.clone(), vec![0, 0], vec![3, 4, 5]),
            Err(Error::DimensionMismatch {
                what: "column labels",
                ..
            })
        ));
        assert!(LabeledGraph::new(w, vec![0, 0], vec![3, 4]).is_ok());
    }

    #[test]
    fn test_equality_subgraph() {
        let g = standard(vec![vec![3, 1], vec![1, 3]]);
        let eq = g.equality_subgraph().unwrap();
        assert_eq!(eq.weight(0, 0), Some(3));
        assert_eq!(eq.weight(0, 1), None);
        assert_eq!(eq.weight(1, 1), Some(3));
        assert_eq!(eq.neighbors_of(&[0, 1]).into_iter().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(g.is_feasible(), Ok(true));

        // (0, 1) has slack 0 + 3 - 1
        let s = BTreeSet::from([0]);
        assert_eq!(g.compute_delta(&s, &s), Ok(2));
    }

    #[test]
    fn test_zero_weights_never_tight() {
        let g = standard(vec![vec![5, 0, 0], vec![0, 5, 0], vec![0, 0, 0]]);
        let eq = g.equality_subgraph().unwrap();
        assert!(!eq.has_edge(2, 2));
        assert!(eq.neighbors_of(&[2]).is_empty());
        assert_eq!(eq.adjacency().edge_count(), 2);
    }

    #[test]
    fn test_matching_queries() {
        let g = standard(vec![vec![3, 1], vec![1, 3]]);
        let mut m = Matching::new(2, 2);
        m.match_pair(0, 0);
        assert!(!g.is_perfect_matching(&m));
        m.match_pair(1, 1);
        assert!(g.is_perfect_matching(&m));
        assert_eq!(g.weight_of_matching(&m), Ok(6));
        assert!(g.equality_subgraph().unwrap().contains_matching(&m));
        assert_eq!(g.neighbors_of(&[0]).len(), 2);
    }

    #[test]
    fn test_matching_weight_overflow_is_an_error() {
        let w = WeightMatrix::from_rows(vec![
            vec![2_000_000_000i32, 1_900_000_000],
            vec![2_000_000_000, 1],
        ])
        .unwrap();
        let g = LabeledGraph::standard(w);
        let mut m = Matching::new(2, 2);
        m.match_pair(0, 1);
        m.match_pair(1, 0);
        assert!(matches!(
            g.weight_of_matching(&m),
            Err(Error::InvalidInput { .. })
        ));

        let huge = LabeledGraph::new(
            WeightMatrix::from_rows(vec![vec![1i32]]).unwrap(),
            vec![i32::MAX],
            vec![1],
        )
        .unwrap();
        assert!(huge.is_feasible().is_err());
        assert!(huge.equality_subgraph().is_err());
    }
}
