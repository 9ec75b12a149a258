//! Matching construction and augmentation.
//!
//! The search for augmenting paths is a Kuhn-style depth-first search over a
//! 0/1 adjacency: from a row it tries non-matching edges in increasing column
//! order, and from a matched column it continues along the matching edge to the
//! column's row. Visited rows and columns stay marked for the whole search, so
//! no vertex is entered twice and the search is linear in the number of edges.
//! The solver runs it on the equality graph; the support check runs it on the
//! nonzero pattern of the weights.

use smallvec::SmallVec;

use crate::adjacency::Adjacency;
use crate::error::{Error, Result};
use crate::graph::EqualityGraph;
use crate::matching::{Edge, Matching, Side};
use crate::weights::Weight;
use crate::{MatrixIndex, INLINE_PATH_CAPACITY};

/// Alternating sequence of edges starting at a free row and ending at a free
/// column. Even positions are non-matching edges, odd positions matching edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AugmentingPath {
    edges: SmallVec<[Edge; INLINE_PATH_CAPACITY]>,
}

impl AugmentingPath {
    /// Wrap a sequence of edges without validation; `augment` checks it.
    pub fn from_edges_unchecked(edges: impl IntoIterator<Item = Edge>) -> Self {
        Self {
            edges: edges.into_iter().collect(),
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn root(&self) -> Option<MatrixIndex> {
        self.edges.first().map(|e| e.row)
    }

    pub fn terminal(&self) -> Option<MatrixIndex> {
        self.edges.last().map(|e| e.col)
    }
}

/// Greedy seed matching: each row in order takes its lowest tight column not yet taken.
pub fn greedy_match<W: Weight>(eq: &EqualityGraph<'_, W>) -> Matching {
    let mut matching = Matching::new(eq.rows(), eq.cols());
    for row in 0..eq.rows() {
        let free_col = eq
            .row_neighbors(row)
            .find(|&col| matching.is_free(col, Side::Col));
        if let Some(col) = free_col {
            matching.match_pair(row, col);
        }
    }
    matching
}

struct SearchState<'m> {
    matching: &'m Matching,
    visited_rows: Vec<bool>,
    visited_cols: Vec<bool>,
    path: SmallVec<[Edge; INLINE_PATH_CAPACITY]>,
}

/// Search the equality graph for an augmenting path rooted at `free_row`.
///
/// Returns `None` if `free_row` is matched or no augmenting path starts there.
pub fn find_augmenting_path<W: Weight>(
    eq: &EqualityGraph<'_, W>,
    matching: &Matching,
    free_row: MatrixIndex,
) -> Option<AugmentingPath> {
    search(eq.adjacency(), matching, free_row)
}

fn search(
    adjacency: &Adjacency,
    matching: &Matching,
    free_row: MatrixIndex,
) -> Option<AugmentingPath> {
    if !matching.is_free(free_row, Side::Row) {
        return None;
    }

    let mut state = SearchState {
        matching,
        visited_rows: vec![false; adjacency.rows],
        visited_cols: vec![false; adjacency.cols],
        path: SmallVec::new(),
    };
    state.visited_rows[free_row] = true;

    if extend_from_row(adjacency, &mut state, free_row) {
        Some(AugmentingPath { edges: state.path })
    } else {
        None
    }
}

fn extend_from_row(adjacency: &Adjacency, state: &mut SearchState<'_>, row: MatrixIndex) -> bool {
    for col in adjacency.row_neighbors(row) {
        if state.visited_cols[col] || state.matching.mate_of_row(row) == Some(col) {
            continue;
        }
        state.visited_cols[col] = true;
        state.path.push(Edge::new(row, col));

        match state.matching.mate_of_col(col) {
            None => return true,
            Some(next) if !state.visited_rows[next] => {
                state.visited_rows[next] = true;
                state.path.push(Edge::new(next, col));
                if extend_from_row(adjacency, state, next) {
                    return true;
                }
                state.path.pop();
            }
            Some(_) => {}
        }

        state.path.pop();
    }
    false
}

/// Maximum cardinality matching of a 0/1 adjacency.
///
/// One search per row in increasing order. A row with no augmenting path
/// stays free: later augmentations never open a path for it.
pub fn maximum_matching(adjacency: &Adjacency) -> Result<Matching> {
    let mut matching = Matching::new(adjacency.rows, adjacency.cols);
    for row in 0..adjacency.rows {
        if let Some(path) = search(adjacency, &matching, row) {
            flip(&mut matching, &path)?;
        }
    }
    Ok(matching)
}

/// Number of rows a maximum matching of `adjacency` covers
pub fn maximum_matching_size(adjacency: &Adjacency) -> Result<usize> {
    Ok(maximum_matching(adjacency)?.size())
}

/// Flip `path` into the matching: even-position edges are added, odd-position
/// edges removed. The matching grows by exactly one pair.
pub fn augment<W: Weight>(
    eq: &EqualityGraph<'_, W>,
    matching: &mut Matching,
    path: &AugmentingPath,
) -> Result<()> {
    validate_path(eq, matching, path)?;
    flip(matching, path)
}

fn flip(matching: &mut Matching, path: &AugmentingPath) -> Result<()> {
    for edge in path.edges().iter().skip(1).step_by(2) {
        if !matching.unmatch(*edge) {
            return Err(Error::invalid_path(format!(
                "edge {edge:?} left the matching before it was flipped"
            )));
        }
    }
    for edge in path.edges().iter().step_by(2) {
        matching.match_pair(edge.row, edge.col);
    }
    Ok(())
}

fn validate_path<W: Weight>(
    eq: &EqualityGraph<'_, W>,
    matching: &Matching,
    path: &AugmentingPath,
) -> Result<()> {
    let edges = path.edges();
    if edges.len() % 2 == 0 {
        return Err(Error::invalid_path(format!(
            "expected an odd number of edges, got {}",
            edges.len()
        )));
    }
    for (k, e) in edges.iter().enumerate() {
        if e.row >= eq.rows() || e.col >= eq.cols() {
            return Err(Error::invalid_path(format!("edge {k} {e:?} out of bounds")));
        }
    }
    // Rows and columns of the path are those of its even edges
    let mut seen_rows = vec![false; eq.rows()];
    let mut seen_cols = vec![false; eq.cols()];
    for e in edges.iter().step_by(2) {
        if seen_rows[e.row] || seen_cols[e.col] {
            return Err(Error::invalid_path(format!(
                "edge {e:?} revisits a vertex of the path"
            )));
        }
        seen_rows[e.row] = true;
        seen_cols[e.col] = true;
    }

    let (first, last) = (edges[0], edges[edges.len() - 1]);
    if !matching.is_free(first.row, Side::Row) {
        return Err(Error::invalid_path(format!(
            "path starts at matched row {}",
            first.row
        )));
    }
    if !matching.is_free(last.col, Side::Col) {
        return Err(Error::invalid_path(format!(
            "path ends at matched column {}",
            last.col
        )));
    }

    for (k, e) in edges.iter().enumerate() {
        if !eq.has_edge(e.row, e.col) {
            return Err(Error::invalid_path(format!(
                "edge {k} {e:?} is not in the equality graph"
            )));
        }
        let should_be_matched = k % 2 == 1;
        if matching.contains(*e) != should_be_matched {
            return Err(Error::invalid_path(format!(
                "edge {k} {e:?} does not alternate with the matching"
            )));
        }
        if let Some(next) = edges.get(k + 1) {
            let linked = if k % 2 == 0 {
                e.col == next.col
            } else {
                e.row == next.row
            };
            if !linked {
                return Err(Error::invalid_path(format!(
                    "edges {k} and {} are not adjacent",
                    k + 1
                )));
            }
        }
    }
    Ok(())
}
