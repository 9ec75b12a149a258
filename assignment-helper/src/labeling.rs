//! Vertex labels and the label adjustment step.
//!
//! A labeling is feasible when `rows[i] + cols[j] >= weight(i, j)` for every
//! present edge. Adjustment lowers the labels of the tree rows S and raises the
//! labels of the tree columns T by the same delta, so edges inside the tree and
//! matched edges keep their slack while some edge from S to outside T becomes tight.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::weights::{Weight, WeightMatrix};
use crate::MatrixIndex;

#[derive(Clone, Debug, PartialEq)]
pub struct Labeling<W> {
    pub rows: Vec<W>,
    pub cols: Vec<W>,
}

impl<W: Weight> Labeling<W> {
    /// Row labels 0, column labels the column maxima. Feasible without further work.
    pub fn trivial(weights: &WeightMatrix<W>) -> Self {
        Self {
            rows: vec![W::zero(); weights.rows],
            cols: weights.column_maxima(),
        }
    }

    /// `rows[row] + cols[col] - weight(row, col)`; fails if the arithmetic overflows.
    #[inline]
    pub fn slack(
        &self,
        weights: &WeightMatrix<W>,
        row: MatrixIndex,
        col: MatrixIndex,
    ) -> Result<W> {
        self.rows[row]
            .add_weight(self.cols[col])
            .and_then(|sum| sum.sub_weight(weights.get(row, col)))
            .ok_or_else(Error::overflow)
    }

    /// Sum of all labels: an upper bound on the weight of any perfect matching.
    pub fn total(&self) -> Result<W> {
        self.rows
            .iter()
            .chain(self.cols.iter())
            .try_fold(W::zero(), |acc, &l| acc.add_weight(l))
            .ok_or_else(Error::overflow)
    }
}

/// Smallest slack over present edges from a row in `s` to a column outside `t`.
///
/// Fails with `NoImprovingDelta` when `s` is empty or no such edge exists.
pub fn compute_delta<W: Weight>(
    weights: &WeightMatrix<W>,
    labels: &Labeling<W>,
    s: &BTreeSet<MatrixIndex>,
    t: &BTreeSet<MatrixIndex>,
) -> Result<W> {
    let mut delta: Option<W> = None;
    for &i in s {
        for j in (0..weights.cols).filter(|j| !t.contains(j)) {
            if !weights.is_present(i, j) {
                continue;
            }
            let slack = labels.slack(weights, i, j)?;
            if delta.map_or(true, |d| slack < d) {
                delta = Some(slack);
            }
        }
    }
    delta.ok_or(Error::NoImprovingDelta)
}

/// Subtract `delta` from row labels in `s`, add it to column labels in `t`.
///
/// Leaves `labels` untouched if any adjusted label overflows.
pub fn apply_delta<W: Weight>(
    labels: &mut Labeling<W>,
    s: &BTreeSet<MatrixIndex>,
    t: &BTreeSet<MatrixIndex>,
    delta: W,
) -> Result<()> {
    let rows = s
        .iter()
        .map(|&i| labels.rows[i].sub_weight(delta).map(|l| (i, l)))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(Error::overflow)?;
    let cols = t
        .iter()
        .map(|&j| labels.cols[j].add_weight(delta).map(|l| (j, l)))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(Error::overflow)?;

    for (i, l) in rows {
        labels.rows[i] = l;
    }
    for (j, l) in cols {
        labels.cols[j] = l;
    }
    Ok(())
}
