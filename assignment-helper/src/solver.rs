//! Kuhn-Munkres solver loop.
//!
//! Each outer iteration picks the lowest free row, grows an alternating tree
//! (S rows, T columns) in the equality graph, relabels when the tree cannot
//! reach a new column, and augments once it reaches a free column. Every
//! outer iteration grows the matching by exactly one pair, so a square matrix
//! of size n is done after at most n iterations.
//!
//! While the tree grows, each column outside T keeps the smallest slack of a
//! present edge from S. New tight columns, the relabel delta and the effect of
//! a relabel are then all O(n), and the equality graph is only built once per
//! outer iteration to trace the augmenting path. A solve is O(n^3).

use std::collections::BTreeSet;

use log::{debug, trace};
use rayon::prelude::*;

use crate::augment::{augment, find_augmenting_path, greedy_match, maximum_matching_size};
use crate::error::{Error, Result};
use crate::graph::LabeledGraph;
use crate::labeling::Labeling;
use crate::matching::{Edge, Matching};
use crate::weights::{Weight, WeightMatrix};
use crate::MatrixIndex;

/// Knobs for a single solve.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveOptions<W> {
    /// Largest absolute slack treated as tight.
    pub tolerance: W,
    /// Reject inputs whose 0/1 support has no perfect matching before solving.
    pub check_support: bool,
}

impl<W: Weight> Default for SolveOptions<W> {
    fn default() -> Self {
        Self {
            tolerance: W::default_tolerance(),
            check_support: true,
        }
    }
}

impl<W: Weight> SolveOptions<W> {
    pub fn tolerance(mut self, tolerance: W) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn check_support(mut self, check_support: bool) -> Self {
        self.check_support = check_support;
        self
    }
}

/// Outcome of one outer iteration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// A free row was matched; `matched` is the new matching size.
    Augmented { matched: usize },
    /// The matching is perfect.
    Done,
}

/// Work counters collected during a solve
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Size of the greedy seed matching
    pub seeded: usize,
    pub augmentations: usize,
    pub relabels: usize,
    pub tree_growths: usize,
}

/// A maximum-weight perfect matching with its optimality certificate.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment<W> {
    /// Matched pairs, ordered by row
    pub pairs: Vec<Edge>,
    pub total_weight: W,
    /// Final feasible labeling; its total equals `total_weight`.
    pub labels: Labeling<W>,
    pub stats: SolveStats,
    dual: W,
}

impl<W: Weight> Assignment<W> {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Column assigned to `row`
    pub fn col_of(&self, row: MatrixIndex) -> Option<MatrixIndex> {
        self.pairs.get(row).map(|e| e.col)
    }

    /// Sum of all labels (dual objective)
    pub fn dual_objective(&self) -> W {
        self.dual
    }
}

/// Stepwise Kuhn-Munkres solver owning its labeled graph and matching.
#[derive(Clone, Debug)]
pub struct Solver<W> {
    graph: LabeledGraph<W>,
    matching: Matching,
    stats: SolveStats,
}

impl<W: Weight> Solver<W> {
    /// Prepare a solve seeded with the greedy matching of the initial equality graph.
    pub fn new(graph: LabeledGraph<W>, options: &SolveOptions<W>) -> Result<Self> {
        let graph = Self::prepare(graph, options)?;
        let matching = greedy_match(&graph.equality_subgraph()?);
        debug!(
            "greedy seed matched {} of {} rows",
            matching.size(),
            graph.rows()
        );
        Ok(Self::from_parts(graph, matching))
    }

    /// Prepare a solve from a caller-supplied matching, which must lie in the
    /// equality graph of the given labeling.
    pub fn with_matching(
        graph: LabeledGraph<W>,
        matching: Matching,
        options: &SolveOptions<W>,
    ) -> Result<Self> {
        let graph = Self::prepare(graph, options)?;
        if matching.rows() != graph.rows() {
            return Err(Error::DimensionMismatch {
                what: "matching rows",
                expected: graph.rows(),
                got: matching.rows(),
            });
        }
        if matching.cols() != graph.cols() {
            return Err(Error::DimensionMismatch {
                what: "matching columns",
                expected: graph.cols(),
                got: matching.cols(),
            });
        }
        if !graph.equality_subgraph()?.contains_matching(&matching) {
            return Err(Error::invalid_input(
                "seed matching uses edges outside the equality graph",
            ));
        }
        Ok(Self::from_parts(graph, matching))
    }

    fn from_parts(graph: LabeledGraph<W>, matching: Matching) -> Self {
        let stats = SolveStats {
            seeded: matching.size(),
            ..SolveStats::default()
        };
        Self {
            graph,
            matching,
            stats,
        }
    }

    fn prepare(graph: LabeledGraph<W>, options: &SolveOptions<W>) -> Result<LabeledGraph<W>> {
        graph.weights().ensure_square()?;
        if options.tolerance.is_negative() {
            return Err(Error::invalid_input("tolerance must be nonnegative"));
        }
        let graph = graph.with_tolerance(options.tolerance);
        if !graph.is_feasible()? {
            return Err(Error::invalid_input("initial labeling is not feasible"));
        }
        if options.check_support {
            let n = graph.rows();
            let matchable = maximum_matching_size(&graph.weights().support())?;
            if matchable < n {
                debug!("support admits only {matchable} of {n} rows");
                return Err(Error::NoPerfectMatchingPossible {
                    matched: matchable,
                    size: n,
                });
            }
        }
        Ok(graph)
    }

    pub fn graph(&self) -> &LabeledGraph<W> {
        &self.graph
    }

    pub fn matching(&self) -> &Matching {
        &self.matching
    }

    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    pub fn is_done(&self) -> bool {
        self.graph.is_perfect_matching(&self.matching)
    }

    /// Run one outer iteration: match the lowest free row or report completion.
    pub fn step(&mut self) -> Result<Progress> {
        let Some(root) = self.matching.first_free_row() else {
            return Ok(Progress::Done);
        };

        let n = self.graph.rows();
        if self.stats.augmentations >= n {
            return Err(self.no_perfect_matching());
        }

        let before = self.matching.size();
        self.grow_tree(root)?;
        self.stats.augmentations += 1;
        debug_assert_eq!(self.matching.size(), before + 1);

        Ok(Progress::Augmented {
            matched: self.matching.size(),
        })
    }

    /// Run to completion.
    pub fn run(mut self) -> Result<Assignment<W>> {
        while let Progress::Augmented { .. } = self.step()? {}
        self.finish()
    }

    /// Turn a completed solve into its result.
    pub fn finish(self) -> Result<Assignment<W>> {
        if !self.is_done() {
            return Err(self.no_perfect_matching());
        }
        let pairs: Vec<Edge> = self.matching.edges().collect();
        let total_weight = self.graph.weight_of_matching(&self.matching)?;
        let dual = self.graph.labels().total()?;
        let n = self.graph.rows();
        debug!(
            "solved {n}x{n} assignment: weight {total_weight:?}, {} relabels, {} tree growths",
            self.stats.relabels, self.stats.tree_growths
        );
        Ok(Assignment {
            pairs,
            total_weight,
            labels: self.graph.into_labels(),
            stats: self.stats,
            dual,
        })
    }

    fn no_perfect_matching(&self) -> Error {
        Error::NoPerfectMatchingPossible {
            matched: self.matching.size(),
            size: self.graph.rows(),
        }
    }

    /// Grow an alternating tree from `root` until it reaches a free column,
    /// then augment along it.
    fn grow_tree(&mut self, root: MatrixIndex) -> Result<()> {
        let n = self.graph.rows();
        let tolerance = self.graph.tolerance();
        let mut s: BTreeSet<MatrixIndex> = BTreeSet::from([root]);
        let mut t: BTreeSet<MatrixIndex> = BTreeSet::new();
        let mut in_t = vec![false; n];
        // Per column outside T: smallest slack from S and the row attaining it
        let mut slack: Vec<Option<(W, MatrixIndex)>> = vec![None; n];
        self.record_slacks(root, &in_t, &mut slack)?;
        let mut relabels = 0;

        loop {
            // Smallest column of N(S) \ T in the equality graph
            let next_col = (0..n).find(|&j| {
                !in_t[j] && slack[j].is_some_and(|(d, _)| d.abs() <= tolerance)
            });

            if let Some(y) = next_col {
                match self.matching.mate_of_col(y) {
                    None => return self.augment_from(root, y),
                    Some(z) => {
                        if s.len() >= n {
                            return Err(self.no_perfect_matching());
                        }
                        s.insert(z);
                        t.insert(y);
                        in_t[y] = true;
                        self.stats.tree_growths += 1;
                        self.record_slacks(z, &in_t, &mut slack)?;
                    }
                }
                continue;
            }

            // N(S) == T in the equality graph: relabel.
            if relabels >= n {
                return Err(self.no_perfect_matching());
            }
            let delta = (0..n)
                .filter(|&j| !in_t[j])
                .filter_map(|j| slack[j].map(|(d, _)| d))
                .fold(None, |min: Option<W>, d| match min {
                    Some(m) if m <= d => Some(m),
                    _ => Some(d),
                });
            let Some(delta) = delta else {
                // No present edge leaves S, so |N(S)| = |T| < |S|.
                debug!(
                    "Hall condition fails for {} rows reaching {} columns",
                    s.len(),
                    t.len()
                );
                return Err(self.no_perfect_matching());
            };
            self.graph.apply_delta(&s, &t, delta)?;

            // Every row of S dropped by delta, so each column keeps its argmin row
            for j in (0..n).filter(|&j| !in_t[j]) {
                if let Some((_, i)) = slack[j] {
                    slack[j] = Some((self.graph.slack(i, j)?, i));
                }
            }
            relabels += 1;
            self.stats.relabels += 1;
            trace!(
                "relabel by {delta:?} with |S| = {}, |T| = {}",
                s.len(),
                t.len()
            );
        }
    }

    /// Fold the present edges of a new tree row into the per-column minimum slacks.
    fn record_slacks(
        &self,
        row: MatrixIndex,
        in_t: &[bool],
        slack: &mut [Option<(W, MatrixIndex)>],
    ) -> Result<()> {
        let weights = self.graph.weights();
        for j in 0..weights.cols {
            if in_t[j] || !weights.is_present(row, j) {
                continue;
            }
            let d = self.graph.slack(row, j)?;
            if slack[j].map_or(true, |(best, _)| d < best) {
                slack[j] = Some((d, row));
            }
        }
        Ok(())
    }

    /// Trace the augmenting path from `root` to the free column `free_col` in
    /// the current equality graph and flip it.
    fn augment_from(&mut self, root: MatrixIndex, free_col: MatrixIndex) -> Result<()> {
        let eq = self.graph.equality_subgraph()?;
        let path = find_augmenting_path(&eq, &self.matching, root).ok_or_else(|| {
            Error::invalid_path(format!(
                "column {free_col} is free and reachable but no path from row {root}"
            ))
        })?;
        trace!("augmenting row {root} along {} edges", path.len());
        augment(&eq, &mut self.matching, &path)
    }
}

/// Maximum-weight perfect matching with default options.
pub fn solve<W: Weight>(weights: WeightMatrix<W>) -> Result<Assignment<W>> {
    solve_with(weights, &SolveOptions::default())
}

pub fn solve_with<W: Weight>(
    weights: WeightMatrix<W>,
    options: &SolveOptions<W>,
) -> Result<Assignment<W>> {
    Solver::new(LabeledGraph::standard(weights), options)?.run()
}

/// Solve independent instances in parallel, one solver per instance.
pub fn solve_batch<W: Weight>(batch: &[WeightMatrix<W>]) -> Vec<Result<Assignment<W>>> {
    batch.par_iter().map(|w| solve(w.clone())).collect()
}
