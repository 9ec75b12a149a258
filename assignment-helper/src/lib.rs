//! Maximum-weight perfect matching on dense weight matrices.
//!
//! Implements the Kuhn-Munkres (Hungarian) method with vertex labels: a
//! feasible labeling is kept at all times, matchings grow inside the equality
//! graph of tight edges, and labels are adjusted whenever the alternating tree
//! gets stuck. At termination the total weight equals the sum of the labels,
//! which certifies optimality.
//!
//! Zero entries are treated as missing edges. Matrices whose nonzero pattern
//! has no perfect matching are rejected with
//! [`Error::NoPerfectMatchingPossible`].
//!
//! Python bindings are available behind the `python` feature.

mod adjacency;
mod augment;
mod bitlist;
mod error;
mod graph;
mod labeling;
mod matching;
mod solver;
mod weights;

#[cfg(feature = "python")]
mod python;

#[cfg(test)]
mod tests;

pub use adjacency::Adjacency;
pub use augment::{
    augment, find_augmenting_path, greedy_match, maximum_matching, maximum_matching_size,
    AugmentingPath,
};
pub use error::{Error, Result};
pub use graph::{EqualityGraph, LabeledGraph};
pub use labeling::{apply_delta, compute_delta, Labeling};
pub use matching::{Edge, Matching, Side};
pub use solver::{
    solve, solve_batch, solve_with, Assignment, Progress, SolveOptions, SolveStats, Solver,
};
pub use weights::{Weight, WeightMatrix};

pub type MatrixIndex = usize;
pub const INLINE_PATH_CAPACITY: usize = 16;
