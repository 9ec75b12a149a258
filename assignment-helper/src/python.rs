//! Python bindings, built with the `python` feature.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::Error;
use crate::solver::{solve_batch, solve_with, Assignment, SolveOptions};
use crate::weights::{Weight, WeightMatrix};

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Result of a maximum-weight perfect matching
#[pyclass]
#[derive(Clone)]
pub struct AssignmentResult {
    /// Matched (row, column) pairs, ordered by row
    #[pyo3(get)]
    pub pairs: Vec<(usize, usize)>,
    #[pyo3(get)]
    pub weight: f64,
    /// Final row labels; together with col_labels they certify optimality
    #[pyo3(get)]
    pub row_labels: Vec<f64>,
    #[pyo3(get)]
    pub col_labels: Vec<f64>,
    #[pyo3(get)]
    pub relabels: usize,
}

impl From<Assignment<f64>> for AssignmentResult {
    fn from(a: Assignment<f64>) -> Self {
        Self {
            pairs: a.pairs.iter().map(|e| (e.row, e.col)).collect(),
            weight: a.total_weight,
            row_labels: a.labels.rows,
            col_labels: a.labels.cols,
            relabels: a.stats.relabels,
        }
    }
}

#[pymethods]
impl AssignmentResult {
    fn __repr__(&self) -> String {
        format!(
            "AssignmentResult(pairs={:?}, weight={})",
            self.pairs, self.weight
        )
    }

    fn __len__(&self) -> usize {
        self.pairs.len()
    }

    /// Sum of all labels; equals `weight` for an optimal matching.
    #[getter]
    fn dual_objective(&self) -> f64 {
        self.row_labels.iter().chain(&self.col_labels).sum()
    }
}

/// Compute a maximum-weight perfect matching of a square matrix.
///
/// Args:
///     matrix: A list of lists of nonnegative floats. Zero entries are non-edges.
///     tolerance: Largest absolute slack treated as tight.
///     check_support: Reject matrices whose nonzero pattern has no perfect matching up front.
///
/// Raises:
///     ValueError if the input is invalid or no perfect matching exists.
#[pyfunction]
#[pyo3(signature = (matrix, tolerance=None, check_support=true))]
fn max_weight_matching(
    py: Python<'_>,
    matrix: Vec<Vec<f64>>,
    tolerance: Option<f64>,
    check_support: bool,
) -> PyResult<AssignmentResult> {
    let weights = WeightMatrix::from_rows(matrix)?;
    let options = SolveOptions::default()
        .tolerance(tolerance.unwrap_or_else(f64::default_tolerance))
        .check_support(check_support);
    let assignment = py.allow_threads(|| solve_with(weights, &options))?;
    Ok(assignment.into())
}

/// Solve several independent matrices in parallel.
///
/// Raises ValueError for the first matrix that fails.
#[pyfunction]
fn max_weight_matching_batch(
    py: Python<'_>,
    matrices: Vec<Vec<Vec<f64>>>,
) -> PyResult<Vec<AssignmentResult>> {
    let batch = matrices
        .into_iter()
        .map(WeightMatrix::from_rows)
        .collect::<Result<Vec<_>, _>>()?;
    let results = py.allow_threads(|| solve_batch(&batch));
    results
        .into_iter()
        .map(|r| r.map(AssignmentResult::from).map_err(PyErr::from))
        .collect()
}

/// Python module for assignment helpers
#[pymodule]
fn assignment_helper(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(max_weight_matching, m)?)?;
    m.add_function(wrap_pyfunction!(max_weight_matching_batch, m)?)?;
    m.add_class::<AssignmentResult>()?;
    Ok(())
}
