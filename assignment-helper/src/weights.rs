//! Dense weight matrices and the numeric trait their entries satisfy.

use std::fmt::Debug;

use num_traits::{CheckedAdd, CheckedSub, Signed};

use crate::adjacency::Adjacency;
use crate::error::{Error, Result};

/// Numeric type usable as an edge weight and vertex label.
///
/// Row labels are decreased below zero during relabeling, so only signed
/// types qualify.
pub trait Weight: Signed + Copy + PartialOrd + Debug + Send + Sync + 'static {
    /// Largest absolute slack still considered tight.
    fn default_tolerance() -> Self;

    /// False for NaN and infinities.
    fn is_finite_weight(self) -> bool {
        true
    }

    /// `self + rhs`, or `None` when the sum leaves the representable range.
    fn add_weight(self, rhs: Self) -> Option<Self>;

    /// `self - rhs`, or `None` when the difference leaves the representable range.
    fn sub_weight(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_weight_int {
    ($($t:ty),*) => {
        $(impl Weight for $t {
            fn default_tolerance() -> Self {
                0
            }

            fn add_weight(self, rhs: Self) -> Option<Self> {
                CheckedAdd::checked_add(&self, &rhs)
            }

            fn sub_weight(self, rhs: Self) -> Option<Self> {
                CheckedSub::checked_sub(&self, &rhs)
            }
        })*
    };
}

macro_rules! impl_weight_float {
    ($($t:ty => $eps:expr),*) => {
        $(impl Weight for $t {
            fn default_tolerance() -> Self {
                $eps
            }

            fn is_finite_weight(self) -> bool {
                self.is_finite()
            }

            fn add_weight(self, rhs: Self) -> Option<Self> {
                Some(self + rhs).filter(|v| v.is_finite())
            }

            fn sub_weight(self, rhs: Self) -> Option<Self> {
                Some(self - rhs).filter(|v| v.is_finite())
            }
        })*
    };
}

impl_weight_int!(i32, i64);
impl_weight_float!(f32 => 1e-4, f64 => 1e-9);

/// Immutable row-major matrix of nonnegative weights.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightMatrix<W> {
    pub rows: usize,
    pub cols: usize,
    data: Vec<W>,
}

impl<W: Weight> WeightMatrix<W> {
    /// Validate and store a matrix given as a list of rows.
    ///
    /// Rejects empty input, ragged rows, negative entries and non-finite entries.
    pub fn from_rows(matrix: Vec<Vec<W>>) -> Result<Self> {
        let rows = matrix.len();
        let cols = matrix.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(Error::invalid_input("weight matrix is empty"));
        }

        let mut data = Vec::with_capacity(rows * cols);
        for (i, row) in matrix.into_iter().enumerate() {
            if row.len() != cols {
                return Err(Error::invalid_input(format!(
                    "row {i} has {} entries, expected {cols}",
                    row.len()
                )));
            }
            for (j, w) in row.into_iter().enumerate() {
                if !w.is_finite_weight() {
                    return Err(Error::invalid_input(format!(
                        "weight at ({i}, {j}) is not finite"
                    )));
                }
                if w.is_negative() {
                    return Err(Error::invalid_input(format!(
                        "weight at ({i}, {j}) is negative: {w:?}"
                    )));
                }
                data.push(w);
            }
        }

        Ok(Self { rows, cols, data })
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn ensure_square(&self) -> Result<()> {
        if self.is_square() {
            Ok(())
        } else {
            Err(Error::invalid_input(format!(
                "a perfect matching needs a square matrix, got {}x{}",
                self.rows, self.cols
            )))
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> W {
        self.data[row * self.cols + col]
    }

    /// An edge is present iff its weight is nonzero.
    #[inline]
    pub fn is_present(&self, row: usize, col: usize) -> bool {
        !self.get(row, col).is_zero()
    }

    pub fn row(&self, row: usize) -> &[W] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Largest weight in each column.
    pub fn column_maxima(&self) -> Vec<W> {
        let mut maxima = self.row(0).to_vec();
        for i in 1..self.rows {
            for (max, &w) in maxima.iter_mut().zip(self.row(i)) {
                if w > *max {
                    *max = w;
                }
            }
        }
        maxima
    }

    /// 0/1 support: the present edges regardless of labels.
    pub fn support(&self) -> Adjacency {
        Adjacency::from_fn(self.rows, self.cols, |r, c| self.is_present(r, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_bad_input() {
        assert!(matches!(
            WeightMatrix::<i64>::from_rows(vec![]),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            WeightMatrix::from_rows(vec![vec![1i64, 2], vec![3]]),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            WeightMatrix::from_rows(vec![vec![1i64, -2]]),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            WeightMatrix::from_rows(vec![vec![1.0f64, f64::NAN]]),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_column_maxima_and_support() {
        let m = WeightMatrix::from_rows(vec![vec![3i64, 0, 2], vec![1, 5, 0]]).unwrap();
        assert_eq!(m.column_maxima(), vec![3, 5, 2]);
        assert!(!m.is_square());
        assert!(m.ensure_square().is_err());

        let support = m.support();
        assert!(support.get(0, 0));
        assert!(!support.get(0, 1));
        assert_eq!(support.edge_count(), 4);
    }

    #[test]
    fn test_checked_label_arithmetic() {
        assert_eq!(2i32.add_weight(3), Some(5));
        assert_eq!(i32::MAX.add_weight(1), None);
        assert_eq!(i64::MIN.sub_weight(1), None);
        assert_eq!(1.5f64.sub_weight(0.5), Some(1.0));
        assert_eq!(f64::MAX.add_weight(f64::MAX), None);
        assert_eq!(f32::MAX.add_weight(f32::MAX), None);
    }
}
