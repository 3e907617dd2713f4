use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};
use nalgebra_sparse::CsrMatrix;
use num_complex::Complex64;
use thiserror::Error;

/// Why a single linear solve failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveFailure {
    #[error("matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },
    #[error("matrix is singular")]
    Singular,
    #[error("right-hand side has length {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("solution contains NaN or Inf")]
    NonFinite,
    #[error("frequency must be positive and finite")]
    InvalidFrequency,
    #[error("frequencies must be strictly ascending")]
    UnorderedFrequency,
    #[error("no factorization stored at index {index}")]
    NoFactorization { index: usize },
    #[error("solver backend failed: {0}")]
    Backend(String),
}

/// A solve that failed at one frequency. The whole forward pass stops there.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("linear solve failed at {frequency} Hz: {source}")]
pub struct SolveError {
    pub frequency: f64,
    #[source]
    pub source: SolveFailure,
}

impl SolveError {
    pub fn new(frequency: f64, source: SolveFailure) -> Self {
        Self { frequency, source }
    }
}

/// A factorized system that can be applied to any number of right-hand sides.
pub trait Factorization {
    fn dimension(&self) -> usize;

    fn solve(&self, rhs: &DVector<Complex64>) -> Result<DVector<Complex64>, SolveFailure>;
}

/// Direct solver capability injected into the forward loop.
pub trait LinearSolver {
    type Factor: Factorization;

    fn factorize(&self, matrix: &CsrMatrix<Complex64>) -> Result<Self::Factor, SolveFailure>;
}

/// LU with partial pivoting on the densified system.
///
/// The system is banded but gets densified, so every factorization costs
/// `O(n³)` in the `2 nC + 1` unknowns. That is fine for skin-depth meshes of a
/// few hundred cells; much finer meshes want a banded or sparse backend behind
/// [`LinearSolver`].
#[derive(Debug, Clone, Copy)]
pub struct DenseLu {
    /// Smallest accepted `min |U_ii| / max |U_ii|`. Zero only rejects exact
    /// zero pivots.
    pub pivot_tolerance: f64,
}

impl Default for DenseLu {
    fn default() -> Self {
        Self {
            pivot_tolerance: 0.0,
        }
    }
}

pub struct DenseLuFactor {
    lu: LU<Complex64, Dyn, Dyn>,
    dimension: usize,
}

pub fn to_dense(matrix: &CsrMatrix<Complex64>) -> DMatrix<Complex64> {
    let mut dense = DMatrix::zeros(matrix.nrows(), matrix.ncols());
    for (i, j, v) in matrix.triplet_iter() {
        dense[(i, j)] += *v;
    }
    dense
}

impl LinearSolver for DenseLu {
    type Factor = DenseLuFactor;

    fn factorize(&self, matrix: &CsrMatrix<Complex64>) -> Result<DenseLuFactor, SolveFailure> {
        let (rows, cols) = (matrix.nrows(), matrix.ncols());
        if rows != cols {
            return Err(SolveFailure::NotSquare { rows, cols });
        }

        let lu = to_dense(matrix).lu();
        if !lu.is_invertible() {
            return Err(SolveFailure::Singular);
        }

        if self.pivot_tolerance > 0.0 {
            let pivots: Vec<f64> = lu.u().diagonal().iter().map(|p| p.norm()).collect();
            let max = pivots.iter().cloned().fold(0.0, f64::max);
            let min = pivots.iter().cloned().fold(f64::INFINITY, f64::min);
            if !(min / max > self.pivot_tolerance) {
                return Err(SolveFailure::Singular);
            }
        }

        Ok(DenseLuFactor {
            lu,
            dimension: rows,
        })
    }
}

impl Factorization for DenseLuFactor {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn solve(&self, rhs: &DVector<Complex64>) -> Result<DVector<Complex64>, SolveFailure> {
        if rhs.len() != self.dimension {
            return Err(SolveFailure::DimensionMismatch {
                expected: self.dimension,
                found: rhs.len(),
            });
        }
        let x = self.lu.solve(rhs).ok_or(SolveFailure::Singular)?;
        if !x.iter().all(|v| v.re.is_finite() && v.im.is_finite()) {
            return Err(SolveFailure::NonFinite);
        }
        Ok(x)
    }
}
