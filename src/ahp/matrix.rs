//! Pairwise judgment matrices and their priority/consistency math.

use std::collections::HashMap;

use nalgebra::DMatrix;

use super::AhpError;

/// Pairwise judgments keyed by `(base, compared)` element names.
///
/// A value `v` under `(base, compared)` means "compared is `v` times as
/// good as base". Only one direction per pair needs to be present; the
/// reciprocal is implied.
pub type RatioMap = HashMap<(String, String), f64>;

/// Saaty random consistency index for a given matrix dimension.
///
/// Dimensions 1 and 2 are always perfectly consistent; beyond 9 the index
/// flattens out, so the table saturates at its last value.
fn random_index(dim: usize) -> f64 {
    const TABLE: [f64; 7] = [0.58, 0.9, 1.12, 1.24, 1.32, 1.41, 1.45];
    match dim {
        0..=2 => 0.0,
        d => TABLE[(d - 3).min(TABLE.len() - 1)],
    }
}

/// A pairwise comparison matrix, optionally carrying row names.
///
/// Rows and columns share one index space: cell `(i, j)` holds how much
/// better element `i` is than element `j`. Names are required for the
/// operations that report per-element results and are preserved through
/// the element-wise and multiplicative operations where the row space
/// survives unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    inner: DMatrix<f64>,
    names: Option<Vec<String>>,
}

impl Matrix {
    /// Wrap a raw matrix without names.
    pub fn new(inner: DMatrix<f64>) -> Self {
        Self { inner, names: None }
    }

    /// Wrap a raw matrix with one name per row.
    pub fn with_names(inner: DMatrix<f64>, names: Vec<String>) -> Self {
        assert_eq!(inner.nrows(), names.len(), "one name per row");
        Self {
            inner,
            names: Some(names),
        }
    }

    /// Build a square judgment matrix from a ratio map.
    ///
    /// The diagonal is forced to 1. Off-diagonal cells take the stored
    /// `(base, compared)` judgment where the column element is the base,
    /// or the reciprocal of the opposite direction when only that is
    /// present.
    pub fn from_ratio_map(ratios: &RatioMap, names: &[String]) -> Result<Self, AhpError> {
        let n = names.len();
        let mut inner = DMatrix::zeros(n, n);
        for (row, compared) in names.iter().enumerate() {
            for (col, base) in names.iter().enumerate() {
                inner[(row, col)] = if row == col {
                    1.0
                } else if let Some(&v) = ratios.get(&(base.clone(), compared.clone())) {
                    v
                } else if let Some(&v) = ratios.get(&(compared.clone(), base.clone())) {
                    1.0 / v
                } else {
                    return Err(AhpError::MissingComparison {
                        base: base.clone(),
                        compared: compared.clone(),
                    });
                };
            }
        }
        Ok(Self::with_names(inner, names.to_vec()))
    }

    /// Row names, if the matrix carries any.
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    /// Cell value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.inner[(row, col)]
    }

    /// Matrix product `self * rhs`, keeping `self`'s row names.
    pub fn multiply(&self, rhs: &Self) -> Self {
        Self {
            inner: &self.inner * &rhs.inner,
            names: self.names.clone(),
        }
    }

    /// Element-wise quotient `self / rhs`, keeping `self`'s row names.
    pub fn divided_by(&self, rhs: &Self) -> Self {
        Self {
            inner: self.inner.component_div(&rhs.inner),
            names: self.names.clone(),
        }
    }

    /// Each column divided by its own sum.
    pub fn normalize_columns(&self) -> Self {
        let mut inner = self.inner.clone();
        for mut col in inner.column_iter_mut() {
            let total: f64 = col.iter().sum();
            col /= total;
        }
        Self {
            inner,
            names: self.names.clone(),
        }
    }

    /// Column vector of per-row sums.
    pub fn row_total(&self) -> Self {
        let totals: Vec<f64> = self.inner.row_iter().map(|row| row.iter().sum()).collect();
        Self {
            inner: DMatrix::from_column_slice(totals.len(), 1, &totals),
            names: self.names.clone(),
        }
    }

    /// Column vector of per-row means.
    pub fn row_mean(&self) -> Self {
        let mut totals = self.row_total();
        totals.inner /= self.ncols() as f64;
        totals
    }

    /// Sum of one column.
    pub fn column_total(&self, col: usize) -> f64 {
        self.inner.column(col).iter().sum()
    }

    /// Mean of one column.
    pub fn column_mean(&self, col: usize) -> f64 {
        self.column_total(col) / self.nrows() as f64
    }

    /// Priority weight per row name, normalized to sum to 1.
    ///
    /// Uses the power method on the judgment matrix: squaring it five
    /// times converges the row totals onto the principal eigenvector for
    /// any judgment matrix of practical size.
    pub fn priority_weights(&self) -> Result<HashMap<String, f64>, AhpError> {
        let names = self.names.as_ref().ok_or(AhpError::UnnamedMatrix)?;

        let mut powered = self.clone();
        for _ in 0..5 {
            powered = powered.multiply(&powered);
        }
        let totals = powered.row_total();
        let grand_total = totals.column_total(0);

        Ok(names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), totals.get(i, 0) / grand_total))
            .collect())
    }

    /// Saaty consistency ratio of this judgment matrix.
    ///
    /// Values above 0.1 conventionally indicate judgments too contradictory
    /// to trust. Matrices smaller than 3x3 cannot be inconsistent and
    /// report 0.
    pub fn consistency_ratio(&self) -> f64 {
        let n = self.nrows();
        if n < 3 {
            return 0.0;
        }

        let priorities = self.normalize_columns().row_mean();
        let weighted = self.multiply(&priorities);
        let lambda = weighted.divided_by(&priorities);
        let lambda_max = lambda.column_mean(0);

        let consistency_index = (lambda_max - n as f64) / (n as f64 - 1.0);
        consistency_index / random_index(n)
    }
}
