//! Analytic Hierarchy Process ranking over benchmark results.
//!
//! Criteria matrices express how much each decision criterion matters
//! relative to its siblings; comparison matrices at the leaves score the
//! alternatives (the benchmarked targets) against each other. Criteria
//! matrices are authored as CSV judgment files, comparison matrices are
//! derived from measured speedups, and [`AhpSolver`] propagates priority
//! weights down the criteria tree to produce one ranked score per target.

use std::fmt;

mod cache;
mod loader;
mod matrix;
mod solver;
mod tree;

pub use cache::MatrixCache;
pub use loader::{matrix_from_csv, parse_matrix_csv};
pub use matrix::{Matrix, RatioMap};
pub use solver::AhpSolver;
pub use tree::CriteriaNode;

/// Errors from building or evaluating AHP matrices.
#[derive(Debug)]
pub enum AhpError {
    /// A pairwise judgment (and its reciprocal) is absent from a ratio map.
    MissingComparison {
        /// Base element of the missing pair.
        base: String,
        /// Compared element of the missing pair.
        compared: String,
    },
    /// An operation needed row names but the matrix carries none.
    UnnamedMatrix,
    /// No matrix is registered under this name.
    UnknownMatrix(String),
    /// A CSV judgment file could not be parsed.
    Parse {
        /// 1-based line number within the file.
        line: usize,
        /// What went wrong on that line.
        message: String,
    },
    /// Reading a judgment file failed.
    Io(std::io::Error),
}

impl fmt::Display for AhpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingComparison { base, compared } => write!(
                f,
                "no pairwise judgment between '{base}' and '{compared}' in either direction"
            ),
            Self::UnnamedMatrix => write!(f, "operation requires a matrix with row names"),
            Self::UnknownMatrix(name) => write!(f, "no matrix registered under '{name}'"),
            Self::Parse { line, message } => write!(f, "judgment CSV line {line}: {message}"),
            Self::Io(err) => write!(f, "failed to read judgment file: {err}"),
        }
    }
}

impl std::error::Error for AhpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AhpError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
