//! Registry of criteria and comparison matrices keyed by name.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::loader::matrix_from_csv;
use super::matrix::Matrix;
use super::AhpError;

/// Holds every judgment matrix the solver can refer to.
///
/// Criteria matrices weigh decision criteria against their siblings and
/// define the shape of the criteria tree; comparison matrices score the
/// alternatives at the leaves. A name may appear in both maps: the tree
/// builder treats a criterion-matrix entry as "has sub-criteria" and a
/// comparison-matrix entry as "is a leaf".
#[derive(Debug, Default)]
pub struct MatrixCache {
    criteria: HashMap<String, Matrix>,
    comparisons: HashMap<String, Matrix>,
}

impl MatrixCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a criterion matrix under a name.
    pub fn put_criterion(&mut self, name: &str, matrix: Matrix) {
        self.criteria.insert(name.to_string(), matrix);
    }

    /// Register a comparison matrix under a name.
    pub fn put_comparison(&mut self, name: &str, matrix: Matrix) {
        self.comparisons.insert(name.to_string(), matrix);
    }

    /// Whether a criterion matrix is registered under this name.
    pub fn contains_criterion(&self, name: &str) -> bool {
        self.criteria.contains_key(name)
    }

    /// The criterion matrix registered under this name.
    pub fn get_criterion(&self, name: &str) -> Result<&Matrix, AhpError> {
        self.criteria
            .get(name)
            .ok_or_else(|| AhpError::UnknownMatrix(name.to_string()))
    }

    /// The comparison matrix registered under this name.
    pub fn get_comparison(&self, name: &str) -> Result<&Matrix, AhpError> {
        self.comparisons
            .get(name)
            .ok_or_else(|| AhpError::UnknownMatrix(name.to_string()))
    }

    /// Names inside `parent`'s criterion matrix that are themselves
    /// registered as criteria.
    pub fn children(&self, parent: &str) -> Result<Vec<String>, AhpError> {
        let matrix = self.get_criterion(parent)?;
        let names = matrix.names().ok_or(AhpError::UnnamedMatrix)?;
        Ok(names
            .iter()
            .filter(|n| self.contains_criterion(n))
            .cloned()
            .collect())
    }

    /// Load a CSV judgment file as a criterion matrix.
    ///
    /// The criterion name is the file stem with underscores turned into
    /// spaces, so `query_performance.csv` registers "query performance".
    pub fn load_criterion_file(&mut self, path: &Path) -> Result<(), AhpError> {
        let name = Self::criterion_name(path);
        let matrix = matrix_from_csv(path)?;
        debug!(criterion = %name, "registered criterion matrix");
        self.put_criterion(&name, matrix);
        Ok(())
    }

    /// Load every `.csv` file in a directory as a criterion matrix.
    pub fn load_criteria_dir(&mut self, dir: &Path) -> Result<(), AhpError> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                self.load_criterion_file(&path)?;
            }
        }
        Ok(())
    }

    fn criterion_name(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().replace('_', " "))
            .unwrap_or_default()
    }
}
