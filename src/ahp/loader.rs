//! CSV parsing for hand-authored criteria judgment matrices.
//!
//! Files are square grids: the header row names the base elements, the
//! first column names the compared elements, and each cell holds how much
//! better the row element is than the column element. Only one triangle
//! needs to be filled in; blank and quoted cells (commentary left in the
//! sheet) are ignored and completed via the reciprocal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use super::matrix::{Matrix, RatioMap};
use super::AhpError;

/// Parse a judgment matrix from CSV text.
pub fn parse_matrix_csv(text: &str) -> Result<Matrix, AhpError> {
    let mut lines = text.lines().enumerate();
    let (_, header) = lines.next().ok_or(AhpError::Parse {
        line: 1,
        message: "empty file".to_string(),
    })?;
    let names: Vec<String> = header
        .split(',')
        .skip(1)
        .map(|s| s.trim().to_string())
        .collect();
    if names.is_empty() {
        return Err(AhpError::Parse {
            line: 1,
            message: "header names no elements".to_string(),
        });
    }

    let mut ratios = RatioMap::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        let compared = cells[0].trim();
        for (base, cell) in names.iter().zip(cells[1..].iter()) {
            let cell = cell.trim();
            // Blank cells are the unfilled triangle; quoted cells hold
            // free-form notes, not judgments.
            if cell.is_empty() || cell.contains('"') {
                continue;
            }
            let value: f64 = cell.parse().map_err(|_| AhpError::Parse {
                line: index + 1,
                message: format!("'{cell}' is not a number"),
            })?;
            ratios.insert((base.clone(), compared.to_string()), value);
        }
    }

    Matrix::from_ratio_map(&ratios, &names)
}

/// Read and parse a judgment matrix from a CSV file.
pub fn matrix_from_csv(path: &Path) -> Result<Matrix, AhpError> {
    let reader = BufReader::new(File::open(path)?);
    let mut text = String::new();
    for line in reader.lines() {
        text.push_str(&line?);
        text.push('\n');
    }
    debug!(path = %path.display(), "loaded judgment file");
    parse_matrix_csv(&text)
}
