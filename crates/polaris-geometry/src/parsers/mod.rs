//! File format parsers for importing molecular geometries.
//!
//! Supported formats:
//! - [`.xyz`](xyz): XYZ molecular coordinate files
//! - [geometry blocks](block): `charge multiplicity` header, atom lines and
//!   `units` directive, as used by quantum-chemistry input files

pub mod block;
pub mod xyz;

use std::path::Path;

use polaris_core::types::Molecule;
use thiserror::Error;

/// Errors during geometry file parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    FormatError { line: usize, message: String },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Parse one `element x y z` line.
pub(crate) fn parse_atom_line(
    line: &str,
    line_no: usize,
) -> Result<(String, [f64; 3]), ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(ParseError::FormatError {
            line: line_no,
            message: format!("Expected 'element x y z', got '{}'", line),
        });
    }

    let mut position = [0.0; 3];
    for (c, axis) in ["x", "y", "z"].iter().enumerate() {
        let value: f64 = parts[c + 1].parse().map_err(|_| ParseError::FormatError {
            line: line_no,
            message: format!("Invalid {} coordinate: {}", axis, parts[c + 1]),
        })?;
        if !value.is_finite() {
            return Err(ParseError::FormatError {
                line: line_no,
                message: format!("Non-finite {} coordinate: {}", axis, parts[c + 1]),
            });
        }
        position[c] = value;
    }
    Ok((parts[0].to_string(), position))
}

/// Load a molecule from disk, choosing the parser by file extension.
///
/// `.xyz` files use the XYZ parser; `.geom`, `.dat` and `.txt` files are
/// read as geometry blocks. The molecule is named after `name`.
pub fn load_molecule(path: &Path, name: &str) -> Result<Molecule, ParseError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let content = std::fs::read_to_string(path)?;

    let molecule = match ext.as_str() {
        "xyz" => xyz::parse_xyz(&content, name)?,
        "geom" | "dat" | "txt" => block::parse_geometry_block(&content, name)?,
        other => return Err(ParseError::UnsupportedFormat(other.to_string())),
    };
    log::debug!(
        "loaded {} atoms for '{}' from {}",
        molecule.len(),
        name,
        path.display()
    );
    Ok(molecule)
}
