//! Parser for `.xyz` molecular coordinate files.
//!
//! The XYZ format is a simple plain-text format:
//! ```text
//! <num_atoms>
//! <comment line>
//! <element> <x> <y> <z>
//! <element> <x> <y> <z>
//! ...
//! ```
//!
//! Coordinates are in angstroms and are kept in angstroms. The molecule is
//! taken to be neutral and closed-shell.

use polaris_core::types::{Atom, Molecule};

use super::{parse_atom_line, ParseError};

/// Parse an XYZ file from a string.
pub fn parse_xyz(content: &str, name: &str) -> Result<Molecule, ParseError> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 3 {
        return Err(ParseError::FormatError {
            line: 1,
            message: "XYZ file must have at least 3 lines".into(),
        });
    }

    let num_atoms: usize = lines[0].trim().parse().map_err(|_| ParseError::FormatError {
        line: 1,
        message: "First line must be the number of atoms".into(),
    })?;

    // Line 2 is the comment line (ignored)

    let mut atoms = Vec::with_capacity(num_atoms);
    for (idx, line) in lines[2..].iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (element, position) = parse_atom_line(line, idx + 3)?;
        atoms.push(Atom::new(element, position));
    }

    if atoms.len() != num_atoms {
        return Err(ParseError::FormatError {
            line: 1,
            message: format!("Header says {} atoms but found {}", num_atoms, atoms.len()),
        });
    }

    Ok(Molecule::new(name, atoms))
}

/// Render a molecule as XYZ text, coordinates in angstrom.
pub fn to_xyz(molecule: &Molecule) -> String {
    let mut s = format!("{}\n{}\n", molecule.len(), molecule.name);
    for atom in &molecule.atoms {
        s.push_str(&format!(
            "{} {:.6} {:.6} {:.6}\n",
            atom.element, atom.position[0], atom.position[1], atom.position[2]
        ));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xyz() {
        let content = "3\nLiNbO3 fragment\nLi 0.0 0.0 0.0\nNb 0.0 0.0 2.5\nO 1.0607 0.6124 1.25\n";
        let mol = parse_xyz(content, "frag").unwrap();
        assert_eq!(mol.len(), 3);
        assert_eq!(mol.name, "frag");
        assert_eq!(mol.atoms[1].element, "Nb");
        assert!((mol.atoms[1].position[2] - 2.5).abs() < 1e-12);
        assert_eq!(mol.charge, 0);
        assert_eq!(mol.multiplicity, 1);
    }

    #[test]
    fn test_roundtrip_through_text() {
        let content = "2\nx\nLi 0.0 0.0 0.0\nO 1.5 -0.25 3.0\n";
        let mol = parse_xyz(content, "LiO").unwrap();
        let again = parse_xyz(&to_xyz(&mol), "LiO").unwrap();
        assert_eq!(mol, again);
    }

    /// Test error handling: atom count mismatch.
    #[test]
    fn test_parse_xyz_count_mismatch() {
        let content = "5\nWrong count\nLi 0.0 0.0 0.0\nO 1.0 0.0 0.0\n";
        let result = parse_xyz(content, "bad");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("5") && err.contains("2"),
            "Error should mention expected vs actual count: {}",
            err
        );
    }

    /// Test error handling: malformed coordinate line.
    #[test]
    fn test_parse_xyz_bad_coordinate() {
        let content = "1\nBad data\nNb 1.0 xyz 3.0\n";
        let result = parse_xyz(content, "bad");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid"));
    }

    /// Test empty lines are skipped correctly.
    #[test]
    fn test_parse_xyz_empty_lines() {
        let content = "2\nWith blanks\nLi 0.0 0.0 0.0\n\nO 1.0 1.0 1.0\n\n";
        let mol = parse_xyz(content, "blank").unwrap();
        assert_eq!(mol.len(), 2);
    }
}
