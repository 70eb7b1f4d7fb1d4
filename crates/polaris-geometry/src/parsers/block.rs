//! Parser for geometry blocks in quantum-chemistry input style.
//!
//! ```text
//! 0 1
//! Li  0.0000  0.0000  0.0000
//! Nb  0.0000  0.0000  2.5000
//! units angstrom
//! symmetry c1
//! ```
//!
//! The optional first line holds the net charge and spin multiplicity
//! (default `0 1`). Directive lines may appear anywhere: `units` selects
//! angstrom (default) or bohr, and `symmetry`, `no_com` and `no_reorient`
//! are accepted and ignored. Blank lines and `#` comments are skipped.
//! Coordinates are always returned in angstrom.

use polaris_core::types::{Atom, Molecule, BOHR_TO_ANGSTROM};

use super::{parse_atom_line, ParseError};

const IGNORED_DIRECTIVES: [&str; 3] = ["symmetry", "no_com", "no_reorient"];

fn charge_multiplicity(line: &str) -> Option<(i32, u32)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [c, m] => Some((c.parse().ok()?, m.parse().ok()?)),
        _ => None,
    }
}

/// Parse a geometry block from a string.
pub fn parse_geometry_block(content: &str, name: &str) -> Result<Molecule, ParseError> {
    let mut charge = 0;
    let mut multiplicity = 1;
    let mut scale = 1.0;
    let mut atoms = Vec::new();
    let mut seen_content = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if !seen_content {
            seen_content = true;
            if let Some((c, m)) = charge_multiplicity(line) {
                if m == 0 {
                    return Err(ParseError::FormatError {
                        line: line_no,
                        message: "Multiplicity must be at least 1".into(),
                    });
                }
                charge = c;
                multiplicity = m;
                continue;
            }
        }

        let keyword = line
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if keyword == "units" {
            let unit = line.split_whitespace().nth(1).unwrap_or("").to_ascii_lowercase();
            scale = match unit.as_str() {
                "angstrom" | "ang" | "a" => 1.0,
                "bohr" | "au" | "a.u." => BOHR_TO_ANGSTROM,
                other => {
                    return Err(ParseError::FormatError {
                        line: line_no,
                        message: format!("Unknown units '{}'", other),
                    })
                }
            };
            continue;
        }
        if IGNORED_DIRECTIVES.contains(&keyword.as_str()) {
            continue;
        }

        let (element, position) = parse_atom_line(line, line_no)?;
        atoms.push(Atom::new(element, position));
    }

    if atoms.is_empty() {
        return Err(ParseError::FormatError {
            line: 1,
            message: "Geometry block contains no atoms".into(),
        });
    }
    for atom in &mut atoms {
        for c in atom.position.iter_mut() {
            *c *= scale;
        }
    }

    Ok(Molecule {
        name: name.to_string(),
        charge,
        multiplicity,
        atoms,
    })
}

/// Render a molecule as a geometry block, coordinates in angstrom.
pub fn to_geometry_block(molecule: &Molecule) -> String {
    let mut s = format!("{} {}\n", molecule.charge, molecule.multiplicity);
    for atom in &molecule.atoms {
        s.push_str(&format!(
            "{:<3} {:>9.4} {:>9.4} {:>9.4}\n",
            atom.element, atom.position[0], atom.position[1], atom.position[2]
        ));
    }
    s.push_str("units angstrom\nsymmetry c1\n");
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
        0 1
        Li  0.0000  0.0000  0.0000
        Nb  0.0000  0.0000  2.5000
        O   1.0607  0.6124  1.2500
        O  -1.0607  0.6124  1.2500
        O   0.0000 -1.2248  1.2500
        units angstrom
        symmetry c1
        ";

    #[test]
    fn test_parse_indented_block() {
        let mol = parse_geometry_block(MINIMAL, "LiNbO3_minimal").unwrap();
        assert_eq!(mol.len(), 5);
        assert_eq!(mol.charge, 0);
        assert_eq!(mol.multiplicity, 1);
        assert_eq!(mol.atoms[4].element, "O");
        assert!((mol.atoms[4].position[1] + 1.2248).abs() < 1e-12);
    }

    #[test]
    fn test_header_is_optional() {
        let mol = parse_geometry_block("Li 0 0 0\nO 0 0 1.6\n", "LiO").unwrap();
        assert_eq!((mol.charge, mol.multiplicity), (0, 1));
        assert_eq!(mol.len(), 2);
    }

    #[test]
    fn test_charged_doublet() {
        let mol = parse_geometry_block("-1 2\nO 0 0 0\n", "O-").unwrap();
        assert_eq!((mol.charge, mol.multiplicity), (-1, 2));
    }

    #[test]
    fn test_bohr_units_convert_to_angstrom() {
        let mol = parse_geometry_block("O 0 0 2.0\nunits bohr\n", "O").unwrap();
        assert!((mol.atoms[0].position[2] - 2.0 * BOHR_TO_ANGSTROM).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_unknown_units_and_empty_blocks() {
        let err = parse_geometry_block("O 0 0 0\nunits furlong\n", "O").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_geometry_block("0 1\nsymmetry c1\n", "none").is_err());
        assert!(parse_geometry_block("0 0\nO 0 0 0\n", "bad").is_err());
    }

    #[test]
    fn test_block_text_parses_back() {
        let mol = parse_geometry_block(MINIMAL, "m").unwrap();
        let again = parse_geometry_block(&to_geometry_block(&mol), "m").unwrap();
        assert_eq!(mol, again);
    }
}
