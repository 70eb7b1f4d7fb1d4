//! Plain-text report records.
//!
//! All writers target an arbitrary [`std::io::Write`] sink so that reports
//! can be produced in memory or on disk. Output is fully determined by
//! the inputs; numbers use fixed decimal formatting.

use std::io::{self, Write};

use crate::types::{ElectronicProperties, PolarizabilityEstimate};

/// Write the polarizability record for one structure.
///
/// ```text
/// Structure: LiNbO3_minimal
/// Alpha_zz: 1.500000 a.u.
/// R-squared: 1.000000
///
/// Field-Dipole Data:
/// Field (a.u.)	Dipole_z (a.u.)
/// -0.002000	0.003000
/// ```
pub fn write_polarizability<W: Write>(
    w: &mut W,
    structure: &str,
    estimate: &PolarizabilityEstimate,
) -> io::Result<()> {
    let a = estimate.axis.label();
    writeln!(w, "Structure: {}", structure)?;
    writeln!(w, "Alpha_{}{}: {:.6} a.u.", a, a, estimate.component)?;
    writeln!(w, "R-squared: {:.6}", estimate.r_squared)?;
    writeln!(w)?;
    writeln!(w, "Field-Dipole Data:")?;
    writeln!(w, "Field (a.u.)\tDipole_{} (a.u.)", a)?;
    for (field, dipole) in estimate.field_dipole_pairs() {
        writeln!(w, "{:.6}\t{:.6}", field, dipole)?;
    }
    Ok(())
}

/// Write the frontier-orbital record for one structure.
pub fn write_electronic<W: Write>(
    w: &mut W,
    structure: &str,
    props: &ElectronicProperties,
) -> io::Result<()> {
    writeln!(w, "Structure: {}", structure)?;
    writeln!(w, "HOMO (Eh): {:.6}", props.homo)?;
    writeln!(w, "LUMO (Eh): {:.6}", props.lumo)?;
    writeln!(w, "Gap (Eh): {:.6}", props.gap)?;
    writeln!(w, "HOMO (eV): {:.6}", props.homo_ev())?;
    writeln!(w, "LUMO (eV): {:.6}", props.lumo_ev())?;
    writeln!(w, "Gap (eV): {:.6}", props.gap_ev())?;
    Ok(())
}

/// One row of the study summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub structure: String,
    pub polarizability: Option<f64>,
    pub gap_ev: Option<f64>,
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.4}", v))
}

/// Write the study summary table.
pub fn write_summary<W: Write>(w: &mut W, title: &str, rows: &[SummaryRow]) -> io::Result<()> {
    writeln!(w, "{}", title)?;
    writeln!(w, "{}", "=".repeat(title.chars().count()))?;
    writeln!(w)?;
    writeln!(w, "Structure\tPolarizability (a.u.)\tBand Gap (eV)")?;
    writeln!(w, "{}", "-".repeat(49))?;
    for row in rows {
        writeln!(
            w,
            "{}\t{}\t{}",
            row.structure,
            or_na(row.polarizability),
            or_na(row.gap_ev)
        )?;
    }
    Ok(())
}

/// Render the polarizability record to a string.
pub fn polarizability_to_string(structure: &str, estimate: &PolarizabilityEstimate) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_polarizability(&mut buf, structure, estimate);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldAxis, FieldSample};

    fn estimate() -> PolarizabilityEstimate {
        let samples = [-0.002, -0.001, 0.0, 0.001, 0.002]
            .iter()
            .map(|&f| FieldSample::converged(f, -1.5 * f, -10.0))
            .collect();
        PolarizabilityEstimate {
            axis: FieldAxis::Z,
            component: 1.5,
            r_squared: 1.0,
            intercept: 0.0,
            std_err: 0.0,
            samples,
        }
    }

    #[test]
    fn test_polarizability_record_is_exact() {
        let text = polarizability_to_string("LiNbO3_minimal", &estimate());
        let expected = "Structure: LiNbO3_minimal\n\
                        Alpha_zz: 1.500000 a.u.\n\
                        R-squared: 1.000000\n\
                        \n\
                        Field-Dipole Data:\n\
                        Field (a.u.)\tDipole_z (a.u.)\n\
                        -0.002000\t0.003000\n\
                        -0.001000\t0.001500\n\
                        0.000000\t-0.000000\n\
                        0.001000\t-0.001500\n\
                        0.002000\t-0.003000\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_electronic_record() {
        let props = ElectronicProperties { homo: -0.25, lumo: 0.05, gap: 0.3 };
        let mut buf = Vec::new();
        write_electronic(&mut buf, "X", &props).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Structure: X\nHOMO (Eh): -0.250000\n"));
        assert!(text.contains("Gap (eV): 8.163419\n"), "{}", text);
    }

    #[test]
    fn test_summary_marks_missing_values() {
        let rows = vec![
            SummaryRow { structure: "A".into(), polarizability: Some(12.34567), gap_ev: None },
            SummaryRow { structure: "B".into(), polarizability: None, gap_ev: Some(3.0) },
        ];
        let mut buf = Vec::new();
        write_summary(&mut buf, "Study", &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Study\n=====\n\n"));
        assert!(text.contains("A\t12.3457\tN/A\n"));
        assert!(text.contains("B\tN/A\t3.0000\n"));
    }
}
