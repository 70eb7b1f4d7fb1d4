//! Frontier-orbital analysis.

use thiserror::Error;

use crate::solver::{FieldSolver, SolveJob, SolverError};
use crate::types::{ElectronicProperties, OrbitalSpectrum};

#[derive(Debug, Error)]
pub enum ElectronicError {
    #[error("no occupied orbitals")]
    NoOccupied,

    #[error("no virtual orbitals: {n_occupied} occupied of {n_orbitals}")]
    NoVirtual { n_occupied: usize, n_orbitals: usize },

    #[error("orbital energies are not finite and ascending")]
    Unordered,

    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// HOMO, LUMO and gap from an orbital spectrum.
pub fn homo_lumo(spectrum: &OrbitalSpectrum) -> Result<ElectronicProperties, ElectronicError> {
    let n_occ = spectrum.n_occupied;
    let n = spectrum.energies.len();
    if n_occ == 0 {
        return Err(ElectronicError::NoOccupied);
    }
    if n_occ >= n {
        return Err(ElectronicError::NoVirtual {
            n_occupied: n_occ,
            n_orbitals: n,
        });
    }
    let e = &spectrum.energies;
    if e.iter().any(|v| !v.is_finite()) || e.windows(2).any(|w| w[1] < w[0]) {
        return Err(ElectronicError::Unordered);
    }

    let homo = e[n_occ - 1];
    let lumo = e[n_occ];
    Ok(ElectronicProperties {
        homo,
        lumo,
        gap: lumo - homo,
    })
}

/// Run the reference calculation and extract frontier-orbital energies.
pub fn electronic_properties(
    solver: &mut dyn FieldSolver,
    job: &SolveJob<'_>,
) -> Result<ElectronicProperties, ElectronicError> {
    let spectrum = solver.orbital_spectrum(job)?;
    homo_lumo(&spectrum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_homo_lumo_gap() {
        let spec = OrbitalSpectrum {
            energies: vec![-20.1, -1.2, -0.45, -0.31, 0.05, 0.2],
            n_occupied: 4,
        };
        let p = homo_lumo(&spec).unwrap();
        assert_eq!(p.homo, -0.31);
        assert_eq!(p.lumo, 0.05);
        assert_abs_diff_eq!(p.gap, 0.36, epsilon = 1e-15);
        assert_abs_diff_eq!(p.gap_ev(), 0.36 * 27.211396, epsilon = 1e-12);
    }

    #[test]
    fn test_requires_virtual_orbital() {
        let spec = OrbitalSpectrum { energies: vec![-1.0, -0.5], n_occupied: 2 };
        assert!(matches!(homo_lumo(&spec), Err(ElectronicError::NoVirtual { .. })));
        let spec = OrbitalSpectrum { energies: vec![-1.0, -0.5], n_occupied: 0 };
        assert!(matches!(homo_lumo(&spec), Err(ElectronicError::NoOccupied)));
    }

    #[test]
    fn test_rejects_unsorted_energies() {
        let spec = OrbitalSpectrum { energies: vec![-0.2, -0.5, 0.1], n_occupied: 1 };
        assert!(matches!(homo_lumo(&spec), Err(ElectronicError::Unordered)));
    }
}
