//! Core types shared across the Polaris workspace.
//!
//! This module defines the data structures that flow through a
//! finite-field study: molecular structures, solver settings and outputs,
//! per-field samples, and the fitted polarizability estimate.

use serde::{Deserialize, Serialize};

/// Hartree to electronvolt conversion factor.
pub const HARTREE_TO_EV: f64 = 27.211396;

/// Bohr radius in angstrom.
pub const BOHR_TO_ANGSTROM: f64 = 0.529_177_210_903;

/// A single atom or ion in a molecular structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Element symbol, e.g. `"Nb"`.
    pub element: String,
    /// Cartesian position (angstrom).
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Self {
            element: element.into(),
            position,
        }
    }
}

/// A finite cluster handed to a solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    /// Structure label used in reports and file names.
    pub name: String,
    /// Net charge (e).
    pub charge: i32,
    /// Spin multiplicity 2S + 1.
    pub multiplicity: u32,
    pub atoms: Vec<Atom>,
}

impl Molecule {
    /// A neutral closed-shell molecule.
    pub fn new(name: impl Into<String>, atoms: Vec<Atom>) -> Self {
        Self {
            name: name.into(),
            charge: 0,
            multiplicity: 1,
            atoms,
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Positions converted to bohr.
    pub fn positions_bohr(&self) -> Vec<[f64; 3]> {
        self.atoms
            .iter()
            .map(|a| {
                [
                    a.position[0] / BOHR_TO_ANGSTROM,
                    a.position[1] / BOHR_TO_ANGSTROM,
                    a.position[2] / BOHR_TO_ANGSTROM,
                ]
            })
            .collect()
    }
}

/// Cartesian axis along which the perturbing field is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAxis {
    X,
    Y,
    #[default]
    Z,
}

impl FieldAxis {
    pub fn index(self) -> usize {
        match self {
            FieldAxis::X => 0,
            FieldAxis::Y => 1,
            FieldAxis::Z => 2,
        }
    }

    /// Lower-case axis label used in report headers (`"z"`).
    pub fn label(self) -> &'static str {
        match self {
            FieldAxis::X => "x",
            FieldAxis::Y => "y",
            FieldAxis::Z => "z",
        }
    }

    /// Perturbation vector of the given strength along this axis.
    pub fn vector(self, strength: f64) -> [f64; 3] {
        let mut v = [0.0; 3];
        v[self.index()] = strength;
        v
    }
}

/// Numerical settings forwarded to the solver for every calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Basis set name (ignored by model solvers).
    #[serde(default = "default_basis")]
    pub basis: String,
    /// SCF integral treatment, e.g. `"df"` or `"pk"`.
    #[serde(default = "default_scf_type")]
    pub scf_type: String,
    /// Energy convergence threshold (Eh).
    #[serde(default = "default_convergence")]
    pub e_convergence: f64,
    /// Density (or induced-dipole) convergence threshold (a.u.).
    #[serde(default = "default_convergence")]
    pub d_convergence: f64,
    /// Iteration cap for self-consistent procedures.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_basis() -> String {
    "def2-svp".into()
}
fn default_scf_type() -> String {
    "df".into()
}
fn default_convergence() -> f64 {
    1e-6
}
fn default_max_iterations() -> usize {
    100
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            basis: default_basis(),
            scf_type: default_scf_type(),
            e_convergence: default_convergence(),
            d_convergence: default_convergence(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Result of one converged solver calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOutput {
    /// Total energy (Eh).
    pub energy: f64,
    /// Electric dipole moment (a.u.).
    pub dipole: [f64; 3],
    /// Iterations taken, when the solver reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
}

/// Orbital energies of a converged reference calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalSpectrum {
    /// Orbital energies (Eh), ascending.
    pub energies: Vec<f64>,
    /// Number of doubly occupied (alpha) orbitals.
    pub n_occupied: usize,
}

/// Frontier orbital energies and the HOMO-LUMO gap (Eh).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectronicProperties {
    pub homo: f64,
    pub lumo: f64,
    pub gap: f64,
}

impl ElectronicProperties {
    pub fn homo_ev(&self) -> f64 {
        self.homo * HARTREE_TO_EV
    }

    pub fn lumo_ev(&self) -> f64 {
        self.lumo * HARTREE_TO_EV
    }

    pub fn gap_ev(&self) -> f64 {
        self.gap * HARTREE_TO_EV
    }
}

/// Dipole response at a single applied field strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSample {
    /// Perturbation strength along the scan axis (a.u.).
    pub field_strength: f64,
    /// Dipole component along the scan axis (a.u.); `None` if the solve failed.
    pub dipole_z: Option<f64>,
    /// Total energy (Eh); `None` if the solve failed.
    pub energy: Option<f64>,
}

impl FieldSample {
    pub fn converged(field_strength: f64, dipole: f64, energy: f64) -> Self {
        Self {
            field_strength,
            dipole_z: Some(dipole),
            energy: Some(energy),
        }
    }

    pub fn failed(field_strength: f64) -> Self {
        Self {
            field_strength,
            dipole_z: None,
            energy: None,
        }
    }

    pub fn is_converged(&self) -> bool {
        self.dipole_z.is_some()
    }
}

/// Polarizability component fitted from a complete field scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarizabilityEstimate {
    pub axis: FieldAxis,
    /// Diagonal polarizability component, the negated regression slope (a.u.).
    pub component: f64,
    /// Coefficient of determination of the fit, in [0, 1].
    pub r_squared: f64,
    /// Fitted dipole at zero field (a.u.).
    pub intercept: f64,
    /// Standard error of the fitted slope.
    pub std_err: f64,
    /// Samples used in the fit, ascending in field strength.
    pub samples: Vec<FieldSample>,
}

impl PolarizabilityEstimate {
    /// Field strengths and dipoles of the fitted samples.
    pub fn field_dipole_pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples
            .iter()
            .filter_map(|s| s.dipole_z.map(|d| (s.field_strength, d)))
    }

    /// Dipole predicted by the fitted line at `field`.
    pub fn fitted_dipole(&self, field: f64) -> f64 {
        self.intercept - self.component * field
    }
}
