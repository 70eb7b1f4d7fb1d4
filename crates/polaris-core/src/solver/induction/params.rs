//! Per-element parameters for the induced-dipole model.
//!
//! Polarizabilities are ionic electronic polarizabilities in Å³
//! (Shannon-type values for the common oxidation state); charges are
//! formal ionic charges.

use crate::types::BOHR_TO_ANGSTROM;

/// Model parameters of a single ion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IonParams {
    pub symbol: &'static str,
    /// Formal charge (e).
    pub charge: f64,
    /// Isotropic polarizability (Å³).
    pub polarizability_a3: f64,
}

impl IonParams {
    /// Polarizability in atomic units (bohr³).
    pub fn polarizability_au(&self) -> f64 {
        self.polarizability_a3 / BOHR_TO_ANGSTROM.powi(3)
    }
}

const ION_TABLE: &[IonParams] = &[
    IonParams { symbol: "H",  charge:  1.0, polarizability_a3: 0.667 },
    IonParams { symbol: "Li", charge:  1.0, polarizability_a3: 1.20 },
    IonParams { symbol: "Na", charge:  1.0, polarizability_a3: 1.80 },
    IonParams { symbol: "K",  charge:  1.0, polarizability_a3: 3.83 },
    IonParams { symbol: "Mg", charge:  2.0, polarizability_a3: 1.32 },
    IonParams { symbol: "Ca", charge:  2.0, polarizability_a3: 3.16 },
    IonParams { symbol: "Zn", charge:  2.0, polarizability_a3: 2.04 },
    IonParams { symbol: "Al", charge:  3.0, polarizability_a3: 0.79 },
    IonParams { symbol: "Fe", charge:  3.0, polarizability_a3: 2.29 },
    IonParams { symbol: "Ti", charge:  4.0, polarizability_a3: 2.93 },
    IonParams { symbol: "Nb", charge:  5.0, polarizability_a3: 3.97 },
    IonParams { symbol: "Ta", charge:  5.0, polarizability_a3: 4.73 },
    IonParams { symbol: "O",  charge: -2.0, polarizability_a3: 2.01 },
    IonParams { symbol: "F",  charge: -1.0, polarizability_a3: 1.62 },
];

/// Look up the model parameters for an element symbol (case-insensitive).
pub fn ion_params(symbol: &str) -> Option<&'static IonParams> {
    ION_TABLE
        .iter()
        .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
}

/// All parameterised elements, in table order.
pub fn known_ions() -> &'static [IonParams] {
    ION_TABLE
}
