//! Electronic-structure solver abstraction and implementations.
//!
//! The [`FieldSolver`] trait is the only view the estimator has of the
//! underlying quantum-chemistry engine: geometry plus an optional
//! perturbation in, energy and dipole out. Two implementations ship with
//! the crate:
//!
//! - [`induction::InducedDipoleSolver`]: a point-polarizable-ion model
//!   solved in-process.
//! - [`external::ExternalSolver`]: drives an external program through
//!   JSON files, one process per calculation.

pub mod external;
pub mod induction;

use std::path::Path;

use thiserror::Error;

use crate::types::{Molecule, OrbitalSpectrum, SolverOptions, SolverOutput};

/// Errors that can occur during a single solver calculation.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Solver failed to converge after {max_iter} iterations (residual: {residual:.2e})")]
    ConvergenceFailure { max_iter: usize, residual: f64 },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Linear algebra error: {0}")]
    LinAlgError(String),

    #[error("External solver error: {0}")]
    External(String),

    #[error("{method} does not support {capability}")]
    Unsupported {
        method: String,
        capability: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed solver output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a solver needs for one calculation.
///
/// The scratch directory is passed per call so that solvers never rely
/// on process-wide output state.
#[derive(Debug, Clone, Copy)]
pub struct SolveJob<'a> {
    /// Unique label for this calculation, e.g. `LiNbO3_minimal_field0.001000`.
    pub label: &'a str,
    pub molecule: &'a Molecule,
    /// Hamiltonian perturbation vector $\lambda$ with $H' = +\lambda \cdot \hat\mu$.
    pub perturbation: Option<[f64; 3]>,
    pub options: &'a SolverOptions,
    /// Where the solver may write input/output files.
    pub scratch_dir: Option<&'a Path>,
}

impl<'a> SolveJob<'a> {
    pub fn new(label: &'a str, molecule: &'a Molecule, options: &'a SolverOptions) -> Self {
        Self {
            label,
            molecule,
            perturbation: None,
            options,
            scratch_dir: None,
        }
    }

    pub fn with_perturbation(mut self, perturbation: Option<[f64; 3]>) -> Self {
        self.perturbation = perturbation;
        self
    }

    pub fn with_scratch_dir(mut self, dir: Option<&'a Path>) -> Self {
        self.scratch_dir = dir;
        self
    }
}

/// The capability every electronic-structure backend must provide.
///
/// Methods take `&mut self`: solvers are not assumed to be safe for
/// concurrent invocation, so the borrow checker serialises calls.
///
/// A linear responder obeys $\mu = \mu_0 - \alpha\lambda$ under the
/// perturbation convention of [`SolveJob::perturbation`].
pub trait FieldSolver {
    /// Converged energy and dipole moment for the given job.
    fn solve(&mut self, job: &SolveJob<'_>) -> Result<SolverOutput, SolverError>;

    /// Orbital energies of the unperturbed reference.
    ///
    /// Default implementation reports the capability as unsupported.
    fn orbital_spectrum(&mut self, job: &SolveJob<'_>) -> Result<OrbitalSpectrum, SolverError> {
        let _ = job;
        Err(SolverError::Unsupported {
            method: self.method_name().to_string(),
            capability: "orbital energies",
        })
    }

    /// Human-readable name of the method.
    fn method_name(&self) -> &str;
}
