//! Point-polarizable-ion model solver.
//!
//! Models a cluster as formal point charges carrying isotropic, mutually
//! interacting induced dipoles (Applequist model with Thole damping). The
//! permanent dipole comes from the charges; the induced dipoles respond to
//! the uniform external field $\mathbf{E}_{\text{ext}} = -\lambda$, where
//! $\lambda$ is the Hamiltonian perturbation of the job.
//!
//! # Method selection
//!
//! - **Direct solve** (LU decomposition via `faer`): exact, $O(N^3)$.
//! - **Iterative solve** (Jacobi sweeps): bounded by the job's
//!   `max_iterations` and `d_convergence`, fails on divergence.
//!
//! The energy is $E(\lambda) = \lambda\cdot\mu_0 - \tfrac12 \lambda\cdot\alpha\cdot\lambda$,
//! evaluated as $\lambda\cdot\mu_0 + \tfrac12\sum_i \mathbf{p}_i\cdot\lambda$.

pub mod assembly;
pub mod direct;
pub mod iterative;
pub mod params;
pub mod tensor;

use serde::{Deserialize, Serialize};

use super::{FieldSolver, SolveJob, SolverError};
use crate::types::{Molecule, SolverOutput};
use assembly::Site;

/// Closest allowed approach of two sites (bohr).
const MIN_SEPARATION: f64 = 1e-8;

/// Linear-solve strategy for the induced dipoles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InductionMethod {
    #[default]
    Direct,
    Iterative,
}

/// The induced-dipole solver, holding configuration for the numerical method.
#[derive(Debug, Clone)]
pub struct InducedDipoleSolver {
    pub method: InductionMethod,
    /// Thole damping parameter; non-positive disables damping.
    pub thole_a: f64,
}

impl Default for InducedDipoleSolver {
    fn default() -> Self {
        Self {
            method: InductionMethod::Direct,
            thole_a: tensor::DEFAULT_THOLE_A,
        }
    }
}

impl InducedDipoleSolver {
    pub fn new(method: InductionMethod, thole_a: f64) -> Self {
        Self { method, thole_a }
    }

    /// Convert a molecule into model sites (atomic units).
    ///
    /// Unknown elements, non-finite coordinates and coincident atoms are
    /// reported as [`SolverError::InvalidGeometry`].
    pub fn sites(molecule: &Molecule) -> Result<Vec<Site>, SolverError> {
        if molecule.is_empty() {
            return Err(SolverError::InvalidGeometry("No atoms provided".into()));
        }
        let positions = molecule.positions_bohr();
        let sites = molecule
            .atoms
            .iter()
            .zip(positions)
            .map(|(atom, position)| {
                if position.iter().any(|c| !c.is_finite()) {
                    return Err(SolverError::InvalidGeometry(format!(
                        "non-finite coordinate for '{}'",
                        atom.element
                    )));
                }
                let p = params::ion_params(&atom.element).ok_or_else(|| {
                    SolverError::InvalidGeometry(format!(
                        "no model parameters for element '{}'",
                        atom.element
                    ))
                })?;
                Ok(Site {
                    position,
                    charge: p.charge,
                    alpha: p.polarizability_au(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for i in 0..sites.len() {
            for j in (i + 1)..sites.len() {
                let r = assembly::distance(&sites[i].position, &sites[j].position);
                if r < MIN_SEPARATION {
                    return Err(SolverError::InvalidGeometry(format!(
                        "atoms {} ({}) and {} ({}) coincide (r = {:.2e} bohr)",
                        i, molecule.atoms[i].element, j, molecule.atoms[j].element, r
                    )));
                }
            }
        }
        Ok(sites)
    }

    /// Permanent dipole of the formal charges (a.u.), relative to the origin.
    pub fn permanent_dipole(sites: &[Site]) -> [f64; 3] {
        let mut mu = [0.0; 3];
        for s in sites {
            for c in 0..3 {
                mu[c] += s.charge * s.position[c];
            }
        }
        mu
    }

    /// Induced dipoles, shape (N, 3), for a uniform external field.
    fn induce(
        &self,
        sites: &[Site],
        field: [f64; 3],
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<(ndarray::Array2<f64>, Option<usize>), SolverError> {
        let n = sites.len();
        match self.method {
            InductionMethod::Direct => {
                let matrix = assembly::assemble_interaction_matrix(sites, self.thole_a);
                let rhs = assembly::build_external_field_vector(n, field);
                let solution = direct::solve_direct(&matrix, &rhs)?;
                let p = solution
                    .into_shape((n, 3))
                    .map_err(|e| SolverError::LinAlgError(e.to_string()))?;
                Ok((p, None))
            }
            InductionMethod::Iterative => {
                let (p, iters) =
                    iterative::solve_iterative(sites, field, self.thole_a, tolerance, max_iterations)?;
                Ok((p, Some(iters)))
            }
        }
    }
}

impl FieldSolver for InducedDipoleSolver {
    fn solve(&mut self, job: &SolveJob<'_>) -> Result<SolverOutput, SolverError> {
        let sites = Self::sites(job.molecule)?;
        let mu0 = Self::permanent_dipole(&sites);

        let lambda = match job.perturbation {
            Some(l) if l.iter().any(|&c| c != 0.0) => l,
            _ => {
                log::debug!("{}: unperturbed, dipole = {:?}", job.label, mu0);
                return Ok(SolverOutput {
                    energy: 0.0,
                    dipole: mu0,
                    iterations: Some(0),
                });
            }
        };

        let field = [-lambda[0], -lambda[1], -lambda[2]];
        let (p, iterations) = self.induce(
            &sites,
            field,
            job.options.d_convergence,
            job.options.max_iterations,
        )?;

        let mut dipole = mu0;
        let mut energy: f64 = (0..3).map(|c| lambda[c] * mu0[c]).sum();
        for i in 0..sites.len() {
            for c in 0..3 {
                dipole[c] += p[[i, c]];
                energy += 0.5 * p[[i, c]] * lambda[c];
            }
        }

        log::debug!(
            "{}: lambda = {:?}, dipole = {:?}, E = {:.10}",
            job.label,
            lambda,
            dipole,
            energy
        );

        Ok(SolverOutput {
            energy,
            dipole,
            iterations,
        })
    }

    fn method_name(&self) -> &str {
        "Induced Dipole Model (Thole-damped Applequist)"
    }
}
