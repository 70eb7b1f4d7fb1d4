//! Self-consistent induction by fixed-point iteration.
//!
//! Each sweep updates every induced dipole from the field of the previous
//! sweep (Jacobi scheme):
//!
//! $$ \mathbf{p}_i^{(k+1)} = \alpha_i \Bigl(\mathbf{E}_{\text{ext}}
//!    + \sum_{j \neq i} \mathbf{T}_{ij}\mathbf{p}_j^{(k)}\Bigr) $$
//!
//! Iteration stops once the largest dipole change falls below the
//! tolerance. Strongly coupled clusters can diverge, which is reported as
//! a convergence failure rather than a result.

use ndarray::Array2;

use super::assembly::{coupling_blocks, Site};
use super::super::SolverError;

/// Converged induced dipoles, shape (N, 3), and the number of sweeps.
pub fn solve_iterative(
    sites: &[Site],
    field: [f64; 3],
    thole_a: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<(Array2<f64>, usize), SolverError> {
    let n = sites.len();
    let blocks = coupling_blocks(sites, thole_a);

    let mut p = Array2::<f64>::zeros((n, 3));
    for (i, site) in sites.iter().enumerate() {
        for c in 0..3 {
            p[[i, c]] = site.alpha * field[c];
        }
    }

    let mut residual = f64::INFINITY;
    for iter in 1..=max_iterations {
        let mut next = Array2::<f64>::zeros((n, 3));
        for i in 0..n {
            let mut e_loc = field;
            for j in 0..n {
                if i == j {
                    continue;
                }
                for a in 0..3 {
                    for b in 0..3 {
                        e_loc[a] += blocks[i][j][a][b] * p[[j, b]];
                    }
                }
            }
            for c in 0..3 {
                next[[i, c]] = sites[i].alpha * e_loc[c];
            }
        }

        residual = (&next - &p).iter().fold(0.0_f64, |m, d| m.max(d.abs()));
        p = next;

        if !residual.is_finite() {
            break;
        }
        if residual < tolerance {
            log::trace!("induction converged in {} sweeps (residual {:.2e})", iter, residual);
            return Ok((p, iter));
        }
    }

    Err(SolverError::ConvergenceFailure {
        max_iter: max_iterations,
        residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolated_site_converges_immediately() {
        let sites = [Site { position: [0.0; 3], charge: 0.0, alpha: 4.0 }];
        let (p, iters) = solve_iterative(&sites, [0.0, 0.0, 0.01], 0.39, 1e-12, 10).unwrap();
        assert_eq!(iters, 1);
        assert!((p[[0, 2]] - 0.04).abs() < 1e-15);
    }

    #[test]
    fn test_catastrophic_coupling_fails() {
        // Two large undamped polarizabilities almost on top of each other.
        let sites = [
            Site { position: [0.0, 0.0, 0.0], charge: 0.0, alpha: 50.0 },
            Site { position: [0.0, 0.0, 1.0], charge: 0.0, alpha: 50.0 },
        ];
        let err = solve_iterative(&sites, [0.0, 0.0, 0.001], 0.0, 1e-8, 50).unwrap_err();
        assert!(matches!(err, SolverError::ConvergenceFailure { max_iter: 50, .. }));
    }
}
