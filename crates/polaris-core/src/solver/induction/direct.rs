//! Direct linear solver for the induced-dipole system.
//!
//! Uses LU decomposition via `faer` to solve the $3N \times 3N$ system
//! $\mathbf{A}\mathbf{p} = \mathbf{E}_{\text{ext}}$ exactly.

use faer::linalg::solvers::SpSolver;
use ndarray::{Array1, Array2};

use super::super::SolverError;

/// Solve the interaction system using direct LU decomposition.
///
/// # Arguments
/// * `matrix` - The $3N \times 3N$ interaction matrix $\mathbf{A}$.
/// * `rhs` - The external field vector (length $3N$).
///
/// # Returns
/// The induced dipole vector $\mathbf{p}$ (length $3N$).
pub fn solve_direct(matrix: &Array2<f64>, rhs: &Array1<f64>) -> Result<Array1<f64>, SolverError> {
    let dim = matrix.nrows();
    if dim != matrix.ncols() || dim != rhs.len() {
        return Err(SolverError::LinAlgError(format!(
            "dimension mismatch: matrix {}x{}, rhs {}",
            matrix.nrows(),
            matrix.ncols(),
            rhs.len()
        )));
    }

    let faer_mat = faer::Mat::<f64>::from_fn(dim, dim, |i, j| matrix[[i, j]]);
    let faer_rhs = faer::Col::<f64>::from_fn(dim, |i| rhs[i]);

    // LU decomposition with partial pivoting
    let lu = faer_mat.partial_piv_lu();
    let faer_sol = lu.solve(&faer_rhs);

    let solution = Array1::from_vec((0..dim).map(|i| faer_sol[i]).collect());

    if solution.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::LinAlgError(
            "interaction matrix is singular".into(),
        ));
    }

    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_solve_identity_system() {
        let dim = 6;
        let matrix = Array2::<f64>::eye(dim);
        let rhs = Array1::from_vec((0..dim).map(|i| i as f64).collect());

        let sol = solve_direct(&matrix, &rhs).unwrap();
        for i in 0..dim {
            assert!((sol[i] - rhs[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_solve_general_system() {
        let matrix = array![[4.0, 1.0], [2.0, 3.0]];
        let rhs = array![1.0, 2.0];

        let sol = solve_direct(&matrix, &rhs).unwrap();

        let check = matrix.dot(&sol);
        for i in 0..2 {
            assert!(
                (check[i] - rhs[i]).abs() < 1e-12,
                "Mismatch at {}: got {}, expected {}",
                i,
                check[i],
                rhs[i]
            );
        }
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let matrix = Array2::<f64>::eye(3);
        let rhs = Array1::<f64>::zeros(2);
        assert!(matches!(
            solve_direct(&matrix, &rhs),
            Err(SolverError::LinAlgError(_))
        ));
    }
}
