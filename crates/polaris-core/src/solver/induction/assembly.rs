//! Interaction matrix assembly for the induced-dipole model.
//!
//! Constructs the real symmetric $3N \times 3N$ matrix $\mathbf{A}$ whose
//! $3 \times 3$ blocks $(i, j)$ are:
//!
//! - Diagonal ($i = j$): $\alpha_i^{-1}\mathbf{I}$
//! - Off-diagonal ($i \neq j$): $-\mathbf{T}_{ij}$
//!
//! The self-consistent induced dipoles satisfy
//! $$\mathbf{A} \mathbf{p} = \mathbf{E}_{\text{ext}}$$

use ndarray::{Array1, Array2};
use rayon::prelude::*;

use super::tensor::{dipole_field_tensor, Tensor3x3};

/// A polarizable site in atomic units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Position (bohr).
    pub position: [f64; 3],
    /// Formal charge (e).
    pub charge: f64,
    /// Isotropic polarizability (bohr³).
    pub alpha: f64,
}

/// Off-diagonal coupling blocks $\mathbf{T}_{ij}$, row-major by site.
///
/// Rows are computed in parallel; the diagonal entries are zero.
pub fn coupling_blocks(sites: &[Site], thole_a: f64) -> Vec<Vec<Tensor3x3>> {
    let n = sites.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        [[0.0; 3]; 3]
                    } else {
                        dipole_field_tensor(
                            &sites[i].position,
                            &sites[j].position,
                            sites[i].alpha,
                            sites[j].alpha,
                            thole_a,
                        )
                    }
                })
                .collect()
        })
        .collect()
}

/// Assemble the full $3N \times 3N$ interaction matrix.
///
/// Sites with zero polarizability must be filtered out beforehand.
pub fn assemble_interaction_matrix(sites: &[Site], thole_a: f64) -> Array2<f64> {
    let n = sites.len();
    let dim = 3 * n;
    let blocks = coupling_blocks(sites, thole_a);
    let mut matrix = Array2::<f64>::zeros((dim, dim));

    for i in 0..n {
        let inv_alpha = 1.0 / sites[i].alpha;
        for c in 0..3 {
            matrix[[3 * i + c, 3 * i + c]] = inv_alpha;
        }
        for j in 0..n {
            if i == j {
                continue;
            }
            for row in 0..3 {
                for col in 0..3 {
                    matrix[[3 * i + row, 3 * j + col]] = -blocks[i][j][row][col];
                }
            }
        }
    }

    matrix
}

/// Euclidean distance between two sites (bohr).
pub fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
}

/// External field vector $\mathbf{E}_{\text{ext}}$ (uniform field on every site).
pub fn build_external_field_vector(n_sites: usize, field: [f64; 3]) -> Array1<f64> {
    let mut rhs = Array1::<f64>::zeros(3 * n_sites);
    for i in 0..n_sites {
        for c in 0..3 {
            rhs[3 * i + c] = field[c];
        }
    }
    rhs
}
