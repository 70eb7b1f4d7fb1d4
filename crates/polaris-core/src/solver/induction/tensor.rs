//! Thole-damped dipole field tensor.
//!
//! The electrostatic field at $\mathbf{r}_i$ due to a point dipole
//! $\mathbf{p}_j$ at $\mathbf{r}_j$ is $\mathbf{T}_{ij}\mathbf{p}_j$ with
//!
//! $$
//! \mathbf{T}_{ij} = \frac{3\lambda_5\,\hat{\mathbf{R}}\hat{\mathbf{R}}^T - \lambda_3\,\mathbf{I}}{R^3}
//! $$
//!
//! where $\mathbf{R} = \mathbf{r}_i - \mathbf{r}_j$. Thole's exponential
//! damping smears each dipole over a finite volume so that close pairs
//! cannot polarize each other without bound:
//!
//! $$
//! u = \frac{R}{(\alpha_i \alpha_j)^{1/6}}, \quad
//! \lambda_3 = 1 - e^{-a u^3}, \quad
//! \lambda_5 = 1 - (1 + a u^3) e^{-a u^3}
//! $$
//!
//! Setting $a \to \infty$ recovers the bare Applequist interaction.

/// Stack-allocated 3×3 real tensor.
pub type Tensor3x3 = [[f64; 3]; 3];

/// Default Thole damping parameter (dimensionless).
pub const DEFAULT_THOLE_A: f64 = 0.39;

/// Thole damping factors $(\lambda_3, \lambda_5)$ for a pair.
///
/// Non-positive `thole_a` disables damping.
pub fn thole_factors(r: f64, alpha_i: f64, alpha_j: f64, thole_a: f64) -> (f64, f64) {
    if thole_a <= 0.0 || alpha_i <= 0.0 || alpha_j <= 0.0 {
        return (1.0, 1.0);
    }
    let u = r / (alpha_i * alpha_j).powf(1.0 / 6.0);
    let au3 = thole_a * u * u * u;
    let damp = (-au3).exp();
    (1.0 - damp, 1.0 - (1.0 + au3) * damp)
}

/// Compute the damped dipole field tensor between two sites (bohr).
///
/// # Panics
/// Panics if `r1 == r2` (self-interaction is not defined via this function).
pub fn dipole_field_tensor(
    r1: &[f64; 3],
    r2: &[f64; 3],
    alpha_1: f64,
    alpha_2: f64,
    thole_a: f64,
) -> Tensor3x3 {
    let rx = r1[0] - r2[0];
    let ry = r1[1] - r2[1];
    let rz = r1[2] - r2[2];
    let r_sq = rx * rx + ry * ry + rz * rz;
    let r = r_sq.sqrt();

    assert!(r > 1e-12, "Self-interaction: r1 and r2 must not coincide");

    let (l3, l5) = thole_factors(r, alpha_1, alpha_2, thole_a);
    let inv_r3 = 1.0 / (r_sq * r);
    let r_hat = [rx / r, ry / r, rz / r];

    let mut t = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let delta_ij = if i == j { 1.0 } else { 0.0 };
            t[i][j] = inv_r3 * (3.0 * l5 * r_hat[i] * r_hat[j] - l3 * delta_ij);
        }
    }
    t
}
