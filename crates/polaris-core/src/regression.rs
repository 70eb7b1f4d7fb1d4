//! Ordinary least-squares line fitting.
//!
//! Fits $y = m x + c$ and reports the Pearson correlation $r$ alongside the
//! slope. Conventions follow the usual two-variable `linregress` layout:
//!
//! $$ m = \frac{S_{xy}}{S_{xx}}, \quad r = \frac{S_{xy}}{\sqrt{S_{xx} S_{yy}}} $$
//!
//! with $r$ clamped to $[-1, 1]$ and set to zero when $S_{yy} = 0$.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a fit is not produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("only {converged} of {requested} field points converged")]
    IncompleteBatch { converged: usize, requested: usize },

    #[error("at least two samples are required, got {0}")]
    TooFewSamples(usize),

    #[error("all field strengths are identical; slope is undefined")]
    DegenerateFit,

    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("non-finite value in regression input")]
    NonFinite,
}

/// Result of a straight-line fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
    pub r_squared: f64,
    /// Standard error of the slope (zero for two points).
    pub std_err: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Least-squares fit of `y` against `x`.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch { x: x.len(), y: y.len() });
    }
    let n = x.len();
    if n < 2 {
        return Err(FitError::TooFewSamples(n));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }
    // Exact comparison: identical abscissae give Sxx = 0 regardless of
    // rounding in the mean.
    if x.iter().all(|&xi| xi == x[0]) {
        return Err(FitError::DegenerateFit);
    }

    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if !(sxx > 0.0) {
        return Err(FitError::DegenerateFit);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let r_value = if syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    };
    let r_squared = r_value * r_value;

    let std_err = if n > 2 {
        ((1.0 - r_squared).max(0.0) * syy / sxx / (nf - 2.0)).sqrt()
    } else {
        0.0
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_value,
        r_squared,
        std_err,
    })
}
