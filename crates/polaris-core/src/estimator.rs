//! Finite-field polarizability estimation.
//!
//! The estimator applies a uniform perturbation of each requested
//! strength along one axis, collects the dipole response from the solver,
//! and fits a straight line through the (field, dipole) pairs. With the
//! perturbation convention $\mu = \mu_0 - \alpha\lambda$, the diagonal
//! polarizability is the negated slope.
//!
//! A fit is only attempted when every field point converged: a scan with
//! holes in the field axis is discarded, never fitted.

use std::path::Path;

use crate::regression::{linear_fit, FitError};
use crate::solver::{FieldSolver, SolveJob, SolverError};
use crate::types::{
    FieldAxis, FieldSample, Molecule, PolarizabilityEstimate, SolverOptions, SolverOutput,
};

/// Default symmetric five-point field set (a.u.).
pub const DEFAULT_FIELD_STRENGTHS: [f64; 5] = [0.002, 0.001, 0.0, -0.001, -0.002];

/// Symmetric field set `±step·k` for `k` in `0..=points/2`, largest first.
///
/// An even `points` omits the zero-field point.
pub fn symmetric_fields(step: f64, points: usize) -> Vec<f64> {
    let half = (points / 2) as i64;
    let mut fields: Vec<f64> = (1..=half).rev().map(|k| k as f64 * step).collect();
    if points % 2 == 1 {
        fields.push(0.0);
    }
    fields.extend((1..=half).map(|k| -(k as f64) * step));
    fields
}

/// Evaluate the solver once per field strength, in order.
///
/// A failing evaluation is recorded as a non-converged sample; the
/// remaining field points are still evaluated.
pub fn collect_field_samples<G, S>(
    geometry: &G,
    field_strengths: &[f64],
    axis: FieldAxis,
    solve: S,
) -> Vec<FieldSample>
where
    G: ?Sized,
    S: FnMut(&G, Option<[f64; 3]>) -> Result<SolverOutput, SolverError>,
{
    collect_field_samples_with(geometry, field_strengths, axis, solve, |_| {})
}

/// Like [`collect_field_samples`], calling `on_sample` as soon as each
/// field point has been evaluated.
pub fn collect_field_samples_with<G, S, F>(
    geometry: &G,
    field_strengths: &[f64],
    axis: FieldAxis,
    mut solve: S,
    mut on_sample: F,
) -> Vec<FieldSample>
where
    G: ?Sized,
    S: FnMut(&G, Option<[f64; 3]>) -> Result<SolverOutput, SolverError>,
    F: FnMut(&FieldSample),
{
    let mut samples = Vec::with_capacity(field_strengths.len());
    for &field in field_strengths {
        let perturbation = (field != 0.0).then(|| axis.vector(field));
        let sample = match solve(geometry, perturbation) {
            Ok(out) => FieldSample::converged(field, out.dipole[axis.index()], out.energy),
            Err(e) => {
                log::warn!("field {}: solver failed: {}", field, e);
                FieldSample::failed(field)
            }
        };
        on_sample(&sample);
        samples.push(sample);
    }
    samples
}

/// Fit the polarizability component from a complete set of samples.
pub fn fit_polarizability(
    samples: &[FieldSample],
    axis: FieldAxis,
) -> Result<PolarizabilityEstimate, FitError> {
    let converged = samples.iter().filter(|s| s.is_converged()).count();
    if converged != samples.len() {
        return Err(FitError::IncompleteBatch {
            converged,
            requested: samples.len(),
        });
    }
    if samples.len() < 2 {
        return Err(FitError::TooFewSamples(samples.len()));
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.field_strength.total_cmp(&b.field_strength));

    let fields: Vec<f64> = sorted.iter().map(|s| s.field_strength).collect();
    let dipoles: Vec<f64> = sorted.iter().filter_map(|s| s.dipole_z).collect();
    let fit = linear_fit(&fields, &dipoles)?;

    Ok(PolarizabilityEstimate {
        axis,
        component: -fit.slope,
        r_squared: fit.r_squared,
        intercept: fit.intercept,
        std_err: fit.std_err,
        samples: sorted,
    })
}

/// Estimate one diagonal polarizability component.
///
/// Returns `None` when any field point failed, when fewer than two samples
/// exist, or when the field strengths do not span a line.
pub fn estimate_polarizability<G, S>(
    geometry: &G,
    field_strengths: &[f64],
    axis: FieldAxis,
    solve: S,
) -> Option<PolarizabilityEstimate>
where
    G: ?Sized,
    S: FnMut(&G, Option<[f64; 3]>) -> Result<SolverOutput, SolverError>,
{
    let samples = collect_field_samples(geometry, field_strengths, axis, solve);
    match fit_polarizability(&samples, axis) {
        Ok(estimate) => Some(estimate),
        Err(e) => {
            log::warn!("no polarizability estimate: {}", e);
            None
        }
    }
}

/// Outcome of one field scan: every sample plus the fit, if any.
#[derive(Debug, Clone)]
pub struct FieldScan {
    /// Samples in requested order.
    pub samples: Vec<FieldSample>,
    pub estimate: Result<PolarizabilityEstimate, FitError>,
}

impl FieldScan {
    pub fn estimate(&self) -> Option<&PolarizabilityEstimate> {
        self.estimate.as_ref().ok()
    }
}

/// Binds a solver to the field set and numerical settings of a study.
pub struct FieldResponseEstimator<'s> {
    solver: &'s mut dyn FieldSolver,
    pub field_strengths: Vec<f64>,
    pub axis: FieldAxis,
    pub options: SolverOptions,
    /// Per-calculation output directory handed to the solver.
    pub scratch_dir: Option<&'s Path>,
}

impl<'s> FieldResponseEstimator<'s> {
    pub fn new(solver: &'s mut dyn FieldSolver, options: SolverOptions) -> Self {
        Self {
            solver,
            field_strengths: DEFAULT_FIELD_STRENGTHS.to_vec(),
            axis: FieldAxis::Z,
            options,
            scratch_dir: None,
        }
    }

    pub fn with_fields(mut self, field_strengths: Vec<f64>, axis: FieldAxis) -> Self {
        self.field_strengths = field_strengths;
        self.axis = axis;
        self
    }

    pub fn with_scratch_dir(mut self, dir: Option<&'s Path>) -> Self {
        self.scratch_dir = dir;
        self
    }

    pub fn method_name(&self) -> &str {
        self.solver.method_name()
    }

    /// Calculation label for one field point, e.g. `LiNbO3_field0.001000`.
    pub fn field_label(name: &str, field: f64) -> String {
        format!("{}_field{:.6}", name, field)
    }

    /// Scan the configured field strengths for `molecule`.
    ///
    /// `on_sample` is called after each field point, before the next solve.
    pub fn run_with<F>(&mut self, molecule: &Molecule, on_sample: F) -> FieldScan
    where
        F: FnMut(&FieldSample),
    {
        let solver = &mut *self.solver;
        let options = &self.options;
        let scratch = self.scratch_dir;
        let axis = self.axis;

        let samples = collect_field_samples_with(
            molecule,
            &self.field_strengths,
            axis,
            |mol, pert| {
                let field = pert.map(|v| v[axis.index()]).unwrap_or(0.0);
                let label = Self::field_label(&mol.name, field);
                let job = SolveJob::new(&label, mol, options)
                    .with_perturbation(pert)
                    .with_scratch_dir(scratch);
                solver.solve(&job)
            },
            on_sample,
        );

        let estimate = fit_polarizability(&samples, axis);
        match &estimate {
            Ok(est) => log::info!(
                "{}: alpha_{}{} = {:.6} a.u. (R² = {:.6})",
                molecule.name,
                axis.label(),
                axis.label(),
                est.component,
                est.r_squared
            ),
            Err(e) => log::warn!("{}: no polarizability estimate: {}", molecule.name, e),
        }
        FieldScan { samples, estimate }
    }

    pub fn run(&mut self, molecule: &Molecule) -> FieldScan {
        self.run_with(molecule, |_| {})
    }
}
