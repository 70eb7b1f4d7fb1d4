//! # Polaris Core
//!
//! Finite-field estimation of static polarizabilities. A study applies a
//! small uniform perturbation along one axis at several strengths, asks an
//! electronic-structure solver for the dipole at each, and fits a line
//! through the response.
//!
//! ## Architecture
//!
//! All backends implement the [`solver::FieldSolver`] trait, which is the
//! estimator's only view of the quantum-chemistry engine. The crate ships
//! an in-process induced-dipole model
//! ([`solver::induction::InducedDipoleSolver`]) and a driver for external
//! programs ([`solver::external::ExternalSolver`]).
//!
//! ## Modules
//!
//! - [`types`]: Molecules, solver settings, samples and estimates.
//! - [`solver`]: Solver trait, error taxonomy and implementations.
//! - [`estimator`]: Field scan and polarizability fit.
//! - [`regression`]: Ordinary least-squares line fit.
//! - [`electronic`]: HOMO-LUMO gap extraction.
//! - [`report`]: Plain-text report records.

pub mod electronic;
pub mod estimator;
pub mod regression;
pub mod report;
pub mod solver;
pub mod types;

pub use estimator::{estimate_polarizability, FieldResponseEstimator, FieldScan};
pub use regression::FitError;
pub use solver::{FieldSolver, SolveJob, SolverError};
pub use types::{FieldAxis, FieldSample, Molecule, PolarizabilityEstimate, SolverOptions};
