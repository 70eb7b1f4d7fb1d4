//! External program interface.
//!
//! Each calculation runs one process:
//!
//! ```text
//! <program> [args...] <scratch>/<label>.input.json <scratch>/<label>.output.json
//! ```
//!
//! The input file holds the task (`"energy"` or `"orbitals"`), the
//! molecule, the perturbation vector and the solver options. The program
//! must write a JSON object with `energy` and `dipole` (energy task) or
//! `orbital_energies` and `n_occupied` (orbitals task). An optional
//! `converged: false` marks a failed calculation.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use super::{FieldSolver, SolveJob, SolverError};
use crate::types::{Molecule, OrbitalSpectrum, SolverOptions, SolverOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Task {
    Energy,
    Orbitals,
}

#[derive(Debug, Serialize)]
struct ExternalRequest<'a> {
    task: Task,
    label: &'a str,
    molecule: &'a Molecule,
    perturbation: Option<[f64; 3]>,
    options: &'a SolverOptions,
}

/// Output document written by the external program.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExternalResponse {
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub dipole: Option<[f64; 3]>,
    #[serde(default)]
    pub converged: Option<bool>,
    #[serde(default)]
    pub iterations: Option<usize>,
    #[serde(default)]
    pub orbital_energies: Option<Vec<f64>>,
    #[serde(default)]
    pub n_occupied: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ExternalResponse {
    fn check_converged(&self) -> Result<(), SolverError> {
        if self.converged == Some(false) {
            return Err(SolverError::External(format!(
                "calculation did not converge{}",
                self.message
                    .as_deref()
                    .map(|m| format!(": {}", m))
                    .unwrap_or_default()
            )));
        }
        Ok(())
    }

    /// Interpret the response of an energy task.
    pub fn into_output(self) -> Result<SolverOutput, SolverError> {
        self.check_converged()?;
        let energy = self
            .energy
            .ok_or_else(|| SolverError::External("response has no 'energy'".into()))?;
        let dipole = self
            .dipole
            .ok_or_else(|| SolverError::External("response has no 'dipole'".into()))?;
        if !energy.is_finite() || dipole.iter().any(|d| !d.is_finite()) {
            return Err(SolverError::External("non-finite energy or dipole".into()));
        }
        Ok(SolverOutput {
            energy,
            dipole,
            iterations: self.iterations,
        })
    }

    /// Interpret the response of an orbitals task.
    pub fn into_spectrum(self) -> Result<OrbitalSpectrum, SolverError> {
        self.check_converged()?;
        let energies = self
            .orbital_energies
            .ok_or_else(|| SolverError::External("response has no 'orbital_energies'".into()))?;
        let n_occupied = self
            .n_occupied
            .ok_or_else(|| SolverError::External("response has no 'n_occupied'".into()))?;
        Ok(OrbitalSpectrum {
            energies,
            n_occupied,
        })
    }
}

/// Runs an external electronic-structure program once per calculation.
#[derive(Debug, Clone)]
pub struct ExternalSolver {
    pub program: String,
    pub args: Vec<String>,
    /// Used when a job carries no scratch directory of its own.
    pub default_scratch: PathBuf,
}

impl ExternalSolver {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            default_scratch: std::env::temp_dir().join("polaris"),
        }
    }

    fn run(&self, task: Task, job: &SolveJob<'_>) -> Result<ExternalResponse, SolverError> {
        let dir: &Path = job.scratch_dir.unwrap_or(self.default_scratch.as_path());
        std::fs::create_dir_all(dir)?;

        let suffix = match task {
            Task::Energy => "",
            Task::Orbitals => "_orbitals",
        };
        let input_path = dir.join(format!("{}{}.input.json", job.label, suffix));
        let output_path = dir.join(format!("{}{}.output.json", job.label, suffix));

        let request = ExternalRequest {
            task,
            label: job.label,
            molecule: job.molecule,
            perturbation: job.perturbation,
            options: job.options,
        };
        std::fs::write(&input_path, serde_json::to_string_pretty(&request)?)?;
        // A stale result from an earlier run must not be mistaken for this one.
        if output_path.exists() {
            std::fs::remove_file(&output_path)?;
        }

        log::debug!(
            "{}: running {} {:?} {} {}",
            job.label,
            self.program,
            self.args,
            input_path.display(),
            output_path.display()
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&input_path)
            .arg(&output_path)
            .output()
            .map_err(|e| SolverError::External(format!("failed to launch '{}': {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SolverError::External(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let content = std::fs::read_to_string(&output_path).map_err(|e| {
            SolverError::External(format!("cannot read {}: {}", output_path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl FieldSolver for ExternalSolver {
    fn solve(&mut self, job: &SolveJob<'_>) -> Result<SolverOutput, SolverError> {
        self.run(Task::Energy, job)?.into_output()
    }

    fn orbital_spectrum(&mut self, job: &SolveJob<'_>) -> Result<OrbitalSpectrum, SolverError> {
        self.run(Task::Orbitals, job)?.into_spectrum()
    }

    fn method_name(&self) -> &str {
        &self.program
    }
}
