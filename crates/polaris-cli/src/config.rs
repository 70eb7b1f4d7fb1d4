//! TOML configuration deserialisation for study jobs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use polaris_core::estimator::{symmetric_fields, DEFAULT_FIELD_STRENGTHS};
use polaris_core::solver::external::ExternalSolver;
use polaris_core::solver::induction::{tensor::DEFAULT_THOLE_A, InducedDipoleSolver, InductionMethod};
use polaris_core::solver::FieldSolver;
use polaris_core::types::{FieldAxis, Molecule, SolverOptions};
use polaris_geometry::builder::default_structures;
use polaris_geometry::{build_structure, load_molecule, ClusterTemplate, Dopant, StructureSpec, Transform};

/// Top-level job configuration.
#[derive(Debug, Default, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub study: StudyConfig,
    #[serde(default)]
    pub fields: FieldConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    /// Structures to study; the default LiNbO3 set when empty.
    #[serde(default, rename = "structure")]
    pub structures: Vec<StructureConfig>,
}

/// Study metadata.
#[derive(Debug, Deserialize)]
pub struct StudyConfig {
    #[serde(default = "default_study_name")]
    pub name: String,
    /// Output directory (default: "lithium_niobate_results").
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            name: default_study_name(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_study_name() -> String {
    "LiNbO3".into()
}
fn default_output_dir() -> String {
    "lithium_niobate_results".into()
}

/// Field strengths: an explicit list, or a symmetric `step` x `points` grid.
#[derive(Debug, Default, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub values: Option<Vec<f64>>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub points: Option<usize>,
    #[serde(default)]
    pub axis: FieldAxis,
}

impl FieldConfig {
    /// Field strengths in evaluation order (a.u.).
    pub fn strengths(&self) -> Result<Vec<f64>> {
        match (&self.values, self.step) {
            (Some(_), Some(_)) => bail!("[fields] sets both 'values' and 'step'"),
            (Some(values), None) => Ok(values.clone()),
            (None, Some(step)) => Ok(symmetric_fields(step, self.points.unwrap_or(5))),
            (None, None) => Ok(DEFAULT_FIELD_STRENGTHS.to_vec()),
        }
    }

    /// Check the field list can support a fit.
    pub fn validate(&self) -> Result<Vec<f64>> {
        let fields = self.strengths()?;
        if fields.is_empty() {
            bail!("[fields] produces no field strengths");
        }
        if let Some(bad) = fields.iter().find(|f| !f.is_finite()) {
            bail!("[fields] contains a non-finite strength: {}", bad);
        }
        if fields.iter().all(|&f| f == fields[0]) {
            bail!("[fields] needs at least two distinct strengths");
        }
        Ok(fields)
    }
}

/// Which solver implementation a job uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    #[default]
    Model,
    External,
}

/// Solver selection and numerical settings.
#[derive(Debug, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub kind: SolverKind,
    /// Induced-dipole linear solve (model only).
    #[serde(default)]
    pub method: InductionMethod,
    /// Thole damping parameter (model only).
    #[serde(default = "default_thole_a")]
    pub thole_a: f64,
    /// Program to launch (external only).
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub options: SolverOptions,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kind: SolverKind::Model,
            method: InductionMethod::Direct,
            thole_a: default_thole_a(),
            command: None,
            args: Vec::new(),
            options: SolverOptions::default(),
        }
    }
}

fn default_thole_a() -> f64 {
    DEFAULT_THOLE_A
}

impl SolverConfig {
    /// Instantiate the configured solver.
    pub fn build(&self) -> Result<Box<dyn FieldSolver>> {
        match self.kind {
            SolverKind::Model => {
                if !self.thole_a.is_finite() {
                    bail!("[solver] thole_a must be finite");
                }
                Ok(Box::new(InducedDipoleSolver::new(self.method, self.thole_a)))
            }
            SolverKind::External => {
                let command = self
                    .command
                    .as_deref()
                    .filter(|c| !c.trim().is_empty())
                    .context("[solver] kind = \"external\" requires 'command'")?;
                Ok(Box::new(ExternalSolver::new(command, self.args.clone())))
            }
        }
    }
}

/// A single structure in the study.
#[derive(Debug, Deserialize)]
pub struct StructureConfig {
    pub name: String,
    /// Built-in cluster: "minimal", "extended" or "oxygen_deficient".
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub dopant: Option<String>,
    /// Host cation replaced by the dopant (default: "Li").
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default = "default_strain")]
    pub strain: f64,
    /// Geometry file (.xyz or geometry block), relative to the job file.
    #[serde(default)]
    pub geometry_file: Option<PathBuf>,
}

fn default_position() -> String {
    "Li".into()
}
fn default_strain() -> f64 {
    1.0
}

impl StructureConfig {
    /// Build the molecule, resolving `geometry_file` against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<Molecule> {
        match (&self.geometry_file, &self.template) {
            (Some(_), Some(_)) => {
                bail!("structure '{}' sets both 'template' and 'geometry_file'", self.name)
            }
            (Some(file), None) => {
                if self.dopant.is_some() {
                    bail!("structure '{}': 'dopant' requires a template", self.name);
                }
                if !self.strain.is_finite() || self.strain <= 0.0 {
                    bail!("structure '{}': invalid strain {}", self.name, self.strain);
                }
                let path = base_dir.join(file);
                let mut molecule = load_molecule(&path, &self.name)
                    .with_context(|| format!("structure '{}': {}", self.name, path.display()))?;
                if self.strain != 1.0 {
                    Transform::uniform_scale(self.strain).apply_to(&mut molecule);
                }
                Ok(molecule)
            }
            (None, template) => {
                let template: ClusterTemplate = template
                    .as_deref()
                    .unwrap_or("minimal")
                    .parse()
                    .with_context(|| format!("structure '{}'", self.name))?;
                let mut spec = StructureSpec::new(&self.name, template).with_strain(self.strain);
                if let Some(dopant) = &self.dopant {
                    spec = spec.with_dopant(Dopant::new(dopant, &self.position));
                }
                build_structure(&spec).with_context(|| format!("structure '{}'", self.name))
            }
        }
    }
}

impl JobConfig {
    /// Build every structure in study order.
    ///
    /// Structure names key the output files, so they must be unique.
    pub fn molecules(&self, base_dir: &Path) -> Result<Vec<Molecule>> {
        if self.structures.is_empty() {
            return default_structures()
                .iter()
                .map(|spec| build_structure(spec).map_err(anyhow::Error::from))
                .collect();
        }
        let mut seen = HashSet::new();
        for s in &self.structures {
            if !seen.insert(s.name.as_str()) {
                bail!("duplicate structure name '{}'", s.name);
            }
        }
        self.structures.iter().map(|s| s.build(base_dir)).collect()
    }

    /// Title of the summary report.
    pub fn summary_title(&self) -> String {
        format!("{} Computational Study Summary", self.study.name)
    }
}

/// Directory that relative paths in a job file are resolved against.
pub fn job_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Parse a TOML job configuration string.
pub fn parse_config(content: &str) -> Result<JobConfig> {
    toml::from_str(content).context("invalid job configuration")
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("in {}", path.display()))
}
