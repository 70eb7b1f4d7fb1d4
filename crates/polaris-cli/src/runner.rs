//! Study runner: ties together structures, solver, estimator and reports.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use polaris_core::electronic::{electronic_properties, ElectronicError};
use polaris_core::estimator::{FieldResponseEstimator, FieldScan};
use polaris_core::report::{write_electronic, write_polarizability, write_summary, SummaryRow};
use polaris_core::solver::{FieldSolver, SolveJob, SolverError};
use polaris_core::types::{ElectronicProperties, FieldSample, Molecule, PolarizabilityEstimate};

use crate::config::JobConfig;

/// Checkpointed results for one structure, as stored in `results.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dipoles: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lumo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homo_ev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lumo_ev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_ev: Option<f64>,
}

impl ResultRecord {
    fn new(electronic: Option<&ElectronicProperties>, estimate: Option<&PolarizabilityEstimate>) -> Self {
        let mut record = Self::default();
        if let Some(e) = electronic {
            record.homo = Some(e.homo);
            record.lumo = Some(e.lumo);
            record.gap = Some(e.gap);
            record.homo_ev = Some(e.homo_ev());
            record.lumo_ev = Some(e.lumo_ev());
            record.gap_ev = Some(e.gap_ev());
        }
        if let Some(est) = estimate {
            let (fields, dipoles) = est.field_dipole_pairs().unzip();
            record.alpha = Some(est.component);
            record.r_squared = Some(est.r_squared);
            record.fields = Some(fields);
            record.dipoles = Some(dipoles);
        }
        record
    }
}

/// Everything computed for one structure.
#[derive(Debug)]
pub struct StructureOutcome {
    pub name: String,
    pub electronic: Option<ElectronicProperties>,
    pub scan: FieldScan,
}

impl StructureOutcome {
    pub fn summary_row(&self) -> SummaryRow {
        SummaryRow {
            structure: self.name.clone(),
            polarizability: self.scan.estimate().map(|e| e.component),
            gap_ev: self.electronic.as_ref().map(ElectronicProperties::gap_ev),
        }
    }

    pub fn record(&self) -> ResultRecord {
        ResultRecord::new(self.electronic.as_ref(), self.scan.estimate())
    }
}

/// Format elapsed seconds as `Hh Mm S.Ss`.
pub fn format_runtime(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor();
    let rem = seconds - hours * 3600.0;
    let minutes = (rem / 60.0).floor();
    let secs = rem - minutes * 60.0;
    format!("{}h {}m {:.1}s", hours as u64, minutes as u64, secs)
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn print_sample(sample: &FieldSample, axis_label: &str) {
    match (sample.energy, sample.dipole_z) {
        (Some(energy), Some(dipole)) => println!(
            "  Field {}: Completed (E = {:.8} Eh, μ{} = {:.6} a.u.)",
            sample.field_strength, energy, axis_label, dipole
        ),
        _ => println!("  Field {}: Error - calculation failed", sample.field_strength),
    }
}

/// Compute frontier-orbital properties, or `None` when unavailable.
fn run_electronic(
    solver: &mut dyn FieldSolver,
    molecule: &Molecule,
    job: &JobConfig,
    scratch: &Path,
) -> Option<ElectronicProperties> {
    println!("Calculating electronic properties for {}...", molecule.name);
    let label = format!("{}_electronic", molecule.name);
    let solve_job = SolveJob::new(&label, molecule, &job.solver.options).with_scratch_dir(Some(scratch));

    match electronic_properties(solver, &solve_job) {
        Ok(props) => {
            println!("  HOMO: {:.4} eV", props.homo_ev());
            println!("  LUMO: {:.4} eV", props.lumo_ev());
            println!("  Gap: {:.4} eV", props.gap_ev());
            Some(props)
        }
        Err(ElectronicError::Solver(SolverError::Unsupported { method, capability })) => {
            println!("  Skipped: {} does not provide {}", method, capability);
            None
        }
        Err(e) => {
            log::warn!("{}: electronic properties failed: {}", molecule.name, e);
            println!("  Error calculating electronic properties: {}", e);
            None
        }
    }
}

/// Output files of one study.
pub struct StudyWriter {
    pub out_dir: PathBuf,
}

impl StudyWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;
        Ok(Self { out_dir })
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.out_dir.join("calculations")
    }

    /// Write `{name}_electronic.dat`.
    pub fn electronic(&self, name: &str, props: &ElectronicProperties) -> Result<()> {
        let path = self.out_dir.join(format!("{}_electronic.dat", name));
        let mut w = create_file(&path)?;
        write_electronic(&mut w, name, props)?;
        w.flush()?;
        Ok(())
    }

    /// Write `{name}_polarizability.dat` and `{name}_field_dipole.csv`.
    pub fn polarizability(&self, name: &str, estimate: &PolarizabilityEstimate) -> Result<()> {
        let path = self.out_dir.join(format!("{}_polarizability.dat", name));
        let mut w = create_file(&path)?;
        write_polarizability(&mut w, name, estimate)?;
        w.flush()?;

        self.field_dipole_csv(name, estimate)
    }

    fn field_dipole_csv(&self, name: &str, estimate: &PolarizabilityEstimate) -> Result<()> {
        let path = self.out_dir.join(format!("{}_field_dipole.csv", name));
        let mut w = create_file(&path)?;
        let a = estimate.axis.label();

        writeln!(w, "# Polaris finite-field scan: {}", name)?;
        writeln!(w, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(w, "# alpha_{}{}: {:.6} a.u.", a, a, estimate.component)?;
        writeln!(w, "# r_squared: {:.6}", estimate.r_squared)?;
        writeln!(w, "# intercept: {:.6}, std_err: {:.3e}", estimate.intercept, estimate.std_err)?;
        writeln!(w, "#")?;
        writeln!(w, "field_au,dipole_{}_au,fitted_dipole_{}_au", a, a)?;
        for (field, dipole) in estimate.field_dipole_pairs() {
            writeln!(
                w,
                "{:.6},{:.8},{:.8}",
                field,
                dipole,
                estimate.fitted_dipole(field)
            )?;
        }
        w.flush()?;
        Ok(())
    }

    /// Rewrite the `results.json` checkpoint.
    pub fn checkpoint(&self, results: &BTreeMap<String, ResultRecord>) -> Result<()> {
        let path = self.out_dir.join("results.json");
        let json = serde_json::to_string_pretty(results).context("JSON serialisation error")?;
        std::fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;
        log::debug!("checkpoint: {} structures in {}", results.len(), path.display());
        Ok(())
    }

    /// Write `summary_report.txt`.
    pub fn summary(&self, title: &str, rows: &[SummaryRow]) -> Result<PathBuf> {
        let path = self.out_dir.join("summary_report.txt");
        let mut w = create_file(&path)?;
        write_summary(&mut w, title, rows)?;
        w.flush()?;
        Ok(path)
    }

    /// Append the runtime footer to `summary_report.txt`.
    pub fn runtime_footer(&self, seconds: f64, completed_at: &str) -> Result<()> {
        let path = self.out_dir.join("summary_report.txt");
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("cannot append to {}", path.display()))?;
        writeln!(file)?;
        writeln!(file, "Total runtime: {}", format_runtime(seconds))?;
        writeln!(file, "Completed at: {}", completed_at)?;
        Ok(())
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Run a full study from a parsed job configuration.
///
/// Relative geometry files resolve against `base_dir`; all output goes to
/// `out_dir`. Structures are processed in order with one shared solver.
pub fn run_study(job: &JobConfig, base_dir: &Path, out_dir: &Path) -> Result<Vec<StructureOutcome>> {
    let start = Instant::now();
    let fields = job.fields.validate()?;
    let molecules = job.molecules(base_dir)?;
    let mut solver = job.solver.build()?;
    let writer = StudyWriter::new(out_dir)?;
    let scratch = writer.scratch_dir();

    println!(
        "Starting {} property calculations at {}",
        job.study.name,
        timestamp()
    );
    println!(
        "Output directory: {}",
        std::fs::canonicalize(out_dir)
            .unwrap_or_else(|_| out_dir.to_path_buf())
            .display()
    );
    println!("Solver: {}", solver.method_name());

    let axis = job.fields.axis;
    let mut outcomes = Vec::with_capacity(molecules.len());
    let mut results = BTreeMap::new();

    for molecule in &molecules {
        let electronic = run_electronic(solver.as_mut(), molecule, job, &scratch);
        if let Some(props) = &electronic {
            writer.electronic(&molecule.name, props)?;
        }

        println!("Calculating polarizability for {}...", molecule.name);
        let scan = FieldResponseEstimator::new(solver.as_mut(), job.solver.options.clone())
            .with_fields(fields.clone(), axis)
            .with_scratch_dir(Some(&scratch))
            .run_with(molecule, |s| print_sample(s, axis.label()));

        match &scan.estimate {
            Ok(est) => {
                println!(
                    "  Calculated alpha_{}{} = {:.6} a.u. (R² = {:.4})",
                    axis.label(),
                    axis.label(),
                    est.component,
                    est.r_squared
                );
                writer.polarizability(&molecule.name, est)?;
            }
            Err(e) => println!("  No polarizability for {}: {}", molecule.name, e),
        }

        let outcome = StructureOutcome {
            name: molecule.name.clone(),
            electronic,
            scan,
        };
        results.insert(outcome.name.clone(), outcome.record());
        writer.checkpoint(&results)?;
        outcomes.push(outcome);
    }

    let rows: Vec<SummaryRow> = outcomes.iter().map(StructureOutcome::summary_row).collect();
    let summary_path = writer.summary(&job.summary_title(), &rows)?;

    let elapsed = start.elapsed().as_secs_f64();
    println!();
    println!("Calculations completed in {}", format_runtime(elapsed));
    println!("Results saved to {}", out_dir.display());
    writer.runtime_footer(elapsed, &timestamp())?;
    log::info!("summary written to {}", summary_path.display());

    Ok(outcomes)
}
