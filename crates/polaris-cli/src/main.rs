//! Polaris command-line interface.
//!
//! Run finite-field polarizability studies from TOML job files:
//! ```sh
//! polaris run job.toml
//! polaris validate job.toml
//! polaris structures
//! ```

mod config;
mod runner;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use polaris_core::solver::induction::params::known_ions;
use polaris_geometry::parsers::block::to_geometry_block;
use polaris_geometry::{build_structure, ClusterTemplate, StructureSpec};

#[derive(Parser)]
#[command(name = "polaris")]
#[command(about = "Polaris: finite-field polarizability and band-gap studies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a study from a TOML job file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides the job file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a job file and build its structures without solving.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List built-in cluster templates and model ion parameters.
    Structures {
        /// Print the geometry block of each template.
        #[arg(long)]
        geometry: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Polaris Finite-Field Study");
            println!("==========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.study.output_dir));
            let outcomes = runner::run_study(&job, &config::job_dir(&config), &out_dir)?;

            let estimated = outcomes.iter().filter(|o| o.scan.estimate().is_some()).count();
            println!(
                "Study complete: {}/{} structures with a polarizability estimate.",
                estimated,
                outcomes.len()
            );
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let fields = job.fields.validate()?;
            let solver = job.solver.build()?;
            let molecules = job
                .molecules(&config::job_dir(&config))
                .context("structure validation failed")?;

            println!("Configuration is valid: {}", config.display());
            println!("  Solver: {}", solver.method_name());
            println!(
                "  Fields ({}): {:?} a.u.",
                job.fields.axis.label(),
                fields
            );
            for m in &molecules {
                println!(
                    "  {}: {} atoms, charge {}, multiplicity {}",
                    m.name,
                    m.len(),
                    m.charge,
                    m.multiplicity
                );
            }
            Ok(())
        }
        Commands::Structures { geometry } => {
            println!("Cluster templates:");
            for template in ClusterTemplate::ALL {
                let molecule = build_structure(&StructureSpec::new(template.name(), template))?;
                println!("  {:<17} {} atoms", template.name(), molecule.len());
                if geometry {
                    for line in to_geometry_block(&molecule).lines() {
                        println!("      {}", line);
                    }
                }
            }
            println!();
            println!("Dopant hosts: Li, Nb (atom at the origin)");
            println!();
            println!("Induced-dipole model ions:");
            for ion in known_ions() {
                println!(
                    "  {:<3} charge {:+.0}  alpha {:.3} Å³ ({:.3} bohr³)",
                    ion.symbol,
                    ion.charge,
                    ion.polarizability_a3,
                    ion.polarizability_au()
                );
            }
            Ok(())
        }
    }
}
