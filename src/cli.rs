//! Command line interface
//!
//! `toolforge generate` renders a job file to G-code (or to the structured
//! program as JSON); `toolforge init` writes a starter job for a machine.

use crate::LONG_VERSION;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use toolforge_camtools::ToolpathGenerator;
use toolforge_core::MachineType;
use toolforge_settings::{default_path, JobConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "toolforge")]
#[command(version = LONG_VERSION)]
#[command(about = "Toolpath and G-code synthesis for mills, lathes and 3D printers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a program from a job file
    Generate {
        /// Job file (.toml or .json); defaults to the per-user job
        #[arg(short, long)]
        job: Option<PathBuf>,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Remove redundant moves
        #[arg(long)]
        optimize: bool,
        /// Replace short line pairs with arcs
        #[arg(long)]
        arc_fit: bool,
        /// Prefix lines with N10, N20, ...
        #[arg(long)]
        line_numbers: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Gcode)]
        format: OutputFormat,
    },
    /// Write a starter job file for a machine type
    Init {
        /// mill, lathe or printer
        #[arg(short, long, default_value = "mill")]
        machine: MachineType,
        /// Destination (.toml or .json); defaults to the per-user job
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// G-code text
    #[default]
    Gcode,
    /// Structured program as JSON
    Json,
}

/// Post-processing switches given on the command line. They only ever
/// enable a pass; the job file decides otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    pub optimize: bool,
    pub arc_fit: bool,
    pub line_numbers: bool,
    pub format: OutputFormat,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            job,
            output,
            optimize,
            arc_fit,
            line_numbers,
            format,
        } => {
            let job = load_job(job.as_deref())?;
            let options = GenerateOptions {
                optimize,
                arc_fit,
                line_numbers,
                format,
            };
            let text = render_job(&job, options)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} bytes to {}", text.len(), path.display());
                }
                None => print!("{}", text),
            }
        }
        Commands::Init { machine, output } => {
            let path = match output {
                Some(path) => path,
                None => default_path().context("No default job location")?,
            };
            JobConfig::for_machine(machine)
                .save_to_file(&path)
                .with_context(|| format!("Failed to write job file {}", path.display()))?;
            info!("Wrote {} job to {}", machine, path.display());
        }
    }
    Ok(())
}

/// Loads the given job, or the per-user job, or built-in defaults when
/// no per-user job exists yet.
pub fn load_job(path: Option<&Path>) -> Result<JobConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Ok(path) if path.exists() => path,
            _ => {
                info!("No job file given, using default mill job");
                return Ok(JobConfig::new());
            }
        },
    };
    JobConfig::load_from_file(&path)
        .with_context(|| format!("Failed to load job file {}", path.display()))
}

/// Renders a job in the requested format.
pub fn render_job(job: &JobConfig, options: GenerateOptions) -> Result<String> {
    let mut settings = job.settings.clone();
    settings.optimize_moves |= options.optimize;
    settings.arc_fitting |= options.arc_fit;
    settings.line_numbers |= options.line_numbers;

    let generator = ToolpathGenerator::new(settings);
    match options.format {
        OutputFormat::Gcode => generator
            .generate(&job.geometry, job.workpiece.as_ref())
            .context("Toolpath generation failed"),
        OutputFormat::Json => {
            let program = generator
                .program(&job.geometry, job.workpiece.as_ref())
                .context("Toolpath generation failed")?;
            let mut json = serde_json::to_string_pretty(&program)?;
            json.push('\n');
            Ok(json)
        }
    }
}
