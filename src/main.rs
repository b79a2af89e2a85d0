use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use nbv_planner::export::{PointScalars, write_vtk_legacy};
use nbv_planner::sampling::fibonacci_sphere;
use nbv_planner::{Mesh, NbvError, ObjectPose, PlannerConfig, Result, ViewPlanner};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON planner config. Missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Reference STL mesh, overrides the config.
    #[arg(short, long)]
    mesh: Option<PathBuf>,
    /// Seed for surface sampling, overrides the config.
    #[arg(short, long)]
    seed: Option<u64>,
}

impl ConfigArgs {
    fn resolve(self) -> Result<PlannerConfig> {
        let mut config = match self.config {
            Some(path) => PlannerConfig::load(path)?,
            None => PlannerConfig::default(),
        };
        if let Some(mesh) = self.mesh {
            config.mesh_path = mesh;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Plan candidates around a single object pose and print them as JSON.
    Plan {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[arg(long, allow_hyphen_values = true)]
        z: f64,
        /// Also write the candidate positions as a VTK point cloud.
        #[arg(long)]
        vtk: Option<PathBuf>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Read one JSON pose per line from stdin, write one JSON response per line.
    Batch {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print raw Fibonacci sphere points.
    Sphere {
        #[arg(short = 'n', long, default_value_t = 8)]
        samples: usize,
        #[arg(short, long, default_value_t = 0.5)]
        radius: f64,
    },
    /// Load and normalize the reference mesh, then report its statistics.
    Inspect {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Plan {
            x,
            y,
            z,
            vtk,
            config,
        } => {
            let planner = ViewPlanner::from_config(config.resolve()?)?;
            let response = planner.plan_next_best_view(&ObjectPose::new(x, y, z))?;
            if let Some(path) = vtk {
                let scalars =
                    PointScalars::for_response(&response, planner.config().sphere_samples);
                write_vtk_legacy(&response.positions(), &scalars, &path)?;
                info!("Wrote {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Batch { config } => {
            // The mesh is loaded before the first pose is read.
            let planner = ViewPlanner::from_config(config.resolve()?)?;
            serve_lines(&planner, io::stdin().lock(), io::stdout().lock())?;
        }
        Commands::Sphere { samples, radius } => {
            let points: Vec<[f64; 3]> = fibonacci_sphere(samples, radius)?
                .iter()
                .map(|p| [p.x, p.y, p.z])
                .collect();
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
        Commands::Inspect { config } => {
            let config = config.resolve()?;
            let raw = Mesh::load(&config.mesh_path)?;
            let extent = raw.extent();
            let canonical = nbv_planner::mesh::normalize(raw)?;
            println!("vertices:      {}", canonical.vertices().len());
            println!("faces:         {}", canonical.faces().len());
            println!("raw extent:    {} {} {}", extent.x, extent.y, extent.z);
            println!("surface area:  {}", canonical.surface_area());
            println!("centroid:      {}", canonical.centroid());
        }
    }
    Ok(())
}

/// Request loop: a bad line gets an error record and the loop keeps going.
/// Only a failure of the input stream itself ends it.
fn serve_lines<R: BufRead, W: Write>(planner: &ViewPlanner, input: R, mut output: W) -> Result<()> {
    for raw in input.split(b'\n') {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        if line.trim().is_empty() {
            continue;
        }
        let reply = std::str::from_utf8(&raw)
            .map_err(|e| format!("request is not valid UTF-8: {e}"))
            .and_then(|text| {
                serde_json::from_str::<ObjectPose>(text)
                    .map_err(NbvError::from)
                    .and_then(|pose| planner.plan_next_best_view(&pose))
                    .map_err(|e| e.to_string())
            });
        let record = match reply {
            Ok(response) => serde_json::to_string(&response)?,
            Err(e) => {
                warn!("Rejected request {line:?}: {e}");
                serde_json::json!({ "error": e }).to_string()
            }
        };
        writeln!(output, "{record}")?;
    }
    output.flush()?;
    Ok(())
}
