use clap::{Parser, Subcommand};
use ds_core::{DsError, DsResult, PhysicalParameters, TrajectoryConstraints};
use ds_glider::Glider;
use ds_results::{SweepManifest, SweepStore, UNSOLVED_SENTINEL, compute_config_hash};
use ds_solver::{SolveOutcome, SolveSettings, TranscriptionConfig, solve_trajectory};
use ds_sweep::{DircolOptimizer, RetryPolicy, SweepConfig, SweepDriver};
use ds_wind::{WindModel, WindProfileConfig, WindProfileKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "ds-cli")]
#[command(about = "DynSoar CLI - Dynamic soaring trajectory optimization tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single trajectory for one travel angle
    Solve {
        /// Travel angle in degrees, measured from north toward east
        #[arg(long)]
        angle_deg: f64,
        /// Initial period guess in seconds
        #[arg(long, default_value_t = 8.0)]
        period_guess: f64,
        /// Average-speed guess as a multiple of the level glide speed
        #[arg(long, default_value_t = 1.0)]
        speed_scale: f64,
        /// Number of collocation knots
        #[arg(long, default_value_t = 16)]
        knots: usize,
        /// Wind profile (linear, logarithmic, exponential, logistic)
        #[arg(long, default_value = "logarithmic")]
        wind: String,
        /// Wind speed at the reference height [m/s]
        #[arg(long)]
        wind_speed: Option<f64>,
        /// YAML file with physical parameters and constraints
        #[arg(long)]
        params: Option<PathBuf>,
    },
    /// Sweep travel angles and build the performance envelope
    Sweep {
        /// Directory for the durable sweep store
        #[arg(long)]
        out: PathBuf,
        /// First travel angle in degrees
        #[arg(long, default_value_t = 90.0)]
        start_angle_deg: f64,
        /// Number of angles around the circle
        #[arg(long, default_value_t = 9)]
        angles: usize,
        /// Initial period guess in seconds
        #[arg(long, default_value_t = 8.0)]
        period_guess: f64,
        /// Average-speed guess as a multiple of the level glide speed
        #[arg(long, default_value_t = 2.0)]
        speed_scale: f64,
        /// Number of collocation knots
        #[arg(long, default_value_t = 16)]
        knots: usize,
        /// Wind profile (linear, logarithmic, exponential, logistic)
        #[arg(long, default_value = "logarithmic")]
        wind: String,
        /// Wind speed at the reference height [m/s]
        #[arg(long)]
        wind_speed: Option<f64>,
        /// YAML file with physical parameters and constraints
        #[arg(long)]
        params: Option<PathBuf>,
    },
    /// Print a stored sweep as an angle/speed/period table
    Show {
        /// Directory of the sweep store
        #[arg(long)]
        out: PathBuf,
    },
}

/// Optional YAML parameter file.
#[derive(Debug, Serialize, Deserialize)]
struct ParamsFile {
    #[serde(default)]
    parameters: Option<PhysicalParameters>,
    #[serde(default)]
    constraints: Option<TrajectoryConstraints>,
}

/// Everything that shapes the sweep results; hashed into the store
/// manifest so a resume refuses mismatched configurations.
#[derive(Serialize)]
struct SweepDigest {
    parameters: PhysicalParameters,
    constraints: TrajectoryConstraints,
    wind: String,
    wind_speed: f64,
    start_angle: f64,
    angle_count: usize,
    period_guess: f64,
    avg_speed_guess: f64,
    knot_count: usize,
}

fn main() -> DsResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            angle_deg,
            period_guess,
            speed_scale,
            knots,
            wind,
            wind_speed,
            params,
        } => cmd_solve(
            angle_deg,
            period_guess,
            speed_scale,
            knots,
            &wind,
            wind_speed,
            params.as_deref(),
        ),
        Commands::Sweep {
            out,
            start_angle_deg,
            angles,
            period_guess,
            speed_scale,
            knots,
            wind,
            wind_speed,
            params,
        } => cmd_sweep(
            &out,
            start_angle_deg,
            angles,
            period_guess,
            speed_scale,
            knots,
            &wind,
            wind_speed,
            params.as_deref(),
        ),
        Commands::Show { out } => cmd_show(&out),
    }
}

fn load_params(path: Option<&Path>) -> DsResult<(PhysicalParameters, TrajectoryConstraints)> {
    let (parameters, constraints) = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let file: ParamsFile = serde_yaml::from_str(&text).map_err(|e| DsError::Config {
                what: format!("cannot parse {}: {e}", path.display()),
            })?;
            (
                file.parameters.unwrap_or_default(),
                file.constraints.unwrap_or_default(),
            )
        }
        None => (
            PhysicalParameters::default(),
            TrajectoryConstraints::default(),
        ),
    };
    parameters.validate()?;
    constraints.validate()?;
    Ok((parameters, constraints))
}

fn build_wind(
    profile: &str,
    wind_speed: Option<f64>,
    constraints: &TrajectoryConstraints,
) -> DsResult<Box<dyn WindModel>> {
    let kind = WindProfileKind::from_name(profile)?;
    let config = WindProfileConfig {
        ref_speed: wind_speed.unwrap_or(WindProfileConfig::default().ref_speed),
        ground_offset: constraints.ground_offset,
        ..Default::default()
    };
    kind.build(config)
}

fn print_performance(glider: &Glider) {
    println!("Glider performance:");
    println!("  Glide ratio:        {:.2}", glider.optimal_glide_ratio());
    println!(
        "  Glide angle:        {:.2} deg",
        glider.optimal_glide_angle().to_degrees()
    );
    println!("  Best glide speed:   {:.2} m/s", glider.optimal_glide_speed());
    println!("  Level glide speed:  {:.2} m/s", glider.level_glide_speed());
    println!("  Char. time:         {:.2} s", glider.characteristic_time());
}

fn cmd_solve(
    angle_deg: f64,
    period_guess: f64,
    speed_scale: f64,
    knots: usize,
    wind_name: &str,
    wind_speed: Option<f64>,
    params_path: Option<&Path>,
) -> DsResult<()> {
    let (parameters, constraints) = load_params(params_path)?;
    let glider = Glider::new(parameters)?;
    let wind = build_wind(wind_name, wind_speed, &constraints)?;

    print_performance(&glider);

    let travel_angle = angle_deg.to_radians();
    let avg_speed_guess = speed_scale * glider.level_glide_speed();
    let settings = SolveSettings {
        transcription: TranscriptionConfig {
            knot_count: knots,
            ..Default::default()
        },
        ..Default::default()
    };

    println!(
        "\nSolving travel angle {:.1} deg (period guess {:.1} s, speed guess {:.1} m/s)",
        angle_deg, period_guess, avg_speed_guess
    );

    let outcome = solve_trajectory(
        &glider,
        wind.as_ref(),
        &constraints,
        travel_angle,
        period_guess,
        avg_speed_guess,
        None,
        &settings,
    )
    .map_err(DsError::from)?;

    match outcome {
        SolveOutcome::Solved(solution) => {
            println!(
                "✓ Solved: avg speed {:.2} m/s, period {:.2} s",
                solution.avg_speed, solution.period
            );
            println!(
                "  Solver: {} outer iterations, feasibility {:.2e}",
                solution.diagnostics.outer_iterations, solution.diagnostics.feasibility
            );
            println!("\n  {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}", "t [s]", "z [m]", "|v| [m/s]", "bank", "c_L", "n", "heading");
            for knot in &solution.trajectory.knots {
                let v_rel = glider.relative_velocity(&knot.state, wind.as_ref());
                println!(
                    "  {:>6.2} {:>8.2} {:>8.2} {:>8.2} {:>8.3} {:>8.2} {:>8.2}",
                    knot.time,
                    knot.state[2],
                    v_rel.norm(),
                    glider.bank_angle(&v_rel, &knot.input).to_degrees(),
                    glider.lift_coefficient(&v_rel, &knot.input),
                    glider.load_factor(&v_rel, &knot.input),
                    glider.heading(&v_rel).to_degrees(),
                );
            }
        }
        SolveOutcome::Infeasible { reason } => {
            println!("✗ No trajectory found: {reason}");
            println!("  (try a different period guess or speed scale)");
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_sweep(
    out: &Path,
    start_angle_deg: f64,
    angles: usize,
    period_guess: f64,
    speed_scale: f64,
    knots: usize,
    wind_name: &str,
    wind_speed: Option<f64>,
    params_path: Option<&Path>,
) -> DsResult<()> {
    let (parameters, constraints) = load_params(params_path)?;
    let glider = Glider::new(parameters)?;
    let wind = build_wind(wind_name, wind_speed, &constraints)?;

    print_performance(&glider);

    let config = SweepConfig {
        start_angle: start_angle_deg.to_radians(),
        angle_count: angles,
        period_guess,
        avg_speed_guess: speed_scale * glider.level_glide_speed(),
    };
    let settings = SolveSettings {
        transcription: TranscriptionConfig {
            knot_count: knots,
            ..Default::default()
        },
        ..Default::default()
    };

    let digest = SweepDigest {
        parameters,
        constraints,
        wind: wind.name().to_string(),
        wind_speed: wind.config().ref_speed,
        start_angle: config.start_angle,
        angle_count: config.angle_count,
        period_guess: config.period_guess,
        avg_speed_guess: config.avg_speed_guess,
        knot_count: knots,
    };
    let manifest = SweepManifest::new(compute_config_hash(&digest, SOLVER_VERSION), SOLVER_VERSION);
    let mut store =
        SweepStore::open_or_create(out, &manifest).map_err(|e| DsError::Config {
            what: format!("cannot open sweep store: {e}"),
        })?;
    if !store.is_empty() {
        println!(
            "Resuming sweep: {} of {} angles already recorded",
            store.len(),
            config.angle_count
        );
    }

    let optimizer = DircolOptimizer::new(&glider, wind.as_ref(), &constraints, settings);
    let mut driver = SweepDriver::new(&optimizer, &mut store, config, RetryPolicy::default())
        .map_err(DsError::from)?;

    println!(
        "\nSweeping {} angles from {:.1} deg...",
        angles, start_angle_deg
    );
    let summary = driver.run().map_err(DsError::from)?;

    println!(
        "✓ Sweep complete: {} solved, {} unsolved, {} resumed",
        summary.solved, summary.unsolved, summary.skipped
    );
    print_store(&store);
    Ok(())
}

fn cmd_show(out: &Path) -> DsResult<()> {
    let (store, manifest) = SweepStore::open(out).map_err(|e| DsError::Config {
        what: format!("cannot open sweep store: {e}"),
    })?;

    println!("Sweep store {} ({} angles)", out.display(), store.len());
    println!("  created {} by solver {}", manifest.created_at, manifest.solver_version);
    print_store(&store);
    Ok(())
}

fn print_store(store: &SweepStore) {
    println!("\n  {:>10} {:>12} {:>10}", "angle", "avg speed", "period");
    for (angle, speed, period) in store.entries() {
        if speed == UNSOLVED_SENTINEL {
            println!("  {:>10.1} {:>12} {:>10}", angle.to_degrees(), "unsolved", "-");
        } else {
            println!(
                "  {:>10.1} {:>12.2} {:>10.2}",
                angle.to_degrees(),
                speed,
                period
            );
        }
    }
}
