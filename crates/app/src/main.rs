use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use app::{load_tire_params, load_vehicle_params, CsvSink, Simulator, VehicleParams};
use clap::{Parser, ValueEnum};
use control::DriverInput;
use log::{error, info, LevelFilter};
use mechanics::TMeasyParams;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(Parser, Debug)]
#[command(name = "vehicle-sim", version, about = "8-DOF vehicle with TMeasy tires and an automatic powertrain")]
struct Opts {
    /// Vehicle parameter JSON (built-in sedan if omitted)
    #[arg(long)]
    vehicle: Option<PathBuf>,
    /// Tire parameter JSON (built-in tire if omitted)
    #[arg(long)]
    tire: Option<PathBuf>,
    /// Driver input table: `time steering throttle brake` per line
    #[arg(long)]
    input: PathBuf,
    /// CSV output file
    #[arg(long, default_value = "vehicle_sim.csv")]
    output: PathBuf,
    /// End time (s); defaults to the last driver input sample
    #[arg(long)]
    end_time: Option<f64>,
    /// Override the integration step from the vehicle file (s)
    #[arg(long)]
    step: Option<f64>,
    /// Write every Nth step
    #[arg(long, default_value_t = 1)]
    output_every: u64,
    /// Initial forward speed (m/s)
    #[arg(long, default_value_t = 0.0)]
    initial_speed: f64,
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    TermLogger::init(opts.log_level.into(), Config::default(), TerminalMode::Stderr, ColorChoice::Auto).ok();

    if let Err(e) = run(opts) {
        error!("{e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(opts: Opts) -> Result<()> {
    let mut vehicle = match &opts.vehicle {
        Some(path) => load_vehicle_params(path)?,
        None => VehicleParams::default(),
    };
    if let Some(step) = opts.step {
        vehicle = vehicle.with_step(step);
    }
    let tire = match &opts.tire {
        Some(path) => load_tire_params(path)?,
        None => TMeasyParams::default(),
    };
    let input = DriverInput::load(&opts.input)?;
    let end_time = opts.end_time.unwrap_or_else(|| input.end_time());

    let mut sim = Simulator::new(&vehicle, &tire)?
        .with_initial_speed(opts.initial_speed)
        .with_output_interval(opts.output_every);
    let mut sink = CsvSink::create(&opts.output)
        .with_context(|| format!("cannot create {}", opts.output.display()))?;

    let summary = sim.run(end_time, &input, &mut sink)?;
    info!(
        "wrote {} records to {} ({} steps in {:.1} ms)",
        summary.records,
        opts.output.display(),
        summary.steps,
        summary.elapsed.as_secs_f64() * 1e3
    );
    Ok(())
}
