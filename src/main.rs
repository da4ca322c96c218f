//! Headless all-pairs gravity simulation
//!
//! Scatters bodies in a cube, steps them on the GPU (or the CPU reference
//! backend), and optionally streams position snapshots to a CSV file.

mod output;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nbody_physics::{constants, diagnostics, ParticleSystem, PhysicsParams, ScatterConfig};
use nbody_simulation::{
    list_adapters, ComputeBackend, CpuBridge, DeviceBridge, DeviceSelection, GpuContext,
    LoopConfig, SimulationLoop, SnapshotSink, StopCondition,
};
use output::{CsvSink, Output};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// GPU, falling back to CPU when no adapter is available
    Auto,
    Gpu,
    Cpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Power {
    High,
    Low,
}

#[derive(Parser, Debug)]
#[command(name = "nbody")]
#[command(about = "All-pairs N-body gravity on a wgpu compute shader")]
struct Args {
    /// Number of bodies
    #[arg(short = 'n', long, default_value_t = constants::DEFAULT_BODY_COUNT)]
    bodies: usize,

    /// Steps to run after warm-up (runs until interrupted when omitted)
    #[arg(short, long)]
    steps: Option<u64>,

    /// Steps advanced before the first snapshot
    #[arg(long, default_value_t = 0)]
    warmup: u64,

    /// Seed for the initial conditions
    #[arg(long)]
    seed: Option<u64>,

    /// Half-width of the cube bodies are scattered in
    #[arg(long, default_value_t = constants::DEFAULT_POSITION_RANGE)]
    position_range: f32,

    /// Initial tangential speed factor
    #[arg(long, default_value_t = constants::DEFAULT_VELOCITY_SCALE)]
    velocity_scale: f32,

    #[arg(long, default_value_t = constants::DEFAULT_MASS_MIN)]
    mass_min: f32,

    #[arg(long, default_value_t = constants::DEFAULT_MASS_MAX)]
    mass_max: f32,

    /// Gravitational constant
    #[arg(long, default_value_t = constants::G)]
    gravity: f32,

    /// Softening added to pair distances
    #[arg(long, default_value_t = constants::SOFTENING)]
    softening: f32,

    /// Time step
    #[arg(long, default_value_t = constants::DT)]
    dt: f32,

    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    backend: Backend,

    #[arg(long, value_enum, default_value_t = Power::High)]
    power: Power,

    /// Adapter index from --list-adapters
    #[arg(long)]
    adapter: Option<usize>,

    /// Use a software adapter
    #[arg(long)]
    fallback_adapter: bool,

    /// Print available adapters and exit
    #[arg(long)]
    list_adapters: bool,

    /// Write snapshots to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Snapshot every this many steps
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Log progress every this many steps (0 disables)
    #[arg(long, default_value_t = 100)]
    log_every: u64,
}

impl Args {
    fn device_selection(&self) -> DeviceSelection {
        DeviceSelection {
            power_preference: match self.power {
                Power::High => wgpu::PowerPreference::HighPerformance,
                Power::Low => wgpu::PowerPreference::LowPower,
            },
            adapter_index: self.adapter,
            force_fallback_adapter: self.fallback_adapter,
            ..Default::default()
        }
    }

    fn scatter(&self) -> ScatterConfig {
        ScatterConfig {
            body_count: self.bodies,
            position_range: self.position_range,
            velocity_scale: self.velocity_scale,
            mass_range: (self.mass_min, self.mass_max),
            seed: self.seed,
        }
    }

    fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            stop: self
                .steps
                .map_or(StopCondition::Indefinite, StopCondition::Steps),
            warmup: self.warmup,
            log_every: (self.log_every > 0).then_some(self.log_every),
        }
    }
}

fn run<B: ComputeBackend>(
    mut backend: B,
    system: &ParticleSystem,
    config: LoopConfig,
    sink: &mut impl SnapshotSink,
) -> Result<()> {
    backend.upload(system)?;

    let mut simulation = SimulationLoop::new(backend, config);
    let summary = simulation.run(sink)?;

    let backend = simulation.backend_mut();
    let velocities = backend.read_velocities()?;
    let positions = backend.read_positions()?.to_vec();
    let masses = system.masses();
    log::info!(
        "Momentum {:?} -> {:?}, kinetic energy {:.4} -> {:.4}",
        diagnostics::total_momentum(system.velocities(), masses),
        diagnostics::total_momentum(&velocities, masses),
        diagnostics::kinetic_energy(system.velocities(), masses),
        diagnostics::kinetic_energy(&velocities, masses),
    );
    if let (Some(start), Some(end)) = (
        diagnostics::center_of_mass(system.positions(), masses),
        diagnostics::center_of_mass(&positions, masses),
    ) {
        log::info!("Centre of mass {:?} -> {:?}", start, end);
    }
    log::info!("✓ {} steps at {:.1} steps/s", summary.steps, summary.steps_per_second());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_adapters {
        for adapter in list_adapters(args.device_selection().backends) {
            println!(
                "[{}] {} ({:?}, {:?})",
                adapter.index, adapter.name, adapter.backend, adapter.device_type
            );
        }
        return Ok(());
    }

    let params = PhysicsParams::new(args.gravity, args.softening, args.dt)?;
    let system = args.scatter().generate()?;
    log::info!("✓ Initialized {} bodies", system.len());

    let mut output = match &args.csv {
        Some(path) => Output::Csv(
            CsvSink::create(path, args.every)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Output::Discard,
    };

    let context = match args.backend {
        Backend::Cpu => None,
        Backend::Gpu => Some(GpuContext::new_blocking(&args.device_selection())?),
        Backend::Auto => match GpuContext::new_blocking(&args.device_selection()) {
            Ok(context) => Some(context),
            Err(err) => {
                log::warn!("{}, falling back to the CPU backend", err);
                None
            }
        },
    };

    match context {
        Some(context) => {
            let bridge = DeviceBridge::new(context.device, context.queue, params)?;
            run(bridge, &system, args.loop_config(), &mut output)?;
        }
        None => {
            if system.len() > 20_000 {
                log::warn!("{} bodies on the CPU backend will be slow", system.len());
            }
            run(CpuBridge::new(params)?, &system, args.loop_config(), &mut output)?;
        }
    }

    if let Output::Csv(csv) = output {
        let path = csv.path().to_owned();
        let rows = csv.finish()?;
        log::info!("✓ Wrote {} rows to {}", rows, path.display());
    }
    Ok(())
}
