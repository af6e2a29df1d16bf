// ─────────────────────────────────────────────────────────────────────
// RBField — Command-Line Driver
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `rbfield demo | bench | quantities | validate`
//!
//! Results go to stdout; diagnostics go through `log` (set `RUST_LOG`).

use std::f64::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use rbfield_core::{write_series, GeometricMemoryBenchmark, SignalProcessor};
use rbfield_physics::coupling::phase_synchronization;
use rbfield_physics::quantities::reflexivity;
use rbfield_physics::{Complex64, FieldSummary, Point, RbfField};
use rbfield_types::{BenchmarkConfig, FieldError, StreamConfig};

#[derive(Parser)]
#[command(author, version, about = "6D Gaussian RBF field engine")]
struct Cli {
    /// JSON file with optional `benchmark` and `stream` sections
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream a sine wave with a noise burst and print descriptors
    Demo(DemoArgs),

    /// Run the geometric memory benchmark
    Bench(BenchArgs),

    /// Print every derived quantity of a seeded field
    Quantities(QuantitiesArgs),

    /// Run the reference scenarios and report PASS/FAIL
    Validate,
}

#[derive(Args)]
struct DemoArgs {
    /// Total samples to process
    #[arg(long, default_value_t = 2000)]
    samples: usize,

    /// Print descriptors every N samples
    #[arg(long, default_value_t = 100)]
    every: usize,

    /// Sine frequency in Hz
    #[arg(long, default_value_t = 440.0)]
    frequency: f64,

    /// First sample of the noise burst
    #[arg(long, default_value_t = 1000)]
    anomaly_start: usize,

    /// Length of the noise burst in samples
    #[arg(long, default_value_t = 100)]
    anomaly_len: usize,

    /// Seed for the noise burst
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

#[derive(Args)]
struct BenchArgs {
    /// Write the per-cycle center counts and energies here
    #[arg(long, value_hint = ValueHint::FilePath)]
    history: Option<PathBuf>,

    /// Print the full report as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct QuantitiesArgs {
    /// Number of spiral-seeded centers
    #[arg(long, default_value_t = 100)]
    centers: usize,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Layout of the `--config` file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct FileConfig {
    benchmark: BenchmarkConfig,
    stream: StreamConfig,
}

fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: FileConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    cfg.benchmark.validate()?;
    cfg.stream.validate()?;
    log::info!("loaded config from {}", path.display());
    Ok(cfg)
}

// ── demo ────────────────────────────────────────────────────────────

fn run_demo(args: &DemoArgs, stream: StreamConfig) -> Result<()> {
    let mut proc = SignalProcessor::with_config(stream)?;
    let sr = proc.sample_rate();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let burst = args.anomaly_start..args.anomaly_start.saturating_add(args.anomaly_len);
    let every = args.every.max(1);

    println!(
        "{:>7} {:>10} {:>14} {:>11} {:>6} {:>9} {:>9}",
        "sample", "t", "energy", "curvature", "peaks", "mean", "variance"
    );
    for i in 0..args.samples {
        let s = if burst.contains(&i) {
            rng.gen_range(-2.0..2.0)
        } else {
            (TAU * args.frequency * i as f64 / sr).sin()
        };
        let d = proc.process_sample(s)?;
        if i % every == 0 || i + 1 == args.samples {
            let marker = if burst.contains(&i) { " *" } else { "" };
            println!(
                "{:>7} {:>10.6} {:>14.6e} {:>11.3} {:>6} {:>9.5} {:>9.5}{marker}",
                i, d.timestamp, d.energy, d.curvature, d.num_components, d.mean, d.variance
            );
        }
    }
    println!("{} centers after {} samples", proc.field().len(), proc.sample_count());
    Ok(())
}

// ── bench ───────────────────────────────────────────────────────────

fn run_bench(args: &BenchArgs, config: BenchmarkConfig) -> Result<()> {
    let mut bench = GeometricMemoryBenchmark::new(config)?;
    let score = bench.run_complete()?;

    if let Some(path) = &args.history {
        let energies: Vec<f64> = bench.history().iter().map(|c| c.energy).collect();
        write_series(path, &energies)
            .with_context(|| format!("writing history {}", path.display()))?;
        let counts: Vec<f64> = bench.history().iter().map(|c| c.num_centers as f64).collect();
        let counts_path = path.with_extension("centers.txt");
        write_series(&counts_path, &counts)
            .with_context(|| format!("writing history {}", counts_path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bench.report())?);
        return Ok(());
    }

    let m = bench.metrics();
    println!("geometric memory benchmark");
    println!("  cycles            {}", m.total_cycles);
    println!(
        "  centers           {} → {} (max {})",
        m.initial_centers, m.current_centers, m.max_centers_reached
    );
    println!(
        "  energy            {:.6} → {:.6}",
        m.initial_energy, m.current_energy
    );
    let validity = if m.efficiency_defined { "" } else { " (undefined)" };
    println!("  efficiency        {:.2}%{validity}", m.energy_efficiency);
    println!("  geometric quality {:.4}", m.geometric_quality);
    println!("  adaptations       {}", m.adaptation_events);
    println!("  time              {:.2} ms", bench.total_time_ns() as f64 / 1e6);
    println!("  overall score     {:.4}", score.overall_score);
    println!("  target reached    {}", score.target_reached);
    println!("  authentic         {}", score.is_authentic);
    Ok(())
}

// ── quantities ──────────────────────────────────────────────────────

fn run_quantities(args: &QuantitiesArgs, config: BenchmarkConfig) -> Result<()> {
    let mut bench = GeometricMemoryBenchmark::new(config)?;
    bench.initialize(args.centers)?;
    let field = bench.field();
    let summary = FieldSummary::measure(field);
    let sync = phase_synchronization(field);

    if args.json {
        let value = serde_json::json!({
            "summary": summary,
            "phase_synchronization": sync,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("field with {} centers", summary.num_centers);
    let rows = [
        ("energy", summary.energy),
        ("hamiltonian energy", summary.hamiltonian_energy),
        ("emergence", summary.emergence),
        ("coherence", summary.coherence),
        ("autonomy", summary.autonomy),
        ("reflexivity", summary.reflexivity),
        ("prediction accuracy", summary.prediction_accuracy),
        ("phase sync", sync),
        ("HIS", summary.his),
    ];
    for (name, value) in rows {
        println!("  {name:<20} {value:.6}");
    }
    println!("  {:<20} {}", "intuitive links", summary.intuitive_connections);
    Ok(())
}

// ── validate ────────────────────────────────────────────────────────

type Check = fn() -> Result<bool>;

fn check_basic_centers() -> Result<bool> {
    let mut field = RbfField::new(10, 2.5)?;
    let p = Point::from([0.5, 0.5, 0.5, 1.5, 0.0, 0.4]);
    field.add_center(&p, Complex64::new(1.0, 0.0), 0.1)?;
    let added = field.len() == 1;
    field.remove_center(0)?;
    Ok(added && field.is_empty())
}

fn check_capacity_cap() -> Result<bool> {
    let mut field = RbfField::new(2, 2.5)?;
    let p = Point::from([0.5, 0.5, 0.5, 1.5, 0.0, 0.4]);
    field.add_center(&p, Complex64::new(1.0, 0.0), 0.1)?;
    field.add_center(&p, Complex64::new(1.0, 0.0), 0.1)?;
    let third = field.add_center(&p, Complex64::new(1.0, 0.0), 0.1);
    Ok(matches!(third, Err(FieldError::CapacityExceeded { .. })) && field.len() == 2)
}

fn check_sine_wave() -> Result<bool> {
    let sr = 44_100.0;
    let mut proc = SignalProcessor::new(sr)?;
    let fill = proc.config().buffer_size;
    let mut ok = true;
    for i in 0..4410 {
        let d = proc.process_sample((TAU * 440.0 * i as f64 / sr).sin())?;
        ok &= d.is_finite();
        if i >= fill {
            ok &= d.num_components > 0 && (d.variance - 0.5).abs() < 0.05;
        }
    }
    Ok(ok)
}

fn check_anomaly() -> Result<bool> {
    let sr = 44_100.0;
    let mut proc = SignalProcessor::new(sr)?;
    let mut rng = StdRng::seed_from_u64(7);
    let (mut baseline, mut anomaly) = (0.0, 0.0);
    for i in 0..2000 {
        let s = if (1000..1100).contains(&i) {
            rng.gen_range(-2.0..2.0)
        } else {
            (TAU * 440.0 * i as f64 / sr).sin()
        };
        let c = proc.process_sample(s)?.curvature.abs();
        match i {
            0..=999 => baseline += c,
            1000..=1099 => anomaly += c,
            _ => {}
        }
    }
    let (baseline, anomaly) = (baseline / 1000.0, anomaly / 100.0);
    log::info!("anomaly mean |R| = {anomaly:.3}, baseline {baseline:.3}");
    Ok(anomaly >= baseline)
}

fn check_reflexivity_restore() -> Result<bool> {
    let mut bench = GeometricMemoryBenchmark::default_params()?;
    bench.initialize(20)?;
    let field = bench.field();
    let bits = |f: &RbfField| -> Vec<(u64, u64)> {
        f.coefficients()
            .iter()
            .map(|c| (c.re.to_bits(), c.im.to_bits()))
            .collect()
    };
    let before = bits(field);
    let r = reflexivity(field);
    Ok(before == bits(field) && (0.0..=1.0).contains(&r))
}

fn check_benchmark_grow() -> Result<bool> {
    let mut bench = GeometricMemoryBenchmark::default_params()?;
    let score = bench.run_complete()?;
    let monotone = bench
        .history()
        .windows(2)
        .all(|w| w[0].num_centers <= w[1].num_centers);
    Ok(monotone
        && bench.field().len() >= 100
        && bench.metrics().total_cycles > 0
        && score.is_authentic)
}

fn run_validate() -> Result<bool> {
    let checks: [(&str, Check); 6] = [
        ("basic centers", check_basic_centers),
        ("capacity cap", check_capacity_cap),
        ("sine wave", check_sine_wave),
        ("anomaly", check_anomaly),
        ("reflexivity restore", check_reflexivity_restore),
        ("benchmark grow", check_benchmark_grow),
    ];
    let mut all = true;
    for (name, check) in checks {
        let passed = match check() {
            Ok(p) => p,
            Err(e) => {
                log::error!("{name}: {e:#}");
                false
            }
        };
        println!("{} {name}", if passed { "PASS" } else { "FAIL" });
        all &= passed;
    }
    Ok(all)
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Demo(args) => run_demo(args, config.stream)?,
        Command::Bench(args) => run_bench(args, config.benchmark)?,
        Command::Quantities(args) => run_quantities(args, config.benchmark)?,
        Command::Validate => {
            if !run_validate()? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
