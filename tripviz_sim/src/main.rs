//! TripViz Simulator CLI
//!
//! Run the viewer deterministically against synthetic datasets.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use tripviz_core::ViewerConfig;
use tripviz_sim::scenarios::ScenarioId;
use tripviz_sim::{ScenarioResult, ScenarioRunner, SimError};

/// TripViz deterministic simulation CLI
#[derive(Parser, Debug)]
#[command(name = "tripviz-sim")]
#[command(about = "Run deterministic simulations of the TripViz viewer", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (steady_loop, reload, fetch_failure, malformed_records,
    /// teardown, frame_jitter, slow_source, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Virtual duration per scenario in seconds
    #[arg(short, long, default_value = "60")]
    duration: f64,

    /// Display refresh rate in Hz
    #[arg(long, default_value = "60")]
    frame_rate: u32,

    /// Synthetic trips to generate
    #[arg(long, default_value = "200")]
    trips: usize,

    /// Synthetic building footprints to generate
    #[arg(long, default_value = "50")]
    buildings: usize,

    /// Viewer configuration JSON (clock, theme, view)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export sampled frames of a single scenario to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}

/// Runs every requested scenario and returns the number of failed runs.
fn run(args: &Args) -> Result<usize, SimError> {
    if !args.json {
        info!("TripViz Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(scenario) => vec![scenario],
            Err(e) => {
                eprintln!("Error: {}", e);
                let names: Vec<&str> = ScenarioId::all().iter().map(|s| s.name()).collect();
                eprintln!("Available scenarios: {}, all", names.join(", "));
                return Ok(1);
            }
        }
    };

    let config = match &args.config {
        Some(path) => ViewerConfig::from_json_file(path)?,
        None => ViewerConfig::default(),
    };

    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    let runner_for = |seed: u64| {
        ScenarioRunner::new(seed)
            .with_duration(args.duration)
            .with_frame_rate(args.frame_rate)
            .with_trips(args.trips)
            .with_buildings(args.buildings)
            .with_config(config.clone())
    };

    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            return Ok(1);
        }
        let (result, export) = runner_for(base_seed).run_with_export(scenarios[0])?;
        export.write_to_file(export_path)?;
        info!("Exported {} frames to {}", export.frames.len(), export_path);
        report(&result, args.json);
        return Ok(usize::from(!result.passed));
    }

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for seed_offset in 0..args.seeds {
        let runner = runner_for(base_seed.wrapping_add(seed_offset as u64));
        for scenario in &scenarios {
            let result = runner.run(*scenario)?;
            if !args.json {
                report(&result, false);
            }
            all_results.push(result);
        }
    }

    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": all_results.iter().map(result_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    Ok(failed_count)
}

fn report(result: &ScenarioResult, json: bool) {
    if json {
        match serde_json::to_string_pretty(&result_json(result)) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("failed to encode result: {}", e),
        }
    } else if result.passed {
        info!(
            "✓ {} (seed={}) PASSED - {} frames, {} wraparounds",
            result.scenario.name(),
            result.seed,
            result.total_frames,
            result.summary.wraparounds
        );
    } else {
        error!(
            "✗ {} (seed={}) FAILED: {}",
            result.scenario.name(),
            result.seed,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
}

fn result_json(r: &ScenarioResult) -> serde_json::Value {
    serde_json::json!({
        "scenario": r.scenario.name(),
        "seed": r.seed,
        "passed": r.passed,
        "frames": r.total_frames,
        "time_secs": r.final_time_secs,
        "revealed": r.final_revealed,
        "wraparounds": r.summary.wraparounds,
        "failed_loads": r.summary.failed_loads,
        "skipped_records": r.summary.skipped_records,
        "failure_reason": r.failure_reason,
    })
}
