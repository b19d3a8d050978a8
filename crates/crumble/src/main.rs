use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crumble::bench::{self, BenchConfig};
use crumble::{AppConfig, Scenario, scenario};
use crumble_core::world::World;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario to run: sandpile, fireworks, demolition, dig, drop
    #[arg(long, default_value = "sandpile")]
    scenario: String,

    /// Number of ticks to simulate (overrides the config file)
    #[arg(long)]
    ticks: Option<u64>,

    /// Run the sand/fire stress benchmark instead of a scenario
    #[arg(long)]
    bench: bool,

    /// Write the benchmark report to this file as well
    #[arg(long)]
    bench_output: Option<PathBuf>,

    /// Sweep every chunk every tick
    #[arg(long)]
    no_chunks: bool,

    /// RNG seed
    #[arg(long)]
    seed: Option<u32>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<usize>,

    /// Config file name (RON, extension optional)
    #[arg(long, default_value = "crumble")]
    config: String,

    /// List available scenarios
    #[arg(long)]
    list_scenarios: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_scenarios {
        for scenario in Scenario::ALL {
            println!("{:<12} {}", scenario.name(), scenario.description());
        }
        return Ok(());
    }

    let mut config = AppConfig::load_from(&args.config)?;
    if let Some(seed) = args.seed {
        config.sim.seed = seed;
    }
    if let Some(width) = args.width {
        config.sim.width = width;
    }
    if let Some(height) = args.height {
        config.sim.height = height;
    }
    if args.no_chunks {
        config.sim.use_chunk_optimization = false;
    }

    let mut world = World::new(config.sim.clone()).context("Failed to create world")?;

    if args.bench {
        let bench_config = BenchConfig {
            ticks: args.ticks.unwrap_or(config.run.bench_ticks),
            warmup_ticks: config.run.bench_warmup_ticks,
            ..BenchConfig::default()
        };
        let report = bench::run(&mut world, &bench_config);
        let rendered = report.render();
        print!("{rendered}");
        if let Some(path) = args.bench_output {
            std::fs::write(&path, &rendered)
                .with_context(|| format!("Failed to write benchmark report: {}", path.display()))?;
            log::info!("Benchmark report saved to {}", path.display());
        }
        return Ok(());
    }

    let scenario: Scenario = args.scenario.parse()?;
    let ticks = args.ticks.unwrap_or(config.run.ticks);
    let report = scenario::run(scenario, &mut world, &config.body, ticks);
    println!("{}", report.summary());
    for (id, position) in &report.bodies {
        println!("  body {}: ({:.3}, {:.3})", id.raw(), position.x, position.y);
    }
    Ok(())
}
