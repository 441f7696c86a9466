use planetsim::{bench_gravity, bench_step};
use planetsim::{IntegratorConfig, Scenario, ScenarioConfig, VERTEX_STRIDE};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, looked up in `scenarios/` unless it exists as given
    #[arg(short, default_value = "disk.yaml")]
    file_name: String,

    /// Override the number of steps (defaults to t_end / h0)
    #[arg(long)]
    steps: Option<u64>,

    /// Override the integrator: euler, midpoint or quartic
    #[arg(long)]
    integrator: Option<String>,

    /// Log diagnostics and refresh the render buffers every N steps
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Run the benchmarks instead of the scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };
    let file = File::open(&config_path).with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig =
        serde_yaml::from_reader(reader).with_context(|| format!("parsing {}", config_path.display()))?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut scenario_cfg = load_scenario_from_yaml(&args.file_name)?;

    if let Some(name) = &args.integrator {
        scenario_cfg.engine.integrator = name.parse::<IntegratorConfig>()?;
    }

    if args.bench {
        let cohort_size = scenario_cfg.engine.cohort_size;
        let cohorts = scenario_cfg
            .engine
            .cohorts
            .unwrap_or_else(|| planetsim::simulation::engine::default_cohorts(cohort_size));
        bench_gravity(cohort_size, cohorts)?;
        bench_step(scenario_cfg.engine.force, 5)?;
        return Ok(());
    }

    let mut scenario = Scenario::build_scenario(scenario_cfg).context("building scenario")?;
    let steps = args.steps.unwrap_or_else(|| scenario.parameters.step_count());
    let dt = scenario.parameters.h0;
    let (width, height) = (scenario.projection.width, scenario.projection.height);

    // Host-owned render buffers, refilled on every report
    let mut vertices = vec![0.0f32; scenario.system.len() * VERTEX_STRIDE];
    let mut field = vec![0.0f32; width * height];

    log::info!(
        "running {} steps of {} with {} bodies ({} forces, {} integrator)",
        steps,
        dt,
        scenario.system.len(),
        scenario.force_name(),
        scenario.integrator_name()
    );

    for step in 1..=steps {
        scenario.step(dt)?;

        if step % args.report_every.max(1) == 0 || step == steps {
            scenario.write_vertex_buffer(&mut vertices, width, height)?;
            scenario.write_field_buffer(&mut field, width, height)?;

            let peak = field.iter().copied().fold(0.0f32, f32::max);
            let com = scenario.system.center_of_mass();
            log::info!(
                "step {:6}  t = {:8.4}  com = ({:+.5}, {:+.5})  kinetic = {:.6e}  field peak = {:.4}",
                step,
                scenario.system.t,
                com.x,
                com.y,
                scenario.system.kinetic_energy(),
                peak
            );
        }
    }

    Ok(())
}
